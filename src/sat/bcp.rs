/*!
Boolean constraint propagation.

Propagates each atom valued on the trail which has not yet been examined.
A valued literal falsifies its negation, so the clauses watching the negation are inspected: each either keeps a satisfied first watch, moves its second watch to an unfalsified literal, asserts its first watch as a consequence, or --- with both watches false and no replacement --- is the conflict which ends the pass.

The watch list under inspection is taken out of the context for the duration of the pass, which keeps the borrow checker satisfied while clauses swap their literals and other watch lists grow.
A clause keeps its place in the list unless its watch moves, and the conflict case retains the remainder of the list untouched.
*/

use crate::misc::log::targets;

use super::{clause_db::ClauseKey, context::Context, literal::SatLiteral};

enum WatchAction {
    /// The clause still watches the falsified literal.
    Keep,

    /// The clause now watches `literal` instead of the falsified literal.
    Moved(SatLiteral),

    /// The clause asserts its first watch.
    Unit(SatLiteral),

    /// Both watches are false, and no replacement exists.
    Conflict,
}

impl Context {
    /// Propagates every queued assignment; the key of the conflicting clause, if a conflict is found.
    pub(super) fn propagate(&mut self) -> Option<ClauseKey> {
        while self.queue_head < self.trail.len() {
            let literal = self.trail[self.queue_head];
            self.queue_head += 1;
            self.counters.propagations += 1;

            let false_literal = literal.negate();
            let list_index = false_literal.index();

            let list = std::mem::take(&mut self.watches[list_index]);
            let mut kept: Vec<ClauseKey> = Vec::with_capacity(list.len());

            for (position, &key) in list.iter().enumerate() {
                let action = {
                    let values = &self.values;
                    let clause = self.clause_db.get_mut(key);

                    if clause.literals[0] == false_literal {
                        clause.literals.swap(0, 1);
                    }

                    let first = clause.literals[0];
                    let value_of = |l: SatLiteral| {
                        values[l.atom() as usize].map(|value| value == l.polarity())
                    };

                    if value_of(first) == Some(true) {
                        WatchAction::Keep
                    } else {
                        let replacement = (2..clause.literals.len())
                            .find(|&index| value_of(clause.literals[index]) != Some(false));

                        match replacement {
                            Some(index) => {
                                clause.literals.swap(1, index);
                                WatchAction::Moved(clause.literals[1])
                            }
                            None => match value_of(first) {
                                Some(false) => WatchAction::Conflict,
                                _ => WatchAction::Unit(first),
                            },
                        }
                    }
                };

                match action {
                    WatchAction::Keep => kept.push(key),

                    WatchAction::Moved(watch) => {
                        self.watches[watch.index()].push(key);
                    }

                    WatchAction::Unit(first) => {
                        self.assign(first, Some(key));
                        kept.push(key);
                    }

                    WatchAction::Conflict => {
                        // Retain this clause and the rest of the list, then stop the pass.
                        kept.extend(&list[position..]);
                        self.watches[list_index] = kept;
                        log::trace!(target: targets::SAT, "conflict in clause {key}");
                        return Some(key);
                    }
                }
            }

            self.watches[list_index] = kept;
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::{Report, SolveStatus};

    fn fresh_literals(ctx: &mut Context, count: usize) -> Vec<SatLiteral> {
        (0..count)
            .map(|_| SatLiteral::new(ctx.fresh_atom().unwrap(), true))
            .collect()
    }

    #[test]
    fn unit_chain() {
        let mut ctx = Context::default();
        let lits = fresh_literals(&mut ctx, 3);
        let (p, q, r) = (lits[0], lits[1], lits[2]);

        ctx.add_clause(vec![-p, q]).unwrap();
        ctx.add_clause(vec![-q, r]).unwrap();
        ctx.add_clause(vec![p]).unwrap();

        // The unit addition propagates the chain at level zero.
        assert_eq!(ctx.value_of_literal(q), Some(true));
        assert_eq!(ctx.value_of_literal(r), Some(true));
    }

    #[test]
    fn conflict_at_level_zero() {
        let mut ctx = Context::default();
        let lits = fresh_literals(&mut ctx, 2);
        let (p, q) = (lits[0], lits[1]);

        ctx.add_clause(vec![-p, q]).unwrap();
        ctx.add_clause(vec![-p, -q]).unwrap();
        ctx.add_clause(vec![p]).unwrap();

        assert_eq!(ctx.status, SolveStatus::Unsatisfiable);
        assert_eq!(ctx.solve().unwrap(), Report::Unsatisfiable);
    }
}
