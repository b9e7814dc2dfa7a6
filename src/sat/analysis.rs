/*!
Conflict analysis.

Analysis resolves backwards from a conflicting clause to the first unique implication point: the single literal of the current decision level whose negation, together with literals settled at earlier levels, forms a clause the formula entails.
The resolution buffer walks the trail in reverse, expanding each visited literal by the clause which forced it, counting how many literals of the current level remain open; when one remains, its negation heads the learnt clause.

Atoms met during analysis have their activity bumped, which is what steers future decisions toward the conflicted part of the formula.
*/

use crate::types::err::SatError;

use super::{clause_db::ClauseKey, context::Context, literal::SatLiteral};

/// A learnt clause with the level to unwind to before asserting it.
#[derive(Debug)]
pub struct AnalysisOk {
    /// The learnt clause; the asserting literal is at index 0, and --- when the clause is not unit --- a literal of the backjump level is at index 1.
    pub clause: Vec<SatLiteral>,

    /// The level at which the learnt clause asserts.
    pub backjump_level: usize,
}

impl Context {
    /// Resolves the conflict `key` to an asserting clause.
    ///
    /// Requires a decision above level zero; a conflict at level zero is final and analysed by nobody.
    pub(super) fn analyse(&mut self, key: ClauseKey) -> Result<AnalysisOk, SatError> {
        let current = self.current_level();
        debug_assert!(current > 0);

        let mut seen = vec![false; self.values.len()];
        let mut learnt: Vec<SatLiteral> = Vec::new();
        let mut open_at_level = 0_usize;
        let mut trail_index = self.trail.len();

        let mut reason_literals: Vec<SatLiteral> = self.clause_db.get(key).literals.clone();

        let asserting = loop {
            for literal in &reason_literals {
                let atom = literal.atom() as usize;
                if !seen[atom] && self.level_of[atom] > 0 {
                    seen[atom] = true;
                    self.bump_activity(atom);
                    if self.level_of[atom] == current {
                        open_at_level += 1;
                    } else {
                        learnt.push(*literal);
                    }
                }
            }

            // The next visited literal, scanning the trail in reverse.
            let pivot = loop {
                trail_index = match trail_index.checked_sub(1) {
                    Some(index) => index,
                    None => return Err(SatError::NoAssertion),
                };
                let candidate = self.trail[trail_index];
                if seen[candidate.atom() as usize] {
                    break candidate;
                }
            };

            open_at_level -= 1;
            if open_at_level == 0 {
                break pivot.negate();
            }

            let reason = self.reason_of[pivot.atom() as usize].ok_or(SatError::NoAssertion)?;
            reason_literals = self
                .clause_db
                .get(reason)
                .literals
                .iter()
                .copied()
                .filter(|literal| literal.atom() != pivot.atom())
                .collect();
        };

        // The backjump level is the deepest level among the remaining literals.
        let mut backjump_level = 0;
        let mut deepest = None;
        for (index, literal) in learnt.iter().enumerate() {
            let level = self.level_of[literal.atom() as usize];
            if level > backjump_level {
                backjump_level = level;
                deepest = Some(index);
            }
        }

        let mut clause = Vec::with_capacity(learnt.len() + 1);
        clause.push(asserting);
        clause.extend(learnt);

        // Watch a literal of the backjump level alongside the asserting literal.
        if let Some(index) = deepest {
            clause.swap(1, index + 1);
        }

        Ok(AnalysisOk {
            clause,
            backjump_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::Report;

    #[test]
    fn learns_a_unit_from_a_forced_conflict() {
        let mut ctx = Context::default();
        let p = SatLiteral::new(ctx.fresh_atom().unwrap(), true);
        let q = SatLiteral::new(ctx.fresh_atom().unwrap(), true);

        // Deciding p forces q and -q; analysis must learn -p.
        ctx.add_clause(vec![-p, q]).unwrap();
        ctx.add_clause(vec![-p, -q]).unwrap();

        assert_eq!(ctx.solve().unwrap(), Report::Satisfiable);
        assert_eq!(ctx.value_of_literal(p), Some(false));
    }
}
