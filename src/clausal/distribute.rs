/*!
Conjunctive normal form by distribution.

The matrix --- quantifier-free, in negation normal form --- is folded bottom-up: a conjunction concatenates the clause sets of its branches, a disjunction takes their pairwise unions.
The pairwise union is where the worst-case exponential blowup lives, so every combination step is gated by the deadline and the clause bounds.

The fold uses an explicit work stack rather than recursion; the matrix may be arbitrarily deep and the stack must not be the limit.
*/

use crate::{
    generic::deadline::Deadline,
    types::err::ClausifyError,
};

use crate::language::ast::Formula;

use super::clause::{literal_of_atom, Clause};

/// Bounds shared by the distribution and Tseitin strategies.
#[derive(Clone, Copy, Debug)]
pub struct Bounds {
    pub deadline: Deadline,
    pub max_clauses: usize,
    pub max_clause_size: usize,
}

impl Bounds {
    pub(super) fn check_count(&self, count: usize) -> Result<(), ClausifyError> {
        if self.deadline.expired() {
            return Err(ClausifyError::Timeout);
        }
        if count > self.max_clauses {
            return Err(ClausifyError::TooManyClauses {
                count,
                limit: self.max_clauses,
            });
        }
        Ok(())
    }

    pub(super) fn check_size(&self, size: usize) -> Result<(), ClausifyError> {
        if size > self.max_clause_size {
            return Err(ClausifyError::ClauseTooLong {
                size,
                limit: self.max_clause_size,
            });
        }
        Ok(())
    }
}

enum Task<'f> {
    Visit(&'f Formula),
    CombineAnd,
    CombineOr,
}

/// Rewrites the matrix to a clause set by distributing disjunction over conjunction.
pub fn distribute(matrix: &Formula, bounds: &Bounds) -> Result<Vec<Clause>, ClausifyError> {
    let mut tasks = vec![Task::Visit(matrix)];
    let mut results: Vec<Vec<Clause>> = Vec::new();

    while let Some(task) = tasks.pop() {
        match task {
            Task::Visit(formula) => match formula {
                Formula::And(l, r) => {
                    tasks.push(Task::CombineAnd);
                    tasks.push(Task::Visit(r));
                    tasks.push(Task::Visit(l));
                }

                Formula::Or(l, r) => {
                    tasks.push(Task::CombineOr);
                    tasks.push(Task::Visit(r));
                    tasks.push(Task::Visit(l));
                }

                Formula::Not(inner) => match &**inner {
                    Formula::Atom(atom) => {
                        results.push(vec![Clause::new(vec![literal_of_atom(
                            atom.clone(),
                            true,
                        )])]);
                    }
                    // Negation normal form was established upstream.
                    _ => unreachable!("negation on a non-atom after nnf"),
                },

                Formula::Atom(atom) => {
                    results.push(vec![Clause::new(vec![literal_of_atom(
                        atom.clone(),
                        false,
                    )])]);
                }

                _ => unreachable!("quantifier or arrow in a matrix"),
            },

            Task::CombineAnd => {
                let right = results.pop().unwrap_or_default();
                let mut left = results.pop().unwrap_or_default();
                left.extend(right);
                bounds.check_count(left.len())?;
                results.push(left);
            }

            Task::CombineOr => {
                let right = results.pop().unwrap_or_default();
                let left = results.pop().unwrap_or_default();

                bounds.check_count(left.len().saturating_mul(right.len()))?;

                let mut crossed = Vec::with_capacity(left.len() * right.len());
                for l in &left {
                    for r in &right {
                        let mut union = l.clone();
                        union.literals.extend(r.literals.iter().cloned());
                        union.dedup();
                        bounds.check_size(union.size())?;
                        crossed.push(union);
                    }
                }
                results.push(crossed);
            }
        }
    }

    Ok(results.pop().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::parser::parse;

    fn clause_strings(source: &str) -> Vec<String> {
        let matrix = crate::clausal::nnf::to_nnf(parse(source).unwrap());
        let bounds = Bounds {
            deadline: Deadline::none(),
            max_clauses: 1_000,
            max_clause_size: 100,
        };
        distribute(&matrix, &bounds)
            .unwrap()
            .iter()
            .map(Clause::to_string)
            .collect()
    }

    #[test]
    fn disjunction_distributes_over_conjunction() {
        let clauses = clause_strings("P | (Q & R)");
        assert_eq!(clauses, vec!["P | Q", "P | R"]);
    }

    #[test]
    fn conjunction_concatenates() {
        let clauses = clause_strings("(P | Q) & R");
        assert_eq!(clauses, vec!["P | Q", "R"]);
    }

    #[test]
    fn duplicate_literals_merge() {
        let clauses = clause_strings("P | (P & Q)");
        assert_eq!(clauses, vec!["P", "P | Q"]);
    }

    #[test]
    fn blowup_is_bounded() {
        // (P1 & Q1) | (P2 & Q2) | … distributes multiplicatively.
        let source = (1..=12)
            .map(|i| format!("(P{i} & Q{i})"))
            .collect::<Vec<_>>()
            .join(" | ");
        let matrix = crate::clausal::nnf::to_nnf(parse(&source).unwrap());
        let bounds = Bounds {
            deadline: Deadline::none(),
            max_clauses: 64,
            max_clause_size: 100,
        };
        assert!(matches!(
            distribute(&matrix, &bounds),
            Err(ClausifyError::TooManyClauses { .. })
        ));
    }
}
