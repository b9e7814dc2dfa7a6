/*!
Conjunctive normal form by the Tseitin transformation.

Each non-atomic sub-formula of the matrix receives a fresh auxiliary predicate `aux_k`, applied to the variables of the sub-formula, and the transformation emits clauses for the equivalence between the auxiliary and the connective it names:

- `x ↔ (a & b)` gives `-x | a`, `-x | b`, `x | -a | -b`.
- `x ↔ (a | b)` gives `-x | a | b`, `x | -a`, `x | -b`.

A unit clause asserts the auxiliary of the whole matrix.
The clause count is linear in the count of sub-formulas, at the cost of a vocabulary the original formula never mentioned --- which is why the strategy is optional, and why satisfiability rather than equivalence is preserved.
*/

use std::collections::BTreeSet;

use crate::types::err::ClausifyError;

use crate::language::ast::{Formula, Term};

use super::{
    clause::{literal_of_atom, Clause, Literal},
    distribute::Bounds,
    skolem::SkolemEnv,
};

/// Rewrites the matrix to an equisatisfiable clause set with auxiliary predicates.
pub fn tseitin(
    matrix: &Formula,
    env: &mut SkolemEnv,
    bounds: &Bounds,
) -> Result<Vec<Clause>, ClausifyError> {
    let mut clauses = Vec::new();
    let root = encode(matrix, env, bounds, &mut clauses)?;
    clauses.push(Clause::new(vec![root]));
    Ok(clauses)
}

fn encode(
    formula: &Formula,
    env: &mut SkolemEnv,
    bounds: &Bounds,
    clauses: &mut Vec<Clause>,
) -> Result<Literal, ClausifyError> {
    bounds.check_count(clauses.len())?;

    match formula {
        Formula::Atom(atom) => Ok(literal_of_atom(atom.clone(), false)),

        Formula::Not(inner) => match &**inner {
            Formula::Atom(atom) => Ok(literal_of_atom(atom.clone(), true)),
            _ => unreachable!("negation on a non-atom after nnf"),
        },

        Formula::And(l, r) => {
            let a = encode(l, env, bounds, clauses)?;
            let b = encode(r, env, bounds, clauses)?;
            let x = fresh_aux(env, &a, &b);

            clauses.push(Clause::new(vec![x.negate(), a.clone()]));
            clauses.push(Clause::new(vec![x.negate(), b.clone()]));
            clauses.push(Clause::new(vec![x.clone(), a.negate(), b.negate()]));

            Ok(x)
        }

        Formula::Or(l, r) => {
            let a = encode(l, env, bounds, clauses)?;
            let b = encode(r, env, bounds, clauses)?;
            let x = fresh_aux(env, &a, &b);

            clauses.push(Clause::new(vec![x.negate(), a.clone(), b.clone()]));
            clauses.push(Clause::new(vec![x.clone(), a.negate()]));
            clauses.push(Clause::new(vec![x.clone(), b.negate()]));

            Ok(x)
        }

        _ => unreachable!("quantifier or arrow in a matrix"),
    }
}

/// A fresh auxiliary over the variables of the named sub-formula.
///
/// The variables are those of the branch literals; carrying them keeps the definition clauses implicitly universal, so the transformation remains sound for non-ground matrices.
fn fresh_aux(env: &mut SkolemEnv, a: &Literal, b: &Literal) -> Literal {
    let mut names: BTreeSet<String> = BTreeSet::new();
    let mut collect = |literal: &Literal| {
        let mut set = std::collections::HashSet::new();
        for arg in &literal.args {
            arg.variables_into(&mut set);
        }
        names.extend(set);
    };
    collect(a);
    collect(b);

    env.aux_counter += 1;
    Literal::new(
        format!("aux_{}", env.aux_counter),
        names.into_iter().map(Term::Variable).collect(),
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generic::deadline::Deadline;
    use crate::language::parser::parse;

    fn run(source: &str) -> Vec<Clause> {
        use crate::clausal::{nnf, skolem, standardize};

        let mut env = SkolemEnv::default();
        let formula = nnf::to_nnf(parse(source).unwrap());
        let formula = standardize::standardize(formula, &mut env.var_counter);
        let matrix = skolem::drop_universals(skolem::skolemize(formula, &mut env));

        let bounds = Bounds {
            deadline: Deadline::none(),
            max_clauses: 10_000,
            max_clause_size: 1_000,
        };
        tseitin(&matrix, &mut env, &bounds).unwrap()
    }

    #[test]
    fn linear_clause_count() {
        // Three connectives: three definitions of three clauses each, plus the root unit.
        let clauses = run("(P & Q) | (R & S)");
        assert_eq!(clauses.len(), 10);
    }

    #[test]
    fn root_is_asserted() {
        let clauses = run("P | Q");
        let last = clauses.last().unwrap();
        assert_eq!(last.size(), 1);
        assert!(last.literals[0].predicate.starts_with("aux_"));
        assert!(!last.literals[0].negated);
    }

    #[test]
    fn auxiliaries_carry_variables() {
        let clauses = run("all x (P(x) & Q(x))");
        let aux = clauses
            .iter()
            .flat_map(|c| c.literals.iter())
            .find(|l| l.predicate.starts_with("aux_"))
            .unwrap();
        assert_eq!(aux.args.len(), 1);
    }
}
