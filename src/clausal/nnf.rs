/*!
Negation normal form.

Equivalences are expanded, implications eliminated, and negation pushed inward until it rests on atoms:

- `A <-> B` becomes `(A -> B) & (B -> A)`.
- `A -> B` becomes `-A | B`.
- De Morgan over `&` and `|`.
- `-all x P` becomes `exists x -P`, and dually.
- `--A` collapses to `A`.

After the rewrite, [Not](Formula::Not) wraps only [Atom](Formula::Atom) nodes.
*/

use crate::language::ast::Formula;

/// Rewrites `formula` to negation normal form.
pub fn to_nnf(formula: Formula) -> Formula {
    match formula {
        Formula::Iff(l, r) => {
            let forward = Formula::implies((*l).clone(), (*r).clone());
            let backward = Formula::implies(*r, *l);
            to_nnf(Formula::and(forward, backward))
        }

        Formula::Implies(l, r) => Formula::or(to_nnf(Formula::not(*l)), to_nnf(*r)),

        Formula::And(l, r) => Formula::and(to_nnf(*l), to_nnf(*r)),

        Formula::Or(l, r) => Formula::or(to_nnf(*l), to_nnf(*r)),

        Formula::Forall { var, body } => Formula::forall(var, to_nnf(*body)),

        Formula::Exists { var, body } => Formula::exists(var, to_nnf(*body)),

        Formula::Not(inner) => match *inner {
            Formula::Not(e) => to_nnf(*e),

            Formula::And(l, r) => Formula::or(
                to_nnf(Formula::not(*l)),
                to_nnf(Formula::not(*r)),
            ),

            Formula::Or(l, r) => Formula::and(
                to_nnf(Formula::not(*l)),
                to_nnf(Formula::not(*r)),
            ),

            Formula::Implies(l, r) => Formula::and(to_nnf(*l), to_nnf(Formula::not(*r))),

            Formula::Iff(l, r) => {
                let forward = Formula::implies((*l).clone(), (*r).clone());
                let backward = Formula::implies(*r, *l);
                to_nnf(Formula::not(Formula::and(forward, backward)))
            }

            Formula::Forall { var, body } => Formula::exists(var, to_nnf(Formula::not(*body))),

            Formula::Exists { var, body } => Formula::forall(var, to_nnf(Formula::not(*body))),

            atom @ Formula::Atom(_) => Formula::not(atom),
        },

        atom @ Formula::Atom(_) => atom,
    }
}

/// Whether negation occurs only on atoms.
pub fn is_nnf(formula: &Formula) -> bool {
    match formula {
        Formula::Iff(_, _) | Formula::Implies(_, _) => false,
        Formula::Not(inner) => matches!(**inner, Formula::Atom(_)),
        Formula::And(l, r) | Formula::Or(l, r) => is_nnf(l) && is_nnf(r),
        Formula::Forall { body, .. } | Formula::Exists { body, .. } => is_nnf(body),
        Formula::Atom(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::parser::parse;

    #[test]
    fn negations_rest_on_atoms() {
        for source in [
            "-(P & Q)",
            "-(P | -Q)",
            "-(P -> Q)",
            "P <-> Q",
            "-(P <-> Q)",
            "-all x P(x)",
            "-exists x -P(x)",
            "--P",
        ] {
            let formula = to_nnf(parse(source).unwrap());
            assert!(is_nnf(&formula), "not in nnf: {source} => {formula}");
        }
    }

    #[test]
    fn de_morgan() {
        let formula = to_nnf(parse("-(P & Q)").unwrap());
        assert_eq!(formula.to_string(), "(-P | -Q)");
    }

    #[test]
    fn quantifier_duality() {
        let formula = to_nnf(parse("-all x P(x)").unwrap());
        assert_eq!(formula.to_string(), "exists x -P(x)");
    }

    #[test]
    fn double_negation() {
        let formula = to_nnf(parse("--P").unwrap());
        assert_eq!(formula.to_string(), "P");
    }
}
