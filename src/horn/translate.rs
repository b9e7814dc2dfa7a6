/*!
Translation of clause sets and goal formulas to Horn form.

Each clause maps to one of:
- a **fact** --- exactly one positive literal and no negated literals,
- a **rule** --- one positive literal as the head, the negated literals as the body in order,
- a **denial** --- no positive literals.

A clause with two or more positive literals is not Horn and aborts the translation.

Denials arising from premises cannot help a resolution proof and are set aside; the caller may inspect them, but the program holds facts and rules only.

The goal translator is orthogonal: it converts a query formula to the conjunction of atoms the engine should resolve, accepting existential quantification and conjunction, and rejecting universally quantified goals explicitly --- a universal claim must be proved by refutation, not by query.
*/

use crate::{
    clausal::clause::Clause,
    language::ast::{Atom, Formula},
    types::err::HornError,
};

use super::program::{HornAtom, HornClause, HornProgram};

/// The result of translating a clause set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Translation {
    /// The program: facts and rules, in clause order.
    pub program: HornProgram,

    /// All-negative clauses, set aside.
    pub denials: Vec<Vec<HornAtom>>,
}

/// Translates a clause set to a Horn program.
pub fn program_of_clauses(clauses: &[Clause]) -> Result<Translation, HornError> {
    let mut translation = Translation::default();

    for clause in clauses {
        let positive_literals = clause.positive_count();
        if positive_literals > 1 {
            return Err(HornError::NotHorn { positive_literals });
        }

        let head = clause
            .literals
            .iter()
            .find(|literal| !literal.negated)
            .map(|literal| HornAtom::new(literal.predicate.clone(), literal.args.clone()));

        let body: Vec<HornAtom> = clause
            .literals
            .iter()
            .filter(|literal| literal.negated)
            .map(|literal| HornAtom::new(literal.predicate.clone(), literal.args.clone()))
            .collect();

        match head {
            Some(head) => translation.program.push(HornClause::rule(head, body)),
            None => translation.denials.push(body),
        }
    }

    Ok(translation)
}

/// Translates a query formula to the conjunction of atoms to resolve.
pub fn goal_of_formula(formula: &Formula) -> Result<Vec<HornAtom>, HornError> {
    let mut atoms = Vec::new();
    collect_goal(formula, &mut atoms)?;
    Ok(atoms)
}

fn collect_goal(formula: &Formula, atoms: &mut Vec<HornAtom>) -> Result<(), HornError> {
    match formula {
        Formula::Forall { .. } => Err(HornError::UniversalGoal),

        // The engine searches for witnesses, so an existential binder is simply a variable.
        Formula::Exists { body, .. } => collect_goal(body, atoms),

        Formula::And(l, r) => {
            collect_goal(l, atoms)?;
            collect_goal(r, atoms)
        }

        Formula::Atom(atom) => {
            atoms.push(atom_of(atom));
            Ok(())
        }

        Formula::Or(_, _) | Formula::Not(_) | Formula::Implies(_, _) | Formula::Iff(_, _) => {
            Err(HornError::UnsupportedGoal)
        }
    }
}

fn atom_of(atom: &Atom) -> HornAtom {
    match atom {
        Atom::Predicate { name, args } => HornAtom::new(name.clone(), args.clone()),
        Atom::Equals(l, r) => HornAtom::new(
            crate::clausal::clause::EQUALITY_PREDICATE,
            vec![l.clone(), r.clone()],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clausal::{ClausifyInput, Clausifier};
    use crate::language::parser::parse;

    fn clauses_of(source: &str) -> Vec<Clause> {
        let clausifier = Clausifier::default();
        let (output, _) = clausifier.clausify(ClausifyInput::Text(source)).unwrap();
        output.clauses
    }

    #[test]
    fn fact_rule_split() {
        let mut clauses = clauses_of("man(socrates)");
        clauses.extend(clauses_of("all x (man(x) -> mortal(x))"));

        let translation = program_of_clauses(&clauses).unwrap();
        assert_eq!(translation.program.clauses.len(), 2);
        assert!(translation.program.clauses[0].is_fact());
        assert_eq!(translation.program.clauses[1].body.len(), 1);
        assert!(translation.denials.is_empty());
    }

    #[test]
    fn body_order_preserved() {
        let clauses = clauses_of("all x (P(x) & Q(x) & R(x) -> S(x))");
        let translation = program_of_clauses(&clauses).unwrap();
        let body: Vec<String> = translation.program.clauses[0]
            .body
            .iter()
            .map(|atom| atom.predicate.clone())
            .collect();
        assert_eq!(body, vec!["P", "Q", "R"]);
    }

    #[test]
    fn non_horn_rejected() {
        let clauses = clauses_of("P | Q");
        assert_eq!(
            program_of_clauses(&clauses),
            Err(HornError::NotHorn {
                positive_literals: 2
            })
        );
    }

    #[test]
    fn denials_set_aside() {
        let clauses = clauses_of("-P | -Q");
        let translation = program_of_clauses(&clauses).unwrap();
        assert!(translation.program.clauses.is_empty());
        assert_eq!(translation.denials.len(), 1);
    }

    #[test]
    fn universal_goal_rejected() {
        let goal = parse("all x mortal(x)").unwrap();
        assert_eq!(goal_of_formula(&goal), Err(HornError::UniversalGoal));
    }

    #[test]
    fn existential_goal_accepted() {
        let goal = parse("exists x mortal(x)").unwrap();
        let atoms = goal_of_formula(&goal).unwrap();
        assert_eq!(atoms.len(), 1);
        assert_eq!(atoms[0].predicate, "mortal");
    }

    #[test]
    fn conjunctive_goal() {
        let goal = parse("man(socrates) & mortal(socrates)").unwrap();
        let atoms = goal_of_formula(&goal).unwrap();
        assert_eq!(atoms.len(), 2);
    }
}
