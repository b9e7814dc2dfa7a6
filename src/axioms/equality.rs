/*!
Generated equality axioms.

Equality is a user-level congruence.
For the resolution path the generator emits a depth-bounded Horn program over three predicates:

- `eq_fact(X, Y)` --- the equalities the user asserted,
- `eq_step(X, Y, D)` --- one rewrite step: an asserted equality in either direction, or congruence under a function of the signature,
- `eq_d(X, Y, D)` --- reflexivity, or a step to somewhere *new* followed by a shorter chain.

The depth argument is a numeral counted down through the arithmetic builtins, which bounds chains without cutting the program's recursion elsewhere; the step's `ne` guard prunes rewrites which merely stay put.
Substitution rules let any predicate of the signature travel across a proven chain.

User formulas never mention the generated predicates: a premise `a = b` is rewritten to `eq_fact(a, b)` on assertion, and a goal `a = b` to `eq_d(a, b, <depth>)`.

For the satisfiability path equality stays in formula form --- reflexivity, symmetry, transitivity, congruence, and substitution as quantified formulas --- and goes through clausification with the rest of the problem.
*/

use crate::{
    clausal::clause::EQUALITY_PREDICATE,
    horn::program::{HornAtom, HornClause, HornProgram},
    language::{
        ast::{Atom, Formula, Term},
        signature::{self, Signature},
    },
};

use super::arithmetic;

/// The premise-level equality predicate of generated programs.
pub const EQ_FACT: &str = "eq_fact";

/// The single-step predicate of generated programs.
pub const EQ_STEP: &str = "eq_step";

/// The bounded-chain predicate of generated programs.
pub const EQ_CHAIN: &str = "eq_d";

fn var(name: &str) -> Term {
    Term::var(name)
}

/// The depth-bounded equality program for `signature`.
pub fn equality_program(signature: &Signature, depth: usize) -> Vec<HornClause> {
    let mut clauses = Vec::new();

    // eq_d(X, X, _).
    clauses.push(HornClause::fact(HornAtom::new(
        EQ_CHAIN,
        vec![var("X"), var("X"), var("_")],
    )));

    // eq_d(X, Y, D) :- gt(D, 0), minus(D, 1, D1), eq_step(X, Z, D1), ne(Z, X), eq_d(Z, Y, D1).
    clauses.push(HornClause::rule(
        HornAtom::new(EQ_CHAIN, vec![var("X"), var("Y"), var("D")]),
        vec![
            HornAtom::new("gt", vec![var("D"), Term::constant("0")]),
            HornAtom::new("minus", vec![var("D"), Term::constant("1"), var("D1")]),
            HornAtom::new(EQ_STEP, vec![var("X"), var("Z"), var("D1")]),
            HornAtom::new(arithmetic::NE, vec![var("Z"), var("X")]),
            HornAtom::new(EQ_CHAIN, vec![var("Z"), var("Y"), var("D1")]),
        ],
    ));

    // eq_step(X, Y, _) :- eq_fact(X, Y).    and the symmetric form.
    clauses.push(HornClause::rule(
        HornAtom::new(EQ_STEP, vec![var("X"), var("Y"), var("_")]),
        vec![HornAtom::new(EQ_FACT, vec![var("X"), var("Y")])],
    ));
    clauses.push(HornClause::rule(
        HornAtom::new(EQ_STEP, vec![var("X"), var("Y"), var("_")]),
        vec![HornAtom::new(EQ_FACT, vec![var("Y"), var("X")])],
    ));

    // Congruence: one step under each function of the signature.
    for (function, arity) in &signature.functions {
        let xs: Vec<Term> = (0..*arity).map(|i| var(&format!("X{i}"))).collect();
        let ys: Vec<Term> = (0..*arity).map(|i| var(&format!("Y{i}"))).collect();

        let mut body: Vec<HornAtom> = (0..*arity)
            .map(|i| HornAtom::new(EQ_CHAIN, vec![xs[i].clone(), ys[i].clone(), var("D")]))
            .collect();
        body.insert(0, HornAtom::new("gt", vec![var("D"), Term::constant("0")]));

        clauses.push(HornClause::rule(
            HornAtom::new(
                EQ_STEP,
                vec![
                    Term::function(function.clone(), xs.clone()),
                    Term::function(function.clone(), ys.clone()),
                    var("D"),
                ],
            ),
            body,
        ));
    }

    // Substitution: each predicate of the signature travels across chains.
    for (predicate, arity) in &signature.predicates {
        if is_generated_predicate(predicate) || signature::is_arithmetic_name(predicate) {
            continue;
        }

        let xs: Vec<Term> = (0..*arity).map(|i| var(&format!("X{i}"))).collect();
        let ys: Vec<Term> = (0..*arity).map(|i| var(&format!("Y{i}"))).collect();

        let mut body: Vec<HornAtom> = (0..*arity)
            .map(|i| {
                HornAtom::new(
                    EQ_CHAIN,
                    vec![
                        xs[i].clone(),
                        ys[i].clone(),
                        Term::constant(depth.to_string()),
                    ],
                )
            })
            .collect();
        body.push(HornAtom::new(predicate.clone(), xs.clone()));

        clauses.push(HornClause::rule(
            HornAtom::new(predicate.clone(), ys.clone()),
            body,
        ));
    }

    clauses
}

fn is_generated_predicate(name: &str) -> bool {
    name == EQ_FACT || name == EQ_STEP || name == EQ_CHAIN || name == EQUALITY_PREDICATE
}

/// Rewrites user equality into the generated vocabulary throughout a program.
///
/// Heads become `eq_fact`, body atoms become bounded chains.
pub fn rewrite_program(program: &mut HornProgram, depth: usize) {
    for clause in &mut program.clauses {
        if clause.head.predicate == EQUALITY_PREDICATE {
            clause.head = HornAtom::new(EQ_FACT, clause.head.args.clone());
        }
        for atom in &mut clause.body {
            rewrite_atom(atom, depth);
        }
    }
}

/// Rewrites user equality atoms of a goal into bounded chains.
pub fn rewrite_goal(atoms: &mut [HornAtom], depth: usize) {
    for atom in atoms {
        rewrite_atom(atom, depth);
    }
}

fn rewrite_atom(atom: &mut HornAtom, depth: usize) {
    if atom.predicate == EQUALITY_PREDICATE {
        let mut args = atom.args.clone();
        args.push(Term::constant(depth.to_string()));
        *atom = HornAtom::new(EQ_CHAIN, args);
    }
}

/// Equality axioms in formula form for the satisfiability path.
pub fn equality_formulas(signature: &Signature) -> Vec<Formula> {
    let mut formulas = Vec::new();

    let eq = |l: Term, r: Term| Formula::atom(Atom::equals(l, r));

    // Reflexivity, symmetry, transitivity; closure of free variables happens in the pipeline.
    formulas.push(eq(var("x"), var("x")));
    formulas.push(Formula::implies(
        eq(var("x"), var("y")),
        eq(var("y"), var("x")),
    ));
    formulas.push(Formula::implies(
        Formula::and(eq(var("x"), var("y")), eq(var("y"), var("z"))),
        eq(var("x"), var("z")),
    ));

    // Congruence under each function of the signature.
    for (function, arity) in &signature.functions {
        if *arity == 0 {
            continue;
        }
        let xs: Vec<Term> = (0..*arity).map(|i| var(&format!("x{i}"))).collect();
        let ys: Vec<Term> = (0..*arity).map(|i| var(&format!("y{i}"))).collect();

        let premise = pairwise_equalities(&xs, &ys);
        let conclusion = eq(
            Term::function(function.clone(), xs.clone()),
            Term::function(function.clone(), ys.clone()),
        );
        formulas.push(Formula::implies(premise, conclusion));
    }

    // Substitution under each predicate of the signature.
    for (predicate, arity) in &signature.predicates {
        if *arity == 0 || signature::is_arithmetic_name(predicate) {
            continue;
        }
        let xs: Vec<Term> = (0..*arity).map(|i| var(&format!("x{i}"))).collect();
        let ys: Vec<Term> = (0..*arity).map(|i| var(&format!("y{i}"))).collect();

        let premise = Formula::and(
            pairwise_equalities(&xs, &ys),
            Formula::atom(Atom::predicate(predicate.clone(), xs.clone())),
        );
        let conclusion = Formula::atom(Atom::predicate(predicate.clone(), ys.clone()));
        formulas.push(Formula::implies(premise, conclusion));
    }

    formulas
}

fn pairwise_equalities(xs: &[Term], ys: &[Term]) -> Formula {
    let equalities: Vec<Formula> = xs
        .iter()
        .zip(ys.iter())
        .map(|(x, y)| Formula::atom(Atom::equals(x.clone(), y.clone())))
        .collect();
    Formula::conjoin(equalities).expect("pairwise equalities of a positive arity")
}
