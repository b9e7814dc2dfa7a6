/*!
The resolution machine: unification, renaming apart, and depth-first SLD search.

A goal is a list of atoms resolved left to right.
Resolving the selected atom against a program clause renames the clause apart, unifies the atom with the clause head under the current substitution, and continues with the clause body prepended to the remainder of the goal.
Search is depth-first over clause order, with the substitution cloned per branch so backtracking is a return.

Budgets are threaded through the whole search:
- every head unification counts one inference step, and exceeding `max_inferences` abandons the search with the limit flagged --- failed within bound, neither proved nor disproved;
- branches deeper than `max_depth` are clipped, which also flags the limit;
- the deadline and the cancellation flag are checked at every step, and surface as their own outcomes.

When arithmetic is enabled the selected atom is offered to the [builtin table](crate::axioms::arithmetic) before the program.
*/

use std::collections::{BTreeMap, HashMap};

use crate::{
    axioms::arithmetic::{self, BuiltinOutcome},
    engines::CancelFlag,
    generic::deadline::Deadline,
    horn::program::{HornAtom, HornClause},
    language::ast::Term,
    misc::log::targets,
};

/// Options for one resolution call.
#[derive(Clone, Debug)]
pub struct SldOptions {
    /// Budget of inference steps.
    pub max_inferences: usize,

    /// Branches deeper than this are clipped.
    pub max_depth: usize,

    /// Stop after this many answers.
    pub max_answers: usize,

    /// Offer goal atoms to the arithmetic builtins.
    pub arithmetic: bool,

    /// Record one trace step per resolution.
    pub collect_trace: bool,

    /// Wall-clock bound for the search.
    pub deadline: Deadline,

    /// Cooperative cancellation, checked at every resolution step.
    pub cancel: CancelFlag,
}

impl Default for SldOptions {
    fn default() -> Self {
        SldOptions {
            max_inferences: 10_000,
            max_depth: 1_000,
            max_answers: 1,
            arithmetic: false,
            collect_trace: false,
            deadline: Deadline::none(),
            cancel: CancelFlag::default(),
        }
    }
}

/// One derived goal in the optional trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceStep {
    /// Depth of the resolution which derived the goal.
    pub depth: usize,

    /// The atom which was resolved.
    pub goal: String,

    /// The clause it was resolved against, or the builtin which discharged it.
    pub clause: String,
}

/// The result of one resolution call.
#[derive(Clone, Debug, Default)]
pub struct SldOutcome {
    /// Whether at least one answer was found.
    pub found: bool,

    /// Bindings of the goal variables, one map per answer.
    pub answers: Vec<BTreeMap<String, String>>,

    /// Inference steps consumed.
    pub inference_count: usize,

    /// Whether the inference or depth budget was exhausted --- failed within bound.
    pub hit_limit: bool,

    /// Whether the deadline passed.
    pub timed_out: bool,

    /// Whether cancellation was requested.
    pub cancelled: bool,

    /// The trace, when collection was requested.
    pub trace: Vec<TraceStep>,
}

/// A substitution from variable names to terms.
pub type Substitution = HashMap<String, Term>;

/// Resolves `goal` against `program` under `options`.
pub fn solve(program: &[HornClause], goal: &[HornAtom], options: &SldOptions) -> SldOutcome {
    let mut goal_variables: Vec<String> = Vec::new();
    for atom in goal {
        for name in atom.variables() {
            if !goal_variables.contains(&name) {
                goal_variables.push(name);
            }
        }
    }
    goal_variables.sort();

    let mut machine = Machine {
        program,
        options,
        inference_count: 0,
        rename_counter: 0,
        depth_clipped: false,
        answers: Vec::new(),
        trace: Vec::new(),
    };

    let goal: Vec<HornAtom> = goal.to_vec();
    let stop = machine.search(&goal, &Substitution::new(), 0).err();

    let answers: Vec<BTreeMap<String, String>> = machine
        .answers
        .iter()
        .map(|substitution| {
            goal_variables
                .iter()
                .map(|name| {
                    let value = apply(&Term::var(name.clone()), substitution);
                    (name.clone(), value.to_string())
                })
                .collect()
        })
        .collect();

    log::debug!(
        target: targets::SLD,
        "{} answers in {} inferences",
        answers.len(),
        machine.inference_count,
    );

    SldOutcome {
        found: !answers.is_empty(),
        answers,
        inference_count: machine.inference_count,
        hit_limit: matches!(stop, Some(Stop::Limit)) || machine.depth_clipped,
        timed_out: matches!(stop, Some(Stop::Timeout)),
        cancelled: matches!(stop, Some(Stop::Cancelled)),
        trace: machine.trace,
    }
}

/// Why a search stopped before exhausting its branches.
enum Stop {
    /// The requested count of answers was reached.
    Enough,

    /// The inference budget was exhausted.
    Limit,

    /// The deadline passed.
    Timeout,

    /// Cancellation was requested.
    Cancelled,
}

struct Machine<'p> {
    program: &'p [HornClause],
    options: &'p SldOptions,
    inference_count: usize,
    rename_counter: usize,
    depth_clipped: bool,
    answers: Vec<Substitution>,
    trace: Vec<TraceStep>,
}

impl Machine<'_> {
    fn search(
        &mut self,
        goal: &[HornAtom],
        substitution: &Substitution,
        depth: usize,
    ) -> Result<(), Stop> {
        if self.options.cancel.cancelled() {
            return Err(Stop::Cancelled);
        }
        if self.options.deadline.expired() {
            return Err(Stop::Timeout);
        }

        let Some((selected, rest)) = goal.split_first() else {
            self.answers.push(substitution.clone());
            return match self.answers.len() >= self.options.max_answers {
                true => Err(Stop::Enough),
                false => Ok(()),
            };
        };

        if depth >= self.options.max_depth {
            self.depth_clipped = true;
            return Ok(());
        }

        let selected = apply_atom(selected, substitution);

        if self.options.arithmetic {
            match arithmetic::evaluate(&selected) {
                BuiltinOutcome::NotApplicable => {}

                BuiltinOutcome::Fail => return Ok(()),

                BuiltinOutcome::Succeed => {
                    self.step()?;
                    self.note(depth, &selected, "<builtin>");
                    return self.search(rest, substitution, depth + 1);
                }

                BuiltinOutcome::Bind(name, term) => {
                    self.step()?;
                    self.note(depth, &selected, "<builtin>");
                    let mut extended = substitution.clone();
                    extended.insert(name, term);
                    return self.search(rest, &extended, depth + 1);
                }
            }
        }

        for clause in self.program {
            if clause.head.predicate != selected.predicate
                || clause.head.args.len() != selected.args.len()
            {
                continue;
            }

            self.step()?;

            let renamed = self.rename_apart(clause);
            let mut extended = substitution.clone();

            if unify_atoms(&selected, &renamed.head, &mut extended) {
                self.note(depth, &selected, &clause.to_string());

                let mut next: Vec<HornAtom> =
                    Vec::with_capacity(renamed.body.len() + rest.len());
                next.extend(renamed.body);
                next.extend(rest.iter().cloned());

                self.search(&next, &extended, depth + 1)?;
            }
        }

        Ok(())
    }

    fn step(&mut self) -> Result<(), Stop> {
        self.inference_count += 1;
        match self.inference_count > self.options.max_inferences {
            true => Err(Stop::Limit),
            false => Ok(()),
        }
    }

    fn note(&mut self, depth: usize, goal: &HornAtom, clause: &str) {
        if self.options.collect_trace {
            self.trace.push(TraceStep {
                depth,
                goal: goal.to_string(),
                clause: clause.to_string(),
            });
        }
    }

    /// A copy of `clause` with every variable renamed fresh for this application.
    fn rename_apart(&mut self, clause: &HornClause) -> HornClause {
        self.rename_counter += 1;
        let suffix = self.rename_counter;

        let rename_term = |term: &Term| rename_with_suffix(term, suffix);

        HornClause {
            head: HornAtom::new(
                clause.head.predicate.clone(),
                clause.head.args.iter().map(rename_term).collect(),
            ),
            body: clause
                .body
                .iter()
                .map(|atom| {
                    HornAtom::new(
                        atom.predicate.clone(),
                        atom.args.iter().map(rename_term).collect(),
                    )
                })
                .collect(),
        }
    }
}

fn rename_with_suffix(term: &Term, suffix: usize) -> Term {
    match term {
        Term::Variable(name) => Term::var(format!("{name}@{suffix}")),
        Term::Constant(_) => term.clone(),
        Term::Function { name, args } => Term::function(
            name.clone(),
            args.iter().map(|arg| rename_with_suffix(arg, suffix)).collect(),
        ),
    }
}

/// Follows variable bindings at the top of `term`.
fn walk(term: &Term, substitution: &Substitution) -> Term {
    let mut current = term.clone();
    while let Term::Variable(name) = &current {
        match substitution.get(name) {
            Some(bound) => current = bound.clone(),
            None => break,
        }
    }
    current
}

/// Applies `substitution` throughout `term`.
pub fn apply(term: &Term, substitution: &Substitution) -> Term {
    let walked = walk(term, substitution);
    match walked {
        Term::Function { name, args } => Term::function(
            name,
            args.iter().map(|arg| apply(arg, substitution)).collect(),
        ),
        other => other,
    }
}

fn apply_atom(atom: &HornAtom, substitution: &Substitution) -> HornAtom {
    HornAtom::new(
        atom.predicate.clone(),
        atom.args.iter().map(|arg| apply(arg, substitution)).collect(),
    )
}

/// Whether the variable `name` occurs in `term` under `substitution`.
fn occurs(name: &str, term: &Term, substitution: &Substitution) -> bool {
    match walk(term, substitution) {
        Term::Variable(other) => other == name,
        Term::Constant(_) => false,
        Term::Function { args, .. } => args
            .iter()
            .any(|arg| occurs(name, arg, substitution)),
    }
}

/// Extends `substitution` to make `a` and `b` equal, or fails leaving it useless.
pub fn unify(a: &Term, b: &Term, substitution: &mut Substitution) -> bool {
    let a = walk(a, substitution);
    let b = walk(b, substitution);

    match (a, b) {
        (Term::Variable(x), Term::Variable(y)) if x == y => true,

        (Term::Variable(x), t) | (t, Term::Variable(x)) => {
            if occurs(&x, &t, substitution) {
                return false;
            }
            substitution.insert(x, t);
            true
        }

        (Term::Constant(a), Term::Constant(b)) => a == b,

        (
            Term::Function { name: f, args: fa },
            Term::Function { name: g, args: ga },
        ) => {
            f == g
                && fa.len() == ga.len()
                && fa
                    .iter()
                    .zip(ga.iter())
                    .all(|(x, y)| unify(x, y, substitution))
        }

        _ => false,
    }
}

fn unify_atoms(a: &HornAtom, b: &HornAtom, substitution: &mut Substitution) -> bool {
    a.predicate == b.predicate
        && a.args.len() == b.args.len()
        && a.args
            .iter()
            .zip(b.args.iter())
            .all(|(x, y)| unify(x, y, substitution))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(name: &str) -> Term {
        Term::constant(name)
    }

    #[test]
    fn unification() {
        let mut sub = Substitution::new();
        assert!(unify(&Term::var("X"), &constant("a"), &mut sub));
        assert_eq!(apply(&Term::var("X"), &sub), constant("a"));

        // A variable bound through another variable.
        let mut sub = Substitution::new();
        assert!(unify(&Term::var("X"), &Term::var("Y"), &mut sub));
        assert!(unify(&Term::var("Y"), &constant("b"), &mut sub));
        assert_eq!(apply(&Term::var("X"), &sub), constant("b"));
    }

    #[test]
    fn occurs_check() {
        let mut sub = Substitution::new();
        let recursive = Term::function("f", vec![Term::var("X")]);
        assert!(!unify(&Term::var("X"), &recursive, &mut sub));
    }

    #[test]
    fn mismatched_functions() {
        let mut sub = Substitution::new();
        let f = Term::function("f", vec![constant("a")]);
        let g = Term::function("g", vec![constant("a")]);
        assert!(!unify(&f, &g, &mut sub));
    }

    fn socrates_program() -> Vec<HornClause> {
        vec![
            HornClause::fact(HornAtom::new("man", vec![constant("socrates")])),
            HornClause::rule(
                HornAtom::new("mortal", vec![Term::var("X")]),
                vec![HornAtom::new("man", vec![Term::var("X")])],
            ),
        ]
    }

    #[test]
    fn ground_query() {
        let outcome = solve(
            &socrates_program(),
            &[HornAtom::new("mortal", vec![constant("socrates")])],
            &SldOptions::default(),
        );
        assert!(outcome.found);
        assert!(!outcome.hit_limit);
    }

    #[test]
    fn bindings_reported() {
        let outcome = solve(
            &socrates_program(),
            &[HornAtom::new("mortal", vec![Term::var("Who")])],
            &SldOptions::default(),
        );
        assert!(outcome.found);
        assert_eq!(outcome.answers[0].get("Who"), Some(&"socrates".to_string()));
    }

    #[test]
    fn failure_is_not_a_limit() {
        let outcome = solve(
            &socrates_program(),
            &[HornAtom::new("mortal", vec![constant("zeus")])],
            &SldOptions::default(),
        );
        assert!(!outcome.found);
        assert!(!outcome.hit_limit);
    }

    #[test]
    fn budget_exhaustion_is_flagged() {
        // left recursion: p(X) :- p(X).
        let looping = vec![HornClause::rule(
            HornAtom::new("p", vec![Term::var("X")]),
            vec![HornAtom::new("p", vec![Term::var("X")])],
        )];

        let options = SldOptions {
            max_inferences: 50,
            ..SldOptions::default()
        };
        let outcome = solve(
            &looping,
            &[HornAtom::new("p", vec![constant("a")])],
            &options,
        );
        assert!(!outcome.found);
        assert!(outcome.hit_limit);
    }

    #[test]
    fn multiple_answers_in_clause_order() {
        let program = vec![
            HornClause::fact(HornAtom::new("n", vec![constant("one")])),
            HornClause::fact(HornAtom::new("n", vec![constant("two")])),
            HornClause::fact(HornAtom::new("n", vec![constant("three")])),
        ];

        let options = SldOptions {
            max_answers: 2,
            ..SldOptions::default()
        };
        let outcome = solve(&program, &[HornAtom::new("n", vec![Term::var("X")])], &options);

        // The collector is bounded: two answers, in program order.
        assert_eq!(outcome.answers.len(), 2);
        assert_eq!(outcome.answers[0].get("X"), Some(&"one".to_string()));
        assert_eq!(outcome.answers[1].get("X"), Some(&"two".to_string()));
    }

    #[test]
    fn trace_collection() {
        let options = SldOptions {
            collect_trace: true,
            ..SldOptions::default()
        };
        let outcome = solve(
            &socrates_program(),
            &[HornAtom::new("mortal", vec![constant("socrates")])],
            &options,
        );
        assert!(outcome.found);
        assert_eq!(outcome.trace.len(), 2);
        assert!(outcome.trace[0].goal.starts_with("mortal"));
        assert!(outcome.trace[1].goal.starts_with("man"));
    }

    #[test]
    fn arithmetic_builtins_in_search() {
        let program = vec![HornClause::rule(
            HornAtom::new("double", vec![Term::var("X"), Term::var("Y")]),
            vec![HornAtom::new(
                "times",
                vec![Term::var("X"), constant("2"), Term::var("Y")],
            )],
        )];

        let options = SldOptions {
            arithmetic: true,
            ..SldOptions::default()
        };
        let outcome = solve(
            &program,
            &[HornAtom::new("double", vec![constant("21"), Term::var("Y")])],
            &options,
        );
        assert!(outcome.found);
        assert_eq!(outcome.answers[0].get("Y"), Some(&"42".to_string()));
    }
}
