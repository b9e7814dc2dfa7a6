/*!
The Horn resolution engine.

Premises are clausified, translated to a Horn program, and the goal is resolved against the program by the [machine].
A clause set which is not Horn is rejected --- the manager routes such problems to the satisfiability engine instead.

With equality enabled the program is rewritten into the generated `eq_fact` vocabulary and widened with the [depth-bounded equality program](crate::axioms::equality); the chain-depth countdown runs on the arithmetic builtins, so those are switched on alongside.

A single call runs an iterative-deepening ladder: resolution is attempted under a rising geometric sequence of inference limits until an answer arrives, the configured ceiling is reached, or the deadline passes.
Each rung reports through the progress callback, when one is given.
The engine also opens [incremental sessions](SldSession), which assert and retract premises clause-wise and replay nothing until asked.
*/

pub mod machine;

use machine::{SldOptions, SldOutcome};

use crate::{
    axioms::equality,
    clausal::{clause::EQUALITY_PREDICATE, ClausifyInput, Clausifier, SkolemEnv},
    config::SldConfig,
    horn::{
        self,
        program::{HornAtom, HornClause, HornProgram},
    },
    language::{
        ast::{Formula, Term},
        signature::Signature,
    },
    misc::log::targets,
    types::err::{EngineError, ErrorKind},
};

use super::{
    Capabilities, Engine, EngineSession, ProofOptions, ProofOutcome, ProofStatus, ProofTask,
};

/// The resolution engine; stateless between calls.
#[derive(Clone, Debug, Default)]
pub struct SldEngine {
    pub config: SldConfig,
}

impl SldEngine {
    pub fn new(config: SldConfig) -> Self {
        SldEngine { config }
    }

    /// Builds the Horn program of `premises`, goal atoms of `goal`, and the machine options of a call.
    fn prepare(
        &self,
        premises: &[Formula],
        goal: &Formula,
        options: &ProofOptions,
    ) -> Result<(HornProgram, Vec<HornAtom>, SldOptions), ErrorKind> {
        let clausifier = Clausifier::default();
        let mut env = SkolemEnv::default();

        let output = clausifier
            .clausify_all(premises.to_vec(), &mut env)
            .map_err(ErrorKind::Clausify)?;

        let translation = horn::program_of_clauses(&output.clauses)?;
        let mut program = translation.program;
        if !translation.denials.is_empty() {
            log::warn!(
                target: targets::SLD,
                "{} all-negative premise clauses set aside",
                translation.denials.len(),
            );
        }

        let mut goal_atoms = horn::goal_of_formula(goal)?;

        let mut arithmetic = options.arithmetic;
        if options.equality {
            let signature = Signature::of_all(premises.iter().chain(std::iter::once(goal)))?;
            let depth = self.config.equality_depth.value;

            equality::rewrite_program(&mut program, depth);
            equality::rewrite_goal(&mut goal_atoms, depth);
            program.extend(equality::equality_program(&signature, depth));

            // The chain depth counts down on the builtins.
            arithmetic = true;
        }

        let machine_options = SldOptions {
            max_inferences: options.max_inferences,
            arithmetic,
            collect_trace: options.include_trace,
            deadline: options.deadline,
            cancel: options.cancel.clone(),
            ..SldOptions::default()
        };

        Ok((program, goal_atoms, machine_options))
    }

    /// Resolution under a rising ladder of inference limits.
    fn deepening_solve(
        &self,
        program: &HornProgram,
        goal: &[HornAtom],
        machine_options: &SldOptions,
        options: &ProofOptions,
    ) -> SldOutcome {
        let ceiling = machine_options.max_inferences;
        let mut limit = self.config.deepening_start.value.min(ceiling);
        let mut spent = 0_usize;

        loop {
            let rung = SldOptions {
                max_inferences: limit,
                ..machine_options.clone()
            };

            let outcome = machine::solve(&program.clauses, goal, &rung);
            spent += outcome.inference_count;

            let exhausted = limit >= ceiling;
            if outcome.found
                || !outcome.hit_limit
                || outcome.timed_out
                || outcome.cancelled
                || exhausted
            {
                return SldOutcome {
                    inference_count: spent,
                    ..outcome
                };
            }

            if let Some(progress) = &options.progress {
                progress(limit);
            }
            log::debug!(target: targets::SLD, "deepening past {limit} inferences");

            limit = limit
                .saturating_mul(self.config.deepening_factor.value)
                .min(ceiling);
        }
    }
}

impl Engine for SldEngine {
    fn name(&self) -> &'static str {
        "horn"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            horn: true,
            full_fol: false,
            native_equality: false,
            native_arithmetic: true,
            incremental_sessions: true,
        }
    }

    fn prove(&self, task: &ProofTask) -> Result<ProofOutcome, ErrorKind> {
        let (program, goal, machine_options) =
            self.prepare(&task.premises, &task.goal, &task.options)?;

        let outcome = self.deepening_solve(&program, &goal, &machine_options, &task.options);
        Ok(outcome_of(outcome, self.name()))
    }

    fn create_session(&self) -> Option<Box<dyn EngineSession>> {
        Some(Box::new(SldSession {
            engine: self.clone(),
            entries: Vec::new(),
            skolem_watermark: 0,
        }))
    }
}

fn outcome_of(outcome: SldOutcome, engine: &'static str) -> ProofOutcome {
    let status = if outcome.found {
        ProofStatus::Proved
    } else if outcome.timed_out || outcome.cancelled {
        ProofStatus::Timeout
    } else {
        ProofStatus::Failed
    };

    ProofOutcome {
        status,
        hit_limit: outcome.hit_limit,
        bindings: outcome.answers.into_iter().next(),
        inference_count: outcome.inference_count,
        trace: outcome.trace,
        engine,
    }
}

/// An entry of a session: one asserted premise and the clauses it contributed.
struct SldEntry {
    source: String,
    clauses: Vec<HornClause>,
}

/// An incremental resolution session.
///
/// Each asserted premise is clausified on arrival under the session's Skolem environment and its clauses appended to the program; retraction removes the premise's clauses without touching the rest.
pub struct SldSession {
    engine: SldEngine,
    entries: Vec<SldEntry>,

    /// High-water mark of Skolem names across the session's lifetime.
    ///
    /// Premises are clausified one at a time; the watermark keeps names distinct even as entries are retracted.
    skolem_watermark: usize,
}

impl SldSession {
    fn program(&self) -> HornProgram {
        let mut program = HornProgram::default();
        for entry in &self.entries {
            program.extend(entry.clauses.iter().cloned());
        }
        program
    }
}

impl EngineSession for SldSession {
    fn engine_name(&self) -> &'static str {
        "horn"
    }

    fn assert_formula(&mut self, source: &str, formula: &Formula) -> Result<(), ErrorKind> {
        // Each premise is clausified alone, so retraction can drop exactly the
        // clauses the premise contributed. Reused `_vN` names across premises are
        // harmless --- clause variables are clause-scoped --- but Skolem names are
        // global, hence the watermark.
        let clausifier = Clausifier::default();
        let mut env = SkolemEnv::default();
        env.skolem_counter = self.skolem_watermark;

        let output = clausifier
            .clausify_into(ClausifyInput::Ast(formula.clone()), &mut env)
            .map_err(ErrorKind::Clausify)?;
        self.skolem_watermark = env.skolem_counter;

        let translation = horn::program_of_clauses(&output.clauses)?;
        if !translation.denials.is_empty() {
            return Err(ErrorKind::Engine(EngineError::Rejected(
                "an all-negative premise has no Horn form".to_string(),
            )));
        }

        self.entries.push(SldEntry {
            source: source.to_string(),
            clauses: translation.program.clauses,
        });
        Ok(())
    }

    fn retract_formula(&mut self, source: &str) -> bool {
        match self.entries.iter().position(|entry| entry.source == source) {
            Some(position) => {
                self.entries.remove(position);
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn query(&mut self, goal: &Formula, options: &ProofOptions) -> Result<ProofOutcome, ErrorKind> {
        let mut program = self.program();
        let mut goal_atoms = horn::goal_of_formula(goal)?;

        let mut arithmetic = options.arithmetic;
        if options.equality {
            let depth = self.engine.config.equality_depth.value;

            // The axioms must cover the asserted program, not only the goal.
            let mut signature = Signature::default();
            signature.extend(goal)?;
            extend_signature_from_program(&mut signature, &program);

            equality::rewrite_program(&mut program, depth);
            equality::rewrite_goal(&mut goal_atoms, depth);
            program.extend(equality::equality_program(&signature, depth));
            arithmetic = true;
        }

        let machine_options = SldOptions {
            max_inferences: options.max_inferences,
            arithmetic,
            collect_trace: options.include_trace,
            deadline: options.deadline,
            cancel: options.cancel.clone(),
            ..SldOptions::default()
        };

        let outcome =
            self.engine
                .deepening_solve(&program, &goal_atoms, &machine_options, options);
        Ok(outcome_of(outcome, "horn"))
    }
}

/// Folds the symbols of an assembled program into a signature.
fn extend_signature_from_program(signature: &mut Signature, program: &HornProgram) {
    fn collect_term(term: &Term, signature: &mut Signature) {
        match term {
            Term::Variable(_) => {}
            Term::Constant(name) => {
                signature.constants.insert(name.clone());
            }
            Term::Function { name, args } => {
                signature
                    .functions
                    .entry(name.clone())
                    .or_insert(args.len());
                for arg in args {
                    collect_term(arg, signature);
                }
            }
        }
    }

    for clause in &program.clauses {
        for atom in std::iter::once(&clause.head).chain(clause.body.iter()) {
            match atom.predicate == EQUALITY_PREDICATE {
                true => signature.has_equality = true,
                false => {
                    signature
                        .predicates
                        .entry(atom.predicate.clone())
                        .or_insert(atom.args.len());
                }
            }
            for arg in &atom.args {
                collect_term(arg, signature);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::parser::parse;

    fn task(premises: &[&str], goal: &str, options: ProofOptions) -> ProofTask {
        ProofTask {
            premises: premises.iter().map(|s| parse(s).unwrap()).collect(),
            goal: parse(goal).unwrap(),
            options,
        }
    }

    #[test]
    fn socrates_is_mortal() {
        let engine = SldEngine::default();
        let outcome = engine
            .prove(&task(
                &["all x (man(x) -> mortal(x))", "man(socrates)"],
                "mortal(socrates)",
                ProofOptions::default(),
            ))
            .unwrap();

        assert_eq!(outcome.status, ProofStatus::Proved);
        assert_eq!(outcome.engine, "horn");
    }

    #[test]
    fn unprovable_goal_fails_cleanly() {
        let engine = SldEngine::default();
        let outcome = engine
            .prove(&task(
                &["man(socrates)"],
                "mortal(socrates)",
                ProofOptions::default(),
            ))
            .unwrap();

        assert_eq!(outcome.status, ProofStatus::Failed);
        assert!(!outcome.hit_limit);
    }

    #[test]
    fn equality_chain() {
        let engine = SldEngine::default();
        let options = ProofOptions {
            equality: true,
            ..ProofOptions::default()
        };
        let outcome = engine
            .prove(&task(
                &["alpha = beta", "beta = gamma"],
                "alpha = gamma",
                options,
            ))
            .unwrap();

        assert_eq!(outcome.status, ProofStatus::Proved);
    }

    #[test]
    fn session_assert_query_retract() {
        let engine = SldEngine::default();
        let mut session = engine.create_session().unwrap();

        let rule = "all x (man(x) -> mortal(x))";
        session
            .assert_formula(rule, &parse(rule).unwrap())
            .unwrap();
        session
            .assert_formula("man(socrates)", &parse("man(socrates)").unwrap())
            .unwrap();

        let goal = parse("mortal(socrates)").unwrap();
        let outcome = session.query(&goal, &ProofOptions::default()).unwrap();
        assert_eq!(outcome.status, ProofStatus::Proved);

        // Retraction requires the byte-identical source.
        assert!(!session.retract_formula("man( socrates )"));
        assert!(session.retract_formula("man(socrates)"));

        let outcome = session.query(&goal, &ProofOptions::default()).unwrap();
        assert_eq!(outcome.status, ProofStatus::Failed);

        // Retracting an absent premise is a no-op.
        assert!(!session.retract_formula("man(socrates)"));
    }

    #[test]
    fn trace_when_requested() {
        let engine = SldEngine::default();
        let options = ProofOptions {
            include_trace: true,
            ..ProofOptions::default()
        };
        let outcome = engine
            .prove(&task(
                &["all x (man(x) -> mortal(x))", "man(socrates)"],
                "mortal(socrates)",
                options,
            ))
            .unwrap();

        assert!(!outcome.trace.is_empty());
    }
}
