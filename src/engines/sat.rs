/*!
The satisfiability engine: propositional checking, and first-order refutation by Herbrand grounding.

**Checking.** Each distinct ground atom --- identified by its canonical print --- maps to a solver atom, each clause to a disjunction of signed solver literals, and the [satisfiability core](crate::sat) decides the set.
An empty clause set is satisfiable; a clause with no literals is not.

**Proving.** The engine builds `⋀premises ∧ ¬goal`, clausifies under a single Skolem environment, widens with [equality axioms](crate::axioms::equality::equality_formulas) on request, and grounds: every ground term of the clause set is collected --- a dummy constant stands in when there are none --- and each clause is instantiated over the Cartesian product of its variables' candidates.
Clauses with more variables than the configured bound stay ungrounded, a *documented incompleteness*: an unsatisfiable grounding proves the goal, but a satisfiable one only says no refutation was found within this grounding --- reported as failed, never as disproved.

**Enumerating.** After each satisfying assignment the negation of the assignment --- restricted to the atoms of interest --- is added as a blocking clause and the solver re-run, until enough models arrive or the set closes.
The [model finder](crate::models) drives this loop for its grounded path.
*/

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{
    axioms::equality,
    clausal::{clause::Clause, Clausifier, SkolemEnv},
    config::{GroundingConfig, SatConfig},
    generic::deadline::Deadline,
    language::{
        ast::{Formula, Term},
        signature::Signature,
    },
    misc::log::targets,
    sat::{self, Report, SatLiteral},
    types::err::ErrorKind,
};

use super::{
    Capabilities, CancelFlag, Engine, EngineSession, ProofOptions, ProofOutcome, ProofStatus,
    ProofTask,
};

/// The result of a propositional check.
#[derive(Clone, Debug)]
pub struct SatCheck {
    /// Whether the clause set is satisfiable.
    pub sat: bool,

    /// A satisfying assignment over atom names, when one exists.
    pub model: Option<BTreeMap<String, bool>>,

    /// Decisions and conflicts of the underlying solve.
    pub decisions: u64,
    pub conflicts: u64,
}

/// Maps canonical atom prints to solver atoms and back.
#[derive(Debug, Default)]
struct AtomMap {
    by_name: HashMap<String, sat::Atom>,
    names: Vec<String>,
}

impl AtomMap {
    fn atom(&mut self, ctx: &mut sat::Context, name: &str) -> Result<sat::Atom, ErrorKind> {
        match self.by_name.get(name) {
            Some(atom) => Ok(*atom),
            None => {
                let atom = ctx.fresh_atom()?;
                self.by_name.insert(name.to_string(), atom);
                self.names.push(name.to_string());
                Ok(atom)
            }
        }
    }

    fn name_of(&self, atom: sat::Atom) -> &str {
        &self.names[atom as usize - 1]
    }
}

fn load_clauses(
    ctx: &mut sat::Context,
    map: &mut AtomMap,
    clauses: &[Clause],
) -> Result<(), ErrorKind> {
    for clause in clauses {
        let mut literals = Vec::with_capacity(clause.size());
        for literal in &clause.literals {
            let atom = map.atom(ctx, &literal.atom_key())?;
            literals.push(SatLiteral::new(atom, !literal.negated));
        }
        ctx.add_clause(literals)?;
    }
    Ok(())
}

fn wire_cancellation(ctx: &mut sat::Context, cancel: &CancelFlag, deadline: Deadline) {
    let cancel = cancel.clone();
    ctx.set_callback_terminate(Box::new(move || {
        cancel.cancelled() || deadline.expired()
    }));
}

/// Decides the satisfiability of a ground clause set.
pub fn check_clauses(clauses: &[Clause], cancel: &CancelFlag) -> Result<SatCheck, ErrorKind> {
    let mut ctx = sat::Context::default();
    let mut map = AtomMap::default();

    load_clauses(&mut ctx, &mut map, clauses)?;
    wire_cancellation(&mut ctx, cancel, Deadline::none());

    let report = ctx.solve()?;
    let model = match report {
        Report::Satisfiable => Some(
            ctx.atom_valued_pairs()
                .map(|(atom, value)| (map.name_of(atom).to_string(), value))
                .collect(),
        ),
        _ => None,
    };

    Ok(SatCheck {
        sat: report == Report::Satisfiable,
        model,
        decisions: ctx.counters.decisions,
        conflicts: ctx.counters.conflicts,
    })
}

/// Enumerates up to `count` satisfying assignments, restricted to the atoms of `interest`.
///
/// Blocking clauses quotient the enumeration: assignments agreeing on every atom of interest count once.
/// An empty interest set falls back to blocking full assignments.
pub fn enumerate_assignments(
    clauses: &[Clause],
    interest: &HashSet<String>,
    count: usize,
    deadline: &Deadline,
    cancel: &CancelFlag,
) -> Result<Vec<BTreeMap<String, bool>>, ErrorKind> {
    let mut ctx = sat::Context::default();
    let mut map = AtomMap::default();

    load_clauses(&mut ctx, &mut map, clauses)?;
    wire_cancellation(&mut ctx, cancel, *deadline);

    let mut assignments = Vec::new();

    while assignments.len() < count {
        match ctx.solve()? {
            Report::Satisfiable => {}
            _ => break,
        }

        let mut assignment = BTreeMap::new();
        let mut blocking = Vec::new();
        for (atom, value) in ctx.atom_valued_pairs() {
            let name = map.name_of(atom);
            if interest.is_empty() || interest.contains(name) {
                assignment.insert(name.to_string(), value);
                blocking.push(SatLiteral::new(atom, !value));
            }
        }
        assignments.push(assignment);

        ctx.clear_decisions();
        if blocking.is_empty() {
            break;
        }
        ctx.add_clause(blocking)?;
    }

    Ok(assignments)
}

/// The grounded refutation engine; stateless between calls.
#[derive(Clone, Debug, Default)]
pub struct SatEngine {
    pub sat_config: SatConfig,
    pub grounding: GroundingConfig,
}

impl SatEngine {
    pub fn new(sat_config: SatConfig, grounding: GroundingConfig) -> Self {
        SatEngine {
            sat_config,
            grounding,
        }
    }

    /// Clausifies `⋀premises ∧ ¬goal` and grounds the result.
    fn ground_refutation_set(
        &self,
        premises: &[Formula],
        goal: &Formula,
        options: &ProofOptions,
    ) -> Result<Vec<Clause>, ErrorKind> {
        let mut clausifier = Clausifier::default();
        clausifier.config.strategy = options.strategy;
        let mut env = SkolemEnv::default();

        // Free goal variables read universally, so the negation makes them existential
        // and Skolemization gives the refutation its witnesses.
        let mut formulas: Vec<Formula> = premises.to_vec();
        formulas.push(Formula::not(goal.clone().universal_closure()));

        if options.equality {
            let signature = Signature::of_all(premises.iter().chain(std::iter::once(goal)))?;
            formulas.extend(equality::equality_formulas(&signature));
        }

        let output = clausifier
            .clausify_all(formulas, &mut env)
            .map_err(ErrorKind::Clausify)?;

        Ok(ground(&output.clauses, self.grounding.max_ground_vars.value))
    }
}

impl Engine for SatEngine {
    fn name(&self) -> &'static str {
        "sat"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            horn: true,
            full_fol: true,
            native_equality: false,
            native_arithmetic: false,
            incremental_sessions: false,
        }
    }

    fn prove(&self, task: &ProofTask) -> Result<ProofOutcome, ErrorKind> {
        let clauses = self.ground_refutation_set(&task.premises, &task.goal, &task.options)?;

        let mut ctx = sat::Context::new(self.sat_config.clone());
        let mut map = AtomMap::default();
        load_clauses(&mut ctx, &mut map, &clauses)?;

        let cancel = task.options.cancel.clone();
        let deadline = task.options.deadline;
        ctx.set_callback_terminate(Box::new(move || {
            cancel.cancelled() || deadline.expired()
        }));

        let report = ctx.solve()?;
        log::debug!(
            target: targets::GROUNDING,
            "{} ground clauses, {report}",
            clauses.len(),
        );

        let status = match report {
            // The grounding is unsatisfiable, so the premises entail the goal.
            Report::Unsatisfiable => ProofStatus::Proved,

            // A counter-model exists within the grounding; as the grounding may be
            // incomplete this cannot claim a disproof.
            Report::Satisfiable => ProofStatus::Failed,

            Report::Unknown => ProofStatus::Timeout,
        };

        Ok(ProofOutcome {
            status,
            hit_limit: false,
            bindings: None,
            inference_count: ctx.counters.conflicts as usize,
            trace: Vec::new(),
            engine: self.name(),
        })
    }

    fn create_session(&self) -> Option<Box<dyn EngineSession>> {
        Some(Box::new(SatReplaySession {
            engine: self.clone(),
            premises: Vec::new(),
        }))
    }
}

/// Collects the ground terms a clause set mentions: constants, and ground function applications.
fn ground_terms(clauses: &[Clause]) -> Vec<Term> {
    let mut seen = HashSet::new();
    let mut terms = Vec::new();

    fn collect(term: &Term, seen: &mut HashSet<String>, terms: &mut Vec<Term>) {
        match term {
            Term::Variable(_) => {}
            Term::Constant(_) | Term::Function { .. } => {
                if term.is_ground() && seen.insert(term.to_string()) {
                    terms.push(term.clone());
                }
                if let Term::Function { args, .. } = term {
                    for arg in args {
                        collect(arg, seen, terms);
                    }
                }
            }
        }
    }

    for clause in clauses {
        for literal in &clause.literals {
            for arg in &literal.args {
                collect(arg, &mut seen, &mut terms);
            }
        }
    }

    terms
}

/// Grounds a clause set over its own ground terms.
///
/// Clauses with more than `max_vars` variables stay ungrounded and are dropped from the set, weakening completeness for those clauses only.
pub fn ground(clauses: &[Clause], max_vars: usize) -> Vec<Clause> {
    let mut universe = ground_terms(clauses);
    if universe.is_empty() {
        // A term to instantiate over; any name outside the user vocabulary serves.
        universe.push(Term::constant("herbrand_0"));
    }

    let mut grounded = Vec::new();

    for clause in clauses {
        let mut variables: Vec<String> = clause.variables().into_iter().collect();
        variables.sort();

        if variables.is_empty() {
            grounded.push(clause.clone());
            continue;
        }

        if variables.len() > max_vars {
            log::warn!(
                target: targets::GROUNDING,
                "clause with {} variables left ungrounded: {clause}",
                variables.len(),
            );
            continue;
        }

        // Odometer over universe^variables.
        let mut indices = vec![0_usize; variables.len()];
        loop {
            let mut instance = clause.clone();
            for literal in &mut instance.literals {
                for arg in &mut literal.args {
                    for (variable, &index) in variables.iter().zip(indices.iter()) {
                        arg.rename_variable(variable, &universe[index]);
                    }
                }
            }
            instance.dedup();
            if !instance.is_tautology() {
                grounded.push(instance);
            }

            let mut position = 0;
            loop {
                if position == indices.len() {
                    break;
                }
                indices[position] += 1;
                if indices[position] < universe.len() {
                    break;
                }
                indices[position] = 0;
                position += 1;
            }
            if position == indices.len() {
                break;
            }
        }
    }

    grounded
}

/// A session over the satisfiability engine.
///
/// The engine has no incremental mode; the session stores premises and replays the whole set on query, which keeps the session contract while the capability row reports `incremental_sessions: false`.
struct SatReplaySession {
    engine: SatEngine,
    premises: Vec<(String, Formula)>,
}

impl EngineSession for SatReplaySession {
    fn engine_name(&self) -> &'static str {
        "sat"
    }

    fn assert_formula(&mut self, source: &str, formula: &Formula) -> Result<(), ErrorKind> {
        self.premises.push((source.to_string(), formula.clone()));
        Ok(())
    }

    fn retract_formula(&mut self, source: &str) -> bool {
        match self
            .premises
            .iter()
            .position(|(stored, _)| stored == source)
        {
            Some(position) => {
                self.premises.remove(position);
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        self.premises.clear();
    }

    fn query(&mut self, goal: &Formula, options: &ProofOptions) -> Result<ProofOutcome, ErrorKind> {
        let task = ProofTask {
            premises: self
                .premises
                .iter()
                .map(|(_, formula)| formula.clone())
                .collect(),
            goal: goal.clone(),
            options: options.clone(),
        };
        self.engine.prove(&task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clausal::ClausifyInput;
    use crate::language::parser::parse;

    fn task(premises: &[&str], goal: &str, options: ProofOptions) -> ProofTask {
        ProofTask {
            premises: premises.iter().map(|s| parse(s).unwrap()).collect(),
            goal: parse(goal).unwrap(),
            options,
        }
    }

    fn clauses_of(source: &str) -> Vec<Clause> {
        let clausifier = Clausifier::default();
        let (output, _) = clausifier.clausify(ClausifyInput::Text(source)).unwrap();
        output.clauses
    }

    #[test]
    fn check_simple_sets() {
        let cancel = CancelFlag::default();

        let satisfiable = clauses_of("(P | Q) & -P");
        let check = check_clauses(&satisfiable, &cancel).unwrap();
        assert!(check.sat);
        assert_eq!(check.model.unwrap().get("Q"), Some(&true));

        let unsatisfiable = clauses_of("(P | Q) & -P & -Q");
        assert!(!check_clauses(&unsatisfiable, &cancel).unwrap().sat);
    }

    #[test]
    fn empty_set_is_satisfiable() {
        let check = check_clauses(&[], &CancelFlag::default()).unwrap();
        assert!(check.sat);
    }

    #[test]
    fn empty_clause_is_unsatisfiable() {
        let check = check_clauses(&[Clause::default()], &CancelFlag::default()).unwrap();
        assert!(!check.sat);
    }

    #[test]
    fn disjunctive_syllogism() {
        let engine = SatEngine::default();
        let outcome = engine
            .prove(&task(&["P | Q", "-P"], "Q", ProofOptions::default()))
            .unwrap();
        assert_eq!(outcome.status, ProofStatus::Proved);
    }

    #[test]
    fn propositional_tautology_from_no_premises() {
        let engine = SatEngine::default();
        let outcome = engine
            .prove(&task(&[], "P | -P", ProofOptions::default()))
            .unwrap();
        assert_eq!(outcome.status, ProofStatus::Proved);
    }

    #[test]
    fn grounded_universal_instantiation() {
        let engine = SatEngine::default();
        let outcome = engine
            .prove(&task(
                &["all x (man(x) -> mortal(x))", "man(socrates)"],
                "mortal(socrates)",
                ProofOptions::default(),
            ))
            .unwrap();
        assert_eq!(outcome.status, ProofStatus::Proved);
    }

    #[test]
    fn underivable_goal_fails() {
        let engine = SatEngine::default();
        let outcome = engine
            .prove(&task(&["P(alpha)"], "P(beta)", ProofOptions::default()))
            .unwrap();
        assert_eq!(outcome.status, ProofStatus::Failed);
    }

    #[test]
    fn equality_chain_by_axioms() {
        let engine = SatEngine::default();
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
    fn grounding_collects_nested_terms() {
        let clauses = clauses_of("P(f(alpha))");
        let universe = ground_terms(&clauses);
        let names: Vec<String> = universe.iter().map(Term::to_string).collect();
        assert!(names.contains(&"f(alpha)".to_string()));
        assert!(names.contains(&"alpha".to_string()));
    }

    #[test]
    fn wide_clauses_left_ungrounded() {
        // Five distinct variables, over the default bound of three.
        let clauses = clauses_of("all v all w all x all y all z (P(v,w,x,y,z))");
        let grounded = ground(&clauses, 3);
        assert!(grounded.is_empty());
    }

    #[test]
    fn enumeration_is_blocked_by_interest() {
        let clauses = clauses_of("P | Q");
        let interest: HashSet<String> = ["P".to_string()].into_iter().collect();
        let assignments = enumerate_assignments(
            &clauses,
            &interest,
            10,
            &Deadline::none(),
            &CancelFlag::default(),
        )
        .unwrap();

        // Restricted to P, only two assignments are distinguishable.
        assert!(assignments.len() <= 2);
    }
}
