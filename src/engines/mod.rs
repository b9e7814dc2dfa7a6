/*!
Reasoning engines, and the manager which drives them.

An engine is anything which can attempt a proof: it declares its [Capabilities] statically, proves through one method, and optionally opens an incremental [session](EngineSession).
Two engines are registered: [`horn`](sld) --- depth-bounded SLD resolution --- and [`sat`](sat) --- refutation by grounding over the [satisfiability core](crate::sat).
Further backends (an SMT solver, an answer-set solver) would slot in behind the same trait and capability row.

The [manager] inspects the shape of a problem --- arithmetic, equality, Horn-ness --- scores the engines against it, and dispatches to the best fit, falling back once on engine error, or [races](race) every capable engine and takes the first definitive answer.

Cancellation is cooperative throughout: every prove call carries a [CancelFlag] which engines check at their natural suspension points --- each resolution step, each decision, each domain size.
*/

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crate::{
    config::ClauseStrategy,
    generic::deadline::Deadline,
    language::ast::Formula,
    types::err::ErrorKind,
};

pub mod manager;
pub mod race;
pub mod sat;
pub mod score;
pub mod sld;

pub use manager::EngineManager;

/// A shared flag requesting cooperative cancellation.
///
/// Cloning shares the flag; every engine checks it at its suspension points.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        CancelFlag::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// What an engine declares about itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Handles Horn clause sets.
    pub horn: bool,

    /// Handles full first-order problems, by refutation or otherwise.
    pub full_fol: bool,

    /// Understands equality without generated axioms.
    pub native_equality: bool,

    /// Understands the arithmetic vocabulary.
    pub native_arithmetic: bool,

    /// Supports incremental sessions.
    pub incremental_sessions: bool,
}

/// A capability row of the manager's table.
#[derive(Clone, Copy, Debug)]
pub struct EngineInfo {
    pub name: &'static str,
    pub capabilities: Capabilities,
}

/// Options shared by every prove path.
#[derive(Clone)]
pub struct ProofOptions {
    /// Budget of inference steps for resolution.
    pub max_inferences: usize,

    /// Generate and inject equality axioms.
    pub equality: bool,

    /// Enable the arithmetic builtins.
    pub arithmetic: bool,

    /// The clausification strategy.
    pub strategy: ClauseStrategy,

    /// Collect a resolution trace.
    pub include_trace: bool,

    /// Wall-clock bound for the call.
    pub deadline: Deadline,

    /// Cooperative cancellation.
    pub cancel: CancelFlag,

    /// A callback invoked with each rung of an iterative-deepening ladder.
    pub progress: Option<Arc<dyn Fn(usize) + Send + Sync>>,
}

impl Default for ProofOptions {
    fn default() -> Self {
        ProofOptions {
            max_inferences: 10_000,
            equality: false,
            arithmetic: false,
            strategy: ClauseStrategy::Distribute,
            include_trace: false,
            deadline: Deadline::none(),
            cancel: CancelFlag::default(),
            progress: None,
        }
    }
}

impl std::fmt::Debug for ProofOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofOptions")
            .field("max_inferences", &self.max_inferences)
            .field("equality", &self.equality)
            .field("arithmetic", &self.arithmetic)
            .field("strategy", &self.strategy)
            .field("include_trace", &self.include_trace)
            .finish_non_exhaustive()
    }
}

/// A prepared proof task.
#[derive(Clone, Debug)]
pub struct ProofTask {
    /// The premises, parsed.
    pub premises: Vec<Formula>,

    /// The goal, parsed.
    pub goal: Formula,

    /// The options of the call.
    pub options: ProofOptions,
}

/// How a prove call ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProofStatus {
    /// The goal follows from the premises.
    Proved,

    /// No proof was found within the bounds.
    ///
    /// Never a disproof: a counter-model inside an incomplete grounding says nothing about the full problem.
    Failed,

    /// The deadline passed, or the call was cancelled.
    Timeout,
}

/// The result of a prove call.
#[derive(Clone, Debug)]
pub struct ProofOutcome {
    pub status: ProofStatus,

    /// Whether an inference or depth budget was exhausted on the way to [Failed](ProofStatus::Failed).
    pub hit_limit: bool,

    /// Bindings of goal variables, for engines which answer queries.
    pub bindings: Option<BTreeMap<String, String>>,

    /// Inference steps consumed, where the engine counts them.
    pub inference_count: usize,

    /// The resolution trace, when requested and available.
    pub trace: Vec<sld::machine::TraceStep>,

    /// The engine which produced the outcome.
    pub engine: &'static str,
}

impl ProofOutcome {
    /// Whether the outcome answers the question --- proved or failed, rather than interrupted.
    pub fn is_definitive(&self) -> bool {
        matches!(self.status, ProofStatus::Proved | ProofStatus::Failed)
    }
}

/// The engine trait.
pub trait Engine: Send + Sync {
    /// The name the manager and results refer to the engine by.
    fn name(&self) -> &'static str;

    /// The engine's capability row.
    fn capabilities(&self) -> Capabilities;

    /// Attempts the task.
    fn prove(&self, task: &ProofTask) -> Result<ProofOutcome, ErrorKind>;

    /// Opens an incremental session, for engines which support one.
    fn create_session(&self) -> Option<Box<dyn EngineSession>> {
        None
    }
}

/// An incremental engine session.
///
/// A session owns whatever native state the engine accumulates; dropping the session releases it.
/// The premise list held by the [service layer](crate::service::sessions) remains the source of truth --- any session must be reconstructible by replaying the premises in order.
pub trait EngineSession: Send {
    /// The engine behind the session.
    fn engine_name(&self) -> &'static str;

    /// Asserts a premise.
    fn assert_formula(&mut self, source: &str, formula: &Formula) -> Result<(), ErrorKind>;

    /// Retracts a premise by its byte-identical source; false if absent.
    fn retract_formula(&mut self, source: &str) -> bool;

    /// Removes every premise.
    fn clear(&mut self);

    /// Queries the asserted premises.
    fn query(&mut self, goal: &Formula, options: &ProofOptions) -> Result<ProofOutcome, ErrorKind>;
}
