/*!
The tool surface.

Every tool is a typed request in and a typed response out, serde-derived in camelCase so the wire form matches a JSON-RPC style transport; [dispatch](LogicService::dispatch) routes raw JSON by tool name for transports which carry values.

Results are structured, not thrown: a malformed formula comes back as a [Diagnostic] inside the response, a deadline as a `timeout` result, an exhausted inference budget as `failed` with the limit flagged --- distinguishable from a real disproof, which this service never claims from an incomplete grounding.
*/

use std::{
    collections::BTreeMap,
    sync::Arc,
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    config::{ClauseStrategy, Config},
    engines::{
        manager::EngineChoice, EngineManager, ProofOptions, ProofOutcome, ProofStatus, ProofTask,
    },
    generic::deadline::Deadline,
    language::{ast::Formula, parser, signature::Signature},
    models::{FindOptions, Model, ModelFinder},
    service::sessions::{Ontology, SessionTable},
    types::err::{Diagnostic, ErrorKind},
};

/// The service: engine manager, model finder, and session table behind one face.
pub struct LogicService {
    config: Config,
    manager: Arc<EngineManager>,
    finder: ModelFinder,
    sessions: Arc<SessionTable>,
}

impl LogicService {
    pub fn new(config: Config) -> Self {
        let manager = Arc::new(EngineManager::new(config.clone()));
        let finder = ModelFinder::new(config.model.clone());
        let sessions = SessionTable::new(config.session.clone());
        SessionTable::spawn_reaper(&sessions);

        LogicService {
            config,
            manager,
            finder,
            sessions,
        }
    }

    /// The session table, shared.
    pub fn sessions(&self) -> Arc<SessionTable> {
        Arc::clone(&self.sessions)
    }

    /// The engine manager, shared.
    pub fn manager(&self) -> Arc<EngineManager> {
        Arc::clone(&self.manager)
    }
}

fn parse_all(sources: &[String]) -> Result<Vec<Formula>, ErrorKind> {
    sources
        .iter()
        .map(|source| parser::parse(source).map_err(ErrorKind::Parse))
        .collect()
}

fn deadline_of(timeout_ms: Option<u64>) -> Deadline {
    match timeout_ms {
        Some(ms) => Deadline::after(Duration::from_millis(ms)),
        None => Deadline::none(),
    }
}

fn strategy_of(strategy: Option<&str>) -> ClauseStrategy {
    match strategy {
        Some("tseitin") => ClauseStrategy::Tseitin,
        _ => ClauseStrategy::Distribute,
    }
}

// ---------------------------------------------------------------------------
// prove

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProveRequest {
    pub premises: Vec<String>,
    pub goal: String,

    /// Budget of inference steps for the resolution engine.
    pub inference_limit: Option<usize>,

    pub enable_equality: bool,
    pub enable_arithmetic: bool,

    /// `auto` (default), `race`, or an engine name.
    pub engine: Option<String>,

    /// `standard` (default) or `tseitin`.
    pub strategy: Option<String>,

    pub include_trace: bool,
    pub timeout_ms: Option<u64>,
}

/// How a prove call ended, on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProveStatus {
    Proved,
    Failed,
    Error,
    Timeout,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProveStatistics {
    pub inference_count: usize,
    pub hit_limit: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProveResponse {
    pub success: bool,
    pub result: ProveStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bindings: Option<BTreeMap<String, String>>,

    /// One line per derived goal, when a trace was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_used: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<ProveStatistics>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Diagnostic>,
}

impl ProveResponse {
    fn of_error(error: &ErrorKind) -> Self {
        let result = match error {
            ErrorKind::Timeout => ProveStatus::Timeout,
            _ => ProveStatus::Error,
        };
        ProveResponse {
            success: false,
            result,
            message: Some(error.to_string()),
            bindings: None,
            proof: None,
            engine_used: None,
            statistics: None,
            error: Some(Diagnostic::from_error(error)),
        }
    }

    fn of_outcome(outcome: ProofOutcome) -> Self {
        let result = match outcome.status {
            ProofStatus::Proved => ProveStatus::Proved,
            ProofStatus::Failed => ProveStatus::Failed,
            ProofStatus::Timeout => ProveStatus::Timeout,
        };

        let proof = match outcome.trace.is_empty() {
            true => None,
            false => Some(
                outcome
                    .trace
                    .iter()
                    .map(|step| format!("{}: {} <- {}", step.depth, step.goal, step.clause))
                    .collect(),
            ),
        };

        ProveResponse {
            success: result == ProveStatus::Proved,
            result,
            message: None,
            bindings: outcome.bindings.filter(|bindings| !bindings.is_empty()),
            proof,
            engine_used: Some(outcome.engine.to_string()),
            statistics: Some(ProveStatistics {
                inference_count: outcome.inference_count,
                hit_limit: outcome.hit_limit,
            }),
            error: None,
        }
    }
}

impl LogicService {
    /// Decides whether the premises entail the goal.
    pub fn prove(&self, request: &ProveRequest) -> ProveResponse {
        let premises = match parse_all(&request.premises) {
            Ok(premises) => premises,
            Err(error) => return ProveResponse::of_error(&error),
        };
        let goal = match parser::parse(&request.goal) {
            Ok(goal) => goal,
            Err(error) => return ProveResponse::of_error(&ErrorKind::Parse(error)),
        };

        let options = ProofOptions {
            max_inferences: request
                .inference_limit
                .unwrap_or(self.config.sld.max_inferences.value),
            equality: request.enable_equality,
            arithmetic: request.enable_arithmetic,
            strategy: strategy_of(request.strategy.as_deref()),
            include_trace: request.include_trace,
            deadline: deadline_of(request.timeout_ms),
            ..ProofOptions::default()
        };

        let choice = match request.engine.as_deref() {
            None | Some("auto") => EngineChoice::Auto,
            Some("race") => EngineChoice::Race,
            Some(name) => EngineChoice::Named(name.to_string()),
        };

        let task = ProofTask {
            premises,
            goal,
            options,
        };

        match self.manager.prove(&task, &choice) {
            Ok(outcome) => ProveResponse::of_outcome(outcome),
            Err(error) => ProveResponse::of_error(&error),
        }
    }
}

// ---------------------------------------------------------------------------
// check-well-formed

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckWellFormedRequest {
    pub formulas: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaCheck {
    pub valid: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Diagnostic>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckWellFormedResponse {
    pub valid: bool,
    pub per_formula: Vec<FormulaCheck>,
}

impl LogicService {
    /// Validates formulas without proving anything.
    pub fn check_well_formed(&self, request: &CheckWellFormedRequest) -> CheckWellFormedResponse {
        let per_formula: Vec<FormulaCheck> = request
            .formulas
            .iter()
            .map(|source| check_formula(source))
            .collect();

        CheckWellFormedResponse {
            valid: per_formula.iter().all(|check| check.valid),
            per_formula,
        }
    }
}

fn check_formula(source: &str) -> FormulaCheck {
    let formula = match parser::parse(source) {
        Ok(formula) => formula,
        Err(error) => {
            let suggestions = error.suggestion.iter().map(|s| s.to_string()).collect();
            return FormulaCheck {
                valid: false,
                errors: vec![Diagnostic::from_error(&ErrorKind::Parse(error))],
                warnings: Vec::new(),
                suggestions,
            };
        }
    };

    // Signature extraction catches arity clashes.
    match Signature::of(&formula) {
        Ok(signature) => {
            let mut warnings = Vec::new();
            if !signature.free_variables.is_empty() {
                let names: Vec<String> = signature.free_variables.iter().cloned().collect();
                warnings.push(format!(
                    "free variables are read as universally quantified: {}",
                    names.join(", "),
                ));
            }
            FormulaCheck {
                valid: true,
                errors: Vec::new(),
                warnings,
                suggestions: Vec::new(),
            }
        }
        Err(error) => FormulaCheck {
            valid: false,
            errors: vec![Diagnostic::from_error(&ErrorKind::Parse(error))],
            warnings: Vec::new(),
            suggestions: Vec::new(),
        },
    }
}

// ---------------------------------------------------------------------------
// find-model / find-counterexample

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FindModelRequest {
    pub premises: Vec<String>,

    /// Search exactly this domain size.
    pub domain_size: Option<usize>,

    pub max_domain_size: Option<usize>,
    pub use_sat: bool,
    pub enable_symmetry: Option<bool>,
    pub count: Option<usize>,
    pub timeout_ms: Option<u64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FindCounterexampleRequest {
    pub goal: String,

    #[serde(flatten)]
    pub base: FindModelRequest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindStatus {
    ModelFound,
    NoModel,
    Error,
    Timeout,
}

/// A model in wire form.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelJson {
    pub domain_size: usize,
    pub constants: BTreeMap<String, usize>,
    pub functions: BTreeMap<String, Vec<FunctionEntry>>,
    pub predicates: BTreeMap<String, Vec<Vec<usize>>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEntry {
    pub args: Vec<usize>,
    pub value: usize,
}

impl From<&Model> for ModelJson {
    fn from(model: &Model) -> Self {
        ModelJson {
            domain_size: model.domain_size,
            constants: model.constants.clone(),
            functions: model
                .functions
                .iter()
                .map(|(name, table)| {
                    let entries = table
                        .iter()
                        .map(|(args, value)| FunctionEntry {
                            args: args.clone(),
                            value: *value,
                        })
                        .collect();
                    (name.clone(), entries)
                })
                .collect(),
            predicates: model
                .predicates
                .iter()
                .map(|(name, extension)| (name.clone(), extension.iter().cloned().collect()))
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindModelResponse {
    pub success: bool,
    pub result: FindStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelJson>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<ModelJson>>,

    /// The stable interpretation string of the first model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Diagnostic>,
}

impl FindModelResponse {
    fn of_error(error: &ErrorKind) -> Self {
        FindModelResponse {
            success: false,
            result: match error {
                ErrorKind::Timeout => FindStatus::Timeout,
                _ => FindStatus::Error,
            },
            model: None,
            models: None,
            interpretation: None,
            error: Some(Diagnostic::from_error(error)),
        }
    }

    fn of_models(models: &[Model], many: bool, timed_out: bool) -> Self {
        match models.first() {
            None => FindModelResponse {
                success: false,
                result: match timed_out {
                    true => FindStatus::Timeout,
                    false => FindStatus::NoModel,
                },
                model: None,
                models: None,
                interpretation: None,
                error: None,
            },
            Some(first) => FindModelResponse {
                success: true,
                result: FindStatus::ModelFound,
                model: (!many).then(|| ModelJson::from(first)),
                models: many.then(|| models.iter().map(ModelJson::from).collect()),
                interpretation: Some(first.interpretation()),
                error: None,
            },
        }
    }
}

impl LogicService {
    fn find_options(&self, request: &FindModelRequest) -> FindOptions {
        FindOptions {
            domain_size: request.domain_size,
            max_domain_size: request
                .max_domain_size
                .unwrap_or(self.config.model.max_domain_size.value),
            use_sat: request.use_sat,
            symmetry: request.enable_symmetry.unwrap_or(true),
            count: request.count.unwrap_or(1).max(1),
            deadline: deadline_of(
                request
                    .timeout_ms
                    .or(Some(self.config.model.timeout.value.as_millis() as u64)),
            ),
            ..FindOptions::default()
        }
    }

    /// Searches for finite models of the premises.
    pub fn find_model(&self, request: &FindModelRequest) -> FindModelResponse {
        let premises = match parse_all(&request.premises) {
            Ok(premises) => premises,
            Err(error) => return FindModelResponse::of_error(&error),
        };

        let options = self.find_options(request);
        match self.finder.find_models(&premises, &options) {
            Ok(outcome) => {
                FindModelResponse::of_models(&outcome.models, options.count > 1, outcome.timed_out)
            }
            Err(error) => FindModelResponse::of_error(&error),
        }
    }

    /// Searches for a model of the premises and the negated goal.
    pub fn find_counterexample(&self, request: &FindCounterexampleRequest) -> FindModelResponse {
        let premises = match parse_all(&request.base.premises) {
            Ok(premises) => premises,
            Err(error) => return FindModelResponse::of_error(&error),
        };
        let goal = match parser::parse(&request.goal) {
            Ok(goal) => goal,
            Err(error) => return FindModelResponse::of_error(&ErrorKind::Parse(error)),
        };

        let options = self.find_options(&request.base);
        match self.finder.find_counterexample(&premises, &goal, &options) {
            Ok(outcome) => {
                FindModelResponse::of_models(&outcome.models, options.count > 1, outcome.timed_out)
            }
            Err(error) => FindModelResponse::of_error(&error),
        }
    }
}

// ---------------------------------------------------------------------------
// session tools

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateSessionRequest {
    pub ttl_minutes: Option<u64>,
    pub ontology: Option<Ontology>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_used: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub premises: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub retracted: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Diagnostic>,
}

impl SessionResponse {
    fn ok() -> Self {
        SessionResponse {
            success: true,
            session_id: None,
            engine_used: None,
            premises: None,
            retracted: None,
            error: None,
        }
    }

    fn of_error(error: &ErrorKind) -> Self {
        SessionResponse {
            success: false,
            error: Some(Diagnostic::from_error(error)),
            ..SessionResponse::ok()
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionPremiseRequest {
    pub session_id: String,
    pub premise: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionIdRequest {
    pub session_id: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuerySessionRequest {
    pub session_id: String,
    pub goal: String,
    pub inference_limit: Option<usize>,
    pub enable_equality: bool,
    pub enable_arithmetic: bool,
    pub include_trace: bool,
    pub timeout_ms: Option<u64>,
}

impl LogicService {
    pub fn create_session(&self, request: &CreateSessionRequest) -> SessionResponse {
        let ttl = request.ttl_minutes.map(|minutes| Duration::from_secs(minutes * 60));
        match self.sessions.create(ttl, request.ontology.clone()) {
            Ok(id) => SessionResponse {
                session_id: Some(id),
                ..SessionResponse::ok()
            },
            Err(error) => SessionResponse::of_error(&error),
        }
    }

    pub fn assert_premise(&self, request: &SessionPremiseRequest) -> SessionResponse {
        let formula = match parser::parse(&request.premise) {
            Ok(formula) => formula,
            Err(error) => return SessionResponse::of_error(&ErrorKind::Parse(error)),
        };

        let manager = Arc::clone(&self.manager);
        let outcome = self.sessions.with_session(&request.session_id, |session| {
            session.assert_premise(&manager, &request.premise, formula)?;
            Ok((session.engine_name(), session.premises.clone()))
        });

        match outcome {
            Ok((engine, premises)) => SessionResponse {
                engine_used: engine.map(str::to_string),
                premises: Some(premises),
                ..SessionResponse::ok()
            },
            Err(error) => SessionResponse::of_error(&error),
        }
    }

    pub fn query_session(&self, request: &QuerySessionRequest) -> ProveResponse {
        let goal = match parser::parse(&request.goal) {
            Ok(goal) => goal,
            Err(error) => return ProveResponse::of_error(&ErrorKind::Parse(error)),
        };

        let options = ProofOptions {
            max_inferences: request
                .inference_limit
                .unwrap_or(self.config.sld.max_inferences.value),
            equality: request.enable_equality,
            arithmetic: request.enable_arithmetic,
            include_trace: request.include_trace,
            deadline: deadline_of(request.timeout_ms),
            ..ProofOptions::default()
        };

        let manager = Arc::clone(&self.manager);
        let outcome = self
            .sessions
            .with_session(&request.session_id, |session| {
                session.query(&manager, &goal, &options)
            });

        match outcome {
            Ok(outcome) => ProveResponse::of_outcome(outcome),
            Err(error) => ProveResponse::of_error(&error),
        }
    }

    pub fn retract_premise(&self, request: &SessionPremiseRequest) -> SessionResponse {
        let manager = Arc::clone(&self.manager);
        let outcome = self.sessions.with_session(&request.session_id, |session| {
            session.retract_premise(&manager, &request.premise)
        });

        match outcome {
            Ok(retracted) => SessionResponse {
                retracted: Some(retracted),
                ..SessionResponse::ok()
            },
            Err(error) => SessionResponse::of_error(&error),
        }
    }

    pub fn list_premises(&self, request: &SessionIdRequest) -> SessionResponse {
        let outcome = self
            .sessions
            .with_session(&request.session_id, |session| Ok(session.premises.clone()));

        match outcome {
            Ok(premises) => SessionResponse {
                premises: Some(premises),
                ..SessionResponse::ok()
            },
            Err(error) => SessionResponse::of_error(&error),
        }
    }

    pub fn clear_session(&self, request: &SessionIdRequest) -> SessionResponse {
        let outcome = self.sessions.with_session(&request.session_id, |session| {
            session.clear();
            Ok(())
        });

        match outcome {
            Ok(()) => SessionResponse::ok(),
            Err(error) => SessionResponse::of_error(&error),
        }
    }

    pub fn delete_session(&self, request: &SessionIdRequest) -> SessionResponse {
        match self.sessions.delete(&request.session_id) {
            Ok(()) => SessionResponse::ok(),
            Err(error) => SessionResponse::of_error(&error),
        }
    }
}

// ---------------------------------------------------------------------------
// dispatch

impl LogicService {
    /// Routes a raw JSON request by tool name.
    pub fn dispatch(&self, tool: &str, params: serde_json::Value) -> serde_json::Value {
        fn run<Request, Response>(
            params: serde_json::Value,
            handler: impl FnOnce(&Request) -> Response,
        ) -> serde_json::Value
        where
            Request: for<'de> Deserialize<'de>,
            Response: Serialize,
        {
            match serde_json::from_value::<Request>(params) {
                Ok(request) => serde_json::to_value(handler(&request))
                    .unwrap_or_else(|error| malformed(&error.to_string())),
                Err(error) => malformed(&error.to_string()),
            }
        }

        fn malformed(message: &str) -> serde_json::Value {
            serde_json::json!({
                "success": false,
                "result": "error",
                "error": { "code": "EngineError", "message": message },
            })
        }

        match tool {
            "prove" => run(params, |r| self.prove(r)),
            "check-well-formed" => run(params, |r| self.check_well_formed(r)),
            "find-model" => run(params, |r| self.find_model(r)),
            "find-counterexample" => run(params, |r| self.find_counterexample(r)),
            "create-session" => run(params, |r| self.create_session(r)),
            "assert-premise" => run(params, |r| self.assert_premise(r)),
            "query-session" => run(params, |r| self.query_session(r)),
            "retract-premise" => run(params, |r| self.retract_premise(r)),
            "list-premises" => run(params, |r| self.list_premises(r)),
            "clear-session" => run(params, |r| self.clear_session(r)),
            "delete-session" => run(params, |r| self.delete_session(r)),
            other => malformed(&format!("no tool named '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> LogicService {
        LogicService::new(Config::default())
    }

    #[test]
    fn prove_socrates() {
        let response = service().prove(&ProveRequest {
            premises: vec![
                "all x (man(x) -> mortal(x))".to_string(),
                "man(socrates)".to_string(),
            ],
            goal: "mortal(socrates)".to_string(),
            ..ProveRequest::default()
        });

        assert!(response.success);
        assert_eq!(response.result, ProveStatus::Proved);
        assert_eq!(response.engine_used.as_deref(), Some("horn"));
    }

    #[test]
    fn prove_parse_error_is_structured() {
        let response = service().prove(&ProveRequest {
            premises: vec!["man(socrates".to_string()],
            goal: "mortal(socrates)".to_string(),
            ..ProveRequest::default()
        });

        assert!(!response.success);
        assert_eq!(response.result, ProveStatus::Error);
        let diagnostic = response.error.unwrap();
        assert_eq!(
            diagnostic.suggestion.as_deref(),
            Some("check for unbalanced parentheses")
        );
    }

    #[test]
    fn check_well_formed_mixes() {
        let response = service().check_well_formed(&CheckWellFormedRequest {
            formulas: vec![
                "all x (man(x) -> mortal(x))".to_string(),
                "p(a) & p(a, b)".to_string(),
            ],
        });

        assert!(!response.valid);
        assert!(response.per_formula[0].valid);
        assert!(!response.per_formula[1].valid);
    }

    #[test]
    fn find_model_interpretation() {
        let response = service().find_model(&FindModelRequest {
            premises: vec![
                "exists x P(x)".to_string(),
                "all x (P(x) -> Q(x))".to_string(),
            ],
            ..FindModelRequest::default()
        });

        assert!(response.success);
        assert_eq!(response.result, FindStatus::ModelFound);
        let interpretation = response.interpretation.unwrap();
        assert!(interpretation.starts_with("Domain size: 1\n"));
        assert!(interpretation.contains("P: {(0)}"));
        assert!(interpretation.contains("Q: {(0)}"));
    }

    #[test]
    fn counterexample_separates_constants() {
        let response = service().find_counterexample(&FindCounterexampleRequest {
            goal: "P(b)".to_string(),
            base: FindModelRequest {
                premises: vec!["P(a)".to_string()],
                ..FindModelRequest::default()
            },
        });

        assert!(response.success);
        let model = response.model.unwrap();
        assert!(model.domain_size >= 2);
        assert_eq!(model.constants.get("a"), Some(&0));
        assert_eq!(model.constants.get("b"), Some(&1));
        assert_eq!(model.predicates.get("P"), Some(&vec![vec![0]]));
    }

    #[test]
    fn dispatch_round_trip() {
        let response = service().dispatch(
            "prove",
            serde_json::json!({
                "premises": ["P | Q", "-P"],
                "goal": "Q",
            }),
        );

        assert_eq!(response["success"], serde_json::json!(true));
        assert_eq!(response["result"], serde_json::json!("proved"));
        assert_eq!(response["engineUsed"], serde_json::json!("sat"));
    }

    #[test]
    fn dispatch_unknown_tool() {
        let response = service().dispatch("transmogrify", serde_json::json!({}));
        assert_eq!(response["success"], serde_json::json!(false));
    }

    #[test]
    fn session_tools_round_trip() {
        let service = service();

        let created = service.create_session(&CreateSessionRequest::default());
        let id = created.session_id.unwrap();

        for premise in ["all x (man(x) -> mortal(x))", "man(socrates)"] {
            let response = service.assert_premise(&SessionPremiseRequest {
                session_id: id.clone(),
                premise: premise.to_string(),
            });
            assert!(response.success);
        }

        let listed = service.list_premises(&SessionIdRequest {
            session_id: id.clone(),
        });
        assert_eq!(listed.premises.unwrap().len(), 2);

        let queried = service.query_session(&QuerySessionRequest {
            session_id: id.clone(),
            goal: "mortal(socrates)".to_string(),
            ..QuerySessionRequest::default()
        });
        assert_eq!(queried.result, ProveStatus::Proved);

        let deleted = service.delete_session(&SessionIdRequest {
            session_id: id.clone(),
        });
        assert!(deleted.success);

        let missing = service.list_premises(&SessionIdRequest { session_id: id });
        assert!(!missing.success);
    }
}
