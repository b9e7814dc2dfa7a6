/*!
Error types used in the library.

- Some of these are external and expected during use --- e.g. a [ParseError] is the ordinary consequence of a malformed formula.
- Some of these are internally expected --- e.g. clausification bounds are enforced by returning a [ClausifyError], which a caller may react to by switching strategy.
- Others indicate a defect, and are very unlikely to occur --- e.g. a corrupt watch list in the satisfiability core.

Names of the error enums --- for the most part --- match the module they originate from, and each is folded into [ErrorKind] through a `From` impl so `?` may be used freely at module boundaries.

Limit exhaustion is *not* an error.
An engine which runs out of inference steps reports a failed proof with the limit flagged, and a deadline which passes is reported as [ErrorKind::Timeout], distinguishable from every other outcome.
*/

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A union of varied error kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// An error from the lexer, parser, or signature extraction.
    Parse(ParseError),

    /// An error during clausification.
    Clausify(ClausifyError),

    /// An error during Horn translation.
    Horn(HornError),

    /// An error from an engine, or from engine selection.
    Engine(EngineError),

    /// An error in the satisfiability core.
    Sat(SatError),

    /// An error reading a DIMACS input.
    Dimacs(DimacsError),

    /// An error from the session layer.
    Session(SessionError),

    /// An error from the model finder.
    Model(ModelError),

    /// A deadline passed before the operation completed.
    Timeout,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "{e}"),
            Self::Clausify(e) => write!(f, "{e}"),
            Self::Horn(e) => write!(f, "{e}"),
            Self::Engine(e) => write!(f, "{e}"),
            Self::Sat(e) => write!(f, "{e}"),
            Self::Dimacs(e) => write!(f, "{e}"),
            Self::Session(e) => write!(f, "{e}"),
            Self::Model(e) => write!(f, "{e}"),
            Self::Timeout => write!(f, "the deadline passed before the operation completed"),
        }
    }
}

/// A half-open span of the source text, with the line and column of its start.
///
/// Lines and columns are 1-indexed, offsets 0-indexed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    /// Byte offset of the first character of the span.
    pub start: usize,

    /// Byte offset one past the last character of the span.
    pub end: usize,

    /// 1-indexed line of `start`.
    pub line: usize,

    /// 1-indexed column of `start`.
    pub col: usize,
}

impl SourceSpan {
    /// The span of a single character at `offset` within `source`.
    pub fn at(source: &str, offset: usize) -> Self {
        let mut line = 1;
        let mut col = 1;
        for (i, c) in source.char_indices() {
            if i >= offset {
                break;
            }
            if c == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        SourceSpan {
            start: offset,
            end: offset + 1,
            line,
            col,
        }
    }
}

/// Errors from the lexer, the parser, or signature extraction.
///
/// A parse error aborts the parse --- no partial tree is returned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,

    /// Where it went wrong.
    pub span: SourceSpan,

    /// A one-line hint from a fixed table, when the shape of the failure is recognised.
    pub suggestion: Option<&'static str>,

    /// The offending input.
    pub context: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at line {}, column {}",
            self.kind, self.span.line, self.span.col
        )?;
        if let Some(hint) = self.suggestion {
            write!(f, " ({hint})")?;
        }
        Ok(())
    }
}

/// The varieties of parse failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A character the lexer has no use for.
    UnexpectedCharacter(char),

    /// A token other than the token required by the grammar.
    UnexpectedToken { found: String, expected: &'static str },

    /// The input ended while some production was open.
    UnexpectedEnd,

    /// A predicate or function used at two different arities.
    ArityMismatch {
        name: String,
        first: usize,
        second: usize,
    },

    /// Input remained after a complete formula.
    TrailingInput,
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedCharacter(c) => write!(f, "unexpected character '{c}'"),
            Self::UnexpectedToken { found, expected } => {
                write!(f, "unexpected token '{found}', expected {expected}")
            }
            Self::UnexpectedEnd => write!(f, "unexpected end of input"),
            Self::ArityMismatch {
                name,
                first,
                second,
            } => write!(f, "'{name}' used with arity {first} and with arity {second}"),
            Self::TrailingInput => write!(f, "input continues after a complete formula"),
        }
    }
}

impl From<ParseError> for ErrorKind {
    fn from(e: ParseError) -> Self {
        ErrorKind::Parse(e)
    }
}

/// Errors during clausification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClausifyError {
    /// The deadline passed mid-pipeline.
    Timeout,

    /// The clause set exceeded the configured clause count.
    TooManyClauses { count: usize, limit: usize },

    /// Some clause exceeded the configured literal count.
    ClauseTooLong { size: usize, limit: usize },

    /// The text entry point was used and the text failed to parse.
    Parse(ParseError),
}

impl std::fmt::Display for ClausifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "clausification passed its deadline"),
            Self::TooManyClauses { count, limit } => {
                write!(f, "clausification produced {count} clauses, over the limit of {limit}")
            }
            Self::ClauseTooLong { size, limit } => {
                write!(f, "clausification produced a clause of {size} literals, over the limit of {limit}")
            }
            Self::Parse(e) => write!(f, "{e}"),
        }
    }
}

impl From<ClausifyError> for ErrorKind {
    fn from(e: ClausifyError) -> Self {
        ErrorKind::Clausify(e)
    }
}

impl From<ParseError> for ClausifyError {
    fn from(e: ParseError) -> Self {
        ClausifyError::Parse(e)
    }
}

/// Errors during translation of clauses to a Horn program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HornError {
    /// A clause with two or more positive literals.
    NotHorn { positive_literals: usize },

    /// A universally quantified query.
    ///
    /// The resolution engine answers existential queries; a universal claim must go through refutation instead.
    UniversalGoal,

    /// A query using a connective the resolution engine cannot search under.
    UnsupportedGoal,
}

impl std::fmt::Display for HornError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotHorn { positive_literals } => {
                write!(f, "a clause with {positive_literals} positive literals is not Horn")
            }
            Self::UniversalGoal => {
                write!(f, "universally quantified goals are not supported by the resolution engine")
            }
            Self::UnsupportedGoal => {
                write!(f, "queries are conjunctions of atoms, optionally under existential quantifiers")
            }
        }
    }
}

impl From<HornError> for ErrorKind {
    fn from(e: HornError) -> Self {
        ErrorKind::Horn(e)
    }
}

/// Errors from an engine, or from engine selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// A request named an engine the manager does not know.
    UnknownEngine(String),

    /// No registered engine is capable of the problem.
    NoCapableEngine,

    /// Every dispatched engine failed; the messages are collected in dispatch order.
    AllFailed(Vec<String>),

    /// The engine rejected the problem --- e.g. the resolution engine was handed a non-Horn clause set.
    Rejected(String),

    /// The engine does not support incremental sessions.
    NoSessionSupport(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownEngine(name) => write!(f, "no engine named '{name}'"),
            Self::NoCapableEngine => write!(f, "no registered engine is capable of the problem"),
            Self::AllFailed(messages) => {
                write!(f, "every capable engine failed: {}", messages.join("; "))
            }
            Self::Rejected(why) => write!(f, "{why}"),
            Self::NoSessionSupport(name) => {
                write!(f, "engine '{name}' does not support incremental sessions")
            }
        }
    }
}

impl From<EngineError> for ErrorKind {
    fn from(e: EngineError) -> Self {
        ErrorKind::Engine(e)
    }
}

/// Errors in the satisfiability core.
///
/// With the exception of [SatError::AtomsExhausted] these indicate a defect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SatError {
    /// There are no more fresh atoms.
    AtomsExhausted,

    /// A clause key failed to unlock a clause.
    MissingClause,

    /// Some corruption in the watched literals of a clause.
    CorruptWatch,

    /// Resolution exhausted the trail without finding a unique implication point.
    NoAssertion,
}

impl std::fmt::Display for SatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AtomsExhausted => write!(f, "no fresh atoms remain"),
            Self::MissingClause => write!(f, "a clause key failed to unlock a clause"),
            Self::CorruptWatch => write!(f, "corrupt watch list"),
            Self::NoAssertion => write!(f, "conflict analysis failed to find an asserting clause"),
        }
    }
}

impl From<SatError> for ErrorKind {
    fn from(e: SatError) -> Self {
        ErrorKind::Sat(e)
    }
}

/// Errors reading a DIMACS input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DimacsError {
    /// Some issue with the problem specification line.
    ProblemSpecification,

    /// Some unspecific problem at a specific line.
    Line(usize),

    /// A literal outside the range the problem line declared.
    AtomRange(usize),
}

impl std::fmt::Display for DimacsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProblemSpecification => write!(f, "malformed problem specification"),
            Self::Line(line) => write!(f, "malformed input at line {line}"),
            Self::AtomRange(line) => {
                write!(f, "literal outside the declared atom range at line {line}")
            }
        }
    }
}

impl From<DimacsError> for ErrorKind {
    fn from(e: DimacsError) -> Self {
        ErrorKind::Dimacs(e)
    }
}

/// Errors from the session layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// No live session carries the given id.
    NotFound(String),

    /// The session table is full.
    Limit(usize),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "no session '{id}'"),
            Self::Limit(max) => write!(f, "the limit of {max} concurrent sessions was reached"),
        }
    }
}

impl From<SessionError> for ErrorKind {
    fn from(e: SessionError) -> Self {
        ErrorKind::Session(e)
    }
}

/// Errors from the model finder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelError {
    /// A requested domain size outside the supported range.
    InvalidDomain { requested: usize, max: usize },
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDomain { requested, max } => {
                write!(f, "domain size {requested} is outside the supported range 1..={max}")
            }
        }
    }
}

impl From<ModelError> for ErrorKind {
    fn from(e: ModelError) -> Self {
        ErrorKind::Model(e)
    }
}

/// The stable error codes of the tool surface.
///
/// Every [ErrorKind] maps to exactly one code; clients match on these rather than on messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    ParseError,
    ClausificationError,
    ClausificationBlowup,
    InferenceLimit,
    Timeout,
    NoModel,
    InvalidDomain,
    SessionNotFound,
    SessionLimit,
    EngineError,
    InvalidPredicate,
    MathError,
    Unsatisfiable,
}

/// A wire-format rendering of an error, carried by tool responses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The stable code.
    pub code: ErrorCode,

    /// A human-readable message.
    pub message: String,

    /// The source span, when the error is anchored to input text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<SourceSpan>,

    /// A one-line hint, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// The offending formula, when the error is anchored to input text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Free-form details.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

impl Diagnostic {
    /// Renders an [ErrorKind] for the tool surface.
    pub fn from_error(error: &ErrorKind) -> Self {
        let code = match error {
            ErrorKind::Parse(_) => ErrorCode::ParseError,
            ErrorKind::Clausify(ClausifyError::TooManyClauses { .. })
            | ErrorKind::Clausify(ClausifyError::ClauseTooLong { .. }) => {
                ErrorCode::ClausificationBlowup
            }
            ErrorKind::Clausify(ClausifyError::Parse(_)) => ErrorCode::ParseError,
            ErrorKind::Clausify(_) => ErrorCode::ClausificationError,
            ErrorKind::Dimacs(_) => ErrorCode::ParseError,
            ErrorKind::Horn(_) | ErrorKind::Engine(_) | ErrorKind::Sat(_) => ErrorCode::EngineError,
            ErrorKind::Session(SessionError::NotFound(_)) => ErrorCode::SessionNotFound,
            ErrorKind::Session(SessionError::Limit(_)) => ErrorCode::SessionLimit,
            ErrorKind::Model(ModelError::InvalidDomain { .. }) => ErrorCode::InvalidDomain,
            ErrorKind::Timeout => ErrorCode::Timeout,
        };

        let (span, suggestion, context) = match error {
            ErrorKind::Parse(e) | ErrorKind::Clausify(ClausifyError::Parse(e)) => (
                Some(e.span),
                e.suggestion.map(str::to_string),
                Some(e.context.clone()),
            ),
            _ => (None, None, None),
        };

        Diagnostic {
            code,
            message: error.to_string(),
            span,
            suggestion,
            context,
            details: BTreeMap::new(),
        }
    }
}
