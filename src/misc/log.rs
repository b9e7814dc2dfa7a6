/*!
Miscellaneous items related to [logging](log).

Calls to the log macro are made throughout the library.
These are intended to provide useful information for extending the library and/or fixing issues.

Note, no log implementation is provided.
For more details, see [log].
*/

/// Targets to be used within a [log]! macro.
pub mod targets {
    /// Logs related to the [lexer](crate::language::lexer) and [parser](crate::language::parser).
    pub const PARSER: &str = "parser";

    /// Logs related to the [clausification pipeline](crate::clausal).
    pub const CLAUSIFIER: &str = "clausifier";

    /// Logs related to the [resolution engine](crate::engines::sld).
    pub const SLD: &str = "sld";

    /// Logs related to the [satisfiability core](crate::sat).
    pub const SAT: &str = "sat";

    /// Logs related to [grounding](crate::engines::sat).
    pub const GROUNDING: &str = "grounding";

    /// Logs related to [engine selection and dispatch](crate::engines::manager).
    pub const MANAGER: &str = "manager";

    /// Logs related to the [model finder](crate::models).
    pub const MODEL_FINDER: &str = "model_finder";

    /// Logs related to [sessions](crate::service::sessions) and the reaper.
    pub const SESSION: &str = "session";
}
