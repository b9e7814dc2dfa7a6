/*!
The service layer --- the tool surface a client sees, and the session store behind it.

[tools] defines serde request and response types for every tool and a [LogicService](tools::LogicService) which executes them; a thin JSON dispatcher routes by tool name for transports which carry raw values.
[sessions] owns the session table: in-memory sessions keyed by opaque UUIDs, each with a premise list as its source of truth, a per-session lock serializing its operations, and a background reaper destroying sessions past their time-to-live.

Nothing here persists: a restarted service starts empty.
*/

pub mod sessions;
pub mod tools;
