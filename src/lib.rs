/*!
A library for deciding entailment in classical first-order logic with equality, and for enumerating finite models of first-order premises.

entail accepts formulas in a human-authored syntax (`all`, `exists`, `->`, `<->`, `&`, `|`, `-`, `=`), validates them, and dispatches them to one of several reasoning engines: a depth-bounded Horn-clause resolution engine, and a propositional satisfiability engine which handles full first-order input by refutation over a Herbrand grounding.
Given premises alone, a finite model finder searches domains of increasing size for satisfying interpretations.

# Orientation

The library is designed around a small number of stages which feed one another left to right.

- A formula is read by the [lexer](language::lexer) and [parser](language::parser) into a [Formula](language::ast::Formula) tree, from which a [Signature](language::signature::Signature) may be extracted.
- The [clausal] module rewrites a formula to a set of [clauses](clausal::clause::Clause) through negation normal form, standardization, Skolemization, and either distribution or the Tseitin transformation.
- Clause sets in which every clause has at most one positive literal may be [translated](horn) to a Horn program and resolved by the [SLD engine](engines::sld).
- Any clause set may be grounded and handed to the [CDCL core](sat), either for refutation or for model enumeration.
- The [engine manager](engines) inspects the shape of a problem, scores the available engines, and dispatches — or races — accordingly.
- The [model finder](models) enumerates domains, constants, functions, and predicates, with symmetry breaking and isomorphism filtering, falling back to the grounded satisfiability path for larger domains.
- The [service] module exposes the whole of the above as a set of tools with serde request and response types, including in-memory sessions with a time-to-live reaper.

Useful starting points, then, may be:
- [service::tools] for the operations a client sees.
- [engines::manager] for how a problem meets an engine.
- [clausal::pipeline] for the formula-to-clause rewrite, stage by stage.
- [sat::context] for the satisfiability core.

# Examples

+ Prove the inevitable about Socrates.

```rust
# use entail::config::Config;
# use entail::service::tools::{LogicService, ProveRequest, ProveStatus};
let service = LogicService::new(Config::default());

let request = ProveRequest {
    premises: vec![
        "all x (man(x) -> mortal(x))".to_string(),
        "man(socrates)".to_string(),
    ],
    goal: "mortal(socrates)".to_string(),
    ..ProveRequest::default()
};

let response = service.prove(&request);
assert_eq!(response.result, ProveStatus::Proved);
assert_eq!(response.engine_used.as_deref(), Some("horn"));
```

+ Find a two-element counter-example.

```rust
# use entail::config::Config;
# use entail::service::tools::{FindCounterexampleRequest, FindModelRequest, LogicService};
let service = LogicService::new(Config::default());

let request = FindCounterexampleRequest {
    goal: "P(b)".to_string(),
    base: FindModelRequest {
        premises: vec!["P(a)".to_string()],
        ..FindModelRequest::default()
    },
};

let response = service.find_counterexample(&request);

let model = response.model.expect("a witnessing model");
assert!(model.domain_size >= 2);
assert_eq!(model.constants.get("b"), Some(&1));
```

# Logs

Calls to [log!](log) are made throughout the library, with a target per subsystem to help narrow output to relevant parts.
No log implementation is provided; the cli initialises [env_logger](https://docs.rs/env_logger) when built with the `log` feature.

The targets are listed in [misc::log].
For example, logs of engine selection can be filtered with `RUST_LOG=manager …` and logs of the clausifier with `RUST_LOG=clausifier …`.
*/

#![allow(clippy::collapsible_else_if)]
#![allow(clippy::single_match)]

pub mod config;
pub mod types;

pub mod generic;
pub mod misc;

pub mod language;

pub mod clausal;
pub mod horn;

pub mod axioms;

pub mod sat;

pub mod engines;

pub mod models;

pub mod service;
