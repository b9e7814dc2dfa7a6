/*!
Configuration of the library.

Primary configuration is a [Config], grouped by subsystem.
The engine manager owns a config and hands the relevant group to each part it drives.
Some structures clone parts of the configuration on construction.

Each value is held in a [ConfigOption], which pairs the value with its name and the range of permitted values.
*/

use std::time::Duration;

mod option;
pub use option::ConfigOption;

/// The strategy used to reach conjunctive normal form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ClauseStrategy {
    /// Distribute disjunction over conjunction.
    ///
    /// Worst-case exponential, but produces clauses over the original atoms.
    #[default]
    Distribute,

    /// The Tseitin transformation.
    ///
    /// Linear in the count of sub-formulas, at the cost of fresh auxiliary atoms.
    Tseitin,
}

/// Configuration of the clausification pipeline.
#[derive(Clone, Debug)]
pub struct ClausifierConfig {
    /// Wall-clock budget for a single clausification.
    pub timeout: ConfigOption<Duration>,

    /// Upper bound on the count of clauses produced.
    pub max_clauses: ConfigOption<usize>,

    /// Upper bound on the literal count of any single clause.
    pub max_clause_size: ConfigOption<usize>,

    /// The strategy used to reach conjunctive normal form.
    pub strategy: ClauseStrategy,
}

impl Default for ClausifierConfig {
    fn default() -> Self {
        ClausifierConfig {
            timeout: ConfigOption {
                name: "clausify_timeout",
                min: Duration::from_millis(1),
                max: Duration::from_secs(3600),
                value: Duration::from_secs(10),
            },

            max_clauses: ConfigOption {
                name: "max_clauses",
                min: 1,
                max: usize::MAX,
                value: 100_000,
            },

            max_clause_size: ConfigOption {
                name: "max_clause_size",
                min: 1,
                max: usize::MAX,
                value: 1_000,
            },

            strategy: ClauseStrategy::Distribute,
        }
    }
}

/// Configuration of the resolution engine.
#[derive(Clone, Debug)]
pub struct SldConfig {
    /// Budget of inference steps for a single call.
    pub max_inferences: ConfigOption<usize>,

    /// The first rung of the iterative-deepening ladder.
    pub deepening_start: ConfigOption<usize>,

    /// The multiplier between rungs of the iterative-deepening ladder.
    pub deepening_factor: ConfigOption<usize>,

    /// Recursion depth of the generated equality axioms.
    pub equality_depth: ConfigOption<usize>,
}

impl Default for SldConfig {
    fn default() -> Self {
        SldConfig {
            max_inferences: ConfigOption {
                name: "max_inferences",
                min: 1,
                max: usize::MAX,
                value: 10_000,
            },

            deepening_start: ConfigOption {
                name: "deepening_start",
                min: 1,
                max: usize::MAX,
                value: 100,
            },

            deepening_factor: ConfigOption {
                name: "deepening_factor",
                min: 2,
                max: 64,
                value: 4,
            },

            equality_depth: ConfigOption {
                name: "equality_depth",
                min: 1,
                max: 64,
                value: 5,
            },
        }
    }
}

/// Configuration of the satisfiability core.
#[derive(Clone, Debug)]
pub struct SatConfig {
    /// The `u` value to multiply the luby sequence by when determining whether to perform a restart.
    pub luby_u: ConfigOption<u32>,

    /// The probability of assigning positive polarity to an atom when freely choosing a value.
    pub polarity_lean: ConfigOption<f64>,

    /// The probability of making a random decision rather than following activity.
    pub random_decision_bias: ConfigOption<f64>,

    /// Default to the last set value of an atom when choosing a value for the atom.
    pub phase_saving: ConfigOption<bool>,

    /// Multiplier applied to atom activity on each conflict.
    pub activity_decay: ConfigOption<f64>,

    /// Permit (scheduled) restarts.
    pub restarts: ConfigOption<bool>,

    /// Wall-clock budget for a single solve; zero for no limit.
    pub time_limit: ConfigOption<Duration>,
}

impl Default for SatConfig {
    fn default() -> Self {
        SatConfig {
            luby_u: ConfigOption {
                name: "luby",
                min: 1,
                max: u32::MAX,
                value: 128,
            },

            polarity_lean: ConfigOption {
                name: "polarity_lean",
                min: 0.0,
                max: 1.0,
                value: 0.0,
            },

            random_decision_bias: ConfigOption {
                name: "random_decision_bias",
                min: 0.0,
                max: 1.0,
                value: 0.0,
            },

            phase_saving: ConfigOption {
                name: "phase_saving",
                min: false,
                max: true,
                value: true,
            },

            activity_decay: ConfigOption {
                name: "activity_decay",
                min: 0.0,
                max: 1.0,
                value: 0.95,
            },

            restarts: ConfigOption {
                name: "restarts",
                min: false,
                max: true,
                value: true,
            },

            time_limit: ConfigOption {
                name: "time_limit",
                min: Duration::from_secs(0),
                max: Duration::MAX,
                value: Duration::from_secs(0),
            },
        }
    }
}

/// Configuration of grounding for first-order refutation.
#[derive(Clone, Debug)]
pub struct GroundingConfig {
    /// Clauses with more variables than this stay ungrounded.
    ///
    /// Skipping such clauses weakens refutation completeness; the bound keeps the grounding polynomial for typical problems.
    pub max_ground_vars: ConfigOption<usize>,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        GroundingConfig {
            max_ground_vars: ConfigOption {
                name: "max_ground_vars",
                min: 1,
                max: 8,
                value: 3,
            },
        }
    }
}

/// Configuration of the model finder.
#[derive(Clone, Debug)]
pub struct ModelConfig {
    /// The largest domain size the incremental search will try.
    pub max_domain_size: ConfigOption<usize>,

    /// Domain size at which the search switches to the grounded satisfiability path.
    pub sat_threshold: ConfigOption<usize>,

    /// The largest domain size for which isomorphism filtering is attempted.
    ///
    /// The filter tries every domain permutation, so the cost is factorial in the domain size.
    pub iso_max_domain: ConfigOption<usize>,

    /// Break constant-assignment symmetry with the lex-leader heuristic.
    pub symmetry_breaking: ConfigOption<bool>,

    /// Wall-clock budget for a single search.
    pub timeout: ConfigOption<Duration>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            max_domain_size: ConfigOption {
                name: "max_domain_size",
                min: 1,
                max: 64,
                value: 8,
            },

            sat_threshold: ConfigOption {
                name: "sat_threshold",
                min: 1,
                max: 64,
                value: 10,
            },

            iso_max_domain: ConfigOption {
                name: "iso_max_domain",
                min: 1,
                max: 8,
                value: 8,
            },

            symmetry_breaking: ConfigOption {
                name: "symmetry_breaking",
                min: false,
                max: true,
                value: true,
            },

            timeout: ConfigOption {
                name: "model_timeout",
                min: Duration::from_millis(1),
                max: Duration::from_secs(3600),
                value: Duration::from_secs(30),
            },
        }
    }
}

/// Configuration of the session layer.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Time-to-live applied to a session which does not request one.
    pub default_ttl: ConfigOption<Duration>,

    /// The largest time-to-live a session may request.
    pub max_ttl: ConfigOption<Duration>,

    /// The limit on concurrent sessions.
    pub max_sessions: ConfigOption<usize>,

    /// How often the reaper scans for expired sessions.
    pub reap_interval: ConfigOption<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            default_ttl: ConfigOption {
                name: "default_ttl",
                min: Duration::from_secs(1),
                max: Duration::from_secs(24 * 3600),
                value: Duration::from_secs(30 * 60),
            },

            max_ttl: ConfigOption {
                name: "max_ttl",
                min: Duration::from_secs(1),
                max: Duration::from_secs(24 * 3600),
                value: Duration::from_secs(24 * 3600),
            },

            max_sessions: ConfigOption {
                name: "max_sessions",
                min: 1,
                max: 1_000_000,
                value: 1_000,
            },

            reap_interval: ConfigOption {
                name: "reap_interval",
                min: Duration::from_millis(100),
                max: Duration::from_secs(3600),
                value: Duration::from_secs(60),
            },
        }
    }
}

/// The primary configuration structure.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Configuration of the clausification pipeline.
    pub clausifier: ClausifierConfig,

    /// Configuration of the resolution engine.
    pub sld: SldConfig,

    /// Configuration of the satisfiability core.
    pub sat: SatConfig,

    /// Configuration of grounding for first-order refutation.
    pub grounding: GroundingConfig,

    /// Configuration of the model finder.
    pub model: ModelConfig,

    /// Configuration of the session layer.
    pub session: SessionConfig,
}
