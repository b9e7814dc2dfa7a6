/*!
A command-line interface to the library.

# Use

```sh
entail_cli prove -p "all x (man(x) -> mortal(x))" -p "man(socrates)" "mortal(socrates)"
entail_cli model -p "exists x P(x)" -p "all x (P(x) -> Q(x))"
entail_cli counterexample -p "P(a)" "P(b)"
entail_cli check "all x (man(x) -> mortal(x))"
entail_cli sat problem.cnf
```

Exit codes: `0` on proved / model found / valid, `1` on not proved / no model / invalid, `2` on internal error.

Pass `--json` to print the raw tool response instead of the human rendering.
When built with the `log` feature, `RUST_LOG` filters the library's log targets.
*/

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use entail::{
    config::Config,
    sat::{Context, Report},
    service::tools::{
        CheckWellFormedRequest, FindCounterexampleRequest, FindModelRequest, FindStatus,
        LogicService, ProveRequest, ProveStatus,
    },
};

#[derive(Parser)]
#[command(name = "entail_cli", about = "First-order entailment and finite models", version)]
struct Cli {
    /// Print the raw tool response as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decide whether premises entail a goal.
    Prove {
        /// A premise; repeatable.
        #[arg(short, long = "premise")]
        premises: Vec<String>,

        /// The goal formula.
        goal: String,

        /// Generate equality axioms.
        #[arg(long)]
        equality: bool,

        /// Enable the arithmetic builtins.
        #[arg(long)]
        arithmetic: bool,

        /// `auto`, `race`, or an engine name.
        #[arg(long)]
        engine: Option<String>,

        /// `standard` or `tseitin`.
        #[arg(long)]
        strategy: Option<String>,

        /// Collect and print a resolution trace.
        #[arg(long)]
        trace: bool,

        /// Inference budget for resolution.
        #[arg(long)]
        limit: Option<usize>,

        /// Wall-clock budget in milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Validate formulas without proving anything.
    Check {
        /// Formulas to validate.
        formulas: Vec<String>,
    },

    /// Search for finite models of premises.
    Model {
        #[arg(short, long = "premise")]
        premises: Vec<String>,

        /// Search exactly this domain size.
        #[arg(long)]
        domain_size: Option<usize>,

        /// Largest domain size to try.
        #[arg(long)]
        max_domain_size: Option<usize>,

        /// Take the grounded satisfiability path regardless of size.
        #[arg(long)]
        sat: bool,

        /// Disable symmetry breaking and isomorphism filtering.
        #[arg(long)]
        no_symmetry: bool,

        /// How many models to return.
        #[arg(long)]
        count: Option<usize>,

        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Search for a model of the premises and the negated goal.
    Counterexample {
        #[arg(short, long = "premise")]
        premises: Vec<String>,

        /// The goal to refute.
        goal: String,

        #[arg(long)]
        domain_size: Option<usize>,

        #[arg(long)]
        max_domain_size: Option<usize>,

        #[arg(long)]
        sat: bool,

        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Decide the satisfiability of a DIMACS CNF file.
    Sat {
        /// Path to a `.cnf` file.
        path: std::path::PathBuf,
    },
}

fn main() -> ExitCode {
    #[cfg(feature = "log")]
    env_logger::init();

    let cli = Cli::parse();
    let service = LogicService::new(Config::default());

    match cli.command {
        Command::Prove {
            premises,
            goal,
            equality,
            arithmetic,
            engine,
            strategy,
            trace,
            limit,
            timeout_ms,
        } => {
            let response = service.prove(&ProveRequest {
                premises,
                goal,
                inference_limit: limit,
                enable_equality: equality,
                enable_arithmetic: arithmetic,
                engine,
                strategy,
                include_trace: trace,
                timeout_ms,
            });

            if cli.json {
                print_json(&response);
            } else {
                match response.result {
                    ProveStatus::Proved => println!("proved"),
                    ProveStatus::Failed => println!("not proved"),
                    ProveStatus::Timeout => println!("timeout"),
                    ProveStatus::Error => {}
                }
                if let Some(engine) = &response.engine_used {
                    println!("engine: {engine}");
                }
                if let Some(bindings) = &response.bindings {
                    for (variable, value) in bindings {
                        println!("  {variable} = {value}");
                    }
                }
                if let Some(proof) = &response.proof {
                    for line in proof {
                        println!("  {line}");
                    }
                }
                if let Some(error) = &response.error {
                    eprintln!("error: {}", error.message);
                }
            }

            match response.result {
                ProveStatus::Proved => ExitCode::SUCCESS,
                ProveStatus::Failed | ProveStatus::Timeout => ExitCode::from(1),
                ProveStatus::Error => ExitCode::from(2),
            }
        }

        Command::Check { formulas } => {
            let response = service.check_well_formed(&CheckWellFormedRequest { formulas });

            if cli.json {
                print_json(&response);
            } else {
                for (index, check) in response.per_formula.iter().enumerate() {
                    let verdict = match check.valid {
                        true => "valid",
                        false => "invalid",
                    };
                    println!("{index}: {verdict}");
                    for error in &check.errors {
                        println!("  {}", error.message);
                    }
                    for warning in &check.warnings {
                        println!("  warning: {warning}");
                    }
                    for suggestion in &check.suggestions {
                        println!("  suggestion: {suggestion}");
                    }
                }
            }

            match response.valid {
                true => ExitCode::SUCCESS,
                false => ExitCode::from(1),
            }
        }

        Command::Model {
            premises,
            domain_size,
            max_domain_size,
            sat,
            no_symmetry,
            count,
            timeout_ms,
        } => {
            let response = service.find_model(&FindModelRequest {
                premises,
                domain_size,
                max_domain_size,
                use_sat: sat,
                enable_symmetry: Some(!no_symmetry),
                count,
                timeout_ms,
            });
            finish_model(cli.json, response)
        }

        Command::Counterexample {
            premises,
            goal,
            domain_size,
            max_domain_size,
            sat,
            timeout_ms,
        } => {
            let response = service.find_counterexample(&FindCounterexampleRequest {
                goal,
                base: FindModelRequest {
                    premises,
                    domain_size,
                    max_domain_size,
                    use_sat: sat,
                    enable_symmetry: Some(true),
                    count: None,
                    timeout_ms,
                },
            });
            finish_model(cli.json, response)
        }

        Command::Sat { path } => {
            let file = match std::fs::File::open(&path) {
                Ok(file) => file,
                Err(error) => {
                    eprintln!("error: {error}");
                    return ExitCode::from(2);
                }
            };

            let mut ctx = Context::default();
            if let Err(error) = ctx.read_dimacs(std::io::BufReader::new(file)) {
                eprintln!("error: {error}");
                return ExitCode::from(2);
            }

            match ctx.solve() {
                Ok(Report::Satisfiable) => {
                    let assignment: Vec<String> = ctx
                        .atom_valued_pairs()
                        .map(|(atom, value)| match value {
                            true => format!("{atom}"),
                            false => format!("-{atom}"),
                        })
                        .collect();
                    println!("s SATISFIABLE");
                    println!("v {} 0", assignment.join(" "));
                    ExitCode::SUCCESS
                }
                Ok(Report::Unsatisfiable) => {
                    println!("s UNSATISFIABLE");
                    ExitCode::from(1)
                }
                Ok(Report::Unknown) => {
                    println!("s UNKNOWN");
                    ExitCode::from(1)
                }
                Err(error) => {
                    eprintln!("error: {error}");
                    ExitCode::from(2)
                }
            }
        }
    }
}

fn finish_model(
    json: bool,
    response: entail::service::tools::FindModelResponse,
) -> ExitCode {
    if json {
        print_json(&response);
    } else {
        match response.result {
            FindStatus::ModelFound => {
                if let Some(interpretation) = &response.interpretation {
                    print!("{interpretation}");
                }
            }
            FindStatus::NoModel => println!("no model"),
            FindStatus::Timeout => println!("timeout"),
            FindStatus::Error => {
                if let Some(error) = &response.error {
                    eprintln!("error: {}", error.message);
                }
            }
        }
    }

    match response.result {
        FindStatus::ModelFound => ExitCode::SUCCESS,
        FindStatus::NoModel | FindStatus::Timeout => ExitCode::from(1),
        FindStatus::Error => ExitCode::from(2),
    }
}

fn print_json(value: &impl serde::Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(rendered) => println!("{rendered}"),
        Err(error) => eprintln!("error: {error}"),
    }
}
