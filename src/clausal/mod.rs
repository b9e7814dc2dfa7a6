/*!
The clausification pipeline --- from a formula to an equisatisfiable clause set.

The pipeline runs a fixed sequence of pure rewrites:

1. Universal closure of free variables (free variables are implicitly universal).
2. [Negation normal form](nnf).
3. [Standardization](standardize) of binder names to fresh `_vN`.
4. [Skolemization](skolem) of existentials, recorded in a [SkolemEnv].
5. Dropping of universal binders.
6. Either [distribution](distribute) or the [Tseitin transformation](tseitin), per the configured [strategy](crate::config::ClauseStrategy).
7. Literal extraction through the canonical term printer.
8. A tautology filter.

Distribution is gated by a deadline and by clause bounds; overrun aborts the call with a [ClausifyError], never a partial clause set.

One environment may be threaded through several calls --- a prove call clausifies `⋀premises ∧ ¬goal` under a single [SkolemEnv] so generated names stay distinct, and an incremental session does the same premise by premise.
The entry point accepts either source text or an already-parsed formula.
*/

use std::time::Instant;

pub mod clause;
pub mod distribute;
pub mod nnf;
pub mod skolem;
pub mod standardize;
pub mod tseitin;

pub use clause::{Clause, Literal};
pub use skolem::SkolemEnv;

use crate::{
    config::{ClauseStrategy, ClausifierConfig},
    generic::deadline::Deadline,
    language::{ast::Formula, parser},
    misc::log::targets,
    types::err::ClausifyError,
};

use distribute::Bounds;

/// Input to the pipeline: source text, or a formula already parsed.
pub enum ClausifyInput<'a> {
    Text(&'a str),
    Ast(Formula),
}

impl From<Formula> for ClausifyInput<'_> {
    fn from(formula: Formula) -> Self {
        ClausifyInput::Ast(formula)
    }
}

/// Statistics from one pipeline run.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClausifyStatistics {
    /// Node count of the input formula.
    pub original_size: usize,

    /// Count of clauses produced, tautologies excluded.
    pub clause_count: usize,

    /// Literal count of the widest clause produced.
    pub max_clause_size: usize,

    /// Wall-clock time of the run.
    pub time: std::time::Duration,
}

/// A clause set with the statistics of the run which produced it.
#[derive(Clone, Debug)]
pub struct ClausifyOutput {
    pub clauses: Vec<Clause>,
    pub statistics: ClausifyStatistics,
}

/// The pipeline, configured once and reused across calls.
#[derive(Clone, Debug, Default)]
pub struct Clausifier {
    pub config: ClausifierConfig,
}

impl Clausifier {
    pub fn new(config: ClausifierConfig) -> Self {
        Clausifier { config }
    }

    /// Clausifies one input under a fresh environment.
    pub fn clausify(
        &self,
        input: ClausifyInput,
    ) -> Result<(ClausifyOutput, SkolemEnv), ClausifyError> {
        let mut env = SkolemEnv::default();
        let output = self.clausify_into(input, &mut env)?;
        Ok((output, env))
    }

    /// Clausifies one input, threading `env` so generated names stay distinct across calls.
    pub fn clausify_into(
        &self,
        input: ClausifyInput,
        env: &mut SkolemEnv,
    ) -> Result<ClausifyOutput, ClausifyError> {
        let started = Instant::now();

        let formula = match input {
            ClausifyInput::Text(source) => parser::parse(source)?,
            ClausifyInput::Ast(formula) => formula,
        };
        let original_size = formula.node_count();

        let formula = formula.universal_closure();
        let formula = nnf::to_nnf(formula);
        let formula = standardize::standardize(formula, &mut env.var_counter);
        let formula = skolem::skolemize(formula, env);
        let matrix = skolem::drop_universals(formula);

        let bounds = Bounds {
            deadline: Deadline::after(self.config.timeout.value),
            max_clauses: self.config.max_clauses.value,
            max_clause_size: self.config.max_clause_size.value,
        };

        let raw = match self.config.strategy {
            ClauseStrategy::Distribute => distribute::distribute(&matrix, &bounds)?,
            ClauseStrategy::Tseitin => tseitin::tseitin(&matrix, env, &bounds)?,
        };

        let mut clauses = Vec::with_capacity(raw.len());
        let mut max_clause_size = 0;
        for mut clause in raw {
            clause.dedup();
            if clause.is_tautology() {
                continue;
            }
            max_clause_size = max_clause_size.max(clause.size());
            clauses.push(clause);
        }

        let statistics = ClausifyStatistics {
            original_size,
            clause_count: clauses.len(),
            max_clause_size,
            time: started.elapsed(),
        };

        log::debug!(
            target: targets::CLAUSIFIER,
            "{original_size} nodes to {} clauses in {:?}",
            statistics.clause_count,
            statistics.time,
        );

        Ok(ClausifyOutput {
            clauses,
            statistics,
        })
    }

    /// Clausifies the conjunction of `formulas` under one environment.
    ///
    /// An empty collection yields an empty clause set, which is satisfiable.
    pub fn clausify_all(
        &self,
        formulas: Vec<Formula>,
        env: &mut SkolemEnv,
    ) -> Result<ClausifyOutput, ClausifyError> {
        let mut clauses = Vec::new();
        let mut statistics = ClausifyStatistics::default();

        for formula in formulas {
            let output = self.clausify_into(ClausifyInput::Ast(formula), env)?;
            clauses.extend(output.clauses);
            statistics.original_size += output.statistics.original_size;
            statistics.max_clause_size = statistics
                .max_clause_size
                .max(output.statistics.max_clause_size);
            statistics.time += output.statistics.time;
        }

        statistics.clause_count = clauses.len();
        Ok(ClausifyOutput {
            clauses,
            statistics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clausify(source: &str) -> Vec<String> {
        let clausifier = Clausifier::default();
        let (output, _) = clausifier.clausify(ClausifyInput::Text(source)).unwrap();
        output.clauses.iter().map(Clause::to_string).collect()
    }

    #[test]
    fn socrates() {
        let clauses = clausify("all x (man(x) -> mortal(x))");
        assert_eq!(clauses, vec!["-man(_v1) | mortal(_v1)"]);
    }

    #[test]
    fn existential_becomes_skolem_constant() {
        let clauses = clausify("exists x P(x)");
        assert_eq!(clauses, vec!["P(sk1)"]);
    }

    #[test]
    fn free_variable_closed() {
        // y is free, so implicitly universal.
        let clauses = clausify("P(y) -> Q(y)");
        assert_eq!(clauses, vec!["-P(_v1) | Q(_v1)"]);
    }

    #[test]
    fn tautologies_filtered() {
        let clauses = clausify("P | -P");
        assert!(clauses.is_empty());
    }

    #[test]
    fn iff_doubles() {
        let clauses = clausify("P <-> Q");
        assert_eq!(clauses, vec!["-P | Q", "-Q | P"]);
    }

    #[test]
    fn strategies_cover_the_same_atoms() {
        let source = "(P & Q) | (R & S)";

        let standard = Clausifier::default();
        let (by_distribution, _) = standard.clausify(ClausifyInput::Text(source)).unwrap();

        let mut config = ClausifierConfig::default();
        config.strategy = ClauseStrategy::Tseitin;
        let linear = Clausifier::new(config);
        let (by_tseitin, _) = linear.clausify(ClausifyInput::Text(source)).unwrap();

        // Tseitin introduces auxiliaries but keeps every original atom.
        let originals = ["P", "Q", "R", "S"];
        for name in originals {
            assert!(by_distribution
                .clauses
                .iter()
                .any(|c| c.literals.iter().any(|l| l.predicate == name)));
            assert!(by_tseitin
                .clauses
                .iter()
                .any(|c| c.literals.iter().any(|l| l.predicate == name)));
        }
    }

    #[test]
    fn statistics() {
        let clausifier = Clausifier::default();
        let (output, _) = clausifier
            .clausify(ClausifyInput::Text("(P | Q) & R"))
            .unwrap();
        assert_eq!(output.statistics.clause_count, 2);
        assert_eq!(output.statistics.max_clause_size, 2);
    }

    #[test]
    fn shared_environment_keeps_names_distinct() {
        let clausifier = Clausifier::default();
        let mut env = SkolemEnv::default();

        let first = clausifier
            .clausify_into(ClausifyInput::Text("exists x P(x)"), &mut env)
            .unwrap();
        let second = clausifier
            .clausify_into(ClausifyInput::Text("exists x Q(x)"), &mut env)
            .unwrap();

        assert_eq!(first.clauses[0].to_string(), "P(sk1)");
        assert_eq!(second.clauses[0].to_string(), "Q(sk2)");
    }
}
