/*!
The engine manager.

The manager owns the capability table and a cache of lazily-instantiated engines, and turns "prove this" into "prove this *there*":

- **auto** --- [analyse](super::score::analyse) the shape of the problem, score every registered engine, dispatch to the best; on engine error fall back once to the next-highest scorer, and only then surface the failure;
- **named** --- dispatch to the named engine, errors and all;
- **race** --- dispatch to every positively-scored engine concurrently and take the first definitive outcome.

One manager instance is passed explicitly through the call graph --- the session table and reaper sit above it in the [service layer](crate::service), and nothing here is a hidden singleton.
[close](EngineManager::close) releases the cached engines; engines holding native resources release them on drop.
*/

use std::sync::{Arc, Mutex};

use crate::{
    clausal::Clause,
    config::Config,
    language::ast::Formula,
    misc::log::targets,
    types::err::{EngineError, ErrorKind},
};

use super::{
    race,
    sat::{self, SatEngine},
    score,
    sld::SldEngine,
    CancelFlag, Engine, EngineInfo, EngineSession, ProofOutcome, ProofTask,
};

/// How a prove call chooses its engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EngineChoice {
    /// Score the engines against the problem and dispatch to the best.
    #[default]
    Auto,

    /// Dispatch to the named engine.
    Named(String),

    /// Dispatch to every capable engine concurrently.
    Race,
}

/// The registered engine names, in preference order.
pub const ENGINE_ORDER: [&str; 2] = ["horn", "sat"];

/// The engine manager.
pub struct EngineManager {
    pub config: Config,
    cache: Mutex<Vec<(&'static str, Arc<dyn Engine>)>>,
}

impl EngineManager {
    pub fn new(config: Config) -> Self {
        EngineManager {
            config,
            cache: Mutex::new(Vec::new()),
        }
    }

    /// The capability table.
    pub fn engines(&self) -> Vec<EngineInfo> {
        ENGINE_ORDER
            .iter()
            .filter_map(|name| self.instantiate(name).ok())
            .map(|engine| EngineInfo {
                name: engine.name(),
                capabilities: engine.capabilities(),
            })
            .collect()
    }

    /// The engine behind `name`, instantiated on first use.
    fn instantiate(&self, name: &str) -> Result<Arc<dyn Engine>, ErrorKind> {
        let mut cache = self.cache.lock().expect("engine cache lock");

        if let Some((_, engine)) = cache.iter().find(|(cached, _)| *cached == name) {
            return Ok(Arc::clone(engine));
        }

        let engine: Arc<dyn Engine> = match name {
            "horn" => Arc::new(SldEngine::new(self.config.sld.clone())),
            "sat" => Arc::new(SatEngine::new(
                self.config.sat.clone(),
                self.config.grounding.clone(),
            )),
            _ => return Err(ErrorKind::Engine(EngineError::UnknownEngine(name.to_string()))),
        };

        log::debug!(target: targets::MANAGER, "instantiated engine '{name}'");
        cache.push((engine.name(), Arc::clone(&engine)));
        Ok(engine)
    }

    /// Releases every lazily-instantiated engine.
    pub fn close(&self) {
        self.cache.lock().expect("engine cache lock").clear();
    }

    /// The engine auto mode would choose for the problem.
    pub fn select_engine(
        &self,
        premises: &[Formula],
        goal: Option<&Formula>,
    ) -> Result<&'static str, ErrorKind> {
        let ranking = self.ranking(premises, goal)?;
        Ok(ranking[0].0)
    }

    /// Engine names with their scores, best first; ties fall to registration order.
    fn ranking(
        &self,
        premises: &[Formula],
        goal: Option<&Formula>,
    ) -> Result<Vec<(&'static str, i32)>, ErrorKind> {
        let shape = score::analyse(premises, goal)?;
        log::debug!(target: targets::MANAGER, "problem shape {shape:?}");

        let mut ranking: Vec<(&'static str, i32)> = self
            .engines()
            .iter()
            .map(|info| (info.name, score::score(info, &shape)))
            .collect();

        // Stable sort: registration order breaks ties.
        ranking.sort_by_key(|(_, score)| std::cmp::Reverse(*score));
        Ok(ranking)
    }

    /// Attempts the task under the given choice of engine.
    pub fn prove(&self, task: &ProofTask, choice: &EngineChoice) -> Result<ProofOutcome, ErrorKind> {
        match choice {
            EngineChoice::Named(name) => {
                let engine = self.instantiate(name)?;
                engine.prove(task)
            }

            EngineChoice::Race => {
                let ranking = self.ranking(&task.premises, Some(&task.goal))?;
                let racers: Vec<Arc<dyn Engine>> = ranking
                    .iter()
                    .filter(|(_, score)| *score > 0)
                    .map(|(name, _)| self.instantiate(name))
                    .collect::<Result<_, _>>()?;

                match racers.is_empty() {
                    // Nothing scored positively; race everything rather than nothing.
                    true => {
                        let all = ENGINE_ORDER
                            .iter()
                            .map(|name| self.instantiate(name))
                            .collect::<Result<_, _>>()?;
                        race::race(all, task)
                    }
                    false => race::race(racers, task),
                }
            }

            EngineChoice::Auto => {
                let ranking = self.ranking(&task.premises, Some(&task.goal))?;
                let mut errors: Vec<String> = Vec::new();

                // The best engine, with one fall-back on engine error.
                for (name, score) in ranking.iter().take(2) {
                    let engine = self.instantiate(name)?;
                    match engine.prove(task) {
                        Ok(outcome) => {
                            if !errors.is_empty() {
                                log::info!(
                                    target: targets::MANAGER,
                                    "fell back to '{name}' (score {score})",
                                );
                            }
                            return Ok(outcome);
                        }
                        Err(error) => {
                            log::warn!(
                                target: targets::MANAGER,
                                "engine '{name}' failed: {error}",
                            );
                            errors.push(format!("{name}: {error}"));
                        }
                    }
                }

                Err(ErrorKind::Engine(EngineError::AllFailed(errors)))
            }
        }
    }

    /// Decides the satisfiability of a ground clause set.
    ///
    /// There is a single propositional backend, so no hint is taken.
    pub fn check_sat(&self, clauses: &[Clause]) -> Result<sat::SatCheck, ErrorKind> {
        sat::check_clauses(clauses, &CancelFlag::default())
    }

    /// Opens an incremental session on the named engine.
    pub fn create_session(&self, name: &str) -> Result<Box<dyn EngineSession>, ErrorKind> {
        let engine = self.instantiate(name)?;
        engine.create_session().ok_or(ErrorKind::Engine(
            EngineError::NoSessionSupport(name.to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::{ProofOptions, ProofStatus};
    use crate::language::parser::parse;

    fn task(premises: &[&str], goal: &str) -> ProofTask {
        ProofTask {
            premises: premises.iter().map(|s| parse(s).unwrap()).collect(),
            goal: parse(goal).unwrap(),
            options: ProofOptions::default(),
        }
    }

    #[test]
    fn auto_routes_horn_to_resolution() {
        let manager = EngineManager::new(Config::default());
        let outcome = manager
            .prove(
                &task(
                    &["all x (man(x) -> mortal(x))", "man(socrates)"],
                    "mortal(socrates)",
                ),
                &EngineChoice::Auto,
            )
            .unwrap();

        assert_eq!(outcome.status, ProofStatus::Proved);
        assert_eq!(outcome.engine, "horn");
    }

    #[test]
    fn auto_routes_non_horn_to_sat() {
        let manager = EngineManager::new(Config::default());
        let outcome = manager
            .prove(&task(&["P | Q", "-P"], "Q"), &EngineChoice::Auto)
            .unwrap();

        assert_eq!(outcome.status, ProofStatus::Proved);
        assert_eq!(outcome.engine, "sat");
    }

    #[test]
    fn universal_goals_route_to_refutation() {
        // A universal goal cannot be queried by resolution, and scores to sat.
        let manager = EngineManager::new(Config::default());
        let outcome = manager
            .prove(
                &task(&["all x P(x)"], "all x P(x)"),
                &EngineChoice::Auto,
            )
            .unwrap();

        assert_eq!(outcome.status, ProofStatus::Proved);
        assert_eq!(outcome.engine, "sat");
    }

    #[test]
    fn named_engine_is_respected() {
        let manager = EngineManager::new(Config::default());
        let outcome = manager
            .prove(
                &task(
                    &["all x (man(x) -> mortal(x))", "man(socrates)"],
                    "mortal(socrates)",
                ),
                &EngineChoice::Named("sat".to_string()),
            )
            .unwrap();

        assert_eq!(outcome.engine, "sat");
    }

    #[test]
    fn unknown_engine_errors() {
        let manager = EngineManager::new(Config::default());
        let outcome = manager.prove(
            &task(&[], "P"),
            &EngineChoice::Named("smt".to_string()),
        );
        assert!(matches!(
            outcome,
            Err(ErrorKind::Engine(EngineError::UnknownEngine(_)))
        ));
    }

    #[test]
    fn capability_table() {
        let manager = EngineManager::new(Config::default());
        let table = manager.engines();

        assert_eq!(table.len(), 2);
        assert!(table.iter().any(|row| row.name == "horn" && row.capabilities.horn));
        assert!(table.iter().any(|row| row.name == "sat" && row.capabilities.full_fol));
    }
}
