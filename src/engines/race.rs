/*!
Race mode.

Every capable engine attempts the task on its own scoped thread, each with its own cancellation flag.
The first *definitive* outcome --- proved or failed, not a timeout and not an error --- wins, and the losers are cancelled through their flags; engines check the flag at their suspension points, so losers wind down promptly and the scope join stays short.

If every engine errors the errors aggregate; if nothing definitive arrives but some engine timed out, the timeout is reported rather than invented failure.
*/

use std::sync::Arc;

use crate::{
    misc::log::targets,
    types::err::{EngineError, ErrorKind},
};

use super::{CancelFlag, Engine, ProofOutcome, ProofTask};

/// Dispatches `task` to every engine concurrently; first definitive outcome wins.
pub fn race(engines: Vec<Arc<dyn Engine>>, task: &ProofTask) -> Result<ProofOutcome, ErrorKind> {
    if engines.is_empty() {
        return Err(ErrorKind::Engine(EngineError::NoCapableEngine));
    }

    let flags: Vec<CancelFlag> = engines.iter().map(|_| CancelFlag::new()).collect();

    let raced = crossbeam::thread::scope(|scope| {
        let (sender, receiver) = crossbeam::channel::unbounded();

        for (index, engine) in engines.iter().enumerate() {
            let mut options = task.options.clone();
            options.cancel = flags[index].clone();

            let thread_task = ProofTask {
                premises: task.premises.clone(),
                goal: task.goal.clone(),
                options,
            };
            let sender = sender.clone();
            let engine = Arc::clone(engine);

            scope.spawn(move |_| {
                let outcome = engine.prove(&thread_task);
                let _ = sender.send((index, outcome));
            });
        }
        drop(sender);

        let mut errors: Vec<String> = Vec::new();
        let mut indefinite: Option<ProofOutcome> = None;
        let mut winner: Option<ProofOutcome> = None;

        for (index, outcome) in receiver {
            match outcome {
                Ok(outcome) if outcome.is_definitive() => {
                    log::info!(
                        target: targets::MANAGER,
                        "race won by '{}' with {:?}",
                        outcome.engine,
                        outcome.status,
                    );
                    for (loser, flag) in flags.iter().enumerate() {
                        if loser != index {
                            flag.cancel();
                        }
                    }
                    winner = Some(outcome);
                    break;
                }

                Ok(outcome) => indefinite = Some(outcome),

                Err(error) => errors.push(error.to_string()),
            }
        }

        // Leaving the scope joins the remaining racers; losers have been cancelled.
        (winner, indefinite, errors)
    });

    let (winner, indefinite, errors) = match raced {
        Ok(results) => results,
        Err(_) => {
            return Err(ErrorKind::Engine(EngineError::Rejected(
                "a racing engine panicked".to_string(),
            )))
        }
    };

    match winner.or(indefinite) {
        Some(outcome) => Ok(outcome),
        None => Err(ErrorKind::Engine(EngineError::AllFailed(errors))),
    }
}
