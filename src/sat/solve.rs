/*!
Determines the satisfiability of the formula in a context.

# Overview

The loop interleaves three steps:

- [Propagation](super::bcp) applies every consequence of the current valuation.
- A conflict during propagation is [analysed](super::analysis) to a learnt clause; the trail unwinds to the level the clause asserts at, and the asserted literal is queued.
  A conflict with no decision standing is fundamental, and the formula unsatisfiable.
- With no consequence left and the valuation partial, a [decision](Context::make_decision) extends the valuation; with the valuation complete, the formula is satisfiable.

Roughly:

```none
          +---------------+
  +-------| make_decision |
  |       +---------------+
  |               ⌃
  |               | no conflict, valuation partial
  |               |
  ⌄        +-----------+
--+------->| propagate |-----> satisfiable, if the valuation is full
  ⌃        +-----------+
  |               |
  |               | conflict
  |               ⌄
  |        +---------------------+
  +--------| analyse  + backjump |-----> unsatisfiable, at level zero
           +---------------------+
```

Restarts follow the luby sequence scaled by the configured `u`; a restart forgets decisions but keeps learnt clauses, activity, and saved phases.
The deadline and the terminate callback are checked at every decision, and expiry surfaces as [Report::Unknown] --- never as an answer.
*/

use crate::{
    generic::{deadline::Deadline, luby::Luby},
    misc::log::targets,
    types::err::SatError,
};

use super::{context::Context, literal::SatLiteral, Report, SolveStatus};

impl Context {
    /// Determines the satisfiability of the context, unless interrupted.
    pub fn solve(&mut self) -> Result<Report, SatError> {
        if self.status == SolveStatus::Unsatisfiable {
            return Ok(Report::Unsatisfiable);
        }
        self.status = SolveStatus::Solving;

        let deadline = Deadline::after(self.config.time_limit.value);
        let mut luby = Luby::default();
        let mut restart_threshold = self.config.luby_u.value as u64 * luby.current() as u64;
        self.counters.conflicts_since_restart = 0;

        loop {
            match self.propagate() {
                Some(conflict) => {
                    self.counters.conflicts += 1;
                    self.counters.conflicts_since_restart += 1;

                    if self.current_level() == 0 {
                        log::info!(target: targets::SAT, "fundamental conflict");
                        self.status = SolveStatus::Unsatisfiable;
                        return Ok(Report::Unsatisfiable);
                    }

                    let analysis = self.analyse(conflict)?;
                    self.backtrack_to(analysis.backjump_level);

                    match analysis.clause.len() {
                        1 => self.assign(analysis.clause[0], None),
                        _ => {
                            let asserted = analysis.clause[0];
                            let key = self.clause_db.store(analysis.clause, true);
                            self.watch_learnt(key);
                            self.assign(asserted, Some(key));
                        }
                    }

                    self.decay_activities();

                    if self.config.restarts.value
                        && self.counters.conflicts_since_restart >= restart_threshold
                    {
                        self.backtrack_to(0);
                        self.counters.restarts += 1;
                        self.counters.conflicts_since_restart = 0;
                        luby.next();
                        restart_threshold =
                            self.config.luby_u.value as u64 * luby.current() as u64;
                        log::debug!(target: targets::SAT, "restart {}", self.counters.restarts);
                    }
                }

                None => {
                    if deadline.expired() || self.check_callback_terminate() {
                        self.status = SolveStatus::Input;
                        return Ok(Report::Unknown);
                    }

                    match self.make_decision() {
                        Some(literal) => {
                            self.counters.decisions += 1;
                            self.level_breaks.push(self.trail.len());
                            self.assign(literal, None);
                        }

                        None => {
                            self.status = SolveStatus::Satisfiable;
                            return Ok(Report::Satisfiable);
                        }
                    }
                }
            }
        }
    }

    /// The report of the most recent solve.
    pub fn report(&self) -> Report {
        Report::from(self.status)
    }

    /// Chooses an unvalued atom and a polarity for it, if the valuation is partial.
    fn make_decision(&mut self) -> Option<SatLiteral> {
        use rand::Rng;

        let atom = match self.rng.random_bool(self.config.random_decision_bias.value) {
            true => self.random_unvalued_atom(),
            false => {
                // Pop until an unvalued atom surfaces; valued atoms return on backtracking.
                loop {
                    match self.activity.pop_max() {
                        Some(atom) => {
                            if self.values[atom].is_none() {
                                break Some(atom);
                            }
                        }
                        None => break self.random_unvalued_atom(),
                    }
                }
            }
        }?;

        let polarity = match self.config.phase_saving.value {
            true => self.previous[atom],
            false => {
                use rand::Rng;
                self.rng.random_bool(self.config.polarity_lean.value)
            }
        };

        Some(SatLiteral::new(atom as u32, polarity))
    }

    fn random_unvalued_atom(&mut self) -> Option<usize> {
        use rand::Rng;

        let unvalued: Vec<usize> = (1..self.values.len())
            .filter(|&atom| self.values[atom].is_none())
            .collect();
        match unvalued.is_empty() {
            true => None,
            false => Some(unvalued[self.rng.random_range(0..unvalued.len())]),
        }
    }
}
