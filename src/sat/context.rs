/*!
The context --- to which clauses are added and within which solves take place.

The context owns the clause database, the valuation, the trail, and the watch lists, together with the counters and the source of randomness a solve draws on.
Assignments are made through [assign](Context::assign) only, so the trail, the valuation, and the reason records never disagree.

Clauses may be added between solves.
Addition happens at decision level zero: any decisions still standing from a previous solve are cleared first, so a satisfiable context may be narrowed clause by clause --- which is exactly how blocking-clause model enumeration proceeds.
*/

use rand::SeedableRng;

use crate::{
    config::SatConfig,
    generic::{index_heap::IndexHeap, pcg::Pcg32},
    misc::log::targets,
    types::err::SatError,
};

use super::{
    clause_db::{ClauseDB, ClauseKey, ClauseOk},
    literal::{Atom, SatLiteral},
    SolveStatus,
};

/// The type of callback used to request termination of a solve.
pub type CallbackTerminate = dyn FnMut() -> bool;

/// Counters related to a context/solve.
#[derive(Clone, Copy, Debug, Default)]
pub struct Counters {
    pub decisions: u64,
    pub conflicts: u64,
    pub restarts: u64,
    pub propagations: u64,

    /// Conflicts since the most recent restart.
    pub conflicts_since_restart: u64,
}

/// The context of a solve.
pub struct Context {
    /// The configuration of the context.
    pub config: SatConfig,

    /// The clause database.
    pub clause_db: ClauseDB,

    /// The status of the context.
    pub status: SolveStatus,

    /// Counters related to the context.
    pub counters: Counters,

    /// The value of each atom, indexed by atom; index 0 is reserved.
    pub(super) values: Vec<Option<bool>>,

    /// The last value each atom took, for phase saving.
    pub(super) previous: Vec<bool>,

    /// The decision level at which each atom was valued.
    pub(super) level_of: Vec<usize>,

    /// The clause which forced each atom's value, if propagation did.
    pub(super) reason_of: Vec<Option<ClauseKey>>,

    /// Watch lists, indexed by [literal index](SatLiteral::index).
    pub(super) watches: Vec<Vec<ClauseKey>>,

    /// Assignments in the order they were made.
    pub(super) trail: Vec<SatLiteral>,

    /// The trail length at the start of each decision level.
    pub(super) level_breaks: Vec<usize>,

    /// The next trail entry to propagate.
    pub(super) queue_head: usize,

    /// Atom activity, ordered for decisions.
    pub(super) activity: IndexHeap<f64>,

    /// The current activity increment.
    pub(super) bump: f64,

    /// The source of rng for decisions.
    pub(super) rng: Pcg32,

    /// An optional callback to terminate a solve.
    pub(super) callback_terminate: Option<Box<CallbackTerminate>>,
}

impl Context {
    pub fn new(config: SatConfig) -> Self {
        Context {
            config,
            clause_db: ClauseDB::default(),
            status: SolveStatus::Input,
            counters: Counters::default(),
            values: vec![None],
            previous: vec![false],
            level_of: vec![0],
            reason_of: vec![None],
            watches: vec![Vec::new(), Vec::new()],
            trail: Vec::new(),
            level_breaks: Vec::new(),
            queue_head: 0,
            activity: IndexHeap::default(),
            bump: 1.0,
            rng: Pcg32::from_seed(0_u64.to_le_bytes()),
            callback_terminate: None,
        }
    }

    /// Expands the context to include a fresh atom.
    pub fn fresh_atom(&mut self) -> Result<Atom, SatError> {
        let atom = self.values.len();
        if atom > i32::MAX as usize {
            return Err(SatError::AtomsExhausted);
        }

        self.values.push(None);
        self.previous.push(false);
        self.level_of.push(0);
        self.reason_of.push(None);
        self.watches.push(Vec::new());
        self.watches.push(Vec::new());
        self.activity.grow_to(atom);
        self.activity.activate(atom);

        Ok(atom as Atom)
    }

    /// The count of atoms in the context, the reserved zero excluded.
    pub fn atom_count(&self) -> usize {
        self.values.len() - 1
    }

    /// The value of `atom` on the current valuation.
    pub fn value_of(&self, atom: Atom) -> Option<bool> {
        self.values[atom as usize]
    }

    /// The value of `literal` on the current valuation.
    pub fn value_of_literal(&self, literal: SatLiteral) -> Option<bool> {
        self.values[literal.atom() as usize].map(|value| value == literal.polarity())
    }

    /// The current decision level.
    pub fn current_level(&self) -> usize {
        self.level_breaks.len()
    }

    /// An iterator over (atom, value) pairs of the current valuation.
    pub fn atom_valued_pairs(&self) -> impl Iterator<Item = (Atom, bool)> + '_ {
        self.values
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(atom, value)| value.map(|v| (atom as Atom, v)))
    }

    /// Records `literal` on the trail at the current level.
    pub(super) fn assign(&mut self, literal: SatLiteral, reason: Option<ClauseKey>) {
        let atom = literal.atom() as usize;
        debug_assert!(self.values[atom].is_none());

        self.values[atom] = Some(literal.polarity());
        self.previous[atom] = literal.polarity();
        self.level_of[atom] = self.current_level();
        self.reason_of[atom] = reason;
        self.trail.push(literal);
    }

    /// Unwinds the trail to `level`, unvaluing every atom assigned above it.
    pub(super) fn backtrack_to(&mut self, level: usize) {
        if level >= self.current_level() {
            return;
        }

        let keep = self.level_breaks[level];
        for index in keep..self.trail.len() {
            let atom = self.trail[index].atom() as usize;
            self.values[atom] = None;
            self.reason_of[atom] = None;
            self.activity.activate(atom);
        }
        self.trail.truncate(keep);
        self.level_breaks.truncate(level);
        self.queue_head = self.trail.len();
    }

    /// Clears any decisions made, keeping learnt clauses and level-zero consequences.
    ///
    /// After a solve, call this before adding clauses for a further query.
    pub fn clear_decisions(&mut self) {
        self.backtrack_to(0);
        if self.status != SolveStatus::Unsatisfiable {
            self.status = SolveStatus::Input;
        }
    }

    /// Adds a clause to the context.
    ///
    /// - A tautological clause is skipped.
    /// - A clause satisfied at level zero is skipped.
    /// - An empty clause --- as given, or after removing literals false at level zero --- marks the context unsatisfiable.
    /// - A unit clause is folded into the level-zero valuation and propagated.
    pub fn add_clause(&mut self, literals: Vec<SatLiteral>) -> Result<ClauseOk, SatError> {
        self.clear_decisions();

        if self.status == SolveStatus::Unsatisfiable {
            return Ok(ClauseOk::Added);
        }

        // Dedup, and check for a tautology.
        let mut clause: Vec<SatLiteral> = Vec::with_capacity(literals.len());
        for literal in literals {
            if clause.contains(&literal.negate()) {
                return Ok(ClauseOk::Tautology);
            }
            if !clause.contains(&literal) {
                clause.push(literal);
            }
        }

        // Literals settled at level zero are permanent.
        let mut reduced: Vec<SatLiteral> = Vec::with_capacity(clause.len());
        for literal in clause {
            match self.value_of_literal(literal) {
                Some(true) => return Ok(ClauseOk::Satisfied),
                Some(false) => {}
                None => reduced.push(literal),
            }
        }

        match reduced.len() {
            0 => {
                log::info!(target: targets::SAT, "unsatisfiable clause added");
                self.status = SolveStatus::Unsatisfiable;
                Ok(ClauseOk::Added)
            }

            1 => {
                self.assign(reduced[0], None);
                if self.propagate().is_some() {
                    self.status = SolveStatus::Unsatisfiable;
                }
                Ok(ClauseOk::Added)
            }

            _ => {
                let zero = reduced[0];
                let one = reduced[1];
                let key = self.clause_db.store(reduced, false);
                self.watches[zero.index()].push(key);
                self.watches[one.index()].push(key);
                Ok(ClauseOk::Added)
            }
        }
    }

    /// Registers the watched pair of a freshly learnt clause.
    pub(super) fn watch_learnt(&mut self, key: ClauseKey) {
        let clause = self.clause_db.get(key);
        let zero = clause.literals[0];
        let one = clause.literals[1];
        self.watches[zero.index()].push(key);
        self.watches[one.index()].push(key);
    }

    /// Increases the activity of `atom`, rescaling all activities on overflow.
    pub(super) fn bump_activity(&mut self, atom: usize) {
        let bumped = self.activity.value_at(atom) + self.bump;
        if bumped > 1e100 {
            self.activity.apply_to_all(|value| value * 1e-100);
            self.bump *= 1e-100;
            self.activity
                .revalue(atom, self.activity.value_at(atom) + self.bump);
        } else {
            self.activity.revalue(atom, bumped);
        }
    }

    /// Scales the activity increment by the configured decay.
    pub(super) fn decay_activities(&mut self) {
        self.bump /= self.config.activity_decay.value;
    }

    /// Set a callback to terminate a solve.
    pub fn set_callback_terminate(&mut self, callback: Box<CallbackTerminate>) {
        self.callback_terminate = Some(callback);
    }

    /// Check whether the terminate callback has requested termination of a solve.
    pub(super) fn check_callback_terminate(&mut self) -> bool {
        match &mut self.callback_terminate {
            Some(callback) => callback(),
            None => false,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new(SatConfig::default())
    }
}
