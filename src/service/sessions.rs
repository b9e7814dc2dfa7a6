/*!
Sessions, and the reaper which retires them.

A session is a premise list with an engine session caching its assertions.
The premise list is the source of truth: whatever state the engine session holds must be reconstructible by replaying the premises in order, and *rebuilding* --- close the engine session, open one on the best-fit engine, replay --- is the recovery for every incremental misstep:

- an assert which changes the problem shape (arithmetic appears, Horn-ness is lost) rebuilds onto the newly best engine;
- an incremental assert or retract which the engine rejects rebuilds on the spot.

Operations on one session serialize through its own lock, so a query observes exactly the premises asserted before it; distinct sessions do not order against each other.
The table itself takes a single lock around the map.

The reaper scans on an interval, destroys sessions idle past their time-to-live, logs, and swallows its own errors --- a reaper mishap must never take the service down.
*/

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use uuid::Uuid;

use crate::{
    config::SessionConfig,
    engines::{EngineManager, EngineSession, ProofOptions, ProofOutcome},
    language::ast::{Atom, Formula, Term},
    misc::log::targets,
    types::err::{ErrorKind, SessionError},
};

/// An ontology: synonym to canonical name, applied to predicates, functions, and constants.
pub type Ontology = BTreeMap<String, String>;

/// One session.
pub struct Session {
    pub id: String,

    /// Premise sources, in assertion order --- the source of truth.
    pub premises: Vec<String>,

    /// The premises, parsed and ontology-expanded, in the same order.
    parsed: Vec<Formula>,

    /// The cached engine session, when one is open.
    engine_session: Option<Box<dyn EngineSession>>,

    pub created_at: Instant,
    pub last_accessed_at: Instant,
    pub ttl: Duration,
    pub ontology: Option<Ontology>,
}

impl Session {
    /// The engine currently holding the session's state.
    pub fn engine_name(&self) -> Option<&'static str> {
        self.engine_session.as_ref().map(|s| s.engine_name())
    }

    fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.last_accessed_at) >= self.ttl
    }

    /// Asserts a premise, rebuilding the engine session when required.
    pub fn assert_premise(
        &mut self,
        manager: &EngineManager,
        source: &str,
        formula: Formula,
    ) -> Result<(), ErrorKind> {
        let formula = match &self.ontology {
            Some(ontology) => expand_ontology(formula, ontology),
            None => formula,
        };

        let mut widened = self.parsed.clone();
        widened.push(formula.clone());
        let desired = manager.select_engine(&widened, None)?;

        let mut rebuilt = match self.engine_name() {
            None => true,
            Some(current) => current != desired,
        };
        if rebuilt {
            let existing = self.parsed.clone();
            self.rebuild(manager, desired, &existing)?;
        }

        // Incremental first; one rebuild on refusal, then the refusal stands.
        loop {
            let engine_session = self
                .engine_session
                .as_mut()
                .expect("rebuild opens a session");
            match engine_session.assert_formula(source, &formula) {
                Ok(()) => break,
                Err(error) if !rebuilt => {
                    log::info!(
                        target: targets::SESSION,
                        "incremental assert refused ({error}); rebuilding",
                    );
                    let existing = self.parsed.clone();
                    self.rebuild(manager, desired, &existing)?;
                    rebuilt = true;
                }
                Err(error) => return Err(error),
            }
        }

        self.premises.push(source.to_string());
        self.parsed.push(formula);
        Ok(())
    }

    /// Retracts a premise by byte-identical source; false if absent.
    pub fn retract_premise(&mut self, manager: &EngineManager, source: &str) -> Result<bool, ErrorKind> {
        let Some(position) = self.premises.iter().position(|p| p == source) else {
            return Ok(false);
        };

        self.premises.remove(position);
        self.parsed.remove(position);

        let retracted = match &mut self.engine_session {
            Some(engine_session) => engine_session.retract_formula(source),
            None => true,
        };
        if !retracted {
            let desired = manager.select_engine(&self.parsed, None)?;
            let parsed = self.parsed.clone();
            self.rebuild(manager, desired, &parsed)?;
        }

        Ok(true)
    }

    /// Queries the asserted premises.
    pub fn query(
        &mut self,
        manager: &EngineManager,
        goal: &Formula,
        options: &ProofOptions,
    ) -> Result<ProofOutcome, ErrorKind> {
        let goal = match &self.ontology {
            Some(ontology) => expand_ontology(goal.clone(), ontology),
            None => goal.clone(),
        };

        // Re-score with the goal in view; a mismatched engine rebuilds before the query.
        let desired = manager.select_engine(&self.parsed, Some(&goal))?;
        if self.engine_name() != Some(desired) {
            let parsed = self.parsed.clone();
            self.rebuild(manager, desired, &parsed)?;
        }

        match &mut self.engine_session {
            Some(engine_session) => engine_session.query(&goal, options),
            None => unreachable!("rebuild opens a session"),
        }
    }

    /// Removes every premise, keeping the session alive.
    pub fn clear(&mut self) {
        self.premises.clear();
        self.parsed.clear();
        if let Some(engine_session) = &mut self.engine_session {
            engine_session.clear();
        }
    }

    /// Closes the old engine session, opens one on `engine`, and replays `premises`.
    fn rebuild(
        &mut self,
        manager: &EngineManager,
        engine: &str,
        premises: &[Formula],
    ) -> Result<(), ErrorKind> {
        log::info!(
            target: targets::SESSION,
            "session {} rebuilding onto '{engine}'",
            self.id,
        );

        // Dropping the old session releases whatever it owns.
        self.engine_session = None;

        let mut fresh = manager.create_session(engine)?;
        for (source, formula) in self.premises.iter().zip(premises.iter()) {
            fresh.assert_formula(source, formula)?;
        }
        self.engine_session = Some(fresh);
        Ok(())
    }
}

/// Renames predicates, functions, and constants through the ontology.
fn expand_ontology(formula: Formula, ontology: &Ontology) -> Formula {
    let canonical =
        |name: String| -> String { ontology.get(&name).cloned().unwrap_or(name) };

    fn term(t: Term, canonical: &dyn Fn(String) -> String) -> Term {
        match t {
            Term::Variable(_) => t,
            Term::Constant(name) => Term::Constant(canonical(name)),
            Term::Function { name, args } => Term::Function {
                name: canonical(name),
                args: args.into_iter().map(|a| term(a, canonical)).collect(),
            },
        }
    }

    formula.map_pre_order(&mut |node| match node {
        Formula::Atom(Atom::Predicate { name, args }) => Formula::Atom(Atom::Predicate {
            name: canonical(name),
            args: args.into_iter().map(|a| term(a, &canonical)).collect(),
        }),
        Formula::Atom(Atom::Equals(l, r)) => {
            Formula::Atom(Atom::Equals(term(l, &canonical), term(r, &canonical)))
        }
        other => other,
    })
}

/// The session table.
pub struct SessionTable {
    config: SessionConfig,
    sessions: Mutex<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionTable {
    pub fn new(config: SessionConfig) -> Arc<Self> {
        Arc::new(SessionTable {
            config,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Spawns the reaper thread; it holds only a weak reference, so the table's drop ends it.
    pub fn spawn_reaper(table: &Arc<Self>) {
        let weak = Arc::downgrade(table);
        let interval = table.config.reap_interval.value;

        std::thread::spawn(move || loop {
            std::thread::sleep(interval);
            match weak.upgrade() {
                Some(table) => table.reap(),
                None => break,
            }
        });
    }

    /// Creates a session, returning its id.
    pub fn create(
        &self,
        ttl: Option<Duration>,
        ontology: Option<Ontology>,
    ) -> Result<String, ErrorKind> {
        let mut sessions = self.sessions.lock().expect("session table lock");

        let limit = self.config.max_sessions.value;
        if sessions.len() >= limit {
            return Err(ErrorKind::Session(SessionError::Limit(limit)));
        }

        let ttl = ttl
            .unwrap_or(self.config.default_ttl.value)
            .min(self.config.max_ttl.value);

        let id = Uuid::new_v4().to_string();
        let now = Instant::now();
        let session = Session {
            id: id.clone(),
            premises: Vec::new(),
            parsed: Vec::new(),
            engine_session: None,
            created_at: now,
            last_accessed_at: now,
            ttl,
            ontology,
        };

        log::info!(target: targets::SESSION, "created session {id}");
        sessions.insert(id.clone(), Arc::new(Mutex::new(session)));
        Ok(id)
    }

    /// Runs `operation` on the session behind `id`, under the session's lock.
    pub fn with_session<T>(
        &self,
        id: &str,
        operation: impl FnOnce(&mut Session) -> Result<T, ErrorKind>,
    ) -> Result<T, ErrorKind> {
        let slot = {
            let sessions = self.sessions.lock().expect("session table lock");
            sessions
                .get(id)
                .cloned()
                .ok_or_else(|| ErrorKind::Session(SessionError::NotFound(id.to_string())))?
        };

        // The table lock is released; only this session serializes here.
        let mut session = slot.lock().expect("session lock");
        session.last_accessed_at = Instant::now();
        operation(&mut session)
    }

    /// Destroys the session behind `id`.
    pub fn delete(&self, id: &str) -> Result<(), ErrorKind> {
        let mut sessions = self.sessions.lock().expect("session table lock");
        match sessions.remove(id) {
            // Dropping the slot drops the engine session and its resources.
            Some(_) => Ok(()),
            None => Err(ErrorKind::Session(SessionError::NotFound(id.to_string()))),
        }
    }

    /// The count of live sessions.
    pub fn live_count(&self) -> usize {
        self.sessions.lock().expect("session table lock").len()
    }

    /// Destroys every session past its time-to-live.
    pub fn reap(&self) {
        let now = Instant::now();
        let expired: Vec<String> = {
            let sessions = self.sessions.lock().expect("session table lock");
            sessions
                .iter()
                .filter_map(|(id, slot)| match slot.try_lock() {
                    Ok(session) => session.expired(now).then(|| id.clone()),
                    // A busy session is in use, hence not expired.
                    Err(_) => None,
                })
                .collect()
        };

        for id in expired {
            log::info!(target: targets::SESSION, "reaping session {id}");
            if let Err(error) = self.delete(&id) {
                // Reaper errors are logged and swallowed.
                log::warn!(target: targets::SESSION, "reap of {id} failed: {error}");
            }
        }
    }
}
