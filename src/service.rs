//! Session registry exposed to front ends.
//!
//! [`GameService`] owns every running [`SessionRunner`] keyed by session id.
//! Catalog content is fetched when a session starts; the finished session is
//! handed to the result store when it ends.

use std::collections::HashMap;

use derive_getters::Getters;
use satama_core::{
    ActiveRound, AnswerId, Coordinate, GameSession, HintStep, RoundId, RoundKind, RoundResult,
    Rules, SessionConfig, SessionId, SessionRunner,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::catalog::{HarborCatalog, TriviaCatalog};
use crate::clock::Clock;
use crate::error::ServiceError;
use crate::identity::Identity;
use crate::store::ResultStore;

/// What happened to a finished session's results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum SaveStatus {
    /// Results were stored.
    #[display("score saved")]
    Saved,
    /// Guest session; nothing was stored.
    #[display("guest session, score not saved")]
    Skipped,
    /// The store rejected the results.
    #[display("score not saved: {}", _0)]
    Failed(String),
}

/// Final summary returned when a session ends.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct SessionOutcome {
    /// The completed session.
    session: GameSession,
    /// Outcome of persisting it.
    save: SaveStatus,
}

/// Runs game sessions against a catalog, identity, result store and clock.
#[derive(Debug)]
pub struct GameService<C, I, S, K> {
    catalog: C,
    identity: I,
    store: S,
    clock: K,
    rules: Rules,
    sessions: HashMap<SessionId, SessionRunner>,
    next_id: u64,
}

impl<C, I, S, K> GameService<C, I, S, K>
where
    C: HarborCatalog + TriviaCatalog,
    I: Identity,
    S: ResultStore,
    K: Clock,
{
    /// Creates a service with no running sessions.
    #[instrument(skip_all)]
    pub fn new(catalog: C, identity: I, store: S, clock: K, rules: Rules) -> Self {
        info!("Creating GameService");
        Self {
            catalog,
            identity,
            store,
            clock,
            rules,
            sessions: HashMap::new(),
            next_id: 1,
        }
    }

    /// Starts a session and presents its first round.
    ///
    /// Only catalog content of the configured difficulty is used, and only the
    /// round kinds the plan needs are fetched.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Catalog`] when content cannot be fetched, and
    /// [`ServiceError::Game`] for an invalid configuration or when a needed
    /// round kind has no content.
    #[instrument(skip(self, config), fields(rounds = config.round_count(), difficulty = %config.difficulty()))]
    pub fn start_session(&mut self, config: &SessionConfig) -> Result<GameSession, ServiceError> {
        let difficulty = Some(*config.difficulty());
        let plan = config.mix().plan(*config.round_count())?;

        let harbors = if plan.contains(&RoundKind::Location) {
            self.catalog.fetch_harbors(difficulty)?
        } else {
            Vec::new()
        };
        let questions = if plan.contains(&RoundKind::Trivia) {
            self.catalog.fetch_questions(difficulty)?
        } else {
            Vec::new()
        };

        let id = SessionId::from(self.next_id);
        let player = self.identity.current_user();
        let runner = SessionRunner::start(
            id,
            player,
            config,
            harbors,
            questions,
            self.rules.clone(),
            self.clock.now(),
        )?;
        self.next_id += 1;

        let session = runner.session().clone();
        self.sessions.insert(id, runner);
        info!(session_id = %id, active = self.sessions.len(), "Session started");
        Ok(session)
    }

    fn runner(&self, id: SessionId) -> Result<&SessionRunner, ServiceError> {
        self.sessions.get(&id).ok_or_else(|| {
            warn!(session_id = %id, "Unknown session");
            ServiceError::UnknownSession(id)
        })
    }

    fn runner_mut(&mut self, id: SessionId) -> Result<&mut SessionRunner, ServiceError> {
        self.sessions.get_mut(&id).ok_or_else(|| {
            warn!(session_id = %id, "Unknown session");
            ServiceError::UnknownSession(id)
        })
    }

    /// Current state of a running session.
    pub fn session(&self, id: SessionId) -> Result<&GameSession, ServiceError> {
        self.runner(id).map(SessionRunner::session)
    }

    /// The round awaiting input in a running session.
    pub fn current_round(&self, id: SessionId) -> Result<Option<&ActiveRound>, ServiceError> {
        self.runner(id).map(SessionRunner::current_round)
    }

    /// Reveals the next hint of a location round; `None` once exhausted.
    #[instrument(skip(self))]
    pub fn request_hint(&mut self, round: RoundId) -> Result<Option<HintStep>, ServiceError> {
        let hint = self.runner_mut(round.session())?.request_hint(round)?;
        debug!(revealed = hint.is_some(), "Hint requested");
        Ok(hint)
    }

    /// Submits a guess for a location round.
    #[instrument(skip(self))]
    pub fn submit_guess(
        &mut self,
        round: RoundId,
        guess: Coordinate,
    ) -> Result<RoundResult, ServiceError> {
        let now = self.clock.now();
        Ok(self.runner_mut(round.session())?.submit_guess(round, guess, now)?)
    }

    /// Submits an answer for a trivia round.
    #[instrument(skip(self))]
    pub fn submit_answer(
        &mut self,
        round: RoundId,
        answer: AnswerId,
    ) -> Result<RoundResult, ServiceError> {
        let now = self.clock.now();
        Ok(self.runner_mut(round.session())?.submit_answer(round, answer, now)?)
    }

    /// Resolves the session's trivia round as a timeout once its limit has
    /// passed on the service clock.
    #[instrument(skip(self))]
    pub fn expire_round(&mut self, id: SessionId) -> Result<Option<RoundResult>, ServiceError> {
        let now = self.clock.now();
        Ok(self.runner_mut(id)?.expire(now)?)
    }

    /// Ends a session and saves it for a signed-in player.
    ///
    /// A failed save is reported in the outcome; the session summary is
    /// returned regardless.
    #[instrument(skip(self))]
    pub fn end_session(&mut self, id: SessionId) -> Result<SessionOutcome, ServiceError> {
        let runner = self.sessions.remove(&id).ok_or_else(|| {
            warn!(session_id = %id, "Unknown session");
            ServiceError::UnknownSession(id)
        })?;
        let session = runner.end(self.clock.now());

        let save = if session.player().is_none() {
            debug!("Guest session, not saved");
            SaveStatus::Skipped
        } else {
            match self.store.persist(&session) {
                Ok(()) => SaveStatus::Saved,
                Err(e) => {
                    warn!(error = %e, "Failed to save session");
                    SaveStatus::Failed(e.message)
                }
            }
        };

        info!(
            total_score = session.total_score(),
            rounds = session.rounds_played(),
            best_streak = session.best_streak(),
            save = %save,
            "Session ended"
        );
        Ok(SessionOutcome { session, save })
    }

    /// Saved sessions of the current player, or of everyone for a guest.
    #[instrument(skip(self))]
    pub fn history(&self) -> Result<Vec<GameSession>, ServiceError> {
        let sessions = match self.identity.current_user() {
            Some(player) => self.store.load_for(&player)?,
            None => self.store.load_all()?,
        };
        Ok(sessions)
    }

    /// Ids of running sessions.
    pub fn active_sessions(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Rules applied to new sessions.
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// The clock used to timestamp operations.
    pub fn clock(&self) -> &K {
        &self.clock
    }
}
