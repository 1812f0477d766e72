//! Drives the rounds of one session.
//!
//! The runner owns the session aggregate, the content decks and the single
//! active round. A round must resolve before the next one is presented, and
//! the next one is presented as soon as the previous result is recorded.

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info, instrument, warn};

use crate::error::GameError;
use crate::hints::HintStep;
use crate::location::LocationRound;
use crate::round::{RoundId, RoundKind, RoundResult, SessionId};
use crate::scoring::Rules;
use crate::session::{GameSession, SessionConfig};
use crate::trivia::TriviaRound;
use crate::types::{AnswerId, Coordinate, Harbor, TriviaQuestion, UserId};

/// The round currently awaiting player input.
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveRound {
    /// A harbor-guessing round.
    Location(LocationRound),
    /// A trivia round.
    Trivia(TriviaRound),
}

impl ActiveRound {
    /// Id of the round.
    pub fn id(&self) -> RoundId {
        match self {
            Self::Location(r) => r.id(),
            Self::Trivia(r) => r.id(),
        }
    }

    /// Kind of the round.
    pub fn kind(&self) -> RoundKind {
        match self {
            Self::Location(_) => RoundKind::Location,
            Self::Trivia(_) => RoundKind::Trivia,
        }
    }
}

/// Catalog items drawn without replacement, reshuffled when used up.
#[derive(Debug, Clone)]
struct Deck<T> {
    items: Vec<T>,
    cursor: usize,
}

impl<T: Clone> Deck<T> {
    fn new(mut items: Vec<T>, rng: &mut StdRng) -> Self {
        items.shuffle(rng);
        Self { items, cursor: 0 }
    }

    fn draw(&mut self, rng: &mut StdRng) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        if self.cursor == self.items.len() {
            debug!(size = self.items.len(), "Deck exhausted, reshuffling");
            self.items.shuffle(rng);
            self.cursor = 0;
        }
        let item = self.items[self.cursor].clone();
        self.cursor += 1;
        Some(item)
    }
}

/// One session being played.
#[derive(Debug, Clone)]
pub struct SessionRunner {
    session: GameSession,
    rules: Rules,
    harbors: Deck<Harbor>,
    questions: Deck<TriviaQuestion>,
    rng: StdRng,
    current: Option<ActiveRound>,
}

impl SessionRunner {
    /// Starts a session and presents its first round.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CatalogEmpty`] when the plan needs a round kind
    /// with no content, and [`GameError::InvalidInput`] for an invalid
    /// configuration, unusable rules or a malformed question.
    #[instrument(
        skip(config, harbors, questions, rules),
        fields(harbors = harbors.len(), questions = questions.len())
    )]
    pub fn start(
        id: SessionId,
        player: Option<UserId>,
        config: &SessionConfig,
        harbors: Vec<Harbor>,
        questions: Vec<TriviaQuestion>,
        rules: Rules,
        now: DateTime<Utc>,
    ) -> Result<Self, GameError> {
        rules.validate()?;
        let session = GameSession::new(id, player, config, now)?;
        let difficulty = *config.difficulty();

        let needs = |kind| session.plan().contains(&kind);
        if needs(RoundKind::Location) && harbors.is_empty() {
            warn!("No harbors available");
            return Err(GameError::CatalogEmpty {
                kind: RoundKind::Location,
                difficulty,
            });
        }
        if needs(RoundKind::Trivia) && questions.is_empty() {
            warn!("No trivia questions available");
            return Err(GameError::CatalogEmpty {
                kind: RoundKind::Trivia,
                difficulty,
            });
        }
        questions.iter().try_for_each(TriviaQuestion::validate)?;

        let mut rng = match config.seed() {
            Some(seed) => StdRng::seed_from_u64(*seed),
            None => StdRng::from_entropy(),
        };
        let harbors = Deck::new(harbors, &mut rng);
        let questions = Deck::new(questions, &mut rng);

        let mut runner = Self {
            session,
            rules,
            harbors,
            questions,
            rng,
            current: None,
        };
        runner.present_next(now)?;
        Ok(runner)
    }

    /// Presents the next planned round if none is active.
    fn present_next(&mut self, now: DateTime<Utc>) -> Result<(), GameError> {
        if self.current.is_some() {
            return Ok(());
        }
        let (Some(id), Some(kind)) = (self.session.next_round_id(), self.session.next_round_kind())
        else {
            debug!("No further rounds planned");
            return Ok(());
        };
        let difficulty = *self.session.difficulty();

        let round = match kind {
            RoundKind::Location => {
                let harbor = self.harbors.draw(&mut self.rng).ok_or(GameError::CatalogEmpty {
                    kind,
                    difficulty,
                })?;
                let ladder = self.rules.hints().ladder_for(&harbor, difficulty);
                ActiveRound::Location(LocationRound::present(id, harbor, difficulty, ladder, now))
            }
            RoundKind::Trivia => {
                let question = self.questions.draw(&mut self.rng).ok_or(GameError::CatalogEmpty {
                    kind,
                    difficulty,
                })?;
                let limit = self.rules.trivia().time_limit();
                ActiveRound::Trivia(TriviaRound::present(id, question, limit, now))
            }
        };
        self.current = Some(round);
        Ok(())
    }

    fn inactive(&self, round: RoundId) -> GameError {
        warn!(%round, active = ?self.current.as_ref().map(ActiveRound::id), "Round is not active");
        GameError::invalid_state(round, "round is not the active round")
    }

    /// Reveals the next hint of the active location round.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidRoundState`] unless `round` is the active
    /// location round and still accepts hints.
    #[instrument(skip(self), fields(session_id = %self.session.id()))]
    pub fn request_hint(&mut self, round: RoundId) -> Result<Option<HintStep>, GameError> {
        let Some(ActiveRound::Location(active)) = &self.current else {
            return Err(self.inactive(round));
        };
        if active.id() != round {
            return Err(self.inactive(round));
        }
        let (next, hint) = active.request_hint()?;
        self.current = Some(ActiveRound::Location(next));
        Ok(hint)
    }

    /// Submits a guess for the active location round and resolves it.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidRoundState`] unless `round` is the active
    /// location round.
    #[instrument(skip(self), fields(session_id = %self.session.id()))]
    pub fn submit_guess(
        &mut self,
        round: RoundId,
        guess: Coordinate,
        now: DateTime<Utc>,
    ) -> Result<RoundResult, GameError> {
        let Some(ActiveRound::Location(active)) = &self.current else {
            return Err(self.inactive(round));
        };
        if active.id() != round {
            return Err(self.inactive(round));
        }
        let (_, result) = active
            .submit_guess(guess, now)?
            .resolve(self.rules.location())?;
        self.advance(result, now)
    }

    /// Submits an answer for the active trivia round and resolves it.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidRoundState`] unless `round` is the active
    /// trivia round, or [`GameError::InvalidInput`] for an unknown answer.
    #[instrument(skip(self), fields(session_id = %self.session.id()))]
    pub fn submit_answer(
        &mut self,
        round: RoundId,
        answer: AnswerId,
        now: DateTime<Utc>,
    ) -> Result<RoundResult, GameError> {
        let Some(ActiveRound::Trivia(active)) = &self.current else {
            return Err(self.inactive(round));
        };
        if active.id() != round {
            return Err(self.inactive(round));
        }
        let (_, result) = active
            .submit_answer(answer, now)?
            .resolve(self.rules.trivia())?;
        self.advance(result, now)
    }

    /// Resolves the active trivia round as a timeout if its limit has passed.
    ///
    /// # Errors
    ///
    /// Propagates recording errors; never fails for a location round.
    #[instrument(skip(self), fields(session_id = %self.session.id()))]
    pub fn expire(&mut self, now: DateTime<Utc>) -> Result<Option<RoundResult>, GameError> {
        let Some(ActiveRound::Trivia(active)) = &self.current else {
            return Ok(None);
        };
        match active.expire(now, self.rules.trivia())? {
            Some((_, result)) => self.advance(result, now).map(Some),
            None => Ok(None),
        }
    }

    fn advance(&mut self, result: RoundResult, now: DateTime<Utc>) -> Result<RoundResult, GameError> {
        self.session.record(result.clone(), now)?;
        self.current = None;
        self.present_next(now)?;
        Ok(result)
    }

    /// Ends the session, discarding any unresolved round.
    #[instrument(skip(self), fields(session_id = %self.session.id()))]
    pub fn end(mut self, now: DateTime<Utc>) -> GameSession {
        if let Some(active) = self.current.take() {
            info!(round = %active.id(), "Discarding unresolved round");
        }
        self.session.finish(now);
        self.session
    }

    /// The session aggregate.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// The round awaiting input, if any.
    pub fn current_round(&self) -> Option<&ActiveRound> {
        self.current.as_ref()
    }

    /// Scoring rules in force.
    pub fn rules(&self) -> &Rules {
        &self.rules
    }
}
