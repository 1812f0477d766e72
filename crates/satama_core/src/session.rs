//! Session aggregator: ordering, totals and streaks over resolved rounds.
//!
//! The aggregator never resolves a round itself. It only accepts the
//! [`RoundResult`]s emitted by the round controllers, in order.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::GameError;
use crate::round::{RoundId, RoundKind, RoundResult, SessionId};
use crate::types::{Difficulty, UserId};

// ─────────────────────────────────────────────────────────────
//  Configuration
// ─────────────────────────────────────────────────────────────

/// Longest session a plan may describe.
pub const MAX_ROUND_COUNT: u32 = 100;

/// Which round kinds a session contains and in what order.
///
/// Written the same way on the command line and in config files:
/// `location`, `trivia`, `alternating`, or a pattern such as
/// `location,location,trivia`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RoundMix {
    /// Harbor rounds only.
    LocationOnly,
    /// Trivia rounds only.
    TriviaOnly,
    /// Location, trivia, location, ...
    #[default]
    Alternating,
    /// A pattern repeated until the round count is reached.
    Custom(Vec<RoundKind>),
}

impl RoundMix {
    /// Expands the mix into a plan of `round_count` kinds.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidInput`] for an empty custom pattern or a
    /// round count above [`MAX_ROUND_COUNT`].
    pub fn plan(&self, round_count: u32) -> Result<Vec<RoundKind>, GameError> {
        if round_count > MAX_ROUND_COUNT {
            return Err(GameError::invalid_input(format!(
                "A session has at most {MAX_ROUND_COUNT} rounds, got {round_count}"
            )));
        }
        let pattern: &[RoundKind] = match self {
            Self::LocationOnly => &[RoundKind::Location],
            Self::TriviaOnly => &[RoundKind::Trivia],
            Self::Alternating => &[RoundKind::Location, RoundKind::Trivia],
            Self::Custom(kinds) if kinds.is_empty() => {
                return Err(GameError::invalid_input("Custom round mix is empty"));
            }
            Self::Custom(kinds) => kinds,
        };
        Ok(pattern
            .iter()
            .copied()
            .cycle()
            .take(round_count as usize)
            .collect())
    }
}

impl std::str::FromStr for RoundMix {
    type Err = GameError;

    /// Parses `location`, `trivia`, `alternating`, or a comma-separated
    /// pattern such as `location,location,trivia`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "location" | "location_only" => Ok(Self::LocationOnly),
            "trivia" | "trivia_only" => Ok(Self::TriviaOnly),
            "alternating" => Ok(Self::Alternating),
            other => other
                .split(',')
                .map(|part| {
                    part.trim().parse::<RoundKind>().map_err(|_| {
                        GameError::invalid_input(format!("Unknown round kind '{}'", part.trim()))
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Custom),
        }
    }
}

impl std::fmt::Display for RoundMix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LocationOnly => write!(f, "location"),
            Self::TriviaOnly => write!(f, "trivia"),
            Self::Alternating => write!(f, "alternating"),
            Self::Custom(kinds) => {
                let pattern: Vec<String> = kinds.iter().map(ToString::to_string).collect();
                write!(f, "{}", pattern.join(","))
            }
        }
    }
}

impl TryFrom<String> for RoundMix {
    type Error = GameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RoundMix> for String {
    fn from(mix: RoundMix) -> Self {
        mix.to_string()
    }
}

/// Settings chosen when a session starts.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct SessionConfig {
    /// Number of rounds to play.
    round_count: u32,
    /// Difficulty of content and scoring.
    difficulty: Difficulty,
    /// Composition of the round sequence.
    mix: RoundMix,
    /// Rounds scoring strictly above this extend the streak.
    streak_threshold: u32,
    /// Seed for deck shuffling; random when unset.
    #[setters(strip_option)]
    seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            round_count: 5,
            difficulty: Difficulty::Medium,
            mix: RoundMix::Alternating,
            streak_threshold: 500,
            seed: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Game session
// ─────────────────────────────────────────────────────────────

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Rounds are still being played.
    InProgress,
    /// Every planned round was resolved, or the player ended early.
    Completed,
}

/// Aggregated state of a game session.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct GameSession {
    /// Session id.
    id: SessionId,
    /// Authenticated player, `None` for guests.
    player: Option<UserId>,
    /// Difficulty the session is played at.
    difficulty: Difficulty,
    /// Planned round kinds in order.
    plan: Vec<RoundKind>,
    /// Score threshold a round must exceed to extend the streak.
    streak_threshold: u32,
    /// Results of resolved rounds, in order.
    results: Vec<RoundResult>,
    /// Sum of all round scores.
    total_score: u64,
    /// Consecutive rounds above the threshold, ending with the latest.
    streak: u32,
    /// Longest streak seen in this session.
    best_streak: u32,
    /// Lifecycle status.
    status: SessionStatus,
    /// When the session started.
    started_at: DateTime<Utc>,
    /// When the session was completed.
    finished_at: Option<DateTime<Utc>>,
}

impl GameSession {
    /// Creates an in-progress session with a planned round sequence.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidInput`] for a zero round count or an
    /// empty custom mix.
    #[instrument(skip(config), fields(rounds = config.round_count, difficulty = %config.difficulty))]
    pub fn new(
        id: SessionId,
        player: Option<UserId>,
        config: &SessionConfig,
        started_at: DateTime<Utc>,
    ) -> Result<Self, GameError> {
        if config.round_count == 0 {
            return Err(GameError::invalid_input("A session needs at least one round"));
        }
        let plan = config.mix.plan(config.round_count)?;
        info!(session_id = %id, guest = player.is_none(), "Creating game session");
        Ok(Self {
            id,
            player,
            difficulty: config.difficulty,
            plan,
            streak_threshold: config.streak_threshold,
            results: Vec::new(),
            total_score: 0,
            streak: 0,
            best_streak: 0,
            status: SessionStatus::InProgress,
            started_at,
            finished_at: None,
        })
    }

    /// Id the next round must carry, or `None` when no round is due.
    pub fn next_round_id(&self) -> Option<RoundId> {
        if self.status == SessionStatus::Completed || self.results.len() >= self.plan.len() {
            return None;
        }
        Some(RoundId::new(self.id, self.results.len() as u32 + 1))
    }

    /// Kind of the next round, or `None` when no round is due.
    pub fn next_round_kind(&self) -> Option<RoundKind> {
        self.next_round_id()
            .and_then(|id| self.plan.get(id.ordinal() as usize - 1).copied())
    }

    /// Accepts the result of the next round.
    ///
    /// Updates the total and the streak, and completes the session once every
    /// planned round is recorded.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidRoundState`] for a completed session, or a
    /// result that is not the next expected round of this session
    /// (duplicates included).
    #[instrument(skip(self, result), fields(session_id = %self.id, round = %result.round()))]
    pub fn record(&mut self, result: RoundResult, at: DateTime<Utc>) -> Result<(), GameError> {
        let round = *result.round();
        let Some(expected) = self.next_round_id() else {
            warn!("Result offered to a finished session");
            return Err(GameError::invalid_state(round, "session is completed"));
        };
        if round != expected {
            warn!(%expected, "Out-of-sequence round result");
            return Err(GameError::invalid_state(
                round,
                format!("expected result for round {expected}"),
            ));
        }
        let planned = self.plan[expected.ordinal() as usize - 1];
        if *result.kind() != planned {
            return Err(GameError::invalid_state(
                round,
                format!("expected a {planned} round result"),
            ));
        }

        let score = *result.score();
        self.total_score += u64::from(score);
        if score > self.streak_threshold {
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
        } else {
            self.streak = 0;
        }
        self.results.push(result);
        debug!(score, total = self.total_score, streak = self.streak, "Round recorded");

        if self.results.len() == self.plan.len() {
            self.complete(at);
        }
        Ok(())
    }

    /// Ends the session, keeping only the rounds already recorded.
    ///
    /// Idempotent: finishing a completed session changes nothing.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn finish(&mut self, at: DateTime<Utc>) {
        if self.status == SessionStatus::InProgress {
            info!(played = self.results.len(), planned = self.plan.len(), "Session ended early");
            self.complete(at);
        }
    }

    fn complete(&mut self, at: DateTime<Utc>) {
        self.status = SessionStatus::Completed;
        self.finished_at = Some(at);
        info!(total = self.total_score, best_streak = self.best_streak, "Session completed");
    }

    /// Whether the session is completed.
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    /// Number of rounds resolved so far.
    pub fn rounds_played(&self) -> usize {
        self.results.len()
    }

    /// Mean score per resolved round, `None` before the first round.
    pub fn average_score(&self) -> Option<f64> {
        if self.results.is_empty() {
            None
        } else {
            Some(self.total_score as f64 / self.results.len() as f64)
        }
    }
}
