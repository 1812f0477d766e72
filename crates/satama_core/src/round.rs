//! Round identity and the immutable result a resolved round emits.

use chrono::TimeDelta;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Identifier of a game session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[display("session-{}", _0)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    /// Returns the raw numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Identifier of a round: its session plus a 1-based ordinal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("{}#{}", session, ordinal)]
pub struct RoundId {
    session: SessionId,
    ordinal: u32,
}

impl RoundId {
    /// Creates a round id.
    pub fn new(session: SessionId, ordinal: u32) -> Self {
        Self { session, ordinal }
    }

    /// The session this round belongs to.
    pub fn session(self) -> SessionId {
        self.session
    }

    /// 1-based position of the round within its session.
    pub fn ordinal(self) -> u32 {
        self.ordinal
    }
}

/// The two kinds of rounds a session can contain.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RoundKind {
    /// Guess where a harbor is.
    Location,
    /// Answer a trivia question.
    Trivia,
}

/// How accurate the player was in a round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Accuracy {
    /// Distance between guess and harbor.
    Distance {
        /// Great-circle distance in meters.
        meters: f64,
        /// Initial bearing from the guess towards the harbor, degrees.
        bearing_deg: f64,
    },
    /// Outcome of a trivia answer.
    Answer {
        /// Whether the selected answer was the correct one.
        correct: bool,
        /// Whether the round ended by running out of time.
        timed_out: bool,
    },
}

/// Outcome of one resolved round. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct RoundResult {
    round: RoundId,
    kind: RoundKind,
    score: u32,
    accuracy: Accuracy,
    hints_used: usize,
    elapsed_ms: i64,
}

impl RoundResult {
    pub(crate) fn new(
        round: RoundId,
        kind: RoundKind,
        score: u32,
        accuracy: Accuracy,
        hints_used: usize,
        elapsed: TimeDelta,
    ) -> Self {
        Self {
            round,
            kind,
            score,
            accuracy,
            hints_used,
            elapsed_ms: elapsed.num_milliseconds(),
        }
    }

    /// Time between the round being presented and resolved.
    pub fn elapsed(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.elapsed_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_id_display() {
        let id = RoundId::new(SessionId::from(7), 3);
        assert_eq!(id.to_string(), "session-7#3");
        assert_eq!(id.session().get(), 7);
    }

    #[test]
    fn elapsed_round_trips_through_millis() {
        let result = RoundResult::new(
            RoundId::new(SessionId::from(1), 1),
            RoundKind::Trivia,
            10,
            Accuracy::Answer {
                correct: true,
                timed_out: false,
            },
            0,
            TimeDelta::milliseconds(12_345),
        );
        assert_eq!(result.elapsed(), TimeDelta::milliseconds(12_345));
    }
}
