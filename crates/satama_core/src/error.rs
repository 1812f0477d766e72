//! Error taxonomy for the game core.

use crate::round::{RoundId, RoundKind};
use crate::types::Difficulty;

/// Error raised by a game-core operation.
///
/// `InvalidCoordinate`, `InvalidInput` and `InvalidRoundState` are usage
/// errors and are surfaced to the caller unchanged. `CatalogEmpty` aborts
/// session creation before any round starts.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum GameError {
    /// Latitude or longitude outside the valid range, or not finite.
    #[display("Invalid coordinate: latitude {}, longitude {}", latitude, longitude)]
    InvalidCoordinate {
        /// Offending latitude in decimal degrees.
        latitude: f64,
        /// Offending longitude in decimal degrees.
        longitude: f64,
    },

    /// A numeric or identifier argument is out of its domain.
    #[display("Invalid input: {}", _0)]
    InvalidInput(String),

    /// An operation was attempted out of sequence.
    #[display("Invalid state for round {}: {}", round, reason)]
    InvalidRoundState {
        /// The round the operation targeted.
        round: RoundId,
        /// What was wrong with the sequence.
        reason: String,
    },

    /// No catalog items are available for a round kind.
    #[display("No {} content available for difficulty {}", kind, difficulty)]
    CatalogEmpty {
        /// The round kind lacking content.
        kind: RoundKind,
        /// The requested difficulty.
        difficulty: Difficulty,
    },
}

impl std::error::Error for GameError {}

impl GameError {
    /// Builds an [`GameError::InvalidInput`] from any message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Builds an [`GameError::InvalidRoundState`] for the given round.
    pub fn invalid_state(round: RoundId, reason: impl Into<String>) -> Self {
        Self::InvalidRoundState {
            round,
            reason: reason.into(),
        }
    }
}
