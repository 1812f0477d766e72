//! Satama core - pure game logic for harbor guessing and trivia
//!
//! No I/O happens here. Catalog content, clocks and persistence are supplied
//! by the caller; this crate turns them into rounds, scores and sessions.
//!
//! # Architecture
//!
//! - **Geo**: great-circle distance and bearing math
//! - **Hints**: progressive hint ladders with escalating penalties
//! - **Scoring**: distance and time curves bounded to `[0, max]`
//! - **Rounds**: location and trivia round state machines
//! - **Session**: result aggregation, totals and streaks
//! - **Runner**: sequences the rounds of one session
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use satama_core::{
//!     ActiveRound, Coordinate, Difficulty, Harbor, RoundMix, Rules, SessionConfig, SessionId,
//!     SessionRunner,
//! };
//!
//! # fn main() -> Result<(), satama_core::GameError> {
//! let helsinki = Harbor::new(
//!     "hel".into(),
//!     "Helsinki".to_string(),
//!     Coordinate::new(60.1699, 24.9384)?,
//!     Difficulty::Medium,
//!     Vec::new(),
//! );
//! let config = SessionConfig::default()
//!     .with_round_count(1)
//!     .with_mix(RoundMix::LocationOnly);
//! let mut runner = SessionRunner::start(
//!     SessionId::from(1),
//!     None,
//!     &config,
//!     vec![helsinki.clone()],
//!     Vec::new(),
//!     Rules::default(),
//!     Utc::now(),
//! )?;
//!
//! let round = runner.current_round().map(ActiveRound::id).expect("first round");
//! let result = runner.submit_guess(round, *helsinki.position(), Utc::now())?;
//! assert_eq!(*result.score(), 1000);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod geo;
mod hints;
mod location;
mod round;
mod runner;
mod scoring;
mod session;
mod trivia;
mod types;

// Crate-level exports - Errors
pub use error::GameError;

// Crate-level exports - Domain types
pub use types::{
    Answer, AnswerId, Clue, Coordinate, Difficulty, Harbor, HarborId, QuestionId, TriviaQuestion,
    UserId,
};

// Crate-level exports - Hints and scoring
pub use hints::{HintLadder, HintPayload, HintPolicy, HintStep};
pub use scoring::{LocationScoring, Rules, TriviaScoring, score_location, score_trivia};

// Crate-level exports - Rounds
pub use location::{LocationPhase, LocationRound};
pub use round::{Accuracy, RoundId, RoundKind, RoundResult, SessionId};
pub use trivia::{TriviaPhase, TriviaRound};

// Crate-level exports - Sessions
pub use runner::{ActiveRound, SessionRunner};
pub use session::{GameSession, MAX_ROUND_COUNT, RoundMix, SessionConfig, SessionStatus};
