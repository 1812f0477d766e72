//! Satama - harbor-guessing and trivia game service
//!
//! Wires the pure game logic of [`satama_core`] to its collaborators.
//!
//! # Architecture
//!
//! - **Catalog**: harbors and trivia questions from TOML or memory
//! - **Identity**: the signed-in player, or a guest
//! - **Store**: finished sessions saved as JSON
//! - **Clock**: wall-clock or manual time
//! - **Service**: running sessions keyed by id
//! - **Console**: line-based terminal game loop
//!
//! # Example
//!
//! ```
//! use satama::{GameService, ManualClock, MemoryCatalog, MemoryResultStore, StaticIdentity};
//! use satama_core::{
//!     ActiveRound, Coordinate, Difficulty, Harbor, RoundMix, Rules, SessionConfig,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let harbor = Harbor::new(
//!     "hel".into(),
//!     "Helsinki".to_string(),
//!     Coordinate::new(60.1699, 24.9384)?,
//!     Difficulty::Medium,
//!     Vec::new(),
//! );
//! let catalog = MemoryCatalog::new(vec![harbor], Vec::new())?;
//! let mut service = GameService::new(
//!     catalog,
//!     StaticIdentity::user("aino"),
//!     MemoryResultStore::new(),
//!     ManualClock::default(),
//!     Rules::default(),
//! );
//!
//! let config = SessionConfig::default()
//!     .with_round_count(1)
//!     .with_mix(RoundMix::LocationOnly);
//! let session = service.start_session(&config)?;
//! let round = service
//!     .current_round(*session.id())?
//!     .map(ActiveRound::id)
//!     .expect("first round");
//! let result = service.submit_guess(round, Coordinate::new(60.1699, 24.9384)?)?;
//! assert_eq!(*result.score(), 1000);
//!
//! let outcome = service.end_session(*session.id())?;
//! assert_eq!(*outcome.session().total_score(), 1000);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod catalog;
mod clock;
mod config;
mod console;
mod error;
mod identity;
mod service;
mod store;

// Crate-level exports - Errors
pub use error::{CatalogError, ConfigError, ServiceError, StoreError};

// Crate-level exports - Collaborators
pub use catalog::{FileCatalog, HarborCatalog, MemoryCatalog, TriviaCatalog};
pub use clock::{Clock, ManualClock, SystemClock};
pub use identity::{Identity, StaticIdentity};
pub use store::{JsonResultStore, MemoryResultStore, ResultStore};

// Crate-level exports - Configuration
pub use config::{CONFIG_ENV, DEFAULT_CONFIG_FILE, GameConfig};

// Crate-level exports - Service
pub use console::play;
pub use service::{GameService, SaveStatus, SessionOutcome};
