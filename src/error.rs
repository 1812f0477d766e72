//! Application error types.

use derive_more::{Display, Error, From};
use satama_core::{GameError, SessionId};
use tracing::instrument;

/// Configuration error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Catalog loading or validation error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Catalog error: {} at {}:{}", message, file, line)]
pub struct CatalogError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl CatalogError {
    /// Creates a new catalog error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<GameError> for CatalogError {
    #[track_caller]
    fn from(err: GameError) -> Self {
        Self::new(format!("Invalid catalog entry: {}", err))
    }
}

/// Result persistence error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Store error: {} at {}:{}", message, file, line)]
pub struct StoreError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for StoreError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for StoreError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("JSON error: {}", err))
    }
}

/// Error returned by [`GameService`](crate::GameService) operations.
#[derive(Debug, Clone, Display, From)]
pub enum ServiceError {
    /// A game rule rejected the operation.
    #[display("{}", _0)]
    Game(GameError),

    /// Catalog content could not be fetched.
    #[display("{}", _0)]
    Catalog(CatalogError),

    /// Saved results could not be read.
    #[display("{}", _0)]
    Store(StoreError),

    /// No session with this id is running.
    #[display("Unknown session: {}", _0)]
    #[from(skip)]
    UnknownSession(SessionId),
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Game(err) => Some(err),
            Self::Catalog(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::UnknownSession(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_record_their_origin() {
        let err = StoreError::new("disk full");
        assert_eq!(err.file, file!());
        assert!(err.to_string().starts_with("Store error: disk full at"));
    }

    #[test]
    fn service_error_wraps_game_error() {
        let err: ServiceError = GameError::invalid_input("bad").into();
        assert!(matches!(err, ServiceError::Game(GameError::InvalidInput(_))));
        assert!(std::error::Error::source(&err).is_some());
    }
}
