//! Game configuration file.
//!
//! Every field has a default, so an empty `satama.toml` is valid:
//!
//! ```toml
//! catalog_path = "data/catalog.toml"
//! results_path = "satama_results.json"
//!
//! [session]
//! round_count = 5
//! difficulty = "medium"
//! mix = "alternating"      # or "location", "trivia", "location,location,trivia"
//!
//! [rules.trivia]
//! time_limit_secs = 30
//! ```

use std::path::{Path, PathBuf};

use derive_getters::Getters;
use satama_core::{Rules, SessionConfig, UserId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::ConfigError;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "SATAMA_CONFIG";

/// Configuration file used when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_FILE: &str = "satama.toml";

/// Settings for the service and CLI.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Defaults for new sessions.
    session: SessionConfig,

    /// Scoring and hint rules.
    rules: Rules,

    /// TOML catalog of harbors and questions.
    catalog_path: PathBuf,

    /// JSON file of saved sessions.
    results_path: PathBuf,

    /// Signed-in player; guests when unset.
    player: Option<UserId>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            rules: Rules::default(),
            catalog_path: PathBuf::from("data/catalog.toml"),
            results_path: PathBuf::from("satama_results.json"),
            player: None,
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    ///
    /// Rules that could never score a round are rejected here rather than
    /// mid-session.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config
            .rules
            .validate()
            .map_err(|e| ConfigError::new(format!("Invalid rules: {}", e)))?;

        info!(
            rounds = config.session.round_count(),
            difficulty = %config.session.difficulty(),
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Loads the configuration named by `explicit`, then [`CONFIG_ENV`], then
    /// [`DEFAULT_CONFIG_FILE`] if it exists; defaults otherwise.
    ///
    /// A file that was named explicitly or by the environment must exist.
    #[instrument(skip(explicit))]
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            debug!(%path, "Config named by environment");
            return Self::from_file(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.exists() {
            return Self::from_file(fallback);
        }
        debug!("No config file, using defaults");
        Ok(Self::default())
    }

    /// Replaces the session defaults.
    pub fn with_session(self, session: SessionConfig) -> Self {
        Self { session, ..self }
    }

    /// Replaces the catalog path.
    pub fn with_catalog_path(self, catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            catalog_path: catalog_path.into(),
            ..self
        }
    }

    /// Replaces the results path.
    pub fn with_results_path(self, results_path: impl Into<PathBuf>) -> Self {
        Self {
            results_path: results_path.into(),
            ..self
        }
    }

    /// Replaces the player.
    pub fn with_player(self, player: Option<UserId>) -> Self {
        Self { player, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satama_core::{Difficulty, RoundKind, RoundMix};

    #[test]
    fn empty_file_uses_defaults() {
        let config: GameConfig = toml::from_str("").unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config: GameConfig = toml::from_str(
            r#"
player = "aino"

[session]
round_count = 3
difficulty = "hard"
mix = "trivia_only"

[rules.trivia]
time_limit_secs = 20
"#,
        )
        .unwrap();

        assert_eq!(*config.session().round_count(), 3);
        assert_eq!(*config.session().difficulty(), Difficulty::Hard);
        assert_eq!(*config.session().mix(), RoundMix::TriviaOnly);
        assert_eq!(*config.session().streak_threshold(), 500);
        assert_eq!(*config.rules().trivia().time_limit_secs(), 20);
        assert_eq!(*config.rules().trivia().max_score(), 1000);
        assert_eq!(config.player().as_ref().map(UserId::as_str), Some("aino"));
        assert_eq!(config.catalog_path(), Path::new("data/catalog.toml"));
    }

    #[test]
    fn unknown_difficulty_is_rejected() {
        assert!(toml::from_str::<GameConfig>("[session]\ndifficulty = \"brutal\"").is_err());
    }

    #[test]
    fn mix_accepts_the_command_line_syntax() {
        let config: GameConfig =
            toml::from_str("[session]\nmix = \"location,trivia,trivia\"").unwrap();
        assert_eq!(
            *config.session().mix(),
            RoundMix::Custom(vec![RoundKind::Location, RoundKind::Trivia, RoundKind::Trivia])
        );
        let config: GameConfig = toml::from_str("[session]\nmix = \"location\"").unwrap();
        assert_eq!(*config.session().mix(), RoundMix::LocationOnly);
    }
}
