//! Core domain types: coordinates, difficulty tiers, and catalog records.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{instrument, warn};

use crate::error::GameError;

// ─────────────────────────────────────────────────────────────
//  Identifiers
// ─────────────────────────────────────────────────────────────

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
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
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(
    /// Unique identifier of a harbor in the catalog.
    HarborId
);
string_id!(
    /// Unique identifier of a trivia question in the catalog.
    QuestionId
);
string_id!(
    /// Identifier of a candidate answer, unique within its question.
    AnswerId
);
string_id!(
    /// Identifier of an authenticated player.
    UserId
);

// ─────────────────────────────────────────────────────────────
//  Coordinate
// ─────────────────────────────────────────────────────────────

/// A point on the globe in decimal degrees.
///
/// Always within latitude [-90, 90] and longitude [-180, 180]; the only
/// constructors validate, including deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate", into = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Creates a validated coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidCoordinate`] when either component is out
    /// of range or not finite.
    #[instrument]
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GameError> {
        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        let lon_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);
        if !(lat_ok && lon_ok) {
            warn!(latitude, longitude, "Rejected out-of-range coordinate");
            return Err(GameError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in decimal degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = GameError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl From<Coordinate> for RawCoordinate {
    fn from(c: Coordinate) -> Self {
        Self {
            latitude: c.latitude,
            longitude: c.longitude,
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

// ─────────────────────────────────────────────────────────────
//  Difficulty
// ─────────────────────────────────────────────────────────────

/// Difficulty tier of catalog content and sessions.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Difficulty {
    /// Well-known harbors, generous distance falloff.
    Easy,
    /// The default tier.
    #[default]
    Medium,
    /// Obscure harbors, tight distance falloff.
    Hard,
}

impl Difficulty {
    /// Multiplier applied to the location decay distance for this tier.
    pub fn distance_factor(self) -> f64 {
        match self {
            Self::Easy => 2.0,
            Self::Medium => 1.0,
            Self::Hard => 0.5,
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Harbor
// ─────────────────────────────────────────────────────────────

/// A descriptive clue attached to a harbor by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clue {
    /// A textual clue.
    Text(String),
    /// A URI of an image clue.
    Image(String),
}

/// A harbor record from the catalog. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize, new)]
pub struct Harbor {
    /// Unique harbor id.
    id: HarborId,
    /// Display name.
    name: String,
    /// True location.
    position: Coordinate,
    /// Difficulty tier.
    #[serde(default)]
    difficulty: Difficulty,
    /// Ordered descriptive clues, revealed by the hint ladder.
    #[serde(default)]
    clues: Vec<Clue>,
}

// ─────────────────────────────────────────────────────────────
//  Trivia question
// ─────────────────────────────────────────────────────────────

/// One candidate answer of a trivia question.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct Answer {
    /// Answer id, unique within the question.
    id: AnswerId,
    /// Answer text shown to the player.
    text: String,
    /// Whether this is the correct answer.
    #[serde(default)]
    correct: bool,
}

/// A trivia question from the catalog. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct TriviaQuestion {
    /// Unique question id.
    id: QuestionId,
    /// Question text.
    prompt: String,
    /// Candidate answers, exactly one of them correct.
    answers: Vec<Answer>,
    /// Difficulty tier.
    #[serde(default)]
    difficulty: Difficulty,
}

impl TriviaQuestion {
    /// Returns the answer marked correct, if the question is well-formed.
    pub fn correct_answer(&self) -> Option<&Answer> {
        self.answers.iter().find(|a| a.correct)
    }

    /// Looks up a candidate answer by id.
    pub fn answer(&self, id: &AnswerId) -> Option<&Answer> {
        self.answers.iter().find(|a| &a.id == id)
    }

    /// Checks that answer ids are unique and exactly one answer is correct.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidInput`] describing the first problem found.
    #[instrument(skip(self), fields(question_id = %self.id))]
    pub fn validate(&self) -> Result<(), GameError> {
        if self.answers.is_empty() {
            return Err(GameError::invalid_input(format!(
                "Question {} has no answers",
                self.id
            )));
        }

        let mut seen = HashSet::new();
        for answer in &self.answers {
            if !seen.insert(&answer.id) {
                return Err(GameError::invalid_input(format!(
                    "Question {} repeats answer id {}",
                    self.id, answer.id
                )));
            }
        }

        let correct = self.answers.iter().filter(|a| a.correct).count();
        if correct != 1 {
            return Err(GameError::invalid_input(format!(
                "Question {} must have exactly one correct answer, found {}",
                self.id, correct
            )));
        }
        Ok(())
    }
}
