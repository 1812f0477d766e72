//! Scoring curves for location and trivia rounds.
//!
//! Location score decays exponentially with distance between an inclusive
//! "perfect" radius and an inclusive cutoff, then pays for the hints used.
//! Trivia score falls linearly from the maximum to a floor over the time
//! limit. Both are bounded to `[0, max_score]`.

use chrono::TimeDelta;
use derive_getters::Getters;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::error::GameError;
use crate::hints::HintPolicy;
use crate::types::Difficulty;

// ─────────────────────────────────────────────────────────────
//  Location
// ─────────────────────────────────────────────────────────────

/// Parameters of the distance-to-score curve.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct LocationScoring {
    /// Score for a guess inside the perfect radius.
    max_score: u32,
    /// Guesses at or within this distance score the maximum.
    perfect_radius_m: f64,
    /// Distance over which the score falls by a factor of e.
    decay_scale_m: f64,
    /// Guesses at or beyond this distance score zero.
    cutoff_m: f64,
}

impl Default for LocationScoring {
    fn default() -> Self {
        Self {
            max_score: 1000,
            perfect_radius_m: 50.0,
            decay_scale_m: 100_000.0,
            cutoff_m: 2_000_000.0,
        }
    }
}

impl LocationScoring {
    /// Returns this curve with distances scaled for a difficulty tier.
    pub fn for_difficulty(&self, difficulty: Difficulty) -> Self {
        let factor = difficulty.distance_factor();
        Self {
            max_score: self.max_score,
            perfect_radius_m: self.perfect_radius_m,
            decay_scale_m: self.decay_scale_m * factor,
            cutoff_m: self.cutoff_m * factor,
        }
    }

    /// Scores a guess `distance_m` away after `hints_penalty` points of hints.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidInput`] for a negative or non-finite
    /// distance, or a curve with a non-positive decay scale.
    pub fn score(&self, distance_m: f64, hints_penalty: u32) -> Result<u32, GameError> {
        score_location(distance_m, hints_penalty, self.max_score, self)
    }

    /// Checks that the curve can score a guess.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidInput`] unless the decay scale is positive
    /// and `0 <= perfect_radius_m <= cutoff_m`, all finite.
    pub fn validate(&self) -> Result<(), GameError> {
        if !self.decay_scale_m.is_finite() || self.decay_scale_m <= 0.0 {
            return Err(GameError::invalid_input(format!(
                "Decay scale must be positive, got {}",
                self.decay_scale_m
            )));
        }
        if !self.perfect_radius_m.is_finite() || self.perfect_radius_m < 0.0 {
            return Err(GameError::invalid_input(format!(
                "Perfect radius must not be negative, got {}",
                self.perfect_radius_m
            )));
        }
        if !self.cutoff_m.is_finite() || self.cutoff_m < self.perfect_radius_m {
            return Err(GameError::invalid_input(format!(
                "Cutoff {} must not be below the perfect radius {}",
                self.cutoff_m, self.perfect_radius_m
            )));
        }
        Ok(())
    }
}

/// Scores a location guess.
///
/// `score(0) == max_score`, the result is non-increasing in both distance and
/// penalty, and never negative.
///
/// # Errors
///
/// Returns [`GameError::InvalidInput`] for a negative or non-finite distance,
/// or a curve with a non-positive decay scale.
#[instrument(skip(curve))]
pub fn score_location(
    distance_m: f64,
    hints_penalty: u32,
    max_score: u32,
    curve: &LocationScoring,
) -> Result<u32, GameError> {
    if !distance_m.is_finite() || distance_m < 0.0 {
        warn!(distance_m, "Rejected distance");
        return Err(GameError::invalid_input(format!(
            "Distance must be a non-negative number of meters, got {distance_m}"
        )));
    }
    if curve.decay_scale_m.is_nan() || curve.decay_scale_m <= 0.0 {
        return Err(GameError::invalid_input(format!(
            "Decay scale must be positive, got {}",
            curve.decay_scale_m
        )));
    }

    let raw = if distance_m <= curve.perfect_radius_m {
        max_score
    } else if distance_m >= curve.cutoff_m {
        0
    } else {
        let excess = distance_m - curve.perfect_radius_m.max(0.0);
        let factor = (-excess / curve.decay_scale_m).exp();
        (f64::from(max_score) * factor).round() as u32
    };

    Ok(raw.min(max_score).saturating_sub(hints_penalty))
}

// ─────────────────────────────────────────────────────────────
//  Trivia
// ─────────────────────────────────────────────────────────────

/// Parameters of the time-to-score curve for trivia answers.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct TriviaScoring {
    /// Score for a correct answer given instantly.
    max_score: u32,
    /// Score for a correct answer given right at the time limit.
    min_correct_score: u32,
    /// Time allowed per question, in seconds.
    time_limit_secs: u32,
}

impl Default for TriviaScoring {
    fn default() -> Self {
        Self {
            max_score: 1000,
            min_correct_score: 500,
            time_limit_secs: 30,
        }
    }
}

impl TriviaScoring {
    /// Time allowed per question.
    pub fn time_limit(&self) -> TimeDelta {
        TimeDelta::seconds(i64::from(self.time_limit_secs))
    }

    /// Scores an answer with this curve.
    ///
    /// # Errors
    ///
    /// See [`score_trivia`].
    pub fn score(&self, is_correct: bool, elapsed: TimeDelta) -> Result<u32, GameError> {
        score_trivia(is_correct, elapsed, self.time_limit(), self)
    }

    /// Checks that the curve allows any time to answer.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidInput`] for a zero time limit.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.time_limit_secs == 0 {
            return Err(GameError::invalid_input("Time limit must be positive, got 0s"));
        }
        Ok(())
    }
}

/// Scores a trivia answer.
///
/// Incorrect answers score 0. Correct answers fall linearly from `max_score`
/// at zero elapsed time to `min_correct_score` at the limit; elapsed time past
/// the limit counts as the limit.
///
/// # Errors
///
/// Returns [`GameError::InvalidInput`] for negative elapsed time or a
/// non-positive time limit.
#[instrument(skip(curve))]
pub fn score_trivia(
    is_correct: bool,
    elapsed: TimeDelta,
    time_limit: TimeDelta,
    curve: &TriviaScoring,
) -> Result<u32, GameError> {
    if elapsed < TimeDelta::zero() {
        warn!(elapsed_ms = elapsed.num_milliseconds(), "Rejected negative elapsed time");
        return Err(GameError::invalid_input(format!(
            "Elapsed time must not be negative, got {}ms",
            elapsed.num_milliseconds()
        )));
    }
    if time_limit <= TimeDelta::zero() {
        return Err(GameError::invalid_input(format!(
            "Time limit must be positive, got {}ms",
            time_limit.num_milliseconds()
        )));
    }
    if !is_correct {
        return Ok(0);
    }

    let max = f64::from(curve.max_score);
    let floor = f64::from(curve.min_correct_score.min(curve.max_score));
    let fraction = elapsed.min(time_limit).num_milliseconds() as f64
        / time_limit.num_milliseconds() as f64;
    let score = (max - (max - floor) * fraction).round();
    Ok((score as u32).min(curve.max_score))
}

// ─────────────────────────────────────────────────────────────
//  Rules
// ─────────────────────────────────────────────────────────────

/// Complete scoring rules of a game.
#[derive(Debug, Clone, PartialEq, Default, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct Rules {
    /// Distance curve for location rounds (medium difficulty).
    location: LocationScoring,
    /// Time curve for trivia rounds.
    trivia: TriviaScoring,
    /// How hint ladders are generated.
    hints: HintPolicy,
}

impl Rules {
    /// Checks every curve and the hint policy.
    ///
    /// # Errors
    ///
    /// Returns the first [`GameError::InvalidInput`] found.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), GameError> {
        self.location.validate()?;
        self.trivia.validate()?;
        self.hints.validate()
    }
}
