//! Progressive hint ladders for location rounds.
//!
//! A ladder is an ordered list of [`HintStep`]s whose penalties never
//! decrease. Revealing is tracked by the round as a count; the ladder itself
//! is immutable.

use derive_getters::Getters;
use derive_new::new;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::GameError;
use crate::geo;
use crate::types::{Clue, Coordinate, Difficulty, Harbor};

/// What a hint reveals to the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum HintPayload {
    /// Zoom the map in to the given level.
    Zoom {
        /// Map zoom level.
        level: u8,
    },
    /// A textual clue.
    Text {
        /// The clue.
        clue: String,
    },
    /// An image clue.
    Image {
        /// Image URI.
        uri: String,
    },
    /// A circular map overlay that contains the harbor.
    Region {
        /// Circle center; never the harbor itself.
        center: Coordinate,
        /// Circle radius in meters.
        radius_m: f64,
    },
}

/// One rung of a hint ladder.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize, new)]
pub struct HintStep {
    /// 0-based position in the ladder.
    order: usize,
    /// What the hint reveals.
    payload: HintPayload,
    /// Points deducted once this hint has been revealed.
    penalty: u32,
}

/// Ordered hints for one harbor round.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<HintStep>", into = "Vec<HintStep>")]
pub struct HintLadder {
    steps: Vec<HintStep>,
}

impl TryFrom<Vec<HintStep>> for HintLadder {
    type Error = GameError;

    fn try_from(steps: Vec<HintStep>) -> Result<Self, Self::Error> {
        Self::new(steps)
    }
}

impl From<HintLadder> for Vec<HintStep> {
    fn from(ladder: HintLadder) -> Self {
        ladder.steps
    }
}

impl HintLadder {
    /// Builds a ladder from steps given in reveal order.
    ///
    /// Step order indexes are renumbered to match their position.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidInput`] if a later step costs less than an
    /// earlier one.
    #[instrument(skip(steps), fields(len = steps.len()))]
    pub fn new(steps: Vec<HintStep>) -> Result<Self, GameError> {
        if let Some(pair) = steps.windows(2).find(|w| w[1].penalty < w[0].penalty) {
            return Err(GameError::invalid_input(format!(
                "Hint penalties must not decrease: {} then {}",
                pair[0].penalty, pair[1].penalty
            )));
        }

        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(order, step)| HintStep { order, ..step })
            .collect();
        Ok(Self { steps })
    }

    /// Number of hints in the ladder.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the ladder has no hints at all.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// All steps in reveal order.
    pub fn steps(&self) -> &[HintStep] {
        &self.steps
    }

    /// The hint following `revealed` already-revealed hints, or `None` once
    /// the ladder is exhausted.
    pub fn next_hint(&self, revealed: usize) -> Option<&HintStep> {
        self.steps.get(revealed)
    }

    /// Sum of the penalties of the first `revealed` hints.
    ///
    /// Counts past the end of the ladder are clamped, so the result is the
    /// full ladder cost at most.
    pub fn cumulative_penalty(&self, revealed: usize) -> u32 {
        self.steps
            .iter()
            .take(revealed)
            .fold(0u32, |acc, s| acc.saturating_add(s.penalty))
    }
}

// ─────────────────────────────────────────────────────────────
//  Policy
// ─────────────────────────────────────────────────────────────

/// How ladders are generated for harbors.
///
/// Zoom steps come first, then the harbor's own clues, then a region overlay.
/// The penalty of step `i` is `base_penalty + i * penalty_step`.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct HintPolicy {
    /// Zoom levels revealed in order.
    zoom_levels: Vec<u8>,
    /// Penalty of the first hint.
    base_penalty: u32,
    /// Penalty increase per subsequent hint.
    penalty_step: u32,
    /// Region overlay radius in meters at medium difficulty.
    region_radius_m: f64,
    /// Whether to end the ladder with a region overlay.
    region_overlay: bool,
}

impl Default for HintPolicy {
    fn default() -> Self {
        Self {
            zoom_levels: vec![6, 8],
            base_penalty: 50,
            penalty_step: 25,
            region_radius_m: 20_000.0,
            region_overlay: true,
        }
    }
}

impl HintPolicy {
    /// Checks that the region overlay, when enabled, has a usable radius.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidInput`] for a radius that is not a positive
    /// finite number of meters.
    pub fn validate(&self) -> Result<(), GameError> {
        let radius = self.region_radius_m;
        if self.region_overlay && !(radius.is_finite() && radius > 0.0) {
            return Err(GameError::invalid_input(format!(
                "Region radius must be a positive number of meters, got {radius}"
            )));
        }
        Ok(())
    }

    /// Builds the ladder for a harbor at the given difficulty.
    #[instrument(skip(self, harbor), fields(harbor_id = %harbor.id()))]
    pub fn ladder_for(&self, harbor: &Harbor, difficulty: Difficulty) -> HintLadder {
        let mut payloads: Vec<HintPayload> = self
            .zoom_levels
            .iter()
            .map(|&level| HintPayload::Zoom { level })
            .collect();

        payloads.extend(harbor.clues().iter().map(|clue| match clue {
            Clue::Text(text) => HintPayload::Text { clue: text.clone() },
            Clue::Image(uri) => HintPayload::Image { uri: uri.clone() },
        }));

        if self.region_overlay {
            let radius_m = self.region_radius_m * difficulty.distance_factor();
            payloads.push(HintPayload::Region {
                center: offset_center(harbor, radius_m),
                radius_m,
            });
        }

        let steps: Vec<HintStep> = payloads
            .into_iter()
            .enumerate()
            .map(|(i, payload)| {
                let penalty = self
                    .base_penalty
                    .saturating_add(self.penalty_step.saturating_mul(i as u32));
                HintStep::new(i, payload, penalty)
            })
            .collect();

        debug!(hints = steps.len(), "Built hint ladder");
        HintLadder { steps }
    }
}

/// Moves the overlay center half a radius away from the harbor, in a
/// direction derived from the harbor id so the same harbor always gets the
/// same overlay.
fn offset_center(harbor: &Harbor, radius_m: f64) -> Coordinate {
    let seed = harbor
        .id()
        .as_str()
        .bytes()
        .fold(17u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
    let bearing = f64::from(seed % 360);
    geo::destination(*harbor.position(), bearing, radius_m / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(penalty: u32) -> HintStep {
        HintStep::new(99, HintPayload::Zoom { level: 5 }, penalty)
    }

    fn harbor(clues: Vec<Clue>) -> Harbor {
        Harbor::new(
            "hel".into(),
            "Helsinki".to_string(),
            Coordinate::new(60.1699, 24.9384).unwrap(),
            Difficulty::Medium,
            clues,
        )
    }

    #[test]
    fn new_rejects_decreasing_penalties() {
        assert!(HintLadder::new(vec![step(10), step(5)]).is_err());
        assert!(HintLadder::new(vec![step(5), step(5), step(10)]).is_ok());
    }

    #[test]
    fn deserializing_checks_penalty_order() {
        let json = serde_json::to_string(&vec![step(10), step(5)]).unwrap();
        assert!(serde_json::from_str::<HintLadder>(&json).is_err());

        let ladder = HintLadder::new(vec![step(5), step(10)]).unwrap();
        let json = serde_json::to_string(&ladder).unwrap();
        assert_eq!(serde_json::from_str::<HintLadder>(&json).unwrap(), ladder);
    }

    #[test]
    fn new_renumbers_orders() {
        let ladder = HintLadder::new(vec![step(1), step(2), step(3)]).unwrap();
        let orders: Vec<usize> = ladder.steps().iter().map(|s| *s.order()).collect();
        assert_eq!(orders, [0, 1, 2]);
    }

    #[test]
    fn next_hint_is_none_exactly_at_length() {
        let ladder = HintLadder::new(vec![step(1), step(2), step(3)]).unwrap();
        for n in 0..ladder.len() {
            assert!(ladder.next_hint(n).is_some());
        }
        assert!(ladder.next_hint(ladder.len()).is_none());
        assert!(HintLadder::default().next_hint(0).is_none());
    }

    #[test]
    fn cumulative_penalty_is_non_decreasing_and_clamped() {
        let ladder = HintLadder::new(vec![step(10), step(20), step(30)]).unwrap();
        let sums: Vec<u32> = (0..=5).map(|n| ladder.cumulative_penalty(n)).collect();
        assert_eq!(sums, [0, 10, 30, 60, 60, 60]);
    }

    #[test]
    fn policy_orders_zoom_clues_then_region() {
        let policy = HintPolicy::default();
        let ladder = policy.ladder_for(
            &harbor(vec![Clue::Text("Capital".to_string()), Clue::Image("x.png".to_string())]),
            Difficulty::Medium,
        );
        let kinds: Vec<&HintPayload> = ladder.steps().iter().map(|s| s.payload()).collect();
        assert!(matches!(kinds[0], HintPayload::Zoom { level: 6 }));
        assert!(matches!(kinds[1], HintPayload::Zoom { level: 8 }));
        assert!(matches!(kinds[2], HintPayload::Text { .. }));
        assert!(matches!(kinds[3], HintPayload::Image { .. }));
        assert!(matches!(kinds[4], HintPayload::Region { .. }));
        assert_eq!(ladder.cumulative_penalty(5), 50 + 75 + 100 + 125 + 150);
    }

    #[test]
    fn region_overlay_contains_harbor_but_is_offset() {
        let h = harbor(Vec::new());
        let ladder = HintPolicy::default().ladder_for(&h, Difficulty::Hard);
        let Some(HintPayload::Region { center, radius_m }) =
            ladder.steps().last().map(|s| s.payload().clone())
        else {
            panic!("last hint should be a region overlay");
        };
        assert_eq!(radius_m, 10_000.0);
        let d = geo::distance(center, *h.position());
        assert!(d > 0.0 && d < radius_m);
    }

    #[test]
    fn policy_without_overlay() {
        let policy = HintPolicy::default()
            .with_region_overlay(false)
            .with_zoom_levels(vec![4]);
        let ladder = policy.ladder_for(&harbor(Vec::new()), Difficulty::Easy);
        assert_eq!(ladder.len(), 1);
    }
}
