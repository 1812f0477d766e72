//! Location round controller.
//!
//! Presented → HintRequested* → GuessSubmitted → Resolved.
//!
//! Every transition borrows the current snapshot and returns a new one, so a
//! rejected transition leaves the caller's state untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::GameError;
use crate::geo;
use crate::hints::{HintLadder, HintStep};
use crate::round::{Accuracy, RoundId, RoundKind, RoundResult};
use crate::scoring::LocationScoring;
use crate::types::{Coordinate, Difficulty, Harbor};

/// Phase of a location round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum LocationPhase {
    /// Harbor chosen, no hints revealed.
    Presented,
    /// At least one hint revealed.
    HintRequested,
    /// Guess recorded, not yet scored.
    GuessSubmitted,
    /// Scored; the round is closed.
    Resolved,
}

impl LocationPhase {
    /// Whether hints may still be requested.
    pub fn accepts_hints(self) -> bool {
        matches!(self, Self::Presented | Self::HintRequested)
    }
}

/// Snapshot of one harbor-guessing round.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRound {
    id: RoundId,
    harbor: Harbor,
    difficulty: Difficulty,
    ladder: HintLadder,
    revealed: usize,
    guess: Option<Coordinate>,
    presented_at: DateTime<Utc>,
    submitted_at: Option<DateTime<Utc>>,
    phase: LocationPhase,
}

impl LocationRound {
    /// Presents a harbor with zero hints revealed.
    #[instrument(skip(harbor, ladder), fields(harbor_id = %harbor.id(), hints = ladder.len()))]
    pub fn present(
        id: RoundId,
        harbor: Harbor,
        difficulty: Difficulty,
        ladder: HintLadder,
        at: DateTime<Utc>,
    ) -> Self {
        info!(round = %id, "Presenting location round");
        Self {
            id,
            harbor,
            difficulty,
            ladder,
            revealed: 0,
            guess: None,
            presented_at: at,
            submitted_at: None,
            phase: LocationPhase::Presented,
        }
    }

    /// Reveals the next hint.
    ///
    /// Once the ladder is exhausted this returns an unchanged snapshot and
    /// `None`; the player may still guess.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidRoundState`] after a guess was submitted.
    #[instrument(skip(self), fields(round = %self.id, revealed = self.revealed))]
    pub fn request_hint(&self) -> Result<(Self, Option<HintStep>), GameError> {
        if !self.phase.accepts_hints() {
            warn!(phase = %self.phase, "Hint requested after guessing");
            return Err(GameError::invalid_state(
                self.id,
                format!("cannot reveal hints in phase {}", self.phase),
            ));
        }

        let Some(step) = self.ladder.next_hint(self.revealed).cloned() else {
            debug!("Hint ladder exhausted");
            return Ok((self.clone(), None));
        };

        let next = Self {
            revealed: self.revealed + 1,
            phase: LocationPhase::HintRequested,
            ..self.clone()
        };
        debug!(order = step.order(), penalty = step.penalty(), "Hint revealed");
        Ok((next, Some(step)))
    }

    /// Records the player's guess.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidRoundState`] if a guess was already
    /// submitted, or [`GameError::InvalidInput`] if `at` precedes the
    /// presentation time.
    #[instrument(skip(self), fields(round = %self.id))]
    pub fn submit_guess(&self, guess: Coordinate, at: DateTime<Utc>) -> Result<Self, GameError> {
        if !self.phase.accepts_hints() {
            warn!(phase = %self.phase, "Second guess rejected");
            return Err(GameError::invalid_state(
                self.id,
                format!("cannot guess in phase {}", self.phase),
            ));
        }
        if at < self.presented_at {
            return Err(GameError::invalid_input(
                "Guess timestamp precedes round presentation",
            ));
        }

        info!(%guess, "Guess submitted");
        Ok(Self {
            guess: Some(guess),
            submitted_at: Some(at),
            phase: LocationPhase::GuessSubmitted,
            ..self.clone()
        })
    }

    /// Scores the submitted guess and closes the round.
    ///
    /// The curve is scaled for this round's difficulty before scoring.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidRoundState`] unless a guess is pending.
    #[instrument(skip(self, curve), fields(round = %self.id))]
    pub fn resolve(&self, curve: &LocationScoring) -> Result<(Self, RoundResult), GameError> {
        let (LocationPhase::GuessSubmitted, Some(guess), Some(submitted_at)) =
            (self.phase, self.guess, self.submitted_at)
        else {
            warn!(phase = %self.phase, "Resolve attempted without a pending guess");
            return Err(GameError::invalid_state(
                self.id,
                format!("cannot resolve in phase {}", self.phase),
            ));
        };

        let target = *self.harbor.position();
        let meters = geo::distance(guess, target);
        let bearing_deg = geo::initial_bearing(guess, target);
        let penalty = self.cumulative_penalty();
        let score = curve.for_difficulty(self.difficulty).score(meters, penalty)?;

        let result = RoundResult::new(
            self.id,
            RoundKind::Location,
            score,
            Accuracy::Distance {
                meters,
                bearing_deg,
            },
            self.revealed,
            submitted_at - self.presented_at,
        );
        info!(score, meters, hints = self.revealed, "Location round resolved");

        let resolved = Self {
            phase: LocationPhase::Resolved,
            ..self.clone()
        };
        Ok((resolved, result))
    }

    /// Round id.
    pub fn id(&self) -> RoundId {
        self.id
    }

    /// The harbor to locate.
    pub fn harbor(&self) -> &Harbor {
        &self.harbor
    }

    /// Difficulty the round is scored at.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Current phase.
    pub fn phase(&self) -> LocationPhase {
        self.phase
    }

    /// The full hint ladder.
    pub fn ladder(&self) -> &HintLadder {
        &self.ladder
    }

    /// Hints revealed so far, in order.
    pub fn revealed_hints(&self) -> &[HintStep] {
        &self.ladder.steps()[..self.revealed]
    }

    /// Number of hints still available.
    pub fn hints_remaining(&self) -> usize {
        self.ladder.len() - self.revealed
    }

    /// Penalty accrued by the revealed hints.
    pub fn cumulative_penalty(&self) -> u32 {
        self.ladder.cumulative_penalty(self.revealed)
    }

    /// The submitted guess, if any.
    pub fn guess(&self) -> Option<Coordinate> {
        self.guess
    }

    /// When the round was presented.
    pub fn presented_at(&self) -> DateTime<Utc> {
        self.presented_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hints::HintPayload;
    use crate::round::SessionId;
    use chrono::TimeDelta;

    fn helsinki() -> Harbor {
        Harbor::new(
            "hel".into(),
            "Helsinki".to_string(),
            Coordinate::new(60.1699, 24.9384).unwrap(),
            Difficulty::Medium,
            Vec::new(),
        )
    }

    fn three_step_ladder() -> HintLadder {
        HintLadder::new(vec![
            HintStep::new(0, HintPayload::Zoom { level: 6 }, 10),
            HintStep::new(0, HintPayload::Zoom { level: 8 }, 20),
            HintStep::new(0, HintPayload::Text { clue: "Capital".to_string() }, 30),
        ])
        .unwrap()
    }

    fn round() -> LocationRound {
        LocationRound::present(
            RoundId::new(SessionId::from(1), 1),
            helsinki(),
            Difficulty::Medium,
            three_step_ladder(),
            DateTime::<Utc>::UNIX_EPOCH,
        )
    }

    fn later(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(secs)
    }

    #[test]
    fn exact_guess_without_hints_scores_max() {
        let r = round()
            .submit_guess(*helsinki().position(), later(5))
            .unwrap();
        let (resolved, result) = r.resolve(&LocationScoring::default()).unwrap();
        assert_eq!(*result.score(), 1000);
        assert_eq!(*result.hints_used(), 0);
        assert_eq!(result.elapsed(), TimeDelta::seconds(5));
        assert_eq!(resolved.phase(), LocationPhase::Resolved);
    }

    #[test]
    fn exhausted_hints_are_a_no_op() {
        let mut r = round();
        for _ in 0..3 {
            let (next, hint) = r.request_hint().unwrap();
            assert!(hint.is_some());
            r = next;
        }
        let (same, hint) = r.request_hint().unwrap();
        assert!(hint.is_none());
        assert_eq!(same, r);
        assert_eq!(r.cumulative_penalty(), 60);
        assert_eq!(r.hints_remaining(), 0);

        let r = r.submit_guess(*helsinki().position(), later(1)).unwrap();
        let (_, result) = r.resolve(&LocationScoring::default()).unwrap();
        assert_eq!(*result.score(), 940);
        assert_eq!(*result.hints_used(), 3);
    }

    #[test]
    fn hint_after_guess_is_rejected() {
        let r = round()
            .submit_guess(*helsinki().position(), later(1))
            .unwrap();
        assert!(matches!(
            r.request_hint(),
            Err(GameError::InvalidRoundState { .. })
        ));
    }

    #[test]
    fn resolves_exactly_once() {
        let r = round()
            .submit_guess(*helsinki().position(), later(1))
            .unwrap();
        let (resolved, _) = r.resolve(&LocationScoring::default()).unwrap();
        assert!(resolved.resolve(&LocationScoring::default()).is_err());
        assert!(resolved.submit_guess(*helsinki().position(), later(2)).is_err());
        assert!(resolved.request_hint().is_err());
    }

    #[test]
    fn resolve_requires_guess() {
        assert!(matches!(
            round().resolve(&LocationScoring::default()),
            Err(GameError::InvalidRoundState { .. })
        ));
    }

    #[test]
    fn guess_before_presentation_is_invalid() {
        let r = round();
        let before = DateTime::<Utc>::UNIX_EPOCH - TimeDelta::seconds(1);
        assert!(matches!(
            r.submit_guess(*helsinki().position(), before),
            Err(GameError::InvalidInput(_))
        ));
        assert_eq!(r.phase(), LocationPhase::Presented);
    }

    #[test]
    fn distant_guess_reports_bearing_towards_harbor() {
        let south = Coordinate::new(59.7, 24.9384).unwrap();
        let r = round().submit_guess(south, later(1)).unwrap();
        let (_, result) = r.resolve(&LocationScoring::default()).unwrap();
        let Accuracy::Distance { meters, bearing_deg } = *result.accuracy() else {
            panic!("location rounds report distance");
        };
        assert!(meters > 50_000.0);
        assert_eq!(geo::compass_point(bearing_deg), "N");
        assert!(*result.score() < 1000);
    }
}
