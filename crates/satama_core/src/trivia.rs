//! Trivia round controller.
//!
//! Presented → AnswerSubmitted → Resolved, or Presented → Resolved when the
//! time limit passes without an answer.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::GameError;
use crate::round::{Accuracy, RoundId, RoundKind, RoundResult};
use crate::scoring::{TriviaScoring, score_trivia};
use crate::types::{AnswerId, TriviaQuestion};

/// Phase of a trivia round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum TriviaPhase {
    /// Question shown, waiting for an answer.
    Presented,
    /// Answer recorded, not yet scored.
    AnswerSubmitted,
    /// Scored; the round is closed.
    Resolved,
}

/// Snapshot of one trivia round.
#[derive(Debug, Clone, PartialEq)]
pub struct TriviaRound {
    id: RoundId,
    question: TriviaQuestion,
    time_limit: TimeDelta,
    presented_at: DateTime<Utc>,
    answer: Option<AnswerId>,
    answered_at: Option<DateTime<Utc>>,
    timed_out: bool,
    phase: TriviaPhase,
}

impl TriviaRound {
    /// Presents a question with the given time limit.
    #[instrument(skip(question), fields(question_id = %question.id()))]
    pub fn present(
        id: RoundId,
        question: TriviaQuestion,
        time_limit: TimeDelta,
        at: DateTime<Utc>,
    ) -> Self {
        info!(round = %id, "Presenting trivia round");
        Self {
            id,
            question,
            time_limit,
            presented_at: at,
            answer: None,
            answered_at: None,
            timed_out: false,
            phase: TriviaPhase::Presented,
        }
    }

    /// Records the selected answer.
    ///
    /// An answer arriving after the time limit is kept for the record but the
    /// round will resolve as a timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidRoundState`] if an answer was already
    /// recorded, or [`GameError::InvalidInput`] for an answer id that is not a
    /// candidate or a timestamp before presentation.
    #[instrument(skip(self), fields(round = %self.id))]
    pub fn submit_answer(&self, answer: AnswerId, at: DateTime<Utc>) -> Result<Self, GameError> {
        if self.phase != TriviaPhase::Presented {
            warn!(phase = %self.phase, "Second answer rejected");
            return Err(GameError::invalid_state(
                self.id,
                format!("cannot answer in phase {}", self.phase),
            ));
        }
        if self.question.answer(&answer).is_none() {
            warn!(%answer, "Unknown answer id");
            return Err(GameError::invalid_input(format!(
                "Answer {} is not a candidate of question {}",
                answer,
                self.question.id()
            )));
        }
        let elapsed = at - self.presented_at;
        if elapsed < TimeDelta::zero() {
            return Err(GameError::invalid_input(
                "Answer timestamp precedes round presentation",
            ));
        }

        let timed_out = elapsed > self.time_limit;
        if timed_out {
            debug!(elapsed_ms = elapsed.num_milliseconds(), "Answer arrived after the time limit");
        }
        Ok(Self {
            answer: Some(answer),
            answered_at: Some(at),
            timed_out,
            phase: TriviaPhase::AnswerSubmitted,
            ..self.clone()
        })
    }

    /// Resolves the round as a timeout if the limit has passed unanswered.
    ///
    /// Returns `None` while time remains or when an answer is already pending.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidRoundState`] for a resolved round.
    #[instrument(skip(self, curve), fields(round = %self.id))]
    pub fn expire(
        &self,
        now: DateTime<Utc>,
        curve: &TriviaScoring,
    ) -> Result<Option<(Self, RoundResult)>, GameError> {
        match self.phase {
            TriviaPhase::Resolved => Err(GameError::invalid_state(
                self.id,
                "round is already resolved",
            )),
            TriviaPhase::AnswerSubmitted => Ok(None),
            TriviaPhase::Presented if now - self.presented_at < self.time_limit => Ok(None),
            TriviaPhase::Presented => {
                info!("Trivia round timed out");
                let timed_out = Self {
                    timed_out: true,
                    ..self.clone()
                };
                timed_out.finish(curve).map(Some)
            }
        }
    }

    /// Scores the recorded answer and closes the round.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidRoundState`] unless an answer is pending.
    #[instrument(skip(self, curve), fields(round = %self.id))]
    pub fn resolve(&self, curve: &TriviaScoring) -> Result<(Self, RoundResult), GameError> {
        if self.phase != TriviaPhase::AnswerSubmitted {
            warn!(phase = %self.phase, "Resolve attempted without a pending answer");
            return Err(GameError::invalid_state(
                self.id,
                format!("cannot resolve in phase {}", self.phase),
            ));
        }
        self.finish(curve)
    }

    fn finish(&self, curve: &TriviaScoring) -> Result<(Self, RoundResult), GameError> {
        let correct_id = self.question.correct_answer().map(|a| a.id());
        let correct = !self.timed_out
            && self.answer.is_some()
            && self.answer.as_ref() == correct_id;

        let elapsed = match (self.timed_out, self.answered_at) {
            (false, Some(at)) => at - self.presented_at,
            _ => self.time_limit,
        };
        let score = score_trivia(correct, elapsed, self.time_limit, curve)?;

        let result = RoundResult::new(
            self.id,
            RoundKind::Trivia,
            score,
            Accuracy::Answer {
                correct,
                timed_out: self.timed_out,
            },
            0,
            elapsed,
        );
        info!(score, correct, timed_out = self.timed_out, "Trivia round resolved");

        let resolved = Self {
            phase: TriviaPhase::Resolved,
            ..self.clone()
        };
        Ok((resolved, result))
    }

    /// Round id.
    pub fn id(&self) -> RoundId {
        self.id
    }

    /// The question being asked.
    pub fn question(&self) -> &TriviaQuestion {
        &self.question
    }

    /// Current phase.
    pub fn phase(&self) -> TriviaPhase {
        self.phase
    }

    /// Time allowed for answering.
    pub fn time_limit(&self) -> TimeDelta {
        self.time_limit
    }

    /// The recorded answer, if any.
    pub fn answer(&self) -> Option<&AnswerId> {
        self.answer.as_ref()
    }

    /// When the question was presented.
    pub fn presented_at(&self) -> DateTime<Utc> {
        self.presented_at
    }

    /// Time left at `now`, never negative.
    pub fn remaining(&self, now: DateTime<Utc>) -> TimeDelta {
        (self.time_limit - (now - self.presented_at)).max(TimeDelta::zero())
    }
}
