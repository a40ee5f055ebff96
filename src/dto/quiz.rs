use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::{phase::VisibleQuizPhase, presenter::BestGameSummary},
    services::quiz_session::SessionSnapshot,
    state::game::AggregateStatistics,
};

/// Answer submitted by the player for the current question.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnswerRequest {
    /// `true` for "yes", `false` for "no".
    pub answer: bool,
}

/// Outcome of an answer submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerResponse {
    /// `false` when no answer was expected; nothing changed.
    pub accepted: bool,
    /// Correctness of an accepted answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

impl From<Option<bool>> for AnswerResponse {
    fn from(value: Option<bool>) -> Self {
        Self {
            accepted: value.is_some(),
            is_correct: value,
        }
    }
}

/// Read-only view of the quiz session.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionStateResponse {
    /// Round the state belongs to; SSE signals carry the same id.
    pub round_id: Uuid,
    /// Current phase.
    pub phase: VisibleQuizPhase,
    /// Zero-based index of the current question.
    pub current_index: u32,
    /// Correct answers in this round.
    pub correct_count: u32,
    /// Questions per round.
    pub total_questions: u32,
    /// Reason of the last load failure, until the next successful start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl From<SessionSnapshot> for SessionStateResponse {
    fn from(value: SessionSnapshot) -> Self {
        Self {
            round_id: value.round_id,
            phase: value.phase.into(),
            current_index: value.current_index,
            correct_count: value.correct_count,
            total_questions: value.total_questions,
            last_error: value.last_error,
        }
    }
}

/// Aggregate statistics across every recorded round.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatisticsResponse {
    /// Completed rounds.
    pub games_played: u64,
    /// Correct answers over every round.
    pub total_correct_answers: u64,
    /// Questions asked over every round.
    pub total_questions_asked: u64,
    /// Best round so far.
    pub best_game: BestGameSummary,
    /// Correct answers over questions asked, in percent.
    pub accuracy_percent: f64,
}

impl From<AggregateStatistics> for StatisticsResponse {
    fn from(value: AggregateStatistics) -> Self {
        Self {
            games_played: value.games_played,
            total_correct_answers: value.total_correct,
            total_questions_asked: value.total_questions,
            best_game: (&value.best_game).into(),
            accuracy_percent: value.accuracy_percent(),
        }
    }
}
