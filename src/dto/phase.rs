use serde::Serialize;
use utoipa::ToSchema;

use crate::state::state_machine::QuizPhase;

/// Quiz phase exposed to clients (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleQuizPhase {
    /// No round loaded.
    Idle,
    /// Questions loaded, waiting for the first one.
    AwaitingFirstQuestion,
    /// Waiting for the next question from the source.
    AwaitingQuestion,
    /// Question shown, answers accepted.
    AwaitingAnswer,
    /// Answer locked in, correctness shown.
    ShowingFeedback,
    /// Round finished, result shown.
    RoundComplete,
}

impl From<QuizPhase> for VisibleQuizPhase {
    fn from(value: QuizPhase) -> Self {
        match value {
            QuizPhase::Idle => VisibleQuizPhase::Idle,
            QuizPhase::AwaitingFirstQuestion => VisibleQuizPhase::AwaitingFirstQuestion,
            QuizPhase::AwaitingQuestion => VisibleQuizPhase::AwaitingQuestion,
            QuizPhase::AwaitingAnswer => VisibleQuizPhase::AwaitingAnswer,
            QuizPhase::ShowingFeedback => VisibleQuizPhase::ShowingFeedback,
            QuizPhase::RoundComplete => VisibleQuizPhase::RoundComplete,
        }
    }
}
