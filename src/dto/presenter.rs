//! View models handed to the presenter.

use serde::Serialize;
use serde_with::{base64::Base64, serde_as};
use utoipa::ToSchema;

use crate::{
    dto::format_system_time,
    state::game::{AggregateStatistics, GameResult, Question},
};

const RESULT_TITLE: &str = "This round is over!";
const RESULT_BUTTON_TEXT: &str = "Play again";
const ERROR_BUTTON_TEXT: &str = "Try again";

/// Question to display along with round progress.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct QuestionViewModel {
    /// Poster image, base64 encoded on the wire.
    #[serde_as(as = "Base64")]
    #[schema(value_type = String, format = Byte)]
    pub image_data: Vec<u8>,
    /// Yes/no question about the poster's movie.
    pub question_text: String,
    /// `"{current} / {total}"`, 1-based.
    pub progress_label: String,
}

impl QuestionViewModel {
    /// Build the view model for `question` shown at zero-based `index`.
    pub fn new(question: &Question, index: u32, total: u32) -> Self {
        Self {
            image_data: question.image_data.clone(),
            question_text: question.text.clone(),
            progress_label: format!("{} / {}", index + 1, total),
        }
    }
}

/// Whether the last answer was correct. Input stays locked until the next question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct FeedbackSignal {
    /// Whether the answer matched.
    pub is_correct: bool,
}

/// Best game as shown on the result screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BestGameSummary {
    /// Correct answers.
    pub correct: u32,
    /// Questions asked.
    pub total: u32,
    /// RFC 3339 timestamp.
    pub date: String,
}

impl From<&GameResult> for BestGameSummary {
    fn from(value: &GameResult) -> Self {
        Self {
            correct: value.correct,
            total: value.total,
            date: format_system_time(value.played_at),
        }
    }
}

/// End-of-round summary combining the finished round with the aggregate statistics.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ResultViewModel {
    /// Heading of the result screen.
    pub title: String,
    /// `"{correct}/{total}"` for the round just played.
    pub score_text: String,
    /// Label of the replay button.
    pub button_text: String,
    /// Completed rounds, this one included.
    pub games_played: u64,
    /// Best round so far.
    pub best_game: BestGameSummary,
    /// Unrounded; display rounding is up to the presenter.
    pub accuracy_percent: f64,
}

impl ResultViewModel {
    /// Build the result screen for `result` given the statistics after recording it.
    pub fn new(result: &GameResult, statistics: &AggregateStatistics) -> Self {
        Self {
            title: RESULT_TITLE.to_string(),
            score_text: format!("{}/{}", result.correct, result.total),
            button_text: RESULT_BUTTON_TEXT.to_string(),
            games_played: statistics.games_played,
            best_game: (&statistics.best_game).into(),
            accuracy_percent: statistics.accuracy_percent(),
        }
    }
}

/// Recoverable failure the presenter should show with a retry affordance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ErrorSignal {
    /// Why the questions could not be loaded.
    pub message: String,
    /// Label of the retry button.
    pub button_text: String,
}

impl ErrorSignal {
    /// Error signal carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            button_text: ERROR_BUTTON_TEXT.to_string(),
        }
    }
}
