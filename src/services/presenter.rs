use std::sync::{Mutex, PoisonError};

use uuid::Uuid;

use crate::dto::presenter::{ErrorSignal, FeedbackSignal, QuestionViewModel, ResultViewModel};

/// Everything the quiz session can ask the presenter to show.
#[derive(Debug, Clone, PartialEq)]
pub enum PresenterSignal {
    /// A new question is ready for display.
    Question(QuestionViewModel),
    /// The last answer was scored.
    Feedback(FeedbackSignal),
    /// The round ended and statistics were recorded.
    Result(ResultViewModel),
    /// Questions could not be loaded; the player may retry.
    Error(ErrorSignal),
}

/// Sink for presenter signals.
///
/// Implementations must not block: the session calls `present` while holding its lock.
pub trait Presenter: Send + Sync {
    /// Show `signal` for the round identified by `round_id`.
    fn present(&self, round_id: Uuid, signal: PresenterSignal);
}

/// Presenter that keeps every signal it receives, for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    signals: Mutex<Vec<(Uuid, PresenterSignal)>>,
}

impl RecordingPresenter {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every signal received so far, oldest first.
    pub fn signals(&self) -> Vec<PresenterSignal> {
        self.lock().iter().map(|(_, signal)| signal.clone()).collect()
    }

    /// Signals along with the round they were produced for.
    pub fn signals_with_rounds(&self) -> Vec<(Uuid, PresenterSignal)> {
        self.lock().clone()
    }

    /// Most recent signal, if any.
    pub fn last(&self) -> Option<PresenterSignal> {
        self.lock().last().map(|(_, signal)| signal.clone())
    }

    /// Forget every recorded signal.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Question view models, oldest first.
    pub fn questions(&self) -> Vec<QuestionViewModel> {
        self.lock()
            .iter()
            .filter_map(|(_, signal)| match signal {
                PresenterSignal::Question(view) => Some(view.clone()),
                _ => None,
            })
            .collect()
    }

    /// Feedback signals, oldest first.
    pub fn feedback(&self) -> Vec<FeedbackSignal> {
        self.lock()
            .iter()
            .filter_map(|(_, signal)| match signal {
                PresenterSignal::Feedback(feedback) => Some(*feedback),
                _ => None,
            })
            .collect()
    }

    /// Result view models, oldest first.
    pub fn results(&self) -> Vec<ResultViewModel> {
        self.lock()
            .iter()
            .filter_map(|(_, signal)| match signal {
                PresenterSignal::Result(view) => Some(view.clone()),
                _ => None,
            })
            .collect()
    }

    /// Error signals, oldest first.
    pub fn errors(&self) -> Vec<ErrorSignal> {
        self.lock()
            .iter()
            .filter_map(|(_, signal)| match signal {
                PresenterSignal::Error(error) => Some(error.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Uuid, PresenterSignal)>> {
        self.signals.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Presenter for RecordingPresenter {
    fn present(&self, round_id: Uuid, signal: PresenterSignal) {
        self.lock().push((round_id, signal));
    }
}
