/// Questions, round results and aggregate statistics.
pub mod game;
mod sse;
/// Phase transitions of a quiz round.
pub mod state_machine;

use std::sync::Arc;

use crate::services::{quiz_service::QuizOrchestrator, statistics_service::StatisticsService};

pub use self::sse::SseHub;

/// State handed to every axum handler.
pub type SharedState = Arc<AppState>;

/// Capacity of the quiz SSE channel; slow clients skip what they missed.
pub const SSE_CHANNEL_CAPACITY: usize = 32;

/// Central application state shared by every route handler.
pub struct AppState {
    quiz: QuizOrchestrator,
    statistics: Arc<StatisticsService>,
    sse: SseHub,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(quiz: QuizOrchestrator, statistics: Arc<StatisticsService>, sse: SseHub) -> SharedState {
        Arc::new(Self {
            quiz,
            statistics,
            sse,
        })
    }

    /// The running quiz.
    pub fn quiz(&self) -> &QuizOrchestrator {
        &self.quiz
    }

    /// Aggregate statistics across rounds.
    pub fn statistics(&self) -> &StatisticsService {
        &self.statistics
    }

    /// Broadcast hub used for the quiz SSE stream.
    pub fn quiz_sse(&self) -> &SseHub {
        &self.sse
    }
}
