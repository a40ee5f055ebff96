use std::{
    sync::{Arc, Mutex as StdMutex, PoisonError, Weak},
    time::Duration,
};

use tokio::{sync::Mutex, task::JoinHandle};
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::ServiceError,
    services::quiz_session::{QuizSession, SessionSnapshot},
    state::state_machine::QuizPhase,
};

/// Round parameters taken from the application configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSettings {
    /// Questions per round. Kept signed so invalid values surface from `start`.
    pub total_questions: i64,
    /// How long feedback stays on screen. Zero disables the automatic advance.
    pub feedback_delay: Duration,
}

struct ScheduledAdvance {
    round_id: Uuid,
    index: u32,
    handle: JoinHandle<()>,
}

/// Serialises player actions onto a [`QuizSession`] and owns the delayed advance.
///
/// Every action runs to completion under one lock. After feedback is shown, a
/// background task calls `advance` once the delay elapsed; it is aborted when a
/// new round starts, on [`QuizOrchestrator::shutdown`], and when dropped.
pub struct QuizOrchestrator {
    session: Arc<Mutex<QuizSession>>,
    settings: QuizSettings,
    pending_advance: StdMutex<Option<ScheduledAdvance>>,
}

impl QuizOrchestrator {
    /// Wrap `session`; nothing runs until [`QuizOrchestrator::start`].
    pub fn new(session: QuizSession, settings: QuizSettings) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            settings,
            pending_advance: StdMutex::new(None),
        }
    }

    /// Start a round, or retry after a load failure or a finished round.
    ///
    /// Ignored while a round is running.
    pub async fn start(&self) -> Result<SessionSnapshot, ServiceError> {
        let mut session = self.session.lock().await;
        let snapshot = session.snapshot();
        if !matches!(
            snapshot.phase,
            QuizPhase::Idle | QuizPhase::AwaitingFirstQuestion | QuizPhase::RoundComplete
        ) {
            debug!(phase = ?snapshot.phase, "round already running, ignoring start");
            return Ok(snapshot);
        }

        self.cancel_pending_advance();
        if snapshot.total_questions == 0 {
            session.start(self.settings.total_questions).await?;
        } else {
            session.restart().await?;
        }
        Ok(session.snapshot())
    }

    /// Forward the player's answer and schedule the advance past its feedback.
    ///
    /// Returns whether the answer was correct, or `None` when it was ignored.
    pub async fn answer(&self, user_says_yes: bool) -> Option<bool> {
        let mut session = self.session.lock().await;
        let is_correct = session.submit_answer(user_says_yes)?;

        if !self.settings.feedback_delay.is_zero() {
            self.schedule_advance(session.round_id(), session.current_index());
        }
        Some(is_correct)
    }

    /// Leave the feedback screen by hand. Only allowed when the automatic advance is off.
    pub async fn advance(&self) -> Result<SessionSnapshot, ServiceError> {
        if !self.settings.feedback_delay.is_zero() {
            return Err(ServiceError::InvalidState(
                "feedback advances automatically".into(),
            ));
        }

        let mut session = self.session.lock().await;
        session.advance().await;
        Ok(session.snapshot())
    }

    /// Ask the question source again when the previous poll came back empty.
    pub async fn request_question(&self) -> SessionSnapshot {
        let mut session = self.session.lock().await;
        session.request_question().await;
        session.snapshot()
    }

    /// Current session state, taken under the session lock.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot()
    }

    /// Abort any pending advance. The session is left as is.
    pub fn shutdown(&self) {
        self.cancel_pending_advance();
    }

    fn schedule_advance(&self, round_id: Uuid, index: u32) {
        let session = Arc::downgrade(&self.session);
        let delay = self.settings.feedback_delay;
        let handle = tokio::spawn(feedback_elapsed(session, delay, round_id, index));

        let previous = self
            .pending_advance
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(ScheduledAdvance {
                round_id,
                index,
                handle,
            });
        if let Some(previous) = previous {
            previous.handle.abort();
        }
    }

    fn cancel_pending_advance(&self) {
        let pending = self
            .pending_advance
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(pending) = pending {
            debug!(
                round_id = %pending.round_id,
                index = pending.index,
                "cancelling scheduled advance"
            );
            pending.handle.abort();
        }
    }
}

impl Drop for QuizOrchestrator {
    fn drop(&mut self) {
        self.cancel_pending_advance();
    }
}

async fn feedback_elapsed(
    session: Weak<Mutex<QuizSession>>,
    delay: Duration,
    round_id: Uuid,
    index: u32,
) {
    tokio::time::sleep(delay).await;

    let Some(session) = session.upgrade() else {
        return;
    };
    let mut session = session.lock().await;
    if session.round_id() != round_id || session.current_index() != index {
        debug!(%round_id, index, "stale advance, ignoring");
        return;
    }
    session.advance().await;
}
