use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::sse::{QuizSignalEvent, ServerEvent},
    services::presenter::{Presenter, PresenterSignal},
    state::SseHub,
};

const EVENT_QUESTION: &str = "quiz.question";
const EVENT_FEEDBACK: &str = "quiz.feedback";
const EVENT_RESULT: &str = "quiz.result";
const EVENT_ERROR: &str = "quiz.error";

/// Presenter publishing every signal on the quiz SSE stream.
#[derive(Clone)]
pub struct SsePresenter {
    hub: SseHub,
}

impl SsePresenter {
    /// Publish on `hub`.
    pub fn new(hub: SseHub) -> Self {
        Self { hub }
    }
}

impl Presenter for SsePresenter {
    fn present(&self, round_id: Uuid, signal: PresenterSignal) {
        match signal {
            PresenterSignal::Question(view) => {
                send_quiz_event(&self.hub, EVENT_QUESTION, round_id, &view)
            }
            PresenterSignal::Feedback(feedback) => {
                send_quiz_event(&self.hub, EVENT_FEEDBACK, round_id, &feedback)
            }
            PresenterSignal::Result(view) => {
                send_quiz_event(&self.hub, EVENT_RESULT, round_id, &view)
            }
            PresenterSignal::Error(error) => {
                send_quiz_event(&self.hub, EVENT_ERROR, round_id, &error)
            }
        }
    }
}

fn send_quiz_event(hub: &SseHub, event: &str, round_id: Uuid, signal: &impl Serialize) {
    let payload = QuizSignalEvent { round_id, signal };
    match ServerEvent::json(Some(event.to_string()), &payload) {
        Ok(event) => hub.broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize quiz SSE payload"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::presenter::{ErrorSignal, FeedbackSignal};

    #[tokio::test]
    async fn signals_are_broadcast_with_round_id() {
        let hub = SseHub::new(4);
        let mut receiver = hub.subscribe();
        let presenter = SsePresenter::new(hub);
        let round_id = Uuid::new_v4();

        presenter.present(
            round_id,
            PresenterSignal::Feedback(FeedbackSignal { is_correct: false }),
        );
        presenter.present(round_id, PresenterSignal::Error(ErrorSignal::new("offline")));

        let feedback = receiver.recv().await.unwrap();
        assert_eq!(feedback.event.as_deref(), Some("quiz.feedback"));
        let data: serde_json::Value = serde_json::from_str(&feedback.data).unwrap();
        assert_eq!(data["round_id"], round_id.to_string());
        assert_eq!(data["is_correct"], false);

        let error = receiver.recv().await.unwrap();
        assert_eq!(error.event.as_deref(), Some("quiz.error"));
        let data: serde_json::Value = serde_json::from_str(&error.data).unwrap();
        assert_eq!(data["button_text"], "Try again");
    }
}
