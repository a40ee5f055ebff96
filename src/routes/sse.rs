use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/quiz",
    tag = "sse",
    responses((status = 200, description = "Quiz presenter signals", content_type = "text/event-stream", body = String))
)]
/// Stream questions, feedback, results and errors to the connected frontend.
pub async fn quiz_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe_quiz(&state);
    sse_service::to_sse_stream(receiver)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/quiz", get(quiz_stream))
}
