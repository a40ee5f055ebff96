use axum::{Json, Router, extract::State, routing::{get, post}};

use crate::{
    dto::quiz::{AnswerRequest, AnswerResponse, SessionStateResponse},
    error::AppError,
    state::SharedState,
};

/// Player actions on the running quiz.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/quiz/start", post(start_round))
        .route("/quiz/answer", post(submit_answer))
        .route("/quiz/advance", post(advance))
        .route("/quiz/question", post(request_question))
        .route("/quiz/state", get(get_state))
}

#[utoipa::path(
    post,
    path = "/quiz/start",
    tag = "quiz",
    responses(
        (status = 200, description = "Round started, or already running", body = SessionStateResponse),
        (status = 500, description = "Invalid round configuration"),
        (status = 503, description = "Questions could not be loaded")
    )
)]
/// Start a round, or retry after an error or a finished round.
pub async fn start_round(
    State(state): State<SharedState>,
) -> Result<Json<SessionStateResponse>, AppError> {
    let snapshot = state.quiz().start().await?;
    Ok(Json(snapshot.into()))
}

#[utoipa::path(
    post,
    path = "/quiz/answer",
    tag = "quiz",
    request_body = AnswerRequest,
    responses((status = 200, description = "Answer scored or ignored", body = AnswerResponse))
)]
/// Answer the current question with yes (`true`) or no (`false`).
pub async fn submit_answer(
    State(state): State<SharedState>,
    Json(request): Json<AnswerRequest>,
) -> Json<AnswerResponse> {
    Json(state.quiz().answer(request.answer).await.into())
}

#[utoipa::path(
    post,
    path = "/quiz/advance",
    tag = "quiz",
    responses(
        (status = 200, description = "Moved past the feedback", body = SessionStateResponse),
        (status = 409, description = "Feedback advances automatically")
    )
)]
/// Leave the feedback screen when the automatic delay is disabled.
pub async fn advance(
    State(state): State<SharedState>,
) -> Result<Json<SessionStateResponse>, AppError> {
    let snapshot = state.quiz().advance().await?;
    Ok(Json(snapshot.into()))
}

#[utoipa::path(
    post,
    path = "/quiz/question",
    tag = "quiz",
    responses((status = 200, description = "Question source polled", body = SessionStateResponse))
)]
/// Poll the question source again after it had nothing to offer.
pub async fn request_question(State(state): State<SharedState>) -> Json<SessionStateResponse> {
    Json(state.quiz().request_question().await.into())
}

#[utoipa::path(
    get,
    path = "/quiz/state",
    tag = "quiz",
    responses((status = 200, description = "Current session state", body = SessionStateResponse))
)]
/// Current session state.
pub async fn get_state(State(state): State<SharedState>) -> Json<SessionStateResponse> {
    Json(state.quiz().snapshot().await.into())
}
