use axum::{Json, Router, extract::State, routing::get};

use crate::{dto::quiz::StatisticsResponse, error::{AppError, ServiceError}, state::SharedState};

/// Aggregate statistics endpoints.
pub fn router() -> Router<SharedState> {
    Router::new().route("/statistics", get(get_statistics))
}

#[utoipa::path(
    get,
    path = "/statistics",
    tag = "statistics",
    responses(
        (status = 200, description = "Aggregate statistics", body = StatisticsResponse),
        (status = 503, description = "Statistics store unavailable")
    )
)]
/// Return games played, best game and overall accuracy.
pub async fn get_statistics(
    State(state): State<SharedState>,
) -> Result<Json<StatisticsResponse>, AppError> {
    let statistics = state
        .statistics()
        .current_statistics()
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(statistics.into()))
}
