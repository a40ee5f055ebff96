use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report `ok` when the statistics store answers, `degraded` otherwise.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.statistics().health_check().await {
        Ok(()) => HealthResponse::ok(),
        Err(err) => {
            warn!(error = %err, "statistics store health check failed");
            HealthResponse::degraded()
        }
    }
}
