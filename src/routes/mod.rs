use axum::Router;

use crate::state::SharedState;

/// Swagger UI.
pub mod docs;
/// `/healthcheck`.
pub mod health;
/// `/quiz/*` player actions.
pub mod quiz;
/// `/sse/quiz` stream.
pub mod sse;
/// `/statistics`.
pub mod statistics;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(quiz::router())
        .merge(statistics::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
