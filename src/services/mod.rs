/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Presenter boundary of the quiz session.
pub mod presenter;
/// Serialises player actions and schedules the feedback delay.
pub mod quiz_service;
/// Quiz round state machine and flow.
pub mod quiz_session;
/// Server-Sent Events presenter.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Aggregate statistics persistence.
pub mod statistics_service;
