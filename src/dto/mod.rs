use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Health check payload.
pub mod health;
/// Quiz phase as exposed to clients.
pub mod phase;
pub mod presenter;
/// Request and response bodies of the quiz and statistics routes.
pub mod quiz;
/// Server-sent event envelopes.
pub mod sse;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
