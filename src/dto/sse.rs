use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// SSE event name.
    pub event: Option<String>,
    /// Serialized payload.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize)]
/// Presenter signal tagged with the round it belongs to.
pub struct QuizSignalEvent<'a, T: Serialize> {
    /// Round the signal was produced for; stale rounds can be ignored.
    pub round_id: Uuid,
    /// The signal payload, flattened next to `round_id`.
    #[serde(flatten)]
    pub signal: &'a T,
}
