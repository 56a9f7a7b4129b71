//! Queued commands.

/// A command waiting in a device's queue.
///
/// The payload is opaque to the queue; ordering is insertion order.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct QueuedCommand {
    /// Unique command identifier.
    pub id: String,

    /// Arbitrary structured payload.
    pub payload: serde_json::Value,

    /// When the command was enqueued.
    pub queued_at: chrono::DateTime<chrono::Utc>,
}

impl QueuedCommand {
    /// Wrap a payload with a fresh id and the current timestamp.
    pub fn new(payload: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            payload,
            queued_at: chrono::Utc::now(),
        }
    }
}

/// Broadcast marker accepted in place of a device id.
pub const TARGET_ALL: &str = "all";
