//! Telemetry entries.

/// Number of entries served by a recent-window read.
pub const RECENT_WINDOW: usize = 200;

/// One device-reported event, server-stamped on append.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TelemetryEntry {
    /// Arbitrary event payload as reported by the device.
    pub event: serde_json::Value,

    /// Server timestamp assigned at append time.
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

impl TelemetryEntry {
    /// Stamp an event with the current time.
    pub fn new(event: serde_json::Value) -> Self {
        Self {
            event,
            recorded_at: chrono::Utc::now(),
        }
    }
}

/// Audit record of an operator broadcast.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BroadcastAudit {
    /// Operator who sent the broadcast.
    pub from: String,

    /// The broadcast message text.
    pub message: String,

    /// When the broadcast was sent.
    pub sent_at: chrono::DateTime<chrono::Utc>,
}
