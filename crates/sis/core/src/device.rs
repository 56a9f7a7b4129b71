//! Device records.

/// An enrolled device.
///
/// The token is generated at enrollment, never rotated, and is the
/// device's sole credential (bearer model, exact match).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DeviceRecord {
    /// Server-generated identifier (`dev-<uuid>`).
    pub device_id: String,

    /// Server-generated bearer secret.
    pub device_token: String,

    /// Opaque enrollment metadata supplied by the agent.
    #[serde(default)]
    pub metadata: serde_json::Value,

    /// When the device enrolled.
    pub enrolled_at: chrono::DateTime<chrono::Utc>,

    /// Last successful checkin, if any.
    #[serde(default)]
    pub last_checkin: Option<chrono::DateTime<chrono::Utc>>,
}

/// Generate a fresh device id.
pub fn new_device_id() -> String {
    format!("dev-{}", uuid::Uuid::new_v4())
}
