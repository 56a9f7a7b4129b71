//! File distribution records.

/// Metadata for a pushed file blob. Immutable once created.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FileRecord {
    /// Server-generated opaque identifier.
    pub file_id: String,

    /// Original file name as supplied by the pusher.
    pub name: String,

    /// When the blob was stored.
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

/// One-shot mailbox entry telling a device a file awaits it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PendingFile {
    /// Referenced file id.
    pub file_id: String,

    /// File name, carried so the device need not fetch metadata first.
    pub name: String,
}

/// Record of a blob a device uploaded to its collected area.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CollectedUpload {
    /// Name supplied by the device.
    pub name: String,

    /// Storage key of the blob, unique per upload.
    pub stored_as: String,

    /// When the upload was collected.
    pub collected_at: chrono::DateTime<chrono::Utc>,
}

/// Generate a fresh file id.
pub fn new_file_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
