//! Storage traits.

use std::collections::BTreeMap;

use sis_core::{
    BroadcastAudit, CollectedUpload, DeviceRecord, FileRecord, OperatorAccount, PendingFile,
    PolicyScope, QueuedCommand, Result, RoleTable, TelemetryEntry,
};

/// Operator account and role storage.
pub trait IdentityStore: Send + Sync {
    /// Load the account table. Empty before bootstrap.
    fn load_users(&self) -> Result<BTreeMap<String, OperatorAccount>>;

    /// Read-modify-write the account table under its key lock.
    fn update_users<R>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, OperatorAccount>) -> Result<R>,
    ) -> Result<R>;

    /// Load the role table, if it has been seeded.
    fn load_roles(&self) -> Result<Option<RoleTable>>;

    /// Replace the role table whole.
    fn replace_roles(&self, roles: &RoleTable) -> Result<()>;
}

/// Device registry storage. A device is "known" from the moment its
/// record is inserted at enrollment.
pub trait DeviceStore: Send + Sync {
    /// Insert a freshly enrolled device.
    fn insert_device(&self, record: &DeviceRecord) -> Result<()>;

    /// Fetch a device record by id.
    fn get_device(&self, device_id: &str) -> Result<Option<DeviceRecord>>;

    /// All known device ids.
    fn list_device_ids(&self) -> Result<Vec<String>>;

    /// Stamp a device's last checkin time.
    fn record_checkin(&self, device_id: &str) -> Result<()>;
}

/// Per-device command queue storage.
pub trait CommandStore: Send + Sync {
    /// Append a command to a device's queue, creating the queue document
    /// if it does not exist yet.
    fn enqueue_command(&self, device_id: &str, command: &QueuedCommand) -> Result<()>;

    /// Atomically return the queued commands and reset the queue to
    /// empty. Concurrent drains on the same device partition the
    /// entries; none is duplicated or lost.
    fn drain_commands(&self, device_id: &str) -> Result<Vec<QueuedCommand>>;
}

/// File blob, record, pending-notification, and collected-upload storage.
pub trait FileStore: Send + Sync {
    /// Store a blob under a file id. All-or-nothing: a failed write
    /// leaves no partial blob behind.
    fn store_blob(&self, file_id: &str, bytes: &[u8]) -> Result<()>;

    /// Fetch a blob by file id.
    fn load_blob(&self, file_id: &str) -> Result<Option<Vec<u8>>>;

    /// Store a file metadata record.
    fn put_file_record(&self, record: &FileRecord) -> Result<()>;

    /// Fetch a file metadata record.
    fn get_file_record(&self, file_id: &str) -> Result<Option<FileRecord>>;

    /// Append a pending notification to a device's mailbox.
    fn push_pending(&self, device_id: &str, pending: &PendingFile) -> Result<()>;

    /// Atomically drain a device's pending mailbox. Same contract as
    /// command drains.
    fn drain_pending(&self, device_id: &str) -> Result<Vec<PendingFile>>;

    /// Store a device-collected upload without overwriting prior ones.
    fn store_collected(&self, device_id: &str, name: &str, bytes: &[u8])
    -> Result<CollectedUpload>;
}

/// Policy document storage. Default and per-device documents live under
/// independent keys and never share a lock.
pub trait PolicyStore: Send + Sync {
    /// Load one policy document.
    fn load_policy(&self, scope: PolicyScope, device_id: &str)
    -> Result<Option<serde_json::Value>>;

    /// Replace one policy document whole.
    fn replace_policy(
        &self,
        scope: PolicyScope,
        device_id: &str,
        document: &serde_json::Value,
    ) -> Result<()>;
}

/// Telemetry and broadcast-audit storage.
pub trait TelemetryStore: Send + Sync {
    /// Append a server-stamped telemetry entry to a device's log.
    fn append_telemetry(&self, device_id: &str, entry: &TelemetryEntry) -> Result<()>;

    /// The most recent `limit` entries, in chronological order. Empty for
    /// a device that has never reported.
    fn recent_telemetry(&self, device_id: &str, limit: usize) -> Result<Vec<TelemetryEntry>>;

    /// Append a broadcast audit record.
    fn append_broadcast_audit(&self, audit: &BroadcastAudit) -> Result<()>;
}

/// Combined storage trait.
pub trait AllStorage:
    IdentityStore + DeviceStore + CommandStore + FileStore + PolicyStore + TelemetryStore
{
}

impl<T> AllStorage for T where
    T: IdentityStore + DeviceStore + CommandStore + FileStore + PolicyStore + TelemetryStore
{
}
