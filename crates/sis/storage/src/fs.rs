//! Filesystem document store.
//!
//! Each document is one pretty-printed JSON file under the data
//! directory; blobs live under `blobs/` and collected uploads under
//! `uploads/<device_id>/`. Writes go through a temp file and a rename so
//! a crashed request never leaves a half-written document. A lock table
//! keyed by document name serializes read-modify-write cycles per key.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;

use sis_core::{
    BroadcastAudit, CollectedUpload, DeviceRecord, Error, FileRecord, OperatorAccount,
    PendingFile, PolicyScope, QueuedCommand, Result, RoleTable, TelemetryEntry,
};

use crate::traits::*;

/// Telemetry entries retained per device. Appends past this trim the
/// oldest entries.
const TELEMETRY_RETAIN_MAX: usize = 1000;

/// Filesystem-backed storage.
#[derive(Clone)]
pub struct FsStorage {
    root: PathBuf,
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl FsStorage {
    /// Open (and create if needed) a data directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(Error::storage)?;
        Ok(Self {
            root,
            locks: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Run `f` while holding the named key's lock. Distinct keys never
    /// block each other.
    fn with_lock<R>(&self, key: &str, f: impl FnOnce() -> R) -> R {
        let lock = {
            let mut table = self.locks.lock();
            Arc::clone(table.entry(key.to_string()).or_default())
        };
        let _guard = lock.lock();
        f()
    }

    fn doc_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn read_doc<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.doc_path(key);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::storage(e)),
        };
        // A document that exists but fails to parse is corrupt; never
        // fall back to an empty default.
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| Error::Storage(format!("corrupt document {key}: {e}")))
    }

    fn write_doc<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.doc_path(key);
        let bytes = serde_json::to_vec_pretty(value).map_err(Error::storage)?;
        write_atomic(&path, &bytes)
    }

    /// Read-modify-write one document under its key lock. Missing
    /// documents start from `T::default()`.
    fn update_doc<T, R>(&self, key: &str, f: impl FnOnce(&mut T) -> Result<R>) -> Result<R>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        self.with_lock(key, || {
            let mut doc: T = self.read_doc(key)?.unwrap_or_default();
            let out = f(&mut doc)?;
            self.write_doc(key, &doc)?;
            Ok(out)
        })
    }

    fn blob_path(&self, file_id: &str) -> PathBuf {
        self.root.join("blobs").join(file_id)
    }

    fn policy_key(scope: PolicyScope, device_id: &str) -> String {
        match scope {
            PolicyScope::Default => "policy/default".to_string(),
            PolicyScope::Device => format!("policy/device/{device_id}"),
        }
    }
}

/// Write bytes to a temp file in the target directory, then rename into
/// place. Either the full file exists afterwards or nothing does.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().ok_or_else(|| Error::Storage("path has no parent".into()))?;
    std::fs::create_dir_all(dir).map_err(Error::storage)?;

    let tmp = dir.join(format!(".tmp-{}", uuid::Uuid::new_v4()));
    std::fs::write(&tmp, bytes).map_err(Error::storage)?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        Error::storage(e)
    })
}

impl IdentityStore for FsStorage {
    fn load_users(&self) -> Result<BTreeMap<String, OperatorAccount>> {
        Ok(self.read_doc("users")?.unwrap_or_default())
    }

    fn update_users<R>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, OperatorAccount>) -> Result<R>,
    ) -> Result<R> {
        self.update_doc("users", f)
    }

    fn load_roles(&self) -> Result<Option<RoleTable>> {
        self.read_doc("roles")
    }

    fn replace_roles(&self, roles: &RoleTable) -> Result<()> {
        self.with_lock("roles", || self.write_doc("roles", roles))
    }
}

impl DeviceStore for FsStorage {
    fn insert_device(&self, record: &DeviceRecord) -> Result<()> {
        self.update_doc("devices", |devices: &mut BTreeMap<String, DeviceRecord>| {
            devices.insert(record.device_id.clone(), record.clone());
            Ok(())
        })
    }

    fn get_device(&self, device_id: &str) -> Result<Option<DeviceRecord>> {
        let devices: BTreeMap<String, DeviceRecord> =
            self.read_doc("devices")?.unwrap_or_default();
        Ok(devices.get(device_id).cloned())
    }

    fn list_device_ids(&self) -> Result<Vec<String>> {
        let devices: BTreeMap<String, DeviceRecord> =
            self.read_doc("devices")?.unwrap_or_default();
        Ok(devices.keys().cloned().collect())
    }

    fn record_checkin(&self, device_id: &str) -> Result<()> {
        self.update_doc("devices", |devices: &mut BTreeMap<String, DeviceRecord>| {
            let record = devices
                .get_mut(device_id)
                .ok_or_else(|| Error::DeviceNotFound(device_id.to_string()))?;
            record.last_checkin = Some(chrono::Utc::now());
            Ok(())
        })
    }
}

impl CommandStore for FsStorage {
    fn enqueue_command(&self, device_id: &str, command: &QueuedCommand) -> Result<()> {
        self.update_doc(
            &format!("queue/{device_id}"),
            |queue: &mut Vec<QueuedCommand>| {
                queue.push(command.clone());
                Ok(())
            },
        )
    }

    fn drain_commands(&self, device_id: &str) -> Result<Vec<QueuedCommand>> {
        self.update_doc(
            &format!("queue/{device_id}"),
            |queue: &mut Vec<QueuedCommand>| Ok(std::mem::take(queue)),
        )
    }
}

impl FileStore for FsStorage {
    fn store_blob(&self, file_id: &str, bytes: &[u8]) -> Result<()> {
        write_atomic(&self.blob_path(file_id), bytes)
    }

    fn load_blob(&self, file_id: &str) -> Result<Option<Vec<u8>>> {
        match std::fs::read(self.blob_path(file_id)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::storage(e)),
        }
    }

    fn put_file_record(&self, record: &FileRecord) -> Result<()> {
        let key = format!("file/{}", record.file_id);
        self.with_lock(&key, || self.write_doc(&key, record))
    }

    fn get_file_record(&self, file_id: &str) -> Result<Option<FileRecord>> {
        self.read_doc(&format!("file/{file_id}"))
    }

    fn push_pending(&self, device_id: &str, pending: &PendingFile) -> Result<()> {
        self.update_doc(
            &format!("pending/{device_id}"),
            |list: &mut Vec<PendingFile>| {
                list.push(pending.clone());
                Ok(())
            },
        )
    }

    fn drain_pending(&self, device_id: &str) -> Result<Vec<PendingFile>> {
        self.update_doc(
            &format!("pending/{device_id}"),
            |list: &mut Vec<PendingFile>| Ok(std::mem::take(list)),
        )
    }

    fn store_collected(
        &self,
        device_id: &str,
        name: &str,
        bytes: &[u8],
    ) -> Result<CollectedUpload> {
        let collected_at = chrono::Utc::now();
        // Unique storage key so concurrent uploads of the same name
        // never clobber each other.
        let stored_as = format!(
            "{}-{}-{}",
            collected_at.format("%Y%m%dT%H%M%S"),
            uuid::Uuid::new_v4(),
            sanitize_name(name)
        );

        let path = self.root.join("uploads").join(device_id).join(&stored_as);
        write_atomic(&path, bytes)?;

        let upload = CollectedUpload {
            name: name.to_string(),
            stored_as,
            collected_at,
        };

        self.update_doc(
            &format!("collected/{device_id}"),
            |list: &mut Vec<CollectedUpload>| {
                list.push(upload.clone());
                Ok(())
            },
        )?;

        Ok(upload)
    }
}

impl PolicyStore for FsStorage {
    fn load_policy(
        &self,
        scope: PolicyScope,
        device_id: &str,
    ) -> Result<Option<serde_json::Value>> {
        self.read_doc(&Self::policy_key(scope, device_id))
    }

    fn replace_policy(
        &self,
        scope: PolicyScope,
        device_id: &str,
        document: &serde_json::Value,
    ) -> Result<()> {
        let key = Self::policy_key(scope, device_id);
        self.with_lock(&key, || self.write_doc(&key, document))
    }
}

impl TelemetryStore for FsStorage {
    fn append_telemetry(&self, device_id: &str, entry: &TelemetryEntry) -> Result<()> {
        self.update_doc(
            &format!("telemetry/{device_id}"),
            |log: &mut Vec<TelemetryEntry>| {
                log.push(entry.clone());
                if log.len() > TELEMETRY_RETAIN_MAX {
                    let excess = log.len() - TELEMETRY_RETAIN_MAX;
                    log.drain(..excess);
                }
                Ok(())
            },
        )
    }

    fn recent_telemetry(&self, device_id: &str, limit: usize) -> Result<Vec<TelemetryEntry>> {
        let log: Vec<TelemetryEntry> = self
            .read_doc(&format!("telemetry/{device_id}"))?
            .unwrap_or_default();
        let start = log.len().saturating_sub(limit);
        Ok(log[start..].to_vec())
    }

    fn append_broadcast_audit(&self, audit: &BroadcastAudit) -> Result<()> {
        self.update_doc("broadcast", |log: &mut Vec<BroadcastAudit>| {
            log.push(audit.clone());
            Ok(())
        })
    }
}

/// Keep file names shell- and path-safe.
fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() { "upload".to_string() } else { cleaned }
}
