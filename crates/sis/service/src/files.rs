//! File distribution: push, pending fan-out, download, collect.

use sis_core::{
    Caller, CollectedUpload, Error, FileRecord, PendingFile, Result, TARGET_ALL, new_file_id,
    permission,
};
use sis_storage::AllStorage;

use crate::ControlPlane;

impl<S: AllStorage> ControlPlane<S> {
    /// Store a blob once and notify the targeted device(s). Requires
    /// `device.control`.
    ///
    /// The target is validated before anything is written, so an unknown
    /// explicit target leaves no orphaned blob behind.
    pub fn push_file(
        &self,
        caller: &Caller,
        target: &str,
        name: &str,
        bytes: &[u8],
    ) -> Result<String> {
        caller.require_permission(permission::DEVICE_CONTROL)?;
        if name.is_empty() {
            return Err(Error::MalformedRequest("file name is required".into()));
        }

        let targets: Vec<String> = if target == TARGET_ALL {
            self.store.list_device_ids()?
        } else {
            if self.store.get_device(target)?.is_none() {
                return Err(Error::DeviceNotFound(target.to_string()));
            }
            vec![target.to_string()]
        };

        let record = FileRecord {
            file_id: new_file_id(),
            name: name.to_string(),
            uploaded_at: chrono::Utc::now(),
        };

        // Blob before record: a record must never reference bytes that
        // did not make it to disk.
        self.store.store_blob(&record.file_id, bytes)?;
        self.store.put_file_record(&record)?;

        for device_id in &targets {
            self.store.push_pending(
                device_id,
                &PendingFile {
                    file_id: record.file_id.clone(),
                    name: record.name.clone(),
                },
            )?;
        }

        tracing::info!(
            file_id = %record.file_id,
            name = %record.name,
            targets = targets.len(),
            "file pushed"
        );
        Ok(record.file_id)
    }

    /// Atomically drain the device's own pending-file mailbox.
    pub fn poll_pending_files(&self, device_id: &str) -> Result<Vec<PendingFile>> {
        self.store.drain_pending(device_id)
    }

    /// Fetch a pushed blob by opaque id.
    ///
    /// Public by design: the server-generated id is the access control.
    pub fn download_file(&self, file_id: &str) -> Result<(FileRecord, Vec<u8>)> {
        let record = self
            .store
            .get_file_record(file_id)?
            .ok_or_else(|| Error::FileNotFound(file_id.to_string()))?;

        // The record is only written after the blob, so a missing blob
        // here is store corruption, not a bad file id.
        let bytes = self
            .store
            .load_blob(file_id)?
            .ok_or_else(|| Error::Storage(format!("blob missing for file {file_id}")))?;

        Ok((record, bytes))
    }

    /// Store a device upload in its collected area, timestamped, never
    /// overwriting earlier uploads.
    pub fn collect_upload(
        &self,
        device_id: &str,
        name: &str,
        bytes: &[u8],
    ) -> Result<CollectedUpload> {
        if name.is_empty() {
            return Err(Error::MalformedRequest("file name is required".into()));
        }
        let upload = self.store.store_collected(device_id, name, bytes)?;
        tracing::info!(device_id = %device_id, stored_as = %upload.stored_as, "upload collected");
        Ok(upload)
    }
}
