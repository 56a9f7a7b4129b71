//! Device enrollment, checkin, and the command queue.

use sis_core::{
    BroadcastAudit, Caller, DeviceRecord, Error, QueuedCommand, Result, TARGET_ALL,
    new_device_id, permission,
};
use sis_storage::AllStorage;

use crate::ControlPlane;

impl<S: AllStorage> ControlPlane<S> {
    /// Enroll a device: generate its id and bearer token and register it.
    ///
    /// A device is "known" from this moment, so broadcasts reach it even
    /// before its first poll.
    pub fn enroll_device(&self, metadata: serde_json::Value) -> Result<DeviceRecord> {
        let record = DeviceRecord {
            device_id: new_device_id(),
            device_token: sis_auth::random_device_token(),
            metadata,
            enrolled_at: chrono::Utc::now(),
            last_checkin: None,
        };

        self.store.insert_device(&record)?;
        tracing::info!(device_id = %record.device_id, "device enrolled");
        Ok(record)
    }

    /// Stamp the device's last-checkin time.
    pub fn checkin(&self, device_id: &str) -> Result<()> {
        self.store.record_checkin(device_id)?;
        tracing::debug!(device_id = %device_id, "device checkin");
        Ok(())
    }

    /// Enqueue a command for one device or, with the `"all"` marker,
    /// every known device. Requires `device.control`.
    ///
    /// An explicitly named unknown device fails with DeviceNotFound; a
    /// silent no-op would hide the mistake from the operator.
    pub fn enqueue_command(
        &self,
        caller: &Caller,
        target: &str,
        payload: serde_json::Value,
    ) -> Result<usize> {
        caller.require_permission(permission::DEVICE_CONTROL)?;
        if target == TARGET_ALL {
            return self.fan_out(payload);
        }

        if self.store.get_device(target)?.is_none() {
            return Err(Error::DeviceNotFound(target.to_string()));
        }

        let command = QueuedCommand::new(payload);
        self.store.enqueue_command(target, &command)?;
        tracing::info!(device_id = %target, command_id = %command.id, "command enqueued");
        Ok(1)
    }

    /// Legacy direct-command entry point: named target when present,
    /// fan-out to every known device otherwise. Requires
    /// `device.control`.
    pub fn direct_command(
        &self,
        caller: &Caller,
        target: Option<&str>,
        payload: serde_json::Value,
    ) -> Result<usize> {
        caller.require_permission(permission::DEVICE_CONTROL)?;
        match target {
            Some(device_id) => self.enqueue_command(caller, device_id, payload),
            None => self.fan_out(payload),
        }
    }

    /// Broadcast a message to every known device as a queued command.
    /// Requires `class.broadcast`. Also appends an audit record naming
    /// the sender.
    pub fn broadcast_message(&self, caller: &Caller, message: &str) -> Result<usize> {
        caller.require_permission(permission::CLASS_BROADCAST)?;
        let from = caller.username().unwrap_or_default().to_string();

        let reached = self.fan_out(serde_json::json!({
            "action": "broadcast",
            "message": message,
            "from": from,
        }))?;

        self.store.append_broadcast_audit(&BroadcastAudit {
            from,
            message: message.to_string(),
            sent_at: chrono::Utc::now(),
        })?;

        tracing::info!(reached, "broadcast sent");
        Ok(reached)
    }

    /// Atomically drain the device's own queue. Device path; an
    /// immediate second poll returns nothing.
    pub fn poll_commands(&self, device_id: &str) -> Result<Vec<QueuedCommand>> {
        let commands = self.store.drain_commands(device_id)?;
        if !commands.is_empty() {
            tracing::info!(device_id = %device_id, count = commands.len(), "commands delivered");
        }
        Ok(commands)
    }

    /// Append the payload to every known device's queue.
    fn fan_out(&self, payload: serde_json::Value) -> Result<usize> {
        let ids = self.store.list_device_ids()?;
        for id in &ids {
            self.store
                .enqueue_command(id, &QueuedCommand::new(payload.clone()))?;
        }
        Ok(ids.len())
    }
}
