//! Telemetry sink.

use sis_core::{Caller, RECENT_WINDOW, Result, TelemetryEntry, permission};
use sis_storage::AllStorage;

use crate::ControlPlane;

impl<S: AllStorage> ControlPlane<S> {
    /// Append a device-reported event, server-stamped.
    pub fn upload_telemetry(&self, device_id: &str, event: serde_json::Value) -> Result<()> {
        self.store
            .append_telemetry(device_id, &TelemetryEntry::new(event))?;
        tracing::debug!(device_id = %device_id, "telemetry appended");
        Ok(())
    }

    /// The most recent window of a device's telemetry, chronological.
    /// Requires `device.view`. A device with no telemetry yields an
    /// empty list, not an error.
    pub fn read_telemetry(&self, caller: &Caller, device_id: &str) -> Result<Vec<TelemetryEntry>> {
        caller.require_permission(permission::DEVICE_VIEW)?;
        self.store.recent_telemetry(device_id, RECENT_WINDOW)
    }
}
