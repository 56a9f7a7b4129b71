//! Layered policy resolution.

use sis_core::{Caller, Error, PolicyScope, Result, effective_policy, permission, transparency_view};
use sis_storage::AllStorage;

use crate::ControlPlane;

impl<S: AllStorage> ControlPlane<S> {
    /// The default document with the device override shallow-overlaid.
    /// A device with no override gets the default alone.
    pub fn get_effective_policy(&self, device_id: &str) -> Result<serde_json::Value> {
        let default = self
            .store
            .load_policy(PolicyScope::Default, "")?
            .unwrap_or_else(|| serde_json::Value::Object(Default::default()));
        let device = self.store.load_policy(PolicyScope::Device, device_id)?;
        Ok(effective_policy(&default, device.as_ref()))
    }

    /// Replace one policy document. Requires `policy.edit`.
    ///
    /// Writes to one scope never touch the other; the two documents live
    /// under independent store keys.
    pub fn set_policy(
        &self,
        caller: &Caller,
        scope: PolicyScope,
        device_id: &str,
        document: serde_json::Value,
    ) -> Result<()> {
        caller.require_permission(permission::POLICY_EDIT)?;

        if !document.is_object() {
            return Err(Error::MalformedRequest("policy must be a JSON object".into()));
        }
        if scope == PolicyScope::Device {
            validate_device_key(device_id)?;
        }

        self.store.replace_policy(scope, device_id, &document)?;
        tracing::info!(?scope, device_id = %device_id, "policy replaced");
        Ok(())
    }

    /// The public transparency projection: monitoring and screen-time
    /// fields of the effective policy only, whoever asks.
    pub fn get_transparency_view(&self, device_id: &str) -> Result<serde_json::Value> {
        Ok(transparency_view(&self.get_effective_policy(device_id)?))
    }
}

/// Device-scope ids become store keys; keep them to a safe charset.
fn validate_device_key(device_id: &str) -> Result<()> {
    let ok = !device_id.is_empty()
        && device_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    if ok {
        Ok(())
    } else {
        Err(Error::MalformedRequest("invalid device id".into()))
    }
}
