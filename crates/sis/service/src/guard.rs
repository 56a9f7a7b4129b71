//! Authorization guard: the single gate every protected operation
//! passes through.

use sis_core::{Caller, Error, Result};
use sis_storage::AllStorage;

use crate::ControlPlane;

impl<S: AllStorage> ControlPlane<S> {
    /// Operator path: validate a bearer session token.
    ///
    /// The permission snapshot embedded at login rides along in the
    /// returned caller; `Caller::require_permission` checks against it.
    pub fn authorize_operator(&self, bearer: Option<&str>) -> Result<Caller> {
        let token = bearer.ok_or(Error::MissingCredentials)?;
        let claims = self.sessions.validate(token)?;
        Ok(Caller::Operator {
            username: claims.sub,
            permissions: claims.perms.into_iter().collect(),
        })
    }

    /// Device path: validate an id/token header pair.
    ///
    /// Device-reachable operations are fixed by design, so this path
    /// never consults permissions; possession of the enrollment token is
    /// sufficient proof of identity.
    pub fn authorize_device(
        &self,
        device_id: Option<&str>,
        device_token: Option<&str>,
    ) -> Result<Caller> {
        let (device_id, device_token) = match (device_id, device_token) {
            (Some(id), Some(token)) => (id, token),
            _ => return Err(Error::MissingCredentials),
        };

        let record = self
            .store
            .get_device(device_id)?
            .ok_or(Error::InvalidDeviceCredentials)?;

        if record.device_token != device_token {
            return Err(Error::InvalidDeviceCredentials);
        }

        Ok(Caller::Device {
            device_id: device_id.to_string(),
        })
    }

    /// Either path: used by operations reachable by operators and
    /// devices alike (effective-policy fetch).
    pub fn authorize_any(
        &self,
        bearer: Option<&str>,
        device_id: Option<&str>,
        device_token: Option<&str>,
    ) -> Result<Caller> {
        if bearer.is_some() {
            self.authorize_operator(bearer)
        } else {
            self.authorize_device(device_id, device_token)
        }
    }
}
