//! Caller identity resolved by the authorization guard.

use std::collections::BTreeSet;

use crate::Error;

/// The authenticated principal behind a request.
#[derive(Debug, Clone)]
pub enum Caller {
    /// An operator with a validated session token. Permissions are the
    /// snapshot embedded at issuance, not the live role table.
    Operator {
        username: String,
        permissions: BTreeSet<String>,
    },

    /// A device with a validated id/token pair. Devices carry a fixed
    /// implicit capability set and never hold named permissions.
    Device { device_id: String },
}

impl Caller {
    /// Fail with Forbidden unless this is an operator holding `permission`.
    ///
    /// Device callers are always rejected here: device-reachable
    /// operations are fixed by design and never permission-gated.
    pub fn require_permission(&self, permission: &str) -> Result<(), Error> {
        match self {
            Self::Operator { permissions, .. } if permissions.contains(permission) => Ok(()),
            _ => Err(Error::Forbidden(permission.to_string())),
        }
    }

    /// The operator username, if this caller is an operator.
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Operator { username, .. } => Some(username),
            Self::Device { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_with_permission_passes() {
        let caller = Caller::Operator {
            username: "alice".into(),
            permissions: ["device.control".to_string()].into_iter().collect(),
        };
        assert!(caller.require_permission("device.control").is_ok());
        assert!(matches!(
            caller.require_permission("policy.edit"),
            Err(Error::Forbidden(_))
        ));
    }

    #[test]
    fn device_never_holds_permissions() {
        let caller = Caller::Device { device_id: "dev-1".into() };
        assert!(caller.require_permission("device.view").is_err());
    }
}
