//! Operator accounts and roles.

use std::collections::{BTreeMap, BTreeSet};

use crate::permission;

/// An operator (human administrator or teacher) account.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct OperatorAccount {
    /// Argon2id digest in PHC string form. Accounts created through role
    /// assignment have no digest yet and cannot log in.
    #[serde(default)]
    pub password_hash: Option<String>,

    /// One-time-code seed, base64-encoded raw bytes.
    pub otp_seed: String,

    /// Role names assigned to this account, in assignment order.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// The role table: role name → permission names it grants.
pub type RoleTable = BTreeMap<String, Vec<String>>;

/// The role set seeded on first run.
pub fn bootstrap_roles() -> RoleTable {
    let mut roles = RoleTable::new();
    roles.insert(
        "server-admin".to_string(),
        permission::ALL_PERMISSIONS.iter().map(|p| p.to_string()).collect(),
    );
    roles.insert(
        "teacher".to_string(),
        vec![
            permission::DEVICE_VIEW.to_string(),
            permission::CLASS_BROADCAST.to_string(),
            permission::SCREEN_LOCK.to_string(),
            permission::APP_BLOCK.to_string(),
        ],
    );
    roles.insert(
        "it-support".to_string(),
        vec![
            permission::DEVICE_VIEW.to_string(),
            permission::DEVICE_CONTROL.to_string(),
            permission::PRINTER_MANAGE.to_string(),
            permission::NETWORK_MANAGE.to_string(),
        ],
    );
    roles
}

/// Union of the permissions of every role assigned to the account.
///
/// Recomputed at every login; unknown role names contribute nothing.
pub fn effective_permissions(account: &OperatorAccount, roles: &RoleTable) -> BTreeSet<String> {
    let mut acc = BTreeSet::new();
    for role in &account.roles {
        if let Some(perms) = roles.get(role) {
            acc.extend(perms.iter().cloned());
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(roles: &[&str]) -> OperatorAccount {
        OperatorAccount {
            password_hash: None,
            otp_seed: "c2VlZA".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn permissions_are_the_union_over_roles() {
        let roles = bootstrap_roles();
        let perms = effective_permissions(&account(&["teacher", "it-support"]), &roles);
        assert!(perms.contains("device.view"));
        assert!(perms.contains("class.broadcast"));
        assert!(perms.contains("device.control"));
        assert!(!perms.contains("policy.edit"));
    }

    #[test]
    fn unknown_roles_grant_nothing() {
        let roles = bootstrap_roles();
        let perms = effective_permissions(&account(&["no-such-role"]), &roles);
        assert!(perms.is_empty());
    }

    #[test]
    fn server_admin_holds_the_full_vocabulary() {
        let roles = bootstrap_roles();
        let perms = effective_permissions(&account(&["server-admin"]), &roles);
        assert_eq!(perms.len(), permission::ALL_PERMISSIONS.len());
    }
}
