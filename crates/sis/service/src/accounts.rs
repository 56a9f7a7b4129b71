//! Operator accounts, roles, and login.

use sis_core::{
    Caller, Error, OperatorAccount, Result, RoleTable, bootstrap_roles, effective_permissions,
    is_known_permission, permission,
};
use sis_storage::AllStorage;

use crate::ControlPlane;

/// Role granted to the bootstrap operator.
const ADMIN_ROLE: &str = "server-admin";

impl<S: AllStorage> ControlPlane<S> {
    /// Create the first operator. Fails once any operator exists.
    ///
    /// Returns the one-time-code seed the operator must load into an
    /// authenticator.
    pub fn bootstrap(&self, username: &str, password: &str) -> Result<String> {
        if username.is_empty() || password.is_empty() {
            return Err(Error::MalformedRequest("user and pass are required".into()));
        }

        self.ensure_roles_seeded()?;

        let password_hash = sis_auth::hash_password(password)?;
        let otp_seed = sis_auth::random_otp_seed();

        let seed = otp_seed.clone();
        self.store.update_users(move |users| {
            if !users.is_empty() {
                return Err(Error::AlreadyInitialized);
            }
            users.insert(
                username.to_string(),
                OperatorAccount {
                    password_hash: Some(password_hash),
                    otp_seed: seed,
                    roles: vec![ADMIN_ROLE.to_string()],
                },
            );
            Ok(())
        })?;

        tracing::info!(username = %username, "bootstrap operator created");
        Ok(otp_seed)
    }

    /// Verify password and one-time code, then issue a session token
    /// carrying the effective permission snapshot.
    pub fn login(&self, username: &str, password: &str, otp: &str) -> Result<(String, Vec<String>)> {
        let users = self.store.load_users()?;
        let account = users.get(username).ok_or(Error::InvalidCredentials)?;

        let hash = account
            .password_hash
            .as_deref()
            .ok_or(Error::InvalidCredentials)?;
        if !sis_auth::verify_password(password, hash) {
            return Err(Error::InvalidCredentials);
        }

        let seed = sis_auth::decode_otp_seed(&account.otp_seed)?;
        if !sis_auth::totp::verify(&seed, otp) {
            return Err(Error::InvalidOneTimeCode);
        }

        let roles = self.store.load_roles()?.unwrap_or_default();
        let perms = effective_permissions(account, &roles);
        let token = self.sessions.issue(username, &perms)?;

        tracing::info!(username = %username, "operator logged in");
        Ok((token, perms.into_iter().collect()))
    }

    /// The role table. Requires `policy.edit`.
    pub fn get_roles(&self, caller: &Caller) -> Result<RoleTable> {
        caller.require_permission(permission::POLICY_EDIT)?;
        Ok(self.store.load_roles()?.unwrap_or_default())
    }

    /// Replace the role table whole. Requires `policy.edit`. Permission
    /// names outside the fixed vocabulary are rejected.
    pub fn set_roles(&self, caller: &Caller, roles: RoleTable) -> Result<()> {
        caller.require_permission(permission::POLICY_EDIT)?;

        for (role, perms) in &roles {
            for perm in perms {
                if !is_known_permission(perm) {
                    return Err(Error::MalformedRequest(format!(
                        "unknown permission {perm:?} in role {role:?}"
                    )));
                }
            }
        }

        self.store.replace_roles(&roles)?;
        tracing::info!(roles = roles.len(), "role table replaced");
        Ok(())
    }

    /// Replace a user's role list, creating the account if absent.
    /// Requires `policy.edit`.
    ///
    /// An account created here has a fresh one-time-code seed but no
    /// password, so it cannot log in until a password is set.
    pub fn assign_roles(&self, caller: &Caller, username: &str, roles: Vec<String>) -> Result<()> {
        caller.require_permission(permission::POLICY_EDIT)?;
        if username.is_empty() {
            return Err(Error::MalformedRequest("user is required".into()));
        }

        self.store.update_users(|users| {
            let account = users.entry(username.to_string()).or_insert_with(|| {
                OperatorAccount {
                    password_hash: None,
                    otp_seed: sis_auth::random_otp_seed(),
                    roles: Vec::new(),
                }
            });
            account.roles = roles;
            Ok(())
        })?;

        tracing::info!(username = %username, "roles assigned");
        Ok(())
    }

    /// Seed the bootstrap role set if the table does not exist yet.
    pub fn ensure_roles_seeded(&self) -> Result<()> {
        if self.store.load_roles()?.is_none() {
            self.store.replace_roles(&bootstrap_roles())?;
            tracing::info!("seeded bootstrap role table");
        }
        Ok(())
    }
}
