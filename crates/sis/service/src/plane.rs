//! The control-plane service object.

use sis_auth::SessionKeys;

/// Control-plane operations over a storage backend.
///
/// Generic over the combined storage trait so tests can run against a
/// scratch directory and production against the configured data dir.
#[derive(Clone)]
pub struct ControlPlane<S> {
    pub(crate) store: S,
    pub(crate) sessions: SessionKeys,
}

impl<S> ControlPlane<S> {
    /// Create a control plane over a store and session keys.
    pub fn new(store: S, sessions: SessionKeys) -> Self {
        Self { store, sessions }
    }

    /// Access the session key material (used by the HTTP guard).
    pub fn sessions(&self) -> &SessionKeys {
        &self.sessions
    }
}
