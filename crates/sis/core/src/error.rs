//! Error taxonomy for the control plane.

/// Terminal request errors.
///
/// Every error is terminal for the request that produced it; retries are
/// the caller's responsibility.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bootstrap was called after an operator already exists.
    #[error("server already initialized")]
    AlreadyInitialized,

    /// No usable credentials on the request (no bearer token, no device
    /// header pair).
    #[error("missing credentials")]
    MissingCredentials,

    /// Unknown username, missing password, or password digest mismatch.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The supplied one-time code does not match the current time window.
    #[error("invalid one-time code")]
    InvalidOneTimeCode,

    /// Malformed, mis-signed, or expired session token.
    #[error("invalid session token")]
    InvalidToken,

    /// Device id/token pair does not match an enrolled device.
    #[error("invalid device credentials")]
    InvalidDeviceCredentials,

    /// Credential valid but the required permission is absent.
    #[error("permission denied: {0}")]
    Forbidden(String),

    /// An explicitly named target device does not exist.
    #[error("unknown device: {0}")]
    DeviceNotFound(String),

    /// No file record exists under the given id.
    #[error("unknown file: {0}")]
    FileNotFound(String),

    /// Request body missing required fields or otherwise unusable.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Store-level fault (unreadable or corrupt document). Fatal for this
    /// request only; never silently defaults to an empty document.
    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Short machine-readable kind used in the error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AlreadyInitialized => "already-initialized",
            Self::MissingCredentials => "auth",
            Self::InvalidCredentials => "invalid",
            Self::InvalidOneTimeCode => "otp",
            Self::InvalidToken => "token",
            Self::InvalidDeviceCredentials => "device-auth",
            Self::Forbidden(_) => "forbidden",
            Self::DeviceNotFound(_) => "device-not-found",
            Self::FileNotFound(_) => "file-not-found",
            Self::MalformedRequest(_) => "bad",
            Self::Storage(_) => "internal",
        }
    }

    /// Build a storage error from any underlying cause.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }
}
