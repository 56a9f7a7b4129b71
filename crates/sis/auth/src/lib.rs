//! SIS Credential Service
//!
//! Password hashing, time-based one-time codes, signed session tokens,
//! and secret generation for the control plane.

mod password;
mod secrets;
mod session;
pub mod totp;

pub use password::*;
pub use secrets::*;
pub use session::*;
