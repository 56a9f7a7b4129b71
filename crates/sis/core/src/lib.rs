//! SIS Core Types
//!
//! Domain types shared by the control-plane crates: operator accounts,
//! roles and permissions, device records, queued commands, file records,
//! policy documents, telemetry entries, and the error taxonomy.

mod caller;
mod command;
mod device;
mod error;
mod file;
mod identity;
pub mod permission;
mod policy;
mod telemetry;

pub use caller::*;
pub use command::*;
pub use device::*;
pub use error::*;
pub use file::*;
pub use identity::*;
pub use permission::*;
pub use policy::*;
pub use telemetry::*;

/// Convenience result alias over the domain error.
pub type Result<T> = std::result::Result<T, Error>;
