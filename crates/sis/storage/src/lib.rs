//! SIS Storage Layer
//!
//! Keyed-document persistence for identities, devices, queues, files,
//! policies, and telemetry. Documents are read and replaced whole; a
//! per-key lock table serializes read-modify-write cycles on the same
//! key while leaving distinct keys free to proceed concurrently.

mod fs;
mod traits;

pub use fs::FsStorage;
pub use traits::*;
