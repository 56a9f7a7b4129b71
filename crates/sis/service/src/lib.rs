//! SIS Control-Plane Service
//!
//! `ControlPlane` implements every operator- and device-facing
//! operation: credential flows, the authorization guard, the per-device
//! command queue, file distribution, policy resolution, and the
//! telemetry sink. The HTTP layer is a thin shell over this crate.

mod accounts;
mod devices;
mod files;
mod guard;
mod plane;
mod policies;
mod telemetry;

pub use plane::ControlPlane;
