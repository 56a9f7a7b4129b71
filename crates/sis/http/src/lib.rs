//! SIS HTTP Layer
//!
//! Axum handlers and router for the control plane. Handlers extract
//! credentials from headers, hand everything to `sis_service`, and map
//! domain errors onto the uniform `{"error": kind}` envelope.

mod auth;
mod devices;
mod error;
mod extract;
mod files;
mod middleware;
mod policies;
mod telemetry;

pub use error::ApiError;
pub use extract::{DEVICE_ID_HEADER, DEVICE_TOKEN_HEADER, bearer_token, device_credentials};
pub use middleware::logging_middleware;

use axum::Router;
use axum::routing::{get, post};

use sis_service::ControlPlane;
use sis_storage::AllStorage;

/// Build the full control-plane router.
pub fn router<S>(plane: ControlPlane<S>) -> Router
where
    S: AllStorage + Clone + 'static,
{
    Router::new()
        // Credential service
        .route("/auth/bootstrap", post(auth::bootstrap::<S>))
        .route("/auth/login", post(auth::login::<S>))
        .route("/auth/me", get(auth::me::<S>))
        // Roles and assignment
        .route("/roles", get(auth::get_roles::<S>).post(auth::set_roles::<S>))
        .route("/users/assign", post(auth::assign_roles::<S>))
        // Devices and command queue
        .route("/devices/enroll", post(devices::enroll::<S>))
        .route("/devices/checkin", post(devices::checkin::<S>))
        .route("/devices/policies", get(devices::effective_policy::<S>))
        .route("/devices/commands/enqueue", post(devices::enqueue::<S>))
        .route("/devices/commands/poll", post(devices::poll::<S>))
        .route("/devices/broadcast", post(devices::broadcast::<S>))
        .route("/devices/command", post(devices::direct_command::<S>))
        // File distribution
        .route("/files/push", post(files::push::<S>))
        .route("/files/pending", get(files::pending::<S>))
        .route("/files/download/{id}", get(files::download::<S>))
        .route("/files/collect", post(files::collect::<S>))
        // Policies
        .route("/policies/set", post(policies::set_policy::<S>))
        .route("/policies/view", get(policies::transparency_view::<S>))
        // Telemetry
        .route("/telemetry/upload", post(telemetry::upload::<S>))
        .route("/telemetry/{device_id}", get(telemetry::view::<S>))
        .layer(axum::middleware::from_fn(middleware::logging_middleware))
        .with_state(plane)
}
