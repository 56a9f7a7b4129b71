//! Telemetry handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use sis_core::{Caller, TelemetryEntry};
use sis_service::ControlPlane;
use sis_storage::AllStorage;

use crate::auth::OkResponse;
use crate::error::ApiError;
use crate::extract::{bearer_token, device_credentials};

/// Telemetry upload request.
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    pub event: serde_json::Value,
}

/// Report an event for the calling device. Device path.
pub async fn upload<S>(
    State(plane): State<ControlPlane<S>>,
    headers: HeaderMap,
    Json(req): Json<UploadRequest>,
) -> Result<Json<OkResponse>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let (id, token) = device_credentials(&headers);
    let Caller::Device { device_id } = plane.authorize_device(id, token)? else {
        return Err(sis_core::Error::InvalidDeviceCredentials.into());
    };
    plane.upload_telemetry(&device_id, req.event)?;
    Ok(OkResponse::ok())
}

/// Telemetry view response.
#[derive(Debug, Serialize)]
pub struct TelemetryResponse {
    pub entries: Vec<TelemetryEntry>,
}

/// The recent telemetry window for a device. Requires `device.view`.
pub async fn view<S>(
    State(plane): State<ControlPlane<S>>,
    headers: HeaderMap,
    Path(device_id): Path<String>,
) -> Result<Json<TelemetryResponse>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let caller = plane.authorize_operator(bearer_token(&headers))?;
    let entries = plane.read_telemetry(&caller, &device_id)?;
    Ok(Json(TelemetryResponse { entries }))
}
