//! Device enrollment, checkin, policy fetch, and command handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use sis_core::{Caller, Error};
use sis_service::ControlPlane;
use sis_storage::AllStorage;

use crate::auth::OkResponse;
use crate::error::ApiError;
use crate::extract::{bearer_token, device_credentials};

/// Enrollment response: the device's identity and its sole credential.
#[derive(Debug, Serialize)]
pub struct EnrollResponse {
    pub ok: bool,
    pub device_id: String,
    pub device_token: String,
}

/// Enroll a device. Public; the metadata body is stored opaquely.
pub async fn enroll<S>(
    State(plane): State<ControlPlane<S>>,
    Json(metadata): Json<serde_json::Value>,
) -> Result<Json<EnrollResponse>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let record = plane.enroll_device(metadata)?;
    Ok(Json(EnrollResponse {
        ok: true,
        device_id: record.device_id,
        device_token: record.device_token,
    }))
}

/// Device checkin: stamps last-seen. Device path.
pub async fn checkin<S>(
    State(plane): State<ControlPlane<S>>,
    headers: HeaderMap,
) -> Result<Json<OkResponse>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let (id, token) = device_credentials(&headers);
    let Caller::Device { device_id } = plane.authorize_device(id, token)? else {
        return Err(Error::InvalidDeviceCredentials.into());
    };
    plane.checkin(&device_id)?;
    Ok(OkResponse::ok())
}

/// `deviceId` query parameter.
#[derive(Debug, Deserialize)]
pub struct DeviceIdQuery {
    #[serde(rename = "deviceId", default)]
    pub device_id: Option<String>,
}

/// Effective policy for a device: operator (any permission level) or the
/// device itself, which always gets its own document.
pub async fn effective_policy<S>(
    State(plane): State<ControlPlane<S>>,
    headers: HeaderMap,
    Query(query): Query<DeviceIdQuery>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let (dev_id, dev_token) = device_credentials(&headers);
    let caller = plane.authorize_any(bearer_token(&headers), dev_id, dev_token)?;

    let device_id = match &caller {
        Caller::Device { device_id } => device_id.clone(),
        Caller::Operator { .. } => query
            .device_id
            .ok_or_else(|| Error::MalformedRequest("deviceId is required".into()))?,
    };

    Ok(Json(plane.get_effective_policy(&device_id)?))
}

/// Enqueue request: a device id or the `"all"` marker plus an opaque
/// command payload.
#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    #[serde(rename = "deviceId")]
    pub device_id: String,
    pub command: serde_json::Value,
}

/// Enqueue response.
#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    pub ok: bool,
    pub queued: usize,
}

/// Enqueue a command. Requires `device.control`.
pub async fn enqueue<S>(
    State(plane): State<ControlPlane<S>>,
    headers: HeaderMap,
    Json(req): Json<EnqueueRequest>,
) -> Result<Json<EnqueueResponse>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let caller = plane.authorize_operator(bearer_token(&headers))?;
    let queued = plane.enqueue_command(&caller, &req.device_id, req.command)?;
    Ok(Json(EnqueueResponse { ok: true, queued }))
}

/// Poll response: drained command payloads in enqueue order.
#[derive(Debug, Serialize)]
pub struct PollResponse {
    pub commands: Vec<serde_json::Value>,
}

/// Drain the device's own queue. Device path.
pub async fn poll<S>(
    State(plane): State<ControlPlane<S>>,
    headers: HeaderMap,
) -> Result<Json<PollResponse>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let (id, token) = device_credentials(&headers);
    let Caller::Device { device_id } = plane.authorize_device(id, token)? else {
        return Err(Error::InvalidDeviceCredentials.into());
    };
    let commands = plane.poll_commands(&device_id)?;
    Ok(Json(PollResponse {
        commands: commands.into_iter().map(|c| c.payload).collect(),
    }))
}

/// Broadcast request.
#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    #[serde(default)]
    pub message: String,
}

/// Broadcast response.
#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    pub ok: bool,
    pub reached: usize,
}

/// Broadcast a message to every known device. Requires
/// `class.broadcast`.
pub async fn broadcast<S>(
    State(plane): State<ControlPlane<S>>,
    headers: HeaderMap,
    Json(req): Json<BroadcastRequest>,
) -> Result<Json<BroadcastResponse>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let caller = plane.authorize_operator(bearer_token(&headers))?;
    let reached = plane.broadcast_message(&caller, &req.message)?;
    Ok(Json(BroadcastResponse { ok: true, reached }))
}

/// Legacy direct-command endpoint: the body is the command itself, with
/// an optional `deviceId` field naming the target; absent means every
/// known device. Requires `device.control`.
pub async fn direct_command<S>(
    State(plane): State<ControlPlane<S>>,
    headers: HeaderMap,
    Json(mut body): Json<serde_json::Value>,
) -> Result<Json<EnqueueResponse>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let caller = plane.authorize_operator(bearer_token(&headers))?;

    let target = body
        .as_object_mut()
        .ok_or_else(|| Error::MalformedRequest("command must be a JSON object".into()))?
        .remove("deviceId")
        .and_then(|v| v.as_str().map(|s| s.to_string()));

    let queued = plane.direct_command(&caller, target.as_deref(), body)?;
    Ok(Json(EnqueueResponse { ok: true, queued }))
}
