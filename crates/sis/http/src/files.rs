//! File distribution handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use sis_core::{Caller, Error, PendingFile};
use sis_service::ControlPlane;
use sis_storage::AllStorage;

use crate::error::ApiError;
use crate::extract::{bearer_token, device_credentials};

/// Push request: blob is transported base64-encoded in JSON, matching
/// the rest of the API.
#[derive(Debug, Deserialize)]
pub struct PushRequest {
    /// One device id or `"all"`.
    pub target: String,
    pub name: String,
    pub content_base64: String,
}

/// Push response.
#[derive(Debug, Serialize)]
pub struct PushResponse {
    pub ok: bool,
    pub file_id: String,
}

/// Push a file to one device or all known devices. Requires
/// `device.control`.
pub async fn push<S>(
    State(plane): State<ControlPlane<S>>,
    headers: HeaderMap,
    Json(req): Json<PushRequest>,
) -> Result<Json<PushResponse>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let caller = plane.authorize_operator(bearer_token(&headers))?;
    let bytes = decode_content(&req.content_base64)?;
    let file_id = plane.push_file(&caller, &req.target, &req.name, &bytes)?;
    Ok(Json(PushResponse { ok: true, file_id }))
}

/// Pending-files response.
#[derive(Debug, Serialize)]
pub struct PendingResponse {
    pub files: Vec<PendingFile>,
}

/// Drain the device's pending-file mailbox. Device path.
pub async fn pending<S>(
    State(plane): State<ControlPlane<S>>,
    headers: HeaderMap,
) -> Result<Json<PendingResponse>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let (id, token) = device_credentials(&headers);
    let Caller::Device { device_id } = plane.authorize_device(id, token)? else {
        return Err(Error::InvalidDeviceCredentials.into());
    };
    let files = plane.poll_pending_files(&device_id)?;
    Ok(Json(PendingResponse { files }))
}

/// Download a pushed blob by opaque id.
///
/// Public by design: the unguessable server-generated id is the access
/// control. A hardened deployment would bind this to the device
/// credential model instead.
pub async fn download<S>(
    State(plane): State<ControlPlane<S>>,
    Path(file_id): Path<String>,
) -> Result<Response, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let (record, bytes) = plane.download_file(&file_id)?;

    let disposition = format!("attachment; filename=\"{}\"", safe_filename(&record.name));
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Collect request.
#[derive(Debug, Deserialize)]
pub struct CollectRequest {
    pub name: String,
    pub content_base64: String,
}

/// Collect response.
#[derive(Debug, Serialize)]
pub struct CollectResponse {
    pub ok: bool,
    pub stored_as: String,
}

/// Store a device upload in its collected area. Device path.
pub async fn collect<S>(
    State(plane): State<ControlPlane<S>>,
    headers: HeaderMap,
    Json(req): Json<CollectRequest>,
) -> Result<Json<CollectResponse>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let (id, token) = device_credentials(&headers);
    let Caller::Device { device_id } = plane.authorize_device(id, token)? else {
        return Err(Error::InvalidDeviceCredentials.into());
    };

    let bytes = decode_content(&req.content_base64)?;
    let upload = plane.collect_upload(&device_id, &req.name, &bytes)?;
    Ok(Json(CollectResponse {
        ok: true,
        stored_as: upload.stored_as,
    }))
}

fn decode_content(content_base64: &str) -> Result<Vec<u8>, ApiError> {
    STANDARD
        .decode(content_base64)
        .map_err(|_| Error::MalformedRequest("content_base64 is not valid base64".into()).into())
}

/// Strip quote and control characters so the name is header-safe.
fn safe_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect()
}
