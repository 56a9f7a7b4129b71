//! Policy handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use serde::Deserialize;

use sis_core::PolicyScope;
use sis_service::ControlPlane;
use sis_storage::AllStorage;

use crate::auth::OkResponse;
use crate::devices::DeviceIdQuery;
use crate::error::ApiError;
use crate::extract::bearer_token;

/// Set-policy request.
#[derive(Debug, Deserialize)]
pub struct SetPolicyRequest {
    pub scope: PolicyScope,
    #[serde(rename = "deviceId", default)]
    pub device_id: Option<String>,
    pub policy: serde_json::Value,
}

/// Replace the default document or one device's override. Requires
/// `policy.edit`.
pub async fn set_policy<S>(
    State(plane): State<ControlPlane<S>>,
    headers: HeaderMap,
    Json(req): Json<SetPolicyRequest>,
) -> Result<Json<OkResponse>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let caller = plane.authorize_operator(bearer_token(&headers))?;
    let device_id = req.device_id.unwrap_or_default();
    plane.set_policy(&caller, req.scope, &device_id, req.policy)?;
    Ok(OkResponse::ok())
}

/// Transparency view: the reduced monitoring/screen-time projection of
/// the effective policy. Public by design.
pub async fn transparency_view<S>(
    State(plane): State<ControlPlane<S>>,
    Query(query): Query<DeviceIdQuery>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let device_id = query.device_id.unwrap_or_default();
    Ok(Json(plane.get_transparency_view(&device_id)?))
}
