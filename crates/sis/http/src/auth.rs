//! Credential, role, and assignment handlers.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use sis_core::{Caller, RoleTable};
use sis_service::ControlPlane;
use sis_storage::AllStorage;

use crate::error::ApiError;
use crate::extract::bearer_token;

/// Bootstrap request.
#[derive(Debug, Deserialize)]
pub struct BootstrapRequest {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub pass: Option<String>,
}

/// Bootstrap response: the seed the first admin loads into an
/// authenticator app.
#[derive(Debug, Serialize)]
pub struct BootstrapResponse {
    pub ok: bool,
    pub otp_seed: String,
}

/// Create the first operator. Public; fails once any operator exists.
pub async fn bootstrap<S>(
    State(plane): State<ControlPlane<S>>,
    Json(req): Json<BootstrapRequest>,
) -> Result<Json<BootstrapResponse>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let otp_seed = plane.bootstrap(
        req.user.as_deref().unwrap_or_default(),
        req.pass.as_deref().unwrap_or_default(),
    )?;
    Ok(Json(BootstrapResponse { ok: true, otp_seed }))
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub pass: String,
    #[serde(default)]
    pub otp: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub ok: bool,
    pub token: String,
    pub perms: Vec<String>,
}

/// Password + one-time-code login. Public.
pub async fn login<S>(
    State(plane): State<ControlPlane<S>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let (token, perms) = plane.login(&req.user, &req.pass, &req.otp)?;
    Ok(Json(LoginResponse { ok: true, token, perms }))
}

/// Whoami response.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: String,
    pub perms: Vec<String>,
}

/// Echo the caller's identity straight from the validated token.
pub async fn me<S>(
    State(plane): State<ControlPlane<S>>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    match plane.authorize_operator(bearer_token(&headers))? {
        Caller::Operator { username, permissions } => Ok(Json(MeResponse {
            user: username,
            perms: permissions.into_iter().collect(),
        })),
        // The operator path never yields a device caller.
        Caller::Device { .. } => Err(sis_core::Error::InvalidToken.into()),
    }
}

/// The role table. Requires `policy.edit`.
pub async fn get_roles<S>(
    State(plane): State<ControlPlane<S>>,
    headers: HeaderMap,
) -> Result<Json<RoleTable>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let caller = plane.authorize_operator(bearer_token(&headers))?;
    Ok(Json(plane.get_roles(&caller)?))
}

/// Ack-only response.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Json<Self> {
        Json(Self { ok: true })
    }
}

/// Replace the role table. Requires `policy.edit`.
pub async fn set_roles<S>(
    State(plane): State<ControlPlane<S>>,
    headers: HeaderMap,
    Json(roles): Json<RoleTable>,
) -> Result<Json<OkResponse>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let caller = plane.authorize_operator(bearer_token(&headers))?;
    plane.set_roles(&caller, roles)?;
    Ok(OkResponse::ok())
}

/// Role assignment request.
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Replace a user's role list. Requires `policy.edit`.
pub async fn assign_roles<S>(
    State(plane): State<ControlPlane<S>>,
    headers: HeaderMap,
    Json(req): Json<AssignRequest>,
) -> Result<Json<OkResponse>, ApiError>
where
    S: AllStorage + Clone + 'static,
{
    let caller = plane.authorize_operator(bearer_token(&headers))?;
    plane.assign_roles(&caller, &req.user, req.roles)?;
    Ok(OkResponse::ok())
}
