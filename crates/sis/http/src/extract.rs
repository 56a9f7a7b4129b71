//! Credential extraction from request headers.

use axum::http::HeaderMap;

/// Device identity header.
pub const DEVICE_ID_HEADER: &str = "X-Device-ID";

/// Device bearer secret header.
pub const DEVICE_TOKEN_HEADER: &str = "X-Device-Token";

/// The bearer session token, if an `Authorization: Bearer` header is
/// present and well-formed.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// The device id/token header pair, each independently optional.
pub fn device_credentials(headers: &HeaderMap) -> (Option<&str>, Option<&str>) {
    let get = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    (get(DEVICE_ID_HEADER), get(DEVICE_TOKEN_HEADER))
}
