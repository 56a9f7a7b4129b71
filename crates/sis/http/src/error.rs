//! Uniform error envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use sis_core::Error;

/// Wraps the domain error for axum. Every failure becomes
/// `{"error": "<kind>"}` with the matching status code.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::MissingCredentials
            | Error::InvalidCredentials
            | Error::InvalidOneTimeCode
            | Error::InvalidToken
            | Error::InvalidDeviceCredentials => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::DeviceNotFound(_) | Error::FileNotFound(_) => StatusCode::NOT_FOUND,
            Error::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Error::AlreadyInitialized => StatusCode::CONFLICT,
            Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "internal error");
        }

        let body = serde_json::json!({ "error": self.0.kind() });
        (status, Json(body)).into_response()
    }
}
