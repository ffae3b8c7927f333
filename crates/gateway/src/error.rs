//! Error types for the gateway layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Gateway error types
///
/// Rendered as `{"error": <message>}`. Operation failures carry only a fixed
/// message; the underlying cause is logged where it happens.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("permission denied")]
    PermissionDenied,

    #[error("authorization service unavailable")]
    AccessUnavailable,

    #[error("unknown user: {0}")]
    UnknownUser(String),

    #[error("user directory unavailable")]
    DirectoryUnavailable,

    #[error("{0}")]
    OperationFailed(&'static str),

    #[error("service unavailable")]
    ServiceUnavailable,
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Unauthenticated => StatusCode::UNAUTHORIZED,
            GatewayError::PermissionDenied => StatusCode::FORBIDDEN,
            GatewayError::UnknownUser(_) => StatusCode::BAD_REQUEST,
            GatewayError::OperationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::AccessUnavailable
            | GatewayError::DirectoryUnavailable
            | GatewayError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_failures_hide_their_cause() {
        let err = GatewayError::OperationFailed("failed to create chat");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "failed to create chat");
    }

    #[test]
    fn access_failures_map_to_distinct_statuses() {
        assert_eq!(
            GatewayError::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GatewayError::PermissionDenied.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            GatewayError::AccessUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            GatewayError::UnknownUser("eve".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
