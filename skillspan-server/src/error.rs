//! HTTP mapping of sandbox errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use skillspan_sandbox::{SandboxError, ValidationError};

/// Error returned by route handlers
#[derive(Debug)]
pub struct ApiError(pub SandboxError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            SandboxError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SandboxError> for ApiError {
    fn from(err: SandboxError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Execution service failure");
        }

        (
            status,
            Json(serde_json::json!({
                "success": false,
                "error": self.0.to_string(),
            })),
        )
            .into_response()
    }
}
