//! Error types for the Cloud API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Cloud API errors.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Authorization failed: {0}")]
    Unauthorized(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CloudError {
    fn status(&self) -> StatusCode {
        match self {
            CloudError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CloudError::AuthFailed(_) => StatusCode::UNAUTHORIZED,
            CloudError::Unauthorized(_) => StatusCode::FORBIDDEN,
            CloudError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CloudError::Conflict(_) => StatusCode::CONFLICT,
            CloudError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CloudError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Internal detail stays in the logs, not the response body
        let message = match &self {
            CloudError::Database(_) | CloudError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<sqlx::Error> for CloudError {
    fn from(err: sqlx::Error) -> Self {
        CloudError::Database(err.to_string())
    }
}
