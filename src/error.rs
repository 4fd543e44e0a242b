// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::services::RegistryError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    ValidationError(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error; `details` carries the driver message when exposed
    InternalServerError {
        message: String,
        details: Option<String>,
    },
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::ValidationError(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError { message, .. } => message,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        });

        if let ApiError::InternalServerError { details: Some(details), .. } = self {
            response["details"] = json!(details);
        }

        response
    }

    /// Map a registry failure. `context` names the failed action for 5xx
    /// messages ("Failed to add trade registration"); driver text is only
    /// attached when `expose_details` is set.
    pub fn from_registry(err: RegistryError, context: &str, expose_details: bool) -> Self {
        match err {
            RegistryError::Validation(msg) => ApiError::ValidationError(msg),
            RegistryError::NotFound(msg) => ApiError::NotFound(msg),
            RegistryError::Storage(store_err) => {
                if store_err.is_connection() {
                    tracing::error!("{}: database unreachable: {}", context, store_err.detail());
                } else {
                    tracing::error!("{}: {}", context, store_err);
                }
                let details = expose_details.then(|| store_err.detail().to_string());
                ApiError::InternalServerError {
                    message: context.to_string(),
                    details,
                }
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
