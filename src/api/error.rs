//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::convert::ConvertError;
use crate::db::DatabaseError;
use crate::findings::FindingsError;
use crate::storage::StorageError;
use crate::uploads::UploadError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Invalid credentials")]
    Unauthorized,
    #[error("Not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    #[error("Dependency failure: {0}")]
    Dependency(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Validation(detail) => {
                (StatusCode::BAD_REQUEST, "VALIDATION", detail.clone())
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid credentials".to_string(),
            ),
            ApiError::NotFound { entity_type, id } => {
                // The reconciler's missing-inspection failure stays
                // distinguishable from other 404s by its code.
                let code = if entity_type == "Inspection" {
                    "INSPECTION_NOT_FOUND"
                } else {
                    "NOT_FOUND"
                };
                (
                    StatusCode::NOT_FOUND,
                    code,
                    format!("{entity_type} {id} not found"),
                )
            }
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "CONFLICT", detail.clone()),
            ApiError::MalformedPayload(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "MALFORMED_PAYLOAD",
                detail.clone(),
            ),
            ApiError::Dependency(detail) => {
                tracing::error!(detail, "External dependency failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DEPENDENCY",
                    "An external dependency failed".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            success: false,
            code,
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => ApiError::NotFound { entity_type, id },
            DatabaseError::Duplicate(what) => ApiError::Conflict(format!("{what} already exists")),
            DatabaseError::MissingReference(what) => {
                ApiError::Validation(format!("{what} does not exist"))
            }
            DatabaseError::InvalidEnum { field, value } => {
                ApiError::Validation(format!("invalid value '{value}' for {field}"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<FindingsError> for ApiError {
    fn from(err: FindingsError) -> Self {
        ApiError::MalformedPayload(err.to_string())
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Io(e) => ApiError::Internal(e.to_string()),
            other => ApiError::Validation(other.to_string()),
        }
    }
}

impl From<ConvertError> for ApiError {
    fn from(err: ConvertError) -> Self {
        ApiError::Dependency(err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Dependency(err.to_string())
    }
}
