//! API Error Types
//!
//! Every handler returns `ApiResult<T>`. Failures are serialized as a JSON
//! `{ "code": ..., "message": ... }` body with the status code that matches
//! the error code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lantern_core::{LanternError, TransportError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request body was understood but a value is not acceptable
    ValidationFailed,

    /// Request could not be interpreted
    InvalidInput,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    EntityNotFound,

    // ========================================================================
    // Server Errors (5xx)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Counter storage could not be read or written
    StorageFailed,

    /// A downstream collaborator is unreachable
    ServiceUnavailable,

    /// Operation timed out
    Timeout,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationFailed | ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorCode::EntityNotFound => StatusCode::NOT_FOUND,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorCode::InternalError | ErrorCode::StorageFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::EntityNotFound => "Entity not found",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::StorageFailed => "Counter storage failed",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
            ErrorCode::Timeout => "Operation timed out",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self)).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM DOMAIN ERRORS
// ============================================================================

impl From<LanternError> for ApiError {
    fn from(err: LanternError) -> Self {
        match err {
            LanternError::Validation(e) => ApiError::validation_failed(e.to_string()),
            LanternError::NotFound(e) => ApiError::new(ErrorCode::EntityNotFound, e.to_string()),
            LanternError::Storage(e) => {
                tracing::error!(error = %e, "counter storage error");
                ApiError::from_code(ErrorCode::StorageFailed)
            }
            LanternError::Transport(TransportError::Timeout { endpoint }) => {
                ApiError::new(ErrorCode::Timeout, format!("{} timed out", endpoint))
            }
            LanternError::Transport(e) => {
                ApiError::new(ErrorCode::ServiceUnavailable, e.to_string())
            }
            LanternError::Query(e) => {
                tracing::error!(error = %e, "query machinery error");
                ApiError::from_code(ErrorCode::InternalError)
            }
        }
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_core::{StorageError, ValidationError};

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::ValidationFailed.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::EntityNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::StorageFailed.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorCode::Timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = ApiError::from(LanternError::from(ValidationError::InvalidValue {
            field: "step".to_string(),
            reason: "must be >= 1".to_string(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(err.message.contains("step"));
    }

    #[test]
    fn test_storage_error_hides_path() {
        let err = ApiError::from(LanternError::from(StorageError::WriteFailed {
            path: "/srv/counter/count.txt".to_string(),
            reason: "read-only file system".to_string(),
        }));
        assert_eq!(err.code, ErrorCode::StorageFailed);
        assert!(!err.message.contains("/srv"));
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::validation_failed("bad step");
        let json = serde_json::to_string(&err)?;

        assert!(json.contains("VALIDATION_FAILED"));
        assert!(json.contains("bad step"));

        let deserialized: ApiError = serde_json::from_str(&json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::internal_error("boom");
        assert_eq!(err.to_string(), "InternalError: boom");
    }
}
