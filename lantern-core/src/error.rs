//! Error types for lantern operations

use crate::ItemId;
use thiserror::Error;

/// Something that was asked for does not exist.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("Item not found: {id}")]
    Item { id: ItemId },

    #[error("City not found: {query}")]
    City { query: String },

    #[error("Resource not found at {endpoint}")]
    Resource { endpoint: String },
}

/// Network or HTTP level failures talking to a collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request to {endpoint} failed: {reason}")]
    RequestFailed { endpoint: String, reason: String },

    #[error("Request to {endpoint} failed with status {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Failed to decode response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("Request to {endpoint} timed out")]
    Timeout { endpoint: String },
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Malformed {payload} payload: {reason}")]
    MalformedPayload { payload: String, reason: String },
}

/// Failures of the query machinery itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Query cache lock poisoned")]
    LockPoisoned,

    #[error("Fetch task for {key} aborted: {reason}")]
    TaskAborted { key: String, reason: String },

    #[error("Prerequisite {name} has not resolved")]
    PrerequisiteMissing { name: String },
}

/// Persistence layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Read failed for {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("Write failed for {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Master error type for all lantern errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LanternError {
    #[error("Not found: {0}")]
    NotFound(#[from] NotFoundError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl LanternError {
    /// Returns true for errors that mean "nothing there" rather than "could not ask".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias for lantern operations.
pub type LanternResult<T> = Result<T, LanternError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display_item() {
        let err = NotFoundError::Item { id: ItemId::new(42) };
        let msg = format!("{}", err);
        assert!(msg.contains("Item not found"));
        assert!(msg.contains("42"));
    }

    #[test]
    fn test_transport_error_display_status() {
        let err = TransportError::Status {
            endpoint: "/v0/item/1.json".to_string(),
            status: 503,
            message: "unavailable".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("503"));
        assert!(msg.contains("/v0/item/1.json"));
        assert!(msg.contains("unavailable"));
    }

    #[test]
    fn test_validation_error_display_malformed() {
        let err = ValidationError::MalformedPayload {
            payload: "item".to_string(),
            reason: "missing title".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Malformed item payload"));
        assert!(msg.contains("missing title"));
    }

    #[test]
    fn test_lantern_error_from_variants() {
        let not_found = LanternError::from(NotFoundError::City {
            query: "Atlantis".to_string(),
        });
        assert!(matches!(not_found, LanternError::NotFound(_)));
        assert!(not_found.is_not_found());

        let transport = LanternError::from(TransportError::Timeout {
            endpoint: "geo".to_string(),
        });
        assert!(matches!(transport, LanternError::Transport(_)));
        assert!(!transport.is_not_found());

        let validation = LanternError::from(ValidationError::RequiredFieldMissing {
            field: "lat".to_string(),
        });
        assert!(matches!(validation, LanternError::Validation(_)));

        let query = LanternError::from(QueryError::LockPoisoned);
        assert!(matches!(query, LanternError::Query(_)));

        let storage = LanternError::from(StorageError::LockPoisoned);
        assert!(matches!(storage, LanternError::Storage(_)));
    }

    #[test]
    fn test_errors_clone_equal() {
        let err = LanternError::from(TransportError::RequestFailed {
            endpoint: "topstories".to_string(),
            reason: "connection reset".to_string(),
        });
        assert_eq!(err.clone(), err);
    }
}
