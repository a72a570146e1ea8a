//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Request failed field-shape validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Domain rule violated
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Optimistic-concurrency version mismatch; the row was modified
    /// concurrently and the caller must re-read and reconcile
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    /// The store schema is not available yet (cold-start race with
    /// migration); callers may retry on their next tick
    #[error("Store not ready: {0}")]
    StoreNotReady(String),

    /// External service (store, broker) unreachable or failing
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable on a later attempt
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ExternalService(_) | Self::StoreNotReady(_))
    }

    /// Create a not found error for an entity
    pub fn not_found(entity_type: impl Into<String>, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} {}", entity_type.into(), id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_ready_is_retryable() {
        assert!(ApplicationError::StoreNotReady("no such table".to_string()).is_retryable());
    }

    #[test]
    fn external_service_is_retryable() {
        assert!(ApplicationError::ExternalService("timeout".to_string()).is_retryable());
    }

    #[test]
    fn conflict_is_not_retryable() {
        assert!(!ApplicationError::ConcurrencyConflict("task".to_string()).is_retryable());
    }

    #[test]
    fn not_found_helper_formats_entity_and_id() {
        let err = ApplicationError::not_found("Task", "abc");
        assert_eq!(err.to_string(), "Not found: Task abc");
    }

    #[test]
    fn domain_error_converts() {
        let err: ApplicationError = DomainError::InvalidEmailAddress("x".to_string()).into();
        assert!(matches!(err, ApplicationError::Domain(_)));
    }
}
