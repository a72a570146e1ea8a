//! API error handling
//!
//! Every error response carries the structured body
//! `{ error: { code, message, details?, correlationId } }`; internals are
//! never disclosed to clients.

use application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Machine-readable error codes of the API contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Field-shape or missing-input error
    ValidationError,
    /// Target entity does not exist
    NotFound,
    /// Optimistic-write mismatch; re-read and reconcile
    ConcurrencyConflict,
    /// Domain rule violated
    InvalidOperation,
    /// Undisclosed internal failure
    InternalError,
}

impl ErrorCode {
    /// Wire form of the code
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::ConcurrencyConflict => "CONCURRENCY_CONFLICT",
            Self::InvalidOperation => "INVALID_OPERATION",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// HTTP status this code maps to
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::ValidationError | Self::InvalidOperation => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::ConcurrencyConflict => StatusCode::CONFLICT,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// One field-level validation failure
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    /// Offending field
    pub field: String,
    /// What is wrong with it
    pub message: String,
}

/// API error carrying everything the error body needs
#[derive(Debug, Error)]
#[error("{code:?}: {message}")]
pub struct ApiError {
    /// Machine-readable code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Field-level details for validation errors
    pub details: Option<Vec<FieldError>>,
    /// Correlation id echoed from the request
    pub correlation_id: Option<Uuid>,
}

impl ApiError {
    /// Build from an application error, attaching the correlation id
    #[must_use]
    pub fn from_app(err: ApplicationError, correlation_id: Option<Uuid>) -> Self {
        let (code, message) = match err {
            ApplicationError::Domain(e) => (ErrorCode::ValidationError, e.to_string()),
            ApplicationError::Validation(msg) => (ErrorCode::ValidationError, msg),
            ApplicationError::NotFound(msg) => (ErrorCode::NotFound, msg),
            ApplicationError::InvalidOperation(msg) => (ErrorCode::InvalidOperation, msg),
            ApplicationError::ConcurrencyConflict(msg) => (ErrorCode::ConcurrencyConflict, msg),
            ApplicationError::StoreNotReady(_)
            | ApplicationError::ExternalService(_)
            | ApplicationError::Configuration(_)
            | ApplicationError::Internal(_) => (
                ErrorCode::InternalError,
                "An internal error occurred".to_string(),
            ),
        };

        Self {
            code,
            message,
            details: None,
            correlation_id,
        }
    }

    /// A validation error with field details
    #[must_use]
    pub fn validation(
        message: impl Into<String>,
        details: Vec<FieldError>,
        correlation_id: Option<Uuid>,
    ) -> Self {
        Self {
            code: ErrorCode::ValidationError,
            message: message.into(),
            details: Some(details),
            correlation_id,
        }
    }

    /// A not-found error for an entity
    #[must_use]
    pub fn not_found(entity: &str, id: impl std::fmt::Display, correlation_id: Option<Uuid>) -> Self {
        Self {
            code: ErrorCode::NotFound,
            message: format!("{entity} {id} not found"),
            details: None,
            correlation_id,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<FieldError>>,
    correlation_id: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.as_str(),
                message: self.message,
                details: self.details,
                correlation_id: self
                    .correlation_id
                    .map_or_else(String::new, |id| id.to_string()),
            },
        };

        (self.code.status(), Json(body)).into_response()
    }
}
