//! Error Types for CASEFILE API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.
//! Polling clients always receive a well-formed error object, never a raw
//! panic or stack trace.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use casefile_core::{CasefileError, InvestigationError, OperationError, StorageError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code and represents
/// a category of error that can occur during API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Request contains invalid input data
    InvalidInput,

    /// Required field is missing from request
    MissingField,

    /// Field value is out of valid range
    InvalidRange,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested entity does not exist
    EntityNotFound,

    /// Requested case does not exist
    CaseNotFound,

    /// Requested operation does not exist (never issued, or evicted)
    OperationNotFound,

    /// Requested location does not exist on the case map
    LocationNotFound,

    /// Requested suspect does not exist on the case map
    SuspectNotFound,

    // ========================================================================
    // Cooldown / Conflict Errors (429, 409)
    // ========================================================================
    /// Daily action gate has not reopened yet; retry after the local date
    /// rolls over
    CooldownActive,

    /// Concurrent modification detected (optimistic locking failure)
    ConcurrentModification,

    /// Operation conflicts with current state
    StateConflict,

    // ========================================================================
    // Server Errors (500, 502, 503)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Durable store operation failed
    StorageFailed,

    /// Upstream generation service failed
    GenerationFailed,

    /// Service is temporarily unavailable
    ServiceUnavailable,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Validation errors
            ErrorCode::ValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::MissingField
            | ErrorCode::InvalidRange => StatusCode::BAD_REQUEST,

            // Not found errors
            ErrorCode::EntityNotFound
            | ErrorCode::CaseNotFound
            | ErrorCode::OperationNotFound
            | ErrorCode::LocationNotFound
            | ErrorCode::SuspectNotFound => StatusCode::NOT_FOUND,

            // Cooldown: retry later, not a system fault
            ErrorCode::CooldownActive => StatusCode::TOO_MANY_REQUESTS,

            // Conflict errors
            ErrorCode::ConcurrentModification | ErrorCode::StateConflict => StatusCode::CONFLICT,

            // Server errors
            ErrorCode::GenerationFailed => StatusCode::BAD_GATEWAY,

            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::InternalError | ErrorCode::StorageFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            // Validation
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::InvalidRange => "Value is out of valid range",

            // Not Found
            ErrorCode::EntityNotFound => "Entity not found",
            ErrorCode::CaseNotFound => "Case not found",
            ErrorCode::OperationNotFound => "Operation not found",
            ErrorCode::LocationNotFound => "Location not found",
            ErrorCode::SuspectNotFound => "Suspect not found",

            // Cooldown / Conflict
            ErrorCode::CooldownActive => "Action already taken today",
            ErrorCode::ConcurrentModification => "Concurrent modification detected",
            ErrorCode::StateConflict => "Operation conflicts with current state",

            // Server
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::StorageFailed => "Storage operation failed",
            ErrorCode::GenerationFailed => "Upstream generation service failed",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
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

/// Structured error response for API operations.
///
/// This type is returned by all API endpoints when an error occurs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (field errors, retry hints, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    /// Create a ValidationFailed error.
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create a MissingField error.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    /// Create an InvalidRange error.
    pub fn invalid_range(field: &str, min: impl fmt::Display, max: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidRange,
            format!("Field '{}' must be between {} and {}", field, min, max),
        )
    }

    /// Create a CaseNotFound error.
    pub fn case_not_found(case_id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::CaseNotFound, format!("Case {} not found", case_id))
    }

    /// Create an OperationNotFound error.
    pub fn operation_not_found(operation_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::OperationNotFound,
            format!("Operation {} not found", operation_id),
        )
    }

    /// Create a LocationNotFound error.
    pub fn location_not_found(location_id: &str) -> Self {
        Self::new(
            ErrorCode::LocationNotFound,
            format!("Location '{}' not found on the case map", location_id),
        )
    }

    /// Create a SuspectNotFound error.
    pub fn suspect_not_found(suspect: &str) -> Self {
        Self::new(
            ErrorCode::SuspectNotFound,
            format!("Suspect '{}' not found on the case map", suspect),
        )
    }

    /// Create a CooldownActive error naming when the gate reopens.
    pub fn cooldown_active(subject: &str, next_allowed: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::CooldownActive,
            format!(
                "Already acted on '{}' today; allowed again on {}",
                subject, next_allowed
            ),
        )
    }

    /// Create a ConcurrentModification error.
    pub fn concurrent_modification(entity_type: &str, id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ConcurrentModification,
            format!("{} {} was modified by another request", entity_type, id),
        )
    }

    /// Create a StateConflict error.
    pub fn state_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StateConflict, message)
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a StorageFailed error.
    pub fn storage_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageFailed, message)
    }

    /// Create a GenerationFailed error.
    pub fn generation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::GenerationFailed, message)
    }

    /// Create a ServiceUnavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
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

/// Implement IntoResponse for ApiError to enable automatic error handling in
/// Axum handlers:
/// ```ignore
/// async fn handler() -> Result<Json<Response>, ApiError> {
///     Err(ApiError::case_not_found(case_id))
/// }
/// ```
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM CORE ERRORS
// ============================================================================

/// Map the core error taxonomy onto response-classification codes.
impl From<CasefileError> for ApiError {
    fn from(err: CasefileError) -> Self {
        match err {
            CasefileError::Validation(e) => ApiError::validation_failed(e.to_string()),

            CasefileError::Investigation(e) => match e {
                InvestigationError::CooldownActive {
                    ref subject,
                    next_allowed,
                } => ApiError::cooldown_active(subject, next_allowed),
                InvestigationError::UnknownLocation { ref location_id } => {
                    ApiError::location_not_found(location_id)
                }
                InvestigationError::UnknownSuspect { ref suspect } => {
                    ApiError::suspect_not_found(suspect)
                }
            },

            CasefileError::Storage(e) => match e {
                StorageError::NotFound { id, .. } => ApiError::new(
                    ErrorCode::EntityNotFound,
                    format!("Entity {} not found", id),
                ),
                StorageError::UpdateConflict { id, .. } => {
                    ApiError::concurrent_modification("Progress", id)
                }
                other => {
                    tracing::error!(error = %other, "Storage error");
                    ApiError::storage_failed("Storage operation failed")
                }
            },

            CasefileError::Operation(e) => match e {
                OperationError::UnknownOperation { operation_id } => {
                    ApiError::operation_not_found(operation_id)
                }
                other => ApiError::state_conflict(other.to_string()),
            },

            CasefileError::Generation(e) => {
                tracing::error!(error = %e, "Generation error");
                ApiError::generation_failed(e.to_string())
            }

            CasefileError::Config(e) => {
                tracing::error!(error = %e, "Config error");
                ApiError::internal_error("Service misconfigured")
            }
        }
    }
}

/// Convert from serde_json::Error to ApiError.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {:?}", err);
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

/// Convert from uuid::Error to ApiError.
impl From<uuid::Error> for ApiError {
    fn from(err: uuid::Error) -> Self {
        ApiError::invalid_input(format!("Invalid UUID: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
