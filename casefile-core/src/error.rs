//! Error types for CASEFILE operations

use crate::{EntityType, LocalDate};
use thiserror::Error;
use uuid::Uuid;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {entity_type:?} with id {id}")]
    NotFound { entity_type: EntityType, id: Uuid },

    #[error("Insert failed for {entity_type:?}: {reason}")]
    InsertFailed { entity_type: EntityType, reason: String },

    #[error("Update conflict for {entity_type:?} with id {id}: expected revision {expected}, found {found}")]
    UpdateConflict {
        entity_type: EntityType,
        id: Uuid,
        expected: i64,
        found: i64,
    },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Generation and upload provider errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("No generation provider configured")]
    ProviderNotConfigured,

    #[error("Request to {provider} failed with status {status}: {message}")]
    RequestFailed {
        provider: String,
        status: i32,
        message: String,
    },

    #[error("Rate limited by {provider}, retry after {retry_after_ms}ms")]
    RateLimited {
        provider: String,
        retry_after_ms: i64,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Upload of {name} failed: {reason}")]
    UploadFailed { name: String, reason: String },

    #[error("{step} timed out after {timeout_ms}ms")]
    Timeout { step: String, timeout_ms: i64 },
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Constraint violation on {constraint}: {reason}")]
    ConstraintViolation { constraint: String, reason: String },
}

/// Investigation state machine errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvestigationError {
    #[error("Daily action already taken against {subject}; allowed again on {next_allowed}")]
    CooldownActive {
        subject: String,
        next_allowed: LocalDate,
    },

    #[error("Unknown location: {location_id}")]
    UnknownLocation { location_id: String },

    #[error("Unknown suspect: {suspect}")]
    UnknownSuspect { suspect: String },
}

/// Operation registry errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OperationError {
    #[error("Unknown operation: {operation_id}")]
    UnknownOperation { operation_id: Uuid },

    #[error("Illegal operation transition: {from} -> {to}")]
    IllegalTransition { from: String, to: String },

    #[error("Operation {operation_id} is already terminal")]
    TerminalState { operation_id: Uuid },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all CASEFILE errors.
#[derive(Debug, Clone, Error)]
pub enum CasefileError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Investigation error: {0}")]
    Investigation(#[from] InvestigationError),

    #[error("Operation error: {0}")]
    Operation(#[from] OperationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for CASEFILE operations.
pub type CasefileResult<T> = Result<T, CasefileError>;

// =============================================================================
// TESTS
// =============================================================================
