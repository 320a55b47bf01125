//! CASEFILE Core - Entity Types
//!
//! Data structures shared by every other crate: identity aliases, enums,
//! entities, the error taxonomy, and the daily action gate that governs
//! investigation progress. Pipeline orchestration, providers, storage, and
//! the HTTP surface live in their own crates.

pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;
pub mod investigation;

pub use entities::{
    Case, CaseBundle, CaseMap, CaseMetadata, Clue, ClueSet, Finding, ImageRef,
    InterrogationRecord, InvestigationProgress, Location, Operation, Suspect, VisitRecord,
};
pub use enums::{
    CaseStatus, CaseStatusParseError, Difficulty, DifficultyParseError, EntityType,
    FindingImportance, FindingImportanceParseError, FindingSource, FindingSourceParseError,
    OperationKind, OperationStatus, OperationStatusParseError,
};
pub use error::{
    CasefileError, CasefileResult, ConfigError, GenerationError, InvestigationError,
    OperationError, StorageError, ValidationError,
};
pub use identity::{
    compute_content_hash, new_entity_id, CaseId, ContentHash, EntityId, FindingId, LocalDate,
    OperationId, OwnerId, RawContent, Timestamp,
};
pub use investigation::{
    can_interrogate, can_visit, case_time_zone, discover_clue, elapsed_days, local_date,
    next_allowed_date, record_interrogation, record_visit, CASE_UTC_OFFSET_SECS,
};
