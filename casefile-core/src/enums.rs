//! Enum types for CASEFILE entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// DIFFICULTY
// ============================================================================

/// Difficulty tier requested for a generated case.
///
/// Drives prompt construction (clue and suspect counts) and the estimated
/// play-duration metadata computed after generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Difficulty {
    /// Short case, few clues, obvious trail
    Rookie,
    /// Standard case
    Detective,
    /// Long case, many clues, misdirection
    Inspector,
}

impl Difficulty {
    /// Number of clues the generator is asked to produce for this tier.
    pub fn clue_target(&self) -> usize {
        match self {
            Difficulty::Rookie => 4,
            Difficulty::Detective => 6,
            Difficulty::Inspector => 8,
        }
    }

    /// Number of suspects the generator is asked to produce for this tier.
    pub fn suspect_target(&self) -> usize {
        match self {
            Difficulty::Rookie => 3,
            Difficulty::Detective => 4,
            Difficulty::Inspector => 5,
        }
    }

    /// Minutes of estimated play time per investigative lead (clue or suspect).
    pub fn minutes_per_lead(&self) -> i64 {
        match self {
            Difficulty::Rookie => 4,
            Difficulty::Detective => 6,
            Difficulty::Inspector => 9,
        }
    }

    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Difficulty::Rookie => "Rookie",
            Difficulty::Detective => "Detective",
            Difficulty::Inspector => "Inspector",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, DifficultyParseError> {
        match s.to_lowercase().as_str() {
            "rookie" => Ok(Difficulty::Rookie),
            "detective" => Ok(Difficulty::Detective),
            "inspector" => Ok(Difficulty::Inspector),
            _ => Err(DifficultyParseError(s.to_string())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for Difficulty {
    type Err = DifficultyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid difficulty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultyParseError(pub String);

impl fmt::Display for DifficultyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid difficulty: {}", self.0)
    }
}

impl std::error::Error for DifficultyParseError {}

// ============================================================================
// CASE STATUS
// ============================================================================

/// Lifecycle status of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum CaseStatus {
    /// Generation pipeline still running; case not yet retrievable
    Generating,
    /// Bundle committed, investigation open
    Active,
    /// Investigation finished by the player
    Closed,
    /// Generation failed; no bundle was persisted
    Failed,
}

impl CaseStatus {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            CaseStatus::Generating => "Generating",
            CaseStatus::Active => "Active",
            CaseStatus::Closed => "Closed",
            CaseStatus::Failed => "Failed",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, CaseStatusParseError> {
        match s.to_lowercase().as_str() {
            "generating" => Ok(CaseStatus::Generating),
            "active" => Ok(CaseStatus::Active),
            "closed" => Ok(CaseStatus::Closed),
            "failed" => Ok(CaseStatus::Failed),
            _ => Err(CaseStatusParseError(s.to_string())),
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for CaseStatus {
    type Err = CaseStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid case status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseStatusParseError(pub String);

impl fmt::Display for CaseStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid case status: {}", self.0)
    }
}

impl std::error::Error for CaseStatusParseError {}

// ============================================================================
// OPERATION STATUS
// ============================================================================

/// Polling-visible lifecycle state of a tracked asynchronous operation.
///
/// The only legal path is `Queued -> Processing -> (Completed | Failed)`.
/// Terminal states are immutable; the registry refuses to overwrite them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum OperationStatus {
    /// Accepted, not yet started
    Queued,
    /// Pipeline is running
    Processing,
    /// Finished successfully; result is available
    Completed,
    /// Finished with a fatal error
    Failed,
}

impl OperationStatus {
    /// Whether this status is terminal (no further transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationStatus::Completed | OperationStatus::Failed)
    }

    /// Whether a transition from `self` to `to` follows the legal path.
    pub fn can_transition_to(&self, to: OperationStatus) -> bool {
        use OperationStatus::*;
        matches!(
            (self, to),
            (Queued, Processing) | (Processing, Completed) | (Processing, Failed)
        )
    }

    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            OperationStatus::Queued => "Queued",
            OperationStatus::Processing => "Processing",
            OperationStatus::Completed => "Completed",
            OperationStatus::Failed => "Failed",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, OperationStatusParseError> {
        match s.to_lowercase().as_str() {
            "queued" => Ok(OperationStatus::Queued),
            "processing" => Ok(OperationStatus::Processing),
            "completed" => Ok(OperationStatus::Completed),
            "failed" => Ok(OperationStatus::Failed),
            _ => Err(OperationStatusParseError(s.to_string())),
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for OperationStatus {
    type Err = OperationStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid operation status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationStatusParseError(pub String);

impl fmt::Display for OperationStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid operation status: {}", self.0)
    }
}

impl std::error::Error for OperationStatusParseError {}

// ============================================================================
// OPERATION KIND
// ============================================================================

/// Kind of work an operation tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum OperationKind {
    /// Full case-generation pipeline run
    CaseGeneration,
}

impl OperationKind {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            OperationKind::CaseGeneration => "CaseGeneration",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

// ============================================================================
// FINDING ENUMS
// ============================================================================

/// Which investigative action produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum FindingSource {
    Interrogation,
    LocationVisit,
    ClueDiscovery,
}

impl FindingSource {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            FindingSource::Interrogation => "Interrogation",
            FindingSource::LocationVisit => "LocationVisit",
            FindingSource::ClueDiscovery => "ClueDiscovery",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, FindingSourceParseError> {
        match s {
            "Interrogation" => Ok(FindingSource::Interrogation),
            "LocationVisit" => Ok(FindingSource::LocationVisit),
            "ClueDiscovery" => Ok(FindingSource::ClueDiscovery),
            _ => Err(FindingSourceParseError(s.to_string())),
        }
    }
}

impl fmt::Display for FindingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

/// Error when parsing an invalid finding source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindingSourceParseError(pub String);

impl fmt::Display for FindingSourceParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid finding source: {}", self.0)
    }
}

impl std::error::Error for FindingSourceParseError {}

/// How much a finding should stand out to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum FindingImportance {
    Minor,
    Important,
    Critical,
}

impl FindingImportance {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            FindingImportance::Minor => "Minor",
            FindingImportance::Important => "Important",
            FindingImportance::Critical => "Critical",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, FindingImportanceParseError> {
        match s {
            "Minor" => Ok(FindingImportance::Minor),
            "Important" => Ok(FindingImportance::Important),
            "Critical" => Ok(FindingImportance::Critical),
            _ => Err(FindingImportanceParseError(s.to_string())),
        }
    }
}

impl fmt::Display for FindingImportance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

/// Error when parsing an invalid finding importance string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindingImportanceParseError(pub String);

impl fmt::Display for FindingImportanceParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid finding importance: {}", self.0)
    }
}

impl std::error::Error for FindingImportanceParseError {}

// ============================================================================
// ENTITY TYPE
// ============================================================================

/// Entity type discriminator for polymorphic references (storage errors,
/// not-found reporting).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum EntityType {
    Case,
    Operation,
    Finding,
    Progress,
    Location,
    Suspect,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_roundtrip() {
        for d in [Difficulty::Rookie, Difficulty::Detective, Difficulty::Inspector] {
            let s = d.as_db_str();
            let parsed = Difficulty::from_db_str(s).unwrap();
            assert_eq!(d, parsed);
        }
    }

    #[test]
    fn test_difficulty_parse_case_insensitive() {
        assert_eq!(Difficulty::from_db_str("rookie"), Ok(Difficulty::Rookie));
        assert_eq!("INSPECTOR".parse::<Difficulty>(), Ok(Difficulty::Inspector));
        assert!(Difficulty::from_db_str("impossible").is_err());
    }

    #[test]
    fn test_difficulty_targets_scale() {
        assert!(Difficulty::Rookie.clue_target() < Difficulty::Inspector.clue_target());
        assert!(Difficulty::Rookie.suspect_target() < Difficulty::Inspector.suspect_target());
        assert!(Difficulty::Rookie.minutes_per_lead() < Difficulty::Inspector.minutes_per_lead());
    }

    #[test]
    fn test_case_status_roundtrip() {
        for s in [
            CaseStatus::Generating,
            CaseStatus::Active,
            CaseStatus::Closed,
            CaseStatus::Failed,
        ] {
            assert_eq!(CaseStatus::from_db_str(s.as_db_str()), Ok(s));
        }
    }

    #[test]
    fn test_operation_status_terminal() {
        assert!(!OperationStatus::Queued.is_terminal());
        assert!(!OperationStatus::Processing.is_terminal());
        assert!(OperationStatus::Completed.is_terminal());
        assert!(OperationStatus::Failed.is_terminal());
    }

    #[test]
    fn test_operation_status_legal_transitions() {
        use OperationStatus::*;
        assert!(Queued.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));

        // Everything else is illegal
        assert!(!Queued.can_transition_to(Completed));
        assert!(!Queued.can_transition_to(Failed));
        assert!(!Completed.can_transition_to(Processing));
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Completed));
        assert!(!Processing.can_transition_to(Queued));
    }

    #[test]
    fn test_finding_source_roundtrip() {
        for s in [
            FindingSource::Interrogation,
            FindingSource::LocationVisit,
            FindingSource::ClueDiscovery,
        ] {
            assert_eq!(FindingSource::from_db_str(s.as_db_str()), Ok(s));
        }
    }

    #[test]
    fn test_finding_importance_ordering() {
        assert!(FindingImportance::Minor < FindingImportance::Important);
        assert!(FindingImportance::Important < FindingImportance::Critical);
    }
}
