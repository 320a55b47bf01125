//! Core entity structures

use crate::{
    // ID types
    CaseId, FindingId, LocalDate, OperationId, OwnerId,
    // Other types
    CaseStatus, ContentHash, Difficulty, FindingImportance, FindingSource, OperationKind,
    OperationStatus, Timestamp,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

// ============================================================================
// GENERATED CONTENT
// ============================================================================

/// Durable reference to an uploaded binary asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ImageRef {
    /// Public URL of the uploaded image
    pub url: String,
    /// Upload-service identifier, used for deletion/reclamation
    pub asset_id: String,
}

/// One extractable clue, tied back to the narrative's trigger annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Clue {
    /// Generator-assigned identifier, unique within the case
    pub id: String,
    pub title: String,
    pub text: String,
    /// Location the clue points at, if any
    pub related_location: Option<String>,
    /// Suspect the clue points at, if any
    pub related_suspect: Option<String>,
}

/// The full clue set extracted from the enhanced narrative.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ClueSet {
    pub clues: Vec<Clue>,
}

impl ClueSet {
    pub fn len(&self) -> usize {
        self.clues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clues.is_empty()
    }
}

/// A visitable location on the case map.
///
/// `image` is optional by contract: a failed image generation leaves the
/// location imageless, which is a valid, recoverable state rather than an
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Location {
    /// Generator-assigned identifier, unique within the map
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub image: Option<ImageRef>,
}

/// A suspect the player can interrogate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Suspect {
    /// Suspect name; the interrogation gate keys on this
    pub name: String,
    pub description: String,
    pub alibi: String,
}

/// Map topology: locations plus the suspects that inhabit them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CaseMap {
    pub locations: Vec<Location>,
    pub suspects: Vec<Suspect>,
}

impl CaseMap {
    /// Look up a location by id.
    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    /// Look up a suspect by name.
    pub fn suspect(&self, name: &str) -> Option<&Suspect> {
        self.suspects.iter().find(|s| s.name == name)
    }
}

/// The immutable artifact bundle produced by one successful pipeline run.
///
/// Never mutated after the durable commit; a case's content changes only by
/// generating a whole new case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CaseBundle {
    /// Base narrative
    pub story: String,
    /// Narrative with clue-trigger annotations woven in
    pub enhanced_story: String,
    /// Player-facing introduction
    pub intro: String,
    pub clue_set: ClueSet,
    pub map: CaseMap,
    /// Rendered map image; absent when upload failed (non-fatal)
    pub map_image: Option<ImageRef>,
    /// SHA-256 over story + enhanced story, for dedup/integrity
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "byte"))]
    pub content_hash: ContentHash,
}

/// Derived metadata computed after generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CaseMetadata {
    pub estimated_duration_minutes: i64,
    pub tags: Vec<String>,
}

/// A generated mystery case plus its lifecycle bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Case {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub case_id: CaseId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub owner_id: OwnerId,
    pub difficulty: Difficulty,
    pub status: CaseStatus,
    pub bundle: CaseBundle,
    pub metadata: CaseMetadata,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

// ============================================================================
// OPERATIONS
// ============================================================================

/// A tracked asynchronous job with a polling-visible lifecycle.
///
/// Owned by the registry; mutated only by the pipeline run that registered
/// it. Terminal states are immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Operation {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub operation_id: OperationId,
    pub kind: OperationKind,
    pub status: OperationStatus,
    pub progress_percent: u8,
    pub status_message: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub started_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub completed_at: Option<Timestamp>,
    /// Payload-agnostic result; the case pipeline stores `{"case_id": ...}`
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    /// Non-fatal degradations recorded while the job ran
    pub warnings: Vec<String>,
}

impl Operation {
    /// Create a freshly queued operation.
    pub fn queued(operation_id: OperationId, kind: OperationKind, now: Timestamp) -> Self {
        Self {
            operation_id,
            kind,
            status: OperationStatus::Queued,
            progress_percent: 0,
            status_message: "Queued".to_string(),
            started_at: now,
            completed_at: None,
            result: None,
            error: None,
            warnings: Vec::new(),
        }
    }
}

// ============================================================================
// INVESTIGATION STATE
// ============================================================================

/// Record of the most recent visit to a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VisitRecord {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub visited_at: Timestamp,
    /// Calendar date of the visit in case-local time; the daily gate keys on this
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date"))]
    pub last_visit_date: LocalDate,
}

/// Record of interrogations of one suspect, accumulated across days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct InterrogationRecord {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub interrogated_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date"))]
    pub last_interrogation_date: LocalDate,
    pub questions_asked: Vec<String>,
    pub responses: Vec<String>,
}

/// Per-case mutable investigation state.
///
/// `revision` is an optimistic-concurrency counter: every mutation bumps it,
/// and the store rejects writes whose revision is not exactly one ahead of
/// the stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct InvestigationProgress {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub case_id: CaseId,
    pub visited_locations: HashMap<String, VisitRecord>,
    pub interrogated_suspects: HashMap<String, InterrogationRecord>,
    /// Grow-only; entries are never removed while the case is active
    pub discovered_clues: BTreeSet<String>,
    /// Whole case-local days elapsed since the case started
    pub current_day: i64,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub started_at: Timestamp,
    pub revision: i64,
}

impl InvestigationProgress {
    /// Fresh progress record for a newly committed case.
    pub fn new(case_id: CaseId, started_at: Timestamp) -> Self {
        Self {
            case_id,
            visited_locations: HashMap::new(),
            interrogated_suspects: HashMap::new(),
            discovered_clues: BTreeSet::new(),
            current_day: 0,
            started_at,
            revision: 0,
        }
    }
}

// ============================================================================
// FINDINGS
// ============================================================================

/// An append-only investigative fact surfaced to the player.
///
/// Never updated in place; components that produce insight append new
/// findings instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Finding {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub finding_id: FindingId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub case_id: CaseId,
    pub source: FindingSource,
    /// Which location/suspect/clue produced this
    pub source_details: String,
    pub text: String,
    pub importance: FindingImportance,
    /// Cleared once the player has seen the finding
    pub is_new: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::new_entity_id;
    use chrono::Utc;

    fn sample_map() -> CaseMap {
        CaseMap {
            locations: vec![
                Location {
                    id: "harbor-warehouse".to_string(),
                    display_name: "Harbor Warehouse".to_string(),
                    description: "Rows of crates, one pried open.".to_string(),
                    image: None,
                },
                Location {
                    id: "observatory".to_string(),
                    display_name: "Old Observatory".to_string(),
                    description: "Dust everywhere except the telescope.".to_string(),
                    image: Some(ImageRef {
                        url: "https://blobs.example/observatory.png".to_string(),
                        asset_id: "obs-1".to_string(),
                    }),
                },
            ],
            suspects: vec![Suspect {
                name: "Vera Kline".to_string(),
                description: "The night watchman's cousin.".to_string(),
                alibi: "Claims she was at the docks.".to_string(),
            }],
        }
    }

    #[test]
    fn test_case_map_lookup() {
        let map = sample_map();
        assert!(map.location("observatory").is_some());
        assert!(map.location("nowhere").is_none());
        assert!(map.suspect("Vera Kline").is_some());
        assert!(map.suspect("Nobody").is_none());
    }

    #[test]
    fn test_location_image_is_explicit_option() {
        let map = sample_map();
        assert!(map.location("harbor-warehouse").unwrap().image.is_none());
        assert!(map.location("observatory").unwrap().image.is_some());
    }

    #[test]
    fn test_operation_queued_defaults() {
        let now = Utc::now();
        let op = Operation::queued(new_entity_id(), OperationKind::CaseGeneration, now);
        assert_eq!(op.status, OperationStatus::Queued);
        assert_eq!(op.progress_percent, 0);
        assert!(op.completed_at.is_none());
        assert!(op.result.is_none());
        assert!(op.error.is_none());
        assert!(op.warnings.is_empty());
    }

    #[test]
    fn test_progress_new_is_empty() {
        let progress = InvestigationProgress::new(new_entity_id(), Utc::now());
        assert!(progress.visited_locations.is_empty());
        assert!(progress.interrogated_suspects.is_empty());
        assert!(progress.discovered_clues.is_empty());
        assert_eq!(progress.current_day, 0);
        assert_eq!(progress.revision, 0);
    }

    #[test]
    fn test_progress_serde_roundtrip() -> Result<(), serde_json::Error> {
        let mut progress = InvestigationProgress::new(new_entity_id(), Utc::now());
        progress.discovered_clues.insert("clue-7".to_string());
        let json = serde_json::to_string(&progress)?;
        let back: InvestigationProgress = serde_json::from_str(&json)?;
        assert_eq!(back, progress);
        Ok(())
    }
}
