//! CASEFILE Storage - Durable-store trait and in-memory implementation
//!
//! The rest of the system treats persistence as an opaque document store
//! with the operations below. [`MemoryStore`] is the in-process
//! implementation used for development and testing; a database-backed
//! implementation slots in behind the same trait.

use async_trait::async_trait;
use casefile_core::{
    Case, CaseId, CaseStatus, CasefileResult, EntityType, Finding, FindingId,
    InvestigationProgress, OwnerId, StorageError,
};
use std::collections::HashMap;
use std::sync::RwLock;

// ============================================================================
// STORE TRAIT
// ============================================================================

/// Async store for cases, findings, and investigation progress.
///
/// Implementations must be thread-safe. `case_insert` is the pipeline's
/// single durable commit point: it must be all-or-nothing, and it seeds the
/// case's empty progress record in the same write so a committed case is
/// always investigable.
#[async_trait]
pub trait CaseStore: Send + Sync {
    // ========================================================================
    // CASE OPERATIONS
    // ========================================================================

    /// Insert a new case with its seeded progress record.
    async fn case_insert(&self, case: &Case) -> CasefileResult<()>;

    /// Get a case by ID.
    async fn case_get(&self, id: CaseId) -> CasefileResult<Option<Case>>;

    /// List cases owned by `owner_id`, optionally filtered by status.
    async fn case_list_by_owner(
        &self,
        owner_id: OwnerId,
        status: Option<CaseStatus>,
    ) -> CasefileResult<Vec<Case>>;

    // ========================================================================
    // FINDING OPERATIONS
    // ========================================================================

    /// Append a finding to its case. Findings are append-only.
    async fn finding_append(&self, finding: &Finding) -> CasefileResult<FindingId>;

    /// List a case's findings in insertion order.
    async fn finding_list(&self, case_id: CaseId) -> CasefileResult<Vec<Finding>>;

    // ========================================================================
    // PROGRESS OPERATIONS
    // ========================================================================

    /// Get a case's investigation progress.
    async fn progress_get(&self, case_id: CaseId) -> CasefileResult<Option<InvestigationProgress>>;

    /// Write a mutated progress record, compare-and-set on `revision`.
    ///
    /// The incoming record must carry a revision exactly one ahead of the
    /// stored one; otherwise `StorageError::UpdateConflict` is returned and
    /// nothing is written. Callers re-run their read-check-write cycle on
    /// conflict, which keeps gate checks atomic with their mutation.
    async fn progress_update(&self, progress: &InvestigationProgress) -> CasefileResult<()>;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// In-memory store keyed by case id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    cases: RwLock<HashMap<CaseId, Case>>,
    progress: RwLock<HashMap<CaseId, InvestigationProgress>>,
    findings: RwLock<HashMap<CaseId, Vec<Finding>>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        if let Ok(mut cases) = self.cases.write() {
            cases.clear();
        }
        if let Ok(mut progress) = self.progress.write() {
            progress.clear();
        }
        if let Ok(mut findings) = self.findings.write() {
            findings.clear();
        }
    }

    /// Get count of stored cases.
    pub fn case_count(&self) -> usize {
        self.cases.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Get count of stored findings across all cases.
    pub fn finding_count(&self) -> usize {
        self.findings
            .read()
            .map(|f| f.values().map(Vec::len).sum())
            .unwrap_or(0)
    }
}

fn poisoned() -> casefile_core::CasefileError {
    StorageError::LockPoisoned.into()
}

#[async_trait]
impl CaseStore for MemoryStore {
    // === Case Operations ===

    async fn case_insert(&self, case: &Case) -> CasefileResult<()> {
        // Take both locks up front so the case and its progress commit together.
        let mut cases = self.cases.write().map_err(|_| poisoned())?;
        let mut progress = self.progress.write().map_err(|_| poisoned())?;

        if cases.contains_key(&case.case_id) {
            return Err(StorageError::InsertFailed {
                entity_type: EntityType::Case,
                reason: "already exists".to_string(),
            }
            .into());
        }

        cases.insert(case.case_id, case.clone());
        progress.insert(
            case.case_id,
            InvestigationProgress::new(case.case_id, case.created_at),
        );
        Ok(())
    }

    async fn case_get(&self, id: CaseId) -> CasefileResult<Option<Case>> {
        let cases = self.cases.read().map_err(|_| poisoned())?;
        Ok(cases.get(&id).cloned())
    }

    async fn case_list_by_owner(
        &self,
        owner_id: OwnerId,
        status: Option<CaseStatus>,
    ) -> CasefileResult<Vec<Case>> {
        let cases = self.cases.read().map_err(|_| poisoned())?;
        let mut owned: Vec<Case> = cases
            .values()
            .filter(|c| c.owner_id == owner_id)
            .filter(|c| status.map_or(true, |s| c.status == s))
            .cloned()
            .collect();
        // UUIDv7 ids sort by creation time.
        owned.sort_by_key(|c| c.case_id);
        Ok(owned)
    }

    // === Finding Operations ===

    async fn finding_append(&self, finding: &Finding) -> CasefileResult<FindingId> {
        {
            let cases = self.cases.read().map_err(|_| poisoned())?;
            if !cases.contains_key(&finding.case_id) {
                return Err(StorageError::NotFound {
                    entity_type: EntityType::Case,
                    id: finding.case_id,
                }
                .into());
            }
        }

        let mut findings = self.findings.write().map_err(|_| poisoned())?;
        findings
            .entry(finding.case_id)
            .or_default()
            .push(finding.clone());
        Ok(finding.finding_id)
    }

    async fn finding_list(&self, case_id: CaseId) -> CasefileResult<Vec<Finding>> {
        let findings = self.findings.read().map_err(|_| poisoned())?;
        Ok(findings.get(&case_id).cloned().unwrap_or_default())
    }

    // === Progress Operations ===

    async fn progress_get(&self, case_id: CaseId) -> CasefileResult<Option<InvestigationProgress>> {
        let progress = self.progress.read().map_err(|_| poisoned())?;
        Ok(progress.get(&case_id).cloned())
    }

    async fn progress_update(&self, incoming: &InvestigationProgress) -> CasefileResult<()> {
        let mut progress = self.progress.write().map_err(|_| poisoned())?;
        let stored = progress.get_mut(&incoming.case_id).ok_or_else(|| {
            casefile_core::CasefileError::from(StorageError::NotFound {
                entity_type: EntityType::Progress,
                id: incoming.case_id,
            })
        })?;

        let expected = stored.revision + 1;
        if incoming.revision != expected {
            return Err(StorageError::UpdateConflict {
                entity_type: EntityType::Progress,
                id: incoming.case_id,
                expected,
                found: incoming.revision,
            }
            .into());
        }

        *stored = incoming.clone();
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use casefile_core::{
        compute_content_hash, new_entity_id, record_visit, CaseBundle, CaseMap, CaseMetadata,
        CasefileError, ClueSet, Difficulty, FindingImportance, FindingSource,
    };
    use chrono::Utc;

    fn sample_case(owner_id: OwnerId) -> Case {
        let now = Utc::now();
        Case {
            case_id: new_entity_id(),
            owner_id,
            difficulty: Difficulty::Detective,
            status: CaseStatus::Active,
            bundle: CaseBundle {
                story: "A body in the library.".to_string(),
                enhanced_story: "A body in the library. [CLUE: torn glove]".to_string(),
                intro: "Detective, we need you.".to_string(),
                clue_set: ClueSet::default(),
                map: CaseMap::default(),
                map_image: None,
                content_hash: compute_content_hash(b"A body in the library."),
            },
            metadata: CaseMetadata {
                estimated_duration_minutes: 60,
                tags: vec!["library".to_string()],
            },
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_finding(case_id: CaseId, text: &str) -> Finding {
        Finding {
            finding_id: new_entity_id(),
            case_id,
            source: FindingSource::LocationVisit,
            source_details: "library".to_string(),
            text: text.to_string(),
            importance: FindingImportance::Minor,
            is_new: true,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_case_insert_get_roundtrip() {
        let store = MemoryStore::new();
        let case = sample_case(new_entity_id());

        store.case_insert(&case).await.unwrap();
        let fetched = store.case_get(case.case_id).await.unwrap().unwrap();
        assert_eq!(fetched, case);
    }

    #[tokio::test]
    async fn test_case_insert_seeds_progress() {
        let store = MemoryStore::new();
        let case = sample_case(new_entity_id());

        store.case_insert(&case).await.unwrap();
        let progress = store.progress_get(case.case_id).await.unwrap().unwrap();
        assert_eq!(progress.case_id, case.case_id);
        assert_eq!(progress.revision, 0);
        assert!(progress.visited_locations.is_empty());
    }

    #[tokio::test]
    async fn test_case_insert_duplicate_rejected() {
        let store = MemoryStore::new();
        let case = sample_case(new_entity_id());

        store.case_insert(&case).await.unwrap();
        let err = store.case_insert(&case).await.unwrap_err();
        assert!(matches!(
            err,
            CasefileError::Storage(StorageError::InsertFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_case_get_missing_is_none() {
        let store = MemoryStore::new();
        assert!(store.case_get(new_entity_id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_case_list_by_owner_filters() {
        let store = MemoryStore::new();
        let owner = new_entity_id();
        let other = new_entity_id();

        let mut closed = sample_case(owner);
        closed.status = CaseStatus::Closed;
        store.case_insert(&closed).await.unwrap();
        store.case_insert(&sample_case(owner)).await.unwrap();
        store.case_insert(&sample_case(other)).await.unwrap();

        let all = store.case_list_by_owner(owner, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let active = store
            .case_list_by_owner(owner, Some(CaseStatus::Active))
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].status, CaseStatus::Active);
    }

    #[tokio::test]
    async fn test_finding_append_preserves_order() {
        let store = MemoryStore::new();
        let case = sample_case(new_entity_id());
        store.case_insert(&case).await.unwrap();

        store
            .finding_append(&sample_finding(case.case_id, "first"))
            .await
            .unwrap();
        store
            .finding_append(&sample_finding(case.case_id, "second"))
            .await
            .unwrap();

        let findings = store.finding_list(case.case_id).await.unwrap();
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].text, "first");
        assert_eq!(findings[1].text, "second");
    }

    #[tokio::test]
    async fn test_finding_append_unknown_case_rejected() {
        let store = MemoryStore::new();
        let err = store
            .finding_append(&sample_finding(new_entity_id(), "orphan"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CasefileError::Storage(StorageError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_progress_update_cas_accepts_next_revision() {
        let store = MemoryStore::new();
        let case = sample_case(new_entity_id());
        store.case_insert(&case).await.unwrap();

        let mut progress = store.progress_get(case.case_id).await.unwrap().unwrap();
        record_visit(&mut progress, "library", Utc::now()).unwrap();
        assert_eq!(progress.revision, 1);

        store.progress_update(&progress).await.unwrap();
        let stored = store.progress_get(case.case_id).await.unwrap().unwrap();
        assert_eq!(stored.revision, 1);
        assert!(stored.visited_locations.contains_key("library"));
    }

    #[tokio::test]
    async fn test_progress_update_cas_rejects_stale_writer() {
        let store = MemoryStore::new();
        let case = sample_case(new_entity_id());
        store.case_insert(&case).await.unwrap();

        // Two writers read the same revision-0 snapshot.
        let mut first = store.progress_get(case.case_id).await.unwrap().unwrap();
        let mut second = first.clone();

        record_visit(&mut first, "library", Utc::now()).unwrap();
        record_visit(&mut second, "library", Utc::now()).unwrap();

        store.progress_update(&first).await.unwrap();
        let err = store.progress_update(&second).await.unwrap_err();
        assert!(matches!(
            err,
            CasefileError::Storage(StorageError::UpdateConflict { .. })
        ));

        // Exactly one visit record committed.
        let stored = store.progress_get(case.case_id).await.unwrap().unwrap();
        assert_eq!(stored.revision, 1);
        assert_eq!(stored.visited_locations.len(), 1);
    }

    #[tokio::test]
    async fn test_progress_update_unknown_case_rejected() {
        let store = MemoryStore::new();
        let progress = InvestigationProgress::new(new_entity_id(), Utc::now());
        let err = store.progress_update(&progress).await.unwrap_err();
        assert!(matches!(
            err,
            CasefileError::Storage(StorageError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_clear_empties_everything() {
        let store = MemoryStore::new();
        let case = sample_case(new_entity_id());
        store.case_insert(&case).await.unwrap();
        store
            .finding_append(&sample_finding(case.case_id, "f"))
            .await
            .unwrap();

        store.clear();
        assert_eq!(store.case_count(), 0);
        assert_eq!(store.finding_count(), 0);
        assert!(store.progress_get(case.case_id).await.unwrap().is_none());
    }
}
