//! Operation status registry
//!
//! Process-wide table mapping opaque operation ids to their polling-visible
//! lifecycle. Lifetime is tied to process uptime: there is no persistence
//! contract, and a restart forgets in-flight history (accepted limitation —
//! pollers receive not-found, never a crash).
//!
//! Concurrency contract: any number of pollers read concurrently; each
//! operation has a single writer lineage (the pipeline run that registered
//! it). Writes to one entry serialize on the map's per-shard lock, and reads
//! return cloned snapshots, so no poller ever observes a torn record.
//! Terminal states are immutable: late writes log a warning and change
//! nothing.

use casefile_core::{new_entity_id, Operation, OperationId, OperationKind, OperationStatus};
use chrono::{Duration, Utc};
use dashmap::DashMap;

/// Registry of tracked asynchronous operations.
///
/// Explicitly owned: create one at process start and hand an `Arc` to every
/// component that needs it. No global state.
#[derive(Debug, Default)]
pub struct OperationRegistry {
    operations: DashMap<OperationId, Operation>,
}

impl OperationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new queued operation and return its fresh id.
    pub fn register(&self, kind: OperationKind) -> OperationId {
        let operation_id = new_entity_id();
        let operation = Operation::queued(operation_id, kind, Utc::now());
        self.operations.insert(operation_id, operation);
        tracing::debug!(%operation_id, %kind, "Operation registered");
        operation_id
    }

    /// Mark an operation as processing, updating progress and message.
    ///
    /// Valid from `Queued` (transition) or `Processing` (progress refresh).
    /// Unknown ids and terminal operations are left untouched, logged only.
    pub fn mark_processing(&self, operation_id: OperationId, progress_percent: u8, message: &str) {
        let Some(mut entry) = self.operations.get_mut(&operation_id) else {
            tracing::warn!(%operation_id, "mark_processing for unknown operation");
            return;
        };
        if entry.status.is_terminal() {
            tracing::warn!(
                %operation_id,
                status = %entry.status,
                "mark_processing ignored: operation already terminal"
            );
            return;
        }

        entry.status = OperationStatus::Processing;
        entry.progress_percent = progress_percent.min(100);
        entry.status_message = message.to_string();
    }

    /// Mark an operation as completed and store its result.
    ///
    /// Only legal from `Processing`; anything else is logged and ignored so
    /// a committed terminal state is never overwritten.
    pub fn mark_completed(&self, operation_id: OperationId, result: serde_json::Value) {
        let Some(mut entry) = self.operations.get_mut(&operation_id) else {
            tracing::warn!(%operation_id, "mark_completed for unknown operation");
            return;
        };
        if !entry.status.can_transition_to(OperationStatus::Completed) {
            tracing::warn!(
                %operation_id,
                status = %entry.status,
                "mark_completed ignored: illegal transition"
            );
            return;
        }

        entry.status = OperationStatus::Completed;
        entry.progress_percent = 100;
        entry.status_message = "Completed".to_string();
        entry.completed_at = Some(Utc::now());
        entry.result = Some(result);
    }

    /// Mark an operation as failed and record the cause.
    ///
    /// Legal from any non-terminal state (a run may fail before it ever
    /// reported progress). Terminal operations are logged and ignored.
    pub fn mark_failed(&self, operation_id: OperationId, error: &str) {
        let Some(mut entry) = self.operations.get_mut(&operation_id) else {
            tracing::warn!(%operation_id, "mark_failed for unknown operation");
            return;
        };
        if entry.status.is_terminal() {
            tracing::warn!(
                %operation_id,
                status = %entry.status,
                "mark_failed ignored: operation already terminal"
            );
            return;
        }

        entry.status = OperationStatus::Failed;
        entry.status_message = "Failed".to_string();
        entry.completed_at = Some(Utc::now());
        entry.error = Some(error.to_string());
    }

    /// Record a non-fatal degradation on a running operation.
    pub fn push_warning(&self, operation_id: OperationId, warning: impl Into<String>) {
        let Some(mut entry) = self.operations.get_mut(&operation_id) else {
            tracing::warn!(%operation_id, "push_warning for unknown operation");
            return;
        };
        if entry.status.is_terminal() {
            tracing::warn!(%operation_id, "push_warning ignored: operation already terminal");
            return;
        }
        entry.warnings.push(warning.into());
    }

    /// Get a snapshot of an operation. Returns a clone, so terminal results
    /// are stable across any number of polls.
    pub fn get(&self, operation_id: OperationId) -> Option<Operation> {
        self.operations.get(&operation_id).map(|e| e.value().clone())
    }

    /// List all known operation ids. Diagnostic use only.
    pub fn list(&self) -> Vec<OperationId> {
        self.operations.iter().map(|e| *e.key()).collect()
    }

    /// Number of tracked operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Evict terminal operations whose completion is older than `max_age`.
    /// Returns the number of evicted entries. In-flight operations are never
    /// evicted.
    pub fn evict_terminal_older_than(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let before = self.operations.len();
        self.operations.retain(|_, op| {
            !(op.status.is_terminal() && op.completed_at.is_some_and(|at| at < cutoff))
        });
        before - self.operations.len()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use casefile_core::OperationKind;

    #[test]
    fn test_register_creates_queued_entry() {
        let registry = OperationRegistry::new();
        let id = registry.register(OperationKind::CaseGeneration);

        let op = registry.get(id).unwrap();
        assert_eq!(op.operation_id, id);
        assert_eq!(op.status, OperationStatus::Queued);
        assert_eq!(op.progress_percent, 0);
    }

    #[test]
    fn test_lifecycle_queued_processing_completed() {
        let registry = OperationRegistry::new();
        let id = registry.register(OperationKind::CaseGeneration);

        registry.mark_processing(id, 30, "Generating narrative");
        let op = registry.get(id).unwrap();
        assert_eq!(op.status, OperationStatus::Processing);
        assert_eq!(op.progress_percent, 30);
        assert_eq!(op.status_message, "Generating narrative");

        registry.mark_completed(id, serde_json::json!({"case_id": "abc"}));
        let op = registry.get(id).unwrap();
        assert_eq!(op.status, OperationStatus::Completed);
        assert_eq!(op.progress_percent, 100);
        assert!(op.completed_at.is_some());
        assert_eq!(op.result, Some(serde_json::json!({"case_id": "abc"})));
    }

    #[test]
    fn test_completed_is_immutable() {
        let registry = OperationRegistry::new();
        let id = registry.register(OperationKind::CaseGeneration);
        registry.mark_processing(id, 50, "running");
        registry.mark_completed(id, serde_json::json!({"case_id": "abc"}));

        let snapshot = registry.get(id).unwrap();

        registry.mark_failed(id, "late failure");
        registry.mark_processing(id, 10, "rewind attempt");
        registry.push_warning(id, "late warning");

        assert_eq!(registry.get(id).unwrap(), snapshot);
    }

    #[test]
    fn test_failed_is_immutable() {
        let registry = OperationRegistry::new();
        let id = registry.register(OperationKind::CaseGeneration);
        registry.mark_processing(id, 10, "running");
        registry.mark_failed(id, "upstream exploded");

        let snapshot = registry.get(id).unwrap();
        assert_eq!(snapshot.error.as_deref(), Some("upstream exploded"));

        registry.mark_completed(id, serde_json::json!({}));
        assert_eq!(registry.get(id).unwrap(), snapshot);
    }

    #[test]
    fn test_completed_requires_processing() {
        let registry = OperationRegistry::new();
        let id = registry.register(OperationKind::CaseGeneration);

        // Straight from Queued is illegal; entry stays queued.
        registry.mark_completed(id, serde_json::json!({}));
        assert_eq!(registry.get(id).unwrap().status, OperationStatus::Queued);
    }

    #[test]
    fn test_failed_allowed_from_queued() {
        let registry = OperationRegistry::new();
        let id = registry.register(OperationKind::CaseGeneration);

        registry.mark_failed(id, "could not even start");
        assert_eq!(registry.get(id).unwrap().status, OperationStatus::Failed);
    }

    #[test]
    fn test_unknown_id_operations_are_noops() {
        let registry = OperationRegistry::new();
        let ghost = casefile_core::new_entity_id();

        registry.mark_processing(ghost, 10, "x");
        registry.mark_completed(ghost, serde_json::json!({}));
        registry.mark_failed(ghost, "x");
        registry.push_warning(ghost, "x");

        assert!(registry.get(ghost).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_get_terminal_is_stable_across_polls() {
        let registry = OperationRegistry::new();
        let id = registry.register(OperationKind::CaseGeneration);
        registry.mark_processing(id, 10, "x");
        registry.mark_completed(id, serde_json::json!({"case_id": "abc"}));

        let first = registry.get(id).unwrap();
        for _ in 0..10 {
            assert_eq!(registry.get(id).unwrap(), first);
        }
    }

    #[test]
    fn test_warnings_accumulate_while_running() {
        let registry = OperationRegistry::new();
        let id = registry.register(OperationKind::CaseGeneration);
        registry.mark_processing(id, 10, "x");

        registry.push_warning(id, "image for L2 failed");
        registry.push_warning(id, "map image upload failed");

        let op = registry.get(id).unwrap();
        assert_eq!(op.warnings.len(), 2);
        assert_eq!(op.warnings[0], "image for L2 failed");
    }

    #[test]
    fn test_eviction_removes_only_old_terminal_entries() {
        let registry = OperationRegistry::new();

        let done = registry.register(OperationKind::CaseGeneration);
        registry.mark_processing(done, 10, "x");
        registry.mark_completed(done, serde_json::json!({}));
        // Backdate the completion beyond the retention window.
        registry
            .operations
            .get_mut(&done)
            .unwrap()
            .completed_at = Some(Utc::now() - Duration::hours(2));

        let running = registry.register(OperationKind::CaseGeneration);
        registry.mark_processing(running, 10, "x");

        let fresh = registry.register(OperationKind::CaseGeneration);
        registry.mark_processing(fresh, 10, "x");
        registry.mark_completed(fresh, serde_json::json!({}));

        let evicted = registry.evict_terminal_older_than(Duration::hours(1));
        assert_eq!(evicted, 1);
        assert!(registry.get(done).is_none());
        assert!(registry.get(running).is_some());
        assert!(registry.get(fresh).is_some());
    }

    #[test]
    fn test_list_returns_all_ids() {
        let registry = OperationRegistry::new();
        let a = registry.register(OperationKind::CaseGeneration);
        let b = registry.register(OperationKind::CaseGeneration);

        let mut ids = registry.list();
        ids.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(ids, expected);
    }
}
