//! Identity types for CASEFILE entities

use chrono::{DateTime, NaiveDate, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Entity identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub type EntityId = Uuid;

/// Identifier of a generated case.
pub type CaseId = Uuid;

/// Identifier of a tracked asynchronous operation.
pub type OperationId = Uuid;

/// Identifier of an appended finding.
pub type FindingId = Uuid;

/// Identifier of the player who owns a case.
pub type OwnerId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// A calendar date in the case-local time zone, used by the daily action gate.
pub type LocalDate = NaiveDate;

/// SHA-256 content hash for deduplication and integrity verification.
pub type ContentHash = [u8; 32];

/// Raw binary content (generated images before upload).
pub type RawContent = Vec<u8>;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}

/// Compute SHA-256 hash of content.
pub fn compute_content_hash(content: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entity_id_is_v7() {
        let id = new_entity_id();
        assert_eq!(id.get_version_num(), 7);
    }

    #[test]
    fn test_entity_ids_sortable_by_creation() {
        let a = new_entity_id();
        let b = new_entity_id();
        assert!(a <= b);
    }

    #[test]
    fn test_content_hash_deterministic() {
        let a = compute_content_hash(b"the body in the library");
        let b = compute_content_hash(b"the body in the library");
        let c = compute_content_hash(b"the body in the study");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
