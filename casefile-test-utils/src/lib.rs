//! CASEFILE Test Utilities
//!
//! Scripted mock providers, a fault-injecting store wrapper, fixtures with
//! pinned clocks, and proptest generators. Everything here exists so the
//! pipeline and API crates can exercise real control flow without touching
//! external services.

use async_trait::async_trait;
use casefile_core::{
    Case, CaseId, CaseStatus, CasefileError, CasefileResult, Finding, FindingId,
    GenerationError, InvestigationProgress, OwnerId,
};
use casefile_gen::{GeneratorProvider, UploadProvider, UploadedAsset};
use casefile_storage::{CaseStore, MemoryStore};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// MOCK GENERATOR
// ============================================================================

/// Scripted generator provider.
///
/// Routes each prompt to a canned response by recognizing the step markers
/// the real prompt builders emit, so pipeline tests drive the exact prompts
/// production code constructs. Individual steps can be failed by name, and
/// image generation can be failed selectively by prompt substring.
pub struct MockGenerator {
    fail_steps: Mutex<HashSet<String>>,
    fail_image_markers: Mutex<Vec<String>>,
    map_json: Mutex<Option<String>>,
    clues_json: Mutex<Option<String>>,
    calls: Mutex<Vec<String>>,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            fail_steps: Mutex::new(HashSet::new()),
            fail_image_markers: Mutex::new(Vec::new()),
            map_json: Mutex::new(None),
            clues_json: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail a named step: one of `story`, `enhancement`, `intro`, `clues`,
    /// `map`, `location_image`, `map_image`.
    pub fn fail_step(&self, step: &str) {
        self.fail_steps.lock().unwrap().insert(step.to_string());
    }

    /// Fail image generation for any prompt containing `marker`
    /// (e.g. one location's display name).
    pub fn fail_images_containing(&self, marker: &str) {
        self.fail_image_markers
            .lock()
            .unwrap()
            .push(marker.to_string());
    }

    /// Override the scripted map JSON.
    pub fn set_map_json(&self, json: &str) {
        *self.map_json.lock().unwrap() = Some(json.to_string());
    }

    /// Override the scripted clue JSON.
    pub fn set_clues_json(&self, json: &str) {
        *self.clues_json.lock().unwrap() = Some(json.to_string());
    }

    /// Step names recorded in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Classify a prompt by the markers the prompt builders emit.
    fn classify(prompt: &str) -> &'static str {
        if prompt.contains("murder mystery narrative") {
            "story"
        } else if prompt.contains("weaving in bracketed clue") {
            "enhancement"
        } else if prompt.contains("two-paragraph briefing") {
            "intro"
        } else if prompt.contains("Extract the investigation clues") {
            "clues"
        } else if prompt.contains("produce the investigation map") {
            "map"
        } else if prompt.contains("roleplaying the suspect") {
            "interrogation"
        } else if prompt.contains("crime-scene illustration") {
            "location_image"
        } else if prompt.contains("investigation map connecting") {
            "map_image"
        } else {
            "unknown"
        }
    }

    fn step_failure(step: &str) -> CasefileError {
        CasefileError::Generation(GenerationError::RequestFailed {
            provider: "mock".to_string(),
            status: 500,
            message: format!("scripted failure for step '{}'", step),
        })
    }

    fn default_map_json() -> &'static str {
        r#"{
            "locations": [
                {"id": "harbor-warehouse", "display_name": "Harbor Warehouse",
                 "description": "Rows of crates, one pried open."},
                {"id": "observatory", "display_name": "Old Observatory",
                 "description": "Dust everywhere except the telescope."},
                {"id": "grand-hotel", "display_name": "Grand Hotel",
                 "description": "A lobby that has seen better decades."}
            ],
            "suspects": [
                {"name": "Vera Kline", "description": "The night watchman's cousin.",
                 "alibi": "Claims she was at the docks."},
                {"name": "Edgar Moss", "description": "Hotel concierge with debts.",
                 "alibi": "Says he never left the front desk."}
            ]
        }"#
    }

    fn default_clues_json() -> &'static str {
        r#"{"clues": [
            {"id": "clue-1", "title": "Torn glove",
             "text": "A glove caught on the warehouse fence.",
             "related_location": "harbor-warehouse", "related_suspect": null},
            {"id": "clue-2", "title": "Mud trail",
             "text": "Boot prints lead toward the observatory.",
             "related_location": "observatory", "related_suspect": null},
            {"id": "clue-3", "title": "Pawn ticket",
             "text": "Made out to the concierge.",
             "related_location": null, "related_suspect": "Edgar Moss"}
        ]}"#
    }
}

#[async_trait]
impl GeneratorProvider for MockGenerator {
    async fn generate(&self, prompt: &str) -> CasefileResult<String> {
        let step = Self::classify(prompt);
        self.calls.lock().unwrap().push(step.to_string());

        if self.fail_steps.lock().unwrap().contains(step) {
            return Err(Self::step_failure(step));
        }

        Ok(match step {
            "story" => {
                "The storm broke over the harbor the night the heirloom vanished \
                 from the Grand Hotel safe."
                    .to_string()
            }
            "enhancement" => {
                "The storm broke over the harbor the night the heirloom vanished \
                 from the Grand Hotel safe. [CLUE: torn glove] [CLUE: mud trail] \
                 [CLUE: pawn ticket]"
                    .to_string()
            }
            "intro" => "Detective, the city needs answers before the papers get them.".to_string(),
            "clues" => self
                .clues_json
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Self::default_clues_json().to_string()),
            "map" => self
                .map_json
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Self::default_map_json().to_string()),
            "interrogation" => {
                // One numbered line per question in the prompt.
                let count = prompt.lines().filter(|l| {
                    l.trim_start().chars().next().is_some_and(|c| c.is_ascii_digit())
                }).count();
                (1..=count.max(1))
                    .map(|i| format!("{}. I already told the constable everything.", i))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            other => format!("mock response for {}", other),
        })
    }

    async fn generate_image(&self, prompt: &str) -> CasefileResult<Vec<u8>> {
        let step = Self::classify(prompt);
        self.calls.lock().unwrap().push(step.to_string());

        if self.fail_steps.lock().unwrap().contains(step) {
            return Err(Self::step_failure(step));
        }
        for marker in self.fail_image_markers.lock().unwrap().iter() {
            if prompt.contains(marker.as_str()) {
                return Err(Self::step_failure(step));
            }
        }

        // PNG magic followed by the prompt length, so outputs differ per prompt.
        let mut bytes = vec![0x89, b'P', b'N', b'G'];
        bytes.extend_from_slice(&(prompt.len() as u32).to_be_bytes());
        Ok(bytes)
    }

    fn model_id(&self) -> &str {
        "mock-generator"
    }
}

// ============================================================================
// MOCK UPLOADER
// ============================================================================

/// Recording upload provider with failure injection.
pub struct MockUploader {
    fail_all: AtomicBool,
    fail_names_containing: Mutex<Vec<String>>,
    uploads: Mutex<Vec<UploadedAsset>>,
    deleted: Mutex<Vec<String>>,
}

impl Default for MockUploader {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUploader {
    pub fn new() -> Self {
        Self {
            fail_all: AtomicBool::new(false),
            fail_names_containing: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    /// Fail every upload from now on.
    pub fn fail_all(&self) {
        self.fail_all.store(true, Ordering::SeqCst);
    }

    /// Fail uploads whose name contains `marker`.
    pub fn fail_names_containing(&self, marker: &str) {
        self.fail_names_containing
            .lock()
            .unwrap()
            .push(marker.to_string());
    }

    /// Assets uploaded so far, in order.
    pub fn uploads(&self) -> Vec<UploadedAsset> {
        self.uploads.lock().unwrap().clone()
    }

    /// Asset ids deleted so far, in order.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl UploadProvider for MockUploader {
    async fn upload(
        &self,
        _content: &[u8],
        name: &str,
        folder: &str,
    ) -> CasefileResult<UploadedAsset> {
        let fail = self.fail_all.load(Ordering::SeqCst)
            || self
                .fail_names_containing
                .lock()
                .unwrap()
                .iter()
                .any(|m| name.contains(m.as_str()));
        if fail {
            return Err(CasefileError::Generation(GenerationError::UploadFailed {
                name: name.to_string(),
                reason: "scripted upload failure".to_string(),
            }));
        }

        let asset = UploadedAsset {
            url: format!("mock://{}/{}", folder, name),
            asset_id: name.to_string(),
        };
        self.uploads.lock().unwrap().push(asset.clone());
        Ok(asset)
    }

    async fn delete(&self, asset_id: &str) -> CasefileResult<()> {
        self.deleted.lock().unwrap().push(asset_id.to_string());
        Ok(())
    }
}

// ============================================================================
// FAILING STORE
// ============================================================================

/// Store wrapper that fails `case_insert` on demand, for exercising the
/// pipeline's final-persistence failure path. All other operations delegate
/// to the wrapped [`MemoryStore`].
pub struct FailingStore {
    inner: Arc<MemoryStore>,
    fail_case_insert: AtomicBool,
}

impl Default for FailingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FailingStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryStore::new()),
            fail_case_insert: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `case_insert` fail.
    pub fn fail_case_insert(&self) {
        self.fail_case_insert.store(true, Ordering::SeqCst);
    }

    /// The wrapped store.
    pub fn inner(&self) -> &Arc<MemoryStore> {
        &self.inner
    }
}

#[async_trait]
impl CaseStore for FailingStore {
    async fn case_insert(&self, case: &Case) -> CasefileResult<()> {
        if self.fail_case_insert.load(Ordering::SeqCst) {
            return Err(CasefileError::Storage(
                casefile_core::StorageError::InsertFailed {
                    entity_type: casefile_core::EntityType::Case,
                    reason: "scripted persistence failure".to_string(),
                },
            ));
        }
        self.inner.case_insert(case).await
    }

    async fn case_get(&self, id: CaseId) -> CasefileResult<Option<Case>> {
        self.inner.case_get(id).await
    }

    async fn case_list_by_owner(
        &self,
        owner_id: OwnerId,
        status: Option<CaseStatus>,
    ) -> CasefileResult<Vec<Case>> {
        self.inner.case_list_by_owner(owner_id, status).await
    }

    async fn finding_append(&self, finding: &Finding) -> CasefileResult<FindingId> {
        self.inner.finding_append(finding).await
    }

    async fn finding_list(&self, case_id: CaseId) -> CasefileResult<Vec<Finding>> {
        self.inner.finding_list(case_id).await
    }

    async fn progress_get(&self, case_id: CaseId) -> CasefileResult<Option<InvestigationProgress>> {
        self.inner.progress_get(case_id).await
    }

    async fn progress_update(&self, progress: &InvestigationProgress) -> CasefileResult<()> {
        self.inner.progress_update(progress).await
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    use casefile_core::{
        compute_content_hash, new_entity_id, Case, CaseBundle, CaseId, CaseMap, CaseMetadata,
        CaseStatus, Clue, ClueSet, Difficulty, Finding, FindingImportance, FindingSource,
        InvestigationProgress, Location, OwnerId, Suspect, Timestamp,
    };
    use chrono::{DateTime, Utc};

    /// Parse a pinned RFC 3339 timestamp, e.g. `2024-03-01T10:00:00+05:30`.
    pub fn ts(s: &str) -> Timestamp {
        DateTime::parse_from_rfc3339(s)
            .expect("valid RFC 3339 timestamp")
            .with_timezone(&Utc)
    }

    /// A small two-location, one-suspect map.
    pub fn sample_map() -> CaseMap {
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
                    image: None,
                },
            ],
            suspects: vec![Suspect {
                name: "Vera Kline".to_string(),
                description: "The night watchman's cousin.".to_string(),
                alibi: "Claims she was at the docks.".to_string(),
            }],
        }
    }

    /// A complete bundle built around [`sample_map`].
    pub fn sample_bundle() -> CaseBundle {
        let story = "The storm broke over the harbor.".to_string();
        let enhanced_story = format!("{} [CLUE: torn glove]", story);
        let content_hash = {
            let mut combined = story.clone().into_bytes();
            combined.extend_from_slice(enhanced_story.as_bytes());
            compute_content_hash(&combined)
        };
        CaseBundle {
            story,
            enhanced_story,
            intro: "Detective, the city needs answers.".to_string(),
            clue_set: ClueSet {
                clues: vec![Clue {
                    id: "clue-1".to_string(),
                    title: "Torn glove".to_string(),
                    text: "A glove caught on the warehouse fence.".to_string(),
                    related_location: Some("harbor-warehouse".to_string()),
                    related_suspect: None,
                }],
            },
            map: sample_map(),
            map_image: None,
            content_hash,
        }
    }

    /// An active case owned by `owner_id`, created at `created_at`.
    pub fn sample_case(owner_id: OwnerId, created_at: Timestamp) -> Case {
        Case {
            case_id: new_entity_id(),
            owner_id,
            difficulty: Difficulty::Detective,
            status: CaseStatus::Active,
            bundle: sample_bundle(),
            metadata: CaseMetadata {
                estimated_duration_minutes: 42,
                tags: vec!["detective".to_string(), "harbor".to_string()],
            },
            created_at,
            updated_at: created_at,
        }
    }

    /// Fresh progress for `case_id` started at `started_at`.
    pub fn sample_progress(case_id: CaseId, started_at: Timestamp) -> InvestigationProgress {
        InvestigationProgress::new(case_id, started_at)
    }

    /// A minor location-visit finding.
    pub fn sample_finding(case_id: CaseId, text: &str, created_at: Timestamp) -> Finding {
        Finding {
            finding_id: new_entity_id(),
            case_id,
            source: FindingSource::LocationVisit,
            source_details: "harbor-warehouse".to_string(),
            text: text.to_string(),
            importance: FindingImportance::Minor,
            is_new: true,
            created_at,
        }
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use casefile_core::{
        CaseStatus, Difficulty, Finding, FindingImportance, FindingSource, OperationStatus,
        Timestamp,
    };
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use uuid::Uuid;

    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<u128>().prop_map(Uuid::from_u128)
    }

    pub fn arb_difficulty() -> impl Strategy<Value = Difficulty> {
        prop_oneof![
            Just(Difficulty::Rookie),
            Just(Difficulty::Detective),
            Just(Difficulty::Inspector),
        ]
    }

    pub fn arb_case_status() -> impl Strategy<Value = CaseStatus> {
        prop_oneof![
            Just(CaseStatus::Generating),
            Just(CaseStatus::Active),
            Just(CaseStatus::Closed),
            Just(CaseStatus::Failed),
        ]
    }

    pub fn arb_operation_status() -> impl Strategy<Value = OperationStatus> {
        prop_oneof![
            Just(OperationStatus::Queued),
            Just(OperationStatus::Processing),
            Just(OperationStatus::Completed),
            Just(OperationStatus::Failed),
        ]
    }

    pub fn arb_finding_source() -> impl Strategy<Value = FindingSource> {
        prop_oneof![
            Just(FindingSource::Interrogation),
            Just(FindingSource::LocationVisit),
            Just(FindingSource::ClueDiscovery),
        ]
    }

    pub fn arb_finding_importance() -> impl Strategy<Value = FindingImportance> {
        prop_oneof![
            Just(FindingImportance::Minor),
            Just(FindingImportance::Important),
            Just(FindingImportance::Critical),
        ]
    }

    /// Timestamps across several decades, second precision.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (0i64..=2_000_000_000).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
    }

    pub fn arb_finding(case_id: Uuid) -> impl Strategy<Value = Finding> {
        (
            arb_uuid(),
            arb_finding_source(),
            "[a-z-]{1,16}",
            ".{1,64}",
            arb_finding_importance(),
            any::<bool>(),
            arb_timestamp(),
        )
            .prop_map(
                move |(finding_id, source, source_details, text, importance, is_new, created_at)| {
                    Finding {
                        finding_id,
                        case_id,
                        source,
                        source_details,
                        text,
                        importance,
                        is_new,
                        created_at,
                    }
                },
            )
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use casefile_core::Difficulty;
    use casefile_gen::prompts;

    #[tokio::test]
    async fn test_mock_generator_routes_real_prompts() {
        let generator = MockGenerator::new();

        let story = generator
            .generate(&prompts::story_prompt(Difficulty::Detective))
            .await
            .unwrap();
        assert!(story.contains("harbor"));

        let enhanced = generator
            .generate(&prompts::enhancement_prompt(&story))
            .await
            .unwrap();
        assert!(enhanced.contains("[CLUE:"));

        let map_raw = generator
            .generate(&prompts::map_prompt(&enhanced))
            .await
            .unwrap();
        let map = casefile_gen::parse::parse_case_map(&map_raw, "mock").unwrap();
        assert_eq!(map.locations.len(), 3);

        let clues_raw = generator
            .generate(&prompts::clue_extraction_prompt(&enhanced, Difficulty::Detective))
            .await
            .unwrap();
        let clues = casefile_gen::parse::parse_clue_set(&clues_raw, "mock").unwrap();
        assert_eq!(clues.len(), 3);

        assert_eq!(generator.calls(), vec!["story", "enhancement", "map", "clues"]);
    }

    #[tokio::test]
    async fn test_mock_generator_step_failure() {
        let generator = MockGenerator::new();
        generator.fail_step("map");

        let err = generator
            .generate(&prompts::map_prompt("story"))
            .await
            .unwrap_err();
        assert!(format!("{}", err).contains("scripted failure"));

        // Other steps still work.
        assert!(generator
            .generate(&prompts::story_prompt(Difficulty::Rookie))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_mock_generator_selective_image_failure() {
        let generator = MockGenerator::new();
        generator.fail_images_containing("Old Observatory");

        let observatory = casefile_core::Location {
            id: "observatory".to_string(),
            display_name: "Old Observatory".to_string(),
            description: "Dusty.".to_string(),
            image: None,
        };
        let warehouse = casefile_core::Location {
            id: "harbor-warehouse".to_string(),
            display_name: "Harbor Warehouse".to_string(),
            description: "Crates.".to_string(),
            image: None,
        };

        assert!(generator
            .generate_image(&prompts::location_image_prompt(&observatory))
            .await
            .is_err());
        assert!(generator
            .generate_image(&prompts::location_image_prompt(&warehouse))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_mock_uploader_records_and_fails() {
        let uploader = MockUploader::new();

        let asset = uploader.upload(b"png", "a.png", "cases").await.unwrap();
        assert_eq!(asset.url, "mock://cases/a.png");
        assert_eq!(uploader.uploads().len(), 1);

        uploader.fail_names_containing("map");
        assert!(uploader.upload(b"png", "x-map.png", "cases").await.is_err());

        uploader.delete("a.png").await.unwrap();
        assert_eq!(uploader.deleted(), vec!["a.png"]);
    }

    #[tokio::test]
    async fn test_failing_store_toggles() {
        let store = FailingStore::new();
        let case = fixtures::sample_case(
            casefile_core::new_entity_id(),
            fixtures::ts("2024-03-01T10:00:00+05:30"),
        );

        store.fail_case_insert();
        assert!(store.case_insert(&case).await.is_err());
        assert!(store.case_get(case.case_id).await.unwrap().is_none());
    }
}
