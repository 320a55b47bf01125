//! Case-generation pipeline orchestrator
//!
//! `create_case` registers an operation and returns immediately; the run
//! proceeds on the runtime without blocking the caller, reporting progress
//! through the [`OperationRegistry`](crate::OperationRegistry) until exactly
//! one terminal transition.
//!
//! Step policy:
//! - narrative, enhancement, intro/clues/map: fatal on error, nothing persisted
//! - per-location images and the map image: isolated, degrade to an absent
//!   image plus an operation warning
//! - the final durable write: fatal; on failure this run's uploaded assets
//!   are reclaimed and no partial case is observable

use crate::config::PipelineConfig;
use crate::metrics::PipelineMetrics;
use crate::registry::OperationRegistry;
use casefile_core::{
    compute_content_hash, new_entity_id, Case, CaseBundle, CaseId, CaseMetadata, CaseStatus,
    CasefileResult, Difficulty, GenerationError, ImageRef, Location, OperationId, OperationKind,
    OwnerId,
};
use casefile_gen::{parse, prompts, GeneratorProvider, UploadProvider};
use casefile_storage::CaseStore;
use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;

/// Orchestrates case generation: sequences the generation steps, applies the
/// per-step failure policy, assembles the bundle, and persists it.
pub struct CasePipeline {
    generator: Arc<dyn GeneratorProvider>,
    uploader: Arc<dyn UploadProvider>,
    store: Arc<dyn CaseStore>,
    registry: Arc<OperationRegistry>,
    config: PipelineConfig,
    metrics: Arc<PipelineMetrics>,
}

/// Outcome of one isolated location-image job.
struct LocationImageOutcome {
    location_id: String,
    image: Option<ImageRef>,
    warning: Option<String>,
}

impl CasePipeline {
    /// Wire a pipeline from its collaborators.
    pub fn new(
        generator: Arc<dyn GeneratorProvider>,
        uploader: Arc<dyn UploadProvider>,
        store: Arc<dyn CaseStore>,
        registry: Arc<OperationRegistry>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            generator,
            uploader,
            store,
            registry,
            config,
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    /// The registry this pipeline reports into.
    pub fn registry(&self) -> &Arc<OperationRegistry> {
        &self.registry
    }

    /// Metrics collected across runs.
    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }

    /// Start generating a case. Registers an operation, spawns the run, and
    /// returns the operation id immediately; callers poll the registry until
    /// the operation is terminal, then fetch the case named in its result.
    pub fn create_case(self: &Arc<Self>, owner_id: OwnerId, difficulty: Difficulty) -> OperationId {
        let operation_id = self.registry.register(OperationKind::CaseGeneration);
        tracing::info!(%operation_id, %owner_id, %difficulty, "Case generation accepted");

        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            pipeline.run(operation_id, owner_id, difficulty).await;
        });

        operation_id
    }

    /// Drive one run to its single terminal transition.
    async fn run(self: Arc<Self>, operation_id: OperationId, owner_id: OwnerId, difficulty: Difficulty) {
        let mut uploaded: Vec<String> = Vec::new();

        match self
            .run_inner(operation_id, owner_id, difficulty, &mut uploaded)
            .await
        {
            Ok(case_id) => {
                PipelineMetrics::incr(&self.metrics.cases_generated);
                self.registry
                    .mark_completed(operation_id, serde_json::json!({ "case_id": case_id }));
                tracing::info!(%operation_id, %case_id, "Case generation completed");
            }
            Err(e) => {
                tracing::error!(%operation_id, error = %e, "Case generation failed");
                self.reclaim_uploads(&uploaded).await;
                PipelineMetrics::incr(&self.metrics.cases_failed);
                self.registry.mark_failed(operation_id, &e.to_string());
            }
        }
    }

    async fn run_inner(
        &self,
        operation_id: OperationId,
        owner_id: OwnerId,
        difficulty: Difficulty,
        uploaded: &mut Vec<String>,
    ) -> CasefileResult<CaseId> {
        // The case id also names uploaded assets, so a failed run can
        // reclaim everything it stored.
        let case_id = new_entity_id();
        let model = self.generator.model_id().to_string();

        // Step 1: base narrative.
        self.registry
            .mark_processing(operation_id, 5, "Generating narrative");
        let story = self
            .generate_text("narrative", prompts::story_prompt(difficulty))
            .await?;

        // Step 2: clue-trigger enhancement. Must complete before clue
        // extraction, which reads the trigger annotations.
        self.registry
            .mark_processing(operation_id, 20, "Enhancing narrative");
        let enhanced_story = self
            .generate_text("enhancement", prompts::enhancement_prompt(&story))
            .await?;

        // Step 3: intro, clues, and map all depend only on the enhanced
        // story; no ordering among them.
        self.registry
            .mark_processing(operation_id, 35, "Composing intro, clues, and map");
        let (intro, clues_raw, map_raw) = tokio::join!(
            self.generate_text("intro", prompts::intro_prompt(&enhanced_story)),
            self.generate_text(
                "clue extraction",
                prompts::clue_extraction_prompt(&enhanced_story, difficulty),
            ),
            self.generate_text("map", prompts::map_prompt(&enhanced_story)),
        );
        let intro = intro?;
        let clue_set = parse::parse_clue_set(&clues_raw?, &model)?;
        let mut map = parse::parse_case_map(&map_raw?, &model)?;

        // Step 4: per-location images, isolated and concurrent. A failure
        // leaves that location imageless and records a warning.
        self.registry
            .mark_processing(operation_id, 55, "Generating location images");
        let outcomes: Vec<LocationImageOutcome> = stream::iter(map.locations.clone())
            .map(|location| self.location_image(case_id, location))
            .buffer_unordered(self.config.max_concurrent_images)
            .collect()
            .await;
        for outcome in outcomes {
            if let Some(warning) = outcome.warning {
                PipelineMetrics::incr(&self.metrics.location_images_failed);
                self.registry.push_warning(operation_id, &warning);
                tracing::warn!(%operation_id, "{}", warning);
            }
            if let Some(image) = outcome.image {
                uploaded.push(image.asset_id.clone());
                if let Some(location) =
                    map.locations.iter_mut().find(|l| l.id == outcome.location_id)
                {
                    location.image = Some(image);
                }
            }
        }

        // Step 5: rendered map image. Also non-fatal.
        self.registry
            .mark_processing(operation_id, 80, "Rendering case map");
        let map_image = match self.map_image(case_id, &map).await {
            Ok(image) => {
                uploaded.push(image.asset_id.clone());
                Some(image)
            }
            Err(e) => {
                PipelineMetrics::incr(&self.metrics.map_images_failed);
                let warning = format!("map image unavailable: {}", e);
                self.registry.push_warning(operation_id, &warning);
                tracing::warn!(%operation_id, "{}", warning);
                None
            }
        };

        // Step 6: derived metadata.
        let metadata = derive_metadata(difficulty, &story, clue_set.len(), map.suspects.len());

        let content_hash = {
            let mut combined = story.clone().into_bytes();
            combined.extend_from_slice(enhanced_story.as_bytes());
            compute_content_hash(&combined)
        };

        let now = Utc::now();
        let case = Case {
            case_id,
            owner_id,
            difficulty,
            status: CaseStatus::Active,
            bundle: CaseBundle {
                story,
                enhanced_story,
                intro,
                clue_set,
                map,
                map_image,
                content_hash,
            },
            metadata,
            created_at: now,
            updated_at: now,
        };

        // Step 7: the one durable write. The only untolerated failure after
        // generation succeeded.
        self.registry
            .mark_processing(operation_id, 90, "Persisting case");
        self.store.case_insert(&case).await?;

        Ok(case_id)
    }

    /// Generate and upload the crime-scene image for one location. Never
    /// propagates an error: failures degrade to `image: None` plus a warning.
    async fn location_image(&self, case_id: CaseId, location: Location) -> LocationImageOutcome {
        let name = format!("{}-{}.png", case_id, location.id);
        let result: CasefileResult<ImageRef> = async {
            let bytes = self
                .generate_image("location image", prompts::location_image_prompt(&location))
                .await?;
            let asset = self.upload(&bytes, &name).await?;
            Ok(asset.into())
        }
        .await;

        match result {
            Ok(image) => LocationImageOutcome {
                location_id: location.id,
                image: Some(image),
                warning: None,
            },
            Err(e) => LocationImageOutcome {
                warning: Some(format!(
                    "image for location '{}' unavailable: {}",
                    location.id, e
                )),
                location_id: location.id,
                image: None,
            },
        }
    }

    /// Generate and upload the rendered map image.
    async fn map_image(&self, case_id: CaseId, map: &casefile_core::CaseMap) -> CasefileResult<ImageRef> {
        let bytes = self
            .generate_image("map image", prompts::map_image_prompt(map))
            .await?;
        let asset = self.upload(&bytes, &format!("{}-map.png", case_id)).await?;
        Ok(asset.into())
    }

    /// Best-effort deletion of assets uploaded by a run that failed to
    /// persist. Keeps the blob store free of orphans tied to dead operations.
    async fn reclaim_uploads(&self, uploaded: &[String]) {
        for asset_id in uploaded {
            match self.uploader.delete(asset_id).await {
                Ok(()) => {
                    PipelineMetrics::incr(&self.metrics.assets_reclaimed);
                    tracing::info!(%asset_id, "Reclaimed orphaned upload");
                }
                Err(e) => {
                    tracing::warn!(%asset_id, error = %e, "Failed to reclaim orphaned upload");
                }
            }
        }
    }

    async fn generate_text(&self, step: &str, prompt: String) -> CasefileResult<String> {
        self.timed(step, self.config.generation_timeout, self.generator.generate(&prompt))
            .await
    }

    async fn generate_image(&self, step: &str, prompt: String) -> CasefileResult<Vec<u8>> {
        self.timed(
            step,
            self.config.generation_timeout,
            self.generator.generate_image(&prompt),
        )
        .await
    }

    async fn upload(&self, bytes: &[u8], name: &str) -> CasefileResult<casefile_gen::UploadedAsset> {
        self.timed(
            "upload",
            self.config.upload_timeout,
            self.uploader.upload(bytes, name, &self.config.image_folder),
        )
        .await
    }

    /// Wrap an external call in a timeout; expiry surfaces as a step failure
    /// governed by the caller's fatal/non-fatal policy.
    async fn timed<T>(
        &self,
        step: &str,
        timeout: Duration,
        fut: impl std::future::Future<Output = CasefileResult<T>>,
    ) -> CasefileResult<T> {
        match tokio::time::timeout(timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout {
                step: step.to_string(),
                timeout_ms: timeout.as_millis() as i64,
            }
            .into()),
        }
    }
}

/// Estimated play duration and descriptive tags for a finished bundle.
fn derive_metadata(
    difficulty: Difficulty,
    story: &str,
    clue_count: usize,
    suspect_count: usize,
) -> CaseMetadata {
    let estimated_duration_minutes =
        difficulty.minutes_per_lead() * (clue_count as i64 + suspect_count as i64);

    CaseMetadata {
        estimated_duration_minutes,
        tags: derive_tags(story, difficulty),
    }
}

/// Descriptive tags scanned from the narrative, plus the difficulty tier.
/// Deterministic for a given story.
fn derive_tags(story: &str, difficulty: Difficulty) -> Vec<String> {
    const THEMES: &[&str] = &[
        "harbor", "manor", "theater", "observatory", "poison", "blackmail", "heirloom",
        "midnight", "storm", "letter", "jewel", "train",
    ];

    let lowered = story.to_lowercase();
    let mut tags: Vec<String> = vec![difficulty.as_db_str().to_lowercase()];
    tags.extend(
        THEMES
            .iter()
            .filter(|theme| lowered.contains(**theme))
            .take(5)
            .map(|theme| theme.to_string()),
    );
    tags
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_metadata_scales_with_counts() {
        let rookie = derive_metadata(Difficulty::Rookie, "", 4, 3);
        let inspector = derive_metadata(Difficulty::Inspector, "", 8, 5);
        assert_eq!(
            rookie.estimated_duration_minutes,
            Difficulty::Rookie.minutes_per_lead() * 7
        );
        assert!(inspector.estimated_duration_minutes > rookie.estimated_duration_minutes);
    }

    #[test]
    fn test_derive_tags_deterministic_and_themed() {
        let story = "The storm broke over the harbor as the heirloom vanished.";
        let tags = derive_tags(story, Difficulty::Detective);
        assert_eq!(tags, derive_tags(story, Difficulty::Detective));
        assert_eq!(tags[0], "detective");
        assert!(tags.contains(&"harbor".to_string()));
        assert!(tags.contains(&"storm".to_string()));
        assert!(tags.contains(&"heirloom".to_string()));
        assert!(!tags.contains(&"poison".to_string()));
    }

    #[test]
    fn test_derive_tags_without_theme_matches() {
        let tags = derive_tags("An unremarkable afternoon.", Difficulty::Rookie);
        assert_eq!(tags, vec!["rookie".to_string()]);
    }
}
