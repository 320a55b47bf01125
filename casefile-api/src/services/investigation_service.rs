//! Gated investigation actions
//!
//! Orchestrates the daily-gated actions (visit, interrogate) and the ungated
//! ones (clue discovery, custom findings) against the store.
//!
//! Concurrency: the gate check and the progress write must behave as one
//! critical section. The store's compare-and-set on `progress.revision`
//! provides that: this service re-runs the whole read-check-write cycle on
//! conflict, so the loser of a same-day race re-reads the winner's record,
//! fails the gate, and gets a cooldown rejection instead of double-writing.

use crate::constants::{MAX_INTERROGATION_QUESTIONS, MAX_PROGRESS_WRITE_ATTEMPTS};
use crate::error::{ApiError, ApiResult};
use casefile_core::{
    discover_clue, new_entity_id, record_interrogation, record_visit, Case, CaseId, CasefileError,
    Finding, FindingImportance, FindingSource, InvestigationProgress, StorageError, Suspect,
    Timestamp,
};
use casefile_gen::{prompts, GeneratorProvider};
use casefile_storage::CaseStore;
use std::sync::Arc;

/// Orchestrates investigation actions for stored cases.
pub struct InvestigationService {
    store: Arc<dyn CaseStore>,
    generator: Arc<dyn GeneratorProvider>,
}

impl InvestigationService {
    pub fn new(store: Arc<dyn CaseStore>, generator: Arc<dyn GeneratorProvider>) -> Self {
        Self { store, generator }
    }

    /// Visit a location. Gated to once per location per case-local day.
    ///
    /// Returns the updated progress and the finding the visit surfaced.
    pub async fn visit_location(
        &self,
        case_id: CaseId,
        location_id: &str,
        now: Timestamp,
    ) -> ApiResult<(InvestigationProgress, Finding)> {
        let case = self.load_case(case_id).await?;
        let location = case
            .bundle
            .map
            .location(location_id)
            .ok_or_else(|| ApiError::location_not_found(location_id))?;

        let progress = self
            .mutate_progress(case_id, |progress| {
                record_visit(progress, location_id, now).map_err(CasefileError::from)
            })
            .await?;

        let finding = Finding {
            finding_id: new_entity_id(),
            case_id,
            source: FindingSource::LocationVisit,
            source_details: location_id.to_string(),
            text: format!(
                "You search {}. {}",
                location.display_name, location.description
            ),
            importance: FindingImportance::Minor,
            is_new: true,
            created_at: now,
        };
        self.store.finding_append(&finding).await?;

        Ok((progress, finding))
    }

    /// Interrogate a suspect. Gated to once per suspect per case-local day.
    ///
    /// Responses come from the generator; a generation failure degrades to a
    /// stock deflection rather than blocking the action.
    pub async fn interrogate(
        &self,
        case_id: CaseId,
        suspect_name: &str,
        questions: Vec<String>,
        now: Timestamp,
    ) -> ApiResult<(InvestigationProgress, Vec<String>, Finding)> {
        if questions.is_empty() || questions.len() > MAX_INTERROGATION_QUESTIONS {
            return Err(ApiError::invalid_range(
                "questions",
                1,
                MAX_INTERROGATION_QUESTIONS,
            ));
        }

        let case = self.load_case(case_id).await?;
        let suspect = case
            .bundle
            .map
            .suspect(suspect_name)
            .ok_or_else(|| ApiError::suspect_not_found(suspect_name))?
            .clone();

        // Cheap gate pre-check before paying for generation. The write path
        // re-checks under compare-and-set regardless.
        {
            let progress = self.load_progress(case_id).await?;
            let today = casefile_core::local_date(now);
            if !casefile_core::can_interrogate(&progress, suspect_name, today) {
                return Err(ApiError::cooldown_active(
                    suspect_name,
                    casefile_core::next_allowed_date(today),
                ));
            }
        }

        let responses = self.generate_responses(&suspect, &questions).await;

        let progress = self
            .mutate_progress(case_id, |progress| {
                record_interrogation(
                    progress,
                    suspect_name,
                    questions.clone(),
                    responses.clone(),
                    now,
                )
                .map_err(CasefileError::from)
            })
            .await?;

        let finding = Finding {
            finding_id: new_entity_id(),
            case_id,
            source: FindingSource::Interrogation,
            source_details: suspect_name.to_string(),
            text: format!(
                "{} answered {} question(s) under interrogation.",
                suspect_name,
                questions.len()
            ),
            importance: FindingImportance::Important,
            is_new: true,
            created_at: now,
        };
        self.store.finding_append(&finding).await?;

        Ok((progress, responses, finding))
    }

    /// Discover a clue. Not day-gated; the set only grows.
    ///
    /// Returns the progress, whether the clue was new, and the finding
    /// appended for a first discovery.
    pub async fn discover_clue(
        &self,
        case_id: CaseId,
        clue_id: &str,
        now: Timestamp,
    ) -> ApiResult<(InvestigationProgress, bool, Option<Finding>)> {
        let case = self.load_case(case_id).await?;
        let clue = case
            .bundle
            .clue_set
            .clues
            .iter()
            .find(|c| c.id == clue_id)
            .ok_or_else(|| {
                ApiError::new(
                    crate::error::ErrorCode::EntityNotFound,
                    format!("Clue '{}' not found in this case", clue_id),
                )
            })?
            .clone();

        // Re-discovery is a no-op: nothing to write, nothing to report.
        let current = self.load_progress(case_id).await?;
        if current.discovered_clues.contains(clue_id) {
            return Ok((current, false, None));
        }

        let progress = self
            .mutate_progress(case_id, |progress| {
                discover_clue(progress, clue_id);
                Ok(())
            })
            .await?;

        let finding = Finding {
            finding_id: new_entity_id(),
            case_id,
            source: FindingSource::ClueDiscovery,
            source_details: clue_id.to_string(),
            text: format!("{}: {}", clue.title, clue.text),
            importance: FindingImportance::Important,
            is_new: true,
            created_at: now,
        };
        self.store.finding_append(&finding).await?;

        Ok((progress, true, Some(finding)))
    }

    /// Append a caller-supplied finding. Never gated.
    pub async fn add_finding(
        &self,
        case_id: CaseId,
        source: FindingSource,
        source_details: String,
        text: String,
        importance: FindingImportance,
        now: Timestamp,
    ) -> ApiResult<Finding> {
        // Existence check so unknown cases 404 instead of storing orphans.
        self.load_case(case_id).await?;

        let finding = Finding {
            finding_id: new_entity_id(),
            case_id,
            source,
            source_details,
            text,
            importance,
            is_new: true,
            created_at: now,
        };
        self.store.finding_append(&finding).await?;
        Ok(finding)
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    async fn load_case(&self, case_id: CaseId) -> ApiResult<Case> {
        self.store
            .case_get(case_id)
            .await?
            .ok_or_else(|| ApiError::case_not_found(case_id))
    }

    async fn load_progress(&self, case_id: CaseId) -> ApiResult<InvestigationProgress> {
        self.store
            .progress_get(case_id)
            .await?
            .ok_or_else(|| ApiError::case_not_found(case_id))
    }

    /// Read-mutate-write with bounded compare-and-set retries.
    ///
    /// `mutate` must bump the revision (the gate functions do); a rejection
    /// from `mutate` aborts without writing. On a revision conflict the whole
    /// cycle re-runs against the fresh record, so gate checks always see the
    /// latest committed state.
    async fn mutate_progress<F>(
        &self,
        case_id: CaseId,
        mut mutate: F,
    ) -> ApiResult<InvestigationProgress>
    where
        F: FnMut(&mut InvestigationProgress) -> Result<(), CasefileError>,
    {
        for attempt in 1..=MAX_PROGRESS_WRITE_ATTEMPTS {
            let mut progress = self.load_progress(case_id).await?;
            mutate(&mut progress).map_err(ApiError::from)?;

            match self.store.progress_update(&progress).await {
                Ok(()) => return Ok(progress),
                Err(CasefileError::Storage(StorageError::UpdateConflict { .. }))
                    if attempt < MAX_PROGRESS_WRITE_ATTEMPTS =>
                {
                    tracing::debug!(%case_id, attempt, "Progress write conflict, retrying");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(ApiError::concurrent_modification("Progress", case_id))
    }

    /// Generate in-character responses, one per question. Generation quality
    /// is not a correctness requirement of the action: failures fall back to
    /// a stock deflection and a warning log.
    async fn generate_responses(&self, suspect: &Suspect, questions: &[String]) -> Vec<String> {
        let prompt = prompts::interrogation_prompt(suspect, questions);
        match self.generator.generate(&prompt).await {
            Ok(raw) => {
                let mut lines: Vec<String> = raw
                    .lines()
                    .map(|l| {
                        l.trim()
                            .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ')')
                            .trim()
                            .to_string()
                    })
                    .filter(|l| !l.is_empty())
                    .collect();
                // Pad or trim so every question has exactly one answer.
                lines.resize_with(questions.len(), || {
                    format!("{} refuses to answer.", suspect.name)
                });
                lines
            }
            Err(e) => {
                tracing::warn!(
                    suspect = %suspect.name,
                    error = %e,
                    "Interrogation response generation failed, using fallback"
                );
                questions
                    .iter()
                    .map(|_| format!("{} says nothing and stares at the wall.", suspect.name))
                    .collect()
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
