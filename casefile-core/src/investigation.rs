//! Daily action gate for investigation progress.
//!
//! Visiting a location and interrogating a suspect are limited to once per
//! subject per case-local calendar day. The boundary is midnight in the case
//! time zone, not a rolling 24-hour window: an action at 23:59 and another at
//! 00:01 the next day are both permitted.
//!
//! There is no stored "acted today" flag. Whether an action is allowed is
//! recomputed on every check from the last recorded action date, so a day
//! rollover needs no invalidation pass.
//!
//! ```text
//! (never acted) ──── record ──→ (acted today) ── date rolls over ──→ (acted previously)
//!       ↑                             │                                      │
//!       └──────── gate: allowed ──────┴──── gate: forbidden ───── allowed ───┘
//! ```

use crate::{
    InterrogationRecord, InvestigationError, InvestigationProgress, LocalDate, Timestamp,
    VisitRecord,
};
use chrono::{Duration, FixedOffset};

/// Fixed case-local UTC offset (+05:30). All day-gate arithmetic happens in
/// this zone regardless of where the server runs.
pub const CASE_UTC_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// The case-local time zone.
pub fn case_time_zone() -> FixedOffset {
    FixedOffset::east_opt(CASE_UTC_OFFSET_SECS).expect("valid fixed offset")
}

/// Calendar date of `now` in the case-local time zone.
pub fn local_date(now: Timestamp) -> LocalDate {
    now.with_timezone(&case_time_zone()).date_naive()
}

/// Whole case-local days elapsed between `started_at` and `now`.
pub fn elapsed_days(started_at: Timestamp, now: Timestamp) -> i64 {
    (local_date(now) - local_date(started_at)).num_days()
}

/// First date on which the gate reopens after acting on `today`.
pub fn next_allowed_date(today: LocalDate) -> LocalDate {
    today + Duration::days(1)
}

/// Whether a location may be visited on `today`.
///
/// True unless a visit is already recorded for that location with
/// `last_visit_date == today`.
pub fn can_visit(progress: &InvestigationProgress, location_id: &str, today: LocalDate) -> bool {
    match progress.visited_locations.get(location_id) {
        Some(record) => record.last_visit_date != today,
        None => true,
    }
}

/// Whether a suspect may be interrogated on `today`.
pub fn can_interrogate(progress: &InvestigationProgress, suspect: &str, today: LocalDate) -> bool {
    match progress.interrogated_suspects.get(suspect) {
        Some(record) => record.last_interrogation_date != today,
        None => true,
    }
}

/// Record a visit to `location_id` at `now`.
///
/// Re-checks the gate before mutating; a rejection leaves `progress` fully
/// untouched so the caller can surface a retry-later condition. On success
/// the location's record is inserted or overwritten, `current_day` is
/// refreshed, and `revision` is bumped for the store's compare-and-set.
pub fn record_visit(
    progress: &mut InvestigationProgress,
    location_id: &str,
    now: Timestamp,
) -> Result<(), InvestigationError> {
    let today = local_date(now);
    if !can_visit(progress, location_id, today) {
        return Err(InvestigationError::CooldownActive {
            subject: location_id.to_string(),
            next_allowed: next_allowed_date(today),
        });
    }

    progress.visited_locations.insert(
        location_id.to_string(),
        VisitRecord {
            visited_at: now,
            last_visit_date: today,
        },
    );
    progress.current_day = elapsed_days(progress.started_at, now);
    progress.revision += 1;
    Ok(())
}

/// Record an interrogation of `suspect` at `now`.
///
/// Same gate as [`record_visit`]. On success the questions and responses are
/// appended to the suspect's accumulated record; earlier days' transcripts
/// are preserved.
pub fn record_interrogation(
    progress: &mut InvestigationProgress,
    suspect: &str,
    questions: Vec<String>,
    responses: Vec<String>,
    now: Timestamp,
) -> Result<(), InvestigationError> {
    let today = local_date(now);
    if !can_interrogate(progress, suspect, today) {
        return Err(InvestigationError::CooldownActive {
            subject: suspect.to_string(),
            next_allowed: next_allowed_date(today),
        });
    }

    let record = progress
        .interrogated_suspects
        .entry(suspect.to_string())
        .or_insert_with(|| InterrogationRecord {
            interrogated_at: now,
            last_interrogation_date: today,
            questions_asked: Vec::new(),
            responses: Vec::new(),
        });
    record.interrogated_at = now;
    record.last_interrogation_date = today;
    record.questions_asked.extend(questions);
    record.responses.extend(responses);

    progress.current_day = elapsed_days(progress.started_at, now);
    progress.revision += 1;
    Ok(())
}

/// Mark a clue as discovered. Not day-gated: findings and clues accumulate
/// freely. Returns true if the clue was newly discovered.
pub fn discover_clue(progress: &mut InvestigationProgress, clue_id: &str) -> bool {
    let inserted = progress.discovered_clues.insert(clue_id.to_string());
    if inserted {
        progress.revision += 1;
    }
    inserted
}

// ============================================================================
// TESTS
// ============================================================================
