//! Property tests for the daily action gate.

use casefile_core::{
    can_interrogate, can_visit, discover_clue, local_date, new_entity_id, record_interrogation,
    record_visit, InvestigationProgress, OperationStatus,
};
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

fn arb_instant() -> impl Strategy<Value = chrono::DateTime<Utc>> {
    // Seconds across several decades, any time of day.
    (946_684_800i64..=2_000_000_000).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

proptest! {
    #[test]
    fn visit_closes_gate_for_that_local_date(now in arb_instant(), id in "[a-z-]{1,12}") {
        let mut progress = InvestigationProgress::new(new_entity_id(), now);
        record_visit(&mut progress, &id, now).unwrap();

        let today = local_date(now);
        prop_assert!(!can_visit(&progress, &id, today));
        prop_assert!(can_visit(&progress, &id, today + Duration::days(1)));
        // Other subjects are unaffected.
        prop_assert!(can_visit(&progress, "someone-else", today));
    }

    #[test]
    fn interrogation_closes_gate_for_that_local_date(now in arb_instant(), name in "[A-Za-z ]{1,16}") {
        let mut progress = InvestigationProgress::new(new_entity_id(), now);
        record_interrogation(&mut progress, &name, vec!["q".into()], vec!["a".into()], now).unwrap();

        let today = local_date(now);
        prop_assert!(!can_interrogate(&progress, &name, today));
        prop_assert!(can_interrogate(&progress, &name, today + Duration::days(1)));
    }

    #[test]
    fn second_same_day_visit_never_mutates(now in arb_instant(), id in "[a-z-]{1,12}", offset_mins in 0i64..600) {
        let mut progress = InvestigationProgress::new(new_entity_id(), now);
        record_visit(&mut progress, &id, now).unwrap();
        let snapshot = progress.clone();

        let later = now + Duration::minutes(offset_mins);
        if local_date(later) == local_date(now) {
            prop_assert!(record_visit(&mut progress, &id, later).is_err());
            prop_assert_eq!(&progress, &snapshot);
        } else {
            // Date rolled over: the gate reopens instead.
            prop_assert!(record_visit(&mut progress, &id, later).is_ok());
        }
    }

    #[test]
    fn revision_counts_successful_mutations(now in arb_instant(), ids in prop::collection::vec("[a-z]{1,8}", 1..8)) {
        let mut progress = InvestigationProgress::new(new_entity_id(), now);
        let mut expected = 0i64;
        for id in &ids {
            if record_visit(&mut progress, id, now).is_ok() {
                expected += 1;
            }
            if discover_clue(&mut progress, id) {
                expected += 1;
            }
        }
        prop_assert_eq!(progress.revision, expected);
    }

    #[test]
    fn discovered_clues_only_grow(ids in prop::collection::vec("[a-z]{1,6}", 0..16)) {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let mut progress = InvestigationProgress::new(new_entity_id(), now);
        let mut previous_len = 0;
        for id in &ids {
            discover_clue(&mut progress, id);
            prop_assert!(progress.discovered_clues.len() >= previous_len);
            previous_len = progress.discovered_clues.len();
            prop_assert!(progress.discovered_clues.contains(id.as_str()));
        }
    }
}

#[test]
fn terminal_operation_statuses_have_no_outgoing_transitions() {
    use OperationStatus::*;
    for terminal in [Completed, Failed] {
        for target in [Queued, Processing, Completed, Failed] {
            assert!(!terminal.can_transition_to(target));
        }
    }
}
