// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use proptest::prelude::*;
use scout_core::Phase;

fn ts() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn new_state() -> PipelineState {
    PipelineState::new(JobId::from_string("job-state-test"), vec!["pma".to_string()], 1000)
}

#[test]
fn new_state_starts_at_init() {
    let state = new_state();
    assert_eq!(state.current_phase, Phase::Init);
    assert_eq!(state.phase_history.len(), 1);
    assert!(!state.is_terminal());
}

#[test]
fn forward_transitions_walk_the_full_order() {
    let mut state = new_state();
    let mut epoch = 1000;
    while let Some(next) = state.current_phase.successor() {
        epoch += 100;
        state.transition_to(next, epoch).unwrap();
    }
    assert_eq!(state.current_phase, Phase::Done);
    assert_eq!(state.completed_at_ms, Some(epoch));
    // Every closed record completed successfully
    for record in &state.phase_history[..state.phase_history.len() - 1] {
        assert_eq!(record.outcome, PhaseOutcome::Completed);
    }
}

#[test]
fn illegal_transitions_are_rejected() {
    let mut state = new_state();
    let err = state.transition_to(Phase::Extraction, 2000).unwrap_err();
    assert!(matches!(err, StateError::IllegalTransition { .. }));
    assert_eq!(state.current_phase, Phase::Init);
}

#[test]
fn failed_is_reachable_and_terminal() {
    let mut state = new_state();
    state.transition_to(Phase::Gatekeeper, 2000).unwrap();
    state.transition_to(Phase::Failed, 3000).unwrap();
    assert!(state.is_terminal());
    assert!(state.transition_to(Phase::Discovery, 4000).is_err());

    let failed_record = &state.phase_history[state.phase_history.len() - 2];
    assert_eq!(failed_record.phase, Phase::Gatekeeper);
    assert_eq!(failed_record.outcome, PhaseOutcome::Failed);
}

#[test]
fn terminal_state_freezes_buckets() {
    let mut state = new_state();
    state.transition_to(Phase::Failed, 2000).unwrap();
    let err = state.enqueue_url(QueueEntry::new("https://late.example"), 3000).unwrap_err();
    assert!(matches!(err, StateError::Frozen(Phase::Failed)));
    assert!(state.mark_visited("https://late.example", ts(), 3000).is_err());
}

#[test]
fn cursor_cleared_on_phase_exit() {
    let mut state = new_state();
    state.transition_to(Phase::Gatekeeper, 2000).unwrap();
    state.phase_progress.cursor_mut(Phase::Gatekeeper).mark("pma.example");
    state.transition_to(Phase::Discovery, 3000).unwrap();

    // Invariant: phase_progress[p] empty whenever current_phase != p
    assert!(state.phase_progress.cursor(Phase::Gatekeeper).is_none());
}

#[test]
fn enqueue_dedupes_against_queue_visited_and_blocked() {
    let mut state = new_state();
    assert!(state.enqueue_url(QueueEntry::new("https://a.example"), 1100).unwrap());
    assert!(!state.enqueue_url(QueueEntry::new("https://a.example"), 1200).unwrap());

    state.mark_visited("https://b.example", ts(), 1300).unwrap();
    assert!(!state.enqueue_url(QueueEntry::new("https://b.example"), 1400).unwrap());

    state.mark_blocked("https://c.example", "robots", ts(), 1500).unwrap();
    assert!(!state.enqueue_url(QueueEntry::new("https://c.example"), 1600).unwrap());

    assert_eq!(state.counters.total_urls_discovered, 1);
}

#[test]
fn mark_visited_counts_each_url_once() {
    let mut state = new_state();
    state.mark_visited("https://a.example", ts(), 1100).unwrap();
    state.mark_visited("https://a.example", ts(), 1200).unwrap();
    assert_eq!(state.counters.total_pages_fetched, 1);
}

#[test]
fn revive_rewinds_to_the_failed_phase() {
    let mut state = new_state();
    state.transition_to(Phase::Gatekeeper, 2000).unwrap();
    state.transition_to(Phase::Discovery, 3000).unwrap();
    state.transition_to(Phase::Failed, 4000).unwrap();

    assert!(state.revive(5000));
    assert_eq!(state.current_phase, Phase::Discovery);
    assert!(!state.is_terminal());
    assert!(state.completed_at_ms.is_none());
}

#[test]
fn revive_is_a_no_op_on_live_jobs() {
    let mut state = new_state();
    assert!(!state.revive(2000));
    assert_eq!(state.current_phase, Phase::Init);
}

#[test]
fn serde_round_trip_preserves_everything() {
    let mut state = new_state();
    state.transition_to(Phase::Gatekeeper, 2000).unwrap();
    state.enqueue_url(QueueEntry::new("https://a.example"), 2100).unwrap();
    state.phase_progress.cursor_mut(Phase::Gatekeeper).mark("pma.example");
    state.buckets.companies.insert(scout_core::Company::new("cmp-1", "Acme"));

    let json = serde_json::to_string_pretty(&state).unwrap();
    let back: PipelineState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, state);
}

#[test]
fn checkpoint_schema_has_the_stable_top_level_keys() {
    let state = new_state();
    let value = serde_json::to_value(&state).unwrap();
    for key in ["version", "job_id", "current_phase", "phase_history", "phase_progress", "buckets", "counters"]
    {
        assert!(value.get(key).is_some(), "missing top-level key {key}");
    }
    assert_eq!(value["version"], 1);
}

proptest! {
    // Round-trip law: deserialize(serialize(S)) == S for reachable states.
    #[test]
    fn serde_round_trip_over_generated_states(
        steps in 0usize..11,
        urls in proptest::collection::vec("[a-z]{3,10}", 0..20),
        cursor_keys in proptest::collection::vec("[a-z]{3,10}", 0..10),
    ) {
        let mut state = new_state();
        let mut epoch = 1000;
        for _ in 0..steps {
            if let Some(next) = state.current_phase.successor() {
                epoch += 10;
                state.transition_to(next, epoch).unwrap();
            }
        }
        if !state.is_terminal() {
            for url in &urls {
                epoch += 1;
                let _ = state.enqueue_url(
                    QueueEntry::new(format!("https://{url}.example")), epoch);
            }
            let phase = state.current_phase;
            for key in &cursor_keys {
                match phase {
                    Phase::Enrichment => state
                        .phase_progress
                        .cursor_mut(phase)
                        .mark_substep(key, "firmographic"),
                    Phase::Resolution => {}
                    _ => state.phase_progress.cursor_mut(phase).mark(key),
                }
            }
        }

        let json = serde_json::to_string(&state).unwrap();
        let back: PipelineState = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, state);
    }
}
