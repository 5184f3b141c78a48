// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn done_set_cursor_marks_and_checks() {
    let mut progress = PhaseProgress::default();
    let cursor = progress.cursor_mut(Phase::Discovery);
    assert!(!cursor.is_done("https://a.example"));
    cursor.mark("https://a.example");
    assert!(cursor.is_done("https://a.example"));
    assert_eq!(cursor.completed(), 1);
}

#[test]
fn enrichment_cursor_tracks_substeps_per_company() {
    let mut progress = PhaseProgress::default();
    let cursor = progress.cursor_mut(Phase::Enrichment);
    cursor.mark_substep("cmp-1", "firmographic");
    cursor.mark_substep("cmp-1", "tech_stack");
    cursor.mark_substep("cmp-2", "firmographic");

    assert!(cursor.is_substep_done("cmp-1", "firmographic"));
    assert!(cursor.is_substep_done("cmp-1", "tech_stack"));
    assert!(!cursor.is_substep_done("cmp-1", "contact_finder"));
    assert!(!cursor.is_substep_done("cmp-2", "tech_stack"));
    assert_eq!(cursor.completed(), 2);
}

#[test]
fn resolution_cursor_is_a_flag() {
    let mut progress = PhaseProgress::default();
    let cursor = progress.cursor_mut(Phase::Resolution);
    assert!(matches!(cursor, Cursor::Flag { done: false }));
    *cursor = Cursor::Flag { done: true };
    assert!(progress.cursor(Phase::Resolution).unwrap().is_done("anything"));
}

#[test]
fn graph_cursor_tracks_mined_companies_and_build_flag() {
    let mut progress = PhaseProgress::default();
    let cursor = progress.cursor_mut(Phase::Graph);
    cursor.mark("cmp-1");
    assert!(cursor.is_done("cmp-1"));
    assert!(!cursor.is_done("cmp-2"));
    if let Cursor::Graph { graph_built, .. } = cursor {
        *graph_built = true;
    }
    assert_eq!(progress.cursor(Phase::Graph).unwrap().completed(), 2);
}

#[test]
fn clear_removes_only_the_named_phase() {
    let mut progress = PhaseProgress::default();
    progress.cursor_mut(Phase::Discovery).mark("x");
    progress.cursor_mut(Phase::Gatekeeper).mark("d");
    progress.clear(Phase::Discovery);

    assert!(progress.cursor(Phase::Discovery).is_none());
    assert!(progress.cursor(Phase::Gatekeeper).is_some());
}

#[test]
fn cursor_serde_round_trips_through_tagged_json() {
    let mut progress = PhaseProgress::default();
    progress.cursor_mut(Phase::Enrichment).mark_substep("cmp-1", "firmographic");
    progress.cursor_mut(Phase::Discovery).mark("https://a.example");

    let json = serde_json::to_string(&progress).unwrap();
    assert!(json.contains("\"DISCOVERY\""));
    assert!(json.contains("\"kind\""));
    let back: PhaseProgress = serde_json::from_str(&json).unwrap();
    assert_eq!(back, progress);
}
