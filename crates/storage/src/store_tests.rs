// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::PipelineState;
use scout_core::JobId;

fn state(job: &str) -> PipelineState {
    PipelineState::new(JobId::from_string(job), vec!["pma".to_string()], 1000)
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());
    let mut saved = state("job-a");
    saved.transition_to(Phase::Gatekeeper, 2000).unwrap();

    store.save(&saved).unwrap();
    let loaded = store.load("job-a").unwrap();
    assert_eq!(loaded, saved);
}

#[test]
fn save_commits_via_rename_leaving_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());
    store.save(&state("job-a")).unwrap();

    let job_dir = store.job_dir("job-a");
    assert!(job_dir.join("state.json").exists());
    assert!(!job_dir.join("state.json.tmp").exists());
}

#[test]
fn load_ignores_a_leftover_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());
    let saved = state("job-a");
    store.save(&saved).unwrap();

    // Simulate a torn write from a previous crash.
    std::fs::write(store.job_dir("job-a").join("state.json.tmp"), "{ partial").unwrap();
    let loaded = store.load("job-a").unwrap();
    assert_eq!(loaded, saved);
}

#[test]
fn unknown_job_is_a_typed_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());
    assert!(matches!(store.load("job-missing"), Err(StorageError::UnknownJob(_))));
    assert!(!store.exists("job-missing"));
}

#[test]
fn checkpoint_writes_phase_tagged_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());
    let mut snapshot = state("job-a");
    snapshot.transition_to(Phase::Gatekeeper, 2000).unwrap();
    snapshot.transition_to(Phase::Discovery, 3000).unwrap();

    store.checkpoint(&snapshot, 50).unwrap();
    store.checkpoint(&snapshot, 100).unwrap();

    let job_dir = store.job_dir("job-a");
    assert!(job_dir.join("checkpoint_DISCOVERY_50.json").exists());
    assert!(job_dir.join("checkpoint_DISCOVERY_100.json").exists());
    // The main state file is committed alongside every checkpoint
    assert_eq!(store.load("job-a").unwrap(), snapshot);
}

#[test]
fn health_summary_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());
    store
        .save_health("job-a", &serde_json::json!({"job_id": "job-a", "free_disk_bytes": 123}))
        .unwrap();
    let raw = std::fs::read_to_string(store.job_dir("job-a").join("health_check.json")).unwrap();
    assert!(raw.contains("free_disk_bytes"));
}

#[test]
fn list_jobs_orders_by_recency_and_skips_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());

    let mut older = state("job-old");
    older.updated_at_ms = 1000;
    store.save(&older).unwrap();
    let mut newer = state("job-new");
    newer.updated_at_ms = 9000;
    store.save(&newer).unwrap();

    // A directory with an unreadable state file is skipped, not fatal.
    let garbage = dir.path().join(".state").join("job-garbage");
    std::fs::create_dir_all(&garbage).unwrap();
    std::fs::write(garbage.join("state.json"), "not json").unwrap();

    let jobs = store.list_jobs().unwrap();
    let ids: Vec<&str> = jobs.iter().map(|j| j.job_id.as_str()).collect();
    assert_eq!(ids, vec!["job-new", "job-old"]);
}

#[test]
fn delete_job_removes_the_whole_directory() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());
    let saved = state("job-a");
    store.save(&saved).unwrap();
    store.checkpoint(&saved, 1).unwrap();

    store.delete_job("job-a").unwrap();
    assert!(!store.job_dir("job-a").exists());
    assert!(matches!(store.delete_job("job-a"), Err(StorageError::UnknownJob(_))));
}

#[test]
fn kill_between_checkpoints_resumes_from_the_last_commit() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());

    let mut running = state("job-a");
    running.transition_to(Phase::Gatekeeper, 2000).unwrap();
    running.phase_progress.cursor_mut(Phase::Gatekeeper).mark("pma.example");
    store.save(&running).unwrap();

    // Work after the commit is lost by the "crash"...
    running.phase_progress.cursor_mut(Phase::Gatekeeper).mark("socma.example");

    // ...and resume sees exactly the committed cursor.
    let resumed = store.load("job-a").unwrap();
    let cursor = resumed.phase_progress.cursor(Phase::Gatekeeper).unwrap();
    assert!(cursor.is_done("pma.example"));
    assert!(!cursor.is_done("socma.example"));
}
