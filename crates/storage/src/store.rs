// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem persistence for pipeline state.
//!
//! Layout under the state root:
//!
//! ```text
//! <root>/.state/<job_id>/
//!     state.json                    # latest committed state
//!     state.json.tmp                # in-flight write (ignored on read)
//!     health_check.json             # startup health summary
//!     checkpoint_<phase>_<n>.json   # intra-phase snapshots
//! ```
//!
//! Writes are atomic: serialize to the temp file in the same directory,
//! fsync, then rename over the target. The rename is the commit point.

use crate::PipelineState;
use scout_core::Phase;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

const STATE_FILE: &str = "state.json";
const HEALTH_FILE: &str = "health_check.json";

/// Errors from state persistence.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown job {0}")]
    UnknownJob(String),
}

/// Listing entry for operator tooling.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct JobSummary {
    pub job_id: String,
    pub current_phase: Phase,
    pub associations: Vec<String>,
    pub updated_at_ms: u64,
    pub completed_at_ms: Option<u64>,
}

/// Store rooted at a data directory; state lives under `.state/`.
pub struct StateStore {
    state_root: PathBuf,
}

impl StateStore {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self { state_root: data_root.into().join(".state") }
    }

    pub fn job_dir(&self, job_id: &str) -> PathBuf {
        self.state_root.join(job_id)
    }

    fn state_path(&self, job_id: &str) -> PathBuf {
        self.job_dir(job_id).join(STATE_FILE)
    }

    /// Commit the latest state atomically.
    pub fn save(&self, state: &PipelineState) -> Result<(), StorageError> {
        let path = self.state_path(state.job_id.as_str());
        write_atomic(&path, &serde_json::to_vec_pretty(state)?)?;
        tracing::debug!(job_id = %state.job_id, phase = %state.current_phase, "state committed");
        Ok(())
    }

    /// Load the latest committed state. A leftover `state.json.tmp` from
    /// a torn write is ignored.
    pub fn load(&self, job_id: &str) -> Result<PipelineState, StorageError> {
        let path = self.state_path(job_id);
        if !path.exists() {
            return Err(StorageError::UnknownJob(job_id.to_string()));
        }
        let raw = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn exists(&self, job_id: &str) -> bool {
        self.state_path(job_id).exists()
    }

    /// Write an intra-phase snapshot alongside the main state file.
    pub fn checkpoint(&self, state: &PipelineState, sequence: u64) -> Result<(), StorageError> {
        self.save(state)?;
        let name = format!("checkpoint_{}_{}.json", state.current_phase, sequence);
        let path = self.job_dir(state.job_id.as_str()).join(name);
        write_atomic(&path, &serde_json::to_vec(state)?)?;
        Ok(())
    }

    /// Persist the startup health summary.
    pub fn save_health(&self, job_id: &str, health: &serde_json::Value) -> Result<(), StorageError> {
        let path = self.job_dir(job_id).join(HEALTH_FILE);
        write_atomic(&path, &serde_json::to_vec_pretty(health)?)?;
        Ok(())
    }

    /// All known jobs, newest first.
    pub fn list_jobs(&self) -> Result<Vec<JobSummary>, StorageError> {
        let mut jobs = Vec::new();
        let entries = match fs::read_dir(&self.state_root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(jobs),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            let job_id = entry.file_name().to_string_lossy().to_string();
            match self.load(&job_id) {
                Ok(state) => jobs.push(JobSummary {
                    job_id,
                    current_phase: state.current_phase,
                    associations: state.associations,
                    updated_at_ms: state.updated_at_ms,
                    completed_at_ms: state.completed_at_ms,
                }),
                Err(error) => {
                    tracing::warn!(job_id, error = %error, "unreadable job state skipped");
                }
            }
        }

        jobs.sort_by(|a, b| b.updated_at_ms.cmp(&a.updated_at_ms));
        Ok(jobs)
    }

    /// Remove every file belonging to a job.
    pub fn delete_job(&self, job_id: &str) -> Result<(), StorageError> {
        let dir = self.job_dir(job_id);
        if !dir.exists() {
            return Err(StorageError::UnknownJob(job_id.to_string()));
        }
        fs::remove_dir_all(dir)?;
        Ok(())
    }
}

/// Serialize to `<path>.tmp` in the target directory, fsync, rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parent dir"))?;
    fs::create_dir_all(parent)?;

    let tmp = path.with_extension(format!(
        "{}.tmp",
        path.extension().and_then(|e| e.to_str()).unwrap_or("json")
    ));
    {
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
