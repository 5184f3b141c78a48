// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dead-letter sink: append-only record of tasks that failed past
//! retry exhaustion.
//!
//! Entries land in a per-day JSONL file. Writes are best-effort: a
//! failing sink logs an error and never fails the phase. Nothing is
//! replayed automatically; operator tooling reads the files and
//! re-enqueues by hand.

use scout_core::{AgentTask, ErrorKind, SharedClock};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;

/// One dead-lettered task with enough context to replay it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadLetterEntry {
    pub task: AgentTask,
    pub error_kind: ErrorKind,
    pub error: String,
    pub attempts: u32,
    pub last_seen: String,
}

/// Append-only sink under `<data_root>/dead_letter/`.
pub struct DeadLetterSink {
    dir: PathBuf,
    clock: SharedClock,
}

impl DeadLetterSink {
    pub fn new(data_root: impl Into<PathBuf>, clock: SharedClock) -> Self {
        Self { dir: data_root.into().join("dead_letter"), clock }
    }

    fn file_path(&self) -> PathBuf {
        let day = self.clock.utc_now().format("%Y%m%d");
        self.dir.join(format!("dlq_{day}.jsonl"))
    }

    /// Append an entry. Best-effort: failures are logged, not returned.
    pub fn push(&self, task: &AgentTask, error_kind: ErrorKind, error: &str, attempts: u32) {
        let entry = DeadLetterEntry {
            task: task.clone(),
            error_kind,
            error: error.to_string(),
            attempts,
            last_seen: self.clock.utc_now().to_rfc3339(),
        };

        if let Err(write_error) = self.append(&entry) {
            tracing::error!(
                agent = task.agent_type,
                task_key = task.task_key(),
                error = %write_error,
                "dead-letter write failed"
            );
        } else {
            tracing::warn!(
                agent = task.agent_type,
                task_key = task.task_key(),
                error_kind = %error_kind,
                attempts,
                "task dead-lettered"
            );
        }
    }

    fn append(&self, entry: &DeadLetterEntry) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let mut file =
            std::fs::OpenOptions::new().create(true).append(true).open(self.file_path())?;
        let line = serde_json::to_string(entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// All entries in today's file. Malformed lines are skipped.
    pub fn read_all(&self) -> Vec<DeadLetterEntry> {
        let Ok(content) = std::fs::read_to_string(self.file_path()) else {
            return Vec::new();
        };
        content.lines().filter_map(|line| serde_json::from_str(line).ok()).collect()
    }

    pub fn count(&self) -> usize {
        self.read_all().len()
    }
}

#[cfg(test)]
#[path = "dead_letter_tests.rs"]
mod tests;
