// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup health summary, computed at `Init` and persisted to
//! `health_check.json`.
//!
//! Secrets are reported as present/absent booleans only; values never
//! appear in the summary or the logs.

use scout_agents::SecretStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Minimum free disk under the data root; below this, Init fails.
pub const MIN_FREE_DISK_BYTES: u64 = 1 << 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSummary {
    pub timestamp: String,
    pub job_id: String,
    pub associations: Vec<String>,
    /// Secret key -> present.
    pub secrets: BTreeMap<String, bool>,
    pub free_disk_bytes: Option<u64>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl HealthSummary {
    pub fn gather(
        job_id: &str,
        associations: &[String],
        secrets: &SecretStore,
        keys: impl IntoIterator<Item = String>,
        data_root: &Path,
        timestamp: String,
    ) -> Self {
        let mut summary = Self {
            timestamp,
            job_id: job_id.to_string(),
            associations: associations.to_vec(),
            secrets: BTreeMap::new(),
            free_disk_bytes: free_disk_bytes(data_root),
            warnings: Vec::new(),
        };

        for key in keys {
            let present = secrets.present(&key);
            if !present {
                summary.warnings.push(format!("secret {key} not configured"));
            }
            summary.secrets.insert(key, present);
        }

        if summary.free_disk_bytes.is_none() {
            summary.warnings.push("free disk could not be determined".to_string());
        }

        summary
    }

    /// Whether the disk floor is satisfied (unknown passes with a warning).
    pub fn disk_ok(&self) -> bool {
        self.free_disk_bytes.map(|bytes| bytes >= MIN_FREE_DISK_BYTES).unwrap_or(true)
    }
}

/// Free bytes on the filesystem holding `path`, via `df -Pk`.
///
/// POSIX `-P` output is one header line then one data line; the fourth
/// column is available 1K blocks.
fn free_disk_bytes(path: &Path) -> Option<u64> {
    let probe = nearest_existing(path)?;
    let output = std::process::Command::new("df").arg("-Pk").arg(&probe).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let data_line = text.lines().nth(1)?;
    let available_kb: u64 = data_line.split_whitespace().nth(3)?.parse().ok()?;
    Some(available_kb * 1024)
}

/// Walk up until a path that exists, so `df` works before the data root
/// has been created.
fn nearest_existing(path: &Path) -> Option<std::path::PathBuf> {
    let mut current = path.to_path_buf();
    loop {
        if current.exists() {
            return Some(current);
        }
        current = current.parent()?.to_path_buf();
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
