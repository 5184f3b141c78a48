// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline configuration.
//!
//! A plain serde struct; how it gets populated (file, flags, defaults)
//! is the caller's concern.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One source group: where its site lives and how important it is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationConfig {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory_url: Option<String>,
    /// "high" seeds with a larger queue priority.
    #[serde(default)]
    pub priority: Option<String>,
}

/// Tunables for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Known source groups by code.
    pub associations: BTreeMap<String, AssociationConfig>,
    /// Default per-host request rate (requests/second).
    pub default_rate: f64,
    /// Per-host rate overrides; subdomains inherit the parent entry.
    pub host_rates: BTreeMap<String, f64>,
    /// Completed items between intra-phase checkpoints.
    pub checkpoint_interval: u64,
    /// Upper bound on pages fetched in Discovery.
    pub max_pages: usize,
    /// Parallel-dispatch ceiling per agent type.
    pub max_concurrent: usize,
    /// Per-agent-task deadline in seconds.
    pub agent_timeout_secs: u64,
    /// Retry ceiling for retryable agent failures.
    pub max_retries: u32,
    /// Strict contract enforcement at agent boundaries.
    pub strict_validation: bool,
    /// Quality floor for company exports.
    pub min_quality: u8,
    /// Companies mined for signals in the Graph phase.
    pub max_signal_sources: usize,
    /// Directory URLs baselined in the Monitor phase.
    pub max_baseline_urls: usize,
    /// Secrets that must resolve for enrichment to run at all; missing
    /// ones fail startup when enrichment is scheduled.
    pub mandatory_secrets: Vec<String>,
    /// Secrets that improve coverage but may be absent.
    pub optional_secrets: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            associations: BTreeMap::new(),
            default_rate: 1.0,
            host_rates: BTreeMap::new(),
            checkpoint_interval: 50,
            max_pages: 500,
            max_concurrent: 5,
            agent_timeout_secs: 300,
            max_retries: 3,
            strict_validation: false,
            min_quality: 60,
            max_signal_sources: 100,
            max_baseline_urls: 20,
            mandatory_secrets: Vec::new(),
            optional_secrets: vec![
                "CLEARBIT_API_KEY".to_string(),
                "APOLLO_API_KEY".to_string(),
            ],
        }
    }
}

impl PipelineConfig {
    /// Seed priority for an association's entry URL.
    pub fn seed_priority(&self, code: &str) -> i32 {
        match self.associations.get(code).and_then(|a| a.priority.as_deref()) {
            Some("high") => 10,
            _ => 5,
        }
    }
}
