// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent task and result types.
//!
//! A task is immutable per attempt; the executor builds a fresh task with
//! an incremented `attempt` for each retry. Agents never see pipeline
//! state; the payload is the entire input, and the result's delta is the
//! entire output.

use serde::{Deserialize, Serialize};
use std::time::Duration;

crate::define_id! {
    /// Unique identifier for a pipeline job.
    pub struct JobId("job-");
}

crate::define_id! {
    /// Unique identifier for a single agent invocation (one attempt).
    pub struct InvocationId("inv-");
}

/// Capability an agent declares; checked by the policy middleware.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// May fetch arbitrary pages, subject to robots verdicts.
    Crawler,
    /// May call external enrichment APIs; calls are rate-limited and logged.
    Enricher,
    /// Requires the named secret to be resolvable.
    Secret(String),
}

/// One unit of work handed to an agent. Immutable per attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTask {
    pub agent_type: String,
    pub payload: serde_json::Value,
    pub attempt: u32,
    /// Upper bound on this invocation, enforced by the executor.
    #[serde(with = "duration_ms")]
    pub deadline: Duration,
}

impl AgentTask {
    pub fn new(agent_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            agent_type: agent_type.into(),
            payload,
            attempt: 1,
            deadline: Duration::from_secs(300),
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// The same task re-issued as the next attempt.
    pub fn next_attempt(&self) -> Self {
        let mut task = self.clone();
        task.attempt += 1;
        task
    }

    /// Best-effort human key for logs and DLQ entries.
    pub fn task_key(&self) -> String {
        self.payload
            .get("url")
            .or_else(|| self.payload.get("domain"))
            .or_else(|| self.payload.get("id"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}#{}", self.agent_type, self.attempt))
    }
}

/// Result of one agent invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub success: bool,
    pub output: serde_json::Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

impl AgentResult {
    pub fn ok(output: serde_json::Value) -> Self {
        Self { success: true, output, errors: Vec::new(), duration_ms: 0 }
    }
}

/// Value-typed state delta returned by an agent.
///
/// The orchestrator is the only writer of pipeline buckets; agents
/// propose, the orchestrator applies. Records are raw JSON here because
/// the target bucket depends on the phase doing the merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub new_records: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    pub updated_records_by_id: std::collections::BTreeMap<String, serde_json::Value>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.new_records.is_empty() && self.updated_records_by_id.is_empty()
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
