// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable working set of one job.
//!
//! Ownership is single-writer: only the orchestrator mutates a
//! `PipelineState`. Agents receive payload copies and return deltas.
//! Once the state reaches a terminal phase, buckets are frozen: the
//! mutating methods reject further changes.

use crate::{Bucket, PhaseProgress};
use scout_core::{
    AccessVerdict, BlockedUrl, CanonicalEntity, Company, ErrorRecord, EventRecord, ExportArtifact,
    GraphEdge, JobId, PageSnapshot, Participant, Phase, PhaseOutcome, PhaseRecord, QueueEntry,
    Signal, VisitedUrl,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Checkpoint schema version.
pub const STATE_VERSION: u32 = 1;

/// Errors from state-machine misuse.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("illegal phase transition {from} -> {to}")]
    IllegalTransition { from: Phase, to: Phase },
    #[error("state is terminal ({0}); buckets are frozen")]
    Frozen(Phase),
}

/// The named record buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Buckets {
    #[serde(default)]
    pub crawl_queue: Bucket<QueueEntry>,
    #[serde(default)]
    pub visited_urls: Bucket<VisitedUrl>,
    #[serde(default)]
    pub blocked_urls: Bucket<BlockedUrl>,
    #[serde(default)]
    pub pages: Bucket<PageSnapshot>,
    #[serde(default)]
    pub verdicts: Bucket<AccessVerdict>,
    #[serde(default)]
    pub companies: Bucket<Company>,
    #[serde(default)]
    pub events: Bucket<EventRecord>,
    #[serde(default)]
    pub participants: Bucket<Participant>,
    #[serde(default)]
    pub competitor_signals: Bucket<Signal>,
    #[serde(default)]
    pub canonical_entities: Bucket<CanonicalEntity>,
    #[serde(default)]
    pub graph_edges: Bucket<GraphEdge>,
    #[serde(default)]
    pub exports: Bucket<ExportArtifact>,
    #[serde(default)]
    pub errors: Bucket<ErrorRecord>,
}

/// Aggregate counters derived during execution. Counts live here,
/// never as scalar stand-ins inside a bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    #[serde(default)]
    pub total_urls_discovered: u64,
    #[serde(default)]
    pub total_pages_fetched: u64,
    #[serde(default)]
    pub total_companies_extracted: u64,
    #[serde(default)]
    pub total_events_extracted: u64,
    #[serde(default)]
    pub total_participants_extracted: u64,
    #[serde(default)]
    pub total_signals_detected: u64,
    #[serde(default)]
    pub total_entities_resolved: u64,
}

/// Complete pipeline state for checkpoint and resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    pub version: u32,
    pub job_id: JobId,
    #[serde(default)]
    pub associations: Vec<String>,
    pub current_phase: Phase,
    #[serde(default)]
    pub phase_history: Vec<PhaseRecord>,
    #[serde(default)]
    pub phase_progress: PhaseProgress,
    #[serde(default)]
    pub buckets: Buckets,
    #[serde(default)]
    pub counters: Counters,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
}

impl PipelineState {
    pub fn new(job_id: JobId, associations: Vec<String>, epoch_ms: u64) -> Self {
        Self {
            version: STATE_VERSION,
            job_id,
            associations,
            current_phase: Phase::Init,
            phase_history: vec![PhaseRecord::entered(Phase::Init, epoch_ms)],
            phase_progress: PhaseProgress::default(),
            buckets: Buckets::default(),
            counters: Counters::default(),
            created_at_ms: epoch_ms,
            updated_at_ms: epoch_ms,
            completed_at_ms: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.current_phase.is_terminal()
    }

    /// Advance the phase machine.
    ///
    /// Closes the current history record, clears the exited phase's
    /// cursor, and opens a record for the new phase. Transition to
    /// `Failed` marks the old record failed; everything else marks it
    /// completed.
    pub fn transition_to(&mut self, next: Phase, epoch_ms: u64) -> Result<(), StateError> {
        if !self.current_phase.can_transition(next) {
            return Err(StateError::IllegalTransition { from: self.current_phase, to: next });
        }

        let outcome =
            if next == Phase::Failed { PhaseOutcome::Failed } else { PhaseOutcome::Completed };
        if let Some(record) = self.phase_history.last_mut() {
            record.finish(outcome, epoch_ms);
        }
        self.phase_progress.clear(self.current_phase);

        self.current_phase = next;
        self.phase_history.push(PhaseRecord::entered(next, epoch_ms));
        self.updated_at_ms = epoch_ms;
        if next.is_terminal() {
            self.completed_at_ms = Some(epoch_ms);
        }

        tracing::info!(job_id = %self.job_id, phase = %next, "phase transition");
        Ok(())
    }

    /// Reopen a job that previously ended in `Failed`: rewind to the
    /// phase that failed so `--resume` can retry it. This is a load-time
    /// recovery operation, not a state-machine edge.
    pub fn revive(&mut self, epoch_ms: u64) -> bool {
        if self.current_phase != Phase::Failed {
            return false;
        }
        let Some(failed_phase) = self
            .phase_history
            .iter()
            .rev()
            .find(|record| record.outcome == PhaseOutcome::Failed && record.phase != Phase::Failed)
            .map(|record| record.phase)
        else {
            return false;
        };

        self.current_phase = failed_phase;
        self.phase_history.push(PhaseRecord::entered(failed_phase, epoch_ms));
        self.completed_at_ms = None;
        self.updated_at_ms = epoch_ms;
        tracing::info!(job_id = %self.job_id, phase = %failed_phase, "failed job revived");
        true
    }

    fn check_mutable(&self) -> Result<(), StateError> {
        if self.is_terminal() {
            return Err(StateError::Frozen(self.current_phase));
        }
        Ok(())
    }

    /// Add a URL to the crawl queue unless it was already seen.
    pub fn enqueue_url(&mut self, entry: QueueEntry, epoch_ms: u64) -> Result<bool, StateError> {
        self.check_mutable()?;
        let url = entry.url.clone();
        if self.buckets.visited_urls.contains(&url)
            || self.buckets.blocked_urls.contains(&url)
            || self.buckets.crawl_queue.contains(&url)
        {
            return Ok(false);
        }
        self.buckets.crawl_queue.insert(entry);
        self.counters.total_urls_discovered += 1;
        self.updated_at_ms = epoch_ms;
        Ok(true)
    }

    pub fn mark_visited(&mut self, url: &str, visited_at: chrono::DateTime<chrono::Utc>, epoch_ms: u64) -> Result<(), StateError> {
        self.check_mutable()?;
        if self.buckets.visited_urls.insert(VisitedUrl { url: url.to_string(), visited_at }) {
            self.counters.total_pages_fetched += 1;
        }
        self.updated_at_ms = epoch_ms;
        Ok(())
    }

    pub fn mark_blocked(&mut self, url: &str, reason: &str, blocked_at: chrono::DateTime<chrono::Utc>, epoch_ms: u64) -> Result<(), StateError> {
        self.check_mutable()?;
        self.buckets.blocked_urls.insert(BlockedUrl {
            url: url.to_string(),
            reason: reason.to_string(),
            blocked_at,
        });
        self.updated_at_ms = epoch_ms;
        Ok(())
    }

    pub fn record_error(&mut self, error: ErrorRecord, epoch_ms: u64) {
        // Error records are the one append allowed on the way into
        // Failed; they never apply to an already-terminal state.
        if self.is_terminal() {
            return;
        }
        self.buckets.errors.insert(error);
        self.updated_at_ms = epoch_ms;
    }

    /// One-line status summary for logs and `list_jobs`.
    pub fn summary(&self) -> String {
        format!(
            "{} phase={} queue={} visited={} companies={} events={} entities={} errors={}",
            self.job_id,
            self.current_phase,
            self.buckets.crawl_queue.len(),
            self.buckets.visited_urls.len(),
            self.buckets.companies.len(),
            self.buckets.events.len(),
            self.buckets.canonical_entities.len(),
            self.buckets.errors.len(),
        )
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
