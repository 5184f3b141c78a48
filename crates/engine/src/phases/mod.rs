// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-phase handlers.
//!
//! Each handler consumes its phase-progress cursor to skip work already
//! done, merges agent deltas into the buckets (the orchestrator is the
//! only bucket writer), and checkpoints every `checkpoint_interval`
//! completed items.

pub(crate) mod classification;
pub(crate) mod discovery;
pub(crate) mod enrichment;
pub(crate) mod export;
pub(crate) mod extraction;
pub(crate) mod gatekeeper;
pub(crate) mod graph;
pub(crate) mod init;
pub(crate) mod monitor;
pub(crate) mod resolution;
pub(crate) mod validation;

use crate::{AgentExecutor, EngineError, ExecError, PipelineConfig};
use scout_agents::SecretStore;
use scout_core::{AgentResult, AgentTask, ErrorRecord, Metrics, Phase, SharedClock};
use scout_storage::{PipelineState, StateStore};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Everything a phase handler can touch.
pub(crate) struct PhaseCx<'a> {
    pub state: &'a mut PipelineState,
    pub executor: &'a AgentExecutor,
    pub store: &'a StateStore,
    pub config: &'a PipelineConfig,
    pub clock: &'a SharedClock,
    pub metrics: &'a Metrics,
    pub secrets: &'a Arc<SecretStore>,
    pub data_root: &'a Path,
    pub dry_run: bool,
    pub shutdown: &'a Arc<AtomicBool>,
    pub completed_items: u64,
    pub checkpoint_seq: &'a mut u64,
}

impl PhaseCx<'_> {
    pub fn epoch_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }

    pub fn interrupted(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Run one agent task. Fatal errors abort the phase; anything else
    /// is recorded on the state and reported as `None` so the handler
    /// skips the unit and continues.
    pub async fn run_agent(
        &mut self,
        agent_name: &str,
        payload: serde_json::Value,
    ) -> Result<Option<AgentResult>, EngineError> {
        let task = AgentTask::new(agent_name, payload)
            .with_deadline(Duration::from_secs(self.config.agent_timeout_secs));
        match self.executor.spawn(agent_name, task).await {
            Ok(result) => Ok(Some(result)),
            Err(error) if error.kind.is_fatal() => {
                Err(EngineError::PhaseFailed { phase: self.state.current_phase, source: error })
            }
            Err(error) => {
                self.record_skip(&error);
                Ok(None)
            }
        }
    }

    /// Record a skipped unit in the errors bucket.
    pub fn record_skip(&mut self, error: &ExecError) {
        let record = error_record(self.state.current_phase, error, self.clock);
        self.state.record_error(record, self.epoch_ms());
    }

    /// Count one completed item; checkpoint at the configured interval.
    pub fn item_done(&mut self) -> Result<(), EngineError> {
        self.completed_items += 1;
        let interval = self.config.checkpoint_interval.max(1);
        if self.completed_items % interval == 0 {
            *self.checkpoint_seq += 1;
            self.store.checkpoint(self.state, *self.checkpoint_seq)?;
        }
        Ok(())
    }
}

/// Error-bucket record for a classified failure.
pub(crate) fn error_record(phase: Phase, error: &ExecError, clock: &SharedClock) -> ErrorRecord {
    let seed = format!("{}:{}:{}", error.agent, error.task_key, clock.epoch_ms());
    ErrorRecord {
        id: format!("err-{}", &scout_core::content_hash(&seed)[..16]),
        phase,
        agent: error.agent.clone(),
        error_kind: error.kind,
        message: error.message.clone(),
        url: error.task_key.starts_with("http").then(|| error.task_key.clone()),
        occurred_at: clock.utc_now(),
    }
}
