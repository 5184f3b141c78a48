// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The phase engine: initialize or load state, advance phases in order,
//! merge agent deltas, checkpoint, and handle terminal failure.

use crate::phases::{self, PhaseCx};
use crate::{AgentExecutor, DeadLetterSink, EngineError, PipelineConfig};
use scout_agents::{AgentContext, AgentRegistry, SecretStore};
use scout_contracts::{Mode, SchemaRegistry, Validator};
use scout_core::{system_clock, JobId, Metrics, Phase, SharedClock};
use scout_http::{HttpCore, RateLimitConfig, RetryPolicy, Transport};
use scout_storage::{PipelineState, StateStore};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// How a run ended, mapped to the process exit code by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Reached `Done`. Exit 0.
    Completed,
    /// A phase aborted; state is `Failed`. Exit 2.
    Failed,
    /// Interrupted by signal after a graceful checkpoint. Exit 130.
    Interrupted,
}

pub struct Orchestrator {
    executor: AgentExecutor,
    store: StateStore,
    config: PipelineConfig,
    clock: SharedClock,
    metrics: Metrics,
    secrets: Arc<SecretStore>,
    data_root: PathBuf,
    dry_run: bool,
    shutdown: Arc<AtomicBool>,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    /// Shared flag a signal handler sets to request graceful shutdown.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub(crate) fn executor(&self) -> &AgentExecutor {
        &self.executor
    }

    pub(crate) fn executor_mut(&mut self) -> &mut AgentExecutor {
        &mut self.executor
    }

    pub(crate) fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub(crate) fn clock(&self) -> &SharedClock {
        &self.clock
    }

    pub(crate) fn data_root(&self) -> &std::path::Path {
        &self.data_root
    }

    pub(crate) fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Create a fresh state or load an existing one for `--resume`.
    pub fn load_or_create(
        &self,
        job_id: &JobId,
        associations: Vec<String>,
        resume: bool,
    ) -> Result<PipelineState, EngineError> {
        if resume {
            let mut state = self.store.load(job_id.as_str())?;
            // A failed job resumes by retrying the phase that failed.
            state.revive(self.clock.epoch_ms());
            tracing::info!(job_id = %job_id, phase = %state.current_phase, "resuming job");
            return Ok(state);
        }
        let state = PipelineState::new(job_id.clone(), associations, self.clock.epoch_ms());
        self.store.save(&state)?;
        Ok(state)
    }

    /// Drive the state machine until a terminal phase or interruption.
    pub async fn run(&mut self, state: &mut PipelineState) -> Result<RunOutcome, EngineError> {
        self.executor.bind_job(state.job_id.clone());
        let mut checkpoint_seq: u64 = 0;

        while !state.is_terminal() {
            if self.shutdown.load(Ordering::SeqCst) {
                self.store.save(state)?;
                tracing::info!(job_id = %state.job_id, "interrupted, state checkpointed");
                return Ok(RunOutcome::Interrupted);
            }

            let phase = state.current_phase;
            tracing::info!(job_id = %state.job_id, phase = %phase, "executing phase");
            let phase_start = self.clock.now();

            let result = self.execute_phase(state, phase, &mut checkpoint_seq).await;

            self.metrics.observe(
                "phase_duration_seconds",
                &[("phase", &phase.to_string())],
                self.clock.now().saturating_duration_since(phase_start),
            );

            match result {
                Ok(()) => {
                    if self.shutdown.load(Ordering::SeqCst) {
                        // Finish the phase bookkeeping on the next run.
                        self.store.save(state)?;
                        return Ok(RunOutcome::Interrupted);
                    }
                    let next = phase.successor().unwrap_or(Phase::Done);
                    state.transition_to(next, self.clock.epoch_ms())?;
                    self.store.save(state)?;
                }
                Err(EngineError::PhaseFailed { phase, source }) => {
                    tracing::error!(
                        job_id = %state.job_id,
                        phase = %phase,
                        error_kind = %source.kind,
                        agent = source.agent,
                        task_key = source.task_key,
                        "phase aborted"
                    );
                    state.record_error(
                        phases::error_record(state.current_phase, &source, &self.clock),
                        self.clock.epoch_ms(),
                    );
                    state.transition_to(Phase::Failed, self.clock.epoch_ms())?;
                    self.store.save(state)?;
                    return Ok(RunOutcome::Failed);
                }
                Err(other) => return Err(other),
            }
        }

        Ok(if state.current_phase == Phase::Done {
            RunOutcome::Completed
        } else {
            RunOutcome::Failed
        })
    }

    async fn execute_phase(
        &self,
        state: &mut PipelineState,
        phase: Phase,
        checkpoint_seq: &mut u64,
    ) -> Result<(), EngineError> {
        let mut cx = PhaseCx {
            state,
            executor: &self.executor,
            store: &self.store,
            config: &self.config,
            clock: &self.clock,
            metrics: &self.metrics,
            secrets: &self.secrets,
            data_root: &self.data_root,
            dry_run: self.dry_run,
            shutdown: &self.shutdown,
            completed_items: 0,
            checkpoint_seq,
        };

        match phase {
            Phase::Init => phases::init::run(&mut cx).await,
            Phase::Gatekeeper => phases::gatekeeper::run(&mut cx).await,
            Phase::Discovery => phases::discovery::run(&mut cx).await,
            Phase::Classification => phases::classification::run(&mut cx).await,
            Phase::Extraction => phases::extraction::run(&mut cx).await,
            Phase::Enrichment => phases::enrichment::run(&mut cx).await,
            Phase::Validation => phases::validation::run(&mut cx).await,
            Phase::Resolution => phases::resolution::run(&mut cx).await,
            Phase::Graph => phases::graph::run(&mut cx).await,
            Phase::Export => phases::export::run(&mut cx).await,
            Phase::Monitor => phases::monitor::run(&mut cx).await,
            Phase::Done | Phase::Failed => Ok(()),
        }
    }

}

/// Wires the component stack together.
pub struct OrchestratorBuilder {
    config: PipelineConfig,
    data_root: PathBuf,
    dry_run: bool,
    clock: Option<SharedClock>,
    metrics: Option<Metrics>,
    transport: Option<Arc<dyn Transport>>,
    secrets: Option<Arc<SecretStore>>,
    registry: Option<AgentRegistry>,
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self {
            config: PipelineConfig::default(),
            data_root: PathBuf::from("data"),
            dry_run: false,
            clock: None,
            metrics: None,
            transport: None,
            secrets: None,
            registry: None,
        }
    }
}

impl OrchestratorBuilder {
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn data_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.data_root = root.into();
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Override the wire transport (tests use the scripted transport).
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn secrets(mut self, secrets: Arc<SecretStore>) -> Self {
        self.secrets = Some(secrets);
        self
    }

    pub fn registry(mut self, registry: AgentRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<Orchestrator, EngineError> {
        let clock = self.clock.unwrap_or_else(system_clock);
        let metrics = self.metrics.unwrap_or_else(|| Metrics::global().clone());
        let secrets =
            self.secrets.unwrap_or_else(|| Arc::new(SecretStore::from_env(clock.clone())));

        let schemas = Arc::new(SchemaRegistry::builtin()?);
        let mode = if self.config.strict_validation { Mode::Strict } else { Mode::Soft };
        let validator = Arc::new(Validator::new(schemas, mode));

        let rate_config = RateLimitConfig {
            default_rate: self.config.default_rate,
            per_host: self.config.host_rates.clone().into_iter().collect(),
        };
        let mut http_builder = HttpCore::builder()
            .rate_config(rate_config)
            .metrics(metrics.clone())
            .clock(clock.clone());
        if let Some(transport) = self.transport {
            http_builder = http_builder.transport(transport);
        }
        let http = Arc::new(
            http_builder
                .build()
                .map_err(|e| EngineError::Startup(format!("http core: {e}")))?,
        );

        let base_ctx = AgentContext::builder()
            .http(http)
            .secrets(secrets.clone())
            .clock(clock.clone())
            .data_root(&self.data_root)
            .dry_run(self.dry_run)
            .build()
            .map_err(|e| EngineError::Startup(format!("agent context: {e}")))?;

        let retry = RetryPolicy { max_retries: self.config.max_retries, ..RetryPolicy::default() };
        let dlq = DeadLetterSink::new(&self.data_root, clock.clone());
        let executor = AgentExecutor::new(
            self.registry.unwrap_or_else(AgentRegistry::builtin),
            validator,
            base_ctx,
            retry,
            dlq,
            metrics.clone(),
            clock.clone(),
        );

        Ok(Orchestrator {
            executor,
            store: StateStore::new(&self.data_root),
            config: self.config,
            clock,
            metrics,
            secrets,
            data_root: self.data_root,
            dry_run: self.dry_run,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
