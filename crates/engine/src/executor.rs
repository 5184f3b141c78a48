// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent executor: the full wrapper stack around one agent invocation.
//!
//! Order of wrapping: input contract -> capability-scoped context ->
//! deadline -> provenance policy -> output contract -> classification.
//! Retryable failures loop with backoff up to the retry ceiling and then
//! dead-letter; skippable failures return to the caller for per-unit
//! bookkeeping; fatal failures abort the enclosing phase.

use crate::{DeadLetterSink, ExecError};
use scout_agents::{check_provenance, AgentContext, AgentRegistry};
use scout_contracts::Validator;
use scout_core::{AgentResult, AgentTask, ErrorKind, Metrics, SharedClock};
use scout_http::RetryPolicy;
use std::sync::Arc;
use tokio::sync::Semaphore;

pub struct AgentExecutor {
    registry: AgentRegistry,
    validator: Arc<Validator>,
    base_ctx: AgentContext,
    retry: RetryPolicy,
    dlq: DeadLetterSink,
    metrics: Metrics,
    clock: SharedClock,
}

impl AgentExecutor {
    pub fn new(
        registry: AgentRegistry,
        validator: Arc<Validator>,
        base_ctx: AgentContext,
        retry: RetryPolicy,
        dlq: DeadLetterSink,
        metrics: Metrics,
        clock: SharedClock,
    ) -> Self {
        Self { registry, validator, base_ctx, retry, dlq, metrics, clock }
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Rebind the execution context to a job before a run starts.
    pub fn bind_job(&mut self, job_id: scout_core::JobId) {
        self.base_ctx = self.base_ctx.for_job(job_id);
    }

    /// Run one agent task through the wrapper stack.
    pub async fn spawn(&self, agent_name: &str, task: AgentTask) -> Result<AgentResult, ExecError> {
        let task_key = task.task_key();

        let Some(agent) = self.registry.create(agent_name) else {
            let error = ExecError::new(
                ErrorKind::Config,
                agent_name,
                &task_key,
                format!("unknown agent {agent_name}"),
            );
            self.finish(&error.kind, agent_name, &task_key, &error.message);
            return Err(error);
        };

        // Input gate. Soft mode logs inside the validator; strict mode is
        // a terminal failure with replay context in the DLQ.
        match self.validator.enforce(agent.input_schema_id(), &task.payload) {
            Ok(Ok(())) => {}
            Ok(Err(failure)) => {
                self.metrics.inc("schema_violations_total", &[("agent", agent_name)]);
                let error = ExecError::new(
                    ErrorKind::SchemaViolation,
                    agent_name,
                    &task_key,
                    failure.to_string(),
                );
                self.dlq.push(&task, error.kind, &error.message, task.attempt);
                self.finish(&error.kind, agent_name, &task_key, &error.message);
                return Err(error);
            }
            Err(registry_error) => {
                let error = ExecError::new(
                    ErrorKind::Config,
                    agent_name,
                    &task_key,
                    registry_error.to_string(),
                );
                self.finish(&error.kind, agent_name, &task_key, &error.message);
                return Err(error);
            }
        }

        let ctx = self.base_ctx.for_agent(agent.as_ref());
        let mut attempt_task = task;

        loop {
            let started = self.clock.now();
            let outcome =
                tokio::time::timeout(attempt_task.deadline, agent.execute(&attempt_task, &ctx))
                    .await;
            let duration_ms =
                self.clock.now().saturating_duration_since(started).as_millis() as u64;

            let error = match outcome {
                Ok(Ok(output)) => {
                    match self.gate_output(agent_name, agent.output_schema_id(), &task_key, &output)
                    {
                        Ok(()) => {
                            self.metrics
                                .inc("agent_invocations_total", &[("outcome", "success")]);
                            return Ok(AgentResult {
                                success: true,
                                output,
                                errors: Vec::new(),
                                duration_ms,
                            });
                        }
                        Err(error) => {
                            if error.kind == ErrorKind::SchemaViolation {
                                // Strict contract rejection is terminal.
                                self.dlq.push(
                                    &attempt_task,
                                    error.kind,
                                    &error.message,
                                    attempt_task.attempt,
                                );
                            }
                            self.finish(&error.kind, agent_name, &task_key, &error.message);
                            return Err(error);
                        }
                    }
                }
                Ok(Err(agent_error)) => {
                    if matches!(agent_error, scout_agents::AgentError::Policy { .. }) {
                        self.metrics.inc("policy_violations_total", &[("agent", agent_name)]);
                    }
                    ExecError::new(
                        agent_error.kind(),
                        agent_name,
                        &task_key,
                        agent_error.to_string(),
                    )
                }
                Err(_elapsed) => ExecError::new(
                    ErrorKind::Transient,
                    agent_name,
                    &task_key,
                    format!("deadline of {}ms exceeded", attempt_task.deadline.as_millis()),
                ),
            };

            if error.kind.is_retryable() && attempt_task.attempt <= self.retry.max_retries {
                let delay = self.retry.jittered_delay(attempt_task.attempt - 1);
                tracing::warn!(
                    error_kind = %error.kind,
                    agent = agent_name,
                    task_key,
                    attempt = attempt_task.attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retryable agent failure, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt_task = attempt_task.next_attempt();
                continue;
            }

            if error.kind.is_retryable() {
                // Retries exhausted: dead-letter with replay context.
                self.dlq.push(&attempt_task, error.kind, &error.message, attempt_task.attempt);
            }
            self.finish(&error.kind, agent_name, &task_key, &error.message);
            return Err(error);
        }
    }

    /// Run many tasks of one agent type, bounded by a semaphore.
    ///
    /// Results come back in input order; a failing task never cancels
    /// its peers.
    pub async fn spawn_parallel(
        &self,
        agent_name: &str,
        tasks: Vec<AgentTask>,
        max_concurrent: usize,
    ) -> Vec<Result<AgentResult, ExecError>> {
        let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
        let runs = tasks.into_iter().map(|task| {
            let semaphore = semaphore.clone();
            async move {
                // Closed only on runtime teardown.
                let _permit = semaphore.acquire().await;
                self.spawn(agent_name, task).await
            }
        });
        futures::future::join_all(runs).await
    }

    /// Output-side gates: provenance policy, then the output contract.
    fn gate_output(
        &self,
        agent_name: &str,
        output_schema_id: &str,
        task_key: &str,
        output: &serde_json::Value,
    ) -> Result<(), ExecError> {
        if let Err(violation) = check_provenance(agent_name, output) {
            self.metrics.inc("policy_violations_total", &[("agent", agent_name)]);
            return Err(ExecError::new(
                ErrorKind::Forbidden,
                agent_name,
                task_key,
                violation.to_string(),
            ));
        }

        match self.validator.enforce(output_schema_id, output) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(failure)) => {
                self.metrics.inc("schema_violations_total", &[("agent", agent_name)]);
                Err(ExecError::new(
                    ErrorKind::SchemaViolation,
                    agent_name,
                    task_key,
                    failure.to_string(),
                ))
            }
            Err(registry_error) => Err(ExecError::new(
                ErrorKind::Config,
                agent_name,
                task_key,
                registry_error.to_string(),
            )),
        }
    }

    /// Contracted terminal log line plus the outcome counter.
    fn finish(&self, kind: &ErrorKind, agent: &str, task_key: &str, message: &str) {
        let outcome = if kind.is_skippable() {
            "skipped"
        } else if kind.is_fatal() {
            "fatal"
        } else {
            "failed"
        };
        self.metrics.inc("agent_invocations_total", &[("outcome", outcome)]);
        tracing::warn!(error_kind = %kind, agent, task_key, outcome, "{message}");
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
