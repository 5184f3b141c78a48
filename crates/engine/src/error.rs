// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error types.

use scout_core::{ErrorKind, Phase};
use thiserror::Error;

/// A classified agent-invocation failure.
///
/// Carries the fields the error-handling contract requires in every log
/// line: kind, agent, and task key.
#[derive(Debug, Clone, Error)]
#[error("agent {agent} failed on {task_key} ({kind}): {message}")]
pub struct ExecError {
    pub kind: ErrorKind,
    pub agent: String,
    pub task_key: String,
    pub message: String,
}

impl ExecError {
    pub fn new(
        kind: ErrorKind,
        agent: impl Into<String>,
        task_key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self { kind, agent: agent.into(), task_key: task_key.into(), message: message.into() }
    }
}

/// Orchestrator-level failures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("phase {phase} aborted: {source}")]
    PhaseFailed { phase: Phase, source: ExecError },

    #[error("startup failed: {0}")]
    Startup(String),

    #[error("storage error: {0}")]
    Storage(#[from] scout_storage::StorageError),

    #[error("state error: {0}")]
    State(#[from] scout_storage::StateError),

    #[error("contract registry error: {0}")]
    Contracts(#[from] scout_contracts::SchemaError),
}
