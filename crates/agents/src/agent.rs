// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The agent contract.

use crate::AgentContext;
use async_trait::async_trait;
use scout_core::{AgentTask, Capability, ErrorKind};
use scout_http::HttpError;
use thiserror::Error;

/// Errors an agent can surface. Each maps onto the pipeline taxonomy.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("http error: {0}")]
    Http(#[from] HttpError),

    #[error("invalid payload: {0}")]
    Payload(String),

    #[error("missing required secret {0}")]
    MissingSecret(String),

    #[error("page requires authentication: {0}")]
    AuthRequired(String),

    #[error("policy violation [{policy}]: {message}")]
    Policy { policy: &'static str, message: String },

    #[error("{0}")]
    Internal(String),
}

impl AgentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AgentError::Http(e) => e.kind(),
            AgentError::Payload(_) => ErrorKind::Parse,
            AgentError::MissingSecret(_) => ErrorKind::Config,
            AgentError::AuthRequired(_) => ErrorKind::Forbidden,
            AgentError::Policy { .. } => ErrorKind::Forbidden,
            AgentError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// A named, stateless worker.
///
/// Implementations read their entire input from the task payload and
/// return their entire output as one JSON document. Side channels are
/// logging and metrics only.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Hierarchical name, e.g. `discovery.site_mapper`. The prefix is the
    /// phase family.
    fn name(&self) -> &'static str;

    /// Identifier of the input contract, resolvable by the validator.
    fn input_schema_id(&self) -> &'static str;

    /// Identifier of the output contract.
    fn output_schema_id(&self) -> &'static str;

    /// Capabilities this agent needs; checked by the policy middleware.
    fn required_capabilities(&self) -> Vec<Capability> {
        Vec::new()
    }

    /// Run one task. The output document is validated against
    /// `output_schema_id` before the orchestrator merges it.
    async fn execute(
        &self,
        task: &AgentTask,
        ctx: &AgentContext,
    ) -> Result<serde_json::Value, AgentError>;
}

/// Payload field helpers shared by the built-in agents.
pub(crate) fn required_str<'a>(
    payload: &'a serde_json::Value,
    field: &str,
) -> Result<&'a str, AgentError> {
    payload
        .get(field)
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AgentError::Payload(format!("missing field {field}")))
}

pub(crate) fn optional_str<'a>(payload: &'a serde_json::Value, field: &str) -> Option<&'a str> {
    payload.get(field).and_then(serde_json::Value::as_str).filter(|s| !s.is_empty())
}
