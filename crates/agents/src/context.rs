// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution context handed to agents.
//!
//! The context is the agent's entire world: it never includes pipeline
//! state. Network access goes through [`AgentContext::http`], which
//! enforces the crawler-class policy: the executor arms the flag only
//! for agents declaring the `Crawler` or `Enricher` capability.

use crate::{Agent, AgentError, SecretStore};
use scout_core::{system_clock, Capability, JobId, SharedClock};
use scout_http::HttpCore;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared, immutable context for one agent invocation.
#[derive(Clone)]
pub struct AgentContext {
    http: Arc<HttpCore>,
    secrets: Arc<SecretStore>,
    clock: SharedClock,
    job_id: JobId,
    data_root: PathBuf,
    dry_run: bool,
    network_allowed: bool,
}

impl AgentContext {
    pub fn builder() -> AgentContextBuilder {
        AgentContextBuilder::default()
    }

    /// The HTTP core, if this agent's capabilities allow network access.
    ///
    /// Only crawlers and enrichers may perform outbound requests; anyone
    /// else gets a policy violation, not a client.
    pub fn http(&self) -> Result<&HttpCore, AgentError> {
        if self.network_allowed {
            Ok(&self.http)
        } else {
            Err(AgentError::Policy {
                policy: "crawler_class_network_only",
                message: "agent is not declared as a crawler or enricher".to_string(),
            })
        }
    }

    pub fn secrets(&self) -> &SecretStore {
        &self.secrets
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Root of the data directory (`raw/`, `processed/`, ...).
    pub fn data_root(&self) -> &PathBuf {
        &self.data_root
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Rebind the context to a job; done once when a run starts so
    /// provenance entries carry the right job id.
    pub fn for_job(&self, job_id: JobId) -> AgentContext {
        let mut ctx = self.clone();
        ctx.job_id = job_id;
        ctx
    }

    /// Derive the per-agent view: network access armed only when the
    /// declared capabilities include a network class.
    pub fn for_agent(&self, agent: &dyn Agent) -> AgentContext {
        let network_allowed = agent
            .required_capabilities()
            .iter()
            .any(|c| matches!(c, Capability::Crawler | Capability::Enricher));
        let mut ctx = self.clone();
        ctx.network_allowed = network_allowed;
        ctx
    }
}

/// Builder for the base context created once per job.
pub struct AgentContextBuilder {
    http: Option<Arc<HttpCore>>,
    secrets: Option<Arc<SecretStore>>,
    clock: Option<SharedClock>,
    job_id: Option<JobId>,
    data_root: PathBuf,
    dry_run: bool,
}

impl Default for AgentContextBuilder {
    fn default() -> Self {
        Self {
            http: None,
            secrets: None,
            clock: None,
            job_id: None,
            data_root: PathBuf::from("data"),
            dry_run: false,
        }
    }
}

impl AgentContextBuilder {
    pub fn http(mut self, http: Arc<HttpCore>) -> Self {
        self.http = Some(http);
        self
    }

    pub fn secrets(mut self, secrets: Arc<SecretStore>) -> Self {
        self.secrets = Some(secrets);
        self
    }

    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn job_id(mut self, job_id: JobId) -> Self {
        self.job_id = Some(job_id);
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

    pub fn build(self) -> Result<AgentContext, AgentError> {
        let clock = self.clock.unwrap_or_else(system_clock);
        let http = match self.http {
            Some(http) => http,
            None => Arc::new(
                HttpCore::builder().clock(clock.clone()).build().map_err(AgentError::Http)?,
            ),
        };
        let secrets = self
            .secrets
            .unwrap_or_else(|| Arc::new(SecretStore::from_env(clock.clone())));
        Ok(AgentContext {
            http,
            secrets,
            clock,
            job_id: self.job_id.unwrap_or_default(),
            data_root: self.data_root,
            dry_run: self.dry_run,
            // The base context is never handed to an agent directly;
            // for_agent() arms this per invocation.
            network_allowed: false,
        })
    }
}
