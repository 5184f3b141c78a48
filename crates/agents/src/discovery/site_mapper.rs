// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Site mapper: finds the member-directory entry points of an
//! association site.

use crate::discovery::{INPUT_SCHEMA, OUTPUT_SCHEMA};
use crate::html::extract_hrefs;
use crate::{agent::required_str, Agent, AgentContext, AgentError};
use async_trait::async_trait;
use scout_core::{AgentTask, Capability};
use serde_json::json;
use url::Url;

/// Link-text and path fragments that mark a member directory.
const DIRECTORY_HINTS: [&str; 6] =
    ["member", "directory", "our-companies", "companies", "roster", "find-a-"];

pub struct SiteMapper;

#[async_trait]
impl Agent for SiteMapper {
    fn name(&self) -> &'static str {
        "discovery.site_mapper"
    }

    fn input_schema_id(&self) -> &'static str {
        INPUT_SCHEMA
    }

    fn output_schema_id(&self) -> &'static str {
        OUTPUT_SCHEMA
    }

    fn required_capabilities(&self) -> Vec<Capability> {
        vec![Capability::Crawler]
    }

    async fn execute(
        &self,
        task: &AgentTask,
        ctx: &AgentContext,
    ) -> Result<serde_json::Value, AgentError> {
        let base = required_str(&task.payload, "url")?;
        let base_url = Url::parse(base).map_err(|_| AgentError::Payload(format!("bad url {base}")))?;

        let response = ctx.http()?.get(base).await?;
        let mut candidates = Vec::new();
        for href in extract_hrefs(&response.body) {
            let Ok(absolute) = base_url.join(&href) else {
                continue;
            };
            if absolute.host_str() != base_url.host_str() {
                continue;
            }
            let lowered = absolute.path().to_lowercase();
            if DIRECTORY_HINTS.iter().any(|hint| lowered.contains(hint)) {
                let normalized = scout_core::normalize_url(absolute.as_str());
                if !candidates.contains(&normalized) {
                    candidates.push(normalized);
                }
            }
        }

        tracing::info!(url = base, candidates = candidates.len(), "site mapped");
        Ok(json!({
            "success": true,
            "links": candidates,
        }))
    }
}
