// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Link crawler: fetches one page and returns its same-origin links
//! plus the page snapshot fields the orchestrator persists.

use crate::discovery::{INPUT_SCHEMA, OUTPUT_SCHEMA};
use crate::html::extract_hrefs;
use crate::{agent::required_str, detect_auth_wall, Agent, AgentContext, AgentError};
use async_trait::async_trait;
use scout_core::{AgentTask, Capability};
use serde_json::json;
use url::Url;

const DEFAULT_MAX_LINKS: usize = 200;

pub struct LinkCrawler;

#[async_trait]
impl Agent for LinkCrawler {
    fn name(&self) -> &'static str {
        "discovery.link_crawler"
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
        let raw_url = required_str(&task.payload, "url")?;
        let page_url =
            Url::parse(raw_url).map_err(|_| AgentError::Payload(format!("bad url {raw_url}")))?;
        let max_links = task
            .payload
            .get("max_links")
            .and_then(serde_json::Value::as_u64)
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_MAX_LINKS);

        let response = ctx.http()?.get(raw_url).await?;
        let auth_required = detect_auth_wall(&response.body).is_some();

        let mut links = Vec::new();
        if !auth_required {
            for href in extract_hrefs(&response.body) {
                let Ok(absolute) = page_url.join(&href) else {
                    continue;
                };
                // Same-origin rule: discovery never leaves the site.
                if absolute.host_str() != page_url.host_str() {
                    continue;
                }
                let normalized = scout_core::normalize_url(absolute.as_str());
                if !links.contains(&normalized) {
                    links.push(normalized);
                }
                if links.len() >= max_links {
                    break;
                }
            }
        }

        let fetched_at = ctx.clock().utc_now();
        tracing::debug!(url = raw_url, links = links.len(), auth_required, "page crawled");

        let mut page = json!({
            "url": scout_core::normalize_url(raw_url),
            "fetched_at": fetched_at.to_rfc3339(),
            "content_hash": scout_core::content_hash(&response.body),
            "content_location": "",
            "status_code": response.status,
            "auth_required": auth_required,
            "content": response.body,
        });
        if let Some(association) = task.payload.get("association").and_then(serde_json::Value::as_str) {
            page["association"] = json!(association);
        }

        Ok(json!({
            "success": true,
            "links": links,
            "page": page,
        }))
    }
}
