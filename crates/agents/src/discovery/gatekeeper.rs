// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Access gatekeeper: verifies a domain may be crawled before anything
//! else touches it. One verdict per domain per job.

use crate::discovery::{RobotsPolicy, INPUT_SCHEMA, OUTPUT_SCHEMA, ROBOTS_TOKEN};
use crate::{agent::optional_str, detect_auth_wall, Agent, AgentContext, AgentError};
use async_trait::async_trait;
use scout_core::{AgentTask, Capability};
use scout_http::HttpError;
use serde_json::json;

pub struct AccessGatekeeper;

#[async_trait]
impl Agent for AccessGatekeeper {
    fn name(&self) -> &'static str {
        "discovery.access_gatekeeper"
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
        let domain = match optional_str(&task.payload, "domain") {
            Some(domain) => domain.to_string(),
            None => {
                let url = optional_str(&task.payload, "url")
                    .ok_or_else(|| AgentError::Payload("need url or domain".to_string()))?;
                scout_core::extract_domain(url)
            }
        };
        if domain.is_empty() {
            return Err(AgentError::Payload("empty domain".to_string()));
        }
        let check_page = task.payload.get("check_page").and_then(serde_json::Value::as_bool).unwrap_or(true);

        let http = ctx.http()?;
        let mut restrictions: Vec<String> = Vec::new();
        let mut recommendations: Vec<String> = Vec::new();
        let mut allowed = true;

        // robots.txt: absence means no restrictions; 5xx/circuit trouble
        // means we cannot verify and must not crawl yet.
        let robots = match http.get(&format!("https://{domain}/robots.txt")).await {
            Ok(response) => RobotsPolicy::parse(&response.body),
            Err(HttpError::Status { status: 404, .. }) => RobotsPolicy::default(),
            Err(e @ HttpError::CircuitOpen { .. }) => return Err(e.into()),
            Err(error) => {
                tracing::warn!(domain, error = %error, "robots.txt unavailable");
                restrictions.push(format!("robots.txt unavailable: {error}"));
                allowed = false;
                RobotsPolicy::default()
            }
        };

        if robots.blocks_everything(ROBOTS_TOKEN) {
            allowed = false;
            restrictions.push("robots.txt disallows all paths".to_string());
        }
        let crawl_delay = robots.crawl_delay(ROBOTS_TOKEN);
        if let Some(delay) = crawl_delay {
            recommendations.push(format!("respect crawl-delay of {delay}s"));
        }

        if allowed && check_page {
            match http.get(&format!("https://{domain}/")).await {
                Ok(response) => {
                    if let Some(indicator) = detect_auth_wall(&response.body) {
                        allowed = false;
                        restrictions.push(format!("authentication required ({indicator})"));
                    }
                }
                Err(HttpError::Status { status, .. }) if status == 403 => {
                    allowed = false;
                    restrictions.push("homepage returned 403".to_string());
                }
                Err(error) => {
                    tracing::warn!(domain, error = %error, "homepage check failed");
                    recommendations.push("homepage unreachable, proceed with caution".to_string());
                }
            }
        }

        let configured_rate = http.limiter().rate_for(&domain);
        recommendations.push(format!("configured rate {configured_rate} req/s"));

        tracing::info!(domain, allowed, "access verdict");
        Ok(json!({
            "success": true,
            "verdict": {
                "domain": domain,
                "allowed": allowed,
                "restrictions": restrictions,
                "recommendations": recommendations,
                "crawl_delay_secs": crawl_delay,
                "observed_at": ctx.clock().utc_now().to_rfc3339(),
            }
        }))
    }
}
