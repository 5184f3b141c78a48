// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Source monitoring: content-hash baselines for drift detection.

use crate::{Agent, AgentContext, AgentError};
use async_trait::async_trait;
use scout_core::{AgentTask, Capability};
use serde_json::{json, Value};
use std::path::PathBuf;

pub(crate) const INPUT_SCHEMA: &str = "https://contracts.scout.dev/monitoring/input.json";
pub(crate) const OUTPUT_SCHEMA: &str = "https://contracts.scout.dev/monitoring/output.json";

pub struct SourceMonitor;

#[async_trait]
impl Agent for SourceMonitor {
    fn name(&self) -> &'static str {
        "monitoring.source_monitor"
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
        let action = task
            .payload
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| AgentError::Payload("missing action".to_string()))?;
        let urls: Vec<String> = task
            .payload
            .get("urls")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();
        if urls.is_empty() {
            return Err(AgentError::Payload("urls must be non-empty".to_string()));
        }

        let baselines_dir = task
            .payload
            .get("output_dir")
            .and_then(Value::as_str)
            .map(PathBuf::from)
            .unwrap_or_else(|| ctx.data_root().join("monitoring").join("baselines"));

        match action {
            "baseline" => self.baseline(&urls, &baselines_dir, ctx).await,
            "check" => self.check(&urls, &baselines_dir, ctx).await,
            other => Err(AgentError::Payload(format!("unknown action {other}"))),
        }
    }
}

impl SourceMonitor {
    async fn baseline(
        &self,
        urls: &[String],
        dir: &PathBuf,
        ctx: &AgentContext,
    ) -> Result<Value, AgentError> {
        let http = ctx.http()?;
        let mut created = 0usize;
        let mut lines = String::new();

        for url in urls {
            match http.get(url).await {
                Ok(response) => {
                    let entry = json!({
                        "url": url,
                        "content_hash": scout_core::content_hash(&response.body),
                        "observed_at": ctx.clock().utc_now().to_rfc3339(),
                    });
                    lines.push_str(&entry.to_string());
                    lines.push('\n');
                    created += 1;
                }
                Err(error) => {
                    tracing::warn!(url, error = %error, "baseline fetch failed");
                }
            }
        }

        if !ctx.dry_run() && created > 0 {
            std::fs::create_dir_all(dir)
                .map_err(|e| AgentError::Internal(format!("baseline dir: {e}")))?;
            let stamp = ctx.clock().utc_now().format("%Y%m%d");
            let path = dir.join(format!("baseline_{stamp}.jsonl"));
            std::fs::write(&path, lines)
                .map_err(|e| AgentError::Internal(format!("baseline write: {e}")))?;
            tracing::info!(path = %path.display(), created, "baselines written");
        }

        Ok(json!({ "success": true, "baselines_created": created }))
    }

    async fn check(
        &self,
        urls: &[String],
        dir: &PathBuf,
        ctx: &AgentContext,
    ) -> Result<Value, AgentError> {
        let known = load_baselines(dir);
        let http = ctx.http()?;
        let mut changed = Vec::new();

        for url in urls {
            let Ok(response) = http.get(url).await else {
                continue;
            };
            let hash = scout_core::content_hash(&response.body);
            if known.get(url).is_some_and(|baseline| *baseline != hash) {
                changed.push(url.clone());
            }
        }

        tracing::info!(checked = urls.len(), changed = changed.len(), "drift check done");
        Ok(json!({ "success": true, "changed": changed }))
    }
}

/// Latest hash per URL across all baseline files.
fn load_baselines(dir: &PathBuf) -> std::collections::HashMap<String, String> {
    let mut known = std::collections::HashMap::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return known;
    };
    let mut files: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    files.sort();
    for file in files {
        let Ok(content) = std::fs::read_to_string(&file) else {
            continue;
        };
        for line in content.lines() {
            let Ok(entry) = serde_json::from_str::<Value>(line) else {
                continue;
            };
            if let (Some(url), Some(hash)) = (
                entry.get("url").and_then(Value::as_str),
                entry.get("content_hash").and_then(Value::as_str),
            ) {
                known.insert(url.to_string(), hash.to_string());
            }
        }
    }
    known
}
