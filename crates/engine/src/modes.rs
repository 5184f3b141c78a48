// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Targeted modes: extract / enrich / validate outside the full state
//! machine.
//!
//! These run one phase family against the data directories instead of a
//! checkpointed job state, through the same executor and wrapper stack
//! as the full pipeline.

use crate::{EngineError, ExecError, Orchestrator};
use scout_core::{AgentTask, ErrorKind};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which enrichment sub-agents run in `--mode enrich`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentKind {
    Firmographic,
    TechStack,
    Contacts,
    All,
}

impl EnrichmentKind {
    fn agents(self) -> Vec<&'static str> {
        match self {
            EnrichmentKind::Firmographic => vec!["enrichment.firmographic"],
            EnrichmentKind::TechStack => vec!["enrichment.tech_stack"],
            EnrichmentKind::Contacts => vec!["enrichment.contact_finder"],
            EnrichmentKind::All => vec![
                "enrichment.firmographic",
                "enrichment.tech_stack",
                "enrichment.contact_finder",
            ],
        }
    }
}

/// Which validation sub-agents run in `--mode validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    Dedupe,
    CrossRef,
    Score,
    All,
}

impl ValidationKind {
    fn agents(self) -> Vec<&'static str> {
        match self {
            ValidationKind::Dedupe => vec!["validation.dedupe"],
            ValidationKind::CrossRef => vec!["validation.crossref"],
            ValidationKind::Score => vec!["validation.scorer"],
            ValidationKind::All => {
                vec!["validation.dedupe", "validation.crossref", "validation.scorer"]
            }
        }
    }
}

/// Outcome summary for the targeted modes.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModeSummary {
    pub mode: String,
    pub records_in: usize,
    pub records_out: usize,
    pub output_path: Option<String>,
    pub failures: usize,
}

impl Orchestrator {
    /// Extract one or more associations straight to `raw/`.
    pub async fn run_extract(
        &mut self,
        job_id: &scout_core::JobId,
        associations: &[String],
    ) -> Result<ModeSummary, EngineError> {
        self.executor_mut().bind_job(job_id.clone());
        let mut all_records: Vec<Value> = Vec::new();
        let mut failures = 0usize;
        let mut output_path = None;

        for code in associations {
            let Some(association) = self.config().associations.get(code).cloned() else {
                return Err(EngineError::PhaseFailed {
                    phase: scout_core::Phase::Extraction,
                    source: ExecError::new(
                        ErrorKind::Config,
                        "orchestrator",
                        code,
                        format!("association {code} not configured"),
                    ),
                });
            };

            // Find the directory entry point.
            let directory_url = match &association.directory_url {
                Some(url) => url.clone(),
                None => {
                    let mapped = self
                        .spawn_tolerant(
                            "discovery.site_mapper",
                            json!({ "url": association.url, "association": code }),
                            &mut failures,
                        )
                        .await?;
                    match mapped
                        .as_ref()
                        .and_then(|output| output["links"].as_array())
                        .and_then(|links| links.first())
                        .and_then(Value::as_str)
                    {
                        Some(url) => url.to_string(),
                        None => {
                            tracing::warn!(association = code, "no directory found, skipping");
                            continue;
                        }
                    }
                }
            };

            // Crawl the directory for member links.
            let crawl = self
                .spawn_tolerant(
                    "discovery.link_crawler",
                    json!({ "url": directory_url, "association": code }),
                    &mut failures,
                )
                .await?;
            let member_urls: Vec<String> = crawl
                .as_ref()
                .and_then(|output| output["links"].as_array())
                .map(|links| {
                    links
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .take(self.config().max_pages)
                        .collect()
                })
                .unwrap_or_default();

            // Fetch and parse each member page, bounded-parallel per step.
            let fetch_tasks: Vec<AgentTask> = member_urls
                .iter()
                .map(|url| {
                    AgentTask::new(
                        "discovery.link_crawler",
                        json!({ "url": url, "association": code, "max_links": 0 }),
                    )
                    .with_deadline(Duration::from_secs(self.config().agent_timeout_secs))
                })
                .collect();
            let max_concurrent = self.config().max_concurrent;
            let fetched = self
                .executor()
                .spawn_parallel("discovery.link_crawler", fetch_tasks, max_concurrent)
                .await;

            let mut parse_tasks = Vec::new();
            for (url, fetch) in member_urls.iter().zip(fetched) {
                match fetch {
                    Ok(result) => {
                        let content =
                            result.output["page"]["content"].as_str().unwrap_or("").to_string();
                        parse_tasks.push(
                            AgentTask::new(
                                "extraction.html_parser",
                                json!({ "url": url, "content": content, "association": code }),
                            )
                            .with_deadline(Duration::from_secs(self.config().agent_timeout_secs)),
                        );
                    }
                    Err(error) if error.kind.is_fatal() => {
                        return Err(EngineError::PhaseFailed {
                            phase: scout_core::Phase::Extraction,
                            source: error,
                        });
                    }
                    Err(_) => failures += 1,
                }
            }

            let parsed = self
                .executor()
                .spawn_parallel("extraction.html_parser", parse_tasks, max_concurrent)
                .await;
            let mut association_records = Vec::new();
            for result in parsed {
                match result {
                    Ok(result) => {
                        if let Some(records) = result.output["records"].as_array() {
                            association_records.extend(records.clone());
                        }
                    }
                    Err(error) if error.kind.is_fatal() => {
                        return Err(EngineError::PhaseFailed {
                            phase: scout_core::Phase::Extraction,
                            source: error,
                        });
                    }
                    Err(_) => failures += 1,
                }
            }

            // Members can appear on several pages; keep one per id.
            let association_records = dedupe_by_id(association_records);
            if !self.dry_run() {
                let path = self
                    .data_root()
                    .join("raw")
                    .join(code)
                    .join(format!("records_{}.jsonl", job_id.suffix()));
                write_jsonl(&path, &association_records)?;
                output_path = Some(path.display().to_string());
            }
            all_records.extend(association_records);
        }

        let records_in = all_records.len();
        let deduped = dedupe_by_id(all_records);
        Ok(ModeSummary {
            mode: "extract".to_string(),
            records_in,
            records_out: deduped.len(),
            output_path,
            failures,
        })
    }

    /// Enrich previously extracted records from `raw/`.
    pub async fn run_enrich(
        &mut self,
        job_id: &scout_core::JobId,
        kind: EnrichmentKind,
    ) -> Result<ModeSummary, EngineError> {
        self.executor_mut().bind_job(job_id.clone());
        let records = load_jsonl_tree(&self.data_root().join("raw"));
        if records.is_empty() {
            return Err(EngineError::Startup("no raw records found to enrich".to_string()));
        }

        let mut failures = 0usize;
        let mut working = records;
        for agent_name in kind.agents() {
            let result = self
                .spawn_tolerant(agent_name, json!({ "records": working.clone() }), &mut failures)
                .await?;
            if let Some(output) = result {
                if let Some(records) = output["records"].as_array() {
                    working = records.clone();
                }
            }
        }

        let mut output_path = None;
        if !self.dry_run() {
            let path = self
                .data_root()
                .join("processed")
                .join(format!("enriched_{}.jsonl", job_id.suffix()));
            write_jsonl(&path, &working)?;
            output_path = Some(path.display().to_string());
        }

        Ok(ModeSummary {
            mode: "enrich".to_string(),
            records_in: working.len(),
            records_out: working.len(),
            output_path,
            failures,
        })
    }

    /// Validate the latest enriched set from `processed/`.
    pub async fn run_validate(
        &mut self,
        job_id: &scout_core::JobId,
        kind: ValidationKind,
    ) -> Result<ModeSummary, EngineError> {
        self.executor_mut().bind_job(job_id.clone());
        let records = load_latest_enriched(&self.data_root().join("processed"));
        if records.is_empty() {
            return Err(EngineError::Startup("no processed records found to validate".to_string()));
        }
        let records_in = records.len();

        let mut failures = 0usize;
        let mut working = records;
        for agent_name in kind.agents() {
            let result = self
                .spawn_tolerant(agent_name, json!({ "records": working.clone() }), &mut failures)
                .await?;
            if let Some(output) = result {
                if let Some(records) = output["records"].as_array() {
                    working = records.clone();
                }
            }
        }

        // Quality gate, matching the full pipeline's export floor.
        let min_quality = self.config().min_quality as u64;
        let kept: Vec<Value> = working
            .into_iter()
            .filter(|record| {
                record
                    .get("quality_score")
                    .and_then(Value::as_u64)
                    .map(|score| score >= min_quality)
                    .unwrap_or(true)
            })
            .collect();

        let mut output_path = None;
        if !self.dry_run() {
            let stamp = self.clock().utc_now().format("%Y%m%d_%H%M%S").to_string();
            let dir = self.data_root().join("validated").join(stamp);
            let path = dir.join("companies.jsonl");
            write_jsonl(&path, &kept)?;
            self.spawn_tolerant(
                "export.export_activation",
                json!({
                    "export_type": "summary",
                    "records": kept,
                    "output_dir": dir.display().to_string(),
                }),
                &mut failures,
            )
            .await?;
            output_path = Some(path.display().to_string());
        }

        Ok(ModeSummary {
            mode: "validate".to_string(),
            records_in,
            records_out: kept.len(),
            output_path,
            failures,
        })
    }

    /// Spawn that treats skippable failures as counted losses and only
    /// propagates fatal ones.
    async fn spawn_tolerant(
        &self,
        agent_name: &str,
        payload: Value,
        failures: &mut usize,
    ) -> Result<Option<Value>, EngineError> {
        let task = AgentTask::new(agent_name, payload)
            .with_deadline(Duration::from_secs(self.config().agent_timeout_secs));
        match self.executor().spawn(agent_name, task).await {
            Ok(result) => Ok(Some(result.output)),
            Err(error) if error.kind.is_fatal() => Err(EngineError::PhaseFailed {
                phase: scout_core::Phase::Extraction,
                source: error,
            }),
            Err(_) => {
                *failures += 1;
                Ok(None)
            }
        }
    }
}

fn dedupe_by_id(records: Vec<Value>) -> Vec<Value> {
    let mut seen = std::collections::HashSet::new();
    records
        .into_iter()
        .filter(|record| match record.get("id").and_then(Value::as_str) {
            Some(id) => seen.insert(id.to_string()),
            None => true,
        })
        .collect()
}

fn write_jsonl(path: &Path, records: &[Value]) -> Result<(), EngineError> {
    let parent = path
        .parent()
        .ok_or_else(|| EngineError::Startup("output path has no parent".to_string()))?;
    std::fs::create_dir_all(parent).map_err(scout_storage::StorageError::Io)?;
    let mut body = String::new();
    for record in records {
        body.push_str(&record.to_string());
        body.push('\n');
    }
    std::fs::write(path, body).map_err(scout_storage::StorageError::Io)?;
    Ok(())
}

/// Every record in every `*.jsonl` under a directory tree.
fn load_jsonl_tree(root: &Path) -> Vec<Value> {
    let mut records = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
        paths.sort();
        for path in paths {
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().is_some_and(|ext| ext == "jsonl") {
                records.extend(read_jsonl(&path));
            }
        }
    }
    records
}

/// The newest `enriched_*.jsonl` under `processed/`.
fn load_latest_enriched(dir: &Path) -> Vec<Value> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("enriched_") && name.ends_with(".jsonl"))
        })
        .collect();
    candidates.sort_by_key(|path| {
        std::fs::metadata(path).and_then(|m| m.modified()).ok()
    });
    candidates.last().map(|path| read_jsonl(path)).unwrap_or_default()
}

fn read_jsonl(path: &Path) -> Vec<Value> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    content.lines().filter(|line| !line.trim().is_empty()).filter_map(|line| serde_json::from_str(line).ok()).collect()
}

#[cfg(test)]
#[path = "modes_tests.rs"]
mod tests;
