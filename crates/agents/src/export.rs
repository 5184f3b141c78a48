// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Export activation: curated JSONL/CSV artifacts plus a summary report.

use crate::{agent::required_str, Agent, AgentContext, AgentError};
use async_trait::async_trait;
use scout_core::AgentTask;
use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;

pub(crate) const INPUT_SCHEMA: &str = "https://contracts.scout.dev/export/input.json";
pub(crate) const OUTPUT_SCHEMA: &str = "https://contracts.scout.dev/export/output.json";

pub struct ExportActivation;

#[async_trait]
impl Agent for ExportActivation {
    fn name(&self) -> &'static str {
        "export.export_activation"
    }

    fn input_schema_id(&self) -> &'static str {
        INPUT_SCHEMA
    }

    fn output_schema_id(&self) -> &'static str {
        OUTPUT_SCHEMA
    }

    async fn execute(
        &self,
        task: &AgentTask,
        ctx: &AgentContext,
    ) -> Result<serde_json::Value, AgentError> {
        let export_type = required_str(&task.payload, "export_type")?;
        let format = task
            .payload
            .get("format")
            .and_then(Value::as_str)
            .unwrap_or("jsonl");
        let records = task
            .payload
            .get("records")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let min_quality = task.payload.get("min_quality").and_then(Value::as_u64);

        // Quality gate applies to company-shaped exports.
        let filtered: Vec<Value> = match min_quality {
            Some(min) => records
                .into_iter()
                .filter(|r| {
                    r.get("quality_score").and_then(Value::as_u64).map(|s| s >= min).unwrap_or(true)
                })
                .collect(),
            None => records,
        };

        let output_dir = task
            .payload
            .get("output_dir")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                let stamp = ctx.clock().utc_now().format("%Y%m%d_%H%M%S");
                ctx.data_root().join("validated").join(stamp.to_string()).display().to_string()
            });

        if ctx.dry_run() {
            tracing::info!(export_type, records = filtered.len(), "dry run, export skipped");
            return Ok(json!({
                "success": true,
                "records_exported": filtered.len(),
            }));
        }

        let path = match export_type {
            "summary" => {
                let path = Path::new(&output_dir).join("summary.json");
                let summary = summarize(&filtered, ctx);
                write_atomic(&path, &serde_json::to_vec_pretty(&summary).map_err(io_err)?)?;
                path
            }
            _ => {
                let path =
                    Path::new(&output_dir).join(format!("{export_type}.{format}"));
                let body = match format {
                    "csv" => render_csv(&filtered),
                    _ => render_jsonl(&filtered)?,
                };
                write_atomic(&path, body.as_bytes())?;
                path
            }
        };

        tracing::info!(export_type, path = %path.display(), records = filtered.len(), "export written");
        Ok(json!({
            "success": true,
            "export_path": path.display().to_string(),
            "records_exported": filtered.len(),
        }))
    }
}

fn io_err(e: impl std::fmt::Display) -> AgentError {
    AgentError::Internal(format!("export write failed: {e}"))
}

/// Write-to-temp-then-rename, same contract as the checkpoint store.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), AgentError> {
    let parent = path.parent().ok_or_else(|| io_err("export path has no parent"))?;
    std::fs::create_dir_all(parent).map_err(io_err)?;
    let tmp = path.with_extension("tmp");
    {
        let mut file = std::fs::File::create(&tmp).map_err(io_err)?;
        file.write_all(bytes).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
    }
    std::fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

fn render_jsonl(records: &[Value]) -> Result<String, AgentError> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record).map_err(io_err)?);
        out.push('\n');
    }
    Ok(out)
}

/// Flat CSV over the activation columns; nested fields stay in JSONL.
fn render_csv(records: &[Value]) -> String {
    const COLUMNS: [&str; 8] =
        ["id", "company_name", "website", "city", "state", "erp_system", "quality_score", "quality_grade"];
    let mut out = COLUMNS.join(",");
    out.push('\n');
    for record in records {
        let row: Vec<String> = COLUMNS
            .iter()
            .map(|col| match record.get(*col) {
                Some(Value::String(s)) => csv_escape(s),
                Some(Value::Number(n)) => n.to_string(),
                _ => String::new(),
            })
            .collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn summarize(records: &[Value], ctx: &AgentContext) -> Value {
    let mut grades: std::collections::BTreeMap<String, usize> = std::collections::BTreeMap::new();
    let mut erp: std::collections::BTreeMap<String, usize> = std::collections::BTreeMap::new();
    let mut scores = Vec::new();

    for record in records {
        if let Some(grade) = record.get("quality_grade").and_then(Value::as_str) {
            *grades.entry(grade.to_string()).or_default() += 1;
        }
        if let Some(system) = record.get("erp_system").and_then(Value::as_str) {
            *erp.entry(system.to_string()).or_default() += 1;
        }
        if let Some(score) = record.get("quality_score").and_then(Value::as_u64) {
            scores.push(score);
        }
    }
    scores.sort_unstable();

    json!({
        "total_records": records.len(),
        "quality_distribution": grades,
        "erp_distribution": erp,
        "average_quality_score": if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<u64>() as f64 / scores.len() as f64
        },
        "median_quality_score": scores.get(scores.len() / 2).copied().unwrap_or(0),
        "generated_at": ctx.clock().utc_now().to_rfc3339(),
    })
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;
