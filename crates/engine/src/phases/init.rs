// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Init: startup health summary and queue seeding.

use crate::phases::PhaseCx;
use crate::{EngineError, ExecError, HealthSummary};
use scout_core::{ErrorKind, QueueEntry};

pub(crate) async fn run(cx: &mut PhaseCx<'_>) -> Result<(), EngineError> {
    health_check(cx)?;

    // Seed the crawl queue from the configured associations. Unknown
    // codes are a configuration error: the operator asked for a source
    // group the pipeline has never heard of.
    for code in cx.state.associations.clone() {
        let Some(association) = cx.config.associations.get(&code) else {
            return Err(EngineError::PhaseFailed {
                phase: cx.state.current_phase,
                source: ExecError::new(
                    ErrorKind::Config,
                    "orchestrator",
                    &code,
                    format!("association {code} not configured"),
                ),
            });
        };

        let seed = association.directory_url.as_ref().unwrap_or(&association.url);
        let entry = QueueEntry {
            priority: cx.config.seed_priority(&code),
            association: Some(code.clone()),
            ..QueueEntry::new(scout_core::normalize_url(seed))
        };
        let epoch = cx.epoch_ms();
        cx.state.enqueue_url(entry, epoch)?;
    }

    tracing::info!(
        job_id = %cx.state.job_id,
        seeds = cx.state.buckets.crawl_queue.len(),
        "pipeline initialized"
    );
    Ok(())
}

fn health_check(cx: &mut PhaseCx<'_>) -> Result<(), EngineError> {
    let mut keys = cx.config.mandatory_secrets.clone();
    keys.extend(cx.config.optional_secrets.iter().cloned());

    let summary = HealthSummary::gather(
        cx.state.job_id.as_str(),
        &cx.state.associations,
        cx.secrets.as_ref(),
        keys,
        cx.data_root,
        cx.clock.utc_now().to_rfc3339(),
    );

    for warning in &summary.warnings {
        tracing::warn!(job_id = %cx.state.job_id, "{warning}");
    }

    if let Ok(value) = serde_json::to_value(&summary) {
        if let Err(error) = cx.store.save_health(cx.state.job_id.as_str(), &value) {
            tracing::warn!(error = %error, "health summary not persisted");
        }
    }

    let fatal = |message: String| EngineError::PhaseFailed {
        phase: scout_core::Phase::Init,
        source: ExecError::new(ErrorKind::Config, "orchestrator", "health_check", message),
    };

    if !summary.disk_ok() {
        return Err(fatal(format!(
            "free disk below floor: {:?} bytes available",
            summary.free_disk_bytes
        )));
    }
    for key in &cx.config.mandatory_secrets {
        if summary.secrets.get(key) != Some(&true) {
            return Err(fatal(format!("mandatory secret {key} is missing")));
        }
    }
    Ok(())
}
