// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `scout`: run the acquisition pipeline.
//!
//! Exit codes: 0 success, 1 fatal configuration/startup error, 2 phase
//! failure, 130 interrupted after a graceful checkpoint.

mod args;
mod exit;

use anyhow::Context;
use args::{Cli, LogFormat, Mode};
use clap::Parser;
use exit::ExitCode;
use scout_core::JobId;
use scout_engine::{Orchestrator, PipelineConfig, RunOutcome};
use std::sync::atomic::Ordering;

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let code = match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("scout: {error:#}");
            ExitCode::Startup
        }
    };
    std::process::exit(code as i32);
}

#[tokio::main]
async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    if cli.persist_db && std::env::var("DATABASE_URL").is_err() {
        anyhow::bail!("--persist-db requires the DATABASE_URL environment variable");
    }

    let config = load_config(&cli)?;
    let mut orchestrator = Orchestrator::builder()
        .config(config.clone())
        .data_root(&cli.data_root)
        .dry_run(cli.dry_run)
        .build()
        .context("building the pipeline")?;

    // SIGINT requests a graceful stop; the orchestrator checkpoints at
    // the next item boundary.
    let shutdown = orchestrator.shutdown_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, finishing the current item");
            shutdown.store(true, Ordering::SeqCst);
        }
    });

    let (job_id, resume) = match &cli.resume {
        Some(id) => (JobId::from_string(id), true),
        None => (
            cli.job_id.as_ref().map(JobId::from_string).unwrap_or_default(),
            false,
        ),
    };
    tracing::info!(job_id = %job_id, mode = %cli.mode, "starting pipeline job");

    match cli.mode {
        Mode::Full => run_full(&mut orchestrator, &cli, &config, job_id, resume).await,
        Mode::Extract | Mode::ExtractAll => {
            let associations = if cli.mode == Mode::ExtractAll {
                config.associations.keys().cloned().collect()
            } else {
                cli.associations.clone()
            };
            let summary = orchestrator.run_extract(&job_id, &associations).await?;
            finish_mode(&cli, summary)
        }
        Mode::Enrich | Mode::EnrichAll => {
            let kind = if cli.mode == Mode::EnrichAll {
                scout_engine::EnrichmentKind::All
            } else {
                cli.enrichment.to_kind()
            };
            let summary = orchestrator.run_enrich(&job_id, kind).await?;
            finish_mode(&cli, summary)
        }
        Mode::Validate | Mode::ValidateAll => {
            let kind = if cli.mode == Mode::ValidateAll {
                scout_engine::ValidationKind::All
            } else {
                cli.validation.to_kind()
            };
            let summary = orchestrator.run_validate(&job_id, kind).await?;
            finish_mode(&cli, summary)
        }
    }
}

async fn run_full(
    orchestrator: &mut Orchestrator,
    cli: &Cli,
    config: &PipelineConfig,
    job_id: JobId,
    resume: bool,
) -> anyhow::Result<ExitCode> {
    for code in &cli.associations {
        if !config.associations.contains_key(code) {
            anyhow::bail!("association {code} is not configured");
        }
    }

    let mut state = orchestrator
        .load_or_create(&job_id, cli.associations.clone(), resume)
        .context("loading job state")?;

    let outcome = orchestrator.run(&mut state).await.context("running the pipeline")?;

    println!("{}", state.summary());
    if cli.persist_db {
        mirror_exports(cli, &state)?;
    }

    Ok(match outcome {
        RunOutcome::Completed => {
            println!("[OK] pipeline completed: {} ({})", state.job_id, state.current_phase);
            ExitCode::Success
        }
        RunOutcome::Failed => {
            eprintln!("[FAIL] pipeline failed in job {}", state.job_id);
            for error in state.buckets.errors.iter().rev().take(5) {
                eprintln!("  - [{}] {}: {}", error.phase, error.agent, error.message);
            }
            ExitCode::PhaseFailed
        }
        RunOutcome::Interrupted => {
            println!("interrupted; resume with --resume {}", state.job_id);
            ExitCode::Interrupted
        }
    })
}

fn finish_mode(cli: &Cli, summary: scout_engine::ModeSummary) -> anyhow::Result<ExitCode> {
    println!(
        "[OK] {} finished: {} records in, {} out, {} failures",
        summary.mode, summary.records_in, summary.records_out, summary.failures
    );
    if let Some(path) = &summary.output_path {
        println!("output: {path}");
    }
    if cli.dry_run {
        println!("dry run: no files written");
    }
    Ok(ExitCode::Success)
}

/// Mirror export artifacts for the external store loader.
fn mirror_exports(cli: &Cli, state: &scout_storage::PipelineState) -> anyhow::Result<()> {
    let mirror = cli.data_root.join("db_mirror").join(state.job_id.as_str());
    std::fs::create_dir_all(&mirror)?;
    for artifact in &state.buckets.exports {
        let source = std::path::Path::new(&artifact.path);
        if let Some(name) = source.file_name() {
            std::fs::copy(source, mirror.join(name))?;
        }
    }
    tracing::info!(path = %mirror.display(), "exports mirrored for database load");
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| std::path::PathBuf::from("config").join("scout.json"));
    if !path.exists() {
        if cli.config.is_some() {
            anyhow::bail!("config file {} not found", path.display());
        }
        return Ok(PipelineConfig::default());
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn init_tracing(cli: &Cli) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level.as_directive()));
    match cli.log_format {
        LogFormat::Json => {
            tracing_subscriber::fmt().with_env_filter(filter).json().init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}
