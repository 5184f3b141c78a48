// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line arguments.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "scout", about = "Association-intelligence acquisition pipeline", version)]
pub struct Cli {
    /// Pipeline mode.
    #[arg(long, value_enum, default_value_t = Mode::Full)]
    pub mode: Mode,

    /// Association codes to process (repeatable).
    #[arg(short = 'a', long = "association", value_name = "ASSOC")]
    pub associations: Vec<String>,

    /// Enrichment type for enrich mode.
    #[arg(long, value_enum, default_value_t = EnrichmentArg::All)]
    pub enrichment: EnrichmentArg,

    /// Validation type for validate mode.
    #[arg(long, value_enum, default_value_t = ValidationArg::All)]
    pub validation: ValidationArg,

    /// Run without persisted mutations.
    #[arg(long)]
    pub dry_run: bool,

    /// Explicit job id; generated when absent.
    #[arg(long, value_name = "ID")]
    pub job_id: Option<String>,

    /// Resume an existing job from its last committed checkpoint.
    #[arg(long, value_name = "ID", conflicts_with = "job_id")]
    pub resume: Option<String>,

    /// Also mirror results to the external store (needs DATABASE_URL).
    #[arg(long)]
    pub persist_db: bool,

    /// Log level.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Data directory root.
    #[arg(long, default_value = "data")]
    pub data_root: PathBuf,

    /// Pipeline config file (defaults to config/scout.json when present).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Full,
    Extract,
    ExtractAll,
    Enrich,
    EnrichAll,
    Validate,
    ValidateAll,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Mode::Full => "full",
            Mode::Extract => "extract",
            Mode::ExtractAll => "extract-all",
            Mode::Enrich => "enrich",
            Mode::EnrichAll => "enrich-all",
            Mode::Validate => "validate",
            Mode::ValidateAll => "validate-all",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EnrichmentArg {
    Firmographic,
    Techstack,
    Contacts,
    All,
}

scout_core::simple_display! {
    EnrichmentArg {
        Firmographic => "firmographic",
        Techstack => "techstack",
        Contacts => "contacts",
        All => "all",
    }
}

impl EnrichmentArg {
    pub fn to_kind(self) -> scout_engine::EnrichmentKind {
        match self {
            EnrichmentArg::Firmographic => scout_engine::EnrichmentKind::Firmographic,
            EnrichmentArg::Techstack => scout_engine::EnrichmentKind::TechStack,
            EnrichmentArg::Contacts => scout_engine::EnrichmentKind::Contacts,
            EnrichmentArg::All => scout_engine::EnrichmentKind::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValidationArg {
    Dedupe,
    Crossref,
    Score,
    All,
}

scout_core::simple_display! {
    ValidationArg {
        Dedupe => "dedupe",
        Crossref => "crossref",
        Score => "score",
        All => "all",
    }
}

impl ValidationArg {
    pub fn to_kind(self) -> scout_engine::ValidationKind {
        match self {
            ValidationArg::Dedupe => scout_engine::ValidationKind::Dedupe,
            ValidationArg::Crossref => scout_engine::ValidationKind::CrossRef,
            ValidationArg::Score => scout_engine::ValidationKind::Score,
            ValidationArg::All => scout_engine::ValidationKind::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

scout_core::simple_display! {
    LogLevel {
        Debug => "debug",
        Info => "info",
        Warn => "warn",
        Error => "error",
    }
}

impl LogLevel {
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

scout_core::simple_display! {
    LogFormat {
        Text => "text",
        Json => "json",
    }
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
