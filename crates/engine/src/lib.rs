// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! scout-engine: the executor and the phase engine.
//!
//! The executor runs agents under the full wrapper stack (contract
//! validation in, policy checks, deadline, contract validation out)
//! with retry classification and a dead-letter sink for terminal
//! failures. The orchestrator drives the phase state machine over a
//! [`scout_storage::PipelineState`], checkpointing at every transition
//! and at bounded intervals inside a phase.

mod config;
mod dead_letter;
mod error;
mod executor;
mod health;
mod modes;
mod orchestrator;
mod phases;

pub use config::{AssociationConfig, PipelineConfig};
pub use dead_letter::{DeadLetterEntry, DeadLetterSink};
pub use error::{EngineError, ExecError};
pub use executor::AgentExecutor;
pub use health::HealthSummary;
pub use modes::{EnrichmentKind, ModeSummary, ValidationKind};
pub use orchestrator::{Orchestrator, OrchestratorBuilder, RunOutcome};
