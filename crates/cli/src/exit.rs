// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process exit codes.

/// Exit codes the pipeline commits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Run completed.
    Success = 0,
    /// Fatal configuration or startup error.
    Startup = 1,
    /// A phase aborted; the state directory is resumable.
    PhaseFailed = 2,
    /// SIGINT after a graceful checkpoint.
    Interrupted = 130,
}
