// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `GitExecutor` trait: one operation, two calling conventions.
//!
//! Callers pick between the quiet form (`run`: exit code inspected by the
//! caller, stderr captured) and the checked form (`run_checked`: non-zero exit
//! becomes a typed error carrying the command, exit code, and stderr tail).
//! Arguments are always an argv list; untrusted input never reaches a shell.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Maximum stderr bytes carried inside a [`GitError::CommandFailed`].
const STDERR_TAIL_BYTES: usize = 400;

/// Errors from git executor operations.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("{command} failed with exit code {exit_code}: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("{command} timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("failed to run git: {0}")]
    Io(#[from] std::io::Error),

    /// The executor refused the command (in-memory executor with no
    /// scripted response, or a backend that cannot express it).
    #[error("unsupported git invocation: {0}")]
    Unsupported(String),
}

/// Captured output of one git invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    /// Successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self { exit_code: 0, stdout: stdout.into(), stderr: String::new() }
    }

    /// Failed output with the given exit code and stderr.
    pub fn err(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self { exit_code, stdout: String::new(), stderr: stderr.into() }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout with the trailing newline removed.
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim_end_matches('\n')
    }
}

/// Render an argv list as a display string for errors and logs.
pub fn command_display(args: &[&str]) -> String {
    let mut s = String::from("git");
    for arg in args {
        s.push(' ');
        s.push_str(arg);
    }
    s
}

/// The last [`STDERR_TAIL_BYTES`] of stderr, on a char boundary.
pub fn stderr_tail(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.len() <= STDERR_TAIL_BYTES {
        return trimmed.to_string();
    }
    let mut start = trimmed.len() - STDERR_TAIL_BYTES;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    trimmed[start..].to_string()
}

/// Build the typed failure for a non-zero exit.
pub fn command_failed(args: &[&str], output: &GitOutput) -> GitError {
    GitError::CommandFailed {
        command: command_display(args),
        exit_code: output.exit_code,
        stderr: stderr_tail(&output.stderr),
    }
}

/// Runs git operations. Implementations differ in transport (subprocess,
/// embedded library, scripted responses) but share the same contract.
#[async_trait]
pub trait GitExecutor: Send + Sync + 'static {
    /// Quiet form: run the command, capture output. A non-zero exit is not
    /// an error; callers inspect [`GitOutput::exit_code`].
    async fn run(&self, workdir: &Path, args: &[&str]) -> Result<GitOutput, GitError>;

    /// Checked form: non-zero exit becomes [`GitError::CommandFailed`].
    async fn run_checked(&self, workdir: &Path, args: &[&str]) -> Result<GitOutput, GitError> {
        let output = self.run(workdir, args).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(command_failed(args, &output))
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
