// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted in-memory executor for tests.
//!
//! Rules are argv prefixes; the first matching rule supplies the response.
//! Every invocation is recorded so tests can assert on the exact commands a
//! component issued without touching a real repository.

use crate::executor::{GitError, GitExecutor, GitOutput};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub workdir: PathBuf,
    pub args: Vec<String>,
}

struct Rule {
    prefix: Vec<String>,
    output: GitOutput,
}

/// Test executor: plays back configured responses, records calls.
pub struct InMemoryExecutor {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<RecordedCall>>,
    /// When true (default), unmatched invocations succeed with empty output.
    /// When false they return [`GitError::Unsupported`].
    lenient: std::sync::atomic::AtomicBool,
}

impl InMemoryExecutor {
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            lenient: std::sync::atomic::AtomicBool::new(true),
        }
    }

    /// Unmatched invocations become [`GitError::Unsupported`] instead of
    /// succeeding silently.
    pub fn strict(self) -> Self {
        self.lenient.store(false, std::sync::atomic::Ordering::Relaxed);
        self
    }

    /// Respond to any invocation whose argv starts with `prefix`.
    pub fn on(&self, prefix: &[&str], output: GitOutput) {
        self.rules.lock().push(Rule {
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            output,
        });
    }

    /// All invocations seen so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// True if any recorded invocation starts with `prefix`.
    pub fn saw(&self, prefix: &[&str]) -> bool {
        self.calls
            .lock()
            .iter()
            .any(|c| c.args.len() >= prefix.len() && c.args.iter().zip(prefix).all(|(a, b)| a == b))
    }
}

#[async_trait]
impl GitExecutor for InMemoryExecutor {
    async fn run(&self, workdir: &Path, args: &[&str]) -> Result<GitOutput, GitError> {
        self.calls.lock().push(RecordedCall {
            workdir: workdir.to_path_buf(),
            args: args.iter().map(|s| s.to_string()).collect(),
        });

        let rules = self.rules.lock();
        for rule in rules.iter() {
            if args.len() >= rule.prefix.len()
                && args.iter().zip(&rule.prefix).all(|(a, b)| a == b)
            {
                return Ok(rule.output.clone());
            }
        }

        if self.lenient.load(std::sync::atomic::Ordering::Relaxed) {
            Ok(GitOutput::ok(""))
        } else {
            Err(GitError::Unsupported(crate::executor::command_display(args)))
        }
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
