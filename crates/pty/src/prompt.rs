// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Programmatic prompt injection.
//!
//! Waits for the session to show its ready marker (an agent-specific prompt
//! regex matched against the replay ring), then writes the prompt followed by
//! the agent's terminator. Exceeding the readiness budget surfaces as
//! [`PtyError::ReadyTimeout`], which the HTTP facade maps to 408.

use crate::session::{PtyError, PtySession};
use regex::Regex;
use std::time::{Duration, Instant};

/// How a prompt is delivered to a specific agent.
#[derive(Debug, Clone)]
pub struct PromptSpec {
    /// Marker that the child is ready for input; `None` writes immediately.
    pub ready_pattern: Option<Regex>,
    /// Byte sequence sent after the prompt text (a carriage return for
    /// readline-style CLIs).
    pub terminator: String,
    pub ready_timeout: Duration,
}

impl Default for PromptSpec {
    fn default() -> Self {
        Self {
            ready_pattern: None,
            terminator: "\r".to_string(),
            ready_timeout: Duration::from_secs(15),
        }
    }
}

/// Send `prompt` to the session, waiting for readiness first.
pub async fn send_prompt(
    session: &PtySession,
    prompt: &str,
    spec: &PromptSpec,
) -> Result<(), PtyError> {
    if let Some(pattern) = &spec.ready_pattern {
        let deadline = Instant::now() + spec.ready_timeout;
        loop {
            let snapshot = session.ring_snapshot();
            if pattern.is_match(&String::from_utf8_lossy(&snapshot)) {
                break;
            }
            if Instant::now() >= deadline {
                return Err(PtyError::ReadyTimeout(spec.ready_timeout));
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
    session.write_input(prompt.as_bytes())?;
    session.write_input(spec.terminator.as_bytes())?;
    Ok(())
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
