// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command construction for PTY children.
//!
//! The agent tag selects the child process: an empty tag means a login
//! shell, known agent tags map to their CLI invocations, and anything else
//! is run verbatim so new agents don't need code changes here.

use portable_pty::CommandBuilder;
use std::path::Path;

/// Resolved command line for a PTY child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCommand {
    pub program: String,
    pub args: Vec<String>,
}

/// Map an agent tag to its command line.
pub fn agent_command(agent: &str, shell: &str) -> AgentCommand {
    match agent {
        "" => AgentCommand {
            program: shell.to_string(),
            args: vec!["-l".to_string()],
        },
        "claude" => AgentCommand {
            program: "claude".to_string(),
            args: vec!["--dangerously-skip-permissions".to_string()],
        },
        "gemini" => AgentCommand {
            program: "gemini".to_string(),
            args: vec!["--yolo".to_string()],
        },
        other => AgentCommand {
            program: other.to_string(),
            args: Vec::new(),
        },
    }
}

impl AgentCommand {
    /// Build the portable-pty command with the session environment applied.
    pub fn to_builder(&self, session_id: &str, work_dir: &Path, home: &Path) -> CommandBuilder {
        let mut builder = CommandBuilder::new(&self.program);
        for arg in &self.args {
            builder.arg(arg);
        }
        builder.cwd(work_dir);
        builder.env("SESSION_ID", session_id);
        builder.env("HOME", home);
        builder.env("TERM", "xterm-direct");
        builder.env("COLORTERM", "truecolor");
        builder
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
