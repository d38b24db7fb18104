// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gemini capability.
//!
//! Proves the registry is genuinely pluggable: same JSONL reader, different
//! home directory layout and PTY readiness marker.

use crate::capability::AgentCapability;
use crate::claude::{latest_log_file, munge_project_path};
use crate::session_log::SessionLogParser;
use async_trait::async_trait;
use catnip_core::AgentSession;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Capability instance for the Gemini CLI.
pub struct GeminiAgent {
    home: Option<PathBuf>,
}

impl GeminiAgent {
    pub fn new() -> Self {
        Self { home: None }
    }

    pub fn with_home(home: PathBuf) -> Self {
        Self { home: Some(home) }
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone().or_else(dirs::home_dir)
    }
}

impl Default for GeminiAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentCapability for GeminiAgent {
    fn kind(&self) -> &'static str {
        "gemini"
    }

    fn ready_pattern(&self) -> Option<Regex> {
        Regex::new(r"(?m)^>\s").ok()
    }

    fn session_dir(&self, worktree_path: &Path) -> Option<PathBuf> {
        Some(
            self.home_dir()?
                .join(".gemini")
                .join("projects")
                .join(munge_project_path(worktree_path)),
        )
    }

    async fn read_session(&self, worktree_path: &Path) -> Option<AgentSession> {
        let dir = self.session_dir(worktree_path)?;
        let log_file = latest_log_file(&dir)?;
        let contents = tokio::fs::read_to_string(&log_file).await.ok()?;

        let mut parser = SessionLogParser::new(worktree_path.to_path_buf());
        for line in contents.lines() {
            parser.feed_line(line);
        }
        Some(parser.into_session())
    }
}
