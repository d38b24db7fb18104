// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Claude capability: JSONL session logs under `~/.claude/projects/`.
//!
//! Claude Code munges the project path into a directory name by replacing
//! path separators and dots with dashes, then writes one `<uuid>.jsonl` per
//! session. The most recently modified file is the live session.

use crate::capability::AgentCapability;
use crate::session_log::SessionLogParser;
use async_trait::async_trait;
use catnip_core::AgentSession;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Capability instance for the Claude Code CLI.
pub struct ClaudeAgent {
    /// Overrides `~` for tests.
    home: Option<PathBuf>,
}

impl ClaudeAgent {
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

impl Default for ClaudeAgent {
    fn default() -> Self {
        Self::new()
    }
}

/// `/workspace/w1` → `-workspace-w1`, matching Claude Code's project dirs.
pub fn munge_project_path(path: &Path) -> String {
    path.to_string_lossy()
        .chars()
        .map(|c| if c == '/' || c == '.' { '-' } else { c })
        .collect()
}

/// Most recently modified `.jsonl` file in a directory.
pub fn latest_log_file(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    entries
        .flatten()
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "jsonl"))
        .filter_map(|e| {
            let modified = e.metadata().ok()?.modified().ok()?;
            Some((modified, e.path()))
        })
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, path)| path)
}

#[async_trait]
impl AgentCapability for ClaudeAgent {
    fn kind(&self) -> &'static str {
        "claude"
    }

    fn ready_pattern(&self) -> Option<Regex> {
        // The composer box prompt, or the shortcut hint shown when idle.
        Regex::new(r"(│\s*>|\? for shortcuts)").ok()
    }

    fn session_dir(&self, worktree_path: &Path) -> Option<PathBuf> {
        Some(
            self.home_dir()?
                .join(".claude")
                .join("projects")
                .join(munge_project_path(worktree_path)),
        )
    }

    async fn read_session(&self, worktree_path: &Path) -> Option<AgentSession> {
        let dir = self.session_dir(worktree_path)?;
        let log_file = latest_log_file(&dir)?;
        let contents = tokio::fs::read_to_string(&log_file).await.ok()?;
        debug!(file = %log_file.display(), "parsing claude session log");

        let mut parser = SessionLogParser::new(worktree_path.to_path_buf());
        for line in contents.lines() {
            parser.feed_line(line);
        }
        let mut session = parser.into_session();
        if session.uuid.is_empty() {
            // Fall back to the file stem, which Claude names after the session.
            session.uuid = log_file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Some(session)
    }
}

#[cfg(test)]
#[path = "claude_tests.rs"]
mod tests;
