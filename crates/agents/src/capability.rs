// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The agent capability set.

use async_trait::async_trait;
use catnip_core::{AgentSession, Todo};
use regex::Regex;
use std::path::{Path, PathBuf};

/// What the daemon can do with a coding agent.
///
/// Implementations are read-mostly adapters over the agent's own on-disk
/// session state plus the few constants needed to drive its CLI in a PTY.
#[async_trait]
pub trait AgentCapability: Send + Sync + 'static {
    /// Runtime tag selecting this agent (`claude`, `gemini`, ...).
    fn kind(&self) -> &'static str;

    /// Bytes appended after a programmatic prompt.
    fn prompt_terminator(&self) -> &'static str {
        "\r"
    }

    /// Marker that the CLI is ready for input, matched against the PTY
    /// replay ring.
    fn ready_pattern(&self) -> Option<Regex>;

    /// Directory where this agent persists session logs for a worktree,
    /// `None` if it cannot be determined.
    fn session_dir(&self, worktree_path: &Path) -> Option<PathBuf>;

    /// Project the most recent session for a worktree from its logs.
    async fn read_session(&self, worktree_path: &Path) -> Option<AgentSession>;

    /// Todos from the most recent todo-list write.
    async fn read_todos(&self, worktree_path: &Path) -> Vec<Todo> {
        self.read_session(worktree_path)
            .await
            .map(|s| s.todos)
            .unwrap_or_default()
    }

    /// Textual content of the most recent assistant-role record.
    async fn read_latest_assistant_message(&self, worktree_path: &Path) -> Option<String> {
        self.read_session(worktree_path)
            .await
            .and_then(|s| s.latest_assistant_message)
    }

    /// Most recent session title, if the agent recorded one.
    async fn read_session_title(&self, worktree_path: &Path) -> Option<String> {
        self.read_session(worktree_path)
            .await
            .and_then(|s| s.current_title().map(str::to_string))
    }
}
