// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-mostly projection of an agent session.
//!
//! The agent CLI persists its own session log on disk (JSONL). The daemon
//! tails those files and maintains this projection; it never writes them.

use crate::todo::Todo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A session title observed at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleEntry {
    pub title: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl TitleEntry {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), timestamp: Some(Utc::now()) }
    }
}

/// One message from the session transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMessage {
    /// "user" or "assistant".
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Projection of one agent session, keyed by the agent's session UUID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentSession {
    pub uuid: String,
    pub worktree_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resumed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<SessionMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_user_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_assistant_message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub todos: Vec<Todo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub title_entries: Vec<TitleEntry>,
}

impl AgentSession {
    pub fn new(uuid: impl Into<String>, worktree_path: PathBuf) -> Self {
        Self { uuid: uuid.into(), worktree_path, ..Default::default() }
    }

    /// The most recent title, if any was ever recorded.
    pub fn current_title(&self) -> Option<&str> {
        self.title_entries.last().map(|e| e.title.as_str())
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
