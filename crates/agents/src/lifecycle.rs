// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent lifecycle notifications delivered by CLI hooks.
//!
//! Agents are configured to POST a small JSON body to the daemon on
//! lifecycle boundaries. The daemon maps the working directory to a worktree
//! (longest-path match) and reacts per event kind.

use catnip_core::ActivityState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Wire format of a lifecycle notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentLifecycleEvent {
    pub event_type: String,
    pub working_directory: PathBuf,
    pub agent_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Recognized lifecycle kinds. Unknown kinds still refresh the status cache
/// but trigger no other behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleKind {
    UserPromptSubmit,
    PostToolUse,
    Stop,
    Other(String),
}

impl LifecycleKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "UserPromptSubmit" => Self::UserPromptSubmit,
            "PostToolUse" => Self::PostToolUse,
            "Stop" => Self::Stop,
            other => Self::Other(other.to_string()),
        }
    }
}

impl AgentLifecycleEvent {
    pub fn kind(&self) -> LifecycleKind {
        LifecycleKind::parse(&self.event_type)
    }
}

/// Activity state implied by a lifecycle kind, `None` when the kind carries
/// no activity signal.
pub fn classify_activity(kind: &LifecycleKind) -> Option<ActivityState> {
    match kind {
        LifecycleKind::UserPromptSubmit | LifecycleKind::PostToolUse => Some(ActivityState::Running),
        LifecycleKind::Stop => Some(ActivityState::Active),
        LifecycleKind::Other(_) => None,
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
