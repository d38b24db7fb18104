// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent activity state derived from session-log tailing and lifecycle hooks.

use serde::{Deserialize, Serialize};

/// What the agent attached to a worktree is currently doing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityState {
    /// No agent session, or the session has stopped.
    #[default]
    Inactive,
    /// A session exists and is waiting for input.
    Active,
    /// The agent is processing or running tools.
    Running,
}

crate::simple_display! {
    ActivityState {
        Inactive => "inactive",
        Active => "active",
        Running => "running",
    }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
