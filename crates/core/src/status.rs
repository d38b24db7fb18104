// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cached worktree status projection.
//!
//! The heavy Git queries (diff stats, ahead/behind, conflict files) are
//! computed by the worktree manager and cached here with a monotonically
//! increasing version. HTTP read paths serve the cache and derive ETags from
//! its serialized form; they never run Git themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time projection of a worktree's Git state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedWorktreeStatus {
    /// Incremented on every recomputation, never reset.
    pub version: u64,
    pub computed_at: Option<DateTime<Utc>>,
    pub files_changed: u64,
    pub insertions: u64,
    pub deletions: u64,
    /// Commits on the worktree branch not on the source branch.
    pub commits_ahead: u64,
    /// Commits on the source branch not on the worktree branch.
    pub commits_behind: u64,
    pub is_dirty: bool,
    pub has_conflicts: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflict_files: Vec<String>,
}

impl CachedWorktreeStatus {
    /// Produce the successor of `self` with fresh measurements.
    ///
    /// Keeps the version counter monotonic regardless of what the
    /// measurements contain.
    pub fn next(&self, fresh: CachedWorktreeStatus) -> CachedWorktreeStatus {
        CachedWorktreeStatus {
            version: self.version + 1,
            computed_at: Some(Utc::now()),
            ..fresh
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
