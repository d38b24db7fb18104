// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worktree record, identifier, and the private ref namespace.
//!
//! A worktree is a checked-out directory backed by a shared bare repository.
//! Its branch lives under `refs/catnip/<slug>` until graduated to a
//! conventional `refs/heads/<name>` ref. `source_branch` is immutable for the
//! worktree's lifetime; every other field is projection state maintained by
//! the worktree manager.

use crate::activity::ActivityState;
use crate::id::random_slug;
use crate::repository::RepoId;
use crate::session::TitleEntry;
use crate::todo::Todo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Prefix of the private ref namespace for agent-authored branches.
pub const CATNIP_REF_PREFIX: &str = "refs/catnip/";

/// Unique identifier for a worktree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorktreeId(pub Uuid);

impl WorktreeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for WorktreeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WorktreeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Short random slug naming a private ref (`refs/catnip/<slug>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefSlug(pub String);

impl RefSlug {
    /// Generate a fresh 6-character slug.
    pub fn generate() -> Self {
        Self(random_slug(6))
    }

    /// The fully-qualified private ref for this slug.
    pub fn to_ref(&self) -> String {
        format!("{CATNIP_REF_PREFIX}{}", self.0)
    }
}

impl std::fmt::Display for RefSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// True if `branch` is a fully-qualified ref under the private namespace.
pub fn is_private_ref(branch: &str) -> bool {
    branch.starts_with(CATNIP_REF_PREFIX)
}

/// A checked-out worktree managed by the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worktree {
    pub id: WorktreeId,
    pub repo_id: RepoId,
    /// Display name, `<repo>/<slug>` for generated worktrees.
    pub name: String,
    /// Fully-qualified ref this worktree has checked out.
    pub branch: String,
    /// Branch the worktree was created from. Immutable.
    pub source_branch: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    /// Commits on `branch` that are not on `source_branch`.
    pub commit_count: u64,
    pub is_dirty: bool,
    pub has_conflicts: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_title: Option<TitleEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub session_title_history: Vec<TitleEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub todos: Vec<Todo>,
    #[serde(default)]
    pub agent_activity_state: ActivityState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request_url: Option<String>,
}

impl Worktree {
    /// True when the branch is still under the private namespace.
    pub fn has_private_ref(&self) -> bool {
        is_private_ref(&self.branch)
    }

    /// A clean worktree with nothing ahead of its source is a candidate for
    /// automatic cleanup.
    pub fn is_cleanup_candidate(&self) -> bool {
        !self.is_dirty && self.commit_count == 0
    }

    /// Record a session title, pushing the previous one into the history.
    pub fn set_session_title(&mut self, entry: TitleEntry) {
        if let Some(prev) = self.session_title.take() {
            self.session_title_history.insert(0, prev);
        }
        self.session_title = Some(entry);
    }
}

/// Conflict report from a sync/merge pre-check or a failed sync/merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    /// "sync" or "merge".
    pub operation: String,
    pub worktree_name: String,
    pub conflict_files: Vec<String>,
    pub message: String,
}

crate::builder! {
    pub struct WorktreeBuilder => Worktree {
        into {
            name: String = "repo/fluffy",
            branch: String = "refs/catnip/fluffy",
            source_branch: String = "main",
        }
        set {
            id: WorktreeId = WorktreeId::new(),
            repo_id: RepoId = RepoId::remote("org", "repo"),
            path: PathBuf = PathBuf::from("/workspace/repo/fluffy"),
            commit_count: u64 = 0,
            is_dirty: bool = false,
            has_conflicts: bool = false,
            session_title_history: Vec<TitleEntry> = Vec::new(),
            todos: Vec<Todo> = Vec::new(),
            agent_activity_state: ActivityState = ActivityState::Inactive,
        }
        option {
            session_title: TitleEntry = None,
            pull_request_url: String = None,
        }
        computed {
            created_at: DateTime<Utc> = Utc::now(),
            last_accessed: DateTime<Utc> = Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "worktree_tests.rs"]
mod tests;
