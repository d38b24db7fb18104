// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worktree lifecycle management.
//!
//! The service owns every mutation of repositories and worktrees: checkout,
//! create/delete, sync with the source branch, merge back, graduation of
//! private refs, pull requests, the merged-worktree sweep, and the cached
//! status projection. Mutations publish events; read paths go through the
//! store only.

mod service;
mod status;
mod sync;
#[cfg(test)]
pub(crate) mod test_helpers;
mod watcher;

pub use service::{CleanupReport, MergeOutcome, WorktreeConfig, WorktreeService};
pub use sync::SyncStrategy;
pub use watcher::run_status_watcher;

use catnip_core::ConflictReport;
use catnip_git::GitError;
use catnip_storage::StoreError;
use thiserror::Error;

/// Errors from worktree operations. The HTTP facade is the only layer that
/// maps these to status codes.
#[derive(Debug, Error)]
pub enum WorktreeError {
    #[error("worktree not found: {0}")]
    NotFound(String),

    #[error("repository not found: {0}")]
    RepoNotFound(String),

    #[error("{} conflicts in {}: {}", .0.operation, .0.worktree_name, .0.conflict_files.join(", "))]
    Conflict(Box<ConflictReport>),

    #[error("branch already exists: {0}")]
    BranchExists(String),

    #[error("worktree {0} has a rebase or merge in progress")]
    Busy(String),

    #[error("worktree has uncommitted changes")]
    Dirty,

    #[error("no session title available to derive a branch name")]
    NoTitleAvailable,

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Gh(#[from] crate::gh::GhError),

    #[error("filesystem: {0}")]
    Io(#[from] std::io::Error),
}
