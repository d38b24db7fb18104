// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Auto-commit on agent activity boundaries.
//!
//! When an agent session stops over a dirty worktree, all changes are staged
//! and committed with a deterministic message: the most recently completed
//! todo when one exists, a timestamped checkpoint otherwise. Failures are
//! logged and swallowed; commit-sync never propagates to the user.

use catnip_core::{todo, Worktree};
use catnip_git::{Git, GitError};
use tracing::{info, warn};

/// Commit author used for automatic commits.
#[derive(Debug, Clone)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

impl Default for CommitAuthor {
    fn default() -> Self {
        Self {
            name: "catnip".to_string(),
            email: "catnip@localhost".to_string(),
        }
    }
}

/// Stages and commits agent work at session boundaries.
pub struct CommitSyncService {
    git: Git,
    author: CommitAuthor,
}

impl CommitSyncService {
    pub fn new(git: Git, author: CommitAuthor) -> Self {
        Self { git, author }
    }

    /// The message an auto-commit of this worktree would carry.
    pub fn commit_message(worktree: &Worktree) -> String {
        match todo::latest_completed(&worktree.todos) {
            Some(done) => format!("completed: {}", done.content),
            None => format!("checkpoint: {}", chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")),
        }
    }

    /// Commit all changes in the worktree if it is dirty.
    ///
    /// Returns the commit message when a commit was created, `None` for the
    /// clean no-op case.
    pub async fn auto_commit(&self, worktree: &Worktree) -> Result<Option<String>, GitError> {
        if !self.git.is_dirty(&worktree.path).await? {
            return Ok(None);
        }
        let message = Self::commit_message(worktree);
        self.git.stage_all(&worktree.path).await?;
        self.git
            .commit(&worktree.path, &message, &self.author.name, &self.author.email)
            .await?;
        info!(worktree = %worktree.name, %message, "auto-committed agent changes");
        Ok(Some(message))
    }

    /// Like [`auto_commit`](Self::auto_commit) but never fails: errors are
    /// logged and reported as "no commit".
    pub async fn auto_commit_best_effort(&self, worktree: &Worktree) -> Option<String> {
        match self.auto_commit(worktree).await {
            Ok(result) => result,
            Err(e) => {
                warn!(worktree = %worktree.name, error = %e, "auto-commit failed");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "commit_sync_tests.rs"]
mod tests;
