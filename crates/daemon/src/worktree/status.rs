// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cached status recomputation.
//!
//! Recomputed whenever a mutation completes, the filesystem watcher fires,
//! or commit-sync lands a commit. Read paths only ever see the cache.

use super::service::WorktreeService;
use super::WorktreeError;
use catnip_core::{CachedWorktreeStatus, Event, WorktreeId};

impl WorktreeService {
    /// Recompute the cached status for one worktree, bump its version, and
    /// publish the change. Also maintains the dirty/clean projection on the
    /// worktree record.
    pub async fn refresh_status(&self, id: WorktreeId) -> Result<CachedWorktreeStatus, WorktreeError> {
        let worktree = self.require_worktree(id)?;

        let is_dirty = self.git().is_dirty(&worktree.path).await?;
        let (commits_ahead, commits_behind) = self
            .git()
            .ahead_behind(&worktree.path, "HEAD", &worktree.source_branch)
            .await?;
        let diff = self
            .git()
            .diff_stat(&worktree.path, &worktree.source_branch)
            .await
            .unwrap_or_default();
        let rebase = self.git().rebase_in_progress(&worktree.path).await?;
        let merge = self.git().merge_in_progress(&worktree.path).await?;
        let conflict_files = if rebase || merge {
            self.git()
                .conflicted_files(&worktree.path)
                .await
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        let has_conflicts = !conflict_files.is_empty();

        let fresh = CachedWorktreeStatus {
            files_changed: diff.files_changed,
            insertions: diff.insertions,
            deletions: diff.deletions,
            commits_ahead,
            commits_behind,
            is_dirty,
            has_conflicts,
            conflict_files,
            ..Default::default()
        };
        let status = self.store().update_status(id, fresh);

        let was_dirty = worktree.is_dirty;
        let updated = self.store().mutate_worktree(id, |w| {
            w.is_dirty = is_dirty;
            w.has_conflicts = has_conflicts;
            w.commit_count = commits_ahead;
            w.last_accessed = chrono::Utc::now();
        })?;

        if was_dirty != is_dirty {
            if is_dirty {
                self.bus().publish(Event::WorktreeDirty { worktree_id: id });
                self.bus().publish(Event::GitDirty { path: updated.path.clone() });
            } else {
                self.bus().publish(Event::WorktreeClean { worktree_id: id });
                self.bus().publish(Event::GitClean { path: updated.path.clone() });
            }
        }
        self.bus().publish(Event::WorktreeStatusUpdated {
            worktree_id: id,
            status: status.clone(),
        });

        Ok(status)
    }

    /// Recompute every worktree's status; used by the manual refresh sweep
    /// and the batch read path. Per-worktree failures are skipped.
    pub async fn refresh_all_statuses(&self) {
        let worktrees = self.store().list_worktrees();
        let mut refreshed = Vec::new();
        for worktree in worktrees {
            if self.refresh_status(worktree.id).await.is_ok() {
                if let Some(updated) = self.store().get_worktree(worktree.id) {
                    refreshed.push(updated);
                }
            }
        }
        if !refreshed.is_empty() {
            self.bus().publish(Event::WorktreeBatchUpdated { worktrees: refreshed });
        }
    }

    /// Unified diff of the worktree against its source branch.
    pub async fn diff(&self, id: WorktreeId) -> Result<String, WorktreeError> {
        let worktree = self.require_worktree(id)?;
        Ok(self
            .git()
            .diff(&worktree.path, &worktree.source_branch)
            .await?)
    }
}
