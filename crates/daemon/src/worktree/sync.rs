// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sync with source, merge to source, and their non-mutating pre-checks.
//!
//! Pre-checks run the real operation in a throwaway detached worktree under
//! the scratch dir, so the answer can't diverge from what executing the
//! operation would do. On conflict the operation is aborted in place; no
//! partial state survives.

use super::service::{MergeOutcome, WorktreeService};
use super::WorktreeError;
use catnip_core::{id::random_slug, CachedWorktreeStatus, ConflictReport, Worktree, WorktreeId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// How a worktree is brought up to date with its source branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStrategy {
    #[default]
    Rebase,
    Merge,
}

catnip_core::simple_display! {
    SyncStrategy {
        Rebase => "rebase",
        Merge => "merge",
    }
}

impl WorktreeService {
    // -- pre-checks --

    /// Report the conflicts `sync` would hit, without touching the worktree.
    pub async fn sync_check(
        &self,
        id: WorktreeId,
        strategy: SyncStrategy,
    ) -> Result<Option<ConflictReport>, WorktreeError> {
        let worktree = self.require_worktree(id)?;
        let scratch = self.scratch_worktree(&worktree, &worktree.branch).await?;

        let result = match strategy {
            SyncStrategy::Rebase => {
                let out = self.git().rebase(&scratch, &worktree.source_branch).await?;
                if out.success() {
                    None
                } else {
                    let files = self.git().conflicted_files(&scratch).await.unwrap_or_default();
                    let _ = self.git().abort_rebase(&scratch).await;
                    Some(files)
                }
            }
            SyncStrategy::Merge => {
                let message = format!("merge {} (check)", worktree.source_branch);
                let out = self
                    .git()
                    .merge(&scratch, &worktree.source_branch, &message)
                    .await?;
                if out.success() {
                    None
                } else {
                    let files = self.git().conflicted_files(&scratch).await.unwrap_or_default();
                    let _ = self.git().abort_merge(&scratch).await;
                    Some(files)
                }
            }
        };
        self.remove_scratch(&worktree, &scratch).await;

        Ok(result.map(|conflict_files| ConflictReport {
            operation: "sync".to_string(),
            worktree_name: worktree.name.clone(),
            message: format!(
                "syncing {} from {} would conflict",
                worktree.name, worktree.source_branch
            ),
            conflict_files,
        }))
    }

    /// Report the conflicts `merge_to_source` would hit.
    pub async fn merge_check(&self, id: WorktreeId) -> Result<Option<ConflictReport>, WorktreeError> {
        let worktree = self.require_worktree(id)?;
        let scratch = self
            .scratch_worktree(&worktree, &worktree.source_branch)
            .await?;

        let message = format!("merge {} (check)", worktree.branch);
        let out = self.git().merge(&scratch, &worktree.branch, &message).await?;
        let result = if out.success() {
            None
        } else {
            let files = self.git().conflicted_files(&scratch).await.unwrap_or_default();
            let _ = self.git().abort_merge(&scratch).await;
            Some(files)
        };
        self.remove_scratch(&worktree, &scratch).await;

        Ok(result.map(|conflict_files| ConflictReport {
            operation: "merge".to_string(),
            worktree_name: worktree.name.clone(),
            message: format!(
                "merging {} into {} would conflict",
                worktree.name, worktree.source_branch
            ),
            conflict_files,
        }))
    }

    // -- sync --

    /// Bring the worktree up to date with its source branch.
    ///
    /// Preconditions: no rebase/merge in progress; a dirty tree is allowed
    /// only when `commit_dirty` opts into a pre-commit. On conflict the
    /// operation aborts and surfaces the conflicting files.
    pub async fn sync(
        &self,
        id: WorktreeId,
        strategy: SyncStrategy,
        commit_dirty: bool,
    ) -> Result<CachedWorktreeStatus, WorktreeError> {
        let worktree = self.require_worktree(id)?;
        if self.git().rebase_in_progress(&worktree.path).await?
            || self.git().merge_in_progress(&worktree.path).await?
        {
            return Err(WorktreeError::Busy(worktree.name.clone()));
        }
        if self.git().is_dirty(&worktree.path).await? {
            if !commit_dirty {
                return Err(WorktreeError::Dirty);
            }
            let author = &self.config().author;
            self.git().stage_all(&worktree.path).await?;
            self.git()
                .commit(&worktree.path, "checkpoint before sync", &author.name, &author.email)
                .await?;
        }

        self.begin_automated_op(&worktree.path);
        let result = self.sync_inner(&worktree, strategy).await;
        self.end_automated_op(&worktree.path);
        result?;

        info!(worktree = %worktree.name, %strategy, "synced with source");
        let status = self.refresh_status(id).await?;
        Ok(status)
    }

    async fn sync_inner(
        &self,
        worktree: &Worktree,
        strategy: SyncStrategy,
    ) -> Result<(), WorktreeError> {
        match strategy {
            SyncStrategy::Rebase => {
                let out = self.git().rebase(&worktree.path, &worktree.source_branch).await?;
                if !out.success() {
                    let files = self
                        .git()
                        .conflicted_files(&worktree.path)
                        .await
                        .unwrap_or_default();
                    let _ = self.git().abort_rebase(&worktree.path).await;
                    return Err(conflict("sync", worktree, files));
                }
            }
            SyncStrategy::Merge => {
                let message = format!("merge {} into {}", worktree.source_branch, worktree.name);
                let out = self
                    .git()
                    .merge(&worktree.path, &worktree.source_branch, &message)
                    .await?;
                if !out.success() {
                    let files = self
                        .git()
                        .conflicted_files(&worktree.path)
                        .await
                        .unwrap_or_default();
                    let _ = self.git().abort_merge(&worktree.path).await;
                    return Err(conflict("sync", worktree, files));
                }
            }
        }
        Ok(())
    }

    // -- merge to source --

    /// Merge the worktree's branch into its source branch (squash or
    /// normal), optionally deleting the worktree afterwards.
    pub async fn merge_to_source(
        &self,
        id: WorktreeId,
        squash: bool,
        auto_cleanup: bool,
    ) -> Result<MergeOutcome, WorktreeError> {
        let worktree = self.require_worktree(id)?;
        if self.git().rebase_in_progress(&worktree.path).await?
            || self.git().merge_in_progress(&worktree.path).await?
        {
            return Err(WorktreeError::Busy(worktree.name.clone()));
        }
        if self.git().is_dirty(&worktree.path).await? {
            return Err(WorktreeError::Dirty);
        }

        self.begin_automated_op(&worktree.path);
        let merge_result = self.merge_inner(&worktree, squash).await;
        self.end_automated_op(&worktree.path);
        let message = merge_result?;

        let mut outcome = MergeOutcome {
            merged: true,
            message,
            deleted_worktree: false,
            cleanup_warning: None,
        };

        if auto_cleanup {
            match self.is_fully_merged(&worktree).await {
                Ok(true) => match self.delete_worktree(id).await {
                    Ok(_) => outcome.deleted_worktree = true,
                    Err(e) => outcome.cleanup_warning = Some(e.to_string()),
                },
                Ok(false) => {
                    outcome.cleanup_warning =
                        Some("worktree not fully merged after merge; kept".to_string())
                }
                Err(e) => outcome.cleanup_warning = Some(e.to_string()),
            }
        }
        if !outcome.deleted_worktree {
            let _ = self.refresh_status(id).await;
        }
        Ok(outcome)
    }

    /// Perform the merge in a scratch worktree at the source tip, then move
    /// `refs/heads/<source>` forward with one atomic ref update.
    async fn merge_inner(&self, worktree: &Worktree, squash: bool) -> Result<String, WorktreeError> {
        let scratch = self
            .scratch_worktree(&worktree, &worktree.source_branch)
            .await?;

        let title = worktree
            .session_title
            .as_ref()
            .map(|t| t.title.clone())
            .unwrap_or_else(|| format!("merge {}", worktree.name));
        let subjects = self
            .git()
            .log_subjects(
                &scratch,
                &format!("{}..{}", worktree.source_branch, worktree.branch),
            )
            .await
            .unwrap_or_default();
        let message = if subjects.is_empty() {
            title.clone()
        } else {
            format!("{title}\n\n- {}", subjects.join("\n- "))
        };

        let author = &self.config().author;
        let author_arg = format!("{} <{}>", author.name, author.email);
        let out = if squash {
            self.git()
                .merge_squash(&scratch, &worktree.branch, &message, &author_arg)
                .await?
        } else {
            self.git().merge(&scratch, &worktree.branch, &message).await?
        };
        if !out.success() {
            let files = self.git().conflicted_files(&scratch).await.unwrap_or_default();
            let _ = self.git().abort_merge(&scratch).await;
            self.remove_scratch(&worktree, &scratch).await;
            return Err(conflict("merge", worktree, files));
        }

        let new_tip = self
            .git()
            .rev_parse(&scratch, "HEAD")
            .await?
            .ok_or_else(|| WorktreeError::NotFound("merge tip".to_string()))?;
        let source_ref = format!("refs/heads/{}", worktree.source_branch);
        self.git().update_ref(&scratch, &source_ref, &new_tip).await?;
        self.remove_scratch(&worktree, &scratch).await;

        info!(worktree = %worktree.name, source = %worktree.source_branch, squash, "merged to source");
        Ok(message)
    }

    // -- scratch worktrees --

    /// Detached throwaway worktree at `start_point`, for checks and merges.
    async fn scratch_worktree(
        &self,
        worktree: &Worktree,
        start_point: &str,
    ) -> Result<PathBuf, WorktreeError> {
        let repository = self
            .store()
            .get_repository(worktree.repo_id.as_str())
            .ok_or_else(|| WorktreeError::RepoNotFound(worktree.repo_id.to_string()))?;
        std::fs::create_dir_all(&self.config().tmp_dir)?;
        let path = self.config().tmp_dir.join(format!("check-{}", random_slug(6)));
        let path_str = path.to_string_lossy().into_owned();
        self.git()
            .worktree_add_detached(&repository.path, &path_str, start_point)
            .await?;
        Ok(path)
    }

    async fn remove_scratch(&self, worktree: &Worktree, scratch: &PathBuf) {
        let Some(repository) = self.store().get_repository(worktree.repo_id.as_str()) else {
            return;
        };
        let path_str = scratch.to_string_lossy().into_owned();
        if let Err(e) = self.git().worktree_remove(&repository.path, &path_str, true).await {
            warn!(path = %scratch.display(), error = %e, "scratch worktree removal failed");
        }
        let _ = self.git().worktree_prune(&repository.path).await;
    }
}

fn conflict(operation: &str, worktree: &Worktree, files: Vec<String>) -> WorktreeError {
    WorktreeError::Conflict(Box::new(ConflictReport {
        operation: operation.to_string(),
        worktree_name: worktree.name.clone(),
        message: format!("{operation} aborted due to conflicts"),
        conflict_files: files,
    }))
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
