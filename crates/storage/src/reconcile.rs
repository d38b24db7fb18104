// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup reconciliation between the snapshot and the filesystem.
//!
//! Worktree directories live two levels under the workspace root
//! (`<workspace>/<repo>/<name>`). A directory with a valid Git worktree
//! `.git` file that the snapshot doesn't know about is adopted; a snapshot
//! entry whose directory is gone is pruned. The report feeds
//! `worktree:created`/`worktree:deleted` events.

use crate::store::WorktreeStore;
use catnip_core::{RepoId, Worktree, WorktreeId};
use chrono::Utc;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Diff produced by [`reconcile`].
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub adopted: Vec<Worktree>,
    pub pruned: Vec<Worktree>,
}

/// Walk `workspace_dir`, adopt orphan worktrees, prune missing ones.
pub fn reconcile(store: &WorktreeStore, workspace_dir: &Path) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    // Prune first so adoption can't collide with a stale path entry.
    for worktree in store.list_worktrees() {
        if !worktree.path.exists() {
            info!(name = %worktree.name, path = %worktree.path.display(), "pruning missing worktree");
            if store.delete_worktree(worktree.id).is_ok() {
                report.pruned.push(worktree);
            }
        }
    }

    for (repo_dir_name, worktree_dir) in worktree_dirs(workspace_dir) {
        if store.worktree_by_path(&worktree_dir).is_some() {
            continue;
        }
        let Some(branch) = worktree_head_ref(&worktree_dir) else {
            continue;
        };

        let repo_id = resolve_repo_id(store, &repo_dir_name);
        let source_branch = store
            .get_repository(repo_id.as_str())
            .map(|r| r.default_branch)
            .unwrap_or_else(|| "main".to_string());
        let dir_name = worktree_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let now = Utc::now();
        let worktree = Worktree {
            id: WorktreeId::new(),
            repo_id,
            name: format!("{repo_dir_name}/{dir_name}"),
            branch,
            source_branch,
            path: worktree_dir.clone(),
            created_at: now,
            last_accessed: now,
            commit_count: 0,
            is_dirty: false,
            has_conflicts: false,
            session_title: None,
            session_title_history: Vec::new(),
            todos: Vec::new(),
            agent_activity_state: Default::default(),
            pull_request_url: None,
        };
        match store.insert_worktree(worktree.clone()) {
            Ok(()) => {
                info!(name = %worktree.name, path = %worktree_dir.display(), "adopted orphan worktree");
                report.adopted.push(worktree);
            }
            Err(e) => warn!(path = %worktree_dir.display(), error = %e, "could not adopt worktree"),
        }
    }

    report
}

/// All `<repo>/<worktree>` directories under the workspace root.
fn worktree_dirs(workspace_dir: &Path) -> Vec<(String, std::path::PathBuf)> {
    let mut dirs = Vec::new();
    let Ok(repos) = fs::read_dir(workspace_dir) else {
        return dirs;
    };
    for repo_entry in repos.flatten() {
        let repo_path = repo_entry.path();
        if !repo_path.is_dir() {
            continue;
        }
        let repo_name = repo_entry.file_name().to_string_lossy().into_owned();
        let Ok(children) = fs::read_dir(&repo_path) else {
            continue;
        };
        for child in children.flatten() {
            let path = child.path();
            if path.is_dir() {
                dirs.push((repo_name.clone(), path));
            }
        }
    }
    dirs
}

/// The fully-qualified ref a worktree directory has checked out, read from
/// its `.git` file and the linked `HEAD`. `None` when the directory is not a
/// valid Git worktree.
fn worktree_head_ref(dir: &Path) -> Option<String> {
    let dot_git = dir.join(".git");
    let contents = fs::read_to_string(&dot_git).ok()?;
    // .git file contains: gitdir: /path/to/repo.git/worktrees/<name>
    let gitdir = contents.trim().strip_prefix("gitdir: ")?;
    let head = fs::read_to_string(Path::new(gitdir).join("HEAD")).ok()?;
    let head = head.trim();
    if let Some(refname) = head.strip_prefix("ref: ") {
        Some(refname.to_string())
    } else if !head.is_empty() {
        // Detached worktree: adopt with the bare commit as branch.
        Some(head.to_string())
    } else {
        None
    }
}

/// Map a repository directory name back to a known repository id.
fn resolve_repo_id(store: &WorktreeStore, repo_dir_name: &str) -> RepoId {
    for repo in store.list_repositories() {
        let tail = repo.id.as_str().rsplit('/').next().unwrap_or_default();
        if tail == repo_dir_name {
            return repo.id;
        }
    }
    RepoId::new(repo_dir_name)
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
