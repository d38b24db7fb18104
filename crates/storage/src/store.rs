// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worktree state store.
//!
//! Holds repositories, worktrees, and per-worktree cached statuses behind a
//! single RW lock. Callers get value clones out; no reference escapes the
//! lock, and no method suspends while holding it.

use catnip_core::{CachedWorktreeStatus, RepoId, Repository, Worktree, WorktreeId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("worktree path already in use: {0}")]
    PathInUse(PathBuf),

    #[error("worktree not found: {0}")]
    WorktreeNotFound(WorktreeId),

    #[error("repository not found: {0}")]
    RepositoryNotFound(RepoId),
}

/// Serializable projection of the store, snapshotted to `state.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreState {
    pub repositories: HashMap<RepoId, Repository>,
    pub worktrees: HashMap<WorktreeId, Worktree>,
    #[serde(default)]
    pub statuses: HashMap<WorktreeId, CachedWorktreeStatus>,
}

#[derive(Default)]
struct Inner {
    repositories: HashMap<RepoId, Repository>,
    worktrees: HashMap<WorktreeId, Worktree>,
    statuses: HashMap<WorktreeId, CachedWorktreeStatus>,
}

/// In-memory maps of repositories and worktrees with cached status slots.
#[derive(Default)]
pub struct WorktreeStore {
    inner: RwLock<Inner>,
}

impl WorktreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -- repositories --

    pub fn upsert_repository(&self, repo: Repository) {
        self.inner.write().repositories.insert(repo.id.clone(), repo);
    }

    pub fn get_repository(&self, id: &str) -> Option<Repository> {
        self.inner.read().repositories.get(id).cloned()
    }

    pub fn list_repositories(&self) -> Vec<Repository> {
        let mut repos: Vec<_> = self.inner.read().repositories.values().cloned().collect();
        repos.sort_by(|a, b| a.id.cmp(&b.id));
        repos
    }

    pub fn delete_repository(&self, id: &str) -> Result<Repository, StoreError> {
        self.inner
            .write()
            .repositories
            .remove(id)
            .ok_or_else(|| StoreError::RepositoryNotFound(RepoId::new(id)))
    }

    // -- worktrees --

    /// Insert a new worktree. Fails if another worktree owns the same path.
    pub fn insert_worktree(&self, worktree: Worktree) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let taken = inner
            .worktrees
            .values()
            .any(|w| w.path == worktree.path && w.id != worktree.id);
        if taken {
            return Err(StoreError::PathInUse(worktree.path));
        }
        inner.worktrees.insert(worktree.id, worktree);
        Ok(())
    }

    pub fn get_worktree(&self, id: WorktreeId) -> Option<Worktree> {
        self.inner.read().worktrees.get(&id).cloned()
    }

    pub fn worktree_by_path(&self, path: &Path) -> Option<Worktree> {
        self.inner.read().worktrees.values().find(|w| w.path == path).cloned()
    }

    pub fn worktree_by_name(&self, name: &str) -> Option<Worktree> {
        self.inner.read().worktrees.values().find(|w| w.name == name).cloned()
    }

    /// Longest-path match: the worktree whose path is the deepest ancestor of
    /// `path`. Maps arbitrary subpaths (where agent hooks fire) to their
    /// worktree without matching sibling directories that share a prefix.
    pub fn worktree_containing(&self, path: &Path) -> Option<Worktree> {
        let inner = self.inner.read();
        inner
            .worktrees
            .values()
            .filter(|w| path.starts_with(&w.path))
            .max_by_key(|w| w.path.as_os_str().len())
            .cloned()
    }

    pub fn list_worktrees(&self) -> Vec<Worktree> {
        let mut worktrees: Vec<_> = self.inner.read().worktrees.values().cloned().collect();
        worktrees.sort_by(|a, b| a.name.cmp(&b.name));
        worktrees
    }

    pub fn worktrees_for_repo(&self, repo_id: &str) -> Vec<Worktree> {
        self.inner
            .read()
            .worktrees
            .values()
            .filter(|w| w.repo_id == repo_id)
            .cloned()
            .collect()
    }

    /// Apply a closure to a worktree under the lock and return the updated
    /// clone. The closure must not block.
    pub fn mutate_worktree(
        &self,
        id: WorktreeId,
        f: impl FnOnce(&mut Worktree),
    ) -> Result<Worktree, StoreError> {
        let mut inner = self.inner.write();
        let worktree = inner
            .worktrees
            .get_mut(&id)
            .ok_or(StoreError::WorktreeNotFound(id))?;
        f(worktree);
        Ok(worktree.clone())
    }

    pub fn delete_worktree(&self, id: WorktreeId) -> Result<Worktree, StoreError> {
        let mut inner = self.inner.write();
        inner.statuses.remove(&id);
        inner
            .worktrees
            .remove(&id)
            .ok_or(StoreError::WorktreeNotFound(id))
    }

    // -- cached status --

    pub fn status(&self, id: WorktreeId) -> CachedWorktreeStatus {
        self.inner.read().statuses.get(&id).cloned().unwrap_or_default()
    }

    /// Replace the cached status with fresh measurements, bumping the
    /// version. Returns the stored value.
    pub fn update_status(
        &self,
        id: WorktreeId,
        fresh: CachedWorktreeStatus,
    ) -> CachedWorktreeStatus {
        let mut inner = self.inner.write();
        let current = inner.statuses.entry(id).or_default();
        let next = current.next(fresh);
        *current = next.clone();
        next
    }

    // -- snapshot projection --

    pub fn export(&self) -> StoreState {
        let inner = self.inner.read();
        StoreState {
            repositories: inner.repositories.clone(),
            worktrees: inner.worktrees.clone(),
            statuses: inner.statuses.clone(),
        }
    }

    pub fn import(&self, state: StoreState) {
        let mut inner = self.inner.write();
        inner.repositories = state.repositories;
        inner.worktrees = state.worktrees;
        inner.statuses = state.statuses;
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
