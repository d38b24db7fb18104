// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository record and identifier.
//!
//! A repository is the bare clone (or discovered local mount) that backs one
//! or more worktrees. Repositories never own a working tree directly; all
//! checkouts happen through worktrees that reference the repository by id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

crate::define_string_id! {
    /// Identifier for a repository.
    ///
    /// Semantic rather than random: `org/repo` for checkouts from a forge,
    /// `local/<name>` for live-mounted local source trees.
    pub struct RepoId;
}

impl RepoId {
    /// Id for a repository checked out from a forge.
    pub fn remote(org: &str, repo: &str) -> Self {
        Self(format!("{org}/{repo}"))
    }

    /// Id for a live-mounted local repository.
    pub fn local(name: &str) -> Self {
        Self(format!("local/{name}"))
    }

    /// True if this repository is a live local mount.
    pub fn is_local(&self) -> bool {
        self.0.starts_with("local/")
    }
}

/// A bare repository managed by the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: RepoId,
    /// Clone URL, or the mount path for local repositories.
    pub url: String,
    /// Path to the bare repository on disk (symbolic HEAD, no working tree).
    pub path: PathBuf,
    pub default_branch: String,
    /// Live-mounted local source tree rather than a clone.
    pub is_local: bool,
    /// False when the backing path has gone missing (e.g. unmounted).
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

impl Repository {
    pub fn new(id: RepoId, url: impl Into<String>, path: PathBuf, default_branch: impl Into<String>) -> Self {
        let is_local = id.is_local();
        Self {
            id,
            url: url.into(),
            path,
            default_branch: default_branch.into(),
            is_local,
            available: true,
            created_at: Utc::now(),
        }
    }
}

crate::builder! {
    pub struct RepositoryBuilder => Repository {
        into {
            url: String = "https://example.com/org/repo.git",
            default_branch: String = "main",
        }
        set {
            id: RepoId = RepoId::remote("org", "repo"),
            path: PathBuf = PathBuf::from("/tmp/repo.git"),
            is_local: bool = false,
            available: bool = true,
        }
        computed {
            created_at: DateTime<Utc> = Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
