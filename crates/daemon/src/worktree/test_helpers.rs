// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for worktree service tests: a bare repository seeded
//! with one commit on `main`, wired into a full service instance.

use crate::commit_sync::CommitAuthor;
use crate::events::EventBus;
use crate::worktree::{WorktreeConfig, WorktreeService};
use catnip_core::{RepoId, Repository};
use catnip_git::{Git, GitExecutor, ShellExecutor};
use catnip_storage::WorktreeStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub(crate) struct Fixture {
    pub root: TempDir,
    pub bare: PathBuf,
    pub store: Arc<WorktreeStore>,
    pub bus: Arc<EventBus>,
    pub service: Arc<WorktreeService>,
    pub git: Git,
}

pub(crate) async fn fixture() -> Fixture {
    let root = TempDir::new().unwrap();
    let exec = Arc::new(ShellExecutor::new());
    let git = Git::new(exec.clone());

    // Seed repository with one commit on main, cloned bare.
    let seed = root.path().join("seed");
    std::fs::create_dir(&seed).unwrap();
    run(&exec, &seed, &["init", "--initial-branch=main"]).await;
    run(&exec, &seed, &["config", "user.email", "t@example.com"]).await;
    run(&exec, &seed, &["config", "user.name", "t"]).await;
    std::fs::write(seed.join("README"), "line one\n").unwrap();
    run(&exec, &seed, &["add", "-A"]).await;
    run(&exec, &seed, &["commit", "-m", "init"]).await;

    let bare = root.path().join("repos/org/repo.git");
    std::fs::create_dir_all(bare.parent().unwrap()).unwrap();
    git.clone_bare(
        root.path(),
        seed.to_str().unwrap(),
        bare.to_str().unwrap(),
    )
    .await
    .unwrap();

    let store = Arc::new(WorktreeStore::new());
    let bus = Arc::new(EventBus::new());
    let repo_id = RepoId::remote("org", "repo");
    store.upsert_repository(Repository::new(
        repo_id.clone(),
        seed.to_string_lossy(),
        bare.clone(),
        "main",
    ));

    let config = WorktreeConfig {
        workspace_dir: root.path().join("workspace"),
        repos_dir: root.path().join("repos"),
        tmp_dir: root.path().join("tmp"),
        author: CommitAuthor::default(),
    };
    let service = Arc::new(WorktreeService::new(
        store.clone(),
        git.clone(),
        bus.clone(),
        config,
    ));

    Fixture { root, bare, store, bus, service, git }
}

impl Fixture {
    /// Commit a file change directly onto a branch in the bare repo.
    pub(crate) async fn commit_on_branch(&self, branch: &str, file: &str, contents: &str) {
        let scratch = self.root.path().join(format!("advance-{branch}-{file}").replace('/', "-"));
        let scratch_str = scratch.to_string_lossy().into_owned();
        self.git
            .worktree_add_detached(&self.bare, &scratch_str, branch)
            .await
            .unwrap();
        std::fs::write(scratch.join(file), contents).unwrap();
        self.git.stage_all(&scratch).await.unwrap();
        self.git.commit(&scratch, &format!("update {file}"), "t", "t@example.com").await.unwrap();
        let tip = self.git.rev_parse(&scratch, "HEAD").await.unwrap().unwrap();
        self.git
            .update_ref(&scratch, &format!("refs/heads/{branch}"), &tip)
            .await
            .unwrap();
        self.git.worktree_remove(&self.bare, &scratch_str, true).await.unwrap();
        self.git.worktree_prune(&self.bare).await.unwrap();
    }

    /// Commit a file change inside a worktree checkout.
    pub(crate) async fn commit_in_worktree(&self, path: &Path, file: &str, contents: &str) {
        std::fs::write(path.join(file), contents).unwrap();
        self.git.stage_all(path).await.unwrap();
        self.git
            .commit(path, &format!("update {file}"), "t", "t@example.com")
            .await
            .unwrap();
    }
}

async fn run(exec: &Arc<ShellExecutor>, dir: &Path, args: &[&str]) {
    exec.run_checked(dir, args).await.unwrap();
}
