// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared spec fixtures: a daemon state wired to a seeded bare repository.

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use catnip_core::{RepoId, Repository};
use catnip_daemon::lifecycle::{build_state, Config};
use catnip_daemon::AppState;
use catnip_git::{Git, GitExecutor, ShellExecutor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub struct Spec {
    pub root: TempDir,
    pub bare: PathBuf,
    pub state: AppState,
    pub app: Router,
    pub git: Git,
    /// HOME used by the Claude capability in this spec.
    pub agent_home: TempDir,
}

/// Build a daemon state with one repository (`org/repo`) cloned bare from a
/// seeded upstream, and a Claude capability reading from a scratch HOME.
pub async fn spec() -> Spec {
    let root = TempDir::new().unwrap();
    let exec = Arc::new(ShellExecutor::new());
    let git = Git::new(exec.clone());

    let seed = root.path().join("seed");
    std::fs::create_dir(&seed).unwrap();
    for args in [
        vec!["init", "--initial-branch=main"],
        vec!["config", "user.email", "spec@example.com"],
        vec!["config", "user.name", "spec"],
    ] {
        exec.run_checked(&seed, &args).await.unwrap();
    }
    std::fs::write(seed.join("README"), "line one\n").unwrap();
    exec.run_checked(&seed, &["add", "-A"]).await.unwrap();
    exec.run_checked(&seed, &["commit", "-m", "init"]).await.unwrap();

    let config = Config {
        port: 0,
        workspace_dir: root.path().join("workspace"),
        state_dir: root.path().join("state"),
        dev_mode: false,
        dev_server_port: 5173,
        ssh_enabled: false,
        snapshot_interval: Duration::from_secs(3600),
        port_scan_interval: Duration::from_secs(3600),
    };
    let mut state = build_state(config).unwrap();

    let bare = root.path().join("state/repos/org/repo.git");
    std::fs::create_dir_all(bare.parent().unwrap()).unwrap();
    git.clone_bare(root.path(), seed.to_str().unwrap(), bare.to_str().unwrap())
        .await
        .unwrap();
    state.store.upsert_repository(Repository::new(
        RepoId::remote("org", "repo"),
        seed.to_string_lossy(),
        bare.clone(),
        "main",
    ));

    // Claude reads session logs from a scratch HOME, not the real one.
    let agent_home = TempDir::new().unwrap();
    let mut registry = catnip_agents::AgentRegistry::new();
    registry.register(Arc::new(catnip_agents::ClaudeAgent::with_home(
        agent_home.path().to_path_buf(),
    )));
    state.registry = Arc::new(registry);
    // The processor captured the old registry; rebuild it against the new one.
    state.agent_events = Arc::new(catnip_daemon::agent_events::AgentEventProcessor::new(
        state.store.clone(),
        state.worktrees.clone(),
        state.commit_sync.clone(),
        state.registry.clone(),
        state.bus.clone(),
    ));

    let app = catnip_daemon::http::router(state.clone());
    Spec { root, bare, state, app, git, agent_home }
}

impl Spec {
    /// Advance a branch in the bare repo with one file-change commit.
    pub async fn commit_on_branch(&self, branch: &str, file: &str, contents: &str) {
        let scratch = self
            .root
            .path()
            .join(format!("advance-{}", file.replace('/', "-")));
        let scratch_str = scratch.to_string_lossy().into_owned();
        self.git
            .worktree_add_detached(&self.bare, &scratch_str, branch)
            .await
            .unwrap();
        std::fs::write(scratch.join(file), contents).unwrap();
        self.git.stage_all(&scratch).await.unwrap();
        self.git
            .commit(&scratch, &format!("update {file}"), "spec", "spec@example.com")
            .await
            .unwrap();
        let tip = self.git.rev_parse(&scratch, "HEAD").await.unwrap().unwrap();
        self.git
            .update_ref(&scratch, &format!("refs/heads/{branch}"), &tip)
            .await
            .unwrap();
        self.git
            .worktree_remove(&self.bare, &scratch_str, true)
            .await
            .unwrap();
    }

    /// Commit a file inside a worktree checkout.
    pub async fn commit_in(&self, path: &Path, file: &str, contents: &str) {
        std::fs::write(path.join(file), contents).unwrap();
        self.git.stage_all(path).await.unwrap();
        self.git
            .commit(path, &format!("update {file}"), "spec", "spec@example.com")
            .await
            .unwrap();
    }

    /// Write a Claude session log for a worktree into the scratch HOME.
    pub fn write_claude_log(&self, worktree_path: &Path, lines: &[&str]) {
        let dir = self
            .agent_home
            .path()
            .join(".claude/projects")
            .join(catnip_agents::claude::munge_project_path(worktree_path));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("spec-session.jsonl"), format!("{}\n", lines.join("\n"))).unwrap();
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with(uri: &str, header: (&str, &str)) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header.0, header.1)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    use http_body_util::BodyExt;
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}
