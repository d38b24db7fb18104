// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin argv-list bridge to the `gh` CLI.
//!
//! Pull requests and GitHub repository operations shell out to `gh`, which
//! owns credentials and API plumbing. Missing authentication is surfaced as
//! its own error kind so the facade can distinguish it from merge conflicts.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Default per-invocation deadline for `gh` (network-bound).
const DEFAULT_GH_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum GhError {
    #[error("gh is not authenticated: {0}")]
    NotAuthenticated(String),

    #[error("gh {command} failed: {stderr}")]
    Failed { command: String, stderr: String },

    #[error("gh {0} timed out")]
    Timeout(String),

    #[error("failed to run gh: {0}")]
    Io(#[from] std::io::Error),
}

/// Subprocess client for `gh`.
#[derive(Debug, Clone)]
pub struct GhClient {
    timeout: Duration,
}

impl GhClient {
    pub fn new() -> Self {
        Self { timeout: DEFAULT_GH_TIMEOUT }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn run(&self, workdir: &Path, args: &[&str]) -> Result<String, GhError> {
        let command = format!("gh {}", args.join(" "));
        let child = Command::new("gh")
            .args(args)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| GhError::Timeout(command.clone()))??;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        debug!(%command, exit = output.status.code().unwrap_or(-1), "gh");

        if output.status.success() {
            return Ok(stdout);
        }
        let lowered = stderr.to_lowercase();
        if lowered.contains("auth login") || lowered.contains("not logged in") {
            Err(GhError::NotAuthenticated(stderr.trim().to_string()))
        } else {
            Err(GhError::Failed { command, stderr: stderr.trim().to_string() })
        }
    }

    /// `gh pr create` for the worktree's current branch. Returns the PR URL.
    pub async fn pr_create(
        &self,
        worktree: &Path,
        title: &str,
        body: &str,
        base: &str,
    ) -> Result<String, GhError> {
        let stdout = self
            .run(
                worktree,
                &["pr", "create", "--title", title, "--body", body, "--base", base],
            )
            .await?;
        // gh prints the PR URL as the last line of stdout.
        Ok(stdout.lines().last().unwrap_or_default().trim().to_string())
    }

    /// `gh pr edit` with a fresh title/body. Returns the PR URL.
    pub async fn pr_edit(&self, worktree: &Path, title: &str, body: &str) -> Result<String, GhError> {
        self.run(worktree, &["pr", "edit", "--title", title, "--body", body])
            .await?;
        self.pr_view_url(worktree).await
    }

    /// URL of the PR associated with the worktree's branch.
    pub async fn pr_view_url(&self, worktree: &Path) -> Result<String, GhError> {
        let stdout = self
            .run(worktree, &["pr", "view", "--json", "url", "--jq", ".url"])
            .await?;
        Ok(stdout.trim().to_string())
    }

    /// Repositories visible to the authenticated user.
    pub async fn repo_list(&self, workdir: &Path) -> Result<serde_json::Value, GhError> {
        let stdout = self
            .run(
                workdir,
                &["repo", "list", "--json", "name,nameWithOwner,url,isPrivate", "--limit", "100"],
            )
            .await?;
        serde_json::from_str(&stdout).map_err(|e| GhError::Failed {
            command: "gh repo list".to_string(),
            stderr: e.to_string(),
        })
    }

    /// Create a GitHub repository from a local one and push it.
    pub async fn repo_create(
        &self,
        source: &Path,
        name: &str,
        description: &str,
        is_private: bool,
    ) -> Result<String, GhError> {
        let visibility = if is_private { "--private" } else { "--public" };
        let source_arg = source.to_string_lossy().into_owned();
        let stdout = self
            .run(
                source,
                &[
                    "repo",
                    "create",
                    name,
                    visibility,
                    "--description",
                    description,
                    "--source",
                    &source_arg,
                    "--push",
                ],
            )
            .await?;
        Ok(stdout.lines().last().unwrap_or_default().trim().to_string())
    }
}

impl Default for GhClient {
    fn default() -> Self {
        Self::new()
    }
}
