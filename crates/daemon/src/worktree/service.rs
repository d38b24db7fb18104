// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worktree service: creation, deletion, graduation, PRs, cleanup.

use super::WorktreeError;
use crate::commit_sync::CommitAuthor;
use crate::events::EventBus;
use crate::gh::GhClient;
use catnip_agents::{BranchNameSummarizer, HeuristicSummarizer};
use catnip_core::{
    id::random_slug, Event, RefSlug, RepoId, Repository, Worktree, WorktreeId,
};
use catnip_git::Git;
use catnip_storage::WorktreeStore;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Filesystem layout and identity for the service.
#[derive(Debug, Clone)]
pub struct WorktreeConfig {
    /// Where checkouts live: `<workspace_dir>/<repo>/<slug>`.
    pub workspace_dir: PathBuf,
    /// Where bare repositories live: `<repos_dir>/<org>/<repo>.git`.
    pub repos_dir: PathBuf,
    /// Scratch space for conflict pre-checks and merge staging.
    pub tmp_dir: PathBuf,
    /// Author for commits the daemon itself creates.
    pub author: CommitAuthor,
}

/// Result of a merge-to-source operation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MergeOutcome {
    pub merged: bool,
    pub message: String,
    /// The worktree was removed by `auto_cleanup`.
    pub deleted_worktree: bool,
    /// Non-fatal cleanup failure after a successful merge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup_warning: Option<String>,
}

/// Result of the merged-worktree sweep.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct CleanupReport {
    pub deleted: Vec<String>,
    pub errors: Vec<String>,
}

/// How long after an automated operation agent hook echoes stay suppressed.
const ECHO_SUPPRESSION: Duration = Duration::from_secs(2);

/// Upper bound on one automated operation; suppression self-expires.
const AUTOMATED_OP_BUDGET: Duration = Duration::from_secs(60);

pub struct WorktreeService {
    store: Arc<WorktreeStore>,
    git: Git,
    bus: Arc<EventBus>,
    gh: GhClient,
    summarizer: Arc<dyn BranchNameSummarizer>,
    config: WorktreeConfig,
    /// Paths currently (or very recently) driven by the service itself.
    /// Agent hook events inside the window are dropped to prevent echo.
    automated_ops: Mutex<HashMap<PathBuf, Instant>>,
}

impl WorktreeService {
    pub fn new(
        store: Arc<WorktreeStore>,
        git: Git,
        bus: Arc<EventBus>,
        config: WorktreeConfig,
    ) -> Self {
        Self {
            store,
            git,
            bus,
            gh: GhClient::new(),
            summarizer: Arc::new(HeuristicSummarizer),
            config,
            automated_ops: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_gh(mut self, gh: GhClient) -> Self {
        self.gh = gh;
        self
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn BranchNameSummarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub(super) fn store(&self) -> &Arc<WorktreeStore> {
        &self.store
    }

    pub(super) fn git(&self) -> &Git {
        &self.git
    }

    pub(super) fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub(super) fn config(&self) -> &WorktreeConfig {
        &self.config
    }

    pub(super) fn require_worktree(&self, id: WorktreeId) -> Result<Worktree, WorktreeError> {
        self.store
            .get_worktree(id)
            .ok_or_else(|| WorktreeError::NotFound(id.to_string()))
    }

    fn require_repository(&self, repo_id: &str) -> Result<Repository, WorktreeError> {
        self.store
            .get_repository(repo_id)
            .ok_or_else(|| WorktreeError::RepoNotFound(repo_id.to_string()))
    }

    // -- automated-operation suppression --

    /// Mark a path as service-driven so agent hook echoes are suppressed.
    pub fn begin_automated_op(&self, path: &Path) {
        self.automated_ops
            .lock()
            .insert(path.to_path_buf(), Instant::now() + AUTOMATED_OP_BUDGET);
    }

    /// Shrink the suppression window to the short post-op echo grace.
    pub fn end_automated_op(&self, path: &Path) {
        self.automated_ops
            .lock()
            .insert(path.to_path_buf(), Instant::now() + ECHO_SUPPRESSION);
    }

    /// True while agent events for this path should be dropped.
    pub fn is_suppressed(&self, path: &Path) -> bool {
        let mut ops = self.automated_ops.lock();
        let now = Instant::now();
        ops.retain(|_, deadline| *deadline > now);
        ops.contains_key(path)
    }

    // -- checkout & repositories --

    /// Ensure `org/repo` is cloned bare, then create a worktree on `branch`
    /// (default branch when `None`).
    pub async fn checkout(
        &self,
        org: &str,
        repo: &str,
        branch: Option<&str>,
    ) -> Result<(Repository, Worktree), WorktreeError> {
        let repo_id = RepoId::remote(org, repo);
        let repository = match self.store.get_repository(repo_id.as_str()) {
            Some(existing) if existing.path.exists() => existing,
            _ => self.clone_repository(&repo_id, org, repo).await?,
        };
        let worktree = self
            .create_worktree(repository.id.as_str(), branch)
            .await?;
        Ok((repository, worktree))
    }

    async fn clone_repository(
        &self,
        repo_id: &RepoId,
        org: &str,
        repo: &str,
    ) -> Result<Repository, WorktreeError> {
        let url = format!("https://github.com/{org}/{repo}.git");
        let bare_path = self.config.repos_dir.join(org).join(format!("{repo}.git"));
        if let Some(parent) = bare_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if !bare_path.exists() {
            let dest = bare_path.to_string_lossy().into_owned();
            self.git
                .clone_bare(&self.config.repos_dir, &url, &dest)
                .await?;
        }
        let default_branch = self.git.default_branch(&bare_path).await?;
        let repository = Repository::new(repo_id.clone(), url, bare_path, default_branch);
        self.store.upsert_repository(repository.clone());
        info!(repo = %repository.id, "repository ready");
        Ok(repository)
    }

    /// Register a local (non-cloned) repository, e.g. from a template.
    pub fn register_local_repository(&self, repository: Repository) {
        self.store.upsert_repository(repository);
    }

    /// Delete a repository and every worktree backed by it.
    pub async fn delete_repository(&self, repo_id: &str) -> Result<(), WorktreeError> {
        let repository = self.require_repository(repo_id)?;
        for worktree in self.store.worktrees_for_repo(repo_id) {
            if let Err(e) = self.delete_worktree(worktree.id).await {
                warn!(worktree = %worktree.name, error = %e, "worktree delete during repo delete failed");
            }
        }
        if repository.path.exists() && !repository.is_local {
            std::fs::remove_dir_all(&repository.path)?;
        }
        self.store.delete_repository(repo_id)?;
        Ok(())
    }

    /// Branches of a repository (`refs/heads/*`, short names).
    pub async fn branches(&self, repo_id: &str) -> Result<Vec<String>, WorktreeError> {
        let repository = self.require_repository(repo_id)?;
        Ok(self.git.list_branches(&repository.path).await?)
    }

    // -- worktree create/delete --

    /// Create a worktree on a fresh private ref from `source` (default
    /// branch when `None`).
    pub async fn create_worktree(
        &self,
        repo_id: &str,
        source: Option<&str>,
    ) -> Result<Worktree, WorktreeError> {
        let repository = self.require_repository(repo_id)?;
        let source_branch = source.unwrap_or(&repository.default_branch).to_string();

        let slug = RefSlug::generate();
        let private_ref = slug.to_ref();
        let repo_short = repo_id.rsplit('/').next().unwrap_or(repo_id).to_string();
        let name = format!("{repo_short}/{slug}");
        let path = self.config.workspace_dir.join(&repo_short).join(slug.0.as_str());
        std::fs::create_dir_all(path.parent().unwrap_or(&self.config.workspace_dir))?;

        let path_str = path.to_string_lossy().into_owned();
        self.git
            .worktree_add_detached(&repository.path, &path_str, &source_branch)
            .await?;
        // Flip the detached checkout onto the private ref without touching
        // the index or working files.
        let head = self
            .git
            .rev_parse(&path, "HEAD")
            .await?
            .ok_or_else(|| WorktreeError::NotFound("HEAD after worktree add".to_string()))?;
        self.git.update_ref(&path, &private_ref, &head).await?;
        self.git.set_symbolic_head(&path, &private_ref).await?;

        let now = Utc::now();
        let worktree = Worktree {
            id: WorktreeId::new(),
            repo_id: repository.id.clone(),
            name,
            branch: private_ref,
            source_branch,
            path,
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
        self.store.insert_worktree(worktree.clone())?;
        self.bus.publish(Event::WorktreeCreated { worktree: Box::new(worktree.clone()) });
        info!(worktree = %worktree.name, branch = %worktree.branch, "worktree created");
        Ok(worktree)
    }

    /// Delete a worktree: checkout directory, private ref, store entry.
    pub async fn delete_worktree(&self, id: WorktreeId) -> Result<Worktree, WorktreeError> {
        let worktree = self.require_worktree(id)?;
        let repository = self.require_repository(worktree.repo_id.as_str())?;

        let path_str = worktree.path.to_string_lossy().into_owned();
        if worktree.path.exists() {
            if let Err(e) = self
                .git
                .worktree_remove(&repository.path, &path_str, true)
                .await
            {
                warn!(worktree = %worktree.name, error = %e, "git worktree remove failed, removing directory");
                std::fs::remove_dir_all(&worktree.path)?;
            }
        }
        let _ = self.git.worktree_prune(&repository.path).await;
        if worktree.has_private_ref() {
            if let Err(e) = self.git.delete_ref(&repository.path, &worktree.branch).await {
                warn!(branch = %worktree.branch, error = %e, "could not delete private ref");
            }
        }

        let deleted = self.store.delete_worktree(id)?;
        self.bus.publish(Event::WorktreeDeleted {
            worktree_id: id,
            name: deleted.name.clone(),
        });
        info!(worktree = %deleted.name, "worktree deleted");
        Ok(deleted)
    }

    // -- graduation --

    /// Rename the worktree's ref to `refs/heads/<name>` atomically. With no
    /// explicit name, derives one from the session title.
    pub async fn graduate(
        &self,
        id: WorktreeId,
        name: Option<&str>,
    ) -> Result<String, WorktreeError> {
        let worktree = self.require_worktree(id)?;

        let branch_name = match name {
            Some(explicit) => explicit.to_string(),
            None => {
                let title = worktree
                    .session_title
                    .as_ref()
                    .map(|t| t.title.clone())
                    .ok_or(WorktreeError::NoTitleAvailable)?;
                self.summarizer
                    .branch_name(&title)
                    .await
                    .ok_or(WorktreeError::NoTitleAvailable)?
            }
        };
        let target_ref = format!("refs/heads/{branch_name}");
        if self.git.ref_exists(&worktree.path, &target_ref).await? {
            return Err(WorktreeError::BranchExists(branch_name));
        }

        let head = self
            .git
            .rev_parse(&worktree.path, "HEAD")
            .await?
            .ok_or_else(|| WorktreeError::NotFound("HEAD".to_string()))?;
        self.git.update_ref(&worktree.path, &target_ref, &head).await?;
        self.git.set_symbolic_head(&worktree.path, &target_ref).await?;
        if worktree.branch != target_ref {
            if let Err(e) = self.git.delete_ref(&worktree.path, &worktree.branch).await {
                warn!(branch = %worktree.branch, error = %e, "could not delete pre-graduation ref");
            }
        }

        let updated = self.store.mutate_worktree(id, |w| {
            w.branch = target_ref.clone();
        })?;
        self.bus.publish(Event::WorktreeUpdated { worktree: Box::new(updated) });
        info!(worktree = %worktree.name, branch = %branch_name, "branch graduated");
        Ok(branch_name)
    }

    // -- merged-cleanup sweep --

    /// Delete every clean worktree whose tip is an ancestor of its source.
    /// Resilient to per-worktree failures.
    pub async fn cleanup_merged(&self) -> CleanupReport {
        let mut report = CleanupReport::default();
        for worktree in self.store.list_worktrees() {
            match self.is_fully_merged(&worktree).await {
                Ok(true) => match self.delete_worktree(worktree.id).await {
                    Ok(deleted) => report.deleted.push(deleted.name),
                    Err(e) => report.errors.push(format!("{}: {e}", worktree.name)),
                },
                Ok(false) => {}
                Err(e) => report.errors.push(format!("{}: {e}", worktree.name)),
            }
        }
        report
    }

    /// Clean working tree and tip reachable from the source branch.
    pub(super) async fn is_fully_merged(&self, worktree: &Worktree) -> Result<bool, WorktreeError> {
        if self.git.is_dirty(&worktree.path).await? {
            return Ok(false);
        }
        Ok(self
            .git
            .is_ancestor(&worktree.path, "HEAD", &worktree.source_branch)
            .await?)
    }

    // -- pull requests --

    /// Create a PR for the worktree's branch via `gh`, storing the URL.
    pub async fn create_pr(
        &self,
        id: WorktreeId,
        title: Option<&str>,
        body: Option<&str>,
    ) -> Result<String, WorktreeError> {
        let worktree = self.require_worktree(id)?;
        let (title, body) = self.pr_text(&worktree, title, body);

        // gh needs the branch on the remote first.
        let refspec = format!("HEAD:refs/heads/{}", pr_branch_name(&worktree));
        self.git.push(&worktree.path, "origin", &refspec).await?;
        let url = self
            .gh
            .pr_create(&worktree.path, &title, &body, &worktree.source_branch)
            .await?;

        let updated = self.store.mutate_worktree(id, |w| {
            w.pull_request_url = Some(url.clone());
        })?;
        self.bus.publish(Event::WorktreeUpdated { worktree: Box::new(updated) });
        Ok(url)
    }

    /// Update an existing PR's title/body.
    pub async fn update_pr(
        &self,
        id: WorktreeId,
        title: Option<&str>,
        body: Option<&str>,
    ) -> Result<String, WorktreeError> {
        let worktree = self.require_worktree(id)?;
        let (title, body) = self.pr_text(&worktree, title, body);
        let refspec = format!("HEAD:refs/heads/{}", pr_branch_name(&worktree));
        self.git.push(&worktree.path, "origin", &refspec).await?;
        let url = self.gh.pr_edit(&worktree.path, &title, &body).await?;
        let updated = self.store.mutate_worktree(id, |w| {
            w.pull_request_url = Some(url.clone());
        })?;
        self.bus.publish(Event::WorktreeUpdated { worktree: Box::new(updated) });
        Ok(url)
    }

    fn pr_text(
        &self,
        worktree: &Worktree,
        title: Option<&str>,
        body: Option<&str>,
    ) -> (String, String) {
        let title = title
            .map(str::to_string)
            .or_else(|| worktree.session_title.as_ref().map(|t| t.title.clone()))
            .unwrap_or_else(|| worktree.name.clone());
        let body = body.map(str::to_string).unwrap_or_else(|| {
            format!("Changes from catnip workspace `{}`.", worktree.name)
        });
        (title, body)
    }

    // -- templates & GitHub repos --

    /// Create a local repository from a bundled template.
    pub async fn create_from_template(
        &self,
        template_id: &str,
        project_name: &str,
    ) -> Result<(Repository, Worktree), WorktreeError> {
        let repo_id = RepoId::local(project_name);
        let bare_path = self
            .config
            .repos_dir
            .join("local")
            .join(format!("{project_name}.git"));

        // Seed a throwaway repository with the template's initial commit,
        // then clone it bare into place.
        let seed = self.config.tmp_dir.join(format!("seed-{}", random_slug(6)));
        std::fs::create_dir_all(&seed)?;
        self.git
            .executor()
            .run_checked(&seed, &["init", "--initial-branch=main"])
            .await?;
        for (file, contents) in template_files(template_id, project_name) {
            std::fs::write(seed.join(file), contents)?;
        }
        self.git.stage_all(&seed).await?;
        self.git
            .commit(&seed, "initial commit", &self.config.author.name, &self.config.author.email)
            .await?;
        if let Some(parent) = bare_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let seed_url = seed.to_string_lossy().into_owned();
        let dest = bare_path.to_string_lossy().into_owned();
        self.git.clone_bare(&self.config.tmp_dir, &seed_url, &dest).await?;
        let _ = std::fs::remove_dir_all(&seed);

        let repository = Repository {
            id: repo_id.clone(),
            url: bare_path.to_string_lossy().into_owned(),
            path: bare_path,
            default_branch: "main".to_string(),
            is_local: true,
            available: true,
            created_at: Utc::now(),
        };
        self.store.upsert_repository(repository.clone());
        let worktree = self.create_worktree(repo_id.as_str(), None).await?;
        Ok((repository, worktree))
    }

    /// Create a GitHub repository from a local one and push.
    pub async fn create_github_repo(
        &self,
        repo_id: &str,
        name: &str,
        description: &str,
        is_private: bool,
    ) -> Result<String, WorktreeError> {
        let repository = self.require_repository(repo_id)?;
        Ok(self
            .gh
            .repo_create(&repository.path, name, description, is_private)
            .await?)
    }

    /// Repositories visible to the authenticated `gh` user.
    pub async fn github_repos(&self) -> Result<serde_json::Value, WorktreeError> {
        Ok(self.gh.repo_list(&self.config.workspace_dir).await?)
    }
}

/// Branch name used on the remote for PRs: the private slug for ungraduated
/// worktrees, the real branch name after graduation.
fn pr_branch_name(worktree: &Worktree) -> String {
    worktree
        .branch
        .strip_prefix("refs/heads/")
        .map(str::to_string)
        .unwrap_or_else(|| {
            let slug = worktree.branch.rsplit('/').next().unwrap_or("work");
            format!("catnip/{slug}")
        })
}

/// Files seeded by `POST /v1/git/template`.
fn template_files(template_id: &str, project_name: &str) -> Vec<(&'static str, String)> {
    match template_id {
        "node" => vec![
            (
                "package.json",
                format!("{{\n  \"name\": \"{project_name}\",\n  \"version\": \"0.1.0\",\n  \"private\": true\n}}\n"),
            ),
            ("README.md", format!("# {project_name}\n")),
        ],
        _ => vec![("README.md", format!("# {project_name}\n"))],
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
