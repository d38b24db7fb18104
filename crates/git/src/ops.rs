// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed Git operations over a [`GitExecutor`].
//!
//! We deliberately drive the `git` CLI rather than linking libgit2 for
//! mutations: the CLI refuses to clobber uncommitted work during
//! checkout/merge/rebase, respects sparse-checkout, and its conflict
//! semantics match what users see in their own terminals. The optional
//! `libgit2` backend accelerates read-only queries only.

use crate::executor::{GitError, GitExecutor, GitOutput};
use std::path::Path;
use std::sync::Arc;

/// Parsed `git diff --shortstat` summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStat {
    pub files_changed: u64,
    pub insertions: u64,
    pub deletions: u64,
}

/// One entry from `git worktree list --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeListEntry {
    pub path: String,
    /// Fully-qualified ref, `None` when detached.
    pub branch: Option<String>,
}

/// Typed operation layer shared by the worktree manager and commit-sync.
#[derive(Clone)]
pub struct Git {
    exec: Arc<dyn GitExecutor>,
}

impl Git {
    pub fn new(exec: Arc<dyn GitExecutor>) -> Self {
        Self { exec }
    }

    pub fn executor(&self) -> &Arc<dyn GitExecutor> {
        &self.exec
    }

    // -- repository setup --

    pub async fn init_bare(&self, path: &Path, initial_branch: &str) -> Result<(), GitError> {
        let branch_arg = format!("--initial-branch={initial_branch}");
        self.exec
            .run_checked(path, &["init", "--bare", &branch_arg])
            .await?;
        Ok(())
    }

    pub async fn clone_bare(&self, workdir: &Path, url: &str, dest: &str) -> Result<(), GitError> {
        self.exec
            .run_checked(workdir, &["clone", "--bare", url, dest])
            .await?;
        Ok(())
    }

    pub async fn fetch(&self, repo: &Path, remote: &str) -> Result<(), GitError> {
        self.exec.run_checked(repo, &["fetch", remote]).await?;
        Ok(())
    }

    pub async fn push(&self, workdir: &Path, remote: &str, refspec: &str) -> Result<(), GitError> {
        self.exec.run_checked(workdir, &["push", remote, refspec]).await?;
        Ok(())
    }

    /// The branch HEAD points at, e.g. `main` for a fresh bare clone.
    pub async fn default_branch(&self, repo: &Path) -> Result<String, GitError> {
        let out = self.exec.run_checked(repo, &["symbolic-ref", "HEAD"]).await?;
        Ok(out
            .stdout_trimmed()
            .strip_prefix("refs/heads/")
            .unwrap_or(out.stdout_trimmed())
            .to_string())
    }

    // -- refs --

    pub async fn ref_exists(&self, repo: &Path, refname: &str) -> Result<bool, GitError> {
        let out = self
            .exec
            .run(repo, &["show-ref", "--verify", "--quiet", refname])
            .await?;
        Ok(out.success())
    }

    /// Resolve a revision to a full object id; `None` if it doesn't exist.
    pub async fn rev_parse(&self, workdir: &Path, rev: &str) -> Result<Option<String>, GitError> {
        let out = self.exec.run(workdir, &["rev-parse", "--verify", rev]).await?;
        if out.success() {
            Ok(Some(out.stdout_trimmed().to_string()))
        } else {
            // git uses 128 for unknown revisions; treat any failure as absent
            Ok(None)
        }
    }

    pub async fn update_ref(&self, repo: &Path, refname: &str, commit: &str) -> Result<(), GitError> {
        self.exec.run_checked(repo, &["update-ref", refname, commit]).await?;
        Ok(())
    }

    pub async fn delete_ref(&self, repo: &Path, refname: &str) -> Result<(), GitError> {
        self.exec.run_checked(repo, &["update-ref", "-d", refname]).await?;
        Ok(())
    }

    pub async fn list_branches(&self, repo: &Path) -> Result<Vec<String>, GitError> {
        let out = self
            .exec
            .run_checked(repo, &["for-each-ref", "--format=%(refname:short)", "refs/heads"])
            .await?;
        Ok(out.stdout.lines().map(str::to_string).collect())
    }

    /// Refs under the private namespace, fully qualified.
    pub async fn list_private_refs(&self, repo: &Path) -> Result<Vec<String>, GitError> {
        let out = self
            .exec
            .run_checked(repo, &["for-each-ref", "--format=%(refname)", "refs/catnip"])
            .await?;
        Ok(out.stdout.lines().map(str::to_string).collect())
    }

    /// Point a worktree's HEAD at a (possibly private) ref without touching
    /// the index or working files.
    pub async fn set_symbolic_head(&self, worktree: &Path, refname: &str) -> Result<(), GitError> {
        self.exec.run_checked(worktree, &["symbolic-ref", "HEAD", refname]).await?;
        Ok(())
    }

    /// The fully-qualified ref a worktree has checked out, `None` if detached.
    pub async fn symbolic_head(&self, worktree: &Path) -> Result<Option<String>, GitError> {
        let out = self.exec.run(worktree, &["symbolic-ref", "HEAD"]).await?;
        if out.success() {
            Ok(Some(out.stdout_trimmed().to_string()))
        } else {
            Ok(None)
        }
    }

    // -- worktrees --

    pub async fn worktree_add_detached(
        &self,
        repo: &Path,
        worktree_path: &str,
        start_point: &str,
    ) -> Result<(), GitError> {
        self.exec
            .run_checked(repo, &["worktree", "add", "--detach", worktree_path, start_point])
            .await?;
        Ok(())
    }

    pub async fn worktree_remove(
        &self,
        repo: &Path,
        worktree_path: &str,
        force: bool,
    ) -> Result<(), GitError> {
        if force {
            self.exec
                .run_checked(repo, &["worktree", "remove", "--force", worktree_path])
                .await?;
        } else {
            self.exec
                .run_checked(repo, &["worktree", "remove", worktree_path])
                .await?;
        }
        Ok(())
    }

    pub async fn worktree_prune(&self, repo: &Path) -> Result<(), GitError> {
        self.exec.run_checked(repo, &["worktree", "prune"]).await?;
        Ok(())
    }

    pub async fn worktree_list(&self, repo: &Path) -> Result<Vec<WorktreeListEntry>, GitError> {
        let out = self
            .exec
            .run_checked(repo, &["worktree", "list", "--porcelain"])
            .await?;
        Ok(parse_worktree_porcelain(&out.stdout))
    }

    // -- status and history queries --

    pub async fn is_dirty(&self, worktree: &Path) -> Result<bool, GitError> {
        let out = self.exec.run_checked(worktree, &["status", "--porcelain"]).await?;
        Ok(!out.stdout.trim().is_empty())
    }

    pub async fn diff_stat(&self, worktree: &Path, base: &str) -> Result<DiffStat, GitError> {
        let out = self.exec.run_checked(worktree, &["diff", "--shortstat", base]).await?;
        Ok(parse_shortstat(&out.stdout))
    }

    pub async fn diff(&self, worktree: &Path, base: &str) -> Result<String, GitError> {
        let out = self.exec.run_checked(worktree, &["diff", base]).await?;
        Ok(out.stdout)
    }

    /// `(ahead, behind)` of `ours` relative to `theirs`.
    pub async fn ahead_behind(
        &self,
        workdir: &Path,
        ours: &str,
        theirs: &str,
    ) -> Result<(u64, u64), GitError> {
        let range = format!("{theirs}...{ours}");
        let out = self
            .exec
            .run_checked(workdir, &["rev-list", "--left-right", "--count", &range])
            .await?;
        // Left column counts commits only on `theirs` (behind), right only on `ours` (ahead).
        let (behind, ahead) = parse_left_right(out.stdout_trimmed()).ok_or_else(|| {
            GitError::Unsupported(format!("unparseable rev-list output: {:?}", out.stdout))
        })?;
        Ok((ahead, behind))
    }

    pub async fn commit_count(&self, workdir: &Path, range: &str) -> Result<u64, GitError> {
        let out = self.exec.run_checked(workdir, &["rev-list", "--count", range]).await?;
        Ok(out.stdout_trimmed().parse().unwrap_or(0))
    }

    /// One-line subjects for commits in `range`, newest first.
    pub async fn log_subjects(&self, workdir: &Path, range: &str) -> Result<Vec<String>, GitError> {
        let out = self
            .exec
            .run_checked(workdir, &["log", "--format=%s", range])
            .await?;
        Ok(out.stdout.lines().map(str::to_string).collect())
    }

    pub async fn is_ancestor(
        &self,
        workdir: &Path,
        ancestor: &str,
        descendant: &str,
    ) -> Result<bool, GitError> {
        let out = self
            .exec
            .run(workdir, &["merge-base", "--is-ancestor", ancestor, descendant])
            .await?;
        match out.exit_code {
            0 => Ok(true),
            1 => Ok(false),
            _ => Err(crate::executor::command_failed(
                &["merge-base", "--is-ancestor", ancestor, descendant],
                &out,
            )),
        }
    }

    pub async fn conflicted_files(&self, worktree: &Path) -> Result<Vec<String>, GitError> {
        let out = self
            .exec
            .run_checked(worktree, &["diff", "--name-only", "--diff-filter=U"])
            .await?;
        Ok(out.stdout.lines().map(str::to_string).collect())
    }

    pub async fn rebase_in_progress(&self, worktree: &Path) -> Result<bool, GitError> {
        let git_dir = self.git_dir(worktree).await?;
        Ok(git_dir.join("rebase-merge").exists() || git_dir.join("rebase-apply").exists())
    }

    pub async fn merge_in_progress(&self, worktree: &Path) -> Result<bool, GitError> {
        let git_dir = self.git_dir(worktree).await?;
        Ok(git_dir.join("MERGE_HEAD").exists())
    }

    async fn git_dir(&self, worktree: &Path) -> Result<std::path::PathBuf, GitError> {
        let out = self
            .exec
            .run_checked(worktree, &["rev-parse", "--absolute-git-dir"])
            .await?;
        Ok(std::path::PathBuf::from(out.stdout_trimmed()))
    }

    // -- mutations --

    /// Quiet rebase; callers inspect the output and abort on conflict.
    pub async fn rebase(&self, worktree: &Path, upstream: &str) -> Result<GitOutput, GitError> {
        self.exec.run(worktree, &["rebase", upstream]).await
    }

    pub async fn abort_rebase(&self, worktree: &Path) -> Result<(), GitError> {
        self.exec.run_checked(worktree, &["rebase", "--abort"]).await?;
        Ok(())
    }

    /// Quiet merge; callers inspect the output and abort on conflict.
    pub async fn merge(
        &self,
        worktree: &Path,
        branch: &str,
        message: &str,
    ) -> Result<GitOutput, GitError> {
        self.exec
            .run(worktree, &["merge", "--no-ff", "-m", message, branch])
            .await
    }

    /// Quiet squash merge: stages the squashed tree, then commits with the
    /// supplied message on success.
    pub async fn merge_squash(
        &self,
        worktree: &Path,
        branch: &str,
        message: &str,
        author: &str,
    ) -> Result<GitOutput, GitError> {
        let out = self.exec.run(worktree, &["merge", "--squash", branch]).await?;
        if !out.success() {
            return Ok(out);
        }
        self.exec
            .run(worktree, &["commit", "--author", author, "-m", message])
            .await
    }

    pub async fn abort_merge(&self, worktree: &Path) -> Result<(), GitError> {
        self.exec.run_checked(worktree, &["merge", "--abort"]).await?;
        Ok(())
    }

    pub async fn stage_all(&self, worktree: &Path) -> Result<(), GitError> {
        self.exec.run_checked(worktree, &["add", "-A"]).await?;
        Ok(())
    }

    pub async fn commit(
        &self,
        worktree: &Path,
        message: &str,
        author_name: &str,
        author_email: &str,
    ) -> Result<(), GitError> {
        let name_cfg = format!("user.name={author_name}");
        let email_cfg = format!("user.email={author_email}");
        self.exec
            .run_checked(worktree, &["-c", &name_cfg, "-c", &email_cfg, "commit", "-m", message])
            .await?;
        Ok(())
    }
}

/// Parse `git diff --shortstat` output.
///
/// Example: ` 3 files changed, 10 insertions(+), 2 deletions(-)`; every
/// component is optional, an empty diff prints nothing at all.
pub fn parse_shortstat(s: &str) -> DiffStat {
    let mut stat = DiffStat::default();
    for part in s.trim().split(',') {
        let part = part.trim();
        let Some(n) = part.split_whitespace().next().and_then(|w| w.parse::<u64>().ok()) else {
            continue;
        };
        if part.contains("file") {
            stat.files_changed = n;
        } else if part.contains("insertion") {
            stat.insertions = n;
        } else if part.contains("deletion") {
            stat.deletions = n;
        }
    }
    stat
}

/// Parse `git rev-list --left-right --count` output: `"<left>\t<right>"`.
pub fn parse_left_right(s: &str) -> Option<(u64, u64)> {
    let mut parts = s.split_whitespace();
    let left = parts.next()?.parse().ok()?;
    let right = parts.next()?.parse().ok()?;
    Some((left, right))
}

/// Parse `git worktree list --porcelain` output into entries.
pub fn parse_worktree_porcelain(s: &str) -> Vec<WorktreeListEntry> {
    let mut entries = Vec::new();
    let mut path: Option<String> = None;
    let mut branch: Option<String> = None;
    for line in s.lines().chain(std::iter::once("")) {
        if line.is_empty() {
            if let Some(p) = path.take() {
                entries.push(WorktreeListEntry { path: p, branch: branch.take() });
            }
            continue;
        }
        if let Some(p) = line.strip_prefix("worktree ") {
            path = Some(p.to_string());
        } else if let Some(b) = line.strip_prefix("branch ") {
            branch = Some(b.to_string());
        }
    }
    entries
}

#[cfg(test)]
#[path = "ops_tests.rs"]
mod tests;
