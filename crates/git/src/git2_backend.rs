// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Library-backed read path (feature `libgit2`).
//!
//! Handles the hot read-only queries in-process via libgit2 and delegates
//! everything else to a wrapped executor. Mutations stay on the CLI on
//! purpose: libgit2 does not enforce the CLI's working-tree protections.

use crate::executor::{GitError, GitExecutor, GitOutput};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Executor that answers repeated read queries from libgit2 and falls back
/// to the wrapped executor for everything else.
pub struct Git2Executor {
    fallback: Arc<dyn GitExecutor>,
}

impl Git2Executor {
    pub fn new(fallback: Arc<dyn GitExecutor>) -> Self {
        Self { fallback }
    }

    fn try_native(workdir: &Path, args: &[&str]) -> Option<GitOutput> {
        let repo = git2::Repository::open(workdir).ok()?;
        match args {
            ["rev-parse", "--verify", rev] => match repo.revparse_single(rev) {
                Ok(obj) => Some(GitOutput::ok(format!("{}\n", obj.id()))),
                Err(_) => Some(GitOutput::err(128, format!("fatal: needed a single revision: {rev}"))),
            },
            ["symbolic-ref", "HEAD"] => {
                let head = repo.find_reference("HEAD").ok()?;
                match head.symbolic_target() {
                    Some(target) => Some(GitOutput::ok(format!("{target}\n"))),
                    None => Some(GitOutput::err(128, "fatal: ref HEAD is not a symbolic ref")),
                }
            }
            ["rev-list", "--left-right", "--count", range] => {
                let (theirs, ours) = range.split_once("...")?;
                let theirs = repo.revparse_single(theirs).ok()?.id();
                let ours = repo.revparse_single(ours).ok()?.id();
                let (ahead, behind) = repo.graph_ahead_behind(ours, theirs).ok()?;
                Some(GitOutput::ok(format!("{behind}\t{ahead}\n")))
            }
            ["for-each-ref", format, prefix] if *format == "--format=%(refname)" => {
                let glob = format!("{}/*", prefix.trim_end_matches('/'));
                let refs = repo.references_glob(&glob).ok()?;
                let mut names: Vec<String> =
                    refs.filter_map(|r| r.ok().and_then(|r| r.name().map(str::to_string))).collect();
                names.sort();
                let mut out = names.join("\n");
                if !out.is_empty() {
                    out.push('\n');
                }
                Some(GitOutput::ok(out))
            }
            ["merge-base", "--is-ancestor", ancestor, descendant] => {
                let a = repo.revparse_single(ancestor).ok()?.id();
                let d = repo.revparse_single(descendant).ok()?.id();
                let is = repo.graph_descendant_of(d, a).ok()? || a == d;
                Some(if is { GitOutput::ok("") } else { GitOutput::err(1, "") })
            }
            _ => None,
        }
    }
}

#[async_trait]
impl GitExecutor for Git2Executor {
    async fn run(&self, workdir: &Path, args: &[&str]) -> Result<GitOutput, GitError> {
        if let Some(out) = Self::try_native(workdir, args) {
            return Ok(out);
        }
        self.fallback.run(workdir, args).await
    }
}
