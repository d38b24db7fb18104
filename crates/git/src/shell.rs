// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess git executor.
//!
//! Invocations run with a scrubbed environment: only `HOME`, `PATH`, and
//! `GIT_*` proxy/credential variables survive, and the locale is pinned to C
//! so output parsing is stable. Every invocation carries a deadline; on
//! timeout the whole process group is killed so helpers (`ssh`,
//! `credential-*`) don't linger.

use crate::executor::{command_display, GitError, GitExecutor, GitOutput};
use async_trait::async_trait;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Default per-invocation deadline.
pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variables that would redirect git at the wrong repository if
/// inherited from the daemon's own environment.
const SCRUBBED_GIT_VARS: [&str; 3] = ["GIT_DIR", "GIT_WORK_TREE", "GIT_INDEX_FILE"];

/// Production executor that spawns the `git` binary.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    git_binary: PathBuf,
    timeout: Duration,
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self { git_binary: PathBuf::from("git"), timeout: DEFAULT_GIT_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_git_binary(mut self, path: PathBuf) -> Self {
        self.git_binary = path;
        self
    }

    fn build_command(&self, workdir: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.git_binary);
        cmd.args(args)
            .current_dir(workdir)
            .env_clear()
            .env("LC_ALL", "C")
            .env("LANG", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Separate process group: a timeout kill reaches helpers too, and
            // Ctrl-C on an interactive daemon doesn't interrupt git mid-write.
            .process_group(0)
            .kill_on_drop(true);
        for (key, value) in std::env::vars() {
            let keep = key == "HOME"
                || key == "PATH"
                || (key.starts_with("GIT_") && !SCRUBBED_GIT_VARS.contains(&key.as_str()));
            if keep {
                cmd.env(key, value);
            }
        }
        cmd
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GitExecutor for ShellExecutor {
    async fn run(&self, workdir: &Path, args: &[&str]) -> Result<GitOutput, GitError> {
        let mut cmd = self.build_command(workdir, args);
        let child = cmd.spawn()?;
        let pid = child.id();

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                // kill_on_drop already reaped the direct child; sweep the group.
                if let Some(pid) = pid {
                    let _ = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL);
                }
                return Err(GitError::Timeout {
                    command: command_display(args),
                    timeout: self.timeout,
                });
            }
        };

        let result = GitOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(
            command = %command_display(args),
            workdir = %workdir.display(),
            exit_code = result.exit_code,
            "git"
        );
        Ok(result)
    }
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
