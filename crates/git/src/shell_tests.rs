// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::executor::GitExecutor;

#[tokio::test]
async fn runs_git_version() {
    let exec = ShellExecutor::new();
    let dir = tempfile::tempdir().unwrap();
    let out = exec.run(dir.path(), &["version"]).await.unwrap();
    assert!(out.success());
    assert!(out.stdout.starts_with("git version"));
}

#[tokio::test]
async fn quiet_form_captures_nonzero_exit() {
    let exec = ShellExecutor::new();
    let dir = tempfile::tempdir().unwrap();
    // Not a repository: rev-parse fails with 128, run() must not error.
    let out = exec.run(dir.path(), &["rev-parse", "HEAD"]).await.unwrap();
    assert_eq!(out.exit_code, 128);
    assert!(!out.stderr.is_empty());
}

#[tokio::test]
async fn checked_form_surfaces_typed_error() {
    let exec = ShellExecutor::new();
    let dir = tempfile::tempdir().unwrap();
    let err = exec.run_checked(dir.path(), &["rev-parse", "HEAD"]).await.unwrap_err();
    match err {
        GitError::CommandFailed { command, exit_code, .. } => {
            assert_eq!(command, "git rev-parse HEAD");
            assert_eq!(exit_code, 128);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn init_and_rev_parse_roundtrip() {
    let exec = ShellExecutor::new();
    let dir = tempfile::tempdir().unwrap();
    exec.run_checked(dir.path(), &["init", "--initial-branch=main"]).await.unwrap();
    exec.run_checked(dir.path(), &["config", "user.email", "t@example.com"]).await.unwrap();
    exec.run_checked(dir.path(), &["config", "user.name", "t"]).await.unwrap();
    exec.run_checked(dir.path(), &["commit", "--allow-empty", "-m", "init"]).await.unwrap();

    let out = exec.run_checked(dir.path(), &["rev-parse", "HEAD"]).await.unwrap();
    assert_eq!(out.stdout_trimmed().len(), 40);
}
