// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn output_success() {
    assert!(GitOutput::ok("x").success());
    assert!(!GitOutput::err(1, "boom").success());
}

#[test]
fn stdout_trimmed_strips_trailing_newlines() {
    let out = GitOutput::ok("abc123\n\n");
    assert_eq!(out.stdout_trimmed(), "abc123");
}

#[test]
fn command_display_joins_argv() {
    assert_eq!(command_display(&["status", "--porcelain"]), "git status --porcelain");
}

#[test]
fn stderr_tail_keeps_short_messages() {
    assert_eq!(stderr_tail("  fatal: oops \n"), "fatal: oops");
}

#[test]
fn stderr_tail_truncates_long_messages() {
    let long = "x".repeat(2000);
    let tail = stderr_tail(&long);
    assert_eq!(tail.len(), 400);
}

#[test]
fn command_failed_carries_context() {
    let out = GitOutput::err(128, "fatal: not a git repository");
    let err = command_failed(&["rev-parse", "HEAD"], &out);
    match err {
        GitError::CommandFailed { command, exit_code, stderr } => {
            assert_eq!(command, "git rev-parse HEAD");
            assert_eq!(exit_code, 128);
            assert!(stderr.contains("not a git repository"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
