// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! catnip-git: Git executor abstraction and typed operations.
//!
//! Everything above this crate goes through [`GitExecutor`]; no layer ever
//! assembles a shell string. Three implementations exist: the subprocess
//! [`ShellExecutor`] (production), a `git2`-backed read path behind the
//! `libgit2` feature, and the scripted [`InMemoryExecutor`] for tests.

pub mod executor;
#[cfg(feature = "libgit2")]
pub mod git2_backend;
pub mod memory;
pub mod ops;
pub mod shell;

pub use executor::{GitError, GitExecutor, GitOutput};
#[cfg(feature = "libgit2")]
pub use git2_backend::Git2Executor;
pub use memory::InMemoryExecutor;
pub use ops::{DiffStat, Git, WorktreeListEntry};
pub use shell::ShellExecutor;
