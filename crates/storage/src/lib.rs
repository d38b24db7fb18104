// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! catnip-storage: in-memory worktree state with JSON snapshot persistence.
//!
//! The store is the single owner of the repository and worktree maps. All
//! mutations funnel through it behind one RW lock; nothing performs I/O while
//! holding that lock. A background snapshotter persists the projection to
//! `state.json` and a startup reconciler resolves drift between the snapshot
//! and the filesystem.

pub mod reconcile;
pub mod snapshot;
pub mod snapshotter;
pub mod store;

pub use reconcile::{reconcile, ReconcileReport};
pub use snapshot::{load_snapshot, save_snapshot, Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
pub use snapshotter::run_snapshotter;
pub use store::{StoreError, StoreState, WorktreeStore};
