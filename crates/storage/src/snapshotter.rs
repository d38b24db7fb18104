// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background snapshot loop.
//!
//! Persists the store projection at a fixed interval and once more during
//! shutdown, so a clean exit never loses state. Failures are logged and the
//! loop continues; the daemon treats a failing snapshot path as fatal only
//! at startup.

use crate::snapshot::save_snapshot;
use crate::store::WorktreeStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Run the snapshot loop until cancelled, then take a final snapshot.
pub async fn run_snapshotter(
    store: Arc<WorktreeStore>,
    path: PathBuf,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick fires immediately; skip it so startup reconciliation
    // finishes before the first write.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                snapshot_once(&store, &path, "periodic");
            }
            _ = cancel.cancelled() => {
                snapshot_once(&store, &path, "shutdown");
                return;
            }
        }
    }
}

fn snapshot_once(store: &WorktreeStore, path: &std::path::Path, reason: &str) {
    let state = store.export();
    match save_snapshot(path, &state) {
        Ok(()) => debug!(
            path = %path.display(),
            worktrees = state.worktrees.len(),
            reason,
            "snapshot written"
        ),
        Err(e) => warn!(path = %path.display(), error = %e, "snapshot failed"),
    }
}

#[cfg(test)]
#[path = "snapshotter_tests.rs"]
mod tests;
