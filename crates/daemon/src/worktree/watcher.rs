// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem watcher driving status-cache refreshes.
//!
//! Watches the workspace root recursively; events are mapped to worktrees by
//! longest-path match and coalesced per worktree over a short window so a
//! compiler writing hundreds of files triggers one recomputation, not
//! hundreds.

use super::service::WorktreeService;
use catnip_core::WorktreeId;
use notify::{Config, Event as NotifyEvent, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Coalescing window for file events within one worktree.
const COALESCE_WINDOW: Duration = Duration::from_millis(500);

/// Run the watcher until cancelled.
pub async fn run_status_watcher(
    service: Arc<WorktreeService>,
    workspace_dir: PathBuf,
    cancel: CancellationToken,
) {
    let (tx, mut rx) = mpsc::channel::<PathBuf>(256);

    // notify runs its own thread; bridge into tokio with a blocking send.
    let mut watcher = match RecommendedWatcher::new(
        move |result: Result<NotifyEvent, notify::Error>| {
            if let Ok(event) = result {
                for path in event.paths {
                    // Git bookkeeping churns constantly; worktree content is
                    // what the status cache projects.
                    if path.components().any(|c| c.as_os_str() == ".git") {
                        continue;
                    }
                    let _ = tx.blocking_send(path);
                }
            }
        },
        Config::default(),
    ) {
        Ok(watcher) => watcher,
        Err(e) => {
            warn!(error = %e, "could not create filesystem watcher");
            return;
        }
    };
    if let Err(e) = watcher.watch(&workspace_dir, RecursiveMode::Recursive) {
        warn!(dir = %workspace_dir.display(), error = %e, "could not watch workspace dir");
        return;
    }
    debug!(dir = %workspace_dir.display(), "status watcher running");

    let mut pending: HashMap<WorktreeId, tokio::time::Instant> = HashMap::new();
    let mut ticker = tokio::time::interval(COALESCE_WINDOW / 2);

    loop {
        tokio::select! {
            maybe_path = rx.recv() => {
                let Some(path) = maybe_path else { return };
                if let Some(worktree) = service.store().worktree_containing(&path) {
                    pending.insert(worktree.id, tokio::time::Instant::now() + COALESCE_WINDOW);
                }
            }
            _ = ticker.tick() => {
                let now = tokio::time::Instant::now();
                let due: Vec<WorktreeId> = pending
                    .iter()
                    .filter(|(_, deadline)| **deadline <= now)
                    .map(|(id, _)| *id)
                    .collect();
                for id in due {
                    pending.remove(&id);
                    if let Err(e) = service.refresh_status(id).await {
                        debug!(worktree = %id, error = %e, "watcher status refresh failed");
                    }
                }
            }
            _ = cancel.cancelled() => return,
        }
    }
}
