// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minute-granularity supervisor for idle sessions.

use crate::engine::PtyEngine;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Run the idle reaper until cancelled.
pub async fn run_reaper(engine: Arc<PtyEngine>, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(Duration::from_secs(60));
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let reaped = engine.reap_idle(Instant::now());
                if !reaped.is_empty() {
                    debug!(count = reaped.len(), "reaped idle pty sessions");
                }
            }
            _ = cancel.cancelled() => return,
        }
    }
}
