// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request-sampling log layer.
//!
//! Every API call logs, except high-frequency polling endpoints which are
//! summarized every N calls and static-asset requests which are filtered
//! entirely.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Summarize high-frequency endpoints once per this many calls.
const SAMPLE_EVERY: u64 = 100;

static SAMPLED_CALLS: AtomicU64 = AtomicU64::new(0);

/// Polling endpoints that would otherwise drown the log.
fn is_high_frequency(path: &str) -> bool {
    path == "/v1/ports"
        || path == "/v1/git/status"
        || path == "/v1/health"
        || path.starts_with("/v1/sessions")
}

/// Static assets and proxied frontend chatter are not API calls.
fn is_static_asset(path: &str) -> bool {
    const ASSET_EXTENSIONS: [&str; 9] = [
        ".js", ".css", ".map", ".png", ".svg", ".ico", ".woff", ".woff2", ".html",
    ];
    ASSET_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) || path.starts_with("/assets/")
}

pub async fn sampling_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();
    let response = next.run(req).await;
    let status = response.status().as_u16();
    let elapsed_ms = start.elapsed().as_millis() as u64;

    if is_static_asset(&path) {
        return response;
    }
    if is_high_frequency(&path) {
        let count = SAMPLED_CALLS.fetch_add(1, Ordering::Relaxed) + 1;
        if count % SAMPLE_EVERY == 0 {
            info!(calls = count, %method, %path, "high-frequency endpoints (sampled)");
        } else {
            debug!(%method, %path, status, elapsed_ms, "api");
        }
        return response;
    }

    info!(%method, %path, status, elapsed_ms, "api");
    response
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
