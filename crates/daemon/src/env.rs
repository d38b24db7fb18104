// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

/// HTTP port (default 8080).
pub fn port() -> u16 {
    std::env::var("CATNIP_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080)
}

/// Root under which worktree checkouts live.
pub fn workspace_dir() -> PathBuf {
    std::env::var("WORKSPACE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/workspace"))
}

/// Resolve state directory: CATNIP_STATE_DIR > GIT_STATE_DIR > ~/.local/state/catnip
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CATNIP_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(dir) = std::env::var("GIT_STATE_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/root".to_string());
    PathBuf::from(home).join(".local/state/catnip")
}

/// Dev mode: unknown root paths proxy to the local frontend dev server.
pub fn dev_mode() -> bool {
    std::env::var("CATNIP_DEV").is_ok_and(|v| !v.is_empty() && v != "0" && v != "false")
}

/// Port of the frontend dev server proxied in dev mode.
pub fn dev_server_port() -> u16 {
    std::env::var("CATNIP_DEV_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5173)
}

/// Whether SSH into the container is enabled (reported on container:status).
pub fn ssh_enabled() -> bool {
    std::env::var("CATNIP_SSH_ENABLED").is_ok_and(|v| v == "1" || v == "true")
}

/// Snapshot interval override (default 60s).
pub fn snapshot_interval() -> Duration {
    std::env::var("CATNIP_SNAPSHOT_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(60))
}

/// Port scan interval override (default 2s).
pub fn port_scan_interval() -> Duration {
    std::env::var("CATNIP_PORT_SCAN_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(2))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
