// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! catnip-daemon: the long-running workbench server.
//!
//! Hosts the worktree manager, commit-sync, port monitor, reverse proxy,
//! SSE event bus, and the HTTP/WebSocket facade over one axum server.

pub mod agent_events;
pub mod commit_sync;
pub mod env;
pub mod events;
pub mod gh;
pub mod http;
pub mod lifecycle;
pub mod ports;
pub mod proxy;
pub mod state;
pub mod worktree;

pub use lifecycle::{Config, DaemonError};
pub use state::AppState;
