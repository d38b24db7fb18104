// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared daemon state handed to every HTTP handler via axum `State`.

use crate::agent_events::AgentEventProcessor;
use crate::commit_sync::CommitSyncService;
use crate::events::EventBus;
use crate::lifecycle::Config;
use crate::ports::PortMonitor;
use crate::worktree::WorktreeService;
use catnip_agents::AgentRegistry;
use catnip_pty::PtyEngine;
use catnip_storage::WorktreeStore;
use std::sync::Arc;
use std::time::Instant;

/// Everything a request handler can reach. Entities reference each other by
/// id; the store is the single owner of repository/worktree state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<WorktreeStore>,
    pub bus: Arc<EventBus>,
    pub engine: Arc<PtyEngine>,
    pub registry: Arc<AgentRegistry>,
    pub worktrees: Arc<WorktreeService>,
    pub commit_sync: Arc<CommitSyncService>,
    pub agent_events: Arc<AgentEventProcessor>,
    pub ports: Arc<PortMonitor>,
    pub http_client: reqwest::Client,
    pub started_at: Instant,
}
