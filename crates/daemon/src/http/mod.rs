// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Route table and facade plumbing.
//!
//! `/v1/...` for the REST surface, `/v1/pty` for the WebSocket upgrade,
//! `/v1/events` for SSE, and everything else falls through to the port
//! proxy.

pub mod agent_routes;
pub mod error;
pub mod etag;
pub mod git_routes;
pub mod logging;
pub mod misc_routes;
pub mod port_routes;
pub mod pty_ws;
pub mod session_routes;

use crate::events::sse;
use crate::proxy;
use crate::state::AppState;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub use error::ApiError;

/// Build the complete router for the daemon.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let v1 = Router::new()
        // -- git/worktrees --
        .route("/git/status", get(git_routes::git_status))
        .route("/git/worktrees", get(git_routes::list_worktrees))
        .route("/git/checkout/{org}/{repo}", post(git_routes::checkout))
        .route("/git/worktrees/cleanup", post(git_routes::cleanup_worktrees))
        .route("/git/worktrees/{id}", delete(git_routes::delete_worktree))
        .route("/git/worktrees/{id}/sync", post(git_routes::sync_worktree))
        .route("/git/worktrees/{id}/sync/check", get(git_routes::sync_check))
        .route("/git/worktrees/{id}/merge", post(git_routes::merge_worktree))
        .route("/git/worktrees/{id}/merge/check", get(git_routes::merge_check))
        .route("/git/worktrees/{id}/diff", get(git_routes::worktree_diff))
        .route(
            "/git/worktrees/{id}/pr",
            post(git_routes::create_pr).put(git_routes::update_pr),
        )
        .route("/git/worktrees/{id}/graduate", post(git_routes::graduate))
        .route("/git/worktrees/{id}/refresh", post(git_routes::refresh_worktree))
        .route("/git/branches/{org}/{repo}", get(git_routes::list_branches))
        .route("/git/github/repos", get(git_routes::github_repos))
        .route("/git/template", post(git_routes::create_template))
        .route(
            "/git/repositories/{org}/{repo}/github",
            post(git_routes::create_github_repo),
        )
        .route(
            "/git/repositories/{org}/{repo}",
            delete(git_routes::delete_repository),
        )
        // -- agents --
        .route("/agents", get(agent_routes::list_agents))
        .route("/agents/session", get(agent_routes::agent_session))
        .route("/agents/sessions", get(agent_routes::agent_sessions))
        .route("/agents/session/{uuid}", get(agent_routes::agent_session_by_uuid))
        .route("/agents/messages", post(agent_routes::send_message))
        .route("/agents/todos", get(agent_routes::agent_todos))
        .route("/agents/latest-message", get(agent_routes::latest_message))
        .route(
            "/agents/settings",
            get(agent_routes::get_settings).put(agent_routes::put_settings),
        )
        .route("/agents/events", post(agent_routes::agent_event))
        // -- sessions (read side) --
        .route("/sessions/active", get(session_routes::active_sessions))
        .route("/sessions", get(session_routes::all_sessions))
        .route(
            "/sessions/workspace/{ws}",
            get(session_routes::workspace_session)
                .delete(session_routes::delete_workspace_session),
        )
        .route(
            "/sessions/workspace/{ws}/session/{uuid}",
            get(session_routes::workspace_session_by_uuid),
        )
        // -- ports --
        .route("/ports", get(port_routes::list_ports))
        .route("/ports/mappings", post(port_routes::add_mapping))
        .route("/ports/mappings/{port}", delete(port_routes::remove_mapping))
        .route("/ports/{port}", get(port_routes::get_port))
        // -- events / pty / misc --
        .route("/events", get(sse::stream))
        .route("/pty", get(pty_ws::upgrade))
        .route("/health", get(misc_routes::health))
        .route("/upload", post(misc_routes::upload))
        .route("/notifications", post(misc_routes::notify));

    Router::new()
        .nest("/v1", v1)
        .fallback(proxy::handle)
        .layer(axum::middleware::from_fn(logging::sampling_log))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
