// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-side session routes under `/v1/sessions`, with ETag support.

use super::error::ApiError;
use super::etag::{etag_for, if_none_match};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use catnip_core::{ActivityState, AgentSession, Worktree};
use serde::Deserialize;
use serde_json::{json, Value};

/// Resolve a workspace selector: worktree UUID, absolute path, full name, or
/// unique trailing name segment.
pub(super) fn resolve_worktree(state: &AppState, selector: &str) -> Option<Worktree> {
    if let Some(id) = catnip_core::WorktreeId::parse(selector) {
        return state.store.get_worktree(id);
    }
    if selector.starts_with('/') {
        return state.store.worktree_by_path(std::path::Path::new(selector));
    }
    if let Some(found) = state.store.worktree_by_name(selector) {
        return Some(found);
    }
    let suffix = format!("/{selector}");
    let matches: Vec<Worktree> = state
        .store
        .list_worktrees()
        .into_iter()
        .filter(|w| w.name.ends_with(&suffix))
        .collect();
    match matches.len() {
        1 => matches.into_iter().next(),
        _ => None,
    }
}

async fn session_for(state: &AppState, worktree: &Worktree) -> Option<AgentSession> {
    // Every registered agent gets a chance; first hit wins. Claude is the
    // common case and sorts first.
    for kind in state.registry.kinds() {
        if let Some(agent) = state.registry.get(kind) {
            if let Some(session) = agent.read_session(&worktree.path).await {
                return Some(session);
            }
        }
    }
    None
}

fn summarized(mut session: AgentSession) -> AgentSession {
    session.messages.clear();
    session
}

/// GET /v1/sessions/active
pub async fn active_sessions(State(state): State<AppState>) -> Json<Value> {
    let mut sessions = Vec::new();
    for worktree in state.store.list_worktrees() {
        if worktree.agent_activity_state == ActivityState::Inactive {
            continue;
        }
        if let Some(session) = session_for(&state, &worktree).await {
            sessions.push(json!({
                "worktree_id": worktree.id,
                "activity_state": worktree.agent_activity_state,
                "session": summarized(session),
            }));
        }
    }
    Json(json!(sessions))
}

/// GET /v1/sessions
pub async fn all_sessions(State(state): State<AppState>) -> Json<Value> {
    let mut sessions = Vec::new();
    for worktree in state.store.list_worktrees() {
        if let Some(session) = session_for(&state, &worktree).await {
            sessions.push(json!({
                "worktree_id": worktree.id,
                "activity_state": worktree.agent_activity_state,
                "session": summarized(session),
            }));
        }
    }
    Json(json!(sessions))
}

#[derive(Debug, Deserialize)]
pub struct WorkspaceSessionQuery {
    #[serde(default)]
    pub full: bool,
}

/// GET /v1/sessions/workspace/{ws}?full=
///
/// Supports `If-None-Match`: the body is hashed after canonical JSON
/// serialization and identical hashes return 304 without a body.
pub async fn workspace_session(
    State(state): State<AppState>,
    Path(ws): Path<String>,
    Query(query): Query<WorkspaceSessionQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let worktree =
        resolve_worktree(&state, &ws).ok_or_else(|| ApiError::not_found(format!("workspace {ws}")))?;
    let session = session_for(&state, &worktree)
        .await
        .ok_or_else(|| ApiError::not_found(format!("no session for {}", worktree.name)))?;
    let session = if query.full { session } else { summarized(session) };

    let body = serde_json::to_value(&session)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let etag = etag_for(&body);
    if if_none_match(&headers, &etag) {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
    }
    Ok((StatusCode::OK, [(header::ETAG, etag)], Json(body)).into_response())
}

/// GET /v1/sessions/workspace/{ws}/session/{uuid}
pub async fn workspace_session_by_uuid(
    State(state): State<AppState>,
    Path((ws, uuid)): Path<(String, String)>,
) -> Result<Json<AgentSession>, ApiError> {
    let worktree =
        resolve_worktree(&state, &ws).ok_or_else(|| ApiError::not_found(format!("workspace {ws}")))?;
    let session = session_for(&state, &worktree)
        .await
        .filter(|s| s.uuid == uuid)
        .ok_or_else(|| ApiError::not_found(format!("session {uuid}")))?;
    Ok(Json(session))
}

/// DELETE /v1/sessions/workspace/{ws}
///
/// Ends PTY sessions working under the workspace and resets its activity
/// state. The agent's own session log on disk is untouched.
pub async fn delete_workspace_session(
    State(state): State<AppState>,
    Path(ws): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let worktree =
        resolve_worktree(&state, &ws).ok_or_else(|| ApiError::not_found(format!("workspace {ws}")))?;

    let mut closed = Vec::new();
    for session in state.engine.list() {
        if session.work_dir.starts_with(&worktree.path) {
            state.engine.remove(&session.id);
            closed.push(session.id.clone());
        }
    }
    let _ = state.store.mutate_worktree(worktree.id, |w| {
        w.agent_activity_state = ActivityState::Inactive;
    });
    state.bus.publish(catnip_core::Event::AgentActivityStateChanged {
        worktree_path: worktree.path.clone(),
        state: ActivityState::Inactive,
    });
    Ok(Json(json!({ "closed_sessions": closed })))
}
