// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent routes under `/v1/agents`.

use super::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use catnip_agents::AgentLifecycleEvent;
use catnip_pty::{send_prompt, PromptSpec};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

/// GET /v1/agents
pub async fn list_agents(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "agents": state.registry.kinds() }))
}

#[derive(Debug, Deserialize)]
pub struct WorktreePathQuery {
    pub worktree_path: PathBuf,
    #[serde(default = "default_agent_type")]
    pub agent_type: String,
}

fn default_agent_type() -> String {
    "claude".to_string()
}

/// GET /v1/agents/session?worktree_path=
pub async fn agent_session(
    State(state): State<AppState>,
    Query(query): Query<WorktreePathQuery>,
) -> Result<Json<Value>, ApiError> {
    let agent = state
        .registry
        .get(&query.agent_type)
        .ok_or_else(|| ApiError::not_found(format!("agent {}", query.agent_type)))?;
    let session = agent
        .read_session(&query.worktree_path)
        .await
        .ok_or_else(|| ApiError::not_found("no session for worktree"))?;
    Ok(Json(json!(session)))
}

/// GET /v1/agents/sessions
pub async fn agent_sessions(State(state): State<AppState>) -> Json<Value> {
    let mut sessions = Vec::new();
    for worktree in state.store.list_worktrees() {
        for kind in state.registry.kinds() {
            let Some(agent) = state.registry.get(kind) else { continue };
            if let Some(session) = agent.read_session(&worktree.path).await {
                sessions.push(json!({ "agent": kind, "session": session }));
            }
        }
    }
    Json(json!(sessions))
}

/// GET /v1/agents/session/{uuid}
pub async fn agent_session_by_uuid(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Json<Value>, ApiError> {
    for worktree in state.store.list_worktrees() {
        for kind in state.registry.kinds() {
            let Some(agent) = state.registry.get(kind) else { continue };
            if let Some(session) = agent.read_session(&worktree.path).await {
                if session.uuid == uuid {
                    return Ok(Json(json!(session)));
                }
            }
        }
    }
    Err(ApiError::not_found(format!("session {uuid}")))
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub prompt: String,
    #[serde(default)]
    pub working_directory: Option<PathBuf>,
    #[serde(default = "default_agent_type")]
    pub agent_type: String,
    /// Resume the existing session rather than requiring a fresh one.
    /// Session identity is `(working directory, agent)` either way, so this
    /// is accepted and implied.
    #[serde(default)]
    pub resume: bool,
    /// Accepted for wire compatibility; the interactive PTY path always
    /// streams output to attached subscribers.
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub max_turns: Option<u32>,
}

/// POST /v1/agents/messages
///
/// Synchronous prompt injection: ensures the PTY session exists, waits up to
/// the readiness budget for the agent's prompt marker, writes the prompt and
/// terminator, and returns once written.
pub async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<Value>, ApiError> {
    if request.prompt.is_empty() {
        return Err(ApiError::invalid("prompt must not be empty"));
    }
    let agent = state
        .registry
        .get(&request.agent_type)
        .ok_or_else(|| ApiError::not_found(format!("agent {}", request.agent_type)))?;
    tracing::debug!(
        agent = %request.agent_type,
        resume = request.resume,
        stream = request.stream,
        has_system_prompt = request.system_prompt.is_some(),
        max_turns = ?request.max_turns,
        "prompt delivery requested"
    );

    let work_dir = request
        .working_directory
        .clone()
        .unwrap_or_else(|| state.config.workspace_dir.clone());
    let session_id = format!(
        "{}-{}",
        request.agent_type,
        catnip_agents::claude::munge_project_path(&work_dir)
    );
    let session = state
        .engine
        .get_or_create(&session_id, &request.agent_type, &work_dir)?;

    let spec = PromptSpec {
        ready_pattern: agent.ready_pattern(),
        terminator: agent.prompt_terminator().to_string(),
        ..PromptSpec::default()
    };
    send_prompt(&session, &request.prompt, &spec).await?;
    Ok(Json(json!({ "delivered": true, "session_id": session_id })))
}

/// GET /v1/agents/todos?worktree_path=
pub async fn agent_todos(
    State(state): State<AppState>,
    Query(query): Query<WorktreePathQuery>,
) -> Result<Json<Value>, ApiError> {
    let agent = state
        .registry
        .get(&query.agent_type)
        .ok_or_else(|| ApiError::not_found(format!("agent {}", query.agent_type)))?;
    Ok(Json(json!({ "todos": agent.read_todos(&query.worktree_path).await })))
}

/// GET /v1/agents/latest-message?worktree_path=
pub async fn latest_message(
    State(state): State<AppState>,
    Query(query): Query<WorktreePathQuery>,
) -> Result<Json<Value>, ApiError> {
    let agent = state
        .registry
        .get(&query.agent_type)
        .ok_or_else(|| ApiError::not_found(format!("agent {}", query.agent_type)))?;
    Ok(Json(json!({
        "message": agent.read_latest_assistant_message(&query.worktree_path).await,
    })))
}

#[derive(Debug, Deserialize)]
pub struct SettingsQuery {
    #[serde(default = "default_agent_type")]
    pub agent_type: String,
}

fn settings_path(state: &AppState, agent_type: &str) -> PathBuf {
    state
        .config
        .state_dir
        .join(format!("agent-settings-{agent_type}.json"))
}

/// GET /v1/agents/settings?agent_type=
pub async fn get_settings(
    State(state): State<AppState>,
    Query(query): Query<SettingsQuery>,
) -> Result<Json<Value>, ApiError> {
    let path = settings_path(&state, &query.agent_type);
    match tokio::fs::read_to_string(&path).await {
        Ok(contents) => {
            let value = serde_json::from_str(&contents)
                .map_err(|e| ApiError::Internal(format!("corrupt settings: {e}")))?;
            Ok(Json(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Json(json!({}))),
        Err(e) => Err(ApiError::Internal(e.to_string())),
    }
}

/// PUT /v1/agents/settings?agent_type=
pub async fn put_settings(
    State(state): State<AppState>,
    Query(query): Query<SettingsQuery>,
    Json(settings): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let path = settings_path(&state, &query.agent_type);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
    }
    let contents = serde_json::to_vec_pretty(&settings)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    tokio::fs::write(&path, contents)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(settings))
}

/// POST /v1/agents/events
pub async fn agent_event(
    State(state): State<AppState>,
    Json(event): Json<AgentLifecycleEvent>,
) -> Result<Json<Value>, ApiError> {
    if event.event_type.is_empty() {
        return Err(ApiError::invalid("event_type is required"));
    }
    let outcome = state.agent_events.process(event).await;
    Ok(Json(json!({ "outcome": outcome })))
}
