// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git and worktree routes under `/v1/git`.
//!
//! Handlers are thin adapters: parse, call the worktree service, serialize.

use super::error::ApiError;
use crate::state::AppState;
use crate::worktree::SyncStrategy;
use axum::extract::{Path, Query, State};
use axum::Json;
use catnip_core::{Worktree, WorktreeId};
use serde::Deserialize;
use serde_json::{json, Value};

pub(super) fn parse_worktree_id(id: &str) -> Result<WorktreeId, ApiError> {
    WorktreeId::parse(id).ok_or_else(|| ApiError::invalid(format!("not a worktree id: {id}")))
}

/// GET /v1/git/status
pub async fn git_status(State(state): State<AppState>) -> Json<Value> {
    let repositories = state.store.list_repositories();
    let worktrees = state.store.list_worktrees();
    Json(json!({
        "repositories": repositories,
        "worktree_count": worktrees.len(),
    }))
}

/// GET /v1/git/worktrees
pub async fn list_worktrees(State(state): State<AppState>) -> Json<Value> {
    let worktrees: Vec<Value> = state
        .store
        .list_worktrees()
        .into_iter()
        .map(|w| worktree_with_status(&state, w))
        .collect();
    Json(json!(worktrees))
}

fn worktree_with_status(state: &AppState, worktree: Worktree) -> Value {
    let status = state.store.status(worktree.id);
    json!({
        "worktree": worktree,
        "cached_status": status,
    })
}

#[derive(Debug, Deserialize)]
pub struct CheckoutQuery {
    pub branch: Option<String>,
}

/// POST /v1/git/checkout/{org}/{repo}?branch=
pub async fn checkout(
    State(state): State<AppState>,
    Path((org, repo)): Path<(String, String)>,
    Query(query): Query<CheckoutQuery>,
) -> Result<Json<Value>, ApiError> {
    let (repository, worktree) = state
        .worktrees
        .checkout(&org, &repo, query.branch.as_deref())
        .await?;
    Ok(Json(json!({ "repository": repository, "worktree": worktree })))
}

/// DELETE /v1/git/worktrees/{id}
pub async fn delete_worktree(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_worktree_id(&id)?;
    let deleted = state.worktrees.delete_worktree(id).await?;
    Ok(Json(json!({ "deleted": deleted.name })))
}

#[derive(Debug, Default, Deserialize)]
pub struct SyncRequest {
    #[serde(default)]
    pub strategy: SyncStrategy,
    /// Commit a dirty tree before syncing instead of failing.
    #[serde(default)]
    pub commit_dirty: bool,
}

/// POST /v1/git/worktrees/{id}/sync
pub async fn sync_worktree(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SyncRequest>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_worktree_id(&id)?;
    let status = state
        .worktrees
        .sync(id, request.strategy, request.commit_dirty)
        .await?;
    Ok(Json(json!({ "synced": true, "status": status })))
}

#[derive(Debug, Deserialize)]
pub struct SyncCheckQuery {
    #[serde(default)]
    pub strategy: Option<SyncStrategy>,
}

/// GET /v1/git/worktrees/{id}/sync/check
pub async fn sync_check(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<SyncCheckQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_worktree_id(&id)?;
    let report = state
        .worktrees
        .sync_check(id, query.strategy.unwrap_or_default())
        .await?;
    Ok(Json(conflict_report_json(report)))
}

fn conflict_report_json(report: Option<catnip_core::ConflictReport>) -> Value {
    match report {
        Some(report) => json!({
            "has_conflicts": true,
            "conflict_files": report.conflict_files,
            "operation": report.operation,
            "message": report.message,
        }),
        None => json!({ "has_conflicts": false, "conflict_files": [] }),
    }
}

#[derive(Debug, Deserialize)]
pub struct MergeQuery {
    #[serde(default)]
    pub auto_cleanup: bool,
    /// Squash by default; `?squash=false` keeps the full history.
    pub squash: Option<bool>,
}

/// POST /v1/git/worktrees/{id}/merge?auto_cleanup=
pub async fn merge_worktree(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<MergeQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_worktree_id(&id)?;
    let outcome = state
        .worktrees
        .merge_to_source(id, query.squash.unwrap_or(true), query.auto_cleanup)
        .await?;
    Ok(Json(json!(outcome)))
}

/// GET /v1/git/worktrees/{id}/merge/check
pub async fn merge_check(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_worktree_id(&id)?;
    let report = state.worktrees.merge_check(id).await?;
    Ok(Json(conflict_report_json(report)))
}

/// GET /v1/git/worktrees/{id}/diff
pub async fn worktree_diff(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<String, ApiError> {
    let id = parse_worktree_id(&id)?;
    Ok(state.worktrees.diff(id).await?)
}

#[derive(Debug, Default, Deserialize)]
pub struct PrRequest {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// POST /v1/git/worktrees/{id}/pr
pub async fn create_pr(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<PrRequest>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_worktree_id(&id)?;
    let url = state
        .worktrees
        .create_pr(id, request.title.as_deref(), request.body.as_deref())
        .await?;
    Ok(Json(json!({ "pull_request_url": url })))
}

/// PUT /v1/git/worktrees/{id}/pr
pub async fn update_pr(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<PrRequest>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_worktree_id(&id)?;
    let url = state
        .worktrees
        .update_pr(id, request.title.as_deref(), request.body.as_deref())
        .await?;
    Ok(Json(json!({ "pull_request_url": url })))
}

#[derive(Debug, Default, Deserialize)]
pub struct GraduateRequest {
    pub branch_name: Option<String>,
}

/// POST /v1/git/worktrees/{id}/graduate
pub async fn graduate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<GraduateRequest>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_worktree_id(&id)?;
    let branch = state
        .worktrees
        .graduate(id, request.branch_name.as_deref())
        .await?;
    Ok(Json(json!({ "branch": branch })))
}

/// POST /v1/git/worktrees/cleanup
pub async fn cleanup_worktrees(State(state): State<AppState>) -> Json<Value> {
    let report = state.worktrees.cleanup_merged().await;
    Json(json!(report))
}

/// POST /v1/git/worktrees/{id}/refresh
pub async fn refresh_worktree(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_worktree_id(&id)?;
    let status = state.worktrees.refresh_status(id).await?;
    Ok(Json(json!(status)))
}

/// GET /v1/git/branches/{org}/{repo}
pub async fn list_branches(
    State(state): State<AppState>,
    Path((org, repo)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let branches = state.worktrees.branches(&format!("{org}/{repo}")).await?;
    Ok(Json(json!({ "branches": branches })))
}

/// GET /v1/git/github/repos
pub async fn github_repos(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.worktrees.github_repos().await?))
}

#[derive(Debug, Deserialize)]
pub struct TemplateRequest {
    pub template_id: String,
    pub project_name: String,
}

/// POST /v1/git/template
pub async fn create_template(
    State(state): State<AppState>,
    Json(request): Json<TemplateRequest>,
) -> Result<Json<Value>, ApiError> {
    if request.project_name.is_empty()
        || !request
            .project_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ApiError::invalid("project_name must be alphanumeric with - or _"));
    }
    let (repository, worktree) = state
        .worktrees
        .create_from_template(&request.template_id, &request.project_name)
        .await?;
    Ok(Json(json!({ "repository": repository, "worktree": worktree })))
}

#[derive(Debug, Deserialize)]
pub struct GithubRepoRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_private: bool,
}

/// POST /v1/git/repositories/{org}/{repo}/github
pub async fn create_github_repo(
    State(state): State<AppState>,
    Path((org, repo)): Path<(String, String)>,
    Json(request): Json<GithubRepoRequest>,
) -> Result<Json<Value>, ApiError> {
    if request.name.is_empty() {
        return Err(ApiError::invalid("name is required"));
    }
    let url = state
        .worktrees
        .create_github_repo(
            &format!("{org}/{repo}"),
            &request.name,
            &request.description,
            request.is_private,
        )
        .await?;
    Ok(Json(json!({ "url": url })))
}

/// DELETE /v1/git/repositories/{org}/{repo}
pub async fn delete_repository(
    State(state): State<AppState>,
    Path((org, repo)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    state.worktrees.delete_repository(&format!("{org}/{repo}")).await?;
    Ok(Json(json!({ "deleted": format!("{org}/{repo}") })))
}
