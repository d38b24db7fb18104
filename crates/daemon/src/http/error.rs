// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error-to-status mapping.
//!
//! Components return typed errors; this is the only place they become HTTP
//! status codes. Background loops never reach here — they log and continue.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use catnip_git::GitError;
use catnip_pty::PtyError;
use catnip_storage::StoreError;
use serde_json::json;

use crate::gh::GhError;
use crate::worktree::WorktreeError;

/// Error surface of the HTTP facade.
#[derive(Debug)]
pub enum ApiError {
    /// 400 — missing or mistyped fields.
    InvalidArgument(String),
    /// 404 — unknown id, missing session.
    NotFound(String),
    /// 409 — merge/sync conflict or colliding resource.
    Conflict {
        message: String,
        conflict_files: Vec<String>,
    },
    /// 422 — operation preconditions unmet (e.g. `no_title_available`).
    PreconditionFailed(String),
    /// 408 — PTY readiness or programmatic-prompt wait exceeded.
    Timeout(String),
    /// 502 — subprocess (git, gh, agent) failure, with truncated stderr.
    UpstreamFailed { message: String, details: String },
    /// 500 — programming errors.
    Internal(String),
}

impl ApiError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid(what: impl Into<String>) -> Self {
        Self::InvalidArgument(what.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::InvalidArgument(message) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "invalid_argument", "message": message }),
            ),
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "not_found", "message": message }),
            ),
            ApiError::Conflict { message, conflict_files } => (
                StatusCode::CONFLICT,
                json!({ "error": "conflict", "message": message, "conflict_files": conflict_files }),
            ),
            ApiError::PreconditionFailed(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": "precondition_failed", "message": message }),
            ),
            ApiError::Timeout(message) => (
                StatusCode::REQUEST_TIMEOUT,
                json!({ "error": "timeout", "message": message }),
            ),
            ApiError::UpstreamFailed { message, details } => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": "upstream_failed", "message": message, "details": details }),
            ),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "internal", "message": message }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

impl From<WorktreeError> for ApiError {
    fn from(err: WorktreeError) -> Self {
        match err {
            WorktreeError::NotFound(what) | WorktreeError::RepoNotFound(what) => {
                ApiError::NotFound(what)
            }
            WorktreeError::Conflict(report) => ApiError::Conflict {
                message: report.message,
                conflict_files: report.conflict_files,
            },
            WorktreeError::BranchExists(name) => ApiError::Conflict {
                message: format!("branch_exists: {name}"),
                conflict_files: Vec::new(),
            },
            WorktreeError::Busy(name) => {
                ApiError::PreconditionFailed(format!("operation in progress for {name}"))
            }
            WorktreeError::Dirty => {
                ApiError::PreconditionFailed("worktree has uncommitted changes".to_string())
            }
            WorktreeError::NoTitleAvailable => {
                ApiError::PreconditionFailed("no_title_available".to_string())
            }
            WorktreeError::Git(err) => err.into(),
            WorktreeError::Gh(err) => err.into(),
            WorktreeError::Store(err) => err.into(),
            WorktreeError::Io(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<GitError> for ApiError {
    fn from(err: GitError) -> Self {
        match err {
            GitError::Timeout { command, .. } => ApiError::Timeout(command),
            GitError::CommandFailed { command, stderr, .. } => {
                ApiError::UpstreamFailed { message: command, details: stderr }
            }
            other => ApiError::UpstreamFailed {
                message: "git".to_string(),
                details: other.to_string(),
            },
        }
    }
}

impl From<GhError> for ApiError {
    fn from(err: GhError) -> Self {
        match err {
            GhError::Timeout(command) => ApiError::Timeout(command),
            GhError::NotAuthenticated(details) => ApiError::UpstreamFailed {
                message: "gh_not_authenticated".to_string(),
                details,
            },
            GhError::Failed { command, stderr } => {
                ApiError::UpstreamFailed { message: command, details: stderr }
            }
            GhError::Io(err) => ApiError::UpstreamFailed {
                message: "gh".to_string(),
                details: err.to_string(),
            },
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::WorktreeNotFound(id) => ApiError::NotFound(id.to_string()),
            StoreError::RepositoryNotFound(id) => ApiError::NotFound(id.to_string()),
            StoreError::PathInUse(path) => ApiError::Conflict {
                message: format!("path already in use: {}", path.display()),
                conflict_files: Vec::new(),
            },
        }
    }
}

impl From<PtyError> for ApiError {
    fn from(err: PtyError) -> Self {
        match err {
            PtyError::ReadyTimeout(timeout) => {
                ApiError::Timeout(format!("session not ready within {timeout:?}"))
            }
            PtyError::SessionClosed => ApiError::NotFound("pty session".to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
