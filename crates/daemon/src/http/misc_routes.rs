// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Health, upload, and notification routes.

use super::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use catnip_core::Event;
use serde::Deserialize;
use serde_json::{json, Value};

/// GET /v1/health
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "ssh_enabled": state.config.ssh_enabled,
    }))
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub filename: String,
    pub content: String,
}

/// POST /v1/upload
///
/// Trivial adapter: store the file under the workspace uploads dir and
/// announce it on the bus.
pub async fn upload(
    State(state): State<AppState>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<Value>, ApiError> {
    let name = std::path::Path::new(&request.filename)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ApiError::invalid("filename is required"))?;
    let dir = state.config.workspace_dir.join(".uploads");
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let path = dir.join(name);
    tokio::fs::write(&path, request.content.as_bytes())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    state.bus.publish(Event::Notification {
        title: "File uploaded".to_string(),
        body: name.to_string(),
        subtitle: None,
        url: None,
    });
    Ok(Json(json!({ "path": path })))
}

#[derive(Debug, Deserialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// POST /v1/notifications
pub async fn notify(
    State(state): State<AppState>,
    Json(request): Json<NotificationRequest>,
) -> Result<Json<Value>, ApiError> {
    if request.title.is_empty() {
        return Err(ApiError::invalid("title is required"));
    }
    state.bus.publish(Event::Notification {
        title: request.title,
        body: request.body,
        subtitle: request.subtitle,
        url: request.url,
    });
    Ok(Json(json!({ "published": true })))
}
