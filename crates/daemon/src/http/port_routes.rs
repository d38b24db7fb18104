// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Port routes under `/v1/ports`.

use super::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

/// GET /v1/ports
pub async fn list_ports(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ports": state.ports.list(),
        "mappings": state
            .ports
            .mappings()
            .into_iter()
            .map(|(port, host_port)| json!({ "port": port, "host_port": host_port }))
            .collect::<Vec<_>>(),
    }))
}

/// GET /v1/ports/{port}
pub async fn get_port(
    State(state): State<AppState>,
    Path(port): Path<u16>,
) -> Result<Json<Value>, ApiError> {
    let record = state
        .ports
        .get(port)
        .ok_or_else(|| ApiError::not_found(format!("port {port}")))?;
    Ok(Json(json!(record)))
}

#[derive(Debug, Deserialize)]
pub struct MappingRequest {
    pub port: u16,
    pub host_port: u16,
}

/// POST /v1/ports/mappings
pub async fn add_mapping(
    State(state): State<AppState>,
    Json(request): Json<MappingRequest>,
) -> Result<Json<Value>, ApiError> {
    if request.port == 0 || request.host_port == 0 {
        return Err(ApiError::invalid("port and host_port must be non-zero"));
    }
    state.ports.add_mapping(request.port, request.host_port);
    Ok(Json(json!({ "port": request.port, "host_port": request.host_port })))
}

/// DELETE /v1/ports/mappings/{port}
pub async fn remove_mapping(
    State(state): State<AppState>,
    Path(port): Path<u16>,
) -> Result<Json<Value>, ApiError> {
    if !state.ports.remove_mapping(port) {
        return Err(ApiError::not_found(format!("mapping for port {port}")));
    }
    Ok(Json(json!({ "removed": port })))
}
