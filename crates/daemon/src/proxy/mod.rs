// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reverse proxy for `/<port>/<rest>` plus the dev-mode frontend proxy.
//!
//! Only HTTP-classified ports are proxied; TCP services answer 503. HTML
//! bodies are rewritten so absolute links stay inside the port namespace,
//! JS bodies get their absolute-path references prefixed, and everything
//! else streams through untouched.

pub mod rewrite;

use crate::state::AppState;
use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use catnip_core::ServiceType;
use tracing::{debug, warn};

/// Hop-by-hop headers never forwarded in either direction.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Upper bound on a buffered proxy body.
const MAX_BODY: usize = 64 * 1024 * 1024;

/// Router fallback: proxy `/<port>/...`, dev frontend, or 404.
pub async fn handle(State(state): State<AppState>, req: Request) -> Response {
    let path = req.uri().path().to_string();
    let mut segments = path.trim_start_matches('/').splitn(2, '/');
    let first = segments.next().unwrap_or_default();
    let rest = segments.next().unwrap_or_default().to_string();

    if let Ok(port) = first.parse::<u16>() {
        if let Some(record) = state.ports.get(port) {
            if record.service_type == ServiceType::Tcp {
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    format!("port {port} is not an HTTP service"),
                )
                    .into_response();
            }
            return forward(&state, req, port, &rest, true).await;
        }
    }

    // Dev mode: everything unknown goes to the frontend dev server.
    if state.config.dev_mode {
        let rest = path.trim_start_matches('/').to_string();
        return forward(&state, req, state.config.dev_server_port, &rest, false).await;
    }

    StatusCode::NOT_FOUND.into_response()
}

/// Forward a request to `127.0.0.1:<port>/<rest>`, rewriting bodies when
/// `rewrite` is set.
async fn forward(
    state: &AppState,
    req: Request,
    port: u16,
    rest: &str,
    rewrite: bool,
) -> Response {
    let query = req
        .uri()
        .query()
        .map(|q| format!("?{q}"))
        .unwrap_or_default();
    let url = format!("http://127.0.0.1:{port}/{rest}{query}");
    let method = req.method().clone();
    let headers = req.headers().clone();

    let body = match to_bytes(req.into_body(), MAX_BODY).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::PAYLOAD_TOO_LARGE.into_response(),
    };

    let reqwest_method = match reqwest::Method::from_bytes(method.as_str().as_bytes()) {
        Ok(m) => m,
        Err(_) => return StatusCode::METHOD_NOT_ALLOWED.into_response(),
    };
    let mut upstream = state.http_client.request(reqwest_method, &url);
    for (name, value) in &headers {
        let lowered = name.as_str().to_ascii_lowercase();
        if HOP_BY_HOP.contains(&lowered.as_str()) || lowered == "host" {
            continue;
        }
        // Identity encoding keeps rewritable bodies readable.
        if rewrite && lowered == "accept-encoding" {
            continue;
        }
        if let Ok(v) = reqwest::header::HeaderValue::from_bytes(value.as_bytes()) {
            upstream = upstream.header(name.as_str(), v);
        }
    }
    upstream = upstream.body(body.to_vec());

    let response = match upstream.send().await {
        Ok(response) => response,
        Err(e) => {
            debug!(%url, error = %e, "proxy upstream unreachable");
            return (StatusCode::BAD_GATEWAY, format!("upstream on port {port} unreachable"))
                .into_response();
        }
    };

    let status =
        StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response_headers = HeaderMap::new();
    for (name, value) in response.headers() {
        let lowered = name.as_str().to_ascii_lowercase();
        // Bodies may change size under rewriting; axum recomputes length.
        if HOP_BY_HOP.contains(&lowered.as_str()) || lowered == "content-length" {
            continue;
        }
        if let (Ok(n), Ok(v)) = (
            HeaderName::from_bytes(name.as_str().as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            response_headers.insert(n, v);
        }
    }

    let content_type = response_headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let html_modification_disabled = response_headers
        .get("x-disable-html-modification")
        .is_some();

    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(%url, error = %e, "proxy body read failed");
            return StatusCode::BAD_GATEWAY.into_response();
        }
    };

    let body = if rewrite && rewrite::is_html_content_type(&content_type) && !html_modification_disabled
    {
        Body::from(rewrite::rewrite_html(&String::from_utf8_lossy(&bytes), port))
    } else if rewrite && rewrite::is_js_content_type(&content_type) {
        if let Ok(value) = HeaderValue::from_str(&format!("/{port}/")) {
            response_headers.insert(HeaderName::from_static("service-worker-allowed"), value);
        }
        Body::from(rewrite::rewrite_js(&String::from_utf8_lossy(&bytes), port))
    } else {
        Body::from(bytes)
    };

    (status, response_headers, body).into_response()
}

#[cfg(test)]
#[path = "proxy_tests.rs"]
mod tests;
