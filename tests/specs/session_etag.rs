// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conditional reads on the session-by-workspace endpoint.

use super::common::{get, get_with, json_body, post_json, spec};
use axum::http::StatusCode;
use http_body_util::BodyExt;
use std::path::PathBuf;
use tower::ServiceExt;

#[tokio::test]
async fn etag_roundtrip_with_304() {
    let s = spec().await;

    let response = s
        .app
        .clone()
        .oneshot(post_json("/v1/git/checkout/org/repo", serde_json::json!({})))
        .await
        .unwrap();
    let body = json_body(response).await;
    let worktree_id = body["worktree"]["id"].as_str().unwrap().to_string();
    let worktree_path = PathBuf::from(body["worktree"]["path"].as_str().unwrap());

    s.write_claude_log(
        &worktree_path,
        &[
            r#"{"type":"user","sessionId":"sess-1","message":{"role":"user","content":"build it"}}"#,
            r#"{"type":"assistant","message":{"role":"assistant","content":[{"type":"text","text":"building"}]}}"#,
        ],
    );

    let uri = format!("/v1/sessions/workspace/{worktree_id}");
    let response = s.app.clone().oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let etag = response
        .headers()
        .get("etag")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    let session = json_body(response).await;
    assert_eq!(session["uuid"], "sess-1");

    // Same entity: 304 with no body.
    let response = s
        .app
        .clone()
        .oneshot(get_with(&uri, ("if-none-match", &etag)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.is_empty());

    // Mutate the session: a new assistant message invalidates the tag.
    s.write_claude_log(
        &worktree_path,
        &[
            r#"{"type":"user","sessionId":"sess-1","message":{"role":"user","content":"build it"}}"#,
            r#"{"type":"assistant","message":{"role":"assistant","content":[{"type":"text","text":"building"}]}}"#,
            r#"{"type":"assistant","message":{"role":"assistant","content":[{"type":"text","text":"done"}]}}"#,
        ],
    );
    let response = s
        .app
        .clone()
        .oneshot(get_with(&uri, ("if-none-match", &etag)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let new_etag = response
        .headers()
        .get("etag")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert_ne!(new_etag, etag);
}

#[tokio::test]
async fn full_query_includes_messages() {
    let s = spec().await;

    let response = s
        .app
        .clone()
        .oneshot(post_json("/v1/git/checkout/org/repo", serde_json::json!({})))
        .await
        .unwrap();
    let body = json_body(response).await;
    let worktree_id = body["worktree"]["id"].as_str().unwrap().to_string();
    let worktree_path = PathBuf::from(body["worktree"]["path"].as_str().unwrap());

    s.write_claude_log(
        &worktree_path,
        &[r#"{"type":"user","sessionId":"sess-2","message":{"role":"user","content":"hello"}}"#],
    );

    let response = s
        .app
        .clone()
        .oneshot(get(&format!("/v1/sessions/workspace/{worktree_id}")))
        .await
        .unwrap();
    let summary = json_body(response).await;
    assert!(summary.get("messages").is_none(), "summary omits messages");

    let response = s
        .app
        .clone()
        .oneshot(get(&format!("/v1/sessions/workspace/{worktree_id}?full=true")))
        .await
        .unwrap();
    let full = json_body(response).await;
    assert_eq!(full["messages"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_workspace_is_404() {
    let s = spec().await;
    let response = s
        .app
        .clone()
        .oneshot(get("/v1/sessions/workspace/nope"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
