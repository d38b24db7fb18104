// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent lifecycle over HTTP: Stop triggers commit-sync and session:stopped.

use super::common::{json_body, post_json, spec};
use axum::http::StatusCode;
use catnip_core::{Todo, TodoStatus};
use std::path::PathBuf;
use tower::ServiceExt;

#[tokio::test]
async fn stop_event_commits_and_announces() {
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

    // A dirty tree and an in-flight todo, as left behind by an agent.
    std::fs::write(worktree_path.join("parser.rs"), "fn parse() {}").unwrap();
    let id = catnip_core::WorktreeId::parse(&worktree_id).unwrap();
    s.state
        .store
        .mutate_worktree(id, |w| {
            w.todos = vec![Todo::new("refactor parser", TodoStatus::InProgress)];
        })
        .unwrap();

    let (_sub, mut rx) = s.state.bus.subscribe();
    let response = s
        .app
        .clone()
        .oneshot(post_json(
            "/v1/agents/events",
            serde_json::json!({
                "event_type": "Stop",
                "working_directory": worktree_path,
                "agent_type": "claude",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["outcome"], "processed");

    // Commit landed with either the completed-todo message or the fallback.
    assert!(!s.git.is_dirty(&worktree_path).await.unwrap());
    let subjects = s.git.log_subjects(&worktree_path, "HEAD").await.unwrap();
    assert!(
        subjects[0].starts_with("completed: ") || subjects[0].starts_with("checkpoint: "),
        "{subjects:?}"
    );

    let mut stopped = None;
    while let Ok(record) = rx.try_recv() {
        if let catnip_core::Event::SessionStopped { title, description, .. } = record.event {
            stopped = Some((title, description));
        }
    }
    let (title, description) = stopped.expect("session:stopped not published");
    assert!(title.ends_with(" stopped"));
    assert!(description.unwrap().starts_with("refactor parser"));
}

#[tokio::test]
async fn post_tool_use_refreshes_session_projection() {
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
            r#"{"type":"summary","summary":"Wire up the lexer"}"#,
            r#"{"type":"assistant","message":{"role":"assistant","content":[{"type":"text","text":"lexer in progress"},{"type":"tool_use","name":"TodoWrite","input":{"todos":[{"content":"lexer","status":"in_progress"}]}}]}}"#,
        ],
    );

    let response = s
        .app
        .clone()
        .oneshot(post_json(
            "/v1/agents/events",
            serde_json::json!({
                "event_type": "PostToolUse",
                "working_directory": worktree_path,
                "agent_type": "claude",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let id = catnip_core::WorktreeId::parse(&worktree_id).unwrap();
    let updated = s.state.store.get_worktree(id).unwrap();
    assert_eq!(updated.todos.len(), 1);
    assert_eq!(
        updated.session_title.map(|t| t.title),
        Some("Wire up the lexer".to_string())
    );
}
