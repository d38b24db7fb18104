// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Checkout, sync, conflict, merge, and graduation flows over HTTP.

use super::common::{delete, get, json_body, post_json, spec};
use axum::http::StatusCode;
use std::path::PathBuf;
use tower::ServiceExt;

/// Create + sync with no conflict: 200, commit survives the rebase, status
/// cache version moves, and `worktree:status_updated` is emitted.
#[tokio::test]
async fn checkout_then_sync_rebase() {
    let s = spec().await;

    let response = s
        .app
        .clone()
        .oneshot(post_json("/v1/git/checkout/org/repo", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let worktree_id = body["worktree"]["id"].as_str().unwrap().to_string();
    let worktree_path = PathBuf::from(body["worktree"]["path"].as_str().unwrap());
    assert!(body["worktree"]["branch"]
        .as_str()
        .unwrap()
        .starts_with("refs/catnip/"));

    s.commit_in(&worktree_path, "a.txt", "hello").await;
    s.commit_on_branch("main", "b.txt", "upstream").await;

    let (_sub, mut rx) = s.state.bus.subscribe();
    let response = s
        .app
        .clone()
        .oneshot(post_json(
            &format!("/v1/git/worktrees/{worktree_id}/sync"),
            serde_json::json!({ "strategy": "rebase" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["synced"], true);
    assert_eq!(body["status"]["commits_ahead"], 1);
    assert_eq!(body["status"]["commits_behind"], 0);
    assert!(body["status"]["version"].as_u64().unwrap() >= 1);
    assert!(worktree_path.join("b.txt").exists());

    let mut saw_status_update = false;
    while let Ok(record) = rx.try_recv() {
        if record.event.event_type() == "worktree:status_updated" {
            saw_status_update = true;
        }
    }
    assert!(saw_status_update);
}

/// Sync conflict round-trip: the check and the execution report the same
/// files, and the worktree is left clean of rebase markers.
#[tokio::test]
async fn sync_conflict_roundtrip() {
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

    s.commit_in(&worktree_path, "README", "worktree line\n").await;
    s.commit_on_branch("main", "README", "upstream line\n").await;

    let response = s
        .app
        .clone()
        .oneshot(get(&format!("/v1/git/worktrees/{worktree_id}/sync/check")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let check = json_body(response).await;
    assert_eq!(check["has_conflicts"], true);
    assert_eq!(check["conflict_files"], serde_json::json!(["README"]));

    let response = s
        .app
        .clone()
        .oneshot(post_json(
            &format!("/v1/git/worktrees/{worktree_id}/sync"),
            serde_json::json!({ "strategy": "rebase" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["conflict_files"], serde_json::json!(["README"]));

    assert!(!s.git.rebase_in_progress(&worktree_path).await.unwrap());
    assert!(!s.git.is_dirty(&worktree_path).await.unwrap());
}

#[tokio::test]
async fn merge_with_auto_cleanup_deletes_worktree() {
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

    s.commit_in(&worktree_path, "feature.txt", "shipped").await;

    let response = s
        .app
        .clone()
        .oneshot(post_json(
            &format!("/v1/git/worktrees/{worktree_id}/merge?auto_cleanup=true"),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = json_body(response).await;
    assert_eq!(outcome["merged"], true);
    assert_eq!(outcome["deleted_worktree"], true);

    let response = s.app.clone().oneshot(get("/v1/git/worktrees")).await.unwrap();
    let listing = json_body(response).await;
    assert_eq!(listing.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn graduation_conflicts_map_to_409() {
    let s = spec().await;

    let response = s
        .app
        .clone()
        .oneshot(post_json("/v1/git/checkout/org/repo", serde_json::json!({})))
        .await
        .unwrap();
    let body = json_body(response).await;
    let worktree_id = body["worktree"]["id"].as_str().unwrap().to_string();

    let response = s
        .app
        .clone()
        .oneshot(post_json(
            &format!("/v1/git/worktrees/{worktree_id}/graduate"),
            serde_json::json!({ "branch_name": "shiny-feature" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["branch"], "shiny-feature");

    // A second worktree cannot graduate onto the same name.
    let response = s
        .app
        .clone()
        .oneshot(post_json("/v1/git/checkout/org/repo", serde_json::json!({})))
        .await
        .unwrap();
    let other_id = json_body(response).await["worktree"]["id"]
        .as_str()
        .unwrap()
        .to_string();
    let response = s
        .app
        .clone()
        .oneshot(post_json(
            &format!("/v1/git/worktrees/{other_id}/graduate"),
            serde_json::json!({ "branch_name": "shiny-feature" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(json_body(response).await["message"]
        .as_str()
        .unwrap()
        .contains("branch_exists"));
}

#[tokio::test]
async fn branches_and_delete_worktree() {
    let s = spec().await;

    let response = s
        .app
        .clone()
        .oneshot(post_json("/v1/git/checkout/org/repo", serde_json::json!({})))
        .await
        .unwrap();
    let worktree_id = json_body(response).await["worktree"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = s
        .app
        .clone()
        .oneshot(get("/v1/git/branches/org/repo"))
        .await
        .unwrap();
    let branches = json_body(response).await;
    assert!(branches["branches"]
        .as_array()
        .unwrap()
        .iter()
        .any(|b| b == "main"));

    let response = s
        .app
        .clone()
        .oneshot(delete(&format!("/v1/git/worktrees/{worktree_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = s.app.clone().oneshot(get("/v1/git/status")).await.unwrap();
    let status = json_body(response).await;
    assert_eq!(status["worktree_count"], 0);
}
