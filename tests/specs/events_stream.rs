// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SSE stream priming sequence.

use super::common::{get, spec};
use axum::http::StatusCode;
use futures_util::StreamExt;
use http_body_util::BodyExt;
use std::time::Duration;
use tower::ServiceExt;

/// Every stream starts with a heartbeat, `container:status`, then one
/// `port:opened` per known port and one `port:mapped` per known mapping.
#[tokio::test]
async fn stream_primes_with_known_state() {
    let s = spec().await;

    // Known state before attaching: one TCP port, one mapping.
    s.state
        .ports
        .apply_scan(vec![catnip_daemon::ports::Listener {
            port: 49400,
            pid: None,
            command: None,
            working_dir: None,
        }])
        .await;
    s.state.ports.add_mapping(49400, 65400);

    let response = s.app.clone().oneshot(get("/v1/events")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("text/event-stream")
    );

    // The stream is endless; read frames until the priming records are in.
    let mut body = response.into_body().into_data_stream();
    let mut seen = String::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let frame = tokio::time::timeout_at(deadline, body.next()).await;
        match frame {
            Ok(Some(Ok(bytes))) => {
                seen.push_str(&String::from_utf8_lossy(&bytes));
                if seen.contains("port:mapped") {
                    break;
                }
            }
            _ => panic!("priming records never arrived; got: {seen}"),
        }
    }

    let heartbeat = seen.find("\"type\":\"heartbeat\"").expect("heartbeat first");
    let container = seen
        .find("\"type\":\"container:status\"")
        .expect("container:status");
    let opened = seen.find("\"type\":\"port:opened\"").expect("port:opened");
    let mapped = seen.find("\"type\":\"port:mapped\"").expect("port:mapped");
    assert!(heartbeat < container && container < opened && opened < mapped);
    assert!(seen.contains("\"port\":49400"));
    assert!(seen.contains("\"host_port\":65400"));
    // Wire format: data: <json> records with timestamps and ids.
    assert!(seen.contains("data: {"));
    assert!(seen.contains("\"timestamp_ms\""));
}

#[tokio::test]
async fn live_events_follow_priming() {
    let s = spec().await;

    let response = s.app.clone().oneshot(get("/v1/events")).await.unwrap();
    let mut body = response.into_body().into_data_stream();

    s.state.bus.publish(catnip_core::Event::Notification {
        title: "hello".to_string(),
        body: "world".to_string(),
        subtitle: None,
        url: None,
    });

    let mut seen = String::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        match tokio::time::timeout_at(deadline, body.next()).await {
            Ok(Some(Ok(bytes))) => {
                seen.push_str(&String::from_utf8_lossy(&bytes));
                if seen.contains("\"type\":\"notification\"") {
                    break;
                }
            }
            _ => panic!("notification never arrived; got: {seen}"),
        }
    }
    assert!(seen.contains("\"title\":\"hello\""));
}
