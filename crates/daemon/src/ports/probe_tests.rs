// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use catnip_core::ServiceType;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[test]
fn title_extraction() {
    assert_eq!(
        extract_title("<html><head><title>Vite App</title></head></html>").as_deref(),
        Some("Vite App")
    );
    assert_eq!(
        extract_title("<TITLE class=\"x\">  spaced  </TITLE>").as_deref(),
        Some("spaced")
    );
    assert_eq!(extract_title("<title></title>"), None);
    assert_eq!(extract_title("no markup"), None);
}

#[tokio::test]
async fn http_service_is_classified_with_title() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await;
        let body = "<html><head><title>Dev Server</title></head></html>";
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        let _ = socket.write_all(response.as_bytes()).await;
    });

    let result = probe_http(&reqwest::Client::new(), port).await;
    assert_eq!(result.service_type, ServiceType::Http);
    assert_eq!(result.title.as_deref(), Some("Dev Server"));
}

#[tokio::test]
async fn socket_closing_mid_probe_is_tcp() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        // Accept and slam the connection shut without a response.
        let (socket, _) = listener.accept().await.unwrap();
        drop(socket);
    });

    let result = probe_http(&reqwest::Client::new(), port).await;
    assert_eq!(result.service_type, ServiceType::Tcp);
    assert_eq!(result.title, None);
}

#[tokio::test]
async fn nothing_listening_is_tcp() {
    // Bind then drop to find a port that is definitely closed.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = probe_http(&reqwest::Client::new(), port).await;
    assert_eq!(result.service_type, ServiceType::Tcp);
}
