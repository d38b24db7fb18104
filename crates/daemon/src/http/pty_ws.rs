// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket endpoint bridging browsers to PTY sessions.
//!
//! Text frames are tried as control JSON first (`{"type":"reset"}` recreates
//! the child, `{"cols":..,"rows":..}` resizes), otherwise forwarded verbatim
//! as bytes. Binary frames always pass through. Each connection owns one
//! reader task (WS → PTY) and one writer task (PTY → WS); closing either
//! side detaches the subscriber.

use super::error::ApiError;
use crate::state::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use catnip_pty::PtySession;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
pub struct PtyQuery {
    pub session: String,
    #[serde(default)]
    pub agent: String,
}

/// Control frames accepted on the text channel.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ControlFrame {
    Typed { r#type: String },
    Resize { cols: u16, rows: u16 },
}

/// GET /v1/pty?session=&agent=
pub async fn upgrade(
    State(state): State<AppState>,
    Query(query): Query<PtyQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    if query.session.is_empty() {
        return Err(ApiError::invalid("session is required"));
    }
    // Session names address a directory under the workspace root.
    let work_dir = state.config.workspace_dir.join(&query.session);
    let session = state
        .engine
        .get_or_create(&query.session, &query.agent, &work_dir)?;
    Ok(ws.on_upgrade(move |socket| serve(socket, session)))
}

async fn serve(socket: WebSocket, session: Arc<PtySession>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let handle = session.subscribe();
    let subscriber_id = handle.id;
    let mut output = handle.rx;

    // Writer: PTY bytes → binary frames. The first frame is the replay ring.
    let writer_session = session.clone();
    let writer = tokio::spawn(async move {
        while let Some(bytes) = output.recv().await {
            if ws_tx.send(Message::Binary(bytes.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
        drop(writer_session);
    });

    // Reader: WS frames → control or input.
    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(Message::Text(text)) => handle_text_frame(&session, &text),
            Ok(Message::Binary(bytes)) => {
                if let Err(e) = session.write_input(&bytes) {
                    warn!(session = %session.id, error = %e, "pty write failed");
                    break;
                }
            }
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    session.unsubscribe(subscriber_id);
    writer.abort();
    debug!(session = %session.id, "websocket detached");
}

fn handle_text_frame(session: &PtySession, text: &str) {
    match serde_json::from_str::<ControlFrame>(text) {
        Ok(ControlFrame::Typed { r#type }) if r#type == "reset" => {
            debug!(session = %session.id, "reset requested");
            session.request_reset();
        }
        Ok(ControlFrame::Resize { cols, rows }) => {
            if let Err(e) = session.resize(cols, rows) {
                warn!(session = %session.id, error = %e, "resize failed");
            }
        }
        // Unknown JSON or plain text: forward verbatim as input.
        _ => {
            if let Err(e) = session.write_input(text.as_bytes()) {
                warn!(session = %session.id, error = %e, "pty write failed");
            }
        }
    }
}
