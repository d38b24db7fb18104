// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `/v1/events` SSE endpoint.
//!
//! Every stream begins with a deterministic priming sequence — a heartbeat,
//! a synthetic `container:status`, one `port:opened` per known port, and one
//! `port:mapped` per known mapping — then live events from the bus. The bus
//! heartbeat keeps idle streams warm.

use crate::state::AppState;
use axum::extract::State;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use catnip_core::{Event, EventRecord};
use futures_util::stream::Stream;
use futures_util::StreamExt;
use std::convert::Infallible;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

fn to_sse(record: EventRecord) -> Result<SseEvent, Infallible> {
    Ok(SseEvent::default().data(record.to_wire_json().to_string()))
}

/// GET /v1/events
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let (subscriber_id, rx) = state.bus.subscribe();
    debug!(subscriber = subscriber_id, "sse stream opened");

    let mut primer: Vec<EventRecord> = Vec::new();
    primer.push(state.bus.mint_record(Event::Heartbeat));
    primer.push(state.bus.mint_record(Event::ContainerStatus {
        status: "running".to_string(),
        message: None,
        ssh_enabled: state.config.ssh_enabled,
    }));
    for record in state.ports.list() {
        primer.push(state.bus.mint_record(Event::PortOpened { port: record }));
    }
    for (port, host_port) in state.ports.mappings() {
        primer.push(state.bus.mint_record(Event::PortMapped { port, host_port }));
    }

    let stream = futures_util::stream::iter(primer)
        .chain(ReceiverStream::new(rx))
        .map(to_sse);
    Sse::new(stream).keep_alive(KeepAlive::default())
}
