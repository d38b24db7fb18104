// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event types broadcast over the SSE bus.
//!
//! Serializes with `{"type": "domain:action", "payload": {...}}` format.
//! The wire record delivered to SSE subscribers wraps an event in an
//! [`EventRecord`] envelope carrying a timestamp and sequence id.

use crate::activity::ActivityState;
use crate::port::PortRecord;
use crate::session::TitleEntry;
use crate::status::CachedWorktreeStatus;
use crate::todo::Todo;
use crate::worktree::{Worktree, WorktreeId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Events published by daemon subsystems and fanned out to SSE subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    // -- liveness --
    #[serde(rename = "heartbeat")]
    Heartbeat,

    #[serde(rename = "container:status")]
    ContainerStatus {
        status: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        ssh_enabled: bool,
    },

    // -- ports --
    #[serde(rename = "port:opened")]
    PortOpened { port: PortRecord },

    #[serde(rename = "port:closed")]
    PortClosed { port: u16 },

    #[serde(rename = "port:mapped")]
    PortMapped { port: u16, host_port: u16 },

    // -- processes --
    #[serde(rename = "process:started")]
    ProcessStarted {
        pid: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        command: Option<String>,
    },

    #[serde(rename = "process:stopped")]
    ProcessStopped {
        pid: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        command: Option<String>,
    },

    // -- repository-level git state --
    #[serde(rename = "git:dirty")]
    GitDirty { path: PathBuf },

    #[serde(rename = "git:clean")]
    GitClean { path: PathBuf },

    // -- worktrees --
    #[serde(rename = "worktree:status_updated")]
    WorktreeStatusUpdated {
        worktree_id: WorktreeId,
        status: CachedWorktreeStatus,
    },

    #[serde(rename = "worktree:batch_updated")]
    WorktreeBatchUpdated { worktrees: Vec<Worktree> },

    #[serde(rename = "worktree:dirty")]
    WorktreeDirty { worktree_id: WorktreeId },

    #[serde(rename = "worktree:clean")]
    WorktreeClean { worktree_id: WorktreeId },

    #[serde(rename = "worktree:updated")]
    WorktreeUpdated { worktree: Box<Worktree> },

    #[serde(rename = "worktree:created")]
    WorktreeCreated { worktree: Box<Worktree> },

    #[serde(rename = "worktree:deleted")]
    WorktreeDeleted { worktree_id: WorktreeId, name: String },

    #[serde(rename = "worktree:todos_updated")]
    WorktreeTodosUpdated {
        worktree_id: WorktreeId,
        todos: Vec<Todo>,
    },

    // -- agent sessions --
    #[serde(rename = "session:title_updated")]
    SessionTitleUpdated {
        worktree_path: PathBuf,
        title: TitleEntry,
    },

    #[serde(rename = "session:stopped")]
    SessionStopped {
        worktree_path: PathBuf,
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },

    // -- user-facing notifications --
    #[serde(rename = "notification")]
    Notification {
        title: String,
        body: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subtitle: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },

    #[serde(rename = "agent:activity_state_changed")]
    AgentActivityStateChanged {
        worktree_path: PathBuf,
        state: ActivityState,
    },

    /// Escape hatch for events minted outside the typed set. The bus rejects
    /// publication when `event_type` is empty.
    #[serde(rename = "custom")]
    Custom {
        event_type: String,
        payload: serde_json::Value,
    },
}

impl Event {
    /// Wire name of the event (`domain:action`).
    pub fn event_type(&self) -> &str {
        match self {
            Event::Heartbeat => "heartbeat",
            Event::ContainerStatus { .. } => "container:status",
            Event::PortOpened { .. } => "port:opened",
            Event::PortClosed { .. } => "port:closed",
            Event::PortMapped { .. } => "port:mapped",
            Event::ProcessStarted { .. } => "process:started",
            Event::ProcessStopped { .. } => "process:stopped",
            Event::GitDirty { .. } => "git:dirty",
            Event::GitClean { .. } => "git:clean",
            Event::WorktreeStatusUpdated { .. } => "worktree:status_updated",
            Event::WorktreeBatchUpdated { .. } => "worktree:batch_updated",
            Event::WorktreeDirty { .. } => "worktree:dirty",
            Event::WorktreeClean { .. } => "worktree:clean",
            Event::WorktreeUpdated { .. } => "worktree:updated",
            Event::WorktreeCreated { .. } => "worktree:created",
            Event::WorktreeDeleted { .. } => "worktree:deleted",
            Event::WorktreeTodosUpdated { .. } => "worktree:todos_updated",
            Event::SessionTitleUpdated { .. } => "session:title_updated",
            Event::SessionStopped { .. } => "session:stopped",
            Event::Notification { .. } => "notification",
            Event::AgentActivityStateChanged { .. } => "agent:activity_state_changed",
            Event::Custom { event_type, .. } => event_type,
        }
    }

    /// Payload of the event as a JSON value, `None` for payload-less events.
    ///
    /// Uses the derived adjacent-tag serialization and extracts its `payload`
    /// member so the envelope and the enum can never disagree on shape.
    pub fn payload_value(&self) -> Option<serde_json::Value> {
        if let Event::Custom { payload, .. } = self {
            return Some(payload.clone());
        }
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(mut map)) => map.remove("payload"),
            _ => None,
        }
    }
}

/// Envelope delivered to SSE subscribers: `data: <json>\n\n` where json is
/// `{"event": {"type", "payload"}, "timestamp_ms", "id"}`.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub event: Event,
    pub timestamp_ms: u64,
    pub id: u64,
}

impl EventRecord {
    /// The wire JSON for this record.
    pub fn to_wire_json(&self) -> serde_json::Value {
        let mut inner = serde_json::Map::new();
        inner.insert(
            "type".to_string(),
            serde_json::Value::String(self.event.event_type().to_string()),
        );
        if let Some(payload) = self.event.payload_value() {
            inner.insert("payload".to_string(), payload);
        }
        serde_json::json!({
            "event": serde_json::Value::Object(inner),
            "timestamp_ms": self.timestamp_ms,
            "id": self.id,
        })
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
