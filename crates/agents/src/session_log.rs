// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Incremental JSONL session-log parser.
//!
//! Records are parsed as loose JSON rather than a rigid schema: agent CLIs
//! add record types between releases and the daemon must keep tailing. The
//! parser maintains rolling state so feeding a file line by line yields the
//! same projection as parsing it wholesale.
//!
//! Recognized records:
//! - `{"type":"summary","summary":...}` — a session title entry
//! - `{"type":"user","message":{...}}` — updates the latest user prompt
//! - `{"type":"assistant","message":{...}}` — updates the latest assistant
//!   message; a `TodoWrite` tool invocation inside replaces the todo list

use catnip_core::{AgentSession, SessionMessage, TitleEntry, Todo, TodoStatus};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::PathBuf;

/// Rolling parser over one session log file.
#[derive(Debug)]
pub struct SessionLogParser {
    session: AgentSession,
}

impl SessionLogParser {
    pub fn new(worktree_path: PathBuf) -> Self {
        Self { session: AgentSession::new("", worktree_path) }
    }

    /// Parse one JSONL line, ignoring anything malformed or unrecognized.
    pub fn feed_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        let Ok(record) = serde_json::from_str::<Value>(line) else {
            return;
        };
        let timestamp = record
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(parse_timestamp);

        if self.session.uuid.is_empty() {
            if let Some(id) = record.get("sessionId").and_then(Value::as_str) {
                self.session.uuid = id.to_string();
            }
        }

        match record.get("type").and_then(Value::as_str) {
            Some("summary") => {
                if let Some(summary) = record.get("summary").and_then(Value::as_str) {
                    self.session
                        .title_entries
                        .push(TitleEntry { title: summary.to_string(), timestamp });
                }
            }
            Some("user") => {
                if let Some(text) = message_text(&record) {
                    self.session.latest_user_prompt = Some(text.clone());
                    self.push_message("user", text, timestamp);
                }
            }
            Some("assistant") => {
                if let Some(text) = message_text(&record) {
                    if !text.is_empty() {
                        self.session.latest_assistant_message = Some(text.clone());
                        self.push_message("assistant", text, timestamp);
                    }
                }
                if let Some(todos) = todo_write(&record) {
                    self.session.todos = todos;
                }
            }
            _ => {}
        }

        if self.session.started_at.is_none() {
            self.session.started_at = timestamp;
        }
        if timestamp.is_some() {
            self.session.ended_at = timestamp;
        }
    }

    fn push_message(&mut self, role: &str, content: String, timestamp: Option<DateTime<Utc>>) {
        self.session.messages.push(SessionMessage {
            role: role.to_string(),
            content,
            timestamp,
        });
    }

    pub fn session(&self) -> &AgentSession {
        &self.session
    }

    pub fn into_session(self) -> AgentSession {
        self.session
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s).ok().map(|t| t.with_timezone(&Utc))
}

/// Joined text parts of a record's `message.content`, which is either a
/// plain string or a list of typed blocks.
fn message_text(record: &Value) -> Option<String> {
    let content = record.get("message")?.get("content")?;
    match content {
        Value::String(s) => Some(s.clone()),
        Value::Array(parts) => {
            let texts: Vec<&str> = parts
                .iter()
                .filter(|p| p.get("type").and_then(Value::as_str) == Some("text"))
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect();
            Some(texts.join("\n"))
        }
        _ => None,
    }
}

/// Todos from a `TodoWrite` tool invocation inside an assistant record.
fn todo_write(record: &Value) -> Option<Vec<Todo>> {
    let parts = record.get("message")?.get("content")?.as_array()?;
    let input = parts
        .iter()
        .filter(|p| p.get("type").and_then(Value::as_str) == Some("tool_use"))
        .filter(|p| p.get("name").and_then(Value::as_str) == Some("TodoWrite"))
        .filter_map(|p| p.get("input"))
        .next_back()?;
    let todos = input.get("todos")?.as_array()?;
    Some(
        todos
            .iter()
            .filter_map(|t| {
                let content = t.get("content").and_then(Value::as_str)?;
                let status = match t.get("status").and_then(Value::as_str) {
                    Some("completed") => TodoStatus::Completed,
                    Some("in_progress") => TodoStatus::InProgress,
                    _ => TodoStatus::Pending,
                };
                Some(Todo::new(content, status))
            })
            .collect(),
    )
}

#[cfg(test)]
#[path = "session_log_tests.rs"]
mod tests;
