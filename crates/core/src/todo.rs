// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Todo items extracted from agent session logs.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a todo item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

crate::simple_display! {
    TodoStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
    }
}

/// One entry from the agent's most recent todo-list write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub content: String,
    pub status: TodoStatus,
}

impl Todo {
    pub fn new(content: impl Into<String>, status: TodoStatus) -> Self {
        Self { content: content.into(), status }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TodoStatus::Completed
    }
}

/// The most recently completed todo, if the last state-changing entry is a
/// completion. Drives the auto-commit message.
pub fn latest_completed(todos: &[Todo]) -> Option<&Todo> {
    todos.iter().rev().find(|t| t.is_completed())
}

/// The first todo that is not yet completed, used as a short description of
/// what the agent was working on.
pub fn first_incomplete(todos: &[Todo]) -> Option<&Todo> {
    todos.iter().find(|t| !t.is_completed())
}

#[cfg(test)]
#[path = "todo_tests.rs"]
mod tests;
