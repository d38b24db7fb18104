// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Processing of agent lifecycle notifications.
//!
//! Hook events are mapped to a worktree by longest-path match over the
//! store. Events that arrive while the worktree manager is driving an
//! automated sync/merge are suppressed so the agent's own file churn does
//! not echo back as activity. `Stop` additionally runs commit-sync and
//! announces the session end; `PostToolUse` re-reads the session projection
//! (todos, title, latest assistant message) and publishes what changed.

use crate::commit_sync::CommitSyncService;
use crate::events::EventBus;
use crate::worktree::WorktreeService;
use catnip_agents::{classify_activity, AgentLifecycleEvent, AgentRegistry, LifecycleKind};
use catnip_core::{short, todo, Event, TitleEntry, Worktree};
use catnip_storage::WorktreeStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum characters of the session title carried on `session:stopped`.
const STOP_TITLE_LIMIT: usize = 60;

/// What happened to a lifecycle notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessOutcome {
    Processed,
    Suppressed,
    NoWorktree,
}

pub struct AgentEventProcessor {
    store: Arc<WorktreeStore>,
    service: Arc<WorktreeService>,
    commit_sync: Arc<CommitSyncService>,
    registry: Arc<AgentRegistry>,
    bus: Arc<EventBus>,
}

impl AgentEventProcessor {
    pub fn new(
        store: Arc<WorktreeStore>,
        service: Arc<WorktreeService>,
        commit_sync: Arc<CommitSyncService>,
        registry: Arc<AgentRegistry>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self { store, service, commit_sync, registry, bus }
    }

    pub async fn process(&self, event: AgentLifecycleEvent) -> ProcessOutcome {
        let Some(worktree) = self.store.worktree_containing(&event.working_directory) else {
            debug!(dir = %event.working_directory.display(), "lifecycle event outside any worktree");
            return ProcessOutcome::NoWorktree;
        };
        if self.service.is_suppressed(&worktree.path) {
            debug!(worktree = %worktree.name, kind = %event.event_type, "suppressed echo during automated operation");
            return ProcessOutcome::Suppressed;
        }

        let kind = event.kind();
        self.update_activity_state(&worktree, &kind);

        match kind {
            LifecycleKind::Stop => self.handle_stop(&worktree, &event).await,
            LifecycleKind::PostToolUse => self.handle_post_tool_use(&worktree, &event).await,
            LifecycleKind::UserPromptSubmit | LifecycleKind::Other(_) => {}
        }

        // Every recognized event invalidates the status cache for the
        // matched worktree.
        let _ = self.service.refresh_status(worktree.id).await;
        ProcessOutcome::Processed
    }

    fn update_activity_state(&self, worktree: &Worktree, kind: &LifecycleKind) {
        let Some(state) = classify_activity(kind) else {
            return;
        };
        if worktree.agent_activity_state == state {
            return;
        }
        if let Ok(updated) = self.store.mutate_worktree(worktree.id, |w| {
            w.agent_activity_state = state;
        }) {
            self.bus.publish(Event::AgentActivityStateChanged {
                worktree_path: updated.path.clone(),
                state,
            });
        }
    }

    async fn handle_stop(&self, worktree: &Worktree, event: &AgentLifecycleEvent) {
        // Commit whatever the agent left behind. Pull todos fresh from the
        // session log so the commit message reflects the final todo state.
        let mut for_commit = worktree.clone();
        if let Some(agent) = self.registry.get(&event.agent_type) {
            let todos = agent.read_todos(&worktree.path).await;
            if !todos.is_empty() {
                for_commit.todos = todos.clone();
                let _ = self.store.mutate_worktree(worktree.id, |w| w.todos = todos);
            }
        }
        let committed = self.commit_sync.auto_commit_best_effort(&for_commit).await;
        if committed.is_some() {
            let _ = self.service.refresh_status(worktree.id).await;
        }

        let base_title = for_commit
            .session_title
            .as_ref()
            .map(|t| t.title.as_str())
            .unwrap_or(&for_commit.name);
        let description = todo::first_incomplete(&for_commit.todos).map(|t| t.content.clone());
        self.bus.publish(Event::SessionStopped {
            worktree_path: worktree.path.clone(),
            title: format!("{} stopped", short(base_title, STOP_TITLE_LIMIT)),
            description,
        });
        info!(worktree = %worktree.name, committed = committed.is_some(), "agent session stopped");
    }

    async fn handle_post_tool_use(&self, worktree: &Worktree, event: &AgentLifecycleEvent) {
        let Some(agent) = self.registry.get(&event.agent_type) else {
            return;
        };
        let Some(session) = agent.read_session(&worktree.path).await else {
            return;
        };

        if !session.todos.is_empty() && session.todos != worktree.todos {
            let todos = session.todos.clone();
            if self
                .store
                .mutate_worktree(worktree.id, |w| w.todos = todos.clone())
                .is_ok()
            {
                self.bus.publish(Event::WorktreeTodosUpdated {
                    worktree_id: worktree.id,
                    todos: session.todos.clone(),
                });
            }
        }

        if let Some(title) = session.current_title() {
            let known = worktree.session_title.as_ref().map(|t| t.title.as_str());
            if known != Some(title) {
                let entry = TitleEntry::new(title);
                if let Ok(updated) = self.store.mutate_worktree(worktree.id, |w| {
                    w.set_session_title(entry.clone());
                }) {
                    self.bus.publish(Event::SessionTitleUpdated {
                        worktree_path: updated.path.clone(),
                        title: entry,
                    });
                }
            }
        }

        // The typed schema has no dedicated record for assistant text, so
        // the latest message rides the forward-compatible channel.
        if let Some(message) = session.latest_assistant_message {
            self.bus.publish(Event::Custom {
                event_type: "session:message".to_string(),
                payload: serde_json::json!({
                    "worktree_path": worktree.path,
                    "message": message,
                }),
            });
        }
    }
}

#[cfg(test)]
#[path = "agent_events_tests.rs"]
mod tests;
