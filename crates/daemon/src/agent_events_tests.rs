// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::commit_sync::CommitAuthor;
use crate::worktree::test_helpers::fixture;
use catnip_agents::ClaudeAgent;
use catnip_core::{ActivityState, Todo, TodoStatus};
use tempfile::TempDir;

struct Harness {
    fx: crate::worktree::test_helpers::Fixture,
    processor: AgentEventProcessor,
    agent_home: TempDir,
}

async fn harness() -> Harness {
    let fx = fixture().await;
    let agent_home = TempDir::new().unwrap();
    let mut registry = AgentRegistry::new();
    registry.register(Arc::new(ClaudeAgent::with_home(
        agent_home.path().to_path_buf(),
    )));
    let commit_sync = Arc::new(CommitSyncService::new(
        fx.git.clone(),
        CommitAuthor::default(),
    ));
    let processor = AgentEventProcessor::new(
        fx.store.clone(),
        fx.service.clone(),
        commit_sync,
        Arc::new(registry),
        fx.bus.clone(),
    );
    Harness { fx, processor, agent_home }
}

fn lifecycle(kind: &str, dir: std::path::PathBuf) -> AgentLifecycleEvent {
    AgentLifecycleEvent {
        event_type: kind.to_string(),
        working_directory: dir,
        agent_type: "claude".to_string(),
        timestamp: None,
    }
}

fn drain(rx: &mut tokio::sync::mpsc::Receiver<catnip_core::EventRecord>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(record) = rx.try_recv() {
        events.push(record.event);
    }
    events
}

/// Agent Stop over a dirty worktree: auto-commit plus `session:stopped`
/// carrying the in-flight todo as description.
#[tokio::test]
async fn stop_commits_and_announces() {
    let h = harness().await;
    let worktree = h.fx.service.create_worktree("org/repo", None).await.unwrap();
    std::fs::write(worktree.path.join("generated.rs"), "fn main() {}").unwrap();
    h.fx.store
        .mutate_worktree(worktree.id, |w| {
            w.todos = vec![Todo::new("refactor parser", TodoStatus::InProgress)];
        })
        .unwrap();

    let (_id, mut rx) = h.fx.bus.subscribe();
    // Hooks report a subdirectory; longest-path matching finds the worktree.
    let outcome = h
        .processor
        .process(lifecycle("Stop", worktree.path.join("src")))
        .await;
    assert_eq!(outcome, ProcessOutcome::Processed);

    // The dirty tree was committed with the fallback message.
    assert!(!h.fx.git.is_dirty(&worktree.path).await.unwrap());
    let subjects = h.fx.git.log_subjects(&worktree.path, "HEAD").await.unwrap();
    assert!(subjects[0].starts_with("checkpoint: "), "{subjects:?}");

    let events = drain(&mut rx);
    let stopped = events
        .iter()
        .find_map(|e| match e {
            Event::SessionStopped { title, description, .. } => Some((title, description)),
            _ => None,
        })
        .expect("session:stopped not published");
    assert!(stopped.0.ends_with(" stopped"));
    assert_eq!(stopped.1.as_deref(), Some("refactor parser"));

    assert!(events.iter().any(|e| matches!(
        e,
        Event::AgentActivityStateChanged { state: ActivityState::Active, .. }
    )));
    assert_eq!(
        h.fx.store.get_worktree(worktree.id).unwrap().agent_activity_state,
        ActivityState::Active
    );
}

#[tokio::test]
async fn stop_with_completed_todo_uses_completed_message() {
    let h = harness().await;
    let worktree = h.fx.service.create_worktree("org/repo", None).await.unwrap();
    std::fs::write(worktree.path.join("done.rs"), "done").unwrap();
    h.fx.store
        .mutate_worktree(worktree.id, |w| {
            w.todos = vec![Todo::new("wire up parser", TodoStatus::Completed)];
        })
        .unwrap();

    h.processor
        .process(lifecycle("Stop", worktree.path.clone()))
        .await;

    let subjects = h.fx.git.log_subjects(&worktree.path, "HEAD").await.unwrap();
    assert_eq!(subjects[0], "completed: wire up parser");
}

#[tokio::test]
async fn events_outside_worktrees_are_ignored() {
    let h = harness().await;
    let outcome = h
        .processor
        .process(lifecycle("Stop", std::path::PathBuf::from("/elsewhere")))
        .await;
    assert_eq!(outcome, ProcessOutcome::NoWorktree);
}

#[tokio::test]
async fn automated_operations_suppress_echo() {
    let h = harness().await;
    let worktree = h.fx.service.create_worktree("org/repo", None).await.unwrap();
    std::fs::write(worktree.path.join("dirty.txt"), "x").unwrap();

    h.fx.service.begin_automated_op(&worktree.path);
    let outcome = h
        .processor
        .process(lifecycle("Stop", worktree.path.clone()))
        .await;
    assert_eq!(outcome, ProcessOutcome::Suppressed);

    // Nothing happened: no commit, tree still dirty.
    assert!(h.fx.git.is_dirty(&worktree.path).await.unwrap());
}

#[tokio::test]
async fn post_tool_use_updates_todos_title_and_message() {
    let h = harness().await;
    let worktree = h.fx.service.create_worktree("org/repo", None).await.unwrap();

    // Lay down a Claude session log for this worktree path.
    let project_dir = h
        .agent_home
        .path()
        .join(".claude/projects")
        .join(catnip_agents::claude::munge_project_path(&worktree.path));
    std::fs::create_dir_all(&project_dir).unwrap();
    std::fs::write(
        project_dir.join("session.jsonl"),
        concat!(
            r#"{"type":"summary","summary":"Build the parser"}"#,
            "\n",
            r#"{"type":"assistant","message":{"role":"assistant","content":[{"type":"text","text":"parser scaffolding done"},{"type":"tool_use","name":"TodoWrite","input":{"todos":[{"content":"scaffold","status":"completed"},{"content":"lexer","status":"in_progress"}]}}]}}"#,
            "\n",
        ),
    )
    .unwrap();

    let (_id, mut rx) = h.fx.bus.subscribe();
    let outcome = h
        .processor
        .process(lifecycle("PostToolUse", worktree.path.clone()))
        .await;
    assert_eq!(outcome, ProcessOutcome::Processed);

    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::WorktreeTodosUpdated { todos, .. } if todos.len() == 2)));
    assert!(events.iter().any(
        |e| matches!(e, Event::SessionTitleUpdated { title, .. } if title.title == "Build the parser")
    ));
    assert!(events.iter().any(|e| matches!(
        e,
        Event::Custom { event_type, .. } if event_type == "session:message"
    )));

    let updated = h.fx.store.get_worktree(worktree.id).unwrap();
    assert_eq!(updated.todos.len(), 2);
    assert_eq!(
        updated.session_title.as_ref().map(|t| t.title.as_str()),
        Some("Build the parser")
    );
    assert_eq!(updated.agent_activity_state, ActivityState::Running);
}

#[tokio::test]
async fn unknown_event_kind_still_refreshes_status() {
    let h = harness().await;
    let worktree = h.fx.service.create_worktree("org/repo", None).await.unwrap();
    let before = h.fx.store.status(worktree.id).version;

    let outcome = h
        .processor
        .process(lifecycle("SessionStart", worktree.path.clone()))
        .await;
    assert_eq!(outcome, ProcessOutcome::Processed);
    assert!(h.fx.store.status(worktree.id).version > before);
}
