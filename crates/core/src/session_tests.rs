// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn current_title_is_latest_entry() {
    let mut session = AgentSession::new("abc-123", PathBuf::from("/workspace/w1"));
    assert!(session.current_title().is_none());

    session.title_entries.push(TitleEntry::new("fix parser"));
    session.title_entries.push(TitleEntry::new("fix parser and tests"));
    assert_eq!(session.current_title(), Some("fix parser and tests"));
}

#[test]
fn session_serde_skips_empty_fields() {
    let session = AgentSession::new("abc-123", PathBuf::from("/workspace/w1"));
    let json = serde_json::to_string(&session).unwrap();
    assert!(!json.contains("messages"));
    assert!(!json.contains("todos"));
    assert!(!json.contains("ended_at"));
}

#[test]
fn session_serde_roundtrip() {
    let mut session = AgentSession::new("abc-123", PathBuf::from("/workspace/w1"));
    session.latest_user_prompt = Some("add a parser".to_string());
    session.messages.push(SessionMessage {
        role: "assistant".to_string(),
        content: "done".to_string(),
        timestamp: None,
    });

    let json = serde_json::to_string(&session).unwrap();
    let parsed: AgentSession = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, session);
}
