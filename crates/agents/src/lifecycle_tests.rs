// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn event_deserializes_with_optional_timestamp() {
    let event: AgentLifecycleEvent = serde_json::from_str(
        r#"{"event_type":"Stop","working_directory":"/workspace/w1","agent_type":"claude"}"#,
    )
    .unwrap();
    assert_eq!(event.kind(), LifecycleKind::Stop);
    assert_eq!(event.working_directory, PathBuf::from("/workspace/w1"));
    assert!(event.timestamp.is_none());
}

#[parameterized(
    prompt = { "UserPromptSubmit", LifecycleKind::UserPromptSubmit },
    tool = { "PostToolUse", LifecycleKind::PostToolUse },
    stop = { "Stop", LifecycleKind::Stop },
)]
fn known_kinds_parse(input: &str, expected: LifecycleKind) {
    assert_eq!(LifecycleKind::parse(input), expected);
}

#[test]
fn unknown_kind_is_preserved() {
    assert_eq!(
        LifecycleKind::parse("SessionStart"),
        LifecycleKind::Other("SessionStart".to_string())
    );
}

#[test]
fn activity_classification() {
    use catnip_core::ActivityState;

    assert_eq!(
        classify_activity(&LifecycleKind::UserPromptSubmit),
        Some(ActivityState::Running)
    );
    assert_eq!(
        classify_activity(&LifecycleKind::PostToolUse),
        Some(ActivityState::Running)
    );
    assert_eq!(classify_activity(&LifecycleKind::Stop), Some(ActivityState::Active));
    assert_eq!(classify_activity(&LifecycleKind::Other("x".into())), None);
}
