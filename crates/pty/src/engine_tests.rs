// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn test_engine(dir: &Path) -> PtyEngine {
    PtyEngine::new(EngineConfig {
        shell: "/bin/bash".to_string(),
        home: dir.to_path_buf(),
        ring_capacity: 1024,
        idle_timeout: Duration::from_secs(600),
    })
}

#[tokio::test]
async fn same_id_and_agent_reuses_session() {
    let dir = tempfile::tempdir().unwrap();
    let engine = test_engine(dir.path());

    let a = engine.get_or_create("s1", "", dir.path()).unwrap();
    let b = engine.get_or_create("s1", "", dir.path()).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(engine.list().len(), 1);

    engine.remove("s1");
}

#[tokio::test]
async fn agent_change_recreates_session() {
    let dir = tempfile::tempdir().unwrap();
    let engine = test_engine(dir.path());

    let shell = engine.get_or_create("s1", "", dir.path()).unwrap();
    // "/bin/bash" as explicit agent tag runs bash verbatim; it differs from
    // "" so the engine must tear down and respawn.
    let replaced = engine.get_or_create("s1", "/bin/bash", dir.path()).unwrap();

    assert!(!Arc::ptr_eq(&shell, &replaced));
    assert!(shell.is_closed());
    assert!(!replaced.is_closed());
    assert_eq!(engine.list().len(), 1);

    engine.remove("s1");
}

#[tokio::test]
async fn creates_missing_work_dir() {
    let dir = tempfile::tempdir().unwrap();
    let engine = test_engine(dir.path());
    let work_dir = dir.path().join("does/not/exist");

    engine.get_or_create("s1", "", &work_dir).unwrap();
    assert!(work_dir.is_dir());

    engine.remove("s1");
}

#[tokio::test]
async fn reap_skips_active_and_fresh_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let engine = test_engine(dir.path());

    let idle = engine.get_or_create("idle", "", dir.path()).unwrap();
    let active = engine.get_or_create("active", "", dir.path()).unwrap();
    let _handle = active.subscribe();

    // Fresh sessions survive a reap at the current time.
    assert!(engine.reap_idle(Instant::now()).is_empty());

    // Far in the future: the subscriber-less session goes, the active stays.
    let later = Instant::now() + Duration::from_secs(3600);
    let reaped = engine.reap_idle(later);
    assert_eq!(reaped, vec!["idle".to_string()]);
    assert!(idle.is_closed());
    assert!(engine.get("idle").is_none());
    assert!(engine.get("active").is_some());

    engine.remove("active");
}
