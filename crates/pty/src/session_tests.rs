// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn spawn_shell(dir: &Path) -> Arc<PtySession> {
    PtySession::spawn("s1", "", dir, dir, "/bin/bash", 1024).unwrap()
}

/// Wait until `pred` passes over the collected subscriber bytes, or panic.
async fn collect_until(
    rx: &mut tokio::sync::mpsc::Receiver<Vec<u8>>,
    pred: impl Fn(&[u8]) -> bool,
) -> Vec<u8> {
    let mut seen: Vec<u8> = Vec::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        match tokio::time::timeout(remaining, rx.recv()).await {
            Ok(Some(bytes)) => {
                seen.extend_from_slice(&bytes);
                if pred(&seen) {
                    return seen;
                }
            }
            Ok(None) => panic!("subscriber stream closed; got: {:?}", String::from_utf8_lossy(&seen)),
            Err(_) => panic!("timed out; got: {:?}", String::from_utf8_lossy(&seen)),
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[tokio::test]
async fn echo_reaches_live_subscriber() {
    let dir = tempfile::tempdir().unwrap();
    let session = spawn_shell(dir.path());
    let mut sub = session.subscribe();

    session.write_input(b"echo cat$((1+1))\n").unwrap();
    let seen = collect_until(&mut sub.rx, |s| contains(s, b"cat2")).await;
    assert!(contains(&seen, b"cat2"));

    session.close();
}

#[tokio::test]
async fn reconnect_replays_ring_history() {
    let dir = tempfile::tempdir().unwrap();
    let session = spawn_shell(dir.path());

    // First subscriber drives the shell, then detaches.
    let mut first = session.subscribe();
    session.write_input(b"echo hi\n").unwrap();
    collect_until(&mut first.rx, |s| contains(s, b"hi")).await;
    session.unsubscribe(first.id);

    // Second subscriber sees the history in its first frame.
    let mut second = session.subscribe();
    let frame = second.rx.recv().await.unwrap();
    assert!(contains(&frame, b"echo hi"), "replay frame missing input echo");
    assert!(contains(&frame, b"hi"), "replay frame missing output");

    session.close();
}

#[tokio::test]
async fn child_exit_recreates_with_banner() {
    let dir = tempfile::tempdir().unwrap();
    let session = spawn_shell(dir.path());
    let mut sub = session.subscribe();

    session.write_input(b"exit\n").unwrap();
    let seen = collect_until(&mut sub.rx, |s| contains(s, b"restarting session")).await;
    assert!(contains(&seen, b"restarting session"));
    assert!(!session.is_closed());

    // The recreated child is usable. Writes issued during the respawn window
    // can land on the dying master, so retry until output comes back.
    let mut seen: Vec<u8> = Vec::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(15);
    'outer: loop {
        assert!(
            tokio::time::Instant::now() < deadline,
            "no output from recreated child; got: {:?}",
            String::from_utf8_lossy(&seen)
        );
        let _ = session.write_input(b"echo back$((2+2))\n");
        let wait = tokio::time::Instant::now() + Duration::from_millis(500);
        while let Ok(Some(bytes)) =
            tokio::time::timeout_at(wait, sub.rx.recv()).await
        {
            seen.extend_from_slice(&bytes);
            if contains(&seen, b"back4") {
                break 'outer;
            }
        }
    }

    session.close();
}

#[tokio::test]
async fn close_stops_recreation() {
    let dir = tempfile::tempdir().unwrap();
    let session = spawn_shell(dir.path());
    session.close();
    assert!(session.is_closed());
    assert!(matches!(
        session.write_input(b"x"),
        Err(PtyError::SessionClosed)
    ));
}

#[tokio::test]
async fn resize_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let session = spawn_shell(dir.path());
    assert_eq!(session.size(), (crate::INITIAL_COLS, crate::INITIAL_ROWS));

    session.resize(120, 40).unwrap();
    assert_eq!(session.size(), (120, 40));

    session.close();
}

#[tokio::test]
async fn idle_accounting_tracks_touch() {
    let dir = tempfile::tempdir().unwrap();
    let session = spawn_shell(dir.path());
    let later = Instant::now() + Duration::from_secs(700);
    assert!(session.idle_for(later) > Duration::from_secs(600));

    session.touch();
    assert!(session.idle_for(Instant::now()) < Duration::from_secs(1));

    session.close();
}
