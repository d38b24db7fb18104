// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One PTY session: child process, replay ring, subscriber fan-out.
//!
//! A dedicated reader thread pulls bytes off the PTY master and hands them to
//! an async pump over a channel. The pump appends to the ring and fans out to
//! subscribers. EOF or an I/O error on the master means the child exited; the
//! pump emits a banner and transparently respawns the child unless the
//! session is being closed.

use crate::command::agent_command;
use crate::ring::RingBuffer;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use portable_pty::{native_pty_system, Child, MasterPty, PtySize};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Banner shown to subscribers when the child is recreated.
const RESTART_BANNER: &[u8] = b"\r\n[catnip] shell exited, restarting session\r\n";

/// Queue depth per subscriber; a subscriber that falls this far behind the
/// PTY output is evicted rather than blocking the reader.
const SUBSCRIBER_QUEUE: usize = 256;

/// Errors from PTY session operations.
#[derive(Debug, Error)]
pub enum PtyError {
    #[error("failed to spawn PTY child: {0}")]
    Spawn(String),

    #[error("PTY I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session is closed")]
    SessionClosed,

    #[error("session not ready within {0:?}")]
    ReadyTimeout(Duration),
}

struct SessionIo {
    master: Box<dyn MasterPty + Send>,
    writer: Box<dyn Write + Send>,
    child: Box<dyn Child + Send + Sync>,
}

struct Subscriber {
    id: u64,
    tx: mpsc::Sender<Vec<u8>>,
}

/// Receiver half handed to a WebSocket writer task. The first frame is the
/// replay ring snapshot; live bytes follow.
pub struct SubscriberHandle {
    pub id: u64,
    pub rx: mpsc::Receiver<Vec<u8>>,
}

/// A multiplexed PTY session.
pub struct PtySession {
    pub id: String,
    pub agent: String,
    pub work_dir: PathBuf,
    pub created_at: DateTime<Utc>,
    home: PathBuf,
    shell: String,
    ring: Mutex<RingBuffer>,
    subscribers: Mutex<Vec<Subscriber>>,
    io: Mutex<Option<SessionIo>>,
    size: Mutex<(u16, u16)>,
    last_access: Mutex<Instant>,
    closed: AtomicBool,
    next_subscriber_id: AtomicU64,
    /// Bumped on every respawn so a superseded pump never double-respawns.
    generation: AtomicU64,
}

impl PtySession {
    /// Spawn the child and start its I/O loops. Creates `work_dir` if missing.
    pub fn spawn(
        id: &str,
        agent: &str,
        work_dir: &Path,
        home: &Path,
        shell: &str,
        ring_capacity: usize,
    ) -> Result<Arc<Self>, PtyError> {
        std::fs::create_dir_all(work_dir)?;
        let session = Arc::new(Self {
            id: id.to_string(),
            agent: agent.to_string(),
            work_dir: work_dir.to_path_buf(),
            created_at: Utc::now(),
            home: home.to_path_buf(),
            shell: shell.to_string(),
            ring: Mutex::new(RingBuffer::new(ring_capacity)),
            subscribers: Mutex::new(Vec::new()),
            io: Mutex::new(None),
            size: Mutex::new((crate::INITIAL_COLS, crate::INITIAL_ROWS)),
            last_access: Mutex::new(Instant::now()),
            closed: AtomicBool::new(false),
            next_subscriber_id: AtomicU64::new(1),
            generation: AtomicU64::new(0),
        });
        session.respawn()?;
        Ok(session)
    }

    /// (Re)create the PTY pair and child, then restart the I/O loops.
    fn respawn(self: &Arc<Self>) -> Result<(), PtyError> {
        let (cols, rows) = *self.size.lock();
        let pty = native_pty_system()
            .openpty(PtySize { rows, cols, pixel_width: 0, pixel_height: 0 })
            .map_err(|e| PtyError::Spawn(e.to_string()))?;

        let builder =
            agent_command(&self.agent, &self.shell).to_builder(&self.id, &self.work_dir, &self.home);
        let child = pty
            .slave
            .spawn_command(builder)
            .map_err(|e| PtyError::Spawn(e.to_string()))?;
        drop(pty.slave);

        let writer = pty
            .master
            .take_writer()
            .map_err(|e| PtyError::Spawn(e.to_string()))?;
        let reader = pty
            .master
            .try_clone_reader()
            .map_err(|e| PtyError::Spawn(e.to_string()))?;

        *self.io.lock() = Some(SessionIo { master: pty.master, writer, child });
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.start_io(reader, generation);
        debug!(session = %self.id, agent = %self.agent, generation, "pty child spawned");
        Ok(())
    }

    fn start_io(self: &Arc<Self>, reader: Box<dyn Read + Send>, generation: u64) {
        let (tx, mut rx) = mpsc::channel::<Vec<u8>>(64);

        // Reader thread: PTY master → channel. EOF and EIO both mean the
        // child side is gone.
        std::thread::spawn(move || {
            let mut reader = reader;
            let mut buf = [0u8; 4096];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        if tx.blocking_send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        // Pump task: channel → ring + subscribers, then handle child exit.
        let session = self.clone();
        tokio::spawn(async move {
            while let Some(bytes) = rx.recv().await {
                session.ring.lock().write(&bytes);
                session.fan_out(&bytes);
            }
            if session.closed.load(Ordering::SeqCst) {
                return;
            }
            if session.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            session.fan_out(RESTART_BANNER);
            session.ring.lock().clear();
            if let Err(e) = session.respawn() {
                warn!(session = %session.id, error = %e, "failed to recreate pty child");
                session.close();
            }
        });
    }

    /// Deliver bytes to all subscribers, evicting any whose queue rejects
    /// the write.
    fn fan_out(&self, bytes: &[u8]) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|sub| sub.tx.try_send(bytes.to_vec()).is_ok());
    }

    /// Attach a subscriber. Its first frame is the current ring snapshot.
    pub fn subscribe(&self) -> SubscriberHandle {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_QUEUE);
        let snapshot = self.ring.lock().snapshot();
        if !snapshot.is_empty() {
            let _ = tx.try_send(snapshot);
        }
        let id = self.next_subscriber_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers.lock().push(Subscriber { id, tx });
        self.touch();
        SubscriberHandle { id, rx }
    }

    pub fn unsubscribe(&self, id: u64) {
        self.subscribers.lock().retain(|sub| sub.id != id);
        self.touch();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Forward input bytes to the child verbatim.
    pub fn write_input(&self, bytes: &[u8]) -> Result<(), PtyError> {
        {
            let mut io = self.io.lock();
            let io = io.as_mut().ok_or(PtyError::SessionClosed)?;
            io.writer.write_all(bytes)?;
            io.writer.flush()?;
        }
        self.touch();
        Ok(())
    }

    /// Apply a new window size and remember it for post-recreation restore.
    pub fn resize(&self, cols: u16, rows: u16) -> Result<(), PtyError> {
        *self.size.lock() = (cols, rows);
        let io = self.io.lock();
        let io = io.as_ref().ok_or(PtyError::SessionClosed)?;
        io.master
            .resize(PtySize { rows, cols, pixel_width: 0, pixel_height: 0 })
            .map_err(|e| PtyError::Spawn(e.to_string()))?;
        Ok(())
    }

    pub fn size(&self) -> (u16, u16) {
        *self.size.lock()
    }

    pub fn ring_snapshot(&self) -> Vec<u8> {
        self.ring.lock().snapshot()
    }

    /// Kill the child; the pump recreates it under the same session.
    /// Used by the `{"type":"reset"}` control frame.
    pub fn request_reset(&self) {
        if let Some(io) = self.io.lock().as_mut() {
            let _ = io.child.kill();
        }
    }

    /// Tear the session down permanently: no recreation, subscribers closed.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        if let Some(mut io) = self.io.lock().take() {
            let _ = io.child.kill();
        }
        self.subscribers.lock().clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn touch(&self) {
        *self.last_access.lock() = Instant::now();
    }

    /// How long since the session was last used, as of `now`.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(*self.last_access.lock())
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
