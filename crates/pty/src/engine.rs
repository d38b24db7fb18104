// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The PTY session map.
//!
//! `get_or_create` is the only entry point: reconnecting to an existing
//! `(id, agent)` pair returns the live session; asking for the same id with
//! a different agent tears the old session down and spawns a fresh one.

use crate::session::{PtyError, PtySession};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Engine-wide settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Shell for agent-less sessions, spawned as a login shell.
    pub shell: String,
    /// Stable HOME exported to every child.
    pub home: PathBuf,
    pub ring_capacity: usize,
    /// Sessions with no subscribers idle longer than this are reaped.
    pub idle_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shell: std::env::var("SHELL").unwrap_or_else(|_| "/bin/bash".to_string()),
            home: std::env::var("HOME").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("/root")),
            ring_capacity: crate::DEFAULT_RING_CAPACITY,
            idle_timeout: Duration::from_secs(600),
        }
    }
}

/// Owns every live PTY session.
pub struct PtyEngine {
    config: EngineConfig,
    sessions: Mutex<HashMap<String, Arc<PtySession>>>,
}

impl PtyEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config, sessions: Mutex::new(HashMap::new()) }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Return the session for `id`, creating or recreating as needed.
    pub fn get_or_create(
        &self,
        id: &str,
        agent: &str,
        work_dir: &Path,
    ) -> Result<Arc<PtySession>, PtyError> {
        let stale = {
            let sessions = self.sessions.lock();
            match sessions.get(id) {
                Some(existing) if existing.agent == agent && !existing.is_closed() => {
                    existing.touch();
                    return Ok(existing.clone());
                }
                Some(existing) => Some(existing.clone()),
                None => None,
            }
        };
        // Spawning allocates a PTY and forks; do it outside the map lock.
        if let Some(stale) = stale {
            info!(session = id, old_agent = %stale.agent, new_agent = agent, "recreating session");
            stale.close();
        }
        let session = PtySession::spawn(
            id,
            agent,
            work_dir,
            &self.config.home,
            &self.config.shell,
            self.config.ring_capacity,
        )?;
        let mut sessions = self.sessions.lock();
        if let Some(previous) = sessions.insert(id.to_string(), session.clone()) {
            if !previous.is_closed() && !Arc::ptr_eq(&previous, &session) {
                previous.close();
            }
        }
        Ok(session)
    }

    pub fn get(&self, id: &str) -> Option<Arc<PtySession>> {
        self.sessions.lock().get(id).cloned()
    }

    pub fn list(&self) -> Vec<Arc<PtySession>> {
        self.sessions.lock().values().cloned().collect()
    }

    /// Close and remove a session.
    pub fn remove(&self, id: &str) -> Option<Arc<PtySession>> {
        let session = self.sessions.lock().remove(id)?;
        session.close();
        Some(session)
    }

    /// Remove sessions with no subscribers that have been idle past the
    /// configured threshold. Returns the reaped session ids.
    pub fn reap_idle(&self, now: Instant) -> Vec<String> {
        let victims: Vec<Arc<PtySession>> = {
            let sessions = self.sessions.lock();
            sessions
                .values()
                .filter(|s| s.subscriber_count() == 0 && s.idle_for(now) > self.config.idle_timeout)
                .cloned()
                .collect()
        };
        let mut reaped = Vec::new();
        for session in victims {
            session.close();
            self.sessions.lock().remove(&session.id);
            info!(session = %session.id, "reaped idle session");
            reaped.push(session.id.clone());
        }
        reaped
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
