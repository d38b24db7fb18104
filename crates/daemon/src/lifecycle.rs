// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and shutdown orchestration.
//!
//! Startup order: state dirs, snapshot load, filesystem reconciliation,
//! background loops, HTTP bind. Shutdown fans a cancellation token out to
//! every loop and joins them with a deadline; the snapshotter takes its
//! final snapshot on the way down.

use crate::agent_events::AgentEventProcessor;
use crate::commit_sync::{CommitAuthor, CommitSyncService};
use crate::events::{run_heartbeat, EventBus};
use crate::ports::{run_port_monitor, PortMonitor};
use crate::state::AppState;
use crate::worktree::{run_status_watcher, WorktreeConfig, WorktreeService};
use catnip_agents::AgentRegistry;
use catnip_core::Event;
use catnip_git::{Git, ShellExecutor};
use catnip_pty::{run_reaper, EngineConfig, PtyEngine};
use catnip_storage::{load_snapshot, reconcile, run_snapshotter, SnapshotError, WorktreeStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Fatal daemon errors, mapped to process exit codes in `main`.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("could not bind port {port}: {source}")]
    Bind { port: u16, source: std::io::Error },

    #[error("snapshot failure: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("unrecoverable filesystem state: {0}")]
    Filesystem(std::io::Error),

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

impl DaemonError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            DaemonError::Bind { .. } => 10,
            DaemonError::Snapshot(_) => 11,
            DaemonError::Filesystem(_) => 12,
            DaemonError::Serve(_) => 1,
        }
    }
}

/// Resolved daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub workspace_dir: PathBuf,
    pub state_dir: PathBuf,
    pub dev_mode: bool,
    pub dev_server_port: u16,
    pub ssh_enabled: bool,
    pub snapshot_interval: Duration,
    pub port_scan_interval: Duration,
}

impl Config {
    /// Read the configuration from the environment.
    pub fn from_env() -> Self {
        Self {
            port: crate::env::port(),
            workspace_dir: crate::env::workspace_dir(),
            state_dir: crate::env::state_dir(),
            dev_mode: crate::env::dev_mode(),
            dev_server_port: crate::env::dev_server_port(),
            ssh_enabled: crate::env::ssh_enabled(),
            snapshot_interval: crate::env::snapshot_interval(),
            port_scan_interval: crate::env::port_scan_interval(),
        }
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.state_dir.join("state.json")
    }
}

/// Assemble the full application state without binding the server. Also the
/// integration-test entry point.
pub fn build_state(config: Config) -> Result<AppState, DaemonError> {
    std::fs::create_dir_all(&config.state_dir).map_err(DaemonError::Filesystem)?;
    std::fs::create_dir_all(&config.workspace_dir).map_err(DaemonError::Filesystem)?;

    let store = Arc::new(WorktreeStore::new());
    if let Some(snapshot) = load_snapshot(&config.snapshot_path())? {
        info!(
            worktrees = snapshot.state.worktrees.len(),
            repositories = snapshot.state.repositories.len(),
            "loaded state snapshot"
        );
        store.import(snapshot.state);
    } else {
        info!("no snapshot found, starting with empty state");
    }

    let bus = Arc::new(EventBus::new());

    // Reconcile snapshot against the filesystem and announce the drift.
    let report = reconcile(&store, &config.workspace_dir);
    for worktree in &report.adopted {
        bus.publish(Event::WorktreeCreated { worktree: Box::new(worktree.clone()) });
    }
    for worktree in &report.pruned {
        bus.publish(Event::WorktreeDeleted {
            worktree_id: worktree.id,
            name: worktree.name.clone(),
        });
    }
    if !report.adopted.is_empty() || !report.pruned.is_empty() {
        info!(
            adopted = report.adopted.len(),
            pruned = report.pruned.len(),
            "reconciled workspace directory"
        );
    }

    let git = Git::new(Arc::new(ShellExecutor::new()));
    let author = CommitAuthor::default();
    let worktree_config = WorktreeConfig {
        workspace_dir: config.workspace_dir.clone(),
        repos_dir: config.state_dir.join("repos"),
        tmp_dir: config.state_dir.join("tmp"),
        author: author.clone(),
    };
    let worktrees = Arc::new(WorktreeService::new(
        store.clone(),
        git.clone(),
        bus.clone(),
        worktree_config,
    ));
    let commit_sync = Arc::new(CommitSyncService::new(git.clone(), author));
    let registry = Arc::new(AgentRegistry::with_defaults());
    let agent_events = Arc::new(AgentEventProcessor::new(
        store.clone(),
        worktrees.clone(),
        commit_sync.clone(),
        registry.clone(),
        bus.clone(),
    ));
    let engine = Arc::new(PtyEngine::new(EngineConfig::default()));
    let http_client = reqwest::Client::new();
    let ports = Arc::new(PortMonitor::new(bus.clone(), http_client.clone(), config.port));

    Ok(AppState {
        config: Arc::new(config),
        store,
        bus,
        engine,
        registry,
        worktrees,
        commit_sync,
        agent_events,
        ports,
        http_client,
        started_at: Instant::now(),
    })
}

/// Run the daemon until SIGINT/SIGTERM. Returns on clean shutdown.
pub async fn run(config: Config) -> Result<(), DaemonError> {
    let port = config.port;
    let state = build_state(config)?;
    let cancel = CancellationToken::new();

    // Background loops.
    let mut loops = Vec::new();
    loops.push(tokio::spawn(run_snapshotter(
        state.store.clone(),
        state.config.snapshot_path(),
        state.config.snapshot_interval,
        cancel.clone(),
    )));
    loops.push(tokio::spawn(run_heartbeat(state.bus.clone(), cancel.clone())));
    loops.push(tokio::spawn(run_port_monitor(
        state.ports.clone(),
        state.config.port_scan_interval,
        cancel.clone(),
    )));
    loops.push(tokio::spawn(run_reaper(state.engine.clone(), cancel.clone())));
    loops.push(tokio::spawn(run_status_watcher(
        state.worktrees.clone(),
        state.config.workspace_dir.clone(),
        cancel.clone(),
    )));

    let app = crate::http::router(state.clone());
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|source| DaemonError::Bind { port, source })?;
    info!(port, "catnip daemon listening");

    let shutdown_cancel = cancel.clone();
    let serve_result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown_cancel.cancel();
        })
        .await;

    // Stop the loops; the snapshotter writes its final snapshot on cancel.
    cancel.cancel();
    for handle in loops {
        if tokio::time::timeout(Duration::from_secs(5), handle).await.is_err() {
            warn!("background loop did not stop within deadline");
        }
    }
    for session in state.engine.list() {
        session.close();
    }
    info!("shutdown complete");

    serve_result.map_err(DaemonError::Serve)
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(signal) => signal,
            Err(e) => {
                error!(error = %e, "could not install SIGTERM handler");
                let _ = ctrl_c.await;
                return;
            }
        };
        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}
