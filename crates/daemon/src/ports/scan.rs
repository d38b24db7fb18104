// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Enumeration of listening TCP sockets.
//!
//! Primary source is `/proc/net/tcp{,6}` with socket inodes attributed to
//! processes via `/proc/<pid>/fd`. Hosts without procfs fall back to `lsof`.

use std::collections::HashMap;
use std::path::PathBuf;
use tracing::trace;

/// TCP LISTEN state in `/proc/net/tcp`.
const TCP_LISTEN: &str = "0A";

/// One listening socket attributed to a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener {
    pub port: u16,
    pub pid: Option<u32>,
    pub command: Option<String>,
    pub working_dir: Option<PathBuf>,
}

/// Enumerate listening TCP ports on the local host.
pub async fn scan_listeners() -> Vec<Listener> {
    match scan_procfs().await {
        Some(listeners) => listeners,
        None => scan_lsof().await,
    }
}

async fn scan_procfs() -> Option<Vec<Listener>> {
    let mut by_port: HashMap<u16, u64> = HashMap::new();
    let mut any_table = false;
    for table in ["/proc/net/tcp", "/proc/net/tcp6"] {
        let Ok(contents) = tokio::fs::read_to_string(table).await else {
            continue;
        };
        any_table = true;
        for (port, inode) in parse_proc_net_tcp(&contents) {
            by_port.entry(port).or_insert(inode);
        }
    }
    if !any_table {
        return None;
    }

    let inode_owner = map_inodes_to_pids().await;
    let mut listeners: Vec<Listener> = Vec::new();
    let mut ports: Vec<_> = by_port.into_iter().collect();
    ports.sort_unstable();
    for (port, inode) in ports {
        let pid = inode_owner.get(&inode).copied();
        let (command, working_dir) = match pid {
            Some(pid) => (read_comm(pid).await, read_cwd(pid).await),
            None => (None, None),
        };
        listeners.push(Listener { port, pid, command, working_dir });
    }
    Some(listeners)
}

/// Parse `(local_port, inode)` pairs for sockets in LISTEN state.
pub(crate) fn parse_proc_net_tcp(contents: &str) -> Vec<(u16, u64)> {
    let mut out = Vec::new();
    for line in contents.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 || fields[3] != TCP_LISTEN {
            continue;
        }
        let Some(port_hex) = fields[1].rsplit(':').next() else {
            continue;
        };
        let Ok(port) = u16::from_str_radix(port_hex, 16) else {
            continue;
        };
        let Ok(inode) = fields[9].parse::<u64>() else {
            continue;
        };
        out.push((port, inode));
    }
    out
}

/// Walk `/proc/<pid>/fd` resolving `socket:[inode]` links.
async fn map_inodes_to_pids() -> HashMap<u64, u32> {
    let mut map = HashMap::new();
    let Ok(mut proc_entries) = tokio::fs::read_dir("/proc").await else {
        return map;
    };
    while let Ok(Some(entry)) = proc_entries.next_entry().await {
        let name = entry.file_name();
        let Some(pid) = name.to_str().and_then(|s| s.parse::<u32>().ok()) else {
            continue;
        };
        let fd_dir = entry.path().join("fd");
        let Ok(mut fds) = tokio::fs::read_dir(&fd_dir).await else {
            continue;
        };
        while let Ok(Some(fd)) = fds.next_entry().await {
            let Ok(target) = tokio::fs::read_link(fd.path()).await else {
                continue;
            };
            let target = target.to_string_lossy().into_owned();
            if let Some(inode) = target
                .strip_prefix("socket:[")
                .and_then(|s| s.strip_suffix(']'))
                .and_then(|s| s.parse::<u64>().ok())
            {
                map.entry(inode).or_insert(pid);
            }
        }
    }
    map
}

async fn read_comm(pid: u32) -> Option<String> {
    tokio::fs::read_to_string(format!("/proc/{pid}/comm"))
        .await
        .ok()
        .map(|s| s.trim().to_string())
}

async fn read_cwd(pid: u32) -> Option<PathBuf> {
    tokio::fs::read_link(format!("/proc/{pid}/cwd")).await.ok()
}

/// `lsof` fallback for hosts without procfs.
async fn scan_lsof() -> Vec<Listener> {
    let output = tokio::process::Command::new("lsof")
        .args(["-nP", "-iTCP", "-sTCP:LISTEN", "-F", "pcn"])
        .output()
        .await;
    let Ok(output) = output else {
        trace!("lsof unavailable; no port data");
        return Vec::new();
    };
    parse_lsof(&String::from_utf8_lossy(&output.stdout))
}

/// Parse `lsof -F pcn` field output.
pub(crate) fn parse_lsof(contents: &str) -> Vec<Listener> {
    let mut listeners: Vec<Listener> = Vec::new();
    let mut pid: Option<u32> = None;
    let mut command: Option<String> = None;
    for line in contents.lines() {
        match line.split_at_checked(1) {
            Some(("p", rest)) => pid = rest.parse().ok(),
            Some(("c", rest)) => command = Some(rest.to_string()),
            Some(("n", rest)) => {
                let Some(port) = rest.rsplit(':').next().and_then(|p| p.parse::<u16>().ok()) else {
                    continue;
                };
                if listeners.iter().all(|l| l.port != port) {
                    listeners.push(Listener {
                        port,
                        pid,
                        command: command.clone(),
                        working_dir: None,
                    });
                }
            }
            _ => {}
        }
    }
    listeners
}

#[cfg(test)]
#[path = "scan_tests.rs"]
mod tests;
