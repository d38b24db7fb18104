// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The port monitor loop and its observable state.
//!
//! A fixed-interval scan diffs the listener set against the previous
//! iteration: new records are probed and published as `port:opened`,
//! vanished records as `port:closed`. Host-side forwards declared by the
//! container runtime live in a companion map and publish `port:mapped`.

use super::probe::probe_http;
use super::scan::{scan_listeners, Listener};
use crate::events::EventBus;
use catnip_core::{Event, PortRecord};
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct PortMonitor {
    bus: Arc<EventBus>,
    client: reqwest::Client,
    /// The daemon's own port, excluded from records.
    own_port: u16,
    records: Mutex<HashMap<u16, PortRecord>>,
    mappings: Mutex<HashMap<u16, u16>>,
}

impl PortMonitor {
    pub fn new(bus: Arc<EventBus>, client: reqwest::Client, own_port: u16) -> Self {
        Self {
            bus,
            client,
            own_port,
            records: Mutex::new(HashMap::new()),
            mappings: Mutex::new(HashMap::new()),
        }
    }

    pub fn list(&self) -> Vec<PortRecord> {
        let mut records: Vec<_> = self.records.lock().values().cloned().collect();
        records.sort_by_key(|r| r.port);
        records
    }

    pub fn get(&self, port: u16) -> Option<PortRecord> {
        self.records.lock().get(&port).cloned()
    }

    pub fn mappings(&self) -> Vec<(u16, u16)> {
        let mut mappings: Vec<_> = self.mappings.lock().iter().map(|(k, v)| (*k, *v)).collect();
        mappings.sort_unstable();
        mappings
    }

    /// Record a host-side forward and publish `port:mapped`.
    pub fn add_mapping(&self, port: u16, host_port: u16) {
        self.mappings.lock().insert(port, host_port);
        if let Some(record) = self.records.lock().get_mut(&port) {
            record.host_port = Some(host_port);
        }
        self.bus.publish(Event::PortMapped { port, host_port });
    }

    pub fn remove_mapping(&self, port: u16) -> bool {
        let removed = self.mappings.lock().remove(&port).is_some();
        if removed {
            if let Some(record) = self.records.lock().get_mut(&port) {
                record.host_port = None;
            }
        }
        removed
    }

    /// One scan iteration: diff listeners against known records.
    pub async fn tick(&self) {
        let listeners = scan_listeners().await;
        self.apply_scan(listeners).await;
    }

    /// Diff a listener set against the current records, probing newcomers.
    /// Split from [`tick`](Self::tick) so tests can inject listener sets.
    pub async fn apply_scan(&self, listeners: Vec<Listener>) {
        let listeners: Vec<Listener> = listeners
            .into_iter()
            .filter(|l| l.port != self.own_port)
            .collect();

        let (new_listeners, closed): (Vec<Listener>, Vec<PortRecord>) = {
            let records = self.records.lock();
            let new_listeners = listeners
                .iter()
                .filter(|l| !records.contains_key(&l.port))
                .cloned()
                .collect();
            let closed = records
                .values()
                .filter(|r| listeners.iter().all(|l| l.port != r.port))
                .cloned()
                .collect();
            (new_listeners, closed)
        };

        // Probes happen outside the lock; they can take up to a second each.
        for listener in new_listeners {
            let probe = probe_http(&self.client, listener.port).await;
            let mut record = PortRecord::new(listener.port);
            record.pid = listener.pid;
            record.command = listener.command.clone();
            record.working_dir = listener.working_dir.clone();
            record.service_type = probe.service_type;
            record.title = probe.title;
            record.host_port = self.mappings.lock().get(&listener.port).copied();

            info!(port = record.port, service = %record.service_type, "port opened");
            self.records.lock().insert(record.port, record.clone());
            if let Some(pid) = record.pid {
                self.bus.publish(Event::ProcessStarted { pid, command: record.command.clone() });
            }
            self.bus.publish(Event::PortOpened { port: record });
        }

        for record in closed {
            info!(port = record.port, "port closed");
            self.records.lock().remove(&record.port);
            self.bus.publish(Event::PortClosed { port: record.port });
            if let Some(pid) = record.pid {
                self.bus.publish(Event::ProcessStopped { pid, command: record.command });
            }
        }

        // Refresh last_seen on survivors.
        let now = Utc::now();
        let mut records = self.records.lock();
        for listener in &listeners {
            if let Some(record) = records.get_mut(&listener.port) {
                record.last_seen = now;
            }
        }
    }
}

/// Run the scan loop until cancelled.
pub async fn run_port_monitor(
    monitor: Arc<PortMonitor>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => monitor.tick().await,
            _ = cancel.cancelled() => return,
        }
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
