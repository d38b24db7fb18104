// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observed listening ports inside the container.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Classification of a listening socket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    /// Responded to an HTTP probe; eligible for proxying.
    Http,
    /// Accepts TCP but did not speak HTTP (or closed mid-probe).
    #[default]
    Tcp,
}

crate::simple_display! {
    ServiceType {
        Http => "http",
        Tcp => "tcp",
    }
}

/// A listening TCP port attributed to a local process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortRecord {
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
    pub service_type: ServiceType,
    /// `<title>` scraped from the HTTP probe, when the service is HTTP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Host-side forward declared by the container runtime, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_port: Option<u16>,
}

impl PortRecord {
    pub fn new(port: u16) -> Self {
        let now = Utc::now();
        Self {
            port,
            pid: None,
            command: None,
            working_dir: None,
            service_type: ServiceType::Tcp,
            title: None,
            first_seen: now,
            last_seen: now,
            host_port: None,
        }
    }

    pub fn is_http(&self) -> bool {
        self.service_type == ServiceType::Http
    }
}

#[cfg(test)]
#[path = "port_tests.rs"]
mod tests;
