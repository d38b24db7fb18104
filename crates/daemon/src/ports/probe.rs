// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP classification probe.
//!
//! A short GET against the loopback port decides whether a listener speaks
//! HTTP. Any transport failure inside the deadline (including a socket that
//! closes mid-probe) classifies as plain TCP; there is no spurious `http`
//! with an empty title.

use catnip_core::ServiceType;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

/// Deadline for the entire probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

static TITLE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>\s*(.*?)\s*</title>").ok());

/// Outcome of probing one port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub service_type: ServiceType,
    pub title: Option<String>,
}

impl ProbeResult {
    fn tcp() -> Self {
        Self { service_type: ServiceType::Tcp, title: None }
    }
}

/// Probe a loopback port for HTTP.
pub async fn probe_http(client: &reqwest::Client, port: u16) -> ProbeResult {
    let url = format!("http://127.0.0.1:{port}/");
    let request = client.get(&url).timeout(PROBE_TIMEOUT).send();
    let response = match request.await {
        Ok(response) => response,
        Err(_) => return ProbeResult::tcp(),
    };

    // Any parseable HTTP response means an HTTP service, error statuses
    // included; dev servers routinely 404 on `/`.
    let body = match response.text().await {
        Ok(body) => body,
        Err(_) => return ProbeResult { service_type: ServiceType::Http, title: None },
    };
    ProbeResult {
        service_type: ServiceType::Http,
        title: extract_title(&body),
    }
}

/// `<title>` contents of an HTML body, if present and non-empty.
pub fn extract_title(body: &str) -> Option<String> {
    let re = TITLE_RE.as_ref()?;
    let captured = re.captures(body)?.get(1)?.as_str().trim();
    if captured.is_empty() {
        None
    } else {
        Some(captured.to_string())
    }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
