// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ETag support for conditional reads.
//!
//! The entity tag is the SHA-256 of the canonical JSON serialization of the
//! response body. Identical tags short-circuit to 304 without a body.

use axum::http::{header, HeaderMap};
use sha2::{Digest, Sha256};

/// Strong ETag (quoted hex digest) for a JSON body.
pub fn etag_for(value: &serde_json::Value) -> String {
    let canonical = value.to_string();
    let digest = Sha256::digest(canonical.as_bytes());
    let mut hex = String::with_capacity(64);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(hex, "{byte:02x}");
    }
    format!("\"{hex}\"")
}

/// Does the request's `If-None-Match` match this tag?
pub fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    value
        .split(',')
        .map(str::trim)
        .any(|candidate| candidate == "*" || candidate == etag)
}

#[cfg(test)]
#[path = "etag_tests.rs"]
mod tests;
