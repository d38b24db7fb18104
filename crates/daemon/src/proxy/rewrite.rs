// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTML and JavaScript body rewriting for the port proxy.
//!
//! Absolute same-origin paths (`/x`, not protocol-relative `//host`) are
//! prefixed with `/<port>` so nested dev servers stay navigable behind the
//! proxy. Bare module specifiers and already-prefixed paths are left alone.
//! Only `src`/`href`/`action` attributes are touched in HTML.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Client shim loaded into every proxied HTML page.
const PROXY_SHIM: &str = include_str!("../assets/proxy_shim.js");

static HTML_ATTR_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?i)(\b(?:src|href|action)\s*=\s*)(["'])(/[^/"'][^"']*|/)"#).ok()
});

static HEAD_OPEN_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)<head[^>]*>").ok());

static BODY_CLOSE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)</body>").ok());

// `import x from '/a'`, `import '/a'`, `export ... from '/a'`
static JS_MODULE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(\b(?:import|export)\b[^'"();]*?)(["'])(/[^/"'][^"']*)(["'])"#).ok()
});

// `import('/a')`, `fetch('/a')`, `new URL('/a')`
static JS_CALL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(\b(?:import|fetch|URL)\s*\(\s*)(["'])(/[^/"'][^"']*)(["'])"#).ok()
});

// `xhr.open('GET', '/a')`
static JS_XHR_OPEN_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(\.open\s*\(\s*["'][A-Za-z]+["']\s*,\s*)(["'])(/[^/"'][^"']*)(["'])"#).ok()
});

/// Prefix an absolute path unless it already carries the port prefix.
fn prefixed(path: &str, port: u16) -> String {
    let prefix = format!("/{port}/");
    if path.starts_with(&prefix) || path == format!("/{port}") {
        path.to_string()
    } else {
        format!("/{port}{path}")
    }
}

/// Rewrite an HTML body for serving under `/<port>/`.
pub fn rewrite_html(body: &str, port: u16) -> String {
    let mut out = match HTML_ATTR_RE.as_ref() {
        Some(re) => re
            .replace_all(body, |caps: &Captures<'_>| {
                format!("{}{}{}", &caps[1], &caps[2], prefixed(&caps[3], port))
            })
            .into_owned(),
        None => body.to_string(),
    };

    if let Some(re) = HEAD_OPEN_RE.as_ref() {
        let injection = format!(
            "<base href=\"/{port}/\"><script>window.__PROXY_BASE_PATH__ = \"/{port}\";</script>"
        );
        out = re
            .replacen(&out, 1, |caps: &Captures<'_>| format!("{}{injection}", &caps[0]))
            .into_owned();
    }
    if let Some(re) = BODY_CLOSE_RE.as_ref() {
        // Closure replacement: the shim source contains `$`, which a string
        // replacement would treat as capture references.
        let shim = format!("<script>{PROXY_SHIM}</script></body>");
        out = re
            .replacen(&out, 1, |_: &Captures<'_>| shim.clone())
            .into_owned();
    }
    out
}

/// Rewrite a JavaScript body for serving under `/<port>/`.
pub fn rewrite_js(body: &str, port: u16) -> String {
    let mut out = body.to_string();
    for re in [JS_MODULE_RE.as_ref(), JS_CALL_RE.as_ref(), JS_XHR_OPEN_RE.as_ref()]
        .into_iter()
        .flatten()
    {
        out = re
            .replace_all(&out, |caps: &Captures<'_>| {
                format!(
                    "{}{}{}{}",
                    &caps[1],
                    &caps[2],
                    prefixed(&caps[3], port),
                    &caps[4]
                )
            })
            .into_owned();
    }
    out
}

/// True for content types the HTML rewriter should process.
pub fn is_html_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|t| t.eq_ignore_ascii_case("text/html"))
}

/// True for content types the JS rewriter should process.
pub fn is_js_content_type(content_type: &str) -> bool {
    let Some(essence) = content_type.split(';').next().map(str::trim) else {
        return false;
    };
    matches!(
        essence.to_ascii_lowercase().as_str(),
        "application/javascript" | "text/javascript" | "application/x-javascript" | "module/javascript"
    )
}

#[cfg(test)]
#[path = "rewrite_tests.rs"]
mod tests;
