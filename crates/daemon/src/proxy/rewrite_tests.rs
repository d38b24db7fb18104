// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn html_prefixes_absolute_src_and_href() {
    let html = r#"<html><head></head><body><script src="/main.js"></script><a href="/about">x</a><img src="/logo.png"></body></html>"#;
    let out = rewrite_html(html, 5173);
    assert!(out.contains(r#"src="/5173/main.js""#));
    assert!(out.contains(r#"href="/5173/about""#));
    assert!(out.contains(r#"src="/5173/logo.png""#));
}

#[test]
fn html_injects_base_and_bootstrap() {
    let html = r#"<html><head><meta charset="utf-8"></head><body></body></html>"#;
    let out = rewrite_html(html, 5173);
    assert!(out.contains(r#"<head><base href="/5173/">"#));
    assert!(out.contains(r#"window.__PROXY_BASE_PATH__ = "/5173";"#));
    // The fuller shim lands right before </body>.
    let shim_pos = out.find("catnip port proxy").unwrap();
    let body_pos = out.find("</body>").unwrap();
    assert!(shim_pos < body_pos);
}

#[test]
fn html_leaves_other_attributes_alone() {
    let html = r#"<div data-path="/raw" id="/weird"><script src="/app.js"></script></div>"#;
    let out = rewrite_html(html, 3000);
    assert!(out.contains(r#"data-path="/raw""#));
    assert!(out.contains(r#"id="/weird""#));
    assert!(out.contains(r#"src="/3000/app.js""#));
}

#[parameterized(
    already_prefixed = { r#"<a href="/5173/page">"#, r#"href="/5173/page""# },
    protocol_relative = { r#"<script src="//cdn.example.com/x.js">"#, r#"src="//cdn.example.com/x.js""# },
    absolute_url = { r#"<a href="https://example.com/a">"#, r#"href="https://example.com/a""# },
    relative = { r#"<img src="assets/x.png">"#, r#"src="assets/x.png""# },
)]
fn html_untouched_cases(input: &str, expected_fragment: &str) {
    let out = rewrite_html(input, 5173);
    assert!(out.contains(expected_fragment), "{out}");
}

#[test]
fn js_rewrites_imports_and_fetch() {
    let js = r#"
import { app } from "/src/app.js";
export { util } from "/src/util.js";
const mod = await import("/src/lazy.js");
fetch("/api/items");
const u = new URL("/api/feed");
xhr.open("GET", "/api/data");
"#;
    let out = rewrite_js(js, 5173);
    assert!(out.contains(r#"from "/5173/src/app.js""#));
    assert!(out.contains(r#"from "/5173/src/util.js""#));
    assert!(out.contains(r#"import("/5173/src/lazy.js")"#));
    assert!(out.contains(r#"fetch("/5173/api/items")"#));
    assert!(out.contains(r#"new URL("/5173/api/feed")"#));
    assert!(out.contains(r#"open("GET", "/5173/api/data")"#));
}

#[parameterized(
    bare_specifier = { r#"import React from "react";"# },
    scoped_specifier = { r#"import x from "@scope/pkg";"# },
    already_prefixed = { r#"fetch("/5173/api/items");"# },
    protocol_relative = { r#"fetch("//cdn.example.com/x");"# },
)]
fn js_untouched_cases(input: &str) {
    assert_eq!(rewrite_js(input, 5173), input);
}

#[test]
fn content_type_detection() {
    assert!(is_html_content_type("text/html"));
    assert!(is_html_content_type("text/html; charset=utf-8"));
    assert!(!is_html_content_type("application/json"));

    assert!(is_js_content_type("application/javascript"));
    assert!(is_js_content_type("text/javascript; charset=utf-8"));
    assert!(!is_js_content_type("text/css"));
}
