// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Branch-name summarization for automatic graduation.
//!
//! The production deployment may wire a local-inference or API-backed
//! summarizer here; the daemon only depends on the trait. The heuristic
//! default produces a usable kebab-case name from the session title without
//! leaving the process.

use async_trait::async_trait;

/// Words dropped from generated branch names.
const STOP_WORDS: [&str; 8] = ["a", "an", "and", "for", "in", "of", "the", "to"];

/// Maximum words kept in a generated branch name.
const MAX_WORDS: usize = 5;

/// Produces a kebab-case branch name from a session title.
#[async_trait]
pub trait BranchNameSummarizer: Send + Sync {
    /// `None` when no reasonable name can be derived.
    async fn branch_name(&self, title: &str) -> Option<String>;
}

/// Default summarizer: kebab-case the title, drop filler words.
pub struct HeuristicSummarizer;

#[async_trait]
impl BranchNameSummarizer for HeuristicSummarizer {
    async fn branch_name(&self, title: &str) -> Option<String> {
        let name = kebab_case(title);
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

/// Lowercase alphanumeric words joined by dashes, filler words removed,
/// truncated to [`MAX_WORDS`].
pub fn kebab_case(title: &str) -> String {
    title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_lowercase)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .take(MAX_WORDS)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
#[path = "summarizer_tests.rs"]
mod tests;
