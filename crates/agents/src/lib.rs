// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! catnip-agents: coding-agent capability registry and session-log readers.
//!
//! Each agent is modeled as a capability set selected at runtime by its
//! `kind` tag; there is no inheritance, only the [`AgentCapability`] trait.
//! The default implementation targets agents that persist JSONL session logs
//! into a per-project directory; the daemon tails those files read-only.

pub mod capability;
pub mod claude;
pub mod gemini;
pub mod lifecycle;
pub mod registry;
pub mod session_log;
pub mod summarizer;

pub use capability::AgentCapability;
pub use claude::ClaudeAgent;
pub use gemini::GeminiAgent;
pub use lifecycle::{classify_activity, AgentLifecycleEvent, LifecycleKind};
pub use registry::AgentRegistry;
pub use session_log::SessionLogParser;
pub use summarizer::{kebab_case, BranchNameSummarizer, HeuristicSummarizer};
