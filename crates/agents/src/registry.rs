// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime registry of agent capabilities, keyed by `kind` tag.

use crate::capability::AgentCapability;
use crate::claude::ClaudeAgent;
use crate::gemini::GeminiAgent;
use std::collections::HashMap;
use std::sync::Arc;

/// Agents known to this daemon. New agents register at startup; lookups at
/// request time select by tag.
#[derive(Default)]
pub struct AgentRegistry {
    agents: HashMap<&'static str, Arc<dyn AgentCapability>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in agents.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ClaudeAgent::new()));
        registry.register(Arc::new(GeminiAgent::new()));
        registry
    }

    pub fn register(&mut self, agent: Arc<dyn AgentCapability>) {
        self.agents.insert(agent.kind(), agent);
    }

    pub fn get(&self, kind: &str) -> Option<Arc<dyn AgentCapability>> {
        self.agents.get(kind).cloned()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.agents.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
