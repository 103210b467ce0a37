// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-flight loader for externally discovered tools.
//!
//! Discovery runs at most once per process unless [`ExternalToolLoader::reset`]
//! is called. Callers arriving while a discovery is in flight await the same
//! shared future. A failed or timed-out discovery still counts as loaded and
//! yields an empty tool list.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use hearth_core::{HearthError, ToolComponent, ToolDiscovery};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Name prefix that marks a tool as externally discovered.
pub const DISCOVERED_TOOL_PREFIX: &str = "mcp_";

/// Reserved plugin that owns every discovered tool.
pub const EXTERNAL_TOOLS_PLUGIN: &str = "external_tools";

/// Whether a tool name carries the discovered-tool prefix.
pub fn is_discovered_tool(name: &str) -> bool {
    name.starts_with(DISCOVERED_TOOL_PREFIX)
}

/// Registry name for a discovered tool: prefixed, with the namespace
/// separator replaced.
pub fn discovered_tool_name(raw: &str) -> String {
    let sanitized = raw.replace(hearth_core::NAMESPACE_SEPARATOR, "_");
    if is_discovered_tool(&sanitized) {
        sanitized
    } else {
        format!("{DISCOVERED_TOOL_PREFIX}{sanitized}")
    }
}

pub type DiscoveredTools = Arc<Vec<Arc<dyn ToolComponent>>>;

type InFlight = Shared<BoxFuture<'static, DiscoveredTools>>;

enum Phase {
    Idle,
    Loading(InFlight),
    Loaded(DiscoveredTools),
}

struct LoaderState {
    /// Bumped by `reset` so a stale in-flight result is not stored.
    generation: u64,
    phase: Phase,
}

pub struct ExternalToolLoader {
    discovery: Option<Arc<dyn ToolDiscovery>>,
    timeout: Duration,
    state: Mutex<LoaderState>,
}

impl ExternalToolLoader {
    /// A loader over `discovery`. `None` yields an empty list on every load.
    pub fn new(discovery: Option<Arc<dyn ToolDiscovery>>, timeout: Duration) -> Self {
        Self {
            discovery,
            timeout,
            state: Mutex::new(LoaderState {
                generation: 0,
                phase: Phase::Idle,
            }),
        }
    }

    /// Discover tools once; every concurrent or later caller shares the result.
    pub async fn load_once(&self) -> DiscoveredTools {
        let (in_flight, generation) = {
            let mut state = self.state.lock().await;
            let existing = match &state.phase {
                Phase::Loaded(tools) => return Arc::clone(tools),
                Phase::Loading(in_flight) => Some(in_flight.clone()),
                Phase::Idle => None,
            };
            let in_flight = match existing {
                Some(in_flight) => in_flight,
                None => {
                    let in_flight = self.start_discovery();
                    state.phase = Phase::Loading(in_flight.clone());
                    in_flight
                }
            };
            (in_flight, state.generation)
        };

        let tools = in_flight.await;

        let mut state = self.state.lock().await;
        if state.generation == generation && matches!(state.phase, Phase::Loading(_)) {
            state.phase = Phase::Loaded(Arc::clone(&tools));
        }
        tools
    }

    fn start_discovery(&self) -> InFlight {
        let discovery = self.discovery.clone();
        let timeout = self.timeout;
        async move {
            let Some(discovery) = discovery else {
                debug!("no tool discovery configured");
                return Arc::new(Vec::new());
            };
            let result = match tokio::time::timeout(timeout, discovery.discover()).await {
                Ok(result) => result,
                Err(_) => Err(HearthError::Timeout { duration: timeout }),
            };
            match result {
                Ok(tools) => {
                    info!(count = tools.len(), "external tools discovered");
                    Arc::new(tools)
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        "external tool discovery failed; continuing without external tools"
                    );
                    Arc::new(Vec::new())
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Whether a discovery result is cached.
    pub async fn is_loaded(&self) -> bool {
        matches!(self.state.lock().await.phase, Phase::Loaded(_))
    }

    /// Forget the cached result so the next `load_once` discovers again.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.generation += 1;
        state.phase = Phase::Idle;
        debug!(generation = state.generation, "external tool loader reset");
    }
}

impl std::fmt::Debug for ExternalToolLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalToolLoader")
            .field("configured", &self.discovery.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}
