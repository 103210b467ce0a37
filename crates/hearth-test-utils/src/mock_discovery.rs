// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool discovery that counts how often it runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use hearth_core::{HearthError, ToolComponent, ToolDiscovery};

pub struct CountingDiscovery {
    tools: Vec<Arc<dyn ToolComponent>>,
    fail: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl CountingDiscovery {
    /// Discovery that returns `tools`.
    pub fn new(tools: Vec<Arc<dyn ToolComponent>>) -> Self {
        Self {
            tools,
            fail: false,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Discovery that always errors.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    /// Sleep for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolDiscovery for CountingDiscovery {
    async fn discover(&self) -> Result<Vec<Arc<dyn ToolComponent>>, HearthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(HearthError::collaborator("discovery source unreachable"));
        }
        Ok(self.tools.clone())
    }
}
