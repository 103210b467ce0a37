// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording event bus for deterministic testing.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use hearth_core::{ComponentContext, EventBus, EventHandlerComponent, HearthError};

#[derive(Default)]
struct BusState {
    subscribed: BTreeSet<String>,
    subscribe_calls: Vec<String>,
    unsubscribe_calls: Vec<String>,
    refuse: HashSet<String>,
    hang: HashSet<String>,
    fail_unsubscribe: HashSet<String>,
}

/// An event bus that records every call.
///
/// Individual handler names can be configured to be refused, to never
/// complete their subscription, or to fail unsubscription.
#[derive(Default)]
pub struct RecordingBus {
    state: Mutex<BusState>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut BusState) -> T) -> T {
        f(&mut self.state.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// `subscribe` for `name` returns `Ok(false)`.
    pub fn refuse_subscribe(&self, name: &str) {
        self.with_state(|s| s.refuse.insert(name.to_string()));
    }

    /// `subscribe` for `name` never completes.
    pub fn hang_subscribe(&self, name: &str) {
        self.with_state(|s| s.hang.insert(name.to_string()));
    }

    /// `unsubscribe` for `name` fails until [`RecordingBus::heal_unsubscribe`].
    pub fn fail_unsubscribe(&self, name: &str) {
        self.with_state(|s| s.fail_unsubscribe.insert(name.to_string()));
    }

    pub fn heal_unsubscribe(&self, name: &str) {
        self.with_state(|s| s.fail_unsubscribe.remove(name));
    }

    /// Currently subscribed handler names, sorted.
    pub fn subscribed(&self) -> Vec<String> {
        self.with_state(|s| s.subscribed.iter().cloned().collect())
    }

    pub fn subscribe_calls(&self) -> Vec<String> {
        self.with_state(|s| s.subscribe_calls.clone())
    }

    pub fn unsubscribe_calls(&self) -> Vec<String> {
        self.with_state(|s| s.unsubscribe_calls.clone())
    }
}

#[async_trait]
impl EventBus for RecordingBus {
    async fn subscribe(
        &self,
        _handler: Arc<dyn EventHandlerComponent>,
        ctx: ComponentContext,
    ) -> Result<bool, HearthError> {
        let name = ctx.component.name.clone();
        let (hang, refuse) = self.with_state(|s| {
            s.subscribe_calls.push(name.clone());
            (s.hang.contains(&name), s.refuse.contains(&name))
        });
        if hang {
            return std::future::pending().await;
        }
        if refuse {
            return Ok(false);
        }
        self.with_state(|s| s.subscribed.insert(name));
        Ok(true)
    }

    async fn unsubscribe(&self, name: &str) -> Result<bool, HearthError> {
        self.with_state(|s| {
            s.unsubscribe_calls.push(name.to_string());
            if s.fail_unsubscribe.contains(name) {
                return Err(HearthError::collaborator(format!(
                    "bus rejected unsubscribe of {name}"
                )));
            }
            Ok(s.subscribed.remove(name))
        })
    }
}
