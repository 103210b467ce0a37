// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process event bus.
//!
//! [`InProcessBus`] implements [`EventBus`] over a concurrent map of
//! subscribers keyed by handler name. [`InProcessBus::publish`] delivers an
//! event to every subscriber whose event types match, concurrently. A failing
//! handler is logged and does not affect delivery to the others.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use hearth_core::{ComponentContext, EventBus, EventHandlerComponent, HearthError, HostEvent};
use tracing::{debug, warn};

struct Subscriber {
    handler: Arc<dyn EventHandlerComponent>,
    ctx: ComponentContext,
    event_types: Vec<String>,
}

impl Subscriber {
    fn wants(&self, event_type: &str) -> bool {
        self.event_types.is_empty() || self.event_types.iter().any(|t| t == event_type)
    }
}

/// Outcome of one [`InProcessBus::publish`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: usize,
    /// Handler names whose `handle` returned an error.
    pub failed: Vec<String>,
}

#[derive(Default)]
pub struct InProcessBus {
    subscribers: DashMap<String, Subscriber>,
    max_subscribers: Option<usize>,
    /// Slots taken against `max_subscribers`. Kept apart from the map so the
    /// limit can be checked while a shard is locked.
    occupied: AtomicUsize,
}

impl InProcessBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse subscriptions beyond `max` handlers.
    pub fn with_max_subscribers(max: usize) -> Self {
        Self {
            max_subscribers: Some(max),
            ..Self::default()
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn reserve_slot(&self) -> bool {
        let Some(max) = self.max_subscribers else {
            self.occupied.fetch_add(1, Ordering::SeqCst);
            return true;
        };
        self.occupied
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| (n < max).then_some(n + 1))
            .is_ok()
    }

    pub fn is_subscribed(&self, name: &str) -> bool {
        self.subscribers.contains_key(name)
    }

    /// Deliver `event` to every matching subscriber.
    pub async fn publish(&self, event: &HostEvent) -> Delivery {
        // Snapshot first; no map guard may be held across handler awaits.
        let targets: Vec<(String, Arc<dyn EventHandlerComponent>, ComponentContext)> = self
            .subscribers
            .iter()
            .filter(|entry| entry.value().wants(&event.event_type))
            .map(|entry| {
                let sub = entry.value();
                (entry.key().clone(), Arc::clone(&sub.handler), sub.ctx.clone())
            })
            .collect();

        let deliveries = targets
            .iter()
            .map(|(name, handler, ctx)| async move { (name, handler.handle(ctx, event).await) });
        let results = futures::future::join_all(deliveries).await;

        let mut delivery = Delivery::default();
        for (name, result) in results {
            match result {
                Ok(()) => delivery.delivered += 1,
                Err(e) => {
                    warn!(
                        handler = %name,
                        event_type = %event.event_type,
                        error = %e,
                        "event handler failed"
                    );
                    delivery.failed.push(name.clone());
                }
            }
        }
        debug!(
            event_type = %event.event_type,
            delivered = delivery.delivered,
            failed = delivery.failed.len(),
            "event published"
        );
        delivery
    }
}

#[async_trait]
impl EventBus for InProcessBus {
    async fn subscribe(
        &self,
        handler: Arc<dyn EventHandlerComponent>,
        ctx: ComponentContext,
    ) -> Result<bool, HearthError> {
        let name = ctx.component.name.clone();
        let event_types = handler.event_types();
        match self.subscribers.entry(name) {
            Entry::Occupied(occupied) => {
                warn!(handler = %occupied.key(), "handler name already subscribed");
                Ok(false)
            }
            Entry::Vacant(vacant) => {
                if !self.reserve_slot() {
                    warn!(handler = %vacant.key(), "subscriber limit reached");
                    return Ok(false);
                }
                debug!(
                    handler = %vacant.key(),
                    plugin = %ctx.plugin_name,
                    ?event_types,
                    "subscribed"
                );
                vacant.insert(Subscriber {
                    handler,
                    ctx,
                    event_types,
                });
                Ok(true)
            }
        }
    }

    async fn unsubscribe(&self, name: &str) -> Result<bool, HearthError> {
        let removed = self.subscribers.remove(name).is_some();
        if removed {
            self.occupied.fetch_sub(1, Ordering::SeqCst);
        }
        debug!(handler = name, removed, "unsubscribed");
        Ok(removed)
    }
}
