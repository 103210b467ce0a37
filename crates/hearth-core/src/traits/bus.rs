// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event bus subscription contract.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HearthError;
use crate::traits::component::EventHandlerComponent;
use crate::types::ComponentContext;

/// The subscribe/unsubscribe half of an event bus.
///
/// Handlers are keyed by component name (`ctx.component.name`), which is
/// unique within the event-handler kind.
#[async_trait]
pub trait EventBus: Send + Sync + 'static {
    /// Subscribes a handler. `Ok(false)` means the bus refused it.
    async fn subscribe(
        &self,
        handler: Arc<dyn EventHandlerComponent>,
        ctx: ComponentContext,
    ) -> Result<bool, HearthError>;

    /// Removes a handler. `Ok(false)` means it was not subscribed.
    async fn unsubscribe(&self, name: &str) -> Result<bool, HearthError>;
}
