// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Kind-specific registration strategies.
//!
//! The [`DispatchTable`] maps every [`ComponentKind`] to a [`KindStrategy`]
//! that performs the side effects of registering, unregistering, enabling,
//! and disabling a component of that kind. The table is built once when the
//! registry is constructed; changing a kind's behavior means installing a
//! different strategy, not editing the registry.
//!
//! Strategies run while the registry's write lock is held. Every call into a
//! collaborator goes through [`bounded`] so a stuck plugin cannot wedge the
//! registry.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hearth_core::{
    CommandArgs, CommandComponent, CommandReply, ComponentContext, ComponentInfo, ComponentKind,
    ComponentPayload, EventBus, HearthError, HttpMount, PlusCommandComponent,
};
use tracing::{debug, info, warn};

use crate::index::SecondaryIndex;
use crate::settings::RegistrySettings;

/// Everything a strategy needs to know about the component it acts on.
#[derive(Debug, Clone)]
pub struct DispatchTarget {
    pub info: ComponentInfo,
    pub payload: ComponentPayload,
    pub ctx: ComponentContext,
}

impl DispatchTarget {
    fn dispatch_error(
        &self,
        message: impl Into<String>,
        source: Option<HearthError>,
    ) -> HearthError {
        HearthError::Dispatch {
            id: self.info.id(),
            message: message.into(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    fn teardown_error(&self, err: &HearthError) -> HearthError {
        HearthError::Teardown {
            id: self.info.id(),
            message: err.to_string(),
        }
    }

    fn payload_mismatch(&self) -> HearthError {
        HearthError::Internal(format!(
            "payload for {} is a {} payload",
            self.info.id(),
            self.payload.kind()
        ))
    }
}

/// Register/unregister/enable/disable behavior for one component kind.
///
/// `register` must only record index entries for side effects that actually
/// happened, and on failure must undo exactly those side effects that took
/// hold before returning the error.
#[async_trait]
pub trait KindStrategy: Send + Sync + 'static {
    /// Kind under which components of `kind` end up stored.
    fn stored_kind(&self, kind: ComponentKind) -> ComponentKind {
        kind
    }

    /// Re-express a component as a different kind before dispatch.
    ///
    /// When this returns `Some`, the registry re-enters dispatch with the
    /// adapted component and never calls the other methods of this strategy.
    fn adapt(
        &self,
        _info: &ComponentInfo,
        _payload: &ComponentPayload,
    ) -> Option<(ComponentInfo, ComponentPayload)> {
        None
    }

    async fn register(
        &self,
        target: &DispatchTarget,
        index: &mut SecondaryIndex,
    ) -> Result<(), HearthError>;

    async fn unregister(
        &self,
        target: &DispatchTarget,
        index: &mut SecondaryIndex,
    ) -> Result<(), HearthError>;

    /// Returns `Ok(false)` when the kind cannot be toggled globally.
    async fn enable(
        &self,
        target: &DispatchTarget,
        index: &mut SecondaryIndex,
    ) -> Result<bool, HearthError>;

    /// Returns `Ok(false)` when the kind cannot be toggled globally.
    async fn disable(
        &self,
        target: &DispatchTarget,
        index: &mut SecondaryIndex,
    ) -> Result<bool, HearthError>;
}

/// Run a collaborator call with an upper bound.
pub async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, HearthError>
where
    F: Future<Output = Result<T, HearthError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(HearthError::Timeout { duration: limit }),
    }
}

/// Kinds whose only side effect is membership in the enabled pool.
///
/// Used for actions, tools, plus-commands, chatters, interest calculators,
/// and prompts.
#[derive(Debug, Default, Clone, Copy)]
pub struct PoolStrategy;

#[async_trait]
impl KindStrategy for PoolStrategy {
    async fn register(
        &self,
        target: &DispatchTarget,
        index: &mut SecondaryIndex,
    ) -> Result<(), HearthError> {
        if target.info.enabled {
            index.insert_enabled(target.info.kind, &target.info.name);
        }
        Ok(())
    }

    async fn unregister(
        &self,
        target: &DispatchTarget,
        index: &mut SecondaryIndex,
    ) -> Result<(), HearthError> {
        index.remove_enabled(target.info.kind, &target.info.name);
        Ok(())
    }

    async fn enable(
        &self,
        target: &DispatchTarget,
        index: &mut SecondaryIndex,
    ) -> Result<bool, HearthError> {
        index.insert_enabled(target.info.kind, &target.info.name);
        Ok(true)
    }

    async fn disable(
        &self,
        target: &DispatchTarget,
        index: &mut SecondaryIndex,
    ) -> Result<bool, HearthError> {
        index.remove_enabled(target.info.kind, &target.info.name);
        Ok(true)
    }
}

/// Subscribes enabled event handlers to the event bus.
pub struct EventHandlerStrategy {
    bus: Arc<dyn EventBus>,
    timeout: Duration,
}

impl EventHandlerStrategy {
    pub fn new(bus: Arc<dyn EventBus>, timeout: Duration) -> Self {
        Self { bus, timeout }
    }

    async fn subscribe(
        &self,
        target: &DispatchTarget,
        index: &mut SecondaryIndex,
    ) -> Result<(), HearthError> {
        let handler = target
            .payload
            .as_event_handler()
            .ok_or_else(|| target.payload_mismatch())?;
        let name = target.info.name.as_str();

        match bounded(self.timeout, self.bus.subscribe(handler, target.ctx.clone())).await {
            Ok(true) => {
                index.mark_subscribed(name);
                index.insert_enabled(ComponentKind::EventHandler, name);
                debug!(
                    handler = name,
                    plugin = %target.info.plugin_name,
                    "event handler subscribed"
                );
                Ok(())
            }
            Ok(false) => Err(target.dispatch_error("event bus refused the subscription", None)),
            Err(err @ HearthError::Timeout { .. }) => {
                // The bus may still complete the subscription after the deadline.
                if let Err(undo) = bounded(self.timeout, self.bus.unsubscribe(name)).await {
                    warn!(handler = name, error = %undo, "compensating unsubscribe failed");
                }
                Err(target.dispatch_error("subscribe timed out", Some(err)))
            }
            Err(err) => Err(target.dispatch_error("subscribe failed", Some(err))),
        }
    }

    async fn unsubscribe(
        &self,
        target: &DispatchTarget,
        index: &mut SecondaryIndex,
    ) -> Result<(), HearthError> {
        let name = target.info.name.as_str();
        match bounded(self.timeout, self.bus.unsubscribe(name)).await {
            Ok(was_subscribed) => {
                index.mark_unsubscribed(name);
                index.remove_enabled(ComponentKind::EventHandler, name);
                debug!(handler = name, was_subscribed, "event handler unsubscribed");
                Ok(())
            }
            Err(err) => Err(target.teardown_error(&err)),
        }
    }
}

#[async_trait]
impl KindStrategy for EventHandlerStrategy {
    async fn register(
        &self,
        target: &DispatchTarget,
        index: &mut SecondaryIndex,
    ) -> Result<(), HearthError> {
        if !target.info.enabled {
            debug!(handler = %target.info.name, "registered disabled; not subscribing");
            return Ok(());
        }
        self.subscribe(target, index).await
    }

    async fn unregister(
        &self,
        target: &DispatchTarget,
        index: &mut SecondaryIndex,
    ) -> Result<(), HearthError> {
        self.unsubscribe(target, index).await
    }

    async fn enable(
        &self,
        target: &DispatchTarget,
        index: &mut SecondaryIndex,
    ) -> Result<bool, HearthError> {
        if !index.is_subscribed(&target.info.name) {
            self.subscribe(target, index).await?;
        }
        Ok(true)
    }

    async fn disable(
        &self,
        target: &DispatchTarget,
        index: &mut SecondaryIndex,
    ) -> Result<bool, HearthError> {
        if index.is_subscribed(&target.info.name) {
            self.unsubscribe(target, index).await?;
        }
        Ok(true)
    }
}

/// Mounts router components under their plugin's prefix.
///
/// Mounting is one-way: unregistering only records the prefix as pending a
/// restart.
pub struct RouterStrategy {
    mount: Arc<dyn HttpMount>,
    settings: RegistrySettings,
}

impl RouterStrategy {
    pub fn new(mount: Arc<dyn HttpMount>, settings: RegistrySettings) -> Self {
        Self { mount, settings }
    }
}

#[async_trait]
impl KindStrategy for RouterStrategy {
    async fn register(
        &self,
        target: &DispatchTarget,
        index: &mut SecondaryIndex,
    ) -> Result<(), HearthError> {
        let info = &target.info;
        if !self.settings.enable_plugin_endpoints {
            debug!(router = %info.name, "plugin endpoints disabled; router not mounted");
            return Ok(());
        }
        let router = target
            .payload
            .as_router()
            .ok_or_else(|| target.payload_mismatch())?;
        let timeout = self.settings.collaborator_timeout;
        let routes = bounded(timeout, router.build_routes(&target.ctx))
            .await
            .map_err(|e| target.dispatch_error("building routes failed", Some(e)))?;

        let prefix = self.settings.plugin_mount_prefix(&info.plugin_name);
        let tags = vec![info.plugin_name.clone()];
        match bounded(timeout, self.mount.mount(routes, &prefix, &tags)).await {
            Ok(()) => {
                index.record_mount(&info.name, &prefix);
                if info.enabled {
                    index.insert_enabled(ComponentKind::Router, &info.name);
                }
                info!(router = %info.name, prefix = %prefix, "plugin routes mounted");
                Ok(())
            }
            Err(err @ HearthError::Timeout { .. }) => {
                // A late mount cannot be taken back.
                index.mark_pending_restart(&info.name, &prefix);
                Err(target.dispatch_error("mount timed out", Some(err)))
            }
            Err(err) => Err(target.dispatch_error("mount failed", Some(err))),
        }
    }

    async fn unregister(
        &self,
        target: &DispatchTarget,
        index: &mut SecondaryIndex,
    ) -> Result<(), HearthError> {
        let name = target.info.name.as_str();
        index.remove_enabled(ComponentKind::Router, name);
        if let Some(prefix) = index.mounted_prefix(name).map(str::to_string) {
            warn!(
                router = name,
                prefix = %prefix,
                "routes cannot be unmounted at runtime; they stay served until restart"
            );
            index.mark_pending_restart(name, &prefix);
        }
        Ok(())
    }

    async fn enable(
        &self,
        _target: &DispatchTarget,
        _index: &mut SecondaryIndex,
    ) -> Result<bool, HearthError> {
        Ok(false)
    }

    async fn disable(
        &self,
        _target: &DispatchTarget,
        _index: &mut SecondaryIndex,
    ) -> Result<bool, HearthError> {
        Ok(false)
    }
}

/// Presents a legacy pattern command as a plus-command.
pub struct LegacyCommandAdapter {
    name: String,
    inner: Arc<dyn CommandComponent>,
}

impl LegacyCommandAdapter {
    pub fn new(name: impl Into<String>, inner: Arc<dyn CommandComponent>) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }

    pub fn pattern(&self) -> &str {
        self.inner.pattern()
    }
}

#[async_trait]
impl PlusCommandComponent for LegacyCommandAdapter {
    fn command_name(&self) -> &str {
        &self.name
    }

    async fn execute(
        &self,
        ctx: &ComponentContext,
        args: CommandArgs,
    ) -> Result<CommandReply, HearthError> {
        self.inner.execute(ctx, &args.raw).await
    }
}

/// Rewrites legacy commands into plus-commands. Never dispatches directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct LegacyCommandStrategy;

impl LegacyCommandStrategy {
    fn not_adapted(target: &DispatchTarget) -> HearthError {
        HearthError::Internal(format!(
            "legacy command {} reached dispatch without being adapted",
            target.info.id()
        ))
    }
}

#[async_trait]
impl KindStrategy for LegacyCommandStrategy {
    fn stored_kind(&self, _kind: ComponentKind) -> ComponentKind {
        ComponentKind::PlusCommand
    }

    fn adapt(
        &self,
        info: &ComponentInfo,
        payload: &ComponentPayload,
    ) -> Option<(ComponentInfo, ComponentPayload)> {
        let ComponentPayload::Command(command) = payload else {
            return None;
        };
        warn!(
            command = %info.name,
            plugin = %info.plugin_name,
            "legacy command kind is deprecated; registering as plus_command"
        );
        let adapted = ComponentInfo {
            kind: ComponentKind::PlusCommand,
            ..info.clone()
        };
        let adapter = LegacyCommandAdapter::new(info.name.clone(), Arc::clone(command));
        Some((adapted, ComponentPayload::PlusCommand(Arc::new(adapter))))
    }

    async fn register(
        &self,
        target: &DispatchTarget,
        _index: &mut SecondaryIndex,
    ) -> Result<(), HearthError> {
        Err(Self::not_adapted(target))
    }

    async fn unregister(
        &self,
        target: &DispatchTarget,
        _index: &mut SecondaryIndex,
    ) -> Result<(), HearthError> {
        Err(Self::not_adapted(target))
    }

    async fn enable(
        &self,
        target: &DispatchTarget,
        _index: &mut SecondaryIndex,
    ) -> Result<bool, HearthError> {
        Err(Self::not_adapted(target))
    }

    async fn disable(
        &self,
        target: &DispatchTarget,
        _index: &mut SecondaryIndex,
    ) -> Result<bool, HearthError> {
        Err(Self::not_adapted(target))
    }
}

/// Kind -> strategy table.
#[derive(Clone, Default)]
pub struct DispatchTable {
    strategies: HashMap<ComponentKind, Arc<dyn KindStrategy>>,
}

impl DispatchTable {
    /// A table with no strategies. Registration of any kind fails until one is set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The stock strategies for every kind.
    pub fn standard(
        bus: Arc<dyn EventBus>,
        mount: Arc<dyn HttpMount>,
        settings: &RegistrySettings,
    ) -> Self {
        let pool: Arc<dyn KindStrategy> = Arc::new(PoolStrategy);
        let mut table = Self::empty();
        for kind in [
            ComponentKind::Action,
            ComponentKind::PlusCommand,
            ComponentKind::Tool,
            ComponentKind::Chatter,
            ComponentKind::InterestCalculator,
            ComponentKind::Prompt,
        ] {
            table.set(kind, Arc::clone(&pool));
        }
        table.set(ComponentKind::Command, Arc::new(LegacyCommandStrategy));
        table.set(
            ComponentKind::EventHandler,
            Arc::new(EventHandlerStrategy::new(bus, settings.collaborator_timeout)),
        );
        table.set(
            ComponentKind::Router,
            Arc::new(RouterStrategy::new(mount, settings.clone())),
        );
        table
    }

    /// Install (or replace) the strategy for `kind`.
    pub fn set(&mut self, kind: ComponentKind, strategy: Arc<dyn KindStrategy>) {
        self.strategies.insert(kind, strategy);
    }

    pub fn get(&self, kind: ComponentKind) -> Result<Arc<dyn KindStrategy>, HearthError> {
        self.strategies
            .get(&kind)
            .cloned()
            .ok_or_else(|| {
                HearthError::Validation(format!("no strategy registered for kind {kind}"))
            })
    }

    /// Kind a component of `kind` is stored under once registered.
    pub fn canonical_kind(&self, kind: ComponentKind) -> ComponentKind {
        self.strategies
            .get(&kind)
            .map_or(kind, |strategy| strategy.stored_kind(kind))
    }
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.strategies.keys().collect();
        kinds.sort();
        f.debug_struct("DispatchTable").field("kinds", &kinds).finish()
    }
}
