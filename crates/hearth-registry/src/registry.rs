// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The component registry.
//!
//! [`ComponentRegistry`] is the single source of truth for registered
//! components and plugins. One coarse [`tokio::sync::RwLock`] protects the
//! primary map, the per-kind index, the secondary indices, and the plugin
//! ledger. Mutations hold the write lock across their dispatch step, so a
//! reader never observes a half-applied registration or removal.
//!
//! Strategies and collaborators must not call back into the registry while
//! they run; the write lock is held.
//!
//! The `bool`-returning methods log expected failures and return `false`.
//! Only [`HearthError::Internal`] propagates as `Err` from them. The `try_*`
//! variants expose the typed error.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use hearth_core::{
    ActionComponent, ChatterComponent, ComponentContext, ComponentInfo, ComponentKind,
    ComponentOrigin, ComponentPayload, EventBus, EventHandlerComponent, HearthError, HttpMount,
    InterestCalculatorComponent, NamespacedId, PluginConfigProvider, PlusCommandComponent,
    PromptComponent, SessionId, ToolComponent, ToolDiscovery,
};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::config_provider::FilePluginConfigProvider;
use crate::dispatch::{DispatchTable, DispatchTarget, KindStrategy};
use crate::external::{
    EXTERNAL_TOOLS_PLUGIN, ExternalToolLoader, discovered_tool_name,
};
use crate::index::SecondaryIndex;
use crate::ledger::{
    PluginDescriptor, PluginLedger, PluginRecord, TeardownReport, validate_component_name,
    validate_plugin_name,
};
use crate::overrides::{SessionOverrideStore, resolve_availability};
use crate::settings::RegistrySettings;

/// How a caller names a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentLookup {
    Id(NamespacedId),
    Named { name: String, kind: ComponentKind },
    /// Name alone. Kinds are scanned in enumeration order; the first match wins.
    Bare(String),
}

impl From<NamespacedId> for ComponentLookup {
    fn from(id: NamespacedId) -> Self {
        Self::Id(id)
    }
}

impl From<&NamespacedId> for ComponentLookup {
    fn from(id: &NamespacedId) -> Self {
        Self::Id(id.clone())
    }
}

impl From<(&str, ComponentKind)> for ComponentLookup {
    fn from((name, kind): (&str, ComponentKind)) -> Self {
        Self::Named {
            name: name.to_string(),
            kind,
        }
    }
}

impl From<&str> for ComponentLookup {
    /// `kind.name` resolves as an id, anything else as a bare name.
    fn from(raw: &str) -> Self {
        match raw.parse::<NamespacedId>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Bare(raw.to_string()),
        }
    }
}

/// Registry-wide counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryStats {
    pub total_plugins: usize,
    pub total_components: usize,
    pub enabled_components: usize,
    pub counts_by_kind: BTreeMap<ComponentKind, usize>,
    pub discovered_tool_count: usize,
    /// Plugins whose last uninstall left components behind.
    pub pending_teardown_plugins: usize,
    /// Route prefixes still served although their router was removed.
    pub pending_restart_prefixes: Vec<String>,
    pub active_sessions: usize,
}

/// A usable component: its metadata, its context, and its behavior object.
#[derive(Clone)]
pub struct ActiveComponent<T> {
    pub info: ComponentInfo,
    pub ctx: ComponentContext,
    pub component: T,
}

#[derive(Debug, Clone)]
struct ComponentEntry {
    info: ComponentInfo,
    payload: ComponentPayload,
    /// Set when the last unregister strategy failed; the entry awaits a retry.
    teardown_failed: bool,
}

#[derive(Debug, Default)]
struct RegistryState {
    components: HashMap<NamespacedId, ComponentEntry>,
    by_kind: BTreeMap<ComponentKind, BTreeSet<String>>,
    index: SecondaryIndex,
    ledger: PluginLedger,
}

impl RegistryState {
    fn insert(&mut self, info: ComponentInfo, payload: ComponentPayload) {
        self.by_kind
            .entry(info.kind)
            .or_default()
            .insert(info.name.clone());
        self.components.insert(
            info.id(),
            ComponentEntry {
                info,
                payload,
                teardown_failed: false,
            },
        );
    }

    fn remove(&mut self, id: &NamespacedId) {
        self.components.remove(id);
        if let Some(names) = self.by_kind.get_mut(&id.kind) {
            names.remove(&id.name);
        }
    }

    fn of_kind(&self, kind: ComponentKind) -> impl Iterator<Item = &ComponentEntry> {
        self.by_kind
            .get(&kind)
            .into_iter()
            .flatten()
            .filter_map(move |name| self.components.get(&NamespacedId::new(kind, name.clone())))
    }
}

/// Builder for [`ComponentRegistry`].
pub struct RegistryBuilder {
    settings: RegistrySettings,
    bus: Arc<dyn EventBus>,
    mount: Arc<dyn HttpMount>,
    config: Option<Arc<dyn PluginConfigProvider>>,
    discovery: Option<Arc<dyn ToolDiscovery>>,
    overrides: Vec<(ComponentKind, Arc<dyn KindStrategy>)>,
}

impl RegistryBuilder {
    /// Plugin configuration source. Defaults to a [`FilePluginConfigProvider`]
    /// rooted at the configured plugin config directory.
    pub fn config_provider(mut self, provider: Arc<dyn PluginConfigProvider>) -> Self {
        self.config = Some(provider);
        self
    }

    pub fn discovery(mut self, discovery: Arc<dyn ToolDiscovery>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    /// Replace the stock strategy for one kind.
    pub fn strategy(mut self, kind: ComponentKind, strategy: Arc<dyn KindStrategy>) -> Self {
        self.overrides.push((kind, strategy));
        self
    }

    pub fn build(self) -> ComponentRegistry {
        let mut dispatch = DispatchTable::standard(self.bus, self.mount, &self.settings);
        for (kind, strategy) in self.overrides {
            dispatch.set(kind, strategy);
        }
        let config = self.config.unwrap_or_else(|| {
            Arc::new(FilePluginConfigProvider::new(
                self.settings.plugin_config_dir.clone(),
            ))
        });
        let loader = ExternalToolLoader::new(self.discovery, self.settings.discovery_timeout);
        ComponentRegistry {
            state: Arc::new(RwLock::new(RegistryState::default())),
            overrides: SessionOverrideStore::new(),
            dispatch,
            config,
            loader,
            external_registered: AtomicBool::new(false),
            settings: self.settings,
        }
    }
}

/// Central authority over components and plugins.
///
/// Construct one per process and share it by `Arc`.
pub struct ComponentRegistry {
    state: Arc<RwLock<RegistryState>>,
    overrides: SessionOverrideStore,
    dispatch: DispatchTable,
    config: Arc<dyn PluginConfigProvider>,
    loader: ExternalToolLoader,
    /// Discovered tools were merged since the last reset.
    external_registered: AtomicBool,
    settings: RegistrySettings,
}

/// Compensates a registration whose dispatch was cancelled.
///
/// Armed across the register strategy call. Dropping it armed means the
/// caller's future went away while the side effect was in flight, so the
/// strategy's unregister runs on a spawned task once the registry lock is
/// free again.
struct PendingDispatch {
    state: Arc<RwLock<RegistryState>>,
    strategy: Arc<dyn KindStrategy>,
    target: Option<DispatchTarget>,
}

impl PendingDispatch {
    fn disarm(mut self) {
        self.target = None;
    }
}

impl Drop for PendingDispatch {
    fn drop(&mut self) {
        let Some(target) = self.target.take() else {
            return;
        };
        let id = target.info.id();
        warn!(component = %id, "registration cancelled during dispatch; compensating");
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            error!(component = %id, "no runtime to compensate cancelled registration");
            return;
        };
        let state = Arc::clone(&self.state);
        let strategy = Arc::clone(&self.strategy);
        handle.spawn(async move {
            let mut state = state.write().await;
            if state.components.contains_key(&id) {
                debug!(component = %id, "registered again meanwhile; compensation skipped");
                return;
            }
            match strategy.unregister(&target, &mut state.index).await {
                Ok(()) => debug!(component = %id, "cancelled registration compensated"),
                Err(e) => {
                    error!(
                        component = %id,
                        error = %e,
                        "compensating cancelled registration failed"
                    );
                }
            }
        });
    }
}

/// Converts a typed outcome into the soft-fail `bool` surface.
fn settle(operation: &'static str, result: Result<(), HearthError>) -> Result<bool, HearthError> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.is_expected() => {
            warn!(operation, error = %e, "registry operation refused");
            Ok(false)
        }
        Err(e) => {
            error!(operation, error = %e, "registry invariant broken");
            Err(e)
        }
    }
}

impl ComponentRegistry {
    pub fn builder(
        settings: RegistrySettings,
        bus: Arc<dyn EventBus>,
        mount: Arc<dyn HttpMount>,
    ) -> RegistryBuilder {
        RegistryBuilder {
            settings,
            bus,
            mount,
            config: None,
            discovery: None,
            overrides: Vec::new(),
        }
    }

    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    fn canonical(&self, kind: ComponentKind, name: &str) -> NamespacedId {
        NamespacedId::new(self.dispatch.canonical_kind(kind), name)
    }

    fn context_for(&self, state: &RegistryState, info: &ComponentInfo) -> ComponentContext {
        let config = state
            .ledger
            .get(&info.plugin_name)
            .map_or(serde_json::Value::Null, |record| record.config.clone());
        ComponentContext::new(info.plugin_name.clone(), info.id(), config)
    }

    /// Asks the config provider for a plugin's configuration. The provider may
    /// read files, so the call runs on the blocking pool and never under the
    /// registry lock.
    async fn lookup_plugin_config(&self, plugin: &str) -> Option<serde_json::Value> {
        let provider = Arc::clone(&self.config);
        let plugin = plugin.to_string();
        match tokio::task::spawn_blocking(move || provider.get_plugin_config(&plugin)).await {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "plugin config lookup task failed");
                None
            }
        }
    }

    // ---- plugins -------------------------------------------------------

    /// Admit a plugin descriptor. `false` for invalid or duplicate plugins.
    pub async fn register_plugin(&self, descriptor: PluginDescriptor) -> bool {
        let name = descriptor.name.clone();
        match self.try_register_plugin(descriptor).await {
            Ok(()) => true,
            Err(e) => {
                warn!(plugin = %name, error = %e, "plugin registration refused");
                false
            }
        }
    }

    pub async fn try_register_plugin(
        &self,
        mut descriptor: PluginDescriptor,
    ) -> Result<(), HearthError> {
        descriptor.validate()?;
        if descriptor.name == EXTERNAL_TOOLS_PLUGIN {
            return Err(HearthError::Validation(format!(
                "plugin name `{EXTERNAL_TOOLS_PLUGIN}` is reserved"
            )));
        }
        for id in &mut descriptor.components {
            id.kind = self.dispatch.canonical_kind(id.kind);
        }
        let unique: BTreeSet<_> = descriptor.components.iter().collect();
        if unique.len() != descriptor.components.len() {
            return Err(HearthError::Validation(format!(
                "plugin `{}` declares the same component under two kinds",
                descriptor.name
            )));
        }

        let config = if descriptor.config.is_null() {
            self.lookup_plugin_config(&descriptor.name)
                .await
                .unwrap_or(serde_json::Value::Null)
        } else {
            descriptor.config.clone()
        };

        let mut state = self.state.write().await;
        let (name, version, count) = (
            descriptor.name.clone(),
            descriptor.version.clone(),
            descriptor.components.len(),
        );
        state.ledger.insert_with_config(descriptor, config)?;
        info!(plugin = %name, version = %version, components = count, "plugin registered");
        Ok(())
    }

    /// Tear down every component of a plugin.
    ///
    /// The descriptor leaves the ledger only when every teardown succeeded.
    /// Otherwise it stays, annotated with the failures, and the next call
    /// retries just those.
    pub async fn unregister_plugin(&self, name: &str) -> TeardownReport {
        let mut state = self.state.write().await;
        let Some(targets) = state.ledger.teardown_targets(name) else {
            warn!(plugin = name, "unregister requested for unknown plugin");
            return TeardownReport::not_found(name);
        };

        let mut report = TeardownReport {
            plugin: name.to_string(),
            found: true,
            ..TeardownReport::default()
        };
        for id in targets {
            match self.remove_locked(&mut state, &id, name).await {
                Ok(()) => report.removed.push(id),
                Err(HearthError::NotFound(_)) => {
                    debug!(plugin = name, component = %id, "component already gone");
                    report.removed.push(id);
                }
                Err(e) => {
                    report.failed.insert(id, e.to_string());
                }
            }
        }

        if report.failed.is_empty() {
            state.ledger.remove(name);
            report.plugin_removed = true;
            info!(plugin = name, removed = report.removed.len(), "plugin unregistered");
        } else {
            state.ledger.set_failed(name, report.failed.clone());
            warn!(
                plugin = name,
                removed = report.removed.len(),
                failed = report.failed.len(),
                "plugin partially torn down; descriptor retained for retry"
            );
        }
        report
    }

    pub async fn get_plugin_info(&self, name: &str) -> Option<PluginRecord> {
        self.state.read().await.ledger.get(name).cloned()
    }

    pub async fn get_all_plugins(&self) -> Vec<PluginRecord> {
        self.state.read().await.ledger.records().cloned().collect()
    }

    /// Registered components owned by a plugin.
    pub async fn get_plugin_components(&self, name: &str) -> Vec<ComponentInfo> {
        let state = self.state.read().await;
        let Some(record) = state.ledger.get(name) else {
            return Vec::new();
        };
        record
            .descriptor
            .components
            .iter()
            .filter_map(|id| state.components.get(id).map(|e| e.info.clone()))
            .collect()
    }

    /// Failed teardowns awaiting retry. `None` when the plugin is unknown.
    pub async fn pending_teardown(&self, name: &str) -> Option<BTreeMap<NamespacedId, String>> {
        self.state
            .read()
            .await
            .ledger
            .get(name)
            .map(|record| record.failed_teardown.clone())
    }

    /// Resolved configuration of a plugin: its descriptor config when set,
    /// otherwise what the plugin configuration provider returned when the
    /// plugin was registered. Unregistered plugins go straight to the provider.
    pub async fn get_plugin_config(&self, name: &str) -> Option<serde_json::Value> {
        let cached = {
            let state = self.state.read().await;
            state.ledger.get(name).map(|record| record.config.clone())
        };
        match cached {
            Some(config) if config.is_null() => None,
            Some(config) => Some(config),
            None => self.lookup_plugin_config(name).await,
        }
    }

    // ---- components ----------------------------------------------------

    /// Register one component. Soft-fails with `Ok(false)` on validation
    /// errors, conflicts, and dispatch failures.
    pub async fn register_component(
        &self,
        info: ComponentInfo,
        payload: ComponentPayload,
    ) -> Result<bool, HearthError> {
        settle(
            "register_component",
            self.try_register_component(info, payload).await.map(|_| ()),
        )
    }

    /// Register one component and return the id it was stored under.
    pub async fn try_register_component(
        &self,
        info: ComponentInfo,
        payload: ComponentPayload,
    ) -> Result<NamespacedId, HearthError> {
        validate_component_name(&info.name)?;
        validate_plugin_name(&info.plugin_name)?;
        if payload.kind() != info.kind {
            return Err(HearthError::Validation(format!(
                "{} was declared as {} but its payload is a {}",
                info.name,
                info.kind,
                payload.kind()
            )));
        }
        let mut state = self.state.write().await;
        self.register_locked(&mut state, info, payload).await
    }

    async fn register_locked(
        &self,
        state: &mut RegistryState,
        info: ComponentInfo,
        payload: ComponentPayload,
    ) -> Result<NamespacedId, HearthError> {
        let strategy = self.dispatch.get(info.kind)?;
        let (info, payload, strategy) = match strategy.adapt(&info, &payload) {
            Some((adapted, adapted_payload)) => {
                let next = self.dispatch.get(adapted.kind)?;
                if next.adapt(&adapted, &adapted_payload).is_some() {
                    return Err(HearthError::Internal(format!(
                        "{} adapts into {}, which adapts again",
                        info.kind, adapted.kind
                    )));
                }
                (adapted, adapted_payload, next)
            }
            None => (info, payload, strategy),
        };

        let id = info.id();
        let record = state.ledger.get(&info.plugin_name).ok_or_else(|| {
            HearthError::NotFound(format!("plugin `{}`", info.plugin_name))
        })?;
        if !record.owns(&id) {
            return Err(HearthError::Validation(format!(
                "plugin `{}` does not declare {id}",
                info.plugin_name
            )));
        }
        if let Some(existing) = state.components.get(&id) {
            return Err(HearthError::Conflict {
                id,
                owner: existing.info.plugin_name.clone(),
            });
        }

        let target = DispatchTarget {
            ctx: self.context_for(state, &info),
            info,
            payload,
        };

        // The entry is inserted only once its side effect took hold. If this
        // future is dropped mid-dispatch the guard compensates whatever the
        // strategy may still complete.
        let guard = PendingDispatch {
            state: Arc::clone(&self.state),
            strategy: Arc::clone(&strategy),
            target: Some(target.clone()),
        };
        let outcome = strategy.register(&target, &mut state.index).await;
        guard.disarm();

        match outcome {
            Ok(()) => {
                info!(
                    component = %id,
                    plugin = %target.info.plugin_name,
                    enabled = target.info.enabled,
                    "component registered"
                );
                state.insert(target.info, target.payload);
                Ok(id)
            }
            Err(e) => {
                warn!(component = %id, error = %e, "dispatch failed; registration rolled back");
                Err(e)
            }
        }
    }

    /// Remove a component. `owner` is recorded for audit only.
    pub async fn remove_component(
        &self,
        name: &str,
        kind: ComponentKind,
        owner: &str,
    ) -> Result<bool, HearthError> {
        settle(
            "remove_component",
            self.try_remove_component(name, kind, owner).await,
        )
    }

    pub async fn try_remove_component(
        &self,
        name: &str,
        kind: ComponentKind,
        owner: &str,
    ) -> Result<(), HearthError> {
        let id = self.canonical(kind, name);
        let mut state = self.state.write().await;
        self.remove_locked(&mut state, &id, owner).await
    }

    async fn remove_locked(
        &self,
        state: &mut RegistryState,
        id: &NamespacedId,
        owner: &str,
    ) -> Result<(), HearthError> {
        let entry = state
            .components
            .get(id)
            .ok_or_else(|| HearthError::NotFound(id.to_string()))?;
        if entry.info.plugin_name != owner {
            warn!(
                component = %id,
                requested_by = owner,
                owner = %entry.info.plugin_name,
                "component removed by a plugin that does not own it"
            );
        }
        let target = DispatchTarget {
            ctx: self.context_for(state, &entry.info),
            info: entry.info.clone(),
            payload: entry.payload.clone(),
        };
        let strategy = self.dispatch.get(id.kind)?;

        let outcome = strategy.unregister(&target, &mut state.index).await;
        let purged = self.overrides.purge(id);
        match outcome {
            Ok(()) => {
                state.remove(id);
                state.index.forget(id.kind, &id.name);
                info!(component = %id, purged_overrides = purged, "component removed");
                Ok(())
            }
            Err(e) => {
                if let Some(entry) = state.components.get_mut(id) {
                    entry.info.enabled = false;
                    entry.teardown_failed = true;
                }
                state.index.remove_enabled(id.kind, &id.name);
                error!(
                    component = %id,
                    error = %e,
                    "teardown failed; component kept disabled for retry"
                );
                Err(e)
            }
        }
    }

    /// Globally enable a component. Refused for kinds that cannot be toggled.
    pub async fn enable_component(
        &self,
        name: &str,
        kind: ComponentKind,
    ) -> Result<bool, HearthError> {
        settle(
            "enable_component",
            self.try_set_enabled(name, kind, true).await,
        )
    }

    /// Globally disable a component. Refused for kinds that cannot be toggled.
    pub async fn disable_component(
        &self,
        name: &str,
        kind: ComponentKind,
    ) -> Result<bool, HearthError> {
        settle(
            "disable_component",
            self.try_set_enabled(name, kind, false).await,
        )
    }

    pub async fn try_set_enabled(
        &self,
        name: &str,
        kind: ComponentKind,
        enabled: bool,
    ) -> Result<(), HearthError> {
        let id = self.canonical(kind, name);
        let mut state = self.state.write().await;
        let entry = state
            .components
            .get(&id)
            .ok_or_else(|| HearthError::NotFound(id.to_string()))?;
        if entry.teardown_failed {
            return Err(HearthError::Validation(format!(
                "{id} is awaiting teardown and cannot be toggled"
            )));
        }
        let target = DispatchTarget {
            ctx: self.context_for(&state, &entry.info),
            info: entry.info.clone(),
            payload: entry.payload.clone(),
        };
        let strategy = self.dispatch.get(id.kind)?;

        let accepted = if enabled {
            strategy.enable(&target, &mut state.index).await?
        } else {
            strategy.disable(&target, &mut state.index).await?
        };
        if !accepted {
            return Err(HearthError::Validation(format!(
                "{} components cannot be toggled at runtime",
                id.kind
            )));
        }
        if let Some(entry) = state.components.get_mut(&id) {
            entry.info.enabled = enabled;
        }
        info!(component = %id, enabled, "component state changed");
        Ok(())
    }

    // ---- lookups -------------------------------------------------------

    fn find<'a>(
        &self,
        state: &'a RegistryState,
        lookup: &ComponentLookup,
    ) -> Option<&'a ComponentEntry> {
        match lookup {
            ComponentLookup::Id(id) => state.components.get(&self.canonical(id.kind, &id.name)),
            ComponentLookup::Named { name, kind } => {
                state.components.get(&self.canonical(*kind, name))
            }
            ComponentLookup::Bare(name) => {
                let mut matches = ComponentKind::all().filter_map(|kind| {
                    state.components.get(&NamespacedId::new(kind, name.clone()))
                });
                let first = matches.next()?;
                let others: Vec<String> = matches.map(|e| e.info.kind.to_string()).collect();
                if !others.is_empty() {
                    warn!(
                        name = %name,
                        chosen = %first.info.kind,
                        also = ?others,
                        "ambiguous component name; returning first match"
                    );
                }
                Some(first)
            }
        }
    }

    pub async fn get_component_info(
        &self,
        lookup: impl Into<ComponentLookup>,
    ) -> Option<ComponentInfo> {
        let lookup = lookup.into();
        let state = self.state.read().await;
        self.find(&state, &lookup).map(|e| e.info.clone())
    }

    pub async fn get_component_payload(
        &self,
        lookup: impl Into<ComponentLookup>,
    ) -> Option<ComponentPayload> {
        let lookup = lookup.into();
        let state = self.state.read().await;
        self.find(&state, &lookup).map(|e| e.payload.clone())
    }

    /// The context a component's calls should receive.
    pub async fn get_component_context(
        &self,
        lookup: impl Into<ComponentLookup>,
    ) -> Option<ComponentContext> {
        let lookup = lookup.into();
        let state = self.state.read().await;
        self.find(&state, &lookup)
            .map(|e| self.context_for(&state, &e.info))
    }

    /// Every registered component of a kind, regardless of state.
    pub async fn get_components_by_type(
        &self,
        kind: ComponentKind,
    ) -> BTreeMap<String, ComponentInfo> {
        let kind = self.dispatch.canonical_kind(kind);
        let state = self.state.read().await;
        state
            .of_kind(kind)
            .map(|e| (e.info.name.clone(), e.info.clone()))
            .collect()
    }

    /// Components of a kind that are available to `session` (or globally).
    pub async fn get_enabled_components_by_type(
        &self,
        kind: ComponentKind,
        session: Option<&SessionId>,
    ) -> BTreeMap<String, ComponentInfo> {
        let kind = self.dispatch.canonical_kind(kind);
        let state = self.state.read().await;
        state
            .of_kind(kind)
            .filter(|e| self.resolve(e, session))
            .map(|e| (e.info.name.clone(), e.info.clone()))
            .collect()
    }

    /// Names in a kind's enabled pool.
    pub async fn enabled_pool(&self, kind: ComponentKind) -> Vec<String> {
        let kind = self.dispatch.canonical_kind(kind);
        self.state.read().await.index.enabled_pool(kind)
    }

    /// Event handlers currently subscribed to the bus.
    pub async fn active_subscriptions(&self) -> Vec<String> {
        self.state.read().await.index.subscriptions()
    }

    fn resolve(&self, entry: &ComponentEntry, session: Option<&SessionId>) -> bool {
        let id = entry.info.id();
        let session_override = session.and_then(|s| self.overrides.get(s, &id));
        resolve_availability(id.kind, Some(entry.info.enabled), session_override)
    }

    async fn active<T>(
        &self,
        kind: ComponentKind,
        session: Option<&SessionId>,
        extract: impl Fn(&ComponentPayload) -> Option<T>,
    ) -> Vec<ActiveComponent<T>> {
        let state = self.state.read().await;
        state
            .of_kind(kind)
            .filter(|e| self.resolve(e, session))
            .filter_map(|e| {
                extract(&e.payload).map(|component| ActiveComponent {
                    info: e.info.clone(),
                    ctx: self.context_for(&state, &e.info),
                    component,
                })
            })
            .collect()
    }

    /// Available tools, including externally discovered ones (discovered on
    /// first use).
    pub async fn available_tools(
        &self,
        session: Option<&SessionId>,
    ) -> Vec<ActiveComponent<Arc<dyn ToolComponent>>> {
        self.load_external_tools().await;
        self.active(ComponentKind::Tool, session, ComponentPayload::as_tool)
            .await
    }

    pub async fn available_actions(
        &self,
        session: Option<&SessionId>,
    ) -> Vec<ActiveComponent<Arc<dyn ActionComponent>>> {
        self.active(ComponentKind::Action, session, ComponentPayload::as_action)
            .await
    }

    pub async fn available_chatters(
        &self,
        session: Option<&SessionId>,
    ) -> Vec<ActiveComponent<Arc<dyn ChatterComponent>>> {
        self.active(ComponentKind::Chatter, session, ComponentPayload::as_chatter)
            .await
    }

    pub async fn available_plus_commands(
        &self,
        session: Option<&SessionId>,
    ) -> Vec<ActiveComponent<Arc<dyn PlusCommandComponent>>> {
        self.active(
            ComponentKind::PlusCommand,
            session,
            ComponentPayload::as_plus_command,
        )
        .await
    }

    pub async fn available_interest_calculators(
        &self,
        session: Option<&SessionId>,
    ) -> Vec<ActiveComponent<Arc<dyn InterestCalculatorComponent>>> {
        self.active(
            ComponentKind::InterestCalculator,
            session,
            ComponentPayload::as_interest_calculator,
        )
        .await
    }

    /// Globally enabled prompts. Prompts ignore session overrides.
    pub async fn enabled_prompts(&self) -> Vec<ActiveComponent<Arc<dyn PromptComponent>>> {
        self.active(ComponentKind::Prompt, None, ComponentPayload::as_prompt)
            .await
    }

    /// Globally enabled event handlers.
    pub async fn enabled_event_handlers(
        &self,
    ) -> Vec<ActiveComponent<Arc<dyn EventHandlerComponent>>> {
        self.active(
            ComponentKind::EventHandler,
            None,
            ComponentPayload::as_event_handler,
        )
        .await
    }

    // ---- sessions ------------------------------------------------------

    /// Shadow a component's global state for one session.
    ///
    /// `false`, recording nothing, for kinds that refuse overrides and for
    /// components that do not exist.
    pub async fn set_local_component_state(
        &self,
        session: &SessionId,
        name: &str,
        kind: ComponentKind,
        enabled: bool,
    ) -> bool {
        let id = self.canonical(kind, name);
        if !id.kind.accepts_session_override() {
            debug!(component = %id, session = %session, "kind does not accept session overrides");
            return false;
        }
        // Held so a concurrent removal cannot slip in before the override lands.
        let state = self.state.read().await;
        if !state.components.contains_key(&id) {
            debug!(component = %id, session = %session, "override for unknown component refused");
            return false;
        }
        self.overrides.set(session, id, enabled)
    }

    /// Effective availability of a component for `session` (or globally).
    pub async fn is_available(
        &self,
        name: &str,
        kind: ComponentKind,
        session: Option<&SessionId>,
    ) -> bool {
        let id = self.canonical(kind, name);
        let state = self.state.read().await;
        let persistent = state.components.get(&id).map(|e| e.info.enabled);
        let session_override = session.and_then(|s| self.overrides.get(s, &id));
        resolve_availability(id.kind, persistent, session_override)
    }

    /// End a session, dropping its overrides. Returns how many it held.
    pub fn clear_session(&self, session: &SessionId) -> usize {
        let dropped = self.overrides.clear_session(session);
        debug!(session = %session, dropped, "session overrides cleared");
        dropped
    }

    pub fn session_overrides(&self, session: &SessionId) -> Vec<(NamespacedId, bool)> {
        self.overrides.session_overrides(session)
    }

    // ---- external tools ------------------------------------------------

    /// Discover external tools (once) and merge them into the tool kind.
    ///
    /// Returns every registered discovered tool. Safe to call repeatedly and
    /// concurrently.
    pub async fn load_external_tools(&self) -> Vec<ComponentInfo> {
        if !self.settings.discovery_enabled {
            return Vec::new();
        }
        if !self.external_registered.load(Ordering::Acquire) {
            self.merge_discovered_tools().await;
        }
        let state = self.state.read().await;
        state
            .of_kind(ComponentKind::Tool)
            .filter(|e| e.info.origin == ComponentOrigin::Discovered)
            .map(|e| e.info.clone())
            .collect()
    }

    async fn merge_discovered_tools(&self) {
        let tools = self.loader.load_once().await;

        let mut named: Vec<(String, Arc<dyn ToolComponent>)> = Vec::with_capacity(tools.len());
        for tool in tools.iter() {
            let name = discovered_tool_name(tool.name());
            if named.iter().any(|(existing, _)| *existing == name) {
                warn!(tool = %name, "duplicate discovered tool name; keeping the first");
                continue;
            }
            named.push((name, Arc::clone(tool)));
        }

        let mut state = self.state.write().await;
        if self.external_registered.load(Ordering::Acquire) {
            return;
        }
        if !named.is_empty() && !state.ledger.contains(EXTERNAL_TOOLS_PLUGIN) {
            let mut descriptor =
                PluginDescriptor::new(EXTERNAL_TOOLS_PLUGIN, env!("CARGO_PKG_VERSION"))
                    .with_description("Externally discovered tools");
            descriptor.components = named
                .iter()
                .map(|(name, _)| NamespacedId::new(ComponentKind::Tool, name.clone()))
                .collect();
            if let Err(e) = state.ledger.insert(descriptor) {
                warn!(error = %e, "cannot record external tools plugin");
                return;
            }
        }

        let mut registered = 0usize;
        for (name, tool) in named {
            if state
                .components
                .contains_key(&NamespacedId::new(ComponentKind::Tool, name.clone()))
            {
                continue;
            }
            let info = ComponentInfo::new(name.clone(), ComponentKind::Tool, EXTERNAL_TOOLS_PLUGIN)
                .with_description(tool.description())
                .with_origin(ComponentOrigin::Discovered);
            match self
                .register_locked(&mut state, info, ComponentPayload::Tool(tool))
                .await
            {
                Ok(_) => registered += 1,
                Err(e) => warn!(tool = %name, error = %e, "discovered tool not registered"),
            }
        }
        self.external_registered.store(true, Ordering::Release);
        debug!(registered, "discovered tools merged");
    }

    /// Unregister every discovered tool and re-arm discovery.
    pub async fn reset_external_tools(&self) -> TeardownReport {
        let report = self.unregister_plugin_quiet(EXTERNAL_TOOLS_PLUGIN).await;
        self.external_registered.store(false, Ordering::Release);
        self.loader.reset().await;
        report
    }

    async fn unregister_plugin_quiet(&self, name: &str) -> TeardownReport {
        if self.state.read().await.ledger.contains(name) {
            self.unregister_plugin(name).await
        } else {
            TeardownReport::not_found(name)
        }
    }

    // ---- stats & invariants --------------------------------------------

    pub async fn get_registry_stats(&self) -> RegistryStats {
        let state = self.state.read().await;
        let counts_by_kind = ComponentKind::all()
            .map(|kind| (kind, state.by_kind.get(&kind).map_or(0, BTreeSet::len)))
            .collect();
        RegistryStats {
            total_plugins: state.ledger.len(),
            total_components: state.components.len(),
            enabled_components: state
                .components
                .values()
                .filter(|e| e.info.enabled)
                .count(),
            counts_by_kind,
            discovered_tool_count: state
                .components
                .values()
                .filter(|e| e.info.origin == ComponentOrigin::Discovered)
                .count(),
            pending_teardown_plugins: state
                .ledger
                .records()
                .filter(|r| r.is_pending_teardown())
                .count(),
            pending_restart_prefixes: state.index.pending_restart(),
            active_sessions: self.overrides.session_count(),
        }
    }

    /// Verify that every secondary structure is derivable from the primary map.
    pub async fn check_invariants(&self) -> Result<(), HearthError> {
        let state = self.state.read().await;
        let broken = |msg: String| Err(HearthError::Internal(msg));

        let indexed: usize = state.by_kind.values().map(BTreeSet::len).sum();
        if indexed != state.components.len() {
            return broken(format!(
                "per-kind index holds {indexed} entries for {} components",
                state.components.len()
            ));
        }
        for (id, entry) in &state.components {
            if !state
                .by_kind
                .get(&id.kind)
                .is_some_and(|names| names.contains(&id.name))
            {
                return broken(format!("{id} missing from per-kind index"));
            }
            match state.ledger.get(&entry.info.plugin_name) {
                Some(record) if record.owns(id) => {}
                _ => {
                    return broken(format!(
                        "{id} is not owned by a registered plugin `{}`",
                        entry.info.plugin_name
                    ));
                }
            }
        }
        for kind in ComponentKind::all() {
            for name in state.index.enabled_pool(kind) {
                let id = NamespacedId::new(kind, name);
                if !state.components.get(&id).is_some_and(|e| e.info.enabled) {
                    return broken(format!("{id} is pooled but not an enabled component"));
                }
            }
        }
        for entry in state.of_kind(ComponentKind::EventHandler) {
            if entry.info.enabled && !state.index.is_subscribed(&entry.info.name) {
                return broken(format!(
                    "{} is enabled but not subscribed",
                    entry.info.id()
                ));
            }
        }
        for name in state.index.subscriptions() {
            let id = NamespacedId::new(ComponentKind::EventHandler, name);
            if !state.components.contains_key(&id) {
                return broken(format!("{id} is subscribed but not registered"));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("dispatch", &self.dispatch)
            .field("loader", &self.loader)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_test_utils::{RecordingBus, RecordingMount, fixtures};
    use tracing_test::traced_test;

    fn registry() -> ComponentRegistry {
        ComponentRegistry::builder(
            RegistrySettings::default(),
            Arc::new(RecordingBus::new()),
            Arc::new(RecordingMount::new()),
        )
        .build()
    }

    #[test]
    fn lookup_from_str_splits_ids_and_bare_names() {
        assert_eq!(
            ComponentLookup::from("tool.search"),
            ComponentLookup::Id(NamespacedId::new(ComponentKind::Tool, "search"))
        );
        assert_eq!(
            ComponentLookup::from("search"),
            ComponentLookup::Bare("search".to_string())
        );
        assert_eq!(
            ComponentLookup::from("widget.search"),
            ComponentLookup::Bare("widget.search".to_string())
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn ambiguous_bare_lookup_warns() {
        let registry = registry();
        registry
            .register_plugin(
                PluginDescriptor::new("demo", "0.1.0")
                    .with_component(ComponentKind::Action, "greet")
                    .with_component(ComponentKind::Chatter, "greet"),
            )
            .await;
        registry
            .register_component(
                ComponentInfo::new("greet", ComponentKind::Chatter, "demo"),
                fixtures::chatter_payload(),
            )
            .await
            .unwrap();
        assert_eq!(
            registry.get_component_info("greet").await.map(|i| i.kind),
            Some(ComponentKind::Chatter)
        );
        assert!(!logs_contain("ambiguous component name"));

        registry
            .register_component(
                ComponentInfo::new("greet", ComponentKind::Action, "demo"),
                fixtures::action_payload(),
            )
            .await
            .unwrap();
        assert_eq!(
            registry.get_component_info("greet").await.map(|i| i.kind),
            Some(ComponentKind::Action)
        );
        assert!(logs_contain("ambiguous component name"));
    }

    #[tokio::test]
    #[traced_test]
    async fn legacy_command_registration_warns_about_deprecation() {
        let registry = registry();
        registry
            .register_plugin(
                PluginDescriptor::new("demo", "0.1.0")
                    .with_component(ComponentKind::Command, "ping"),
            )
            .await;
        let id = registry
            .try_register_component(
                ComponentInfo::new("ping", ComponentKind::Command, "demo"),
                fixtures::command_payload(),
            )
            .await
            .unwrap();
        assert_eq!(id, NamespacedId::new(ComponentKind::PlusCommand, "ping"));
        assert!(logs_contain("legacy command kind is deprecated"));
    }

    #[tokio::test]
    #[traced_test]
    async fn refused_operations_are_logged_not_raised() {
        let registry = registry();
        let outcome = registry
            .enable_component("ghost", ComponentKind::Action)
            .await
            .unwrap();
        assert!(!outcome);
        assert!(logs_contain("registry operation refused"));
        registry.check_invariants().await.unwrap();
    }

    #[tokio::test]
    async fn enabled_handler_without_subscription_breaks_invariants() {
        let registry = registry();
        registry
            .register_plugin(
                PluginDescriptor::new("demo", "0.1.0")
                    .with_component(ComponentKind::EventHandler, "audit"),
            )
            .await;
        registry.state.write().await.insert(
            ComponentInfo::new("audit", ComponentKind::EventHandler, "demo"),
            fixtures::handler_payload(),
        );

        let err = registry.check_invariants().await.unwrap_err();
        assert!(err.to_string().contains("enabled but not subscribed"));
    }

    #[test]
    fn settle_propagates_only_internal_errors() {
        assert!(settle("op", Ok(())).unwrap());
        assert!(!settle("op", Err(HearthError::NotFound("x".into()))).unwrap());
        assert!(settle("op", Err(HearthError::Internal("broken".into()))).is_err());
    }
}
