// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the registry, its collaborators, and component traits.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::HearthError;

/// Separator between kind and name in a rendered [`NamespacedId`].
///
/// Component and plugin names must never contain it.
pub const NAMESPACE_SEPARATOR: char = '.';

/// Unique identifier for a conversation session (stream).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of a component.
///
/// Declaration order is the fixed enumeration order used to break ties in
/// bare-name lookups.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Action,
    /// Legacy pattern command. Never stored; re-expressed as `PlusCommand`.
    Command,
    PlusCommand,
    Tool,
    EventHandler,
    Chatter,
    InterestCalculator,
    Prompt,
    Router,
}

impl ComponentKind {
    /// Kinds whose side effects cannot be revoked at runtime.
    pub const NO_OVERRIDE: [ComponentKind; 3] = [
        ComponentKind::Router,
        ComponentKind::EventHandler,
        ComponentKind::Prompt,
    ];

    /// Whether sessions may shadow this kind's global enabled flag.
    pub fn accepts_session_override(self) -> bool {
        !Self::NO_OVERRIDE.contains(&self)
    }

    /// All kinds in the fixed enumeration order.
    pub fn all() -> impl Iterator<Item = ComponentKind> {
        Self::iter()
    }
}

/// The `(kind, name)` composite key. Globally unique among registered components.
///
/// Serializes as its `kind.name` string so it can key JSON maps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespacedId {
    pub kind: ComponentKind,
    pub name: String,
}

impl NamespacedId {
    pub fn new(kind: ComponentKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for NamespacedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{NAMESPACE_SEPARATOR}{}", self.kind, self.name)
    }
}

impl FromStr for NamespacedId {
    type Err = HearthError;

    /// Parses `kind.name`, e.g. `plus_command.help`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, name) = s.split_once(NAMESPACE_SEPARATOR).ok_or_else(|| {
            HearthError::Validation(format!("`{s}` is not a namespaced id (expected kind.name)"))
        })?;
        let kind = ComponentKind::from_str(kind)
            .map_err(|_| HearthError::Validation(format!("unknown component kind `{kind}`")))?;
        if name.is_empty() || name.contains(NAMESPACE_SEPARATOR) {
            return Err(HearthError::Validation(format!(
                "invalid component name in `{s}`"
            )));
        }
        Ok(Self::new(kind, name))
    }
}

impl Serialize for NamespacedId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NamespacedId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Where a component came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentOrigin {
    /// Declared by an installed plugin.
    #[default]
    Declared,
    /// Found by the external tool loader.
    Discovered,
}

/// Metadata describing a registered (or to-be-registered) component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInfo {
    pub name: String,
    pub kind: ComponentKind,
    /// Name of the owning plugin.
    pub plugin_name: String,
    /// Persistent (global) enabled flag.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub origin: ComponentOrigin,
}

fn default_enabled() -> bool {
    true
}

impl ComponentInfo {
    /// New enabled, declared component.
    pub fn new(
        name: impl Into<String>,
        kind: ComponentKind,
        plugin_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            plugin_name: plugin_name.into(),
            enabled: true,
            description: String::new(),
            origin: ComponentOrigin::Declared,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_origin(mut self, origin: ComponentOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// The namespaced id this component registers under.
    pub fn id(&self) -> NamespacedId {
        NamespacedId::new(self.kind, self.name.clone())
    }
}

/// Explicit per-component context handed to every component call.
///
/// Carries the owning plugin's identity and resolved configuration so that
/// component types never need mutable shared state.
#[derive(Debug, Clone)]
pub struct ComponentContext {
    pub plugin_name: String,
    pub component: NamespacedId,
    pub config: Arc<serde_json::Value>,
}

impl ComponentContext {
    pub fn new(
        plugin_name: impl Into<String>,
        component: NamespacedId,
        config: serde_json::Value,
    ) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            component,
            config: Arc::new(config),
        }
    }

    /// Look up a configuration value by JSON pointer (e.g. `/voice/speed`).
    pub fn config_value(&self, pointer: &str) -> Option<&serde_json::Value> {
        self.config.pointer(pointer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_renders_snake_case() {
        assert_eq!(ComponentKind::PlusCommand.to_string(), "plus_command");
        assert_eq!(ComponentKind::InterestCalculator.to_string(), "interest_calculator");
        assert_eq!(
            ComponentKind::from_str("event_handler").unwrap(),
            ComponentKind::EventHandler
        );
    }

    #[test]
    fn no_override_set_is_router_event_handler_prompt() {
        let refusing: Vec<_> = ComponentKind::all()
            .filter(|k| !k.accepts_session_override())
            .collect();
        assert_eq!(
            refusing,
            vec![
                ComponentKind::EventHandler,
                ComponentKind::Prompt,
                ComponentKind::Router
            ]
        );
    }

    #[test]
    fn enumeration_order_starts_with_action() {
        let first: Vec<_> = ComponentKind::all().take(3).collect();
        assert_eq!(
            first,
            vec![
                ComponentKind::Action,
                ComponentKind::Command,
                ComponentKind::PlusCommand
            ]
        );
    }

    #[test]
    fn namespaced_id_parses_kind_and_name() {
        let id: NamespacedId = "tool.web_search".parse().unwrap();
        assert_eq!(id, NamespacedId::new(ComponentKind::Tool, "web_search"));
        assert_eq!(id.to_string(), "tool.web_search");
    }

    #[test]
    fn namespaced_id_rejects_bad_input() {
        assert!("greet".parse::<NamespacedId>().is_err());
        assert!("widget.greet".parse::<NamespacedId>().is_err());
        assert!("action.".parse::<NamespacedId>().is_err());
        assert!("action.a.b".parse::<NamespacedId>().is_err());
    }

    #[test]
    fn namespaced_id_keys_json_maps() {
        let map = std::collections::BTreeMap::from([(
            NamespacedId::new(ComponentKind::EventHandler, "on_msg"),
            "bus down",
        )]);
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({"event_handler.on_msg": "bus down"}));
    }

    #[test]
    fn component_info_defaults_to_enabled_when_deserialized() {
        let info: ComponentInfo = serde_json::from_value(serde_json::json!({
            "name": "greet",
            "kind": "action",
            "plugin_name": "demo"
        }))
        .unwrap();
        assert!(info.enabled);
        assert_eq!(info.origin, ComponentOrigin::Declared);
        assert_eq!(info.id().to_string(), "action.greet");
    }

    #[test]
    fn context_reads_config_by_pointer() {
        let ctx = ComponentContext::new(
            "tts",
            NamespacedId::new(ComponentKind::Action, "speak"),
            serde_json::json!({"voice": {"speed": 1.5}}),
        );
        assert_eq!(ctx.config_value("/voice/speed"), Some(&serde_json::json!(1.5)));
        assert!(ctx.config_value("/voice/pitch").is_none());
    }

    proptest::proptest! {
        #[test]
        fn names_containing_the_separator_never_parse(
            prefix in "[a-z_]{1,8}",
            suffix in "[a-z_]{1,8}",
        ) {
            let raw = format!("action.{prefix}.{suffix}");
            proptest::prop_assert!(raw.parse::<NamespacedId>().is_err());
        }
    }
}
