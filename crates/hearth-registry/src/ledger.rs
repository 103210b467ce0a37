// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin ledger: which plugin owns which components.
//!
//! The ledger itself is plain data living inside the registry state. The
//! cascading uninstall that walks it lives on [`crate::ComponentRegistry`].

use std::collections::BTreeMap;

use hearth_core::{ComponentKind, HearthError, NAMESPACE_SEPARATOR, NamespacedId};
use serde::{Deserialize, Serialize};

/// An installable unit bundling configuration and a fixed component list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Globally unique plugin name.
    pub name: String,
    /// Semantic version string.
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: Option<String>,
    /// Owned components. Immutable once the plugin is registered.
    #[serde(default)]
    pub components: Vec<NamespacedId>,
    /// Free-form plugin configuration.
    #[serde(default)]
    pub config: serde_json::Value,
}

impl PluginDescriptor {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: String::new(),
            author: None,
            components: Vec::new(),
            config: serde_json::Value::Null,
        }
    }

    pub fn with_component(mut self, kind: ComponentKind, name: impl Into<String>) -> Self {
        self.components.push(NamespacedId::new(kind, name));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = config;
        self
    }

    /// Checks name, version, and component list shape.
    pub fn validate(&self) -> Result<(), HearthError> {
        validate_plugin_name(&self.name)?;
        semver::Version::parse(&self.version).map_err(|e| {
            HearthError::Validation(format!(
                "plugin `{}` has invalid version `{}`: {e}",
                self.name, self.version
            ))
        })?;
        let mut seen = std::collections::BTreeSet::new();
        for id in &self.components {
            validate_component_name(&id.name)?;
            if !seen.insert(id) {
                return Err(HearthError::Validation(format!(
                    "plugin `{}` lists {id} twice",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

pub(crate) fn validate_component_name(name: &str) -> Result<(), HearthError> {
    if name.is_empty() {
        return Err(HearthError::Validation(
            "component name must not be empty".to_string(),
        ));
    }
    if name.contains(NAMESPACE_SEPARATOR) {
        return Err(HearthError::Validation(format!(
            "component name `{name}` must not contain `{NAMESPACE_SEPARATOR}`"
        )));
    }
    Ok(())
}

pub(crate) fn validate_plugin_name(name: &str) -> Result<(), HearthError> {
    if name.is_empty() {
        return Err(HearthError::Validation(
            "plugin name must not be empty".to_string(),
        ));
    }
    if name.contains(NAMESPACE_SEPARATOR) || name.contains(['/', '\\']) {
        return Err(HearthError::Validation(format!(
            "plugin name `{name}` must not contain `{NAMESPACE_SEPARATOR}` or path separators"
        )));
    }
    Ok(())
}

/// A registered plugin plus any components that failed to tear down.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginRecord {
    pub descriptor: PluginDescriptor,
    /// Configuration resolved when the plugin was admitted: the descriptor's
    /// own config, or whatever the config provider returned for it.
    pub config: serde_json::Value,
    /// Components whose last teardown attempt failed, with the reason.
    pub failed_teardown: BTreeMap<NamespacedId, String>,
}

impl PluginRecord {
    pub fn owns(&self, id: &NamespacedId) -> bool {
        self.descriptor.components.contains(id)
    }

    pub fn is_pending_teardown(&self) -> bool {
        !self.failed_teardown.is_empty()
    }
}

/// Outcome of uninstalling a plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeardownReport {
    pub plugin: String,
    /// Whether the plugin was registered when the attempt started.
    pub found: bool,
    /// Components removed (or already gone) during this attempt.
    pub removed: Vec<NamespacedId>,
    /// Components still registered, with the reason their teardown failed.
    pub failed: BTreeMap<NamespacedId, String>,
    /// Whether the descriptor left the ledger.
    pub plugin_removed: bool,
}

impl TeardownReport {
    pub(crate) fn not_found(plugin: &str) -> Self {
        Self {
            plugin: plugin.to_string(),
            ..Self::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.plugin_removed && self.failed.is_empty()
    }

    /// `NotFound` for unknown plugins, `PartialCascade` when components
    /// remain, the report otherwise.
    pub fn into_result(self) -> Result<Self, HearthError> {
        if !self.found {
            return Err(HearthError::NotFound(format!("plugin `{}`", self.plugin)));
        }
        if !self.failed.is_empty() {
            return Err(HearthError::PartialCascade {
                plugin: self.plugin,
                failed: self.failed.into_keys().collect(),
            });
        }
        Ok(self)
    }
}

/// Name -> plugin record.
#[derive(Debug, Default)]
pub struct PluginLedger {
    plugins: BTreeMap<String, PluginRecord>,
}

impl PluginLedger {
    /// Inserts a validated descriptor. Component ids must already be canonical.
    pub fn insert(&mut self, descriptor: PluginDescriptor) -> Result<(), HearthError> {
        let config = descriptor.config.clone();
        self.insert_with_config(descriptor, config)
    }

    pub fn insert_with_config(
        &mut self,
        descriptor: PluginDescriptor,
        config: serde_json::Value,
    ) -> Result<(), HearthError> {
        if self.plugins.contains_key(&descriptor.name) {
            return Err(HearthError::DuplicatePlugin(descriptor.name));
        }
        self.plugins.insert(
            descriptor.name.clone(),
            PluginRecord {
                descriptor,
                config,
                failed_teardown: BTreeMap::new(),
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PluginRecord> {
        self.plugins.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<PluginRecord> {
        self.plugins.remove(name)
    }

    /// Components the next uninstall attempt should target: the failed set
    /// when a previous attempt was partial, otherwise every owned component.
    pub(crate) fn teardown_targets(&self, name: &str) -> Option<Vec<NamespacedId>> {
        self.plugins.get(name).map(|record| {
            if record.is_pending_teardown() {
                record.failed_teardown.keys().cloned().collect()
            } else {
                record.descriptor.components.clone()
            }
        })
    }

    pub(crate) fn set_failed(&mut self, name: &str, failed: BTreeMap<NamespacedId, String>) {
        if let Some(record) = self.plugins.get_mut(name) {
            record.failed_teardown = failed;
        }
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// All records, sorted by plugin name.
    pub fn records(&self) -> impl Iterator<Item = &PluginRecord> {
        self.plugins.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> PluginDescriptor {
        PluginDescriptor::new("demo", "0.1.0")
            .with_component(ComponentKind::Action, "greet")
            .with_component(ComponentKind::Tool, "lookup")
    }

    #[test]
    fn duplicate_plugin_is_rejected() {
        let mut ledger = PluginLedger::default();
        ledger.insert(demo()).unwrap();
        let err = ledger.insert(demo()).unwrap_err();
        assert!(matches!(err, HearthError::DuplicatePlugin(name) if name == "demo"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn descriptor_validation_rejects_dotted_and_bad_versions() {
        assert!(demo().validate().is_ok());
        assert!(PluginDescriptor::new("my.plugin", "1.0.0").validate().is_err());
        assert!(PluginDescriptor::new("demo", "one").validate().is_err());
        assert!(
            PluginDescriptor::new("demo", "1.0.0")
                .with_component(ComponentKind::Action, "a.b")
                .validate()
                .is_err()
        );
        assert!(
            PluginDescriptor::new("demo", "1.0.0")
                .with_component(ComponentKind::Action, "greet")
                .with_component(ComponentKind::Action, "greet")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn teardown_targets_narrow_to_failed_set() {
        let mut ledger = PluginLedger::default();
        ledger.insert(demo()).unwrap();
        assert_eq!(ledger.teardown_targets("demo").unwrap().len(), 2);

        let failed_id = NamespacedId::new(ComponentKind::Tool, "lookup");
        ledger.set_failed(
            "demo",
            BTreeMap::from([(failed_id.clone(), "bus down".to_string())]),
        );
        assert_eq!(ledger.teardown_targets("demo").unwrap(), vec![failed_id]);
        assert!(ledger.get("demo").unwrap().is_pending_teardown());
        assert!(ledger.teardown_targets("missing").is_none());
    }
}
