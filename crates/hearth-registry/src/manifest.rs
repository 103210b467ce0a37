// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin manifest parsing from `plugin.toml` files.
//!
//! A manifest declares a plugin's identity, the components it will register,
//! and its default configuration. Payloads are supplied separately by
//! whatever loads the plugin's code.

use std::str::FromStr;

use hearth_core::{ComponentInfo, ComponentKind, HearthError};
use serde::{Deserialize, Serialize};

use crate::ledger::PluginDescriptor;

/// A component declared in a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDeclaration {
    pub kind: ComponentKind,
    pub name: String,
    pub enabled: bool,
    pub description: String,
}

impl ComponentDeclaration {
    /// Metadata for registering this component under `plugin`.
    pub fn info(&self, plugin: &str) -> ComponentInfo {
        ComponentInfo::new(self.name.clone(), self.kind, plugin)
            .with_enabled(self.enabled)
            .with_description(self.description.clone())
    }
}

/// Parsed `plugin.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: Option<String>,
    pub components: Vec<ComponentDeclaration>,
    /// The `[config]` table, converted to JSON.
    pub config: serde_json::Value,
}

impl PluginManifest {
    /// The ledger descriptor for this manifest.
    pub fn descriptor(&self) -> PluginDescriptor {
        PluginDescriptor {
            name: self.name.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            author: self.author.clone(),
            components: self
                .components
                .iter()
                .map(|c| hearth_core::NamespacedId::new(c.kind, c.name.clone()))
                .collect(),
            config: self.config.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    plugin: PluginSection,
    #[serde(default)]
    components: Vec<ComponentSection>,
    #[serde(default)]
    config: Option<toml::Table>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PluginSection {
    name: String,
    version: String,
    #[serde(default)]
    description: String,
    author: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ComponentSection {
    kind: String,
    name: String,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    description: String,
}

fn default_enabled() -> bool {
    true
}

/// Parse a plugin manifest from TOML content.
///
/// Validates the plugin name, semver version, every component kind and
/// name, and rejects components listed twice.
pub fn parse_plugin_manifest(toml_content: &str) -> Result<PluginManifest, HearthError> {
    let file: ManifestFile = toml::from_str(toml_content)
        .map_err(|e| HearthError::Config(format!("invalid plugin manifest: {e}")))?;

    let components = file
        .components
        .into_iter()
        .map(|c| {
            let kind = ComponentKind::from_str(&c.kind).map_err(|_| {
                HearthError::Config(format!(
                    "plugin manifest: invalid component kind '{}'. Expected one of: {}",
                    c.kind,
                    ComponentKind::all()
                        .map(|k| k.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })?;
            Ok(ComponentDeclaration {
                kind,
                name: c.name,
                enabled: c.enabled,
                description: c.description,
            })
        })
        .collect::<Result<Vec<_>, HearthError>>()?;

    let config = match file.config {
        Some(table) => serde_json::to_value(table)
            .map_err(|e| HearthError::Config(format!("plugin manifest: bad [config]: {e}")))?,
        None => serde_json::Value::Null,
    };

    let manifest = PluginManifest {
        name: file.plugin.name,
        version: file.plugin.version,
        description: file.plugin.description,
        author: file.plugin.author,
        components,
        config,
    };

    manifest
        .descriptor()
        .validate()
        .map_err(|e| HearthError::Config(format!("plugin manifest: {e}")))?;

    Ok(manifest)
}
