// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin configuration lookup with an on-disk fallback.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use hearth_core::{HearthError, PluginConfigProvider};
use tracing::{debug, warn};

/// Resolves plugin configuration from in-memory instance configs first,
/// then from `{config_dir}/{plugin}/config.toml`.
#[derive(Debug)]
pub struct FilePluginConfigProvider {
    config_dir: PathBuf,
    instances: RwLock<HashMap<String, serde_json::Value>>,
}

impl FilePluginConfigProvider {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            instances: RwLock::new(HashMap::new()),
        }
    }

    /// Set the live configuration for a plugin instance.
    pub fn set_instance_config(&self, plugin: &str, config: serde_json::Value) {
        self.instances
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(plugin.to_string(), config);
    }

    pub fn remove_instance_config(&self, plugin: &str) -> Option<serde_json::Value> {
        self.instances
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(plugin)
    }

    pub fn config_path(&self, plugin: &str) -> PathBuf {
        self.config_dir.join(plugin).join("config.toml")
    }

    fn read_fallback(&self, plugin: &str) -> Option<serde_json::Value> {
        if plugin.is_empty() || plugin.contains(['/', '\\']) || plugin == ".." {
            warn!(plugin, "refusing config lookup for unsafe plugin name");
            return None;
        }
        let path = self.config_path(plugin);
        match load_toml_as_json(&path) {
            Ok(Some(value)) => {
                debug!(plugin, path = %path.display(), "loaded plugin config from file");
                Some(value)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(
                    plugin,
                    path = %path.display(),
                    error = %e,
                    "ignoring unreadable plugin config"
                );
                None
            }
        }
    }
}

impl PluginConfigProvider for FilePluginConfigProvider {
    fn get_plugin_config(&self, plugin_name: &str) -> Option<serde_json::Value> {
        let instance = self
            .instances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(plugin_name)
            .cloned();
        instance.or_else(|| self.read_fallback(plugin_name))
    }
}

/// Reads a TOML file and converts it to JSON. `Ok(None)` when the file is absent.
pub fn load_toml_as_json(path: &Path) -> Result<Option<serde_json::Value>, HearthError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(HearthError::Config(format!(
                "cannot read {}: {e}",
                path.display()
            )));
        }
    };
    let table: toml::Table = toml::from_str(&content)
        .map_err(|e| HearthError::Config(format!("invalid TOML in {}: {e}", path.display())))?;
    serde_json::to_value(table)
        .map(Some)
        .map_err(|e| HearthError::Config(format!("cannot convert {}: {e}", path.display())))
}
