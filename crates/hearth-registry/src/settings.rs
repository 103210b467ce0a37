// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::path::PathBuf;
use std::time::Duration;

use hearth_config::HearthConfig;

/// Registry tunables, resolved from [`HearthConfig`].
#[derive(Debug, Clone)]
pub struct RegistrySettings {
    /// Upper bound for every collaborator call made during dispatch.
    pub collaborator_timeout: Duration,
    /// When false, router components register without mounting.
    pub enable_plugin_endpoints: bool,
    /// Root of every plugin's mount prefix.
    pub plugin_prefix: String,
    /// Fallback directory for `{plugin}/config.toml`.
    pub plugin_config_dir: PathBuf,
    pub discovery_enabled: bool,
    pub discovery_timeout: Duration,
}

impl RegistrySettings {
    pub fn from_config(config: &HearthConfig) -> Self {
        Self {
            collaborator_timeout: config.dispatch.collaborator_timeout(),
            enable_plugin_endpoints: config.http.enable_plugin_endpoints,
            plugin_prefix: config.http.plugin_prefix.clone(),
            plugin_config_dir: PathBuf::from(&config.plugins.config_dir),
            discovery_enabled: config.discovery.enabled,
            discovery_timeout: config.discovery.timeout(),
        }
    }

    /// Mount prefix for a plugin's routes, e.g. `/plugins/demo`.
    pub fn plugin_mount_prefix(&self, plugin: &str) -> String {
        format!("{}/{plugin}", self.plugin_prefix.trim_end_matches('/'))
    }
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self::from_config(&HearthConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_prefix_joins_root_and_plugin() {
        let settings = RegistrySettings::default();
        assert_eq!(settings.plugin_mount_prefix("demo"), "/plugins/demo");

        let rooted = RegistrySettings {
            plugin_prefix: "/".into(),
            ..RegistrySettings::default()
        };
        assert_eq!(rooted.plugin_mount_prefix("demo"), "/demo");
    }
}
