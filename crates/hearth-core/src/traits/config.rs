// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Resolves the configuration blob of an installed plugin.
pub trait PluginConfigProvider: Send + Sync + 'static {
    fn get_plugin_config(&self, plugin_name: &str) -> Option<serde_json::Value>;
}
