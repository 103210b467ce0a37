// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Hearth plugin host.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Hearth configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HearthConfig {
    /// Host identity and logging.
    #[serde(default)]
    pub host: HostConfig,

    /// HTTP server and plugin route mounting.
    #[serde(default)]
    pub http: HttpConfig,

    /// Plugin configuration lookup.
    #[serde(default)]
    pub plugins: PluginsConfig,

    /// Registration side-effect settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// External tool discovery.
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

/// Host identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// Display name of this host instance.
    #[serde(default = "default_host_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            name: default_host_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_host_name() -> String {
    "hearth".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Address to bind.
    #[serde(default = "default_http_host")]
    pub host: String,

    #[serde(default = "default_http_port")]
    pub port: u16,

    /// When false, router components register without mounting anything.
    #[serde(default = "default_true")]
    pub enable_plugin_endpoints: bool,

    /// Root under which each plugin's routes are mounted as `{root}/{plugin}`.
    #[serde(default = "default_plugin_prefix")]
    pub plugin_prefix: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
            enable_plugin_endpoints: true,
            plugin_prefix: default_plugin_prefix(),
        }
    }
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    3140
}

fn default_plugin_prefix() -> String {
    "/plugins".to_string()
}

fn default_true() -> bool {
    true
}

/// Plugin configuration lookup settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginsConfig {
    /// Directory holding `{plugin}/config.toml` fallback files.
    #[serde(default = "default_config_dir")]
    pub config_dir: String,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
        }
    }
}

fn default_config_dir() -> String {
    "config/plugins".to_string()
}

/// Settings for kind-specific registration side effects.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Upper bound for each collaborator call (subscribe, mount, route build).
    #[serde(default = "default_collaborator_timeout_ms")]
    pub collaborator_timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            collaborator_timeout_ms: default_collaborator_timeout_ms(),
        }
    }
}

impl DispatchConfig {
    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }
}

fn default_collaborator_timeout_ms() -> u64 {
    5_000
}

/// External tool discovery settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Whether discovery runs at all. When false, `load_once` yields no tools.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Upper bound for one discovery pass.
    #[serde(default = "default_discovery_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: default_discovery_timeout_ms(),
        }
    }
}

impl DiscoveryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_discovery_timeout_ms() -> u64 {
    30_000
}
