// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::HearthConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &HearthConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.host.name.trim().is_empty() {
        errors.push(ConfigError::validation("host.name must not be empty"));
    }

    if !LOG_LEVELS.contains(&config.host.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "host.log_level `{}` must be one of {}",
            config.host.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    let addr = config.http.host.trim();
    if addr.is_empty() {
        errors.push(ConfigError::validation("http.host must not be empty"));
    } else {
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::validation(format!(
                "http.host `{addr}` is not a valid IP address or hostname"
            )));
        }
    }

    let prefix = &config.http.plugin_prefix;
    if !prefix.starts_with('/') || (prefix.len() > 1 && prefix.ends_with('/')) {
        errors.push(ConfigError::validation(format!(
            "http.plugin_prefix `{prefix}` must start with `/` and not end with `/`"
        )));
    }

    if config.plugins.config_dir.trim().is_empty() {
        errors.push(ConfigError::validation("plugins.config_dir must not be empty"));
    }

    if config.dispatch.collaborator_timeout_ms == 0 {
        errors.push(ConfigError::validation(
            "dispatch.collaborator_timeout_ms must be greater than 0",
        ));
    }

    if config.discovery.timeout_ms == 0 {
        errors.push(ConfigError::validation(
            "discovery.timeout_ms must be greater than 0",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&HearthConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_failure() {
        let mut config = HearthConfig::default();
        config.host.log_level = "loud".into();
        config.http.plugin_prefix = "plugins/".into();
        config.dispatch.collaborator_timeout_ms = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn rejects_bad_bind_host() {
        let mut config = HearthConfig::default();
        config.http.host = "not a host!".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("http.host"));
    }
}
