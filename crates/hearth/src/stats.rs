// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hearth stats` command implementation.

use hearth_config::HearthConfig;
use hearth_core::HearthError;
use hearth_registry::RegistryStats;

use crate::serve::build_host;

/// Statistics for a freshly booted host.
pub async fn collect_stats(config: &HearthConfig) -> Result<RegistryStats, HearthError> {
    let host = build_host(config).await?;
    Ok(host.registry.get_registry_stats().await)
}

/// Runs the `hearth stats` command, printing pretty JSON to stdout.
pub async fn run_stats(config: &HearthConfig) -> Result<(), HearthError> {
    let stats = collect_stats(config).await?;
    let json = serde_json::to_string_pretty(&stats)
        .map_err(|e| HearthError::Internal(format!("failed to encode stats: {e}")))?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stats_cover_builtin_plugin() {
        let stats = collect_stats(&HearthConfig::default()).await.unwrap();
        assert_eq!(stats.total_plugins, 1);
        assert_eq!(stats.total_components, 2);
        assert_eq!(stats.enabled_components, 2);
        assert_eq!(stats.discovered_tool_count, 0);
    }
}
