// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hearth serve` command implementation.
//!
//! Wires the in-process event bus and the gateway mount table into a
//! component registry, installs the built-in `host` plugin, and serves the
//! admin API until Ctrl+C or SIGTERM.

use std::sync::Arc;

use hearth_bus::InProcessBus;
use hearth_config::HearthConfig;
use hearth_core::HearthError;
use hearth_gateway::{GatewayState, MountTable, ServerConfig, start_server};
use hearth_registry::{ComponentRegistry, Installer, InstallOutcome, RegistrySettings, host_plugin};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The collaborators a running host shares between registry and gateway.
pub struct Host {
    pub registry: Arc<ComponentRegistry>,
    pub bus: Arc<InProcessBus>,
    pub mounts: Arc<MountTable>,
}

/// Build the registry and install the built-in plugin set.
pub async fn build_host(config: &HearthConfig) -> Result<Host, HearthError> {
    let bus = Arc::new(InProcessBus::new());
    let mounts = Arc::new(MountTable::new());
    let registry = Arc::new(
        ComponentRegistry::builder(
            RegistrySettings::from_config(config),
            bus.clone(),
            mounts.clone(),
        )
        .build(),
    );

    let report = Installer::new(Arc::clone(&registry))
        .install(host_plugin(&config.host.name))
        .await;
    match report.outcome {
        InstallOutcome::Installed => {
            info!(
                plugin = %report.plugin,
                components = report.registered.len(),
                "built-in plugin installed"
            );
        }
        InstallOutcome::RolledBack { failed, reason } => {
            return Err(HearthError::Internal(format!(
                "built-in plugin `{}` rolled back at {failed}: {reason}",
                report.plugin
            )));
        }
        InstallOutcome::Rejected { reason } => {
            return Err(HearthError::Internal(format!(
                "built-in plugin `{}` rejected: {reason}",
                report.plugin
            )));
        }
    }

    Ok(Host { registry, bus, mounts })
}

/// Runs the `hearth serve` command.
pub async fn run_serve(config: HearthConfig) -> Result<(), HearthError> {
    init_tracing(&config.host.log_level);
    info!(host = %config.host.name, "starting hearth serve");

    let host = build_host(&config).await?;
    let state = GatewayState::new(Arc::clone(&host.registry), Arc::clone(&host.mounts));
    let server_config = ServerConfig {
        host: config.http.host.clone(),
        port: config.http.port,
    };

    let cancel = install_signal_handler();
    start_server(&server_config, state, cancel).await?;

    let stats = host.registry.get_registry_stats().await;
    info!(
        plugins = stats.total_plugins,
        components = stats.total_components,
        subscribers = host.bus.subscriber_count(),
        "hearth stopped"
    );
    Ok(())
}

/// Cancels the returned token on SIGINT (Ctrl+C) or SIGTERM.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
                        _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "SIGTERM handler unavailable; listening for Ctrl+C only");
                    let _ = ctrl_c.await;
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hearth={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
