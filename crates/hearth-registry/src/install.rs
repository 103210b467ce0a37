// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! All-or-nothing plugin installation.
//!
//! [`Installer::install`] registers a plugin descriptor and then each of its
//! components in order. The first failure rolls back everything this attempt
//! registered. Dropping the install future midway (cancellation) triggers the
//! same rollback on a spawned task.

use std::sync::Arc;

use hearth_core::{ComponentInfo, ComponentPayload, HearthError, NamespacedId};
use tracing::{info, warn};

use crate::ledger::PluginDescriptor;
use crate::manifest::{ComponentDeclaration, PluginManifest};
use crate::registry::ComponentRegistry;

/// A descriptor plus the payloads for the components it declares.
#[derive(Debug, Clone)]
pub struct InstallBundle {
    pub descriptor: PluginDescriptor,
    pub components: Vec<(ComponentInfo, ComponentPayload)>,
}

impl InstallBundle {
    pub fn new(descriptor: PluginDescriptor) -> Self {
        Self {
            descriptor,
            components: Vec::new(),
        }
    }

    /// Declare and attach a component in one step.
    pub fn with_component(mut self, info: ComponentInfo, payload: ComponentPayload) -> Self {
        self.descriptor.components.push(info.id());
        self.components.push((info, payload));
        self
    }

    /// Pair a manifest's declarations with payloads supplied by `resolve`.
    ///
    /// Fails with [`HearthError::Config`] when a declared component has no
    /// payload.
    pub fn from_manifest(
        manifest: &PluginManifest,
        mut resolve: impl FnMut(&ComponentDeclaration) -> Option<ComponentPayload>,
    ) -> Result<Self, HearthError> {
        let components = manifest
            .components
            .iter()
            .map(|decl| {
                resolve(decl)
                    .map(|payload| (decl.info(&manifest.name), payload))
                    .ok_or_else(|| {
                        HearthError::Config(format!(
                            "plugin `{}` declares {}.{} but provides no implementation",
                            manifest.name, decl.kind, decl.name
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            descriptor: manifest.descriptor(),
            components,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstallOutcome {
    Installed,
    /// A component failed; everything registered by this attempt was removed.
    RolledBack { failed: NamespacedId, reason: String },
    /// The descriptor itself was refused; nothing was registered.
    Rejected { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstallReport {
    pub plugin: String,
    /// Components registered before the outcome was decided.
    pub registered: Vec<NamespacedId>,
    pub outcome: InstallOutcome,
}

impl InstallReport {
    pub fn is_installed(&self) -> bool {
        self.outcome == InstallOutcome::Installed
    }
}

pub struct Installer {
    registry: Arc<ComponentRegistry>,
}

/// Rolls a half-finished install back if dropped while armed.
struct RollbackGuard {
    registry: Arc<ComponentRegistry>,
    plugin: String,
    armed: bool,
}

impl RollbackGuard {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for RollbackGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let registry = Arc::clone(&self.registry);
        let plugin = std::mem::take(&mut self.plugin);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!(plugin = %plugin, "install cancelled; rolling back");
                handle.spawn(async move {
                    let report = registry.unregister_plugin(&plugin).await;
                    if !report.is_complete() {
                        warn!(
                            plugin = %plugin,
                            failed = report.failed.len(),
                            "cancelled install left components behind"
                        );
                    }
                });
            }
            Err(_) => {
                warn!(plugin = %plugin, "install cancelled outside a runtime; rollback skipped");
            }
        }
    }
}

impl Installer {
    pub fn new(registry: Arc<ComponentRegistry>) -> Self {
        Self { registry }
    }

    pub async fn install(&self, bundle: InstallBundle) -> InstallReport {
        let plugin = bundle.descriptor.name.clone();
        let mut report = InstallReport {
            plugin: plugin.clone(),
            registered: Vec::new(),
            outcome: InstallOutcome::Installed,
        };

        if let Err(e) = self.registry.try_register_plugin(bundle.descriptor).await {
            warn!(plugin = %plugin, error = %e, "plugin install rejected");
            report.outcome = InstallOutcome::Rejected {
                reason: e.to_string(),
            };
            return report;
        }

        let mut guard = RollbackGuard {
            registry: Arc::clone(&self.registry),
            plugin: plugin.clone(),
            armed: true,
        };

        for (info, payload) in bundle.components {
            let declared = info.id();
            match self.registry.try_register_component(info, payload).await {
                Ok(id) => report.registered.push(id),
                Err(e) => {
                    guard.disarm();
                    warn!(
                        plugin = %plugin,
                        component = %declared,
                        error = %e,
                        "component install failed; rolling back"
                    );
                    let teardown = self.registry.unregister_plugin(&plugin).await;
                    if !teardown.is_complete() {
                        warn!(
                            plugin = %plugin,
                            failed = teardown.failed.len(),
                            "rollback left components behind"
                        );
                    }
                    report.outcome = InstallOutcome::RolledBack {
                        failed: declared,
                        reason: e.to_string(),
                    };
                    return report;
                }
            }
        }

        guard.disarm();
        info!(plugin = %plugin, components = report.registered.len(), "plugin installed");
        report
    }
}
