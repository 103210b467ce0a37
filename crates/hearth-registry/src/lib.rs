// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Component registry for the Hearth plugin host.
//!
//! Plugins register typed components (actions, tools, commands, event
//! handlers, routers, ...) here. The registry indexes them by kind, runs the
//! kind-specific side effects through a strategy table, tracks plugin
//! ownership for cascading uninstall, layers per-session enable/disable
//! overrides on top, and merges externally discovered tools on first use.

pub mod catalog;
pub mod config_provider;
pub mod dispatch;
pub mod external;
pub mod index;
pub mod install;
pub mod ledger;
pub mod manifest;
pub mod overrides;
pub mod registry;
pub mod settings;

pub use catalog::{HOST_PLUGIN, host_plugin};
pub use config_provider::FilePluginConfigProvider;
pub use dispatch::{DispatchTable, DispatchTarget, KindStrategy, LegacyCommandAdapter};
pub use external::{
    DISCOVERED_TOOL_PREFIX, EXTERNAL_TOOLS_PLUGIN, ExternalToolLoader, is_discovered_tool,
};
pub use index::SecondaryIndex;
pub use install::{InstallBundle, InstallOutcome, InstallReport, Installer};
pub use ledger::{PluginDescriptor, PluginRecord, TeardownReport};
pub use manifest::{ComponentDeclaration, PluginManifest, parse_plugin_manifest};
pub use overrides::{SessionOverrideStore, resolve_availability};
pub use registry::{
    ActiveComponent, ComponentLookup, ComponentRegistry, RegistryBuilder, RegistryStats,
};
pub use settings::RegistrySettings;
