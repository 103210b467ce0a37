// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(dead_code)]

use std::sync::Arc;

use hearth_core::{ComponentInfo, ComponentKind, ComponentPayload, ToolDiscovery};
use hearth_registry::{ComponentRegistry, PluginDescriptor, RegistrySettings};
use hearth_test_utils::{RecordingBus, RecordingMount};

pub struct Harness {
    pub registry: Arc<ComponentRegistry>,
    pub bus: Arc<RecordingBus>,
    pub mount: Arc<RecordingMount>,
}

pub fn settings() -> RegistrySettings {
    RegistrySettings {
        plugin_config_dir: "/nonexistent/hearth-tests".into(),
        ..RegistrySettings::default()
    }
}

pub fn harness() -> Harness {
    build(settings(), None)
}

pub fn harness_with(settings: RegistrySettings) -> Harness {
    build(settings, None)
}

pub fn harness_discovering(
    settings: RegistrySettings,
    discovery: Arc<dyn ToolDiscovery>,
) -> Harness {
    build(settings, Some(discovery))
}

fn build(settings: RegistrySettings, discovery: Option<Arc<dyn ToolDiscovery>>) -> Harness {
    let bus = Arc::new(RecordingBus::new());
    let mount = Arc::new(RecordingMount::new());
    let mut builder = ComponentRegistry::builder(settings, bus.clone(), mount.clone());
    if let Some(discovery) = discovery {
        builder = builder.discovery(discovery);
    }
    Harness {
        registry: Arc::new(builder.build()),
        bus,
        mount,
    }
}

/// Register a plugin declaring `components`.
pub async fn plugin(
    registry: &ComponentRegistry,
    name: &str,
    components: &[(ComponentKind, &str)],
) {
    let descriptor = components
        .iter()
        .fold(PluginDescriptor::new(name, "0.1.0"), |d, (kind, n)| {
            d.with_component(*kind, *n)
        });
    assert!(registry.register_plugin(descriptor).await, "plugin {name}");
}

pub async fn register(
    registry: &ComponentRegistry,
    plugin: &str,
    name: &str,
    kind: ComponentKind,
    payload: ComponentPayload,
) -> bool {
    registry
        .register_component(ComponentInfo::new(name, kind, plugin), payload)
        .await
        .unwrap()
}
