// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end registry behavior: registration, lookup, toggling, and
//! per-kind side effects.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use common::{harness, harness_with, plugin, register, settings};
use hearth_core::{
    CommandArgs, ComponentInfo, ComponentKind, ComponentPayload, HearthError, NamespacedId,
    PluginConfigProvider, SessionId,
};
use hearth_registry::{
    ComponentRegistry, FilePluginConfigProvider, PluginDescriptor, RegistrySettings,
};
use hearth_test_utils::{RecordingBus, RecordingMount, fixtures};

#[tokio::test]
async fn duplicate_registration_keeps_the_first_payload() {
    let h = harness();
    plugin(&h.registry, "demo", &[(ComponentKind::Tool, "lookup")]).await;
    plugin(&h.registry, "rival", &[(ComponentKind::Tool, "lookup")]).await;

    let payload = fixtures::tool_payload("first");
    assert!(register(&h.registry, "demo", "lookup", ComponentKind::Tool, payload).await);
    let payload = fixtures::tool_payload("second");
    assert!(!register(&h.registry, "rival", "lookup", ComponentKind::Tool, payload).await);

    let err = h
        .registry
        .try_register_component(
            ComponentInfo::new("lookup", ComponentKind::Tool, "rival"),
            fixtures::tool_payload("second"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HearthError::Conflict { ref owner, .. } if owner == "demo"));

    let info = h.registry.get_component_info(("lookup", ComponentKind::Tool)).await.unwrap();
    assert_eq!(info.plugin_name, "demo");
    let payload = h.registry.get_component_payload("tool.lookup").await.unwrap();
    assert_eq!(payload.as_tool().unwrap().name(), "first");
    h.registry.check_invariants().await.unwrap();
}

#[tokio::test]
async fn removed_components_leave_no_index_trace() {
    let h = harness();
    plugin(
        &h.registry,
        "demo",
        &[(ComponentKind::Action, "greet"), (ComponentKind::EventHandler, "on_msg")],
    )
    .await;
    let payload = fixtures::action_payload();
    assert!(register(&h.registry, "demo", "greet", ComponentKind::Action, payload).await);
    let payload = fixtures::handler_payload();
    assert!(register(&h.registry, "demo", "on_msg", ComponentKind::EventHandler, payload).await);
    assert_eq!(h.registry.active_subscriptions().await, vec!["on_msg"]);

    assert!(h.registry.remove_component("greet", ComponentKind::Action, "demo").await.unwrap());
    assert!(
        h.registry
            .remove_component("on_msg", ComponentKind::EventHandler, "demo")
            .await
            .unwrap()
    );

    assert!(h.registry.enabled_pool(ComponentKind::Action).await.is_empty());
    assert!(h.registry.enabled_pool(ComponentKind::EventHandler).await.is_empty());
    assert!(h.registry.active_subscriptions().await.is_empty());
    assert!(h.registry.get_components_by_type(ComponentKind::Action).await.is_empty());
    assert!(h.bus.subscribed().is_empty());
    assert!(!h.registry.remove_component("greet", ComponentKind::Action, "demo").await.unwrap());
    h.registry.check_invariants().await.unwrap();
}

#[tokio::test]
async fn demo_greet_session_scenario() {
    let h = harness();
    let s1 = SessionId::from("s1");
    let s2 = SessionId::from("s2");
    plugin(&h.registry, "demo", &[(ComponentKind::Action, "greet")]).await;
    let payload = fixtures::action_payload();
    assert!(register(&h.registry, "demo", "greet", ComponentKind::Action, payload).await);

    assert!(h.registry.is_available("greet", ComponentKind::Action, None).await);
    assert!(h.registry.set_local_component_state(&s1, "greet", ComponentKind::Action, false).await);

    assert!(!h.registry.is_available("greet", ComponentKind::Action, Some(&s1)).await);
    assert!(h.registry.is_available("greet", ComponentKind::Action, Some(&s2)).await);
    assert!(h.registry.is_available("greet", ComponentKind::Action, None).await);
    assert!(
        h.registry
            .get_enabled_components_by_type(ComponentKind::Action, Some(&s1))
            .await
            .is_empty()
    );
    assert_eq!(h.registry.available_actions(Some(&s2)).await.len(), 1);

    assert_eq!(h.registry.clear_session(&s1), 1);
    assert!(h.registry.is_available("greet", ComponentKind::Action, Some(&s1)).await);

    let report = h.registry.unregister_plugin("demo").await;
    assert!(report.is_complete());
    assert_eq!(report.removed, vec![NamespacedId::new(ComponentKind::Action, "greet")]);
    assert!(h.registry.get_component_info("greet").await.is_none());
    let stats = h.registry.get_registry_stats().await;
    assert_eq!(stats.total_plugins, 0);
    assert_eq!(stats.total_components, 0);
}

#[tokio::test]
async fn session_override_can_enable_a_disabled_component() {
    let h = harness();
    let s1 = SessionId::from("s1");
    plugin(&h.registry, "demo", &[(ComponentKind::Tool, "lookup")]).await;
    h.registry
        .register_component(
            ComponentInfo::new("lookup", ComponentKind::Tool, "demo").with_enabled(false),
            fixtures::tool_payload("lookup"),
        )
        .await
        .unwrap();

    assert!(h.registry.available_tools(None).await.is_empty());
    assert!(h.registry.set_local_component_state(&s1, "lookup", ComponentKind::Tool, true).await);
    let tools = h.registry.available_tools(Some(&s1)).await;
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].info.name, "lookup");
    assert!(h.registry.available_tools(None).await.is_empty());
}

#[tokio::test]
async fn overrides_vanish_with_their_component() {
    let h = harness();
    let s1 = SessionId::from("s1");
    plugin(&h.registry, "demo", &[(ComponentKind::Action, "greet")]).await;
    register(&h.registry, "demo", "greet", ComponentKind::Action, fixtures::action_payload()).await;
    assert!(h.registry.set_local_component_state(&s1, "greet", ComponentKind::Action, false).await);

    h.registry.remove_component("greet", ComponentKind::Action, "demo").await.unwrap();
    assert!(h.registry.session_overrides(&s1).is_empty());

    register(&h.registry, "demo", "greet", ComponentKind::Action, fixtures::action_payload()).await;
    assert!(h.registry.is_available("greet", ComponentKind::Action, Some(&s1)).await);
}

#[tokio::test]
async fn no_override_kinds_refuse_session_state() {
    let h = harness();
    let s1 = SessionId::from("s1");
    plugin(
        &h.registry,
        "demo",
        &[
            (ComponentKind::Router, "api"),
            (ComponentKind::EventHandler, "on_msg"),
            (ComponentKind::Prompt, "persona"),
        ],
    )
    .await;
    register(&h.registry, "demo", "api", ComponentKind::Router, fixtures::router_payload()).await;
    let payload = fixtures::handler_payload();
    register(&h.registry, "demo", "on_msg", ComponentKind::EventHandler, payload).await;
    let payload = fixtures::prompt_payload("be kind");
    register(&h.registry, "demo", "persona", ComponentKind::Prompt, payload).await;

    for (name, kind) in [
        ("api", ComponentKind::Router),
        ("on_msg", ComponentKind::EventHandler),
        ("persona", ComponentKind::Prompt),
    ] {
        assert!(!h.registry.set_local_component_state(&s1, name, kind, false).await);
        assert!(h.registry.is_available(name, kind, Some(&s1)).await);
    }
    assert!(h.registry.session_overrides(&s1).is_empty());
    assert_eq!(h.registry.get_registry_stats().await.active_sessions, 0);
}

#[tokio::test]
async fn overrides_for_unknown_components_are_refused() {
    let h = harness();
    let s1 = SessionId::from("s1");
    assert!(!h.registry.set_local_component_state(&s1, "ghost", ComponentKind::Action, true).await);
    assert!(!h.registry.is_available("ghost", ComponentKind::Action, Some(&s1)).await);
}

#[tokio::test]
async fn registration_requires_a_declaring_plugin() {
    let h = harness();
    let payload = fixtures::action_payload();
    assert!(!register(&h.registry, "nobody", "greet", ComponentKind::Action, payload).await);

    plugin(&h.registry, "demo", &[(ComponentKind::Action, "greet")]).await;
    let payload = fixtures::action_payload();
    assert!(!register(&h.registry, "demo", "wave", ComponentKind::Action, payload).await);
    let payload = fixtures::tool_payload("greet");
    assert!(!register(&h.registry, "demo", "greet", ComponentKind::Action, payload).await);
    let payload = fixtures::action_payload();
    assert!(!register(&h.registry, "demo", "gr.eet", ComponentKind::Action, payload).await);
    assert_eq!(h.registry.get_registry_stats().await.total_components, 0);

    let err = h
        .registry
        .try_register_component(
            ComponentInfo::new("wave", ComponentKind::Action, "demo"),
            fixtures::action_payload(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HearthError::Validation(_)));
}

#[tokio::test]
async fn plugin_names_are_validated_and_unique() {
    let h = harness();
    assert!(h.registry.register_plugin(PluginDescriptor::new("demo", "0.1.0")).await);
    assert!(!h.registry.register_plugin(PluginDescriptor::new("demo", "0.2.0")).await);
    assert!(!h.registry.register_plugin(PluginDescriptor::new("a.b", "0.1.0")).await);
    assert!(!h.registry.register_plugin(PluginDescriptor::new("external_tools", "0.1.0")).await);
    assert!(
        !h.registry
            .register_plugin(
                PluginDescriptor::new("twice", "0.1.0")
                    .with_component(ComponentKind::Command, "ping")
                    .with_component(ComponentKind::PlusCommand, "ping")
            )
            .await
    );
    assert_eq!(h.registry.get_all_plugins().await.len(), 1);
}

#[tokio::test]
async fn legacy_commands_register_as_plus_commands() {
    let h = harness();
    plugin(&h.registry, "demo", &[(ComponentKind::Command, "ping")]).await;
    let payload = fixtures::command_payload();
    assert!(register(&h.registry, "demo", "ping", ComponentKind::Command, payload).await);

    let info = h.registry.get_component_info(("ping", ComponentKind::Command)).await.unwrap();
    assert_eq!(info.kind, ComponentKind::PlusCommand);
    assert!(h.registry.get_components_by_type(ComponentKind::Command).await.contains_key("ping"));

    let commands = h.registry.available_plus_commands(None).await;
    assert_eq!(commands.len(), 1);
    let reply = commands[0]
        .component
        .execute(&commands[0].ctx, CommandArgs::parse("ping now"))
        .await
        .unwrap();
    assert_eq!(reply.text, "pong: ping now");

    assert!(h.registry.remove_component("ping", ComponentKind::Command, "demo").await.unwrap());
    h.registry.check_invariants().await.unwrap();
}

#[tokio::test]
async fn event_handlers_subscribe_while_enabled() {
    let h = harness();
    plugin(&h.registry, "demo", &[(ComponentKind::EventHandler, "on_msg")]).await;
    h.registry
        .register_component(
            ComponentInfo::new("on_msg", ComponentKind::EventHandler, "demo").with_enabled(false),
            fixtures::handler_payload(),
        )
        .await
        .unwrap();
    assert!(h.bus.subscribe_calls().is_empty());

    assert!(h.registry.enable_component("on_msg", ComponentKind::EventHandler).await.unwrap());
    assert_eq!(h.bus.subscribed(), vec!["on_msg"]);
    assert_eq!(h.registry.enabled_event_handlers().await.len(), 1);

    assert!(h.registry.disable_component("on_msg", ComponentKind::EventHandler).await.unwrap());
    assert!(h.bus.subscribed().is_empty());
    assert!(h.registry.enabled_event_handlers().await.is_empty());
    h.registry.check_invariants().await.unwrap();
}

#[tokio::test]
async fn refused_subscription_rolls_back_registration() {
    let h = harness();
    h.bus.refuse_subscribe("on_msg");
    plugin(&h.registry, "demo", &[(ComponentKind::EventHandler, "on_msg")]).await;
    let payload = fixtures::handler_payload();
    assert!(!register(&h.registry, "demo", "on_msg", ComponentKind::EventHandler, payload).await);
    assert!(h.registry.get_component_info("event_handler.on_msg").await.is_none());
    h.registry.check_invariants().await.unwrap();
}

#[tokio::test]
async fn routers_mount_once_and_cannot_be_toggled() {
    let h = harness();
    plugin(&h.registry, "demo", &[(ComponentKind::Router, "api")]).await;
    let payload = fixtures::router_payload();
    assert!(register(&h.registry, "demo", "api", ComponentKind::Router, payload).await);
    assert_eq!(h.mount.mounts(), vec![("/plugins/demo".to_string(), vec!["demo".to_string()])]);

    assert!(!h.registry.disable_component("api", ComponentKind::Router).await.unwrap());
    assert!(!h.registry.enable_component("api", ComponentKind::Router).await.unwrap());
    assert!(h.registry.is_available("api", ComponentKind::Router, None).await);

    assert!(h.registry.remove_component("api", ComponentKind::Router, "demo").await.unwrap());
    assert_eq!(
        h.registry.get_registry_stats().await.pending_restart_prefixes,
        vec!["/plugins/demo"]
    );
}

#[tokio::test]
async fn router_with_broken_routes_is_not_registered() {
    let h = harness();
    plugin(&h.registry, "demo", &[(ComponentKind::Router, "api")]).await;
    let payload = fixtures::failing_router_payload();
    assert!(!register(&h.registry, "demo", "api", ComponentKind::Router, payload).await);
    assert!(h.mount.mounts().is_empty());
    assert!(h.registry.get_components_by_type(ComponentKind::Router).await.is_empty());
}

#[tokio::test]
async fn failing_mount_rolls_back_registration() {
    let h = harness();
    h.mount.fail_mounts();
    plugin(&h.registry, "demo", &[(ComponentKind::Router, "api")]).await;
    let payload = fixtures::router_payload();
    assert!(!register(&h.registry, "demo", "api", ComponentKind::Router, payload).await);
    assert!(h.registry.get_component_info("router.api").await.is_none());
    assert!(h.registry.get_registry_stats().await.pending_restart_prefixes.is_empty());
}

#[tokio::test]
async fn bare_lookup_prefers_enumeration_order() {
    let h = harness();
    plugin(
        &h.registry,
        "demo",
        &[(ComponentKind::Tool, "greet"), (ComponentKind::Action, "greet")],
    )
    .await;
    let payload = fixtures::tool_payload("greet");
    register(&h.registry, "demo", "greet", ComponentKind::Tool, payload).await;
    register(&h.registry, "demo", "greet", ComponentKind::Action, fixtures::action_payload()).await;

    let info = h.registry.get_component_info("greet").await.unwrap();
    assert_eq!(info.kind, ComponentKind::Action);
    let tool = h.registry.get_component_info("tool.greet").await.unwrap();
    assert_eq!(tool.kind, ComponentKind::Tool);
    assert!(h.registry.get_component_info("widget.greet").await.is_none());
}

#[tokio::test]
async fn stats_count_by_kind_and_state() {
    let h = harness();
    plugin(
        &h.registry,
        "demo",
        &[
            (ComponentKind::Action, "greet"),
            (ComponentKind::Tool, "lookup"),
            (ComponentKind::Chatter, "smalltalk"),
            (ComponentKind::InterestCalculator, "curiosity"),
        ],
    )
    .await;
    register(&h.registry, "demo", "greet", ComponentKind::Action, fixtures::action_payload()).await;
    let payload = fixtures::tool_payload("lookup");
    register(&h.registry, "demo", "lookup", ComponentKind::Tool, payload).await;
    let payload = fixtures::chatter_payload();
    register(&h.registry, "demo", "smalltalk", ComponentKind::Chatter, payload).await;
    let payload = fixtures::interest_payload(0.5);
    register(&h.registry, "demo", "curiosity", ComponentKind::InterestCalculator, payload).await;
    h.registry.disable_component("smalltalk", ComponentKind::Chatter).await.unwrap();

    let stats = h.registry.get_registry_stats().await;
    assert_eq!(stats.total_plugins, 1);
    assert_eq!(stats.total_components, 4);
    assert_eq!(stats.enabled_components, 3);
    assert_eq!(stats.counts_by_kind[&ComponentKind::Action], 1);
    assert_eq!(stats.counts_by_kind[&ComponentKind::Router], 0);
    assert_eq!(stats.discovered_tool_count, 0);
    assert!(h.registry.available_chatters(None).await.is_empty());
    assert_eq!(h.registry.available_interest_calculators(None).await.len(), 1);

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["counts_by_kind"]["tool"], 1);
}

#[tokio::test]
async fn descriptor_config_wins_over_provider() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("filed")).unwrap();
    std::fs::write(dir.path().join("filed").join("config.toml"), "greeting = \"hi\"\n").unwrap();

    let settings = RegistrySettings {
        plugin_config_dir: dir.path().to_path_buf(),
        ..RegistrySettings::default()
    };
    let registry = ComponentRegistry::builder(
        settings,
        Arc::new(RecordingBus::new()),
        Arc::new(RecordingMount::new()),
    )
    .config_provider(Arc::new(FilePluginConfigProvider::new(dir.path())))
    .build();

    registry
        .register_plugin(
            PluginDescriptor::new("inline", "0.1.0")
                .with_component(ComponentKind::Action, "greet")
                .with_config(serde_json::json!({"greeting": "hello"})),
        )
        .await;
    registry
        .register_plugin(
            PluginDescriptor::new("filed", "0.1.0").with_component(ComponentKind::Action, "wave"),
        )
        .await;
    registry
        .register_component(
            ComponentInfo::new("greet", ComponentKind::Action, "inline"),
            fixtures::action_payload(),
        )
        .await
        .unwrap();

    assert_eq!(registry.get_plugin_config("inline").await.unwrap()["greeting"], "hello");
    assert_eq!(registry.get_plugin_config("filed").await.unwrap()["greeting"], "hi");
    assert!(registry.get_plugin_config("absent").await.is_none());

    let actions = registry.available_actions(None).await;
    assert_eq!(actions[0].ctx.config_value("/greeting").unwrap(), "hello");
    assert_eq!(actions[0].ctx.plugin_name, "inline");
}

#[tokio::test]
async fn custom_strategy_replaces_the_stock_one() {
    use async_trait::async_trait;
    use hearth_registry::{DispatchTarget, KindStrategy, SecondaryIndex};

    struct Frozen;

    #[async_trait]
    impl KindStrategy for Frozen {
        async fn register(
            &self,
            t: &DispatchTarget,
            index: &mut SecondaryIndex,
        ) -> Result<(), HearthError> {
            index.insert_enabled(t.info.kind, &t.info.name);
            Ok(())
        }
        async fn unregister(
            &self,
            t: &DispatchTarget,
            index: &mut SecondaryIndex,
        ) -> Result<(), HearthError> {
            index.remove_enabled(t.info.kind, &t.info.name);
            Ok(())
        }
        async fn enable(
            &self,
            _: &DispatchTarget,
            _: &mut SecondaryIndex,
        ) -> Result<bool, HearthError> {
            Ok(false)
        }
        async fn disable(
            &self,
            _: &DispatchTarget,
            _: &mut SecondaryIndex,
        ) -> Result<bool, HearthError> {
            Ok(false)
        }
    }

    let registry = ComponentRegistry::builder(
        common::settings(),
        Arc::new(RecordingBus::new()),
        Arc::new(RecordingMount::new()),
    )
    .strategy(ComponentKind::Action, Arc::new(Frozen))
    .build();
    plugin(&registry, "demo", &[(ComponentKind::Action, "greet")]).await;
    register(&registry, "demo", "greet", ComponentKind::Action, fixtures::action_payload()).await;
    assert!(!registry.disable_component("greet", ComponentKind::Action).await.unwrap());
    assert!(registry.is_available("greet", ComponentKind::Action, None).await);
}

#[tokio::test]
async fn prompts_ignore_sessions_but_follow_global_state() {
    let h = harness();
    plugin(&h.registry, "demo", &[(ComponentKind::Prompt, "persona")]).await;
    let payload = fixtures::prompt_payload("be kind");
    register(&h.registry, "demo", "persona", ComponentKind::Prompt, payload).await;

    let prompts = h.registry.enabled_prompts().await;
    let rendered = prompts[0]
        .component
        .render(&prompts[0].ctx, &serde_json::Value::Null)
        .unwrap();
    assert_eq!(rendered, "be kind");

    assert!(h.registry.disable_component("persona", ComponentKind::Prompt).await.unwrap());
    assert!(h.registry.enabled_prompts().await.is_empty());
    let payload = h.registry.get_component_payload(("persona", ComponentKind::Prompt)).await;
    assert!(matches!(payload, Some(ComponentPayload::Prompt(_))));
}

#[tokio::test]
async fn router_registered_disabled_is_mounted_but_not_pooled() {
    let h = harness();
    plugin(&h.registry, "demo", &[(ComponentKind::Router, "api")]).await;

    let info = ComponentInfo::new("api", ComponentKind::Router, "demo").with_enabled(false);
    assert!(h.registry.register_component(info, fixtures::router_payload()).await.unwrap());

    assert_eq!(h.mount.mounts().len(), 1);
    assert!(h.registry.enabled_pool(ComponentKind::Router).await.is_empty());
    assert!(!h.registry.is_available("api", ComponentKind::Router, None).await);
    assert!(!h.registry.enable_component("api", ComponentKind::Router).await.unwrap());
    assert_eq!(h.mount.mounts().len(), 1);
    h.registry.check_invariants().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn cancelled_registration_leaves_no_trace() {
    let h = harness_with(RegistrySettings {
        collaborator_timeout: Duration::from_secs(3600),
        ..settings()
    });
    plugin(&h.registry, "demo", &[(ComponentKind::EventHandler, "slow")]).await;
    h.bus.hang_subscribe("slow");

    let attempt = h.registry.register_component(
        ComponentInfo::new("slow", ComponentKind::EventHandler, "demo"),
        fixtures::handler_payload(),
    );
    assert!(tokio::time::timeout(Duration::from_millis(10), attempt).await.is_err());

    assert!(h.registry.get_component_info(("slow", ComponentKind::EventHandler)).await.is_none());
    assert!(!h.registry.is_available("slow", ComponentKind::EventHandler, None).await);
    assert!(h.registry.active_subscriptions().await.is_empty());

    for _ in 0..16 {
        if !h.bus.unsubscribe_calls().is_empty() {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(h.bus.unsubscribe_calls(), vec!["slow"]);
    h.registry.check_invariants().await.unwrap();
    assert!(h.registry.get_plugin_components("demo").await.is_empty());
}

#[tokio::test]
async fn plugin_config_is_resolved_once_per_plugin() {
    struct Counting(AtomicUsize);

    impl PluginConfigProvider for Counting {
        fn get_plugin_config(&self, _plugin_name: &str) -> Option<serde_json::Value> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Some(serde_json::json!({"greeting": "howdy"}))
        }
    }

    let provider = Arc::new(Counting(AtomicUsize::new(0)));
    let registry = ComponentRegistry::builder(
        common::settings(),
        Arc::new(RecordingBus::new()),
        Arc::new(RecordingMount::new()),
    )
    .config_provider(provider.clone())
    .build();
    plugin(&registry, "demo", &[(ComponentKind::Action, "greet")]).await;
    register(&registry, "demo", "greet", ComponentKind::Action, fixtures::action_payload()).await;

    for _ in 0..5 {
        let actions = registry.available_actions(None).await;
        assert_eq!(actions[0].ctx.config_value("/greeting").unwrap(), "howdy");
    }
    let ctx = registry.get_component_context(("greet", ComponentKind::Action)).await.unwrap();
    assert_eq!(ctx.config_value("/greeting").unwrap(), "howdy");
    assert_eq!(registry.get_plugin_config("demo").await.unwrap()["greeting"], "howdy");

    assert_eq!(provider.0.load(Ordering::SeqCst), 1);
}
