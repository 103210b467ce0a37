// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in plugin catalog.
//!
//! The `host` plugin is compiled into the binary. It contributes a `status`
//! router (served at `{plugin_prefix}/host/status`) and an `echo` tool.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Json;
use axum::routing::get;
use hearth_core::{
    ComponentContext, ComponentInfo, ComponentKind, ComponentPayload, HearthError,
    RouterComponent, ToolComponent, ToolOutput,
};

use crate::install::InstallBundle;
use crate::ledger::PluginDescriptor;

/// Name of the built-in plugin.
pub const HOST_PLUGIN: &str = "host";

/// Install bundle for the built-in `host` plugin.
pub fn host_plugin(host_name: &str) -> InstallBundle {
    let mut descriptor = PluginDescriptor::new(HOST_PLUGIN, env!("CARGO_PKG_VERSION"))
        .with_description("Built-in host endpoints and tools")
        .with_config(serde_json::json!({ "host_name": host_name }));
    descriptor.author = Some("Hearth Contributors".to_string());

    InstallBundle::new(descriptor)
        .with_component(
            ComponentInfo::new("status", ComponentKind::Router, HOST_PLUGIN)
                .with_description("Host liveness endpoint"),
            ComponentPayload::Router(Arc::new(StatusRouter)),
        )
        .with_component(
            ComponentInfo::new("echo", ComponentKind::Tool, HOST_PLUGIN)
                .with_description("Returns its `text` argument unchanged"),
            ComponentPayload::Tool(Arc::new(EchoTool)),
        )
}

/// `GET /status` under the host plugin's prefix.
pub struct StatusRouter;

#[async_trait]
impl RouterComponent for StatusRouter {
    async fn build_routes(&self, ctx: &ComponentContext) -> Result<axum::Router, HearthError> {
        let host_name = ctx
            .config_value("/host_name")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("hearth")
            .to_string();
        let body = serde_json::json!({
            "status": "ok",
            "host": host_name,
            "version": env!("CARGO_PKG_VERSION"),
        });
        Ok(axum::Router::new().route(
            "/status",
            get(move || {
                let body = body.clone();
                async move { Json(body) }
            }),
        ))
    }
}

pub struct EchoTool;

#[async_trait]
impl ToolComponent for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Returns its `text` argument unchanged"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": { "text": { "type": "string" } },
            "required": ["text"]
        })
    }

    async fn invoke(
        &self,
        _ctx: &ComponentContext,
        input: serde_json::Value,
    ) -> Result<ToolOutput, HearthError> {
        match input.get("text").and_then(serde_json::Value::as_str) {
            Some(text) => Ok(ToolOutput {
                content: text.to_string(),
                is_error: false,
            }),
            None => Ok(ToolOutput {
                content: "missing required argument `text`".to_string(),
                is_error: true,
            }),
        }
    }
}
