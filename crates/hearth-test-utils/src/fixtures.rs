// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Minimal component implementations for every kind.

use std::sync::Arc;

use async_trait::async_trait;
use axum::routing::get;
use hearth_core::{
    ActionComponent, ActionOutcome, ChatterComponent, CommandArgs, CommandComponent,
    CommandReply, ComponentContext, ComponentPayload, EventHandlerComponent, HearthError,
    HostEvent, InterestCalculatorComponent, PlusCommandComponent, PromptComponent,
    RouterComponent, SessionId, ToolComponent, ToolOutput,
};

/// Action that greets whoever is named in `input["name"]`.
pub struct GreetAction;

#[async_trait]
impl ActionComponent for GreetAction {
    async fn execute(
        &self,
        _ctx: &ComponentContext,
        input: serde_json::Value,
    ) -> Result<ActionOutcome, HearthError> {
        let name = input["name"].as_str().unwrap_or("there");
        Ok(ActionOutcome {
            success: true,
            message: format!("hello, {name}"),
        })
    }
}

/// Tool that echoes its input as text.
pub struct EchoTool {
    name: String,
}

impl EchoTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl ToolComponent for EchoTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Echoes its input"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object"})
    }

    async fn invoke(
        &self,
        _ctx: &ComponentContext,
        input: serde_json::Value,
    ) -> Result<ToolOutput, HearthError> {
        Ok(ToolOutput {
            content: input.to_string(),
            is_error: false,
        })
    }
}

/// Handler that accepts every event and does nothing.
pub struct NoopHandler;

#[async_trait]
impl EventHandlerComponent for NoopHandler {
    fn event_types(&self) -> Vec<String> {
        Vec::new()
    }

    async fn handle(&self, _ctx: &ComponentContext, _event: &HostEvent) -> Result<(), HearthError> {
        Ok(())
    }
}

/// Router serving `GET /ping`.
pub struct PingRouter;

#[async_trait]
impl RouterComponent for PingRouter {
    async fn build_routes(&self, _ctx: &ComponentContext) -> Result<axum::Router, HearthError> {
        Ok(axum::Router::new().route("/ping", get(|| async { "pong" })))
    }
}

/// Router whose route table can never be built.
pub struct BrokenRouter;

#[async_trait]
impl RouterComponent for BrokenRouter {
    async fn build_routes(&self, _ctx: &ComponentContext) -> Result<axum::Router, HearthError> {
        Err(HearthError::collaborator("route table unavailable"))
    }
}

/// Legacy command matching `^ping`.
pub struct PingCommand;

#[async_trait]
impl CommandComponent for PingCommand {
    fn pattern(&self) -> &str {
        "^ping"
    }

    async fn execute(
        &self,
        _ctx: &ComponentContext,
        text: &str,
    ) -> Result<CommandReply, HearthError> {
        Ok(CommandReply {
            text: format!("pong: {text}"),
            intercept: true,
        })
    }
}

/// Plus-command that replies with its arguments.
pub struct EchoCommand {
    name: String,
}

#[async_trait]
impl PlusCommandComponent for EchoCommand {
    fn command_name(&self) -> &str {
        &self.name
    }

    async fn execute(
        &self,
        _ctx: &ComponentContext,
        args: CommandArgs,
    ) -> Result<CommandReply, HearthError> {
        Ok(CommandReply {
            text: args.args.join(" "),
            intercept: false,
        })
    }
}

/// Chatter that never speaks.
pub struct QuietChatter;

#[async_trait]
impl ChatterComponent for QuietChatter {
    async fn respond(
        &self,
        _ctx: &ComponentContext,
        _session: &SessionId,
        _message: &str,
    ) -> Result<Option<String>, HearthError> {
        Ok(None)
    }
}

/// Interest calculator returning a constant score.
pub struct FlatInterest(pub f32);

#[async_trait]
impl InterestCalculatorComponent for FlatInterest {
    async fn score(&self, _ctx: &ComponentContext, _message: &str) -> Result<f32, HearthError> {
        Ok(self.0)
    }
}

/// Prompt rendering a fixed string.
pub struct StaticPrompt(pub &'static str);

impl PromptComponent for StaticPrompt {
    fn render(
        &self,
        _ctx: &ComponentContext,
        _vars: &serde_json::Value,
    ) -> Result<String, HearthError> {
        Ok(self.0.to_string())
    }
}

pub fn action_payload() -> ComponentPayload {
    ComponentPayload::Action(Arc::new(GreetAction))
}

pub fn echo_tool(name: &str) -> Arc<dyn ToolComponent> {
    Arc::new(EchoTool::new(name))
}

pub fn tool_payload(name: &str) -> ComponentPayload {
    ComponentPayload::Tool(echo_tool(name))
}

pub fn handler_payload() -> ComponentPayload {
    ComponentPayload::EventHandler(Arc::new(NoopHandler))
}

pub fn router_payload() -> ComponentPayload {
    ComponentPayload::Router(Arc::new(PingRouter))
}

pub fn failing_router_payload() -> ComponentPayload {
    ComponentPayload::Router(Arc::new(BrokenRouter))
}

pub fn command_payload() -> ComponentPayload {
    ComponentPayload::Command(Arc::new(PingCommand))
}

pub fn plus_command_payload(name: &str) -> ComponentPayload {
    ComponentPayload::PlusCommand(Arc::new(EchoCommand {
        name: name.to_string(),
    }))
}

pub fn chatter_payload() -> ComponentPayload {
    ComponentPayload::Chatter(Arc::new(QuietChatter))
}

pub fn interest_payload(score: f32) -> ComponentPayload {
    ComponentPayload::InterestCalculator(Arc::new(FlatInterest(score)))
}

pub fn prompt_payload(text: &'static str) -> ComponentPayload {
    ComponentPayload::Prompt(Arc::new(StaticPrompt(text)))
}
