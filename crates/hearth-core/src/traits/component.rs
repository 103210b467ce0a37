// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Behavior traits for each component kind.
//!
//! The registry never calls these itself beyond what registration needs
//! (building routes, subscribing handlers). Callers obtain payloads through
//! the registry's pool readers and invoke them with the component's
//! [`ComponentContext`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HearthError;
use crate::types::{ComponentContext, SessionId};

/// Result of running an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Output from a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The content returned by the tool (text output, JSON, etc.).
    pub content: String,
    /// Whether the tool invocation resulted in an error.
    pub is_error: bool,
}

/// Parsed arguments for a plus-command invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandArgs {
    /// The full text that triggered the command.
    pub raw: String,
    /// Whitespace-separated arguments after the command word.
    pub args: Vec<String>,
}

impl CommandArgs {
    /// Split `raw` after its first word into arguments.
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            args: raw.split_whitespace().skip(1).map(str::to_string).collect(),
        }
    }
}

/// What a command sends back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandReply {
    pub text: String,
    /// Whether the triggering message should stop propagating.
    #[serde(default)]
    pub intercept: bool,
}

/// An event delivered through the host event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostEvent {
    pub event_type: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl HostEvent {
    pub fn new(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
        }
    }
}

/// An action the host can decide to take during a conversation.
#[async_trait]
pub trait ActionComponent: Send + Sync + 'static {
    async fn execute(
        &self,
        ctx: &ComponentContext,
        input: serde_json::Value,
    ) -> Result<ActionOutcome, HearthError>;
}

/// A tool callable by a model.
#[async_trait]
pub trait ToolComponent: Send + Sync + 'static {
    /// Returns the tool's name as supplied by its author or discovery source.
    fn name(&self) -> &str;

    /// Returns a human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// Returns the JSON Schema describing the tool's input parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Invokes the tool with the given JSON input.
    async fn invoke(
        &self,
        ctx: &ComponentContext,
        input: serde_json::Value,
    ) -> Result<ToolOutput, HearthError>;
}

/// Legacy pattern-matched command.
///
/// Never stored as-is: the registry adapts it into a [`PlusCommandComponent`].
#[async_trait]
pub trait CommandComponent: Send + Sync + 'static {
    /// Regex-style pattern the command used to match against.
    fn pattern(&self) -> &str;

    async fn execute(&self, ctx: &ComponentContext, text: &str)
    -> Result<CommandReply, HearthError>;
}

/// Prefix-triggered command with parsed arguments.
#[async_trait]
pub trait PlusCommandComponent: Send + Sync + 'static {
    /// The command word, without the trigger prefix.
    fn command_name(&self) -> &str;

    fn aliases(&self) -> Vec<String> {
        Vec::new()
    }

    async fn execute(
        &self,
        ctx: &ComponentContext,
        args: CommandArgs,
    ) -> Result<CommandReply, HearthError>;
}

/// Handler subscribed to the host event bus while enabled.
#[async_trait]
pub trait EventHandlerComponent: Send + Sync + 'static {
    /// Event types this handler wants. An empty list means every event.
    fn event_types(&self) -> Vec<String>;

    async fn handle(&self, ctx: &ComponentContext, event: &HostEvent) -> Result<(), HearthError>;
}

/// A conversational responder.
#[async_trait]
pub trait ChatterComponent: Send + Sync + 'static {
    /// Produce a reply for `message` in `session`, or `None` to stay quiet.
    async fn respond(
        &self,
        ctx: &ComponentContext,
        session: &SessionId,
        message: &str,
    ) -> Result<Option<String>, HearthError>;
}

/// Scores how interesting a message is, in `0.0..=1.0`.
#[async_trait]
pub trait InterestCalculatorComponent: Send + Sync + 'static {
    async fn score(&self, ctx: &ComponentContext, message: &str) -> Result<f32, HearthError>;
}

/// Contributes a prompt fragment.
pub trait PromptComponent: Send + Sync + 'static {
    fn render(
        &self,
        ctx: &ComponentContext,
        vars: &serde_json::Value,
    ) -> Result<String, HearthError>;
}

/// Supplies an HTTP route table mounted under the owning plugin's prefix.
#[async_trait]
pub trait RouterComponent: Send + Sync + 'static {
    async fn build_routes(&self, ctx: &ComponentContext) -> Result<axum::Router, HearthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_args_skip_command_word() {
        let args = CommandArgs::parse("+weather berlin tomorrow");
        assert_eq!(args.args, vec!["berlin", "tomorrow"]);
        assert_eq!(args.raw, "+weather berlin tomorrow");
    }

    #[test]
    fn command_args_of_bare_command_are_empty() {
        assert!(CommandArgs::parse("+help").args.is_empty());
    }
}
