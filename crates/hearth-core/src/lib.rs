// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Hearth plugin host.
//!
//! This crate provides the error type, shared types, component-kind traits,
//! and the collaborator contracts (event bus, HTTP mount, plugin config,
//! tool discovery) that the registry is written against.

pub mod error;
pub mod payload;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::HearthError;
pub use payload::ComponentPayload;
pub use types::{
    ComponentContext, ComponentInfo, ComponentKind, ComponentOrigin, NAMESPACE_SEPARATOR,
    NamespacedId, SessionId,
};

pub use traits::{
    ActionComponent, ActionOutcome, ChatterComponent, CommandArgs, CommandComponent,
    CommandReply, EventBus, EventHandlerComponent, HostEvent, HttpMount,
    InterestCalculatorComponent, PluginConfigProvider, PlusCommandComponent, PromptComponent,
    RouterComponent, ToolComponent, ToolDiscovery, ToolOutput,
};
