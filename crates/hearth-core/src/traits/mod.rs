// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for component kinds and the registry's collaborators.
//!
//! Component-kind traits use `#[async_trait]` wherever a call may await so
//! payloads can be stored as `Arc<dyn Trait>`.

pub mod bus;
pub mod component;
pub mod config;
pub mod discovery;
pub mod mount;

pub use bus::EventBus;
pub use component::{
    ActionComponent, ActionOutcome, ChatterComponent, CommandArgs, CommandComponent,
    CommandReply, EventHandlerComponent, HostEvent, InterestCalculatorComponent,
    PlusCommandComponent, PromptComponent, RouterComponent, ToolComponent, ToolOutput,
};
pub use config::PluginConfigProvider;
pub use discovery::ToolDiscovery;
pub use mount::HttpMount;
