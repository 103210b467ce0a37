// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Kind-specific component payloads.

use std::fmt;
use std::sync::Arc;

use crate::traits::{
    ActionComponent, ChatterComponent, CommandComponent, EventHandlerComponent,
    InterestCalculatorComponent, PlusCommandComponent, PromptComponent, RouterComponent,
    ToolComponent,
};
use crate::types::ComponentKind;

/// The behavior object registered alongside a [`crate::ComponentInfo`].
///
/// The variant must agree with `ComponentInfo::kind`; the registry rejects a
/// mismatch at registration.
#[derive(Clone)]
pub enum ComponentPayload {
    Action(Arc<dyn ActionComponent>),
    Command(Arc<dyn CommandComponent>),
    PlusCommand(Arc<dyn PlusCommandComponent>),
    Tool(Arc<dyn ToolComponent>),
    EventHandler(Arc<dyn EventHandlerComponent>),
    Chatter(Arc<dyn ChatterComponent>),
    InterestCalculator(Arc<dyn InterestCalculatorComponent>),
    Prompt(Arc<dyn PromptComponent>),
    Router(Arc<dyn RouterComponent>),
}

impl ComponentPayload {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Action(_) => ComponentKind::Action,
            Self::Command(_) => ComponentKind::Command,
            Self::PlusCommand(_) => ComponentKind::PlusCommand,
            Self::Tool(_) => ComponentKind::Tool,
            Self::EventHandler(_) => ComponentKind::EventHandler,
            Self::Chatter(_) => ComponentKind::Chatter,
            Self::InterestCalculator(_) => ComponentKind::InterestCalculator,
            Self::Prompt(_) => ComponentKind::Prompt,
            Self::Router(_) => ComponentKind::Router,
        }
    }

    pub fn as_action(&self) -> Option<Arc<dyn ActionComponent>> {
        match self {
            Self::Action(a) => Some(Arc::clone(a)),
            _ => None,
        }
    }

    pub fn as_tool(&self) -> Option<Arc<dyn ToolComponent>> {
        match self {
            Self::Tool(t) => Some(Arc::clone(t)),
            _ => None,
        }
    }

    pub fn as_plus_command(&self) -> Option<Arc<dyn PlusCommandComponent>> {
        match self {
            Self::PlusCommand(c) => Some(Arc::clone(c)),
            _ => None,
        }
    }

    pub fn as_event_handler(&self) -> Option<Arc<dyn EventHandlerComponent>> {
        match self {
            Self::EventHandler(h) => Some(Arc::clone(h)),
            _ => None,
        }
    }

    pub fn as_chatter(&self) -> Option<Arc<dyn ChatterComponent>> {
        match self {
            Self::Chatter(c) => Some(Arc::clone(c)),
            _ => None,
        }
    }

    pub fn as_interest_calculator(&self) -> Option<Arc<dyn InterestCalculatorComponent>> {
        match self {
            Self::InterestCalculator(c) => Some(Arc::clone(c)),
            _ => None,
        }
    }

    pub fn as_prompt(&self) -> Option<Arc<dyn PromptComponent>> {
        match self {
            Self::Prompt(p) => Some(Arc::clone(p)),
            _ => None,
        }
    }

    pub fn as_router(&self) -> Option<Arc<dyn RouterComponent>> {
        match self {
            Self::Router(r) => Some(Arc::clone(r)),
            _ => None,
        }
    }
}

impl fmt::Debug for ComponentPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentPayload::{}", self.kind())
    }
}
