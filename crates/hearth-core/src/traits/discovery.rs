// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External tool discovery contract.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HearthError;
use crate::traits::component::ToolComponent;

/// Source of externally supplied tools (e.g. remote tool servers).
///
/// Discovery may be slow; the registry calls it at most once per process
/// unless explicitly reset.
#[async_trait]
pub trait ToolDiscovery: Send + Sync + 'static {
    async fn discover(&self) -> Result<Vec<Arc<dyn ToolComponent>>, HearthError>;
}
