// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP mount contract.

use async_trait::async_trait;

use crate::error::HearthError;

/// Mount point for plugin-supplied routes.
///
/// There is deliberately no unmount: once served, a route table stays until
/// the host restarts.
#[async_trait]
pub trait HttpMount: Send + Sync + 'static {
    async fn mount(
        &self,
        routes: axum::Router,
        prefix: &str,
        tags: &[String],
    ) -> Result<(), HearthError>;
}
