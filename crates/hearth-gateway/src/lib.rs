// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP host for the Hearth plugin host.
//!
//! Serves the registry admin API under `/v1` and implements [`HttpMount`] so
//! router components can be mounted into the running server. Everything
//! outside `/v1` falls through to the [`MountTable`].
//!
//! [`HttpMount`]: hearth_core::HttpMount

pub mod handlers;
pub mod mount;
pub mod server;

pub use mount::MountTable;
pub use server::{GatewayState, ServerConfig, build_app, start_server};
