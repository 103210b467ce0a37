// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Hearth tests.
//!
//! Provides recording collaborators and canned component payloads for fast,
//! deterministic tests without a real event bus, HTTP server, or discovery
//! source.
//!
//! # Components
//!
//! - [`RecordingBus`] - Event bus that records calls and can refuse, hang, or fail
//! - [`RecordingMount`] - HTTP mount that records prefixes and tags
//! - [`CountingDiscovery`] - Tool discovery that counts invocations
//! - [`fixtures`] - Minimal implementations of every component kind

pub mod fixtures;
pub mod mock_bus;
pub mod mock_discovery;
pub mod mock_mount;

pub use mock_bus::RecordingBus;
pub use mock_discovery::CountingDiscovery;
pub use mock_mount::RecordingMount;
