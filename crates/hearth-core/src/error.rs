// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Hearth plugin host.

use thiserror::Error;

use crate::types::NamespacedId;

/// The primary error type used across the registry and its collaborators.
///
/// Every variant except [`HearthError::Internal`] describes an expected
/// condition that the registry recovers from locally.
#[derive(Debug, Error)]
pub enum HearthError {
    /// A component or plugin name is malformed (illegal characters, empty).
    #[error("validation error: {0}")]
    Validation(String),

    /// The namespaced id is already taken; the existing registration is untouched.
    #[error("component {id} is already registered by plugin `{owner}`")]
    Conflict { id: NamespacedId, owner: String },

    /// A plugin with this name is already in the ledger.
    #[error("plugin `{0}` is already registered")]
    DuplicatePlugin(String),

    /// A kind-specific registration side effect failed.
    #[error("dispatch failed for {id}: {message}")]
    Dispatch {
        id: NamespacedId,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A kind-specific unregistration side effect failed.
    #[error("teardown failed for {id}: {message}")]
    Teardown { id: NamespacedId, message: String },

    /// A plugin uninstall left some of its components registered.
    #[error(
        "plugin `{plugin}` was only partially torn down ({} component(s) failed)",
        failed.len()
    )]
    PartialCascade {
        plugin: String,
        failed: Vec<NamespacedId>,
    },

    /// The requested component or plugin does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An external collaborator call (event bus, HTTP mount, discovery) failed.
    #[error("collaborator error: {message}")]
    Collaborator {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An external collaborator call did not finish in time.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Configuration errors (invalid plugin config file, bad manifest).
    #[error("configuration error: {0}")]
    Config(String),

    /// A broken registry invariant. Never produced for expected conditions.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HearthError {
    /// Shorthand for a collaborator failure without an underlying source.
    pub fn collaborator(message: impl Into<String>) -> Self {
        Self::Collaborator {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true for every condition the registry recovers from locally.
    ///
    /// Only [`HearthError::Internal`] is unexpected.
    pub fn is_expected(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }
}
