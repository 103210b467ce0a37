// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording HTTP mount.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use hearth_core::{HearthError, HttpMount};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum MountMode {
    #[default]
    Accept,
    Fail,
    Hang,
}

/// Records every accepted mount as `(prefix, tags)`. Route tables are dropped.
#[derive(Default)]
pub struct RecordingMount {
    mounts: Mutex<Vec<(String, Vec<String>)>>,
    mode: Mutex<MountMode>,
}

impl RecordingMount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent mount returns an error.
    pub fn fail_mounts(&self) {
        *self.mode.lock().unwrap_or_else(PoisonError::into_inner) = MountMode::Fail;
    }

    /// Every subsequent mount never completes.
    pub fn hang_mounts(&self) {
        *self.mode.lock().unwrap_or_else(PoisonError::into_inner) = MountMode::Hang;
    }

    pub fn mounts(&self) -> Vec<(String, Vec<String>)> {
        self.mounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl HttpMount for RecordingMount {
    async fn mount(
        &self,
        _routes: axum::Router,
        prefix: &str,
        tags: &[String],
    ) -> Result<(), HearthError> {
        let mode = *self.mode.lock().unwrap_or_else(PoisonError::into_inner);
        match mode {
            MountMode::Accept => {
                self.mounts
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push((prefix.to_string(), tags.to_vec()));
                Ok(())
            }
            MountMode::Fail => Err(HearthError::collaborator(format!(
                "mount rejected for {prefix}"
            ))),
            MountMode::Hang => std::future::pending().await,
        }
    }
}
