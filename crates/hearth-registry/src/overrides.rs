// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session enable/disable overlay.
//!
//! Overrides never touch the primary registry map. They live behind their
//! own lock and are only meaningful for kinds that accept them.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use hearth_core::{ComponentKind, NamespacedId, SessionId};

/// The availability resolution order, given what the registry knows.
///
/// 1. a missing component is never available;
/// 2. kinds that refuse overrides report their persistent flag;
/// 3. a session override wins when present;
/// 4. otherwise the persistent flag.
pub fn resolve_availability(
    kind: ComponentKind,
    persistent: Option<bool>,
    session_override: Option<bool>,
) -> bool {
    let Some(persistent) = persistent else {
        return false;
    };
    if !kind.accepts_session_override() {
        return persistent;
    }
    session_override.unwrap_or(persistent)
}

/// Session id -> (component id -> enabled).
#[derive(Debug, Default)]
pub struct SessionOverrideStore {
    sessions: RwLock<HashMap<SessionId, HashMap<NamespacedId, bool>>>,
}

impl SessionOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an override. Returns false, storing nothing, for kinds that
    /// refuse overrides.
    pub fn set(&self, session: &SessionId, id: NamespacedId, enabled: bool) -> bool {
        if !id.kind.accepts_session_override() {
            return false;
        }
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(session.clone())
            .or_default()
            .insert(id, enabled);
        true
    }

    pub fn get(&self, session: &SessionId, id: &NamespacedId) -> Option<bool> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session)
            .and_then(|overrides| overrides.get(id).copied())
    }

    /// Ends a session. Returns how many overrides it held.
    pub fn clear_session(&self, session: &SessionId) -> usize {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session)
            .map_or(0, |overrides| overrides.len())
    }

    /// Drops every session's override for a component that left the registry.
    pub fn purge(&self, id: &NamespacedId) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let mut purged = 0;
        sessions.retain(|_, overrides| {
            if overrides.remove(id).is_some() {
                purged += 1;
            }
            !overrides.is_empty()
        });
        purged
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Overrides recorded for a session, sorted by component id.
    pub fn session_overrides(&self, session: &SessionId) -> Vec<(NamespacedId, bool)> {
        let mut entries: Vec<_> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session)
            .map(|overrides| overrides.iter().map(|(id, on)| (id.clone(), *on)).collect())
            .unwrap_or_default();
        entries.sort();
        entries
    }
}
