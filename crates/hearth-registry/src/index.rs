// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secondary indices maintained by kind strategies.
//!
//! Everything here is derivable from the primary component map. Strategies
//! update these sets only after the side effect they describe has actually
//! taken place.

use std::collections::{BTreeMap, BTreeSet};

use hearth_core::ComponentKind;

/// Per-kind enabled pools, live event subscriptions, and mount records.
#[derive(Debug, Default, Clone)]
pub struct SecondaryIndex {
    enabled: BTreeMap<ComponentKind, BTreeSet<String>>,
    subscriptions: BTreeSet<String>,
    /// router component name -> mounted prefix
    mounts: BTreeMap<String, String>,
    /// Prefixes whose routes stay served until restart.
    pending_restart: BTreeSet<String>,
}

impl SecondaryIndex {
    pub fn insert_enabled(&mut self, kind: ComponentKind, name: &str) {
        self.enabled.entry(kind).or_default().insert(name.to_string());
    }

    pub fn remove_enabled(&mut self, kind: ComponentKind, name: &str) {
        if let Some(pool) = self.enabled.get_mut(&kind) {
            pool.remove(name);
        }
    }

    pub fn is_enabled(&self, kind: ComponentKind, name: &str) -> bool {
        self.enabled.get(&kind).is_some_and(|pool| pool.contains(name))
    }

    /// Names in the enabled pool of `kind`, sorted.
    pub fn enabled_pool(&self, kind: ComponentKind) -> Vec<String> {
        self.enabled
            .get(&kind)
            .map(|pool| pool.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn mark_subscribed(&mut self, name: &str) {
        self.subscriptions.insert(name.to_string());
    }

    pub fn mark_unsubscribed(&mut self, name: &str) {
        self.subscriptions.remove(name);
    }

    pub fn is_subscribed(&self, name: &str) -> bool {
        self.subscriptions.contains(name)
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.subscriptions.iter().cloned().collect()
    }

    pub fn record_mount(&mut self, router: &str, prefix: &str) {
        self.pending_restart.remove(prefix);
        self.mounts.insert(router.to_string(), prefix.to_string());
    }

    pub fn mounted_prefix(&self, router: &str) -> Option<&str> {
        self.mounts.get(router).map(String::as_str)
    }

    /// The routes a router mounted can no longer be reached through the
    /// registry but keep being served by the HTTP host.
    pub fn mark_pending_restart(&mut self, router: &str, prefix: &str) {
        self.mounts.remove(router);
        self.pending_restart.insert(prefix.to_string());
    }

    pub fn pending_restart(&self) -> Vec<String> {
        self.pending_restart.iter().cloned().collect()
    }

    /// Drop every trace of a component from the enabled pools.
    pub(crate) fn forget(&mut self, kind: ComponentKind, name: &str) {
        self.remove_enabled(kind, name);
        if kind == ComponentKind::EventHandler {
            self.mark_unsubscribed(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pools_are_per_kind() {
        let mut index = SecondaryIndex::default();
        index.insert_enabled(ComponentKind::Action, "greet");
        assert!(index.is_enabled(ComponentKind::Action, "greet"));
        assert!(!index.is_enabled(ComponentKind::Tool, "greet"));
        index.remove_enabled(ComponentKind::Action, "greet");
        assert!(index.enabled_pool(ComponentKind::Action).is_empty());
    }

    #[test]
    fn pending_restart_replaces_mount_record() {
        let mut index = SecondaryIndex::default();
        index.record_mount("status", "/plugins/demo");
        assert_eq!(index.mounted_prefix("status"), Some("/plugins/demo"));
        index.mark_pending_restart("status", "/plugins/demo");
        assert!(index.mounted_prefix("status").is_none());
        assert_eq!(index.pending_restart(), vec!["/plugins/demo"]);
        index.record_mount("status", "/plugins/demo");
        assert!(index.pending_restart().is_empty());
    }
}
