//! Cross-instance coordinator: the registry of every worker's current hash
//! set and the `reacted` convergence flags the dupe rule reads and writes.
//!
//! Read-heavy; updated at worker register/unregister and once per tag tick.
//! Guarded by a single mutex rather than one lock per field, since the hot
//! path (reading another worker's hashes) is brief.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

/// Shared state every worker reports into and reads from once per tag tick.
#[derive(Debug, Default)]
pub struct Registry {
    inner: Mutex<RegistryState>,
}

#[derive(Debug, Default)]
struct RegistryState {
    hashes: BTreeMap<String, BTreeSet<String>>,
    reacted: BTreeMap<String, bool>,
    synced: BTreeMap<String, bool>,
}

impl Registry {
    /// Construct an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `worker`, starting with an empty hash set and `reacted =
    /// false`. Idempotent.
    pub fn register(&self, worker: &str) {
        let mut state = self.lock();
        state.hashes.entry(worker.to_string()).or_default();
        state.reacted.entry(worker.to_string()).or_insert(false);
        state.synced.entry(worker.to_string()).or_insert(false);
    }

    /// Remove `worker` entirely, e.g. on shutdown.
    pub fn unregister(&self, worker: &str) {
        let mut state = self.lock();
        state.hashes.remove(worker);
        state.reacted.remove(worker);
        state.synced.remove(worker);
    }

    /// Report `worker`'s current hash set and whether it has completed a
    /// first sync. If the hash set changed since the last report, every
    /// worker's `reacted` flag is cleared so the dupe rule re-evaluates.
    pub fn report_hashes(&self, worker: &str, hashes: BTreeSet<String>, synced: bool) {
        let mut state = self.lock();
        let changed = state.hashes.get(worker) != Some(&hashes);
        state.hashes.insert(worker.to_string(), hashes);
        state.synced.insert(worker.to_string(), synced);
        if changed {
            for flag in state.reacted.values_mut() {
                *flag = false;
            }
        }
    }

    /// Union of every other registered worker's current hash set.
    #[must_use]
    pub fn other_hashes(&self, worker: &str) -> BTreeSet<String> {
        let state = self.lock();
        state
            .hashes
            .iter()
            .filter(|(name, _)| name.as_str() != worker)
            .flat_map(|(_, set)| set.iter().cloned())
            .collect()
    }

    /// Whether the dupe pass should run for `worker` this tick: at least two
    /// workers are registered, `worker` has not already reacted to the
    /// current set of hashes, and every other worker has completed its
    /// first sync.
    #[must_use]
    pub fn should_react(&self, worker: &str) -> bool {
        let state = self.lock();
        if state.hashes.len() < 2 {
            return false;
        }
        if state.reacted.get(worker).copied().unwrap_or(false) {
            return false;
        }
        state
            .synced
            .iter()
            .filter(|(name, _)| name.as_str() != worker)
            .all(|(_, synced)| *synced)
    }

    /// Record that `worker` has reacted to the current cross-instance state.
    pub fn mark_reacted(&self, worker: &str) {
        self.lock().reacted.insert(worker.to_string(), true);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RegistryState> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hashes(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn should_react_requires_at_least_two_workers() {
        let registry = Registry::new();
        registry.register("a");
        registry.report_hashes("a", hashes(&["x"]), true);
        assert!(!registry.should_react("a"));
    }

    #[test]
    fn should_react_waits_for_other_workers_first_sync() {
        let registry = Registry::new();
        registry.register("a");
        registry.register("b");
        registry.report_hashes("a", hashes(&["x", "y"]), true);
        registry.report_hashes("b", hashes(&["y", "z"]), false);
        assert!(!registry.should_react("a"));

        registry.report_hashes("b", hashes(&["y", "z"]), true);
        assert!(registry.should_react("a"));
    }

    #[test]
    fn other_hashes_excludes_the_caller() {
        let registry = Registry::new();
        registry.register("a");
        registry.register("b");
        registry.report_hashes("a", hashes(&["x", "y"]), true);
        registry.report_hashes("b", hashes(&["y", "z"]), true);
        assert_eq!(registry.other_hashes("a"), hashes(&["y", "z"]));
    }

    #[test]
    fn changing_hash_set_clears_every_reacted_flag() {
        let registry = Registry::new();
        registry.register("a");
        registry.register("b");
        registry.report_hashes("a", hashes(&["x"]), true);
        registry.report_hashes("b", hashes(&["x"]), true);
        registry.mark_reacted("a");
        registry.mark_reacted("b");

        registry.report_hashes("b", hashes(&["x", "y"]), true);
        assert!(registry.should_react("a"));
    }
}
