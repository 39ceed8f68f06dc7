//! The tag mutation plan every rule accumulates before issuing client calls.

use std::collections::{BTreeMap, BTreeSet};

use fleetkeeper_client::{ClientCapability, ClientResult};
use fleetkeeper_state::WorkerState;

/// A batched set of tag additions and removals, keyed by tag name.
///
/// Rules build one of these per pass instead of calling the client
/// per-torrent; [`TagPlan::apply`] issues one `add_tags`/`remove_tags` call
/// per distinct tag.
#[derive(Debug, Default)]
pub struct TagPlan {
    add: BTreeMap<String, BTreeSet<String>>,
    remove: BTreeMap<String, BTreeSet<String>>,
}

impl TagPlan {
    /// Schedule `tag` to be applied to `hash`.
    pub fn add(&mut self, tag: impl Into<String>, hash: impl Into<String>) {
        self.add.entry(tag.into()).or_default().insert(hash.into());
    }

    /// Schedule `tag` to be removed from `hash`.
    pub fn remove(&mut self, tag: impl Into<String>, hash: impl Into<String>) {
        self.remove
            .entry(tag.into())
            .or_default()
            .insert(hash.into());
    }

    /// Whether this plan carries no mutations at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.add.values().all(BTreeSet::is_empty) && self.remove.values().all(BTreeSet::is_empty)
    }

    /// Issue every scheduled mutation against `client`, then reflect the
    /// change into `state`'s own copy of each touched record so a later
    /// rule in the same fixed-point pass sees it immediately.
    ///
    /// # Errors
    ///
    /// Returns the first [`fleetkeeper_client::ClientError`] encountered;
    /// mutations already issued are not rolled back (they are idempotent
    /// and will converge on the next tick).
    pub async fn apply(self, client: &dyn ClientCapability, state: &mut WorkerState) -> ClientResult<bool> {
        let mut changed = false;

        for (tag, hashes) in self.add {
            if hashes.is_empty() {
                continue;
            }
            let hash_list: Vec<String> = hashes.iter().cloned().collect();
            client.add_tags(&hash_list, &tag).await?;
            for hash in &hashes {
                if let Some(record) = state.get_mut(hash) {
                    record.tags.insert(tag.clone());
                }
            }
            changed = true;
        }

        for (tag, hashes) in self.remove {
            if hashes.is_empty() {
                continue;
            }
            let hash_list: Vec<String> = hashes.iter().cloned().collect();
            client.remove_tags(&hash_list, std::slice::from_ref(&tag)).await?;
            for hash in &hashes {
                if let Some(record) = state.get_mut(hash) {
                    record.tags.remove(&tag);
                }
            }
            changed = true;
        }

        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_plan_reports_empty() {
        assert!(TagPlan::default().is_empty());
    }

    #[test]
    fn scheduling_a_mutation_clears_is_empty() {
        let mut plan = TagPlan::default();
        plan.add("~H&R", "abc");
        assert!(!plan.is_empty());
    }
}
