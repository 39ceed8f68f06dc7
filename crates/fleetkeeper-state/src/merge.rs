//! The tagged-union merge primitives used when applying a delta to stored
//! state.
//!
//! A plain `Option<T>` cannot distinguish "this delta didn't mention the
//! field" from "this delta explicitly clears the field" — both collapse to
//! `None`. [`FieldDelta`] keeps the two apart so an explicit tag or category
//! removal is never silently dropped on the floor.

use std::collections::BTreeSet;

/// How a single field should be treated when merging a delta over stored
/// state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDelta<T> {
    /// Replace the stored value wholesale.
    Set(T),
    /// The delta didn't touch this field; leave the stored value as-is.
    Unset,
    /// Recursively combine with the stored value (see [`SetPatch`] for the
    /// set case).
    Merged(T),
}

impl<T> FieldDelta<T> {
    /// Apply this delta to a scalar field, falling back to `current` when
    /// [`FieldDelta::Unset`].
    pub fn apply_scalar(self, current: T) -> T {
        match self {
            Self::Set(value) | Self::Merged(value) => value,
            Self::Unset => current,
        }
    }
}

impl<T> From<Option<T>> for FieldDelta<T> {
    /// `Some` means the source reported this field this tick; `None` means
    /// it stayed silent on it, which is [`FieldDelta::Unset`], not a clear.
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unset, Self::Set)
    }
}

/// A union-then-difference patch applied to a [`BTreeSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetPatch<T: Ord> {
    /// Members to union into the set.
    pub add: BTreeSet<T>,
    /// Members to remove after the union.
    pub remove: BTreeSet<T>,
}

impl<T: Ord + Clone> SetPatch<T> {
    /// Build a patch that only adds.
    #[must_use]
    pub fn adding(members: impl IntoIterator<Item = T>) -> Self {
        Self {
            add: members.into_iter().collect(),
            remove: BTreeSet::new(),
        }
    }

    /// Build a patch that only removes.
    #[must_use]
    pub fn removing(members: impl IntoIterator<Item = T>) -> Self {
        Self {
            add: BTreeSet::new(),
            remove: members.into_iter().collect(),
        }
    }

    fn apply(&self, mut current: BTreeSet<T>) -> BTreeSet<T> {
        for member in &self.add {
            current.insert(member.clone());
        }
        for member in &self.remove {
            current.remove(member);
        }
        current
    }
}

impl<T: Ord + Clone> FieldDelta<SetPatch<T>> {
    /// Apply this delta to a set field: [`FieldDelta::Set`] replaces the set
    /// wholesale (interpreting the patch's `add` as the new contents),
    /// [`FieldDelta::Merged`] unions then subtracts, [`FieldDelta::Unset`]
    /// leaves it untouched.
    #[must_use]
    pub fn apply_set(self, current: BTreeSet<T>) -> BTreeSet<T> {
        match self {
            Self::Set(patch) => patch.add,
            Self::Merged(patch) => patch.apply(current),
            Self::Unset => current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_scalar_keeps_current() {
        let delta: FieldDelta<u32> = FieldDelta::Unset;
        assert_eq!(delta.apply_scalar(7), 7);
    }

    #[test]
    fn set_scalar_overwrites() {
        let delta = FieldDelta::Set(9_u32);
        assert_eq!(delta.apply_scalar(7), 9);
    }

    #[test]
    fn merged_set_unions_then_removes() {
        let current: BTreeSet<String> = ["a", "b"].into_iter().map(str::to_string).collect();
        let patch = SetPatch {
            add: ["c"].into_iter().map(str::to_string).collect(),
            remove: ["a"].into_iter().map(str::to_string).collect(),
        };
        let delta = FieldDelta::Merged(patch);
        let result = delta.apply_set(current);
        assert!(result.contains("b"));
        assert!(result.contains("c"));
        assert!(!result.contains("a"));
    }

    #[test]
    fn set_variant_replaces_wholesale() {
        let current: BTreeSet<String> = ["stale"].into_iter().map(str::to_string).collect();
        let delta = FieldDelta::Set(SetPatch::adding(["fresh".to_string()]));
        let result = delta.apply_set(current);
        assert_eq!(result.len(), 1);
        assert!(result.contains("fresh"));
    }

    #[test]
    fn unset_set_field_is_untouched() {
        let current: BTreeSet<String> = ["kept"].into_iter().map(str::to_string).collect();
        let delta: FieldDelta<SetPatch<String>> = FieldDelta::Unset;
        assert_eq!(delta.apply_set(current.clone()), current);
    }

    #[test]
    fn option_none_converts_to_unset() {
        let delta: FieldDelta<u32> = None.into();
        assert_eq!(delta.apply_scalar(7), 7);
    }

    #[test]
    fn option_some_converts_to_set() {
        let delta: FieldDelta<u32> = Some(9).into();
        assert_eq!(delta.apply_scalar(7), 9);
    }
}
