//! Diff policies - decide which changed keys require an apply and whether a
//! change forces destroy-and-recreate
//!
//! A decision is computed fresh from two full property bags on every request
//! and never persisted. Changed keys are kept sorted so repeated invocations
//! over the same pair are byte-identical.

use std::collections::BTreeSet;

use crate::property::PropertyBag;

/// Outcome of a diff request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiffDecision {
    /// Changed property keys the engine should treat as requiring apply
    pub changed_keys: Vec<String>,
    /// Whether the change cannot be applied in place
    pub requires_replace: bool,
}

impl DiffDecision {
    pub fn has_changes(&self) -> bool {
        !self.changed_keys.is_empty()
    }
}

/// Keys present in either bag whose values differ, sorted
pub fn changed_keys(old: &PropertyBag, new: &PropertyBag) -> Vec<String> {
    let mut keys = BTreeSet::new();
    keys.extend(old.keys());
    keys.extend(new.keys());
    keys.into_iter()
        .filter(|key| old.get(*key) != new.get(*key))
        .cloned()
        .collect()
}

/// Generic policy: every changed key requires apply, none force replacement
pub fn diff_any_key(old: &PropertyBag, new: &PropertyBag) -> DiffDecision {
    DiffDecision {
        changed_keys: changed_keys(old, new),
        requires_replace: false,
    }
}

/// Per-kind diff policy: which keys are updatable in place and which force
/// destroy-and-recreate. Keys listed in neither table are ignored.
#[derive(Debug, Clone, Copy)]
pub struct KeyPolicy {
    pub update: &'static [&'static str],
    pub replace: &'static [&'static str],
}

impl KeyPolicy {
    pub fn decide(&self, old: &PropertyBag, new: &PropertyBag) -> DiffDecision {
        let mut decision = DiffDecision::default();
        for key in changed_keys(old, new) {
            if self.replace.contains(&key.as_str()) {
                decision.requires_replace = true;
                decision.changed_keys.push(key);
            } else if self.update.contains(&key.as_str()) {
                decision.changed_keys.push(key);
            }
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use crate::property::PropertyValue;

    use super::*;

    fn bag(pairs: &[(&str, &str)]) -> PropertyBag {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), PropertyValue::from(*v)))
            .collect()
    }

    const POLICY: KeyPolicy = KeyPolicy {
        update: &["name", "body"],
        replace: &["slug"],
    };

    #[test]
    fn changed_keys_covers_added_removed_and_modified() {
        let old = bag(&[("name", "a"), ("gone", "x")]);
        let new = bag(&[("name", "b"), ("added", "y")]);
        assert_eq!(changed_keys(&old, &new), vec!["added", "gone", "name"]);
    }

    #[test]
    fn policy_ignores_unlisted_keys() {
        let old = bag(&[("status", "ACTIVE")]);
        let new = bag(&[("status", "THROTTLED")]);
        let decision = POLICY.decide(&old, &new);
        assert!(!decision.has_changes());
        assert!(!decision.requires_replace);
    }

    #[test]
    fn policy_update_key_does_not_force_replace() {
        let old = bag(&[("body", "export {}"), ("slug", "hello")]);
        let new = bag(&[("body", "export default 1"), ("slug", "hello")]);
        let decision = POLICY.decide(&old, &new);
        assert_eq!(decision.changed_keys, vec!["body"]);
        assert!(!decision.requires_replace);
    }

    #[test]
    fn policy_replace_key_sets_the_flag() {
        let old = bag(&[("slug", "hello")]);
        let new = bag(&[("slug", "world")]);
        let decision = POLICY.decide(&old, &new);
        assert_eq!(decision.changed_keys, vec!["slug"]);
        assert!(decision.requires_replace);
    }

    #[test]
    fn decision_is_deterministic_across_invocations() {
        let old = bag(&[("name", "a"), ("body", "x"), ("slug", "s")]);
        let new = bag(&[("name", "b"), ("body", "y"), ("slug", "t")]);
        let first = POLICY.decide(&old, &new);
        let second = POLICY.decide(&old, &new);
        assert_eq!(first, second);
        assert_eq!(first.changed_keys, vec!["body", "name", "slug"]);
    }

    #[test]
    fn any_key_policy_never_replaces() {
        let old = bag(&[("value", "a")]);
        let new = bag(&[("value", "b")]);
        let decision = diff_any_key(&old, &new);
        assert_eq!(decision.changed_keys, vec!["value"]);
        assert!(!decision.requires_replace);
    }
}
