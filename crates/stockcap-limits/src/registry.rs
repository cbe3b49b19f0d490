//! The limit registry: per-policy maps of resource kind to maximum quantity.
//!
//! # Design
//!
//! - **Keyed by id**: policies are referenced by [`PolicyId`], never by the
//!   storage subsystem's own object. A destroyed policy leaves a stale map
//!   behind that nothing resolves to; it is dropped by [`LimitRegistry::prune`]
//!   or skipped by [`LimitRegistry::snapshot`].
//! - **Two levels, no empties**: a policy's map is removed as soon as its
//!   last limit is cleared, so `has_any_limit` is a single key lookup and
//!   removing a policy cannot leave an inner map reachable.
//! - **Positive only**: limits are stored as [`NonZeroU32`]; zero and
//!   negative inputs clear the entry.

use std::collections::HashMap;
use std::num::NonZeroU32;

use stockcap_types::{LimitEntry, PolicyId, ResourceKind};
use tracing::{debug, info, warn};

use crate::snapshot::LimitSnapshot;

// ---------------------------------------------------------------------------
// QuantityLimitMap
// ---------------------------------------------------------------------------

/// Limits configured for a single storage policy.
///
/// A kind without an entry is unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuantityLimitMap {
    limits: HashMap<ResourceKind, NonZeroU32>,
}

impl QuantityLimitMap {
    /// Create an empty map (everything unlimited).
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the limit for `kind`, if one is configured.
    pub fn get(&self, kind: &ResourceKind) -> Option<NonZeroU32> {
        self.limits.get(kind).copied()
    }

    /// Set or clear the limit for `kind`.
    ///
    /// Values `<= 0` clear the entry. Values above `u32::MAX` saturate.
    pub fn set(&mut self, kind: &ResourceKind, value: i64) {
        match normalize(value) {
            Some(limit) => {
                self.limits.insert(kind.clone(), limit);
            }
            None => {
                self.limits.remove(kind);
            }
        }
    }

    /// Return whether no limits are configured.
    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }

    /// Return the number of limited kinds.
    pub fn len(&self) -> usize {
        self.limits.len()
    }

    /// Iterate over `(kind, limit)` pairs in arbitrary order.
    pub fn limits(&self) -> impl Iterator<Item = (&ResourceKind, NonZeroU32)> {
        self.limits.iter().map(|(kind, limit)| (kind, *limit))
    }
}

/// Map a raw configured value onto a positive limit, or `None` for
/// "unlimited".
fn normalize(value: i64) -> Option<NonZeroU32> {
    if value <= 0 {
        return None;
    }
    let clamped = u32::try_from(value).unwrap_or(u32::MAX);
    NonZeroU32::new(clamped)
}

// ---------------------------------------------------------------------------
// LimitRegistry
// ---------------------------------------------------------------------------

/// Every configured quantity limit, grouped by storage policy.
///
/// Mutated only by the operator edit path, policy copies, and snapshot
/// restore. The capacity decision path only reads it.
#[derive(Debug, Clone, Default)]
pub struct LimitRegistry {
    maps: HashMap<PolicyId, QuantityLimitMap>,
}

impl LimitRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the configured limit, or `None` for unlimited.
    pub fn get_limit(&self, policy: PolicyId, kind: &ResourceKind) -> Option<NonZeroU32> {
        self.maps.get(&policy).and_then(|map| map.get(kind))
    }

    /// Set (`value > 0`) or clear (`value <= 0`) a limit.
    pub fn set_limit(&mut self, policy: PolicyId, kind: &ResourceKind, value: i64) {
        let map = self.maps.entry(policy).or_default();
        map.set(kind, value);
        if map.is_empty() {
            self.maps.remove(&policy);
        }
        info!(policy = %policy, kind = %kind, value, "quantity limit updated");
    }

    /// Return whether the policy has at least one configured limit.
    pub fn has_any_limit(&self, policy: PolicyId) -> bool {
        self.maps.contains_key(&policy)
    }

    /// Return the full map for a policy, if it has any limits.
    pub fn limits_for(&self, policy: PolicyId) -> Option<&QuantityLimitMap> {
        self.maps.get(&policy)
    }

    /// Replace `dest`'s limits with a deep copy of `source`'s.
    ///
    /// When `source` has no limits, `dest` ends up with none either.
    pub fn copy_from(&mut self, source: PolicyId, dest: PolicyId) {
        if source == dest {
            return;
        }
        match self.maps.get(&source).cloned() {
            Some(map) => {
                debug!(source = %source, dest = %dest, kinds = map.len(), "copying limits");
                self.maps.insert(dest, map);
            }
            None => {
                self.maps.remove(&dest);
            }
        }
    }

    /// Drop every limit for a policy the storage subsystem destroyed.
    pub fn remove_policy(&mut self, policy: PolicyId) -> bool {
        self.maps.remove(&policy).is_some()
    }

    /// Drop maps whose policy is no longer live. Returns how many went.
    pub fn prune(&mut self, is_live: impl Fn(PolicyId) -> bool) -> usize {
        let before = self.maps.len();
        self.maps.retain(|policy, _| is_live(*policy));
        let pruned = before.saturating_sub(self.maps.len());
        if pruned > 0 {
            warn!(pruned, "dropped limits for destroyed storage policies");
        }
        pruned
    }

    /// Return the number of policies with at least one limit.
    pub fn policy_count(&self) -> usize {
        self.maps.len()
    }

    /// Enumerate every limit as a sorted list of triples.
    pub fn entries(&self) -> Vec<LimitEntry> {
        let mut entries: Vec<LimitEntry> = self
            .maps
            .iter()
            .flat_map(|(policy, map)| {
                map.limits().map(|(kind, limit)| LimitEntry {
                    policy: *policy,
                    kind: kind.clone(),
                    limit: limit.get(),
                })
            })
            .collect();
        entries.sort();
        entries
    }

    /// Build the persistence snapshot, skipping policies that no longer
    /// exist.
    pub fn snapshot(&self, is_live: impl Fn(PolicyId) -> bool) -> LimitSnapshot {
        let entries: Vec<LimitEntry> = self
            .entries()
            .into_iter()
            .filter(|entry| is_live(entry.policy))
            .collect();
        LimitSnapshot::new(entries)
    }

    /// Rebuild a registry from a persisted snapshot.
    ///
    /// Entries with a zero limit are ignored.
    pub fn restore(snapshot: &LimitSnapshot) -> Self {
        let mut registry = Self::new();
        for entry in &snapshot.entries {
            let map = registry.maps.entry(entry.policy).or_default();
            map.set(&entry.kind, i64::from(entry.limit));
            if map.is_empty() {
                registry.maps.remove(&entry.policy);
            }
        }
        info!(
            policies = registry.policy_count(),
            entries = snapshot.entries.len(),
            "quantity limits restored"
        );
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steel() -> ResourceKind {
        ResourceKind::new("steel")
    }

    #[test]
    fn unconfigured_is_unlimited() {
        let registry = LimitRegistry::new();
        let policy = PolicyId::new();
        assert!(registry.get_limit(policy, &steel()).is_none());
        assert!(!registry.has_any_limit(policy));
    }

    #[test]
    fn set_and_get_limit() {
        let mut registry = LimitRegistry::new();
        let policy = PolicyId::new();
        registry.set_limit(policy, &steel(), 75);
        assert_eq!(registry.get_limit(policy, &steel()).map(NonZeroU32::get), Some(75));
        assert!(registry.has_any_limit(policy));

        registry.set_limit(policy, &steel(), 20);
        assert_eq!(registry.get_limit(policy, &steel()).map(NonZeroU32::get), Some(20));
    }

    #[test]
    fn non_positive_values_clear_the_limit() {
        for value in [0_i64, -1, -500, i64::MIN] {
            let mut registry = LimitRegistry::new();
            let policy = PolicyId::new();
            registry.set_limit(policy, &steel(), 10);
            registry.set_limit(policy, &steel(), value);
            assert!(registry.get_limit(policy, &steel()).is_none(), "value {value}");
            assert!(!registry.has_any_limit(policy));
        }
    }

    #[test]
    fn clearing_one_kind_keeps_the_others() {
        let mut registry = LimitRegistry::new();
        let policy = PolicyId::new();
        let wood = ResourceKind::new("wood");
        registry.set_limit(policy, &steel(), 10);
        registry.set_limit(policy, &wood, 40);
        registry.set_limit(policy, &steel(), 0);
        assert!(registry.has_any_limit(policy));
        assert_eq!(registry.get_limit(policy, &wood).map(NonZeroU32::get), Some(40));
    }

    #[test]
    fn oversized_values_saturate() {
        let mut registry = LimitRegistry::new();
        let policy = PolicyId::new();
        registry.set_limit(policy, &steel(), i64::MAX);
        assert_eq!(
            registry.get_limit(policy, &steel()).map(NonZeroU32::get),
            Some(u32::MAX)
        );
    }

    #[test]
    fn copy_is_isolated_from_later_edits() {
        let mut registry = LimitRegistry::new();
        let source = PolicyId::new();
        let dest = PolicyId::new();
        registry.set_limit(source, &steel(), 10);
        registry.copy_from(source, dest);
        assert_eq!(registry.get_limit(dest, &steel()).map(NonZeroU32::get), Some(10));

        registry.set_limit(source, &steel(), 99);
        assert_eq!(registry.get_limit(dest, &steel()).map(NonZeroU32::get), Some(10));

        registry.set_limit(dest, &steel(), 3);
        assert_eq!(registry.get_limit(source, &steel()).map(NonZeroU32::get), Some(99));
    }

    #[test]
    fn copy_overwrites_destination_entirely() {
        let mut registry = LimitRegistry::new();
        let source = PolicyId::new();
        let dest = PolicyId::new();
        let wood = ResourceKind::new("wood");
        registry.set_limit(source, &steel(), 10);
        registry.set_limit(dest, &wood, 5);
        registry.copy_from(source, dest);
        assert!(registry.get_limit(dest, &wood).is_none());

        let empty = PolicyId::new();
        registry.copy_from(empty, dest);
        assert!(!registry.has_any_limit(dest));
    }

    #[test]
    fn copy_onto_itself_keeps_limits() {
        let mut registry = LimitRegistry::new();
        let policy = PolicyId::new();
        registry.set_limit(policy, &steel(), 10);
        registry.copy_from(policy, policy);
        assert_eq!(registry.get_limit(policy, &steel()).map(NonZeroU32::get), Some(10));
    }

    #[test]
    fn remove_policy_forgets_every_kind() {
        let mut registry = LimitRegistry::new();
        let policy = PolicyId::new();
        let other = PolicyId::new();
        registry.set_limit(policy, &steel(), 10);
        registry.set_limit(policy, &ResourceKind::new("wood"), 3);
        registry.set_limit(other, &steel(), 4);

        assert!(registry.remove_policy(policy));
        assert!(!registry.has_any_limit(policy));
        assert!(registry.has_any_limit(other));
        assert!(!registry.remove_policy(policy));
    }

    #[test]
    fn prune_drops_dead_policies() {
        let mut registry = LimitRegistry::new();
        let live = PolicyId::new();
        let dead = PolicyId::new();
        registry.set_limit(live, &steel(), 10);
        registry.set_limit(dead, &steel(), 10);

        let pruned = registry.prune(|policy| policy == live);
        assert_eq!(pruned, 1);
        assert!(registry.has_any_limit(live));
        assert!(!registry.has_any_limit(dead));
    }

    #[test]
    fn snapshot_skips_dead_policies_and_restores() {
        let mut registry = LimitRegistry::new();
        let live = PolicyId::new();
        let dead = PolicyId::new();
        registry.set_limit(live, &steel(), 10);
        registry.set_limit(live, &ResourceKind::new("wood"), 25);
        registry.set_limit(dead, &steel(), 4);

        let snapshot = registry.snapshot(|policy| policy == live);
        assert_eq!(snapshot.entries.len(), 2);
        assert!(snapshot.entries.iter().all(|entry| entry.policy == live));

        let restored = LimitRegistry::restore(&snapshot);
        assert_eq!(restored.entries(), snapshot.entries);
        assert!(!restored.has_any_limit(dead));
    }

    #[test]
    fn restore_ignores_zero_limits() {
        let policy = PolicyId::new();
        let snapshot = LimitSnapshot::new(vec![LimitEntry {
            policy,
            kind: steel(),
            limit: 0,
        }]);
        let restored = LimitRegistry::restore(&snapshot);
        assert!(!restored.has_any_limit(policy));
    }
}
