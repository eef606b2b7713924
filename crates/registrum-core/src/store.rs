//! # The Registry Store
//!
//! The in-memory authoritative record of everything the registrar has
//! accepted: the registration log, the lineage map, and the ordering.
//! Owned by a single [`crate::Registrum`]; all mutation funnels through
//! [`RegistryStore::commit`], which the pipeline only calls after every
//! invariant has held.
//!
//! ## Bookkeeping rules
//!
//! - `state_ids` is the append-only registration log. An id appears more
//!   than once only for self-updates (the invariants admit no other
//!   duplicate shape).
//! - `lineage` records an identity's parent at its **first** registration
//!   and is never rewritten; this is what keeps lineage acyclic: parents
//!   are always strictly earlier states, and a self-update never stores a
//!   self-pointer.
//! - `assigned` holds the latest index per identity; `max_index` advances
//!   by exactly one per accepted registration, so
//!   `max_index + 1 == state_ids.len()`.

use std::collections::BTreeMap;

use registrum_registry::RegistryView;

/// The registrar's authoritative structural state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStore {
    state_ids: Vec<String>,
    lineage: BTreeMap<String, Option<String>>,
    assigned: BTreeMap<String, i64>,
    max_index: i64,
}

impl Default for RegistryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryStore {
    /// An empty store; `max_index` starts at -1.
    pub fn new() -> Self {
        Self {
            state_ids: Vec::new(),
            lineage: BTreeMap::new(),
            assigned: BTreeMap::new(),
            max_index: -1,
        }
    }

    /// Records one accepted registration. Infallible by design: the
    /// pipeline has already established every precondition, and partial
    /// mutation is unrepresentable because this is the only writer.
    pub fn commit(&mut self, to_id: &str, from: Option<&str>, index: i64) {
        self.state_ids.push(to_id.to_string());
        // First registration fixes the parent; self-updates keep it.
        self.lineage
            .entry(to_id.to_string())
            .or_insert_with(|| from.map(str::to_string));
        self.assigned.insert(to_id.to_string(), index);
        self.max_index = index;
    }

    /// The registration log, in acceptance order.
    pub fn state_ids(&self) -> &[String] {
        &self.state_ids
    }

    /// The parent map.
    pub fn lineage(&self) -> &BTreeMap<String, Option<String>> {
        &self.lineage
    }

    /// The latest index per identity.
    pub fn assigned(&self) -> &BTreeMap<String, i64> {
        &self.assigned
    }

    /// Number of registration events.
    pub fn len(&self) -> usize {
        self.state_ids.len()
    }

    /// True when nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.state_ids.is_empty()
    }

    /// Walks the parent chain from `id` to its root, most recent first.
    /// Unknown ids yield an empty chain. Finite by construction: parents
    /// are always earlier identities and self-pointers are never stored.
    pub fn lineage_chain(&self, id: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut cursor = Some(id.to_string());
        while let Some(current) = cursor {
            match self.lineage.get(&current) {
                Some(parent) => {
                    chain.push(current);
                    cursor = parent.clone();
                }
                None => break,
            }
        }
        chain
    }
}

impl RegistryView for RegistryStore {
    fn contains_state(&self, id: &str) -> bool {
        self.lineage.contains_key(id)
    }

    fn max_order_index(&self) -> i64 {
        self.max_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store() {
        let store = RegistryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.max_order_index(), -1);
        assert_eq!(store.next_order_index(), 0);
        assert!(!store.contains_state("A"));
        assert_eq!(store.lineage_chain("A"), Vec::<String>::new());
    }

    #[test]
    fn test_commit_sequence() {
        let mut store = RegistryStore::new();
        store.commit("A", None, 0);
        store.commit("B", Some("A"), 1);
        store.commit("C", Some("B"), 2);

        assert_eq!(store.state_ids(), ["A", "B", "C"]);
        assert_eq!(store.max_order_index(), 2);
        assert_eq!(store.assigned()["B"], 1);
        assert_eq!(store.lineage()["C"], Some("B".to_string()));
        assert!(store.contains_state("C"));
    }

    #[test]
    fn test_self_update_keeps_first_parent() {
        let mut store = RegistryStore::new();
        store.commit("A", None, 0);
        store.commit("A", Some("A"), 1);

        assert_eq!(store.state_ids(), ["A", "A"]);
        // The original parent survives; no self-pointer, no cycle.
        assert_eq!(store.lineage()["A"], None);
        assert_eq!(store.assigned()["A"], 1);
        assert_eq!(store.max_order_index(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_lineage_chain_most_recent_first() {
        let mut store = RegistryStore::new();
        store.commit("root", None, 0);
        store.commit("mid", Some("root"), 1);
        store.commit("leaf", Some("mid"), 2);

        assert_eq!(store.lineage_chain("leaf"), ["leaf", "mid", "root"]);
        assert_eq!(store.lineage_chain("root"), ["root"]);
    }

    #[test]
    fn test_log_length_tracks_max_index() {
        let mut store = RegistryStore::new();
        store.commit("A", None, 0);
        store.commit("A", Some("A"), 1);
        store.commit("B", Some("A"), 2);
        assert_eq!(store.max_order_index() + 1, store.len() as i64);
    }
}
