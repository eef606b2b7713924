//! # Snapshot v1
//!
//! The persistable, hashable structural state of a registrar at a point in
//! time. Deliberately minimal: registration order, lineage, ordering, and
//! the registry identity, never payloads. Replay reconstructs structure,
//! not data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use registrum_registry::canonicalize::hash_canonical;
use registrum_registry::RegistryView;

use crate::store::RegistryStore;

/// Snapshot schema version this crate reads and writes.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The ordering section of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderingSnapshot {
    /// Highest assigned index, -1 when empty.
    pub max_index: i64,
    /// Latest index per identity; complete over `state_ids`.
    pub assigned: BTreeMap<String, i64>,
}

/// A registrar snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    /// Schema version; always [`SNAPSHOT_VERSION`] for values produced
    /// here.
    pub version: u32,
    /// Canonical hash of the compiled registry (64 lowercase hex chars).
    pub registry_hash: String,
    /// Engine mode of the producing registrar.
    pub mode: String,
    /// Registration log, in acceptance order.
    pub state_ids: Vec<String>,
    /// Parent per identity; complete over `state_ids`.
    pub lineage: BTreeMap<String, Option<String>>,
    /// Ordering section.
    pub ordering: OrderingSnapshot,
}

impl Snapshot {
    /// Captures a store into a snapshot.
    pub fn capture(store: &RegistryStore, registry_hash: &str, mode: &str) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            registry_hash: registry_hash.to_string(),
            mode: mode.to_string(),
            state_ids: store.state_ids().to_vec(),
            lineage: store.lineage().clone(),
            ordering: OrderingSnapshot {
                max_index: store.max_order_index(),
                assigned: store.assigned().clone(),
            },
        }
    }

    /// Canonical hash of this snapshot.
    pub fn hash(&self) -> String {
        let value = serde_json::to_value(self).expect("snapshot serializes");
        hash_canonical(&value)
    }

    /// Number of registration events captured.
    pub fn state_count(&self) -> usize {
        self.state_ids.len()
    }
}
