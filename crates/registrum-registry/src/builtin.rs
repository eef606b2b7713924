//! The built-in invariant registry: the eleven canonical rules expressed in
//! RPEG v1 and compiled through the ordinary loader, so the shipped rules
//! pass exactly the same gate as caller-supplied ones.

use crate::loader::load_registry;
use crate::models::CompiledRegistry;

/// JSON source of the built-in registry.
pub const BUILTIN_REGISTRY_JSON: &str = r#"{
  "version": 1,
  "registry_id": "registrum.invariants.v1",
  "status": "active",
  "invariants": [
    {
      "id": "state.identity.explicit",
      "group": "identity",
      "scope": "state",
      "description": "Every state declares a non-empty string id.",
      "applies_to": ["state"],
      "condition": {
        "type": "predicate",
        "expression": "is_string(state.id) && state.id != \"\""
      },
      "failure_mode": "reject"
    },
    {
      "id": "state.identity.immutable",
      "group": "identity",
      "scope": "transition",
      "description": "A transition targeting an already-registered id must be a self-update.",
      "applies_to": ["transition"],
      "condition": {
        "type": "predicate",
        "expression": "transition.from == null || !registry.contains_state(transition.to.id) || transition.to.id == transition.from"
      },
      "failure_mode": "reject"
    },
    {
      "id": "state.identity.unique",
      "group": "identity",
      "scope": "transition",
      "description": "A root transition may not re-register an existing id.",
      "applies_to": ["transition"],
      "condition": {
        "type": "predicate",
        "expression": "transition.from != null || !registry.contains_state(transition.to.id)"
      },
      "failure_mode": "halt"
    },
    {
      "id": "state.lineage.explicit",
      "group": "lineage",
      "scope": "transition",
      "description": "A transition is a root exactly when its target declares isRoot.",
      "applies_to": ["transition"],
      "condition": {
        "type": "predicate",
        "expression": "(transition.from == null && transition.to.structure.isRoot == true) || (transition.from != null && transition.to.structure.isRoot != true)"
      },
      "failure_mode": "reject"
    },
    {
      "id": "state.lineage.parent_exists",
      "group": "lineage",
      "scope": "transition",
      "description": "A non-root transition must name a registered parent.",
      "applies_to": ["transition"],
      "condition": {
        "type": "predicate",
        "expression": "transition.from == null || registry.contains_state(transition.from)"
      },
      "failure_mode": "reject"
    },
    {
      "id": "state.lineage.single_parent",
      "group": "lineage",
      "scope": "transition",
      "description": "A transition carries at most one parent reference.",
      "applies_to": ["transition"],
      "condition": {
        "type": "predicate",
        "expression": "transition.from == null || is_string(transition.from)"
      },
      "failure_mode": "reject"
    },
    {
      "id": "state.lineage.continuous",
      "group": "lineage",
      "scope": "registration",
      "description": "The lineage chain is unbroken at commit time.",
      "applies_to": ["transition", "ordering"],
      "condition": {
        "type": "predicate",
        "expression": "transition.from == null || registry.contains_state(transition.from)"
      },
      "failure_mode": "halt"
    },
    {
      "id": "ordering.total",
      "group": "ordering",
      "scope": "registration",
      "description": "Every accepted state receives a non-negative order index.",
      "applies_to": ["transition", "ordering"],
      "condition": {
        "type": "predicate",
        "expression": "is_number(ordering.index) && ordering.index >= 0"
      },
      "failure_mode": "halt"
    },
    {
      "id": "ordering.deterministic",
      "group": "ordering",
      "scope": "registration",
      "description": "Recomputing the order index yields the assigned value.",
      "applies_to": ["transition", "ordering"],
      "condition": {
        "type": "predicate",
        "expression": "equals(ordering.index, registry.compute_order_index(transition))"
      },
      "failure_mode": "halt"
    },
    {
      "id": "ordering.monotonic",
      "group": "ordering",
      "scope": "registration",
      "description": "The assigned index strictly exceeds the prior maximum.",
      "applies_to": ["transition", "ordering"],
      "condition": {
        "type": "predicate",
        "expression": "ordering.index > registry.max_order_index()"
      },
      "failure_mode": "halt"
    },
    {
      "id": "ordering.non_semantic",
      "group": "ordering",
      "scope": "transition",
      "description": "Ordering reads structural fields only.",
      "applies_to": ["transition"],
      "condition": {
        "type": "predicate",
        "expression": "exists(transition.to.id) && exists(transition.to.structure)"
      },
      "failure_mode": "reject"
    }
  ]
}"#;

/// Compiles the built-in registry.
///
/// The source above is part of this crate and covered by tests; failing to
/// compile it is a defect, not an input error.
pub fn builtin_registry() -> CompiledRegistry {
    load_registry(BUILTIN_REGISTRY_JSON).expect("built-in invariant registry compiles")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FailureMode, Scope};

    #[test]
    fn test_builtin_registry_compiles() {
        let registry = builtin_registry();
        assert_eq!(registry.registry_id, "registrum.invariants.v1");
        assert_eq!(registry.len(), 11);
    }

    #[test]
    fn test_builtin_scope_split() {
        let registry = builtin_registry();
        assert_eq!(registry.by_scope(Scope::State).count(), 1);
        assert_eq!(registry.by_scope(Scope::Transition).count(), 6);
        assert_eq!(registry.by_scope(Scope::Registration).count(), 4);
    }

    #[test]
    fn test_builtin_halt_invariants() {
        let registry = builtin_registry();
        let halts: Vec<&str> = registry
            .invariants
            .iter()
            .filter(|inv| inv.failure_mode == FailureMode::Halt)
            .map(|inv| inv.id.as_str())
            .collect();
        assert_eq!(
            halts,
            vec![
                "state.identity.unique",
                "state.lineage.continuous",
                "ordering.total",
                "ordering.deterministic",
                "ordering.monotonic",
            ]
        );
    }

    #[test]
    fn test_builtin_hash_is_stable_across_loads() {
        assert_eq!(builtin_registry().registry_hash, builtin_registry().registry_hash);
    }
}
