//! # Registrum Integration Tests
//!
//! Property-level coverage across the facade: counting, determinism,
//! atomicity, parity, replay round-trips, and the load-time payload gate.
//!
//! | Property | Test |
//! |----------|------|
//! | Accept increments counts | `test_accept_increments_counts` |
//! | Replay round-trip | `test_replay_round_trip_hash_equality` |
//! | Cross-instance determinism | `test_identical_sequences_identical_ordering` |
//! | Atomicity on refusal | `test_refusal_leaves_snapshot_hash_unchanged` |
//! | Witness parity | `test_parity_holds_across_verdicts` |
//! | Payload paths unloadable | `test_semantic_predicates_refuse_loading` |

use registrum_core::{
    ParityStatus, RegistrationResult, Registrum, RegistrumConfig, RegistrumError, State,
    Transition,
};

fn fresh() -> Registrum {
    Registrum::new(RegistrumConfig::default()).unwrap()
}

fn root(id: &str) -> Transition {
    Transition::root(State::new(id).as_root())
}

fn child(from: &str, id: &str) -> Transition {
    Transition::child(from, State::new(id))
}

// =============================================================================
// COUNTING PROPERTIES
// =============================================================================

#[test]
fn test_accept_increments_counts() {
    let mut registrum = fresh();
    let transitions = [root("A"), child("A", "B"), child("B", "C")];

    for transition in &transitions {
        let before = registrum.snapshot();
        let result = registrum.register(transition);
        assert!(result.is_accepted(), "unexpected refusal: {result:?}");
        let after = registrum.snapshot();

        assert_eq!(after.state_count(), before.state_count() + 1);
        assert_eq!(after.ordering.max_index, before.ordering.max_index + 1);
    }
}

#[test]
fn test_order_indices_are_contiguous_from_zero() {
    let mut registrum = fresh();
    let accepted: Vec<i64> = [root("A"), child("A", "B"), child("A", "C"), child("C", "D")]
        .iter()
        .map(|t| registrum.register(t).order_index().unwrap())
        .collect();
    assert_eq!(accepted, [0, 1, 2, 3]);
}

// =============================================================================
// DETERMINISM
// =============================================================================

#[test]
fn test_identical_sequences_identical_ordering() {
    let sequence = [root("A"), child("A", "B"), child("B", "C"), child("A", "D")];

    let mut first = fresh();
    let mut second = fresh();
    for transition in &sequence {
        first.register(transition);
        second.register(transition);
    }

    let a = first.snapshot();
    let b = second.snapshot();
    assert_eq!(a.ordering.assigned, b.ordering.assigned);
    assert_eq!(a.hash(), b.hash());
}

#[test]
fn test_rejections_do_not_perturb_determinism() {
    let mut with_noise = fresh();
    let mut without_noise = fresh();

    with_noise.register(&root("A"));
    // Refused: ghost parent. Must leave no trace in the ordering.
    with_noise.register(&child("ghost", "X"));
    with_noise.register(&child("A", "B"));

    without_noise.register(&root("A"));
    without_noise.register(&child("A", "B"));

    assert_eq!(with_noise.snapshot_hash(), without_noise.snapshot_hash());
}

// =============================================================================
// ATOMICITY
// =============================================================================

#[test]
fn test_refusal_leaves_snapshot_hash_unchanged() {
    let mut registrum = fresh();
    registrum.register(&root("A"));
    let before = registrum.snapshot_hash();

    let refusals = [
        child("ghost", "B"),                               // unknown parent
        Transition::root(State::new("")),                  // empty id, no isRoot
        Transition::root(State::new("A").as_root()),       // duplicate root (HALT)
        Transition::child("A", State::new("B").as_root()), // child claiming root
    ];
    for transition in &refusals {
        let result = registrum.register(transition);
        assert!(!result.is_accepted(), "expected refusal: {result:?}");
        assert_eq!(registrum.snapshot_hash(), before);
    }
}

// =============================================================================
// PARITY
// =============================================================================

#[test]
fn test_parity_holds_across_verdicts() {
    let mut registrum = fresh();
    let inputs = [
        root("A"),
        child("A", "B"),
        child("ghost", "X"),
        Transition::root(State::new("")),
        Transition::root(State::new("A").as_root()),
        Transition::child("A", State::new("A")),
    ];
    for transition in &inputs {
        let _ = registrum.register(transition);
        // Any divergence would be a parity.divergence violation and a
        // halted status; the built-in registry must agree with the legacy
        // witness on every one of these.
        assert_eq!(registrum.parity_status(), ParityStatus::Agreed);
    }
}

// =============================================================================
// REPLAY
// =============================================================================

#[test]
fn test_replay_round_trip_hash_equality() {
    let mut registrum = fresh();
    for transition in [root("A"), child("A", "B"), child("B", "C"), child("A", "D")] {
        assert!(registrum.register(&transition).is_accepted());
    }

    let snapshot = registrum.snapshot();
    let mut rebuilt = fresh();
    rebuilt.replay(&snapshot).unwrap();

    assert_eq!(rebuilt.snapshot_hash(), registrum.snapshot_hash());
    assert_eq!(rebuilt.get_lineage("C"), ["C", "B", "A"]);
}

#[test]
fn test_replay_round_trip_with_self_updates() {
    let mut registrum = fresh();
    assert!(registrum.register(&root("A")).is_accepted());
    assert!(registrum
        .register(&Transition::child("A", State::new("A")))
        .is_accepted());
    assert!(registrum.register(&child("A", "B")).is_accepted());

    let snapshot = registrum.snapshot();
    let mut rebuilt = fresh();
    rebuilt.replay(&snapshot).unwrap();
    assert_eq!(rebuilt.snapshot_hash(), registrum.snapshot_hash());
}

#[test]
fn test_replay_of_empty_registrar() {
    let registrum = fresh();
    let snapshot = registrum.snapshot();
    let mut rebuilt = fresh();
    rebuilt.replay(&snapshot).unwrap();
    assert_eq!(rebuilt.snapshot_hash(), registrum.snapshot_hash());
}

#[test]
fn test_replay_refuses_unknown_version() {
    let registrum = fresh();
    let mut snapshot = registrum.snapshot();
    snapshot.version = 7;

    let mut target = fresh();
    assert!(matches!(
        target.replay(&snapshot),
        Err(RegistrumError::UnsupportedSnapshotVersion(7))
    ));
}

#[test]
fn test_replay_reconstructs_structure_not_payloads() {
    let mut registrum = fresh();
    let payload_heavy = Transition::root(
        State::new("A")
            .as_root()
            .with_data(serde_json::json!({"blob": [1, 2, 3]})),
    );
    registrum.register(&payload_heavy);

    // Payloads are outside the snapshot contract; structure round-trips.
    let snapshot = registrum.snapshot();
    let mut rebuilt = fresh();
    rebuilt.replay(&snapshot).unwrap();
    assert_eq!(rebuilt.snapshot_hash(), registrum.snapshot_hash());
}

// =============================================================================
// BOUNDARY BEHAVIORS
// =============================================================================

#[test]
fn test_empty_id_rejected_by_identity_explicit() {
    let mut registrum = fresh();
    let result = registrum.register(&Transition::root(State::new("").as_root()));
    let ids: Vec<&str> = result
        .violations()
        .iter()
        .map(|v| v.invariant_id.as_str())
        .collect();
    assert!(ids.contains(&"state.identity.explicit"));
}

#[test]
fn test_root_without_is_root_rejected() {
    let mut registrum = fresh();
    let result = registrum.register(&Transition::root(State::new("A")));
    let ids: Vec<&str> = result
        .violations()
        .iter()
        .map(|v| v.invariant_id.as_str())
        .collect();
    assert!(ids.contains(&"state.lineage.explicit"));
}

#[test]
fn test_unknown_parent_rejected() {
    let mut registrum = fresh();
    let result = registrum.register(&child("X", "orphan"));
    let ids: Vec<&str> = result
        .violations()
        .iter()
        .map(|v| v.invariant_id.as_str())
        .collect();
    assert!(ids.contains(&"state.lineage.parent_exists"));
}

#[test]
fn test_duplicate_root_halts() {
    let mut registrum = fresh();
    registrum.register(&root("A"));
    let result = registrum.register(&root("A"));
    assert!(result.has_halt());
    assert_eq!(result.violations()[0].invariant_id, "state.identity.unique");
}

// =============================================================================
// LOAD-TIME PAYLOAD GATE
// =============================================================================

#[test]
fn test_semantic_predicates_refuse_loading() {
    for expression in [
        "exists(state.data)",
        "exists(state.dataHash)",
        "exists(state.content)",
        "exists(state.embedding)",
        "exists(transition.to.data)",
        "exists(transition.to.structure.data.inner)",
        "transition.metadata.content == null",
    ] {
        let source = format!(
            r#"{{
                "version": 1,
                "registry_id": "probe",
                "invariants": [
                    {{
                        "id": "probe.semantic",
                        "group": "identity",
                        "scope": "transition",
                        "description": "probe",
                        "applies_to": ["transition"],
                        "condition": {{ "type": "predicate", "expression": {expr} }},
                        "failure_mode": "reject"
                    }}
                ]
            }}"#,
            expr = serde_json::to_string(expression).unwrap()
        );
        let result = Registrum::with_registry_json(&source, RegistrumConfig::default());
        assert!(
            matches!(result, Err(RegistrumError::Registry(_))),
            "predicate {expression} must refuse loading"
        );
    }
}

// =============================================================================
// FACADE SURFACE
// =============================================================================

#[test]
fn test_applied_invariants_cover_the_full_set() {
    let mut registrum = fresh();
    match registrum.register(&root("A")) {
        RegistrationResult::Accepted {
            applied_invariants, ..
        } => {
            assert_eq!(applied_invariants.len(), 11);
            assert!(applied_invariants.contains(&"ordering.monotonic".to_string()));
        }
        other => panic!("expected acceptance, got {other:?}"),
    }
}

#[test]
fn test_registry_hash_is_stable_and_hex() {
    let a = fresh();
    let b = fresh();
    assert_eq!(a.registry_hash(), b.registry_hash());
    assert_eq!(a.registry_hash().len(), 64);
}
