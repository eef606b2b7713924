//! # The Registrar Facade
//!
//! [`Registrum`] wires the compiled registry, the dual-witness runner, the
//! registry store, and the attestation emitter into the public API:
//! `register`, `validate`, `snapshot`, `replay`, `list_invariants`,
//! `get_lineage`. No other writes are exposed.
//!
//! ## Pipeline
//!
//! 1. State- and transition-scope invariants against the current store
//! 2. Tentative index = `max_index + 1`
//! 3. Registration-scope invariants with the tentative index
//! 4. Atomic commit (log append, lineage insert, index assignment)
//! 5. Attestation, outside the critical section, failure-isolated
//!
//! Any violation at step 1 or 3 returns `Rejected` with the store
//! untouched. A single `&mut self` writer makes the commit atomic: readers
//! observe the store before or after a registration, never mid-commit.

use tracing::{debug, info, warn};

use registrum_attest::{AttestationEmitter, AttestationPayload, EmissionResult, PayloadInputs};
use registrum_registry::{
    builtin_registry, load_registry, CompiledRegistry, EvalContext, RegistryView, Scope, State,
    Transition,
};
use registrum_witness::{DualWitness, ParityStatus, Violation};

use crate::config::RegistrumConfig;
use crate::error::{RegistrumError, Result};
use crate::report::{
    InvariantDescriptor, RegistrationResult, ValidationReport, ValidationTarget,
};
use crate::snapshot::{Snapshot, SNAPSHOT_VERSION};
use crate::store::RegistryStore;

const PRE_COMMIT_SCOPES: [Scope; 2] = [Scope::State, Scope::Transition];
const REGISTRATION_SCOPES: [Scope; 1] = [Scope::Registration];
const ALL_SCOPES: [Scope; 3] = [Scope::State, Scope::Transition, Scope::Registration];

/// The deterministic structural registrar.
///
/// A single-writer object: every mutating operation takes `&mut self`.
/// Callers wanting cross-thread sharing wrap it in their own lock; a
/// started `register` is atomic from the registrar's perspective.
pub struct Registrum {
    registry: CompiledRegistry,
    witness: DualWitness,
    store: RegistryStore,
    emitter: AttestationEmitter,
    last_transition: Option<(Option<String>, String)>,
}

impl Registrum {
    /// Creates a registrar over the built-in invariant registry.
    ///
    /// # Errors
    ///
    /// [`RegistrumError::Attestation`] when the attestation configuration
    /// is incoherent.
    pub fn new(config: RegistrumConfig) -> Result<Self> {
        Self::from_registry(builtin_registry(), config)
    }

    /// Creates a registrar over a caller-supplied registry document.
    ///
    /// # Errors
    ///
    /// [`RegistrumError::Registry`] when the document fails to compile
    /// (all-or-nothing), or [`RegistrumError::Attestation`] for a bad
    /// attestation configuration.
    pub fn with_registry_json(source: &str, config: RegistrumConfig) -> Result<Self> {
        Self::from_registry(load_registry(source)?, config)
    }

    fn from_registry(registry: CompiledRegistry, config: RegistrumConfig) -> Result<Self> {
        let emitter = AttestationEmitter::new(config.attestation)?;
        let witness = DualWitness::new(&registry, config.engine.mode, config.engine.primary);
        info!(
            registry_id = %registry.registry_id,
            invariants = registry.len(),
            mode = %config.engine.mode,
            "registrar initialized"
        );
        Ok(Self {
            registry,
            witness,
            store: RegistryStore::new(),
            emitter,
            last_transition: None,
        })
    }

    /// Proposes a transition for registration.
    ///
    /// Refusal is structural: every outcome, including parity divergence,
    /// comes back as a [`RegistrationResult`], never as an error.
    pub fn register(&mut self, transition: &Transition) -> RegistrationResult {
        debug!(to = %transition.to.id, from = ?transition.from, "registering transition");

        match run_pipeline(&mut self.witness, &self.store, transition) {
            Err(violations) => {
                if violations.iter().any(Violation::is_halt) {
                    warn!(
                        to = %transition.to.id,
                        violations = violations.len(),
                        "transition refused with HALT classification"
                    );
                }
                RegistrationResult::Rejected { violations }
            }
            Ok((order_index, applied_invariants)) => {
                self.store
                    .commit(&transition.to.id, transition.from.as_deref(), order_index);
                self.last_transition =
                    Some((transition.from.clone(), transition.to.id.clone()));
                info!(state_id = %transition.to.id, order_index, "transition accepted");

                // Attestation runs after the commit completes and its
                // failures never reach the result.
                if self.emitter.is_enabled() {
                    let emission = self.emit_attestation();
                    debug!(success = emission.success, "post-commit attestation");
                }

                RegistrationResult::Accepted {
                    state_id: transition.to.id.clone(),
                    order_index,
                    applied_invariants,
                }
            }
        }
    }

    /// Runs the invariants without mutating the store.
    ///
    /// A bare state is judged by state-scope invariants; a transition runs
    /// the full pipeline as a dry run, including the registration scope
    /// with the index it would receive.
    pub fn validate(&mut self, target: impl Into<ValidationTarget>) -> ValidationReport {
        let violations = match target.into() {
            ValidationTarget::State(state) => {
                let ctx = EvalContext::for_state(&state, &self.store);
                self.witness
                    .evaluate(&ctx, &[Scope::State])
                    .violations()
                    .to_vec()
            }
            ValidationTarget::Transition(transition) => {
                match run_pipeline(&mut self.witness, &self.store, &transition) {
                    Ok(_) => Vec::new(),
                    Err(violations) => violations,
                }
            }
        };
        ValidationReport {
            valid: violations.is_empty(),
            violations,
        }
    }

    /// Captures the current structural state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(
            &self.store,
            &self.registry.registry_hash,
            &self.witness.mode().to_string(),
        )
    }

    /// Canonical hash of the current snapshot.
    pub fn snapshot_hash(&self) -> String {
        self.snapshot().hash()
    }

    /// Rebuilds this registrar's state from a snapshot.
    ///
    /// Transitions are re-issued in registration order through the full
    /// pipeline: the first occurrence of an id registers under its recorded
    /// parent, later occurrences are self-updates (the only duplicate shape
    /// the invariants admit). Each replayed state is minimal: structure
    /// only, payloads are not part of the contract.
    ///
    /// # Errors
    ///
    /// - [`RegistrumError::UnsupportedSnapshotVersion`] for any version
    ///   other than 1; no silent upgrade.
    /// - [`RegistrumError::Replay`] when a replayed transition is refused
    ///   or the rebuilt snapshot's hash differs from the input; either
    ///   way the snapshot is inconsistent with this registrar's invariant
    ///   set and the current state is left unchanged.
    pub fn replay(&mut self, snapshot: &Snapshot) -> Result<()> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(RegistrumError::UnsupportedSnapshotVersion(snapshot.version));
        }

        let mut scratch = RegistryStore::new();
        let mut last_transition = None;

        for id in &snapshot.state_ids {
            let first_occurrence = !scratch.contains_state(id);
            let from = if first_occurrence {
                match snapshot.lineage.get(id) {
                    Some(parent) => parent.clone(),
                    None => {
                        return Err(RegistrumError::Replay(format!(
                            "state '{id}' is missing from the lineage map"
                        )))
                    }
                }
            } else {
                Some(id.clone())
            };

            let state = State::new(id.clone())
                .with_field("isRoot", serde_json::Value::Bool(from.is_none()));
            let transition = Transition {
                from,
                to: state,
                metadata: None,
            };

            match run_pipeline(&mut self.witness, &scratch, &transition) {
                Ok((index, _)) => {
                    scratch.commit(&transition.to.id, transition.from.as_deref(), index);
                    last_transition =
                        Some((transition.from.clone(), transition.to.id.clone()));
                }
                Err(violations) => {
                    let ids: Vec<&str> =
                        violations.iter().map(|v| v.invariant_id.as_str()).collect();
                    return Err(RegistrumError::Replay(format!(
                        "transition for '{id}' refused during replay: [{}]",
                        ids.join(", ")
                    )));
                }
            }
        }

        let rebuilt = Snapshot::capture(
            &scratch,
            &self.registry.registry_hash,
            &self.witness.mode().to_string(),
        );
        if rebuilt.hash() != snapshot.hash() {
            return Err(RegistrumError::Replay(
                "rebuilt snapshot hash does not match the input snapshot".to_string(),
            ));
        }

        self.store = scratch;
        self.last_transition = last_transition;
        info!(states = snapshot.state_count(), "replay complete");
        Ok(())
    }

    /// Public descriptions of every invariant; no predicate bodies.
    pub fn list_invariants(&self) -> Vec<InvariantDescriptor> {
        self.registry
            .invariants
            .iter()
            .map(|inv| InvariantDescriptor {
                id: inv.id.clone(),
                group: inv.group,
                scope: inv.scope,
                applies_to: inv.applies_to.clone(),
                description: inv.description.clone(),
                failure_mode: inv.failure_mode,
            })
            .collect()
    }

    /// The parent chain from `id` to its root, most recent first; empty
    /// for unknown ids.
    pub fn get_lineage(&self, id: &str) -> Vec<String> {
        self.store.lineage_chain(id)
    }

    /// Parity observed so far; sticky once halted.
    pub fn parity_status(&self) -> ParityStatus {
        self.witness.parity_status()
    }

    /// Canonical hash of the compiled registry.
    pub fn registry_hash(&self) -> &str {
        &self.registry.registry_hash
    }

    /// Number of registration events.
    pub fn state_count(&self) -> usize {
        self.store.len()
    }

    /// True when nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Builds and emits an attestation of the current snapshot.
    ///
    /// Infallible by contract: a disabled emitter skips, a failing sink
    /// reports inside the result, and registry state is untouched either
    /// way.
    pub fn emit_attestation(&self) -> EmissionResult {
        let snapshot = self.snapshot();
        let (transition_from, transition_to) = match &self.last_transition {
            Some((from, to)) => (from.clone(), to.clone()),
            None => (None, String::new()),
        };
        let payload = AttestationPayload::build(PayloadInputs {
            snapshot_version: snapshot.version,
            snapshot_hash: snapshot.hash(),
            registry_hash: self.registry.registry_hash.clone(),
            witness_mode: self.witness.mode(),
            parity: self.witness.parity_status(),
            primary: self.witness.primary(),
            transition_from,
            transition_to,
            state_count: snapshot.state_count() as u64,
            ordering_max: snapshot.ordering.max_index,
        });
        self.emitter.emit(&payload)
    }
}

impl std::fmt::Debug for Registrum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registrum")
            .field("registry_id", &self.registry.registry_id)
            .field("state_count", &self.store.len())
            .field("parity", &self.witness.parity_status())
            .finish()
    }
}

/// Steps 1–3 of the pipeline: every invariant scope against the given
/// store, without mutation. Shared by `register`, `validate`, and `replay`.
fn run_pipeline(
    witness: &mut DualWitness,
    store: &RegistryStore,
    transition: &Transition,
) -> std::result::Result<(i64, Vec<String>), Vec<Violation>> {
    let ctx = EvalContext::for_transition(transition, store);
    let decision = witness.evaluate(&ctx, &PRE_COMMIT_SCOPES);
    if !decision.is_accept() {
        return Err(decision.violations().to_vec());
    }

    let index = store.next_order_index();
    let ctx = EvalContext::for_transition(transition, store).with_order_index(index);
    let decision = witness.evaluate(&ctx, &REGISTRATION_SCOPES);
    if !decision.is_accept() {
        return Err(decision.violations().to_vec());
    }

    Ok((index, witness.applied_invariants(&ALL_SCOPES)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use registrum_witness::Classification;

    fn fresh() -> Registrum {
        Registrum::new(RegistrumConfig::default()).unwrap()
    }

    #[test]
    fn test_register_root() {
        let mut registrum = fresh();
        let result = registrum.register(&Transition::root(State::new("A").as_root()));
        match result {
            RegistrationResult::Accepted {
                state_id,
                order_index,
                applied_invariants,
            } => {
                assert_eq!(state_id, "A");
                assert_eq!(order_index, 0);
                assert_eq!(applied_invariants.len(), 11);
            }
            other => panic!("expected acceptance, got {other:?}"),
        }
        assert_eq!(registrum.state_count(), 1);
    }

    #[test]
    fn test_rejection_leaves_store_untouched() {
        let mut registrum = fresh();
        let before = registrum.snapshot_hash();
        let result = registrum.register(&Transition::child("ghost", State::new("B")));
        assert!(!result.is_accepted());
        assert_eq!(registrum.snapshot_hash(), before);
        assert!(registrum.is_empty());
    }

    #[test]
    fn test_validate_is_mutation_free() {
        let mut registrum = fresh();
        let report = registrum.validate(Transition::root(State::new("A").as_root()));
        assert!(report.valid);
        assert!(registrum.is_empty());

        let report = registrum.validate(State::new(""));
        assert!(!report.valid);
        assert_eq!(
            report.violations[0].invariant_id,
            "state.identity.explicit"
        );
    }

    #[test]
    fn test_validate_transition_covers_registration_scope() {
        let mut registrum = fresh();
        registrum.register(&Transition::root(State::new("A").as_root()));
        let report = registrum.validate(Transition::child("A", State::new("B")));
        assert!(report.valid);
    }

    #[test]
    fn test_list_invariants_has_no_predicate_bodies() {
        let registrum = fresh();
        let descriptors = registrum.list_invariants();
        assert_eq!(descriptors.len(), 11);
        let json = serde_json::to_string(&descriptors).unwrap();
        assert!(!json.contains("expression"));
        assert!(!json.contains("predicate"));
    }

    #[test]
    fn test_get_lineage() {
        let mut registrum = fresh();
        registrum.register(&Transition::root(State::new("A").as_root()));
        registrum.register(&Transition::child("A", State::new("B")));
        registrum.register(&Transition::child("B", State::new("C")));

        assert_eq!(registrum.get_lineage("C"), ["C", "B", "A"]);
        assert_eq!(registrum.get_lineage("A"), ["A"]);
        assert!(registrum.get_lineage("nope").is_empty());
    }

    #[test]
    fn test_halt_verdict_is_structural() {
        let mut registrum = fresh();
        registrum.register(&Transition::root(State::new("A").as_root()));
        let result = registrum.register(&Transition::root(State::new("A").as_root()));
        assert!(result.has_halt());
        assert_eq!(
            result.violations()[0].classification,
            Classification::Halt
        );
        // The registrar keeps answering; conservative halt semantics.
        let next = registrum.register(&Transition::child("A", State::new("B")));
        assert!(next.is_accepted());
    }

    #[test]
    fn test_replay_refuses_foreign_version() {
        let mut registrum = fresh();
        let mut snapshot = registrum.snapshot();
        snapshot.version = 2;
        assert!(matches!(
            registrum.replay(&snapshot),
            Err(RegistrumError::UnsupportedSnapshotVersion(2))
        ));
    }

    #[test]
    fn test_replay_refuses_tampered_snapshot() {
        let mut registrum = fresh();
        registrum.register(&Transition::root(State::new("A").as_root()));
        let mut snapshot = registrum.snapshot();
        // Claim an extra index without a matching registration event.
        snapshot.ordering.max_index = 5;

        let mut target = fresh();
        assert!(matches!(
            target.replay(&snapshot),
            Err(RegistrumError::Replay(_))
        ));
        assert!(target.is_empty());
    }

    #[test]
    fn test_custom_registry_document() {
        let source = r#"{
            "version": 1,
            "registry_id": "custom.one",
            "invariants": [
                {
                    "id": "state.identity.explicit",
                    "group": "identity",
                    "scope": "state",
                    "description": "id is non-empty",
                    "applies_to": ["state"],
                    "condition": { "type": "predicate", "expression": "is_string(state.id) && state.id != \"\"" },
                    "failure_mode": "reject"
                }
            ]
        }"#;
        let mut registrum =
            Registrum::with_registry_json(source, RegistrumConfig::default()).unwrap();
        assert_eq!(registrum.list_invariants().len(), 1);

        // Both engines accept a clean root, so the thinner registry still
        // agrees with the legacy witness here.
        let result = registrum.register(&Transition::root(State::new("A").as_root()));
        assert!(result.is_accepted());

        // An orphan child refuses only under the legacy witness; the
        // thinner registry has no parent rule, so the witnesses diverge.
        let result = registrum.register(&Transition::child("ghost", State::new("B")));
        assert!(!result.is_accepted());
        assert_eq!(
            result.violations()[0].invariant_id,
            registrum_witness::PARITY_DIVERGENCE_ID
        );
        assert_eq!(registrum.parity_status(), ParityStatus::Halted);
    }

    #[test]
    fn test_malformed_registry_refuses_construction() {
        let err =
            Registrum::with_registry_json("{}", RegistrumConfig::default()).unwrap_err();
        assert!(matches!(err, RegistrumError::Registry(_)));
    }
}
