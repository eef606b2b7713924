//! # Attestation Payload
//!
//! The external record of a snapshot. The payload carries exactly the nine
//! specified fields (extra fields are forbidden on both ends) and is
//! serialized with the canonical encoder: two-space-indented for sinks,
//! compact for hashing. Attestation is never authoritative over
//! acceptance.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use registrum_registry::canonicalize::{canonicalize_pretty, hash_canonical};
use registrum_witness::{EngineKind, ParityStatus, WitnessMode};

/// Inclusive id range of the attested transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionRange {
    /// Parent id, null for a root (or for an empty registrar).
    pub from: Option<String>,
    /// Target id; empty when nothing has been registered.
    pub to: String,
}

/// The attestation payload. Field set is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttestationPayload {
    /// Version of the emitting registrum.
    pub registrum_version: String,
    /// Snapshot schema version.
    pub snapshot_version: u32,
    /// Canonical hash of the attested snapshot.
    pub snapshot_hash: String,
    /// Canonical hash of the compiled registry.
    pub registry_hash: String,
    /// Engine mode: `dual`, `legacy-only`, or `registry-only`.
    pub mode: String,
    /// Parity at emit time: `AGREED` or `HALTED`.
    pub parity_status: String,
    /// The transition this attestation covers.
    pub transition_range: TransitionRange,
    /// Number of registration events in the snapshot.
    pub state_count: u64,
    /// Highest assigned order index, -1 when empty.
    pub ordering_max: i64,
}

/// Everything needed to build a payload, gathered by the registrar.
#[derive(Debug, Clone)]
pub struct PayloadInputs {
    /// Snapshot schema version.
    pub snapshot_version: u32,
    /// Canonical snapshot hash.
    pub snapshot_hash: String,
    /// Canonical registry hash.
    pub registry_hash: String,
    /// Configured engine mode.
    pub witness_mode: WitnessMode,
    /// Parity at emit time.
    pub parity: ParityStatus,
    /// Primary engine at emit time.
    pub primary: EngineKind,
    /// Parent id of the attested transition.
    pub transition_from: Option<String>,
    /// Target id of the attested transition.
    pub transition_to: String,
    /// Registration event count.
    pub state_count: u64,
    /// Highest assigned index.
    pub ordering_max: i64,
}

/// Derives the payload `mode` field.
///
/// In dual operation, agreement attests `dual`; a halted parity attests the
/// single engine that was primary at emit time. Single-engine operation
/// attests that engine regardless of parity.
pub fn derive_mode(mode: WitnessMode, parity: ParityStatus, primary: EngineKind) -> &'static str {
    match mode {
        WitnessMode::LegacyOnly => "legacy-only",
        WitnessMode::RegistryOnly => "registry-only",
        WitnessMode::Dual => match parity {
            ParityStatus::Agreed => "dual",
            ParityStatus::Halted => primary.only_mode(),
        },
    }
}

impl AttestationPayload {
    /// Builds a payload from registrar-gathered inputs.
    pub fn build(inputs: PayloadInputs) -> Self {
        Self {
            registrum_version: env!("CARGO_PKG_VERSION").to_string(),
            snapshot_version: inputs.snapshot_version,
            snapshot_hash: inputs.snapshot_hash,
            registry_hash: inputs.registry_hash,
            mode: derive_mode(inputs.witness_mode, inputs.parity, inputs.primary).to_string(),
            parity_status: inputs.parity.to_string(),
            transition_range: TransitionRange {
                from: inputs.transition_from,
                to: inputs.transition_to,
            },
            state_count: inputs.state_count,
            ordering_max: inputs.ordering_max,
        }
    }

    /// The payload as a JSON value for canonical serialization.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).expect("attestation payload serializes")
    }

    /// Canonical hash of the compact payload form.
    pub fn payload_hash(&self) -> String {
        hash_canonical(&self.to_value())
    }

    /// Two-space-indented canonical rendering for sinks.
    pub fn render(&self) -> String {
        canonicalize_pretty(&self.to_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_inputs() -> PayloadInputs {
        PayloadInputs {
            snapshot_version: 1,
            snapshot_hash: "ab".repeat(32),
            registry_hash: "cd".repeat(32),
            witness_mode: WitnessMode::Dual,
            parity: ParityStatus::Agreed,
            primary: EngineKind::Legacy,
            transition_from: None,
            transition_to: "A".to_string(),
            state_count: 1,
            ordering_max: 0,
        }
    }

    #[test]
    fn test_payload_field_set_is_exact() {
        let payload = AttestationPayload::build(sample_inputs());
        let value = payload.to_value();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "mode",
                "ordering_max",
                "parity_status",
                "registrum_version",
                "registry_hash",
                "snapshot_hash",
                "snapshot_version",
                "state_count",
                "transition_range",
            ]
        );
    }

    #[test]
    fn test_extra_fields_refused_on_parse() {
        let payload = AttestationPayload::build(sample_inputs());
        let mut value = payload.to_value();
        value
            .as_object_mut()
            .unwrap()
            .insert("extra".to_string(), serde_json::json!(1));
        assert!(serde_json::from_value::<AttestationPayload>(value).is_err());
    }

    #[test]
    fn test_mode_derivation() {
        use EngineKind::*;
        use ParityStatus::*;
        use WitnessMode::*;

        assert_eq!(derive_mode(Dual, Agreed, Legacy), "dual");
        assert_eq!(derive_mode(Dual, Halted, Legacy), "legacy-only");
        assert_eq!(derive_mode(Dual, Halted, Registry), "registry-only");
        assert_eq!(derive_mode(LegacyOnly, Agreed, Registry), "legacy-only");
        assert_eq!(derive_mode(RegistryOnly, Halted, Legacy), "registry-only");
    }

    #[test]
    fn test_parity_field_rendering() {
        let mut inputs = sample_inputs();
        inputs.parity = ParityStatus::Halted;
        let payload = AttestationPayload::build(inputs);
        assert_eq!(payload.parity_status, "HALTED");
        assert_eq!(payload.mode, "legacy-only");
    }

    #[test]
    fn test_render_is_sorted_and_indented() {
        let payload = AttestationPayload::build(sample_inputs());
        let rendered = payload.render();
        assert!(rendered.starts_with("{\n  \"mode\""));
        // Hashing operates on the compact form, not the rendering.
        let reparsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(hash_canonical(&reparsed), payload.payload_hash());
    }

    #[test]
    fn test_payload_hash_stable() {
        let a = AttestationPayload::build(sample_inputs());
        let b = AttestationPayload::build(sample_inputs());
        assert_eq!(a.payload_hash(), b.payload_hash());
    }
}
