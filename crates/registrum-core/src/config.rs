//! Configuration for the registrar facade.

use serde::{Deserialize, Serialize};

use registrum_attest::AttestationConfig;
use registrum_witness::{EngineKind, WitnessMode};

/// Configuration for a [`crate::Registrum`] instance.
#[derive(Debug, Clone, Default)]
pub struct RegistrumConfig {
    /// Witness engine configuration.
    pub engine: EngineConfig,

    /// Attestation emitter configuration.
    pub attestation: AttestationConfig,
}

/// Witness engine selection.
///
/// `primary` only chooses which engine's diagnostic labels surface on
/// agreed rejections (and which single mode a halted parity attests); in
/// dual mode both engines evaluate every transition regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Which engines run.
    pub mode: WitnessMode,

    /// The authority for observable labels.
    pub primary: EngineKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: WitnessMode::Dual,
            primary: EngineKind::Legacy,
        }
    }
}
