//! # Registrum Core
//!
//! A deterministic structural registrar: it accepts or refuses proposed
//! state transitions against a fixed set of structural invariants, produces
//! a total ordering over accepted states, and exposes a content-addressed
//! snapshot that can be exactly replayed. Refusal is the product.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         REGISTRUM CORE                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │                    ┌─────────────────┐                       │
//! │                    │    Registrum    │  ← Facade             │
//! │                    └────────┬────────┘                       │
//! │                             │                                │
//! │         ┌───────────────────┼───────────────────┐            │
//! │         ▼                   ▼                   ▼            │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐       │
//! │  │  Invariant  │    │    Dual     │    │ Attestation │       │
//! │  │  Registry   │    │   Witness   │    │   Emitter   │       │
//! │  └─────────────┘    └─────────────┘    └─────────────┘       │
//! │                                                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! | Property | Mechanism |
//! |----------|-----------|
//! | No partial acceptance | Pipeline rejects before any mutation; single-writer commit |
//! | Deterministic ordering | Index = prior `max_index + 1`, assigned in serialization order |
//! | Dual-witness parity | Both engines run per transition; set-unequal verdicts halt |
//! | Exact replay | Snapshot hash equality verified after rebuild |
//! | Isolated attestation | Non-throwing emitter, outside the critical section |
//!
//! ## Usage
//!
//! ```rust
//! use registrum_core::{Registrum, RegistrumConfig, State, Transition};
//!
//! let mut registrum = Registrum::new(RegistrumConfig::default()).unwrap();
//!
//! let result = registrum.register(&Transition::root(State::new("A").as_root()));
//! assert!(result.is_accepted());
//!
//! let snapshot = registrum.snapshot();
//! let mut rebuilt = Registrum::new(RegistrumConfig::default()).unwrap();
//! rebuilt.replay(&snapshot).unwrap();
//! assert_eq!(rebuilt.snapshot_hash(), registrum.snapshot_hash());
//! ```

mod config;
mod error;
mod registrar;
mod report;
mod snapshot;
mod store;

pub use config::{EngineConfig, RegistrumConfig};
pub use error::{RegistrumError, Result};
pub use registrar::Registrum;
pub use report::{
    InvariantDescriptor, RegistrationResult, ValidationReport, ValidationTarget,
};
pub use snapshot::{OrderingSnapshot, Snapshot, SNAPSHOT_VERSION};
pub use store::RegistryStore;

// Re-export component types for convenience
pub use registrum_attest::{AttestationConfig, EmissionResult, OutputMode};
pub use registrum_registry::{
    FailureMode, Group, RegistryError, Scope, State, Transition, BUILTIN_REGISTRY_JSON,
};
pub use registrum_witness::{
    Classification, EngineKind, ParityStatus, Violation, WitnessMode, PARITY_DIVERGENCE_ID,
};
