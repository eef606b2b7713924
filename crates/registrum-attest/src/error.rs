//! Error types for attestation setup.
//!
//! Only configuration can fail here, and only at setup time. Emission
//! itself never errors: sink failures are embedded in
//! [`crate::EmissionResult`].

use thiserror::Error;

/// Configuration problems detected when the emitter is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttestationError {
    /// `output_mode: file` without an `output_path`.
    #[error("attestation output mode 'file' requires an output path")]
    MissingOutputPath,

    /// `output_mode: callback` without an `on_attestation` handler.
    #[error("attestation output mode 'callback' requires an on_attestation handler")]
    MissingCallback,
}
