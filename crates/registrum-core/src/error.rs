//! Error types for the registrar facade.
//!
//! True errors are reserved for failed construction and corrupt-snapshot
//! replay. Everything the registrar decides about a transition, including
//! parity divergence, comes back as a structured result, never through
//! `Err`.

use thiserror::Error;

/// Errors the registrar can raise.
#[derive(Debug, Error)]
pub enum RegistrumError {
    /// The invariant registry failed to load; no registrar exists.
    #[error("invariant registry error: {0}")]
    Registry(#[from] registrum_registry::RegistryError),

    /// The attestation configuration is incoherent.
    #[error("attestation configuration error: {0}")]
    Attestation(#[from] registrum_attest::AttestationError),

    /// A snapshot declares a version this registrar does not recognize.
    /// There is no silent upgrade.
    #[error("unsupported snapshot version {0} (expected 1)")]
    UnsupportedSnapshotVersion(u32),

    /// The snapshot is inconsistent with the current invariant set or with
    /// itself; the registrar is left unchanged.
    #[error("replay failed: {0}")]
    Replay(String),
}

/// Result alias for registrar operations.
pub type Result<T> = std::result::Result<T, RegistrumError>;
