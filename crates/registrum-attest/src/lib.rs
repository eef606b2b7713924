//! # Registrum Attestation
//!
//! External records of registrar snapshots: payload generation, memo
//! transport encoding, and a non-blocking emitter over file/stdout/callback
//! sinks.
//!
//! ## Isolation contract
//!
//! Attestation is observational. It is never authoritative over acceptance,
//! and its failure modes must not perturb the registrar:
//!
//! - the emitter never panics and never returns `Err`; failures ride
//!   inside [`EmissionResult`];
//! - configuration problems surface at setup, not at emit time;
//! - emission happens outside the registrar's write-critical section.

pub mod config;
pub mod emitter;
pub mod error;
pub mod memo;
pub mod payload;
pub mod sink;

pub use config::{AttestationCallback, AttestationConfig, OutputMode};
pub use emitter::{AttestationEmitter, EmissionResult};
pub use error::AttestationError;
pub use memo::{payload_memos, Memo, MemoEntry};
pub use payload::{derive_mode, AttestationPayload, PayloadInputs, TransitionRange};
pub use sink::AttestationSink;
