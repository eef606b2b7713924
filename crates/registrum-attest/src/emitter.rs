//! # The Attestation Emitter
//!
//! The sole I/O-producing leaf of the system, isolated behind one hard
//! constraint: **emission must not throw**. Every failure mode (sink I/O
//! error, callback error, callback panic) is embedded in an
//! [`EmissionResult`] and logged as a warning. A failed emission leaves
//! registry state exactly as a successful one would.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AttestationConfig;
use crate::error::AttestationError;
use crate::payload::AttestationPayload;
use crate::sink::AttestationSink;

/// Outcome of one emission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionResult {
    /// Whether a sink delivery was attempted at all.
    pub attempted: bool,
    /// Whether delivery succeeded.
    pub success: bool,
    /// Failure diagnostic, when delivery failed.
    pub error: Option<String>,
}

impl EmissionResult {
    /// Result for a disabled emitter: nothing attempted, nothing failed.
    pub fn skipped() -> Self {
        Self {
            attempted: false,
            success: false,
            error: None,
        }
    }

    fn delivered() -> Self {
        Self {
            attempted: true,
            success: true,
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            attempted: true,
            success: false,
            error: Some(error),
        }
    }
}

/// Non-throwing attestation emitter.
pub struct AttestationEmitter {
    sink: Option<AttestationSink>,
}

impl AttestationEmitter {
    /// Builds an emitter from configuration.
    ///
    /// # Errors
    ///
    /// Configuration incoherence ([`AttestationError`]), the only failure
    /// this component ever raises, and it happens here at setup, never at
    /// emit time.
    pub fn new(config: AttestationConfig) -> Result<Self, AttestationError> {
        config.validate()?;
        let sink = if config.enabled {
            Some(AttestationSink::from_config(&config)?)
        } else {
            None
        };
        Ok(Self { sink })
    }

    /// An emitter that skips every emission.
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    /// Whether emissions will be attempted.
    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Emits one payload. Infallible by contract: failures come back
    /// inside the result.
    pub fn emit(&self, payload: &AttestationPayload) -> EmissionResult {
        let Some(sink) = &self.sink else {
            return EmissionResult::skipped();
        };

        let rendered = payload.render();
        match sink.deliver(&rendered) {
            Ok(()) => {
                debug!(hash = %payload.payload_hash(), "attestation emitted");
                EmissionResult::delivered()
            }
            Err(error) => {
                warn!(%error, "attestation emission failed; registry state unaffected");
                EmissionResult::failed(error)
            }
        }
    }
}

impl std::fmt::Debug for AttestationEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttestationEmitter")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
