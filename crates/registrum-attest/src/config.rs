//! Attestation configuration.
//!
//! Validation happens at setup, not at emit time: a `file` sink without a
//! path or a `callback` sink without a handler refuses construction, so a
//! running registrar never discovers a misconfigured sink mid-emission.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::AttestationError;

/// Callback sink handler. Receives the rendered attestation JSON; a
/// returned error marks the emission failed without affecting the caller.
pub type AttestationCallback = Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// Where attestations go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Append to a file at `output_path`.
    File,
    /// Write to standard output.
    Stdout,
    /// Hand to the `on_attestation` callback.
    Callback,
}

/// Attestation emitter configuration.
///
/// Disabled by default; attestation is an opt-in side channel that never
/// influences acceptance.
#[derive(Clone)]
pub struct AttestationConfig {
    /// Whether attestations are emitted at all.
    pub enabled: bool,

    /// Selected sink.
    pub output_mode: OutputMode,

    /// Target path; required when `output_mode` is `File`.
    pub output_path: Option<PathBuf>,

    /// Handler; required when `output_mode` is `Callback`.
    pub on_attestation: Option<AttestationCallback>,
}

impl Default for AttestationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            output_mode: OutputMode::Stdout,
            output_path: None,
            on_attestation: None,
        }
    }
}

impl fmt::Debug for AttestationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttestationConfig")
            .field("enabled", &self.enabled)
            .field("output_mode", &self.output_mode)
            .field("output_path", &self.output_path)
            .field(
                "on_attestation",
                &self.on_attestation.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl AttestationConfig {
    /// Enabled file-sink configuration.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            enabled: true,
            output_mode: OutputMode::File,
            output_path: Some(path.into()),
            on_attestation: None,
        }
    }

    /// Enabled stdout-sink configuration.
    pub fn stdout() -> Self {
        Self {
            enabled: true,
            output_mode: OutputMode::Stdout,
            output_path: None,
            on_attestation: None,
        }
    }

    /// Enabled callback-sink configuration.
    pub fn callback(handler: impl Fn(&str) -> Result<(), String> + Send + Sync + 'static) -> Self {
        Self {
            enabled: true,
            output_mode: OutputMode::Callback,
            output_path: None,
            on_attestation: Some(Arc::new(handler)),
        }
    }

    /// Checks mode/field coherence.
    ///
    /// # Errors
    ///
    /// [`AttestationError::MissingOutputPath`] or
    /// [`AttestationError::MissingCallback`] when the selected mode lacks
    /// its required field. A disabled configuration is always valid.
    pub fn validate(&self) -> Result<(), AttestationError> {
        if !self.enabled {
            return Ok(());
        }
        match self.output_mode {
            OutputMode::File if self.output_path.is_none() => {
                Err(AttestationError::MissingOutputPath)
            }
            OutputMode::Callback if self.on_attestation.is_none() => {
                Err(AttestationError::MissingCallback)
            }
            _ => Ok(()),
        }
    }
}
