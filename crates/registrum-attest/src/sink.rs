//! Attestation sinks.
//!
//! The emitter's only contact with the outside world. Delivery returns a
//! plain error string rather than an error type: sink failures are
//! diagnostics inside an [`crate::EmissionResult`], never control flow.

use std::fs::OpenOptions;
use std::io::Write;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;

use crate::config::{AttestationCallback, AttestationConfig, OutputMode};
use crate::error::AttestationError;

/// A validated delivery target.
pub enum AttestationSink {
    /// Append to this file, one attestation per write.
    File(PathBuf),
    /// Write to standard output.
    Stdout,
    /// Hand to a caller-owned callback.
    Callback(AttestationCallback),
}

impl AttestationSink {
    /// Builds the sink an enabled configuration selects.
    ///
    /// # Errors
    ///
    /// The same conditions as [`AttestationConfig::validate`]; constructing
    /// a sink from an incoherent configuration is refused at setup.
    pub fn from_config(config: &AttestationConfig) -> Result<Self, AttestationError> {
        config.validate()?;
        match config.output_mode {
            OutputMode::File => {
                let path = config
                    .output_path
                    .clone()
                    .ok_or(AttestationError::MissingOutputPath)?;
                Ok(AttestationSink::File(path))
            }
            OutputMode::Stdout => Ok(AttestationSink::Stdout),
            OutputMode::Callback => {
                let handler = config
                    .on_attestation
                    .clone()
                    .ok_or(AttestationError::MissingCallback)?;
                Ok(AttestationSink::Callback(handler))
            }
        }
    }

    /// Delivers one rendered attestation.
    ///
    /// Never panics: callback panics are caught and reported as delivery
    /// failures, keeping the emitter's no-throw contract independent of
    /// caller-owned code.
    pub fn deliver(&self, rendered: &str) -> Result<(), String> {
        match self {
            AttestationSink::File(path) => {
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| format!("open {}: {e}", path.display()))?;
                file.write_all(rendered.as_bytes())
                    .and_then(|()| file.write_all(b"\n"))
                    .map_err(|e| format!("write {}: {e}", path.display()))
            }
            AttestationSink::Stdout => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                handle
                    .write_all(rendered.as_bytes())
                    .and_then(|()| handle.write_all(b"\n"))
                    .map_err(|e| format!("stdout: {e}"))
            }
            AttestationSink::Callback(handler) => {
                match catch_unwind(AssertUnwindSafe(|| handler(rendered))) {
                    Ok(result) => result.map_err(|e| format!("callback: {e}")),
                    Err(_) => Err("callback panicked".to_string()),
                }
            }
        }
    }
}

impl std::fmt::Debug for AttestationSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttestationSink::File(path) => f.debug_tuple("File").field(path).finish(),
            AttestationSink::Stdout => write!(f, "Stdout"),
            AttestationSink::Callback(_) => write!(f, "Callback(<fn>)"),
        }
    }
}
