//! Structured verdicts.
//!
//! A [`Violation`] is a refusal, not an error: it travels inside results,
//! never through `Err`. The classification mirrors the invariant's failure
//! mode; `HALT` marks systemic corruption but is still returned
//! structurally.

use std::fmt;

use serde::{Deserialize, Serialize};

use registrum_registry::FailureMode;

/// Severity of a refusal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Classification {
    /// Ordinary refusal of one transition.
    Reject,
    /// Systemic corruption; the registrar still answers structurally.
    Halt,
}

impl From<FailureMode> for Classification {
    fn from(mode: FailureMode) -> Self {
        match mode {
            FailureMode::Reject => Classification::Reject,
            FailureMode::Halt => Classification::Halt,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Reject => write!(f, "REJECT"),
            Classification::Halt => write!(f, "HALT"),
        }
    }
}

/// One invariant's refusal of one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Id of the refusing invariant (or `parity.divergence`).
    pub invariant_id: String,

    /// Refusal severity.
    pub classification: Classification,

    /// Human-readable context.
    pub message: String,
}

impl Violation {
    /// Creates a violation.
    pub fn new(
        invariant_id: impl Into<String>,
        classification: Classification,
        message: impl Into<String>,
    ) -> Self {
        Self {
            invariant_id: invariant_id.into(),
            classification,
            message: message.into(),
        }
    }

    /// True for HALT-classified violations.
    pub fn is_halt(&self) -> bool {
        self.classification == Classification::Halt
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.classification, self.invariant_id, self.message)
    }
}
