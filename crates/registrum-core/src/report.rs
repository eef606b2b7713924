//! Registration results, validation reports, and invariant descriptors.

use serde::{Deserialize, Serialize};

use registrum_registry::{FailureMode, Group, Scope, State, Transition};
use registrum_witness::Violation;

/// Outcome of a registration attempt. A transition is accepted in full or
/// refused in full; there is no partial variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationResult {
    /// The transition was committed.
    Accepted {
        /// Id of the registered state.
        state_id: String,
        /// Assigned order index.
        order_index: i64,
        /// Every invariant checked across all scopes, not just the
        /// refusing ones.
        applied_invariants: Vec<String>,
    },

    /// The transition was refused; the registry is unchanged.
    Rejected {
        /// The refusing verdicts (a single `parity.divergence` HALT when
        /// the witnesses disagreed).
        violations: Vec<Violation>,
    },
}

impl RegistrationResult {
    /// True for accepted registrations.
    pub fn is_accepted(&self) -> bool {
        matches!(self, RegistrationResult::Accepted { .. })
    }

    /// The violations; empty for accepted registrations.
    pub fn violations(&self) -> &[Violation] {
        match self {
            RegistrationResult::Accepted { .. } => &[],
            RegistrationResult::Rejected { violations } => violations,
        }
    }

    /// The assigned index, when accepted.
    pub fn order_index(&self) -> Option<i64> {
        match self {
            RegistrationResult::Accepted { order_index, .. } => Some(*order_index),
            RegistrationResult::Rejected { .. } => None,
        }
    }

    /// True when any violation is HALT-classified.
    pub fn has_halt(&self) -> bool {
        self.violations().iter().any(Violation::is_halt)
    }
}

/// Outcome of a mutation-free validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True when every checked invariant held.
    pub valid: bool,
    /// The refusing verdicts, empty when valid.
    pub violations: Vec<Violation>,
}

/// What `validate` judges: a bare state or a whole transition.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationTarget {
    /// A state outside any transition; state-scope invariants only.
    State(State),
    /// A full transition; all scopes, including a dry-run of the
    /// registration scope.
    Transition(Transition),
}

impl From<State> for ValidationTarget {
    fn from(state: State) -> Self {
        ValidationTarget::State(state)
    }
}

impl From<Transition> for ValidationTarget {
    fn from(transition: Transition) -> Self {
        ValidationTarget::Transition(transition)
    }
}

/// Public description of one invariant; predicate bodies are not exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantDescriptor {
    /// Canonical dotted id.
    pub id: String,
    /// Grouping label.
    pub group: Group,
    /// Evaluation scope.
    pub scope: Scope,
    /// Entity kinds the invariant reads.
    pub applies_to: Vec<String>,
    /// Human-readable intent.
    pub description: String,
    /// Refusal classification.
    pub failure_mode: FailureMode,
}
