//! # Registrum Dual Witness
//!
//! Two independent implementations of the same eleven invariants, run in
//! lock-step and compared on every input. Defends against a single
//! implementation quietly drifting from the declared rules: the compiled
//! registry engine and the hand-written legacy engine must produce
//! set-equal verdicts, or the input is refused and parity halts.
//!
//! ## Components
//!
//! | Component | Role |
//! |-----------|------|
//! | [`Violation`] / [`Classification`] | Structured verdicts (REJECT / HALT) |
//! | [`native`] | The hand-written legacy witness |
//! | [`InvariantCarrier`] | Tagged carrier: compiled predicate or native function |
//! | [`DualWitness`] | Lock-step runner, verdict-set comparison, parity tracking |
//!
//! ## Parity
//!
//! Verdicts are compared as sets of invariant ids, never as ordered lists.
//! Any disagreement is surfaced as a single `parity.divergence` HALT
//! violation carrying both sets, and [`ParityStatus`] goes to `HALTED` for
//! the lifetime of the runner. There is no auto-resolution and no
//! preference bias; the primary engine only labels *agreed* rejections.

pub mod native;
pub mod runner;
pub mod violation;

pub use native::{legacy_invariants, NativeInvariant};
pub use runner::{
    DualWitness, EngineKind, InvariantCarrier, ParityStatus, WitnessDecision, WitnessEngine,
    WitnessMode, PARITY_DIVERGENCE_ID,
};
pub use violation::{Classification, Violation};
