//! # The Dual-Witness Runner
//!
//! Runs two independent invariant implementations in lock-step (the
//! compiled registry engine and the native legacy engine) and compares
//! their verdicts as **sets** of refusing invariant ids, so evaluation
//! order can never affect the outcome.
//!
//! ## Decision table
//!
//! | Registry | Legacy | Outcome |
//! |----------|--------|---------|
//! | ∅ | ∅ | accept |
//! | V | V (set-equal) | reject with V |
//! | V₁ | V₂ ≠ V₁ | **diverged**: single `parity.divergence` HALT |
//!
//! Divergence is fail-closed: the input is refused, parity status becomes
//! [`ParityStatus::Halted`] (sticky), both verdict sets are surfaced in the
//! violation message, and nothing is auto-resolved. Configuration selects
//! the *primary* engine whose violation details label agreed rejections;
//! in dual mode correctness requires both engines to run on every input.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use registrum_registry::predicate::evaluate;
use registrum_registry::{CompiledInvariant, CompiledRegistry, EvalContext, FailureMode, Scope};

use crate::native::{legacy_invariants, NativeInvariant};
use crate::violation::{Classification, Violation};

/// Invariant id used for parity-divergence verdicts.
pub const PARITY_DIVERGENCE_ID: &str = "parity.divergence";

/// Which engines run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WitnessMode {
    /// Both engines on every input (the default).
    Dual,
    /// Native witness only.
    LegacyOnly,
    /// Compiled registry witness only.
    RegistryOnly,
}

impl fmt::Display for WitnessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WitnessMode::Dual => write!(f, "dual"),
            WitnessMode::LegacyOnly => write!(f, "legacy-only"),
            WitnessMode::RegistryOnly => write!(f, "registry-only"),
        }
    }
}

/// One of the two witness implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// The hand-written native witness.
    Legacy,
    /// The compiled-registry witness.
    Registry,
}

impl EngineKind {
    /// The single-engine mode label for this engine.
    pub fn only_mode(self) -> &'static str {
        match self {
            EngineKind::Legacy => "legacy-only",
            EngineKind::Registry => "registry-only",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Legacy => write!(f, "legacy"),
            EngineKind::Registry => write!(f, "registry"),
        }
    }
}

/// Whether the two witnesses have agreed on every input so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParityStatus {
    /// No divergence observed.
    Agreed,
    /// At least one divergence observed; sticky.
    Halted,
}

impl fmt::Display for ParityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParityStatus::Agreed => write!(f, "AGREED"),
            ParityStatus::Halted => write!(f, "HALTED"),
        }
    }
}

/// An invariant in either carrier form.
///
/// The runner is generic over the capability "evaluate(input) → holds";
/// this tagged variant gives that capability two carriers: a compiled
/// predicate tree and a native function.
pub enum InvariantCarrier {
    /// Registry-compiled predicate.
    Compiled(CompiledInvariant),
    /// Hand-written native check.
    Native(NativeInvariant),
}

impl InvariantCarrier {
    /// Canonical invariant id.
    pub fn id(&self) -> &str {
        match self {
            InvariantCarrier::Compiled(inv) => &inv.id,
            InvariantCarrier::Native(inv) => inv.id,
        }
    }

    /// Evaluation scope.
    pub fn scope(&self) -> Scope {
        match self {
            InvariantCarrier::Compiled(inv) => inv.scope,
            InvariantCarrier::Native(inv) => inv.scope,
        }
    }

    /// Refusal classification.
    pub fn failure_mode(&self) -> FailureMode {
        match self {
            InvariantCarrier::Compiled(inv) => inv.failure_mode,
            InvariantCarrier::Native(inv) => inv.failure_mode,
        }
    }

    /// Human-readable intent.
    pub fn description(&self) -> &str {
        match self {
            InvariantCarrier::Compiled(inv) => &inv.description,
            InvariantCarrier::Native(inv) => inv.description,
        }
    }

    /// Whether the invariant holds for this input.
    pub fn holds(&self, ctx: &EvalContext<'_>) -> bool {
        match self {
            InvariantCarrier::Compiled(inv) => evaluate(&inv.predicate, ctx),
            InvariantCarrier::Native(inv) => (inv.check)(ctx),
        }
    }
}

/// One witness: a carrier set under an engine label.
pub struct WitnessEngine {
    kind: EngineKind,
    invariants: Vec<InvariantCarrier>,
}

impl WitnessEngine {
    /// Builds the compiled-registry witness.
    pub fn registry(registry: &CompiledRegistry) -> Self {
        Self {
            kind: EngineKind::Registry,
            invariants: registry
                .invariants
                .iter()
                .cloned()
                .map(InvariantCarrier::Compiled)
                .collect(),
        }
    }

    /// Builds the native witness.
    pub fn legacy() -> Self {
        Self {
            kind: EngineKind::Legacy,
            invariants: legacy_invariants()
                .into_iter()
                .map(InvariantCarrier::Native)
                .collect(),
        }
    }

    /// The engine label.
    pub fn kind(&self) -> EngineKind {
        self.kind
    }

    /// Evaluates every invariant in the requested scopes, returning the
    /// violations in carrier order.
    pub fn evaluate(&self, ctx: &EvalContext<'_>, scopes: &[Scope]) -> Vec<Violation> {
        self.invariants
            .iter()
            .filter(|carrier| scopes.contains(&carrier.scope()))
            .filter(|carrier| !carrier.holds(ctx))
            .map(|carrier| {
                Violation::new(
                    carrier.id().to_string(),
                    Classification::from(carrier.failure_mode()),
                    carrier.description().to_string(),
                )
            })
            .collect()
    }

    /// Ids of the invariants this engine checks in the given scopes.
    pub fn invariant_ids(&self, scopes: &[Scope]) -> Vec<String> {
        self.invariants
            .iter()
            .filter(|carrier| scopes.contains(&carrier.scope()))
            .map(|carrier| carrier.id().to_string())
            .collect()
    }
}

/// Outcome of one runner evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WitnessDecision {
    /// Both witnesses (or the single active one) accept.
    Accept,
    /// Agreed refusal; violations from the primary engine.
    Reject(Vec<Violation>),
    /// The witnesses disagreed; carries the single divergence violation.
    Diverged(Vec<Violation>),
}

impl WitnessDecision {
    /// The violations, empty for accept.
    pub fn violations(&self) -> &[Violation] {
        match self {
            WitnessDecision::Accept => &[],
            WitnessDecision::Reject(v) | WitnessDecision::Diverged(v) => v,
        }
    }

    /// True for accept.
    pub fn is_accept(&self) -> bool {
        matches!(self, WitnessDecision::Accept)
    }
}

/// The dual-witness runner.
pub struct DualWitness {
    legacy: WitnessEngine,
    registry: WitnessEngine,
    mode: WitnessMode,
    primary: EngineKind,
    parity: ParityStatus,
}

impl DualWitness {
    /// Builds a runner over a compiled registry.
    pub fn new(registry: &CompiledRegistry, mode: WitnessMode, primary: EngineKind) -> Self {
        Self {
            legacy: WitnessEngine::legacy(),
            registry: WitnessEngine::registry(registry),
            mode,
            primary,
            parity: ParityStatus::Agreed,
        }
    }

    /// The configured engine mode.
    pub fn mode(&self) -> WitnessMode {
        self.mode
    }

    /// The configured primary engine.
    pub fn primary(&self) -> EngineKind {
        self.primary
    }

    /// Parity observed so far; sticky once halted.
    pub fn parity_status(&self) -> ParityStatus {
        self.parity
    }

    /// Ids of every invariant the active engine(s) check in these scopes.
    pub fn applied_invariants(&self, scopes: &[Scope]) -> Vec<String> {
        match self.mode {
            WitnessMode::Dual => self.primary_engine().invariant_ids(scopes),
            WitnessMode::LegacyOnly => self.legacy.invariant_ids(scopes),
            WitnessMode::RegistryOnly => self.registry.invariant_ids(scopes),
        }
    }

    /// Evaluates one input in the requested scopes.
    pub fn evaluate(&mut self, ctx: &EvalContext<'_>, scopes: &[Scope]) -> WitnessDecision {
        match self.mode {
            WitnessMode::LegacyOnly => single_verdict(self.legacy.evaluate(ctx, scopes)),
            WitnessMode::RegistryOnly => single_verdict(self.registry.evaluate(ctx, scopes)),
            WitnessMode::Dual => {
                let registry_verdict = self.registry.evaluate(ctx, scopes);
                let legacy_verdict = self.legacy.evaluate(ctx, scopes);

                let registry_ids: BTreeSet<&str> =
                    registry_verdict.iter().map(|v| v.invariant_id.as_str()).collect();
                let legacy_ids: BTreeSet<&str> =
                    legacy_verdict.iter().map(|v| v.invariant_id.as_str()).collect();

                if registry_ids != legacy_ids {
                    self.parity = ParityStatus::Halted;
                    let violation = divergence_violation(&registry_ids, &legacy_ids);
                    warn!(
                        registry = ?registry_ids,
                        legacy = ?legacy_ids,
                        "witness divergence; parity halted"
                    );
                    return WitnessDecision::Diverged(vec![violation]);
                }

                if registry_ids.is_empty() {
                    debug!("both witnesses accept");
                    return WitnessDecision::Accept;
                }

                // Agreement on refusal: report the primary engine's details.
                let verdict = match self.primary {
                    EngineKind::Legacy => legacy_verdict,
                    EngineKind::Registry => registry_verdict,
                };
                WitnessDecision::Reject(verdict)
            }
        }
    }

    fn primary_engine(&self) -> &WitnessEngine {
        match self.primary {
            EngineKind::Legacy => &self.legacy,
            EngineKind::Registry => &self.registry,
        }
    }
}

fn single_verdict(violations: Vec<Violation>) -> WitnessDecision {
    if violations.is_empty() {
        WitnessDecision::Accept
    } else {
        WitnessDecision::Reject(violations)
    }
}

/// Encodes the composite divergence verdict: both sets as neutral id lists,
/// so an observer can tell agreed rejection apart from disagreement.
fn divergence_violation(registry: &BTreeSet<&str>, legacy: &BTreeSet<&str>) -> Violation {
    let registry_list: Vec<&str> = registry.iter().copied().collect();
    let legacy_list: Vec<&str> = legacy.iter().copied().collect();
    Violation::new(
        PARITY_DIVERGENCE_ID,
        Classification::Halt,
        format!(
            "witness verdicts diverged: registry=[{}] legacy=[{}]",
            registry_list.join(", "),
            legacy_list.join(", ")
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use registrum_registry::{builtin_registry, EmptyRegistry, RegistryView, State, Transition};

    struct StubRegistry {
        ids: Vec<&'static str>,
        max: i64,
    }

    impl RegistryView for StubRegistry {
        fn contains_state(&self, id: &str) -> bool {
            self.ids.contains(&id)
        }

        fn max_order_index(&self) -> i64 {
            self.max
        }
    }

    fn dual() -> DualWitness {
        DualWitness::new(&builtin_registry(), WitnessMode::Dual, EngineKind::Legacy)
    }

    const PRE_COMMIT: [Scope; 2] = [Scope::State, Scope::Transition];

    #[test]
    fn test_accept_on_clean_root() {
        let mut runner = dual();
        let store = EmptyRegistry;
        let transition = Transition::root(State::new("A").as_root());
        let ctx = EvalContext::for_transition(&transition, &store);
        assert!(runner.evaluate(&ctx, &PRE_COMMIT).is_accept());
        assert_eq!(runner.parity_status(), ParityStatus::Agreed);
    }

    #[test]
    fn test_agreed_rejection_is_set_equal() {
        let mut runner = dual();
        let store = EmptyRegistry;
        // Orphan: parent_exists refuses in both engines, nothing else does.
        let transition = Transition::child("ghost", State::new("B"));
        let ctx = EvalContext::for_transition(&transition, &store);
        match runner.evaluate(&ctx, &PRE_COMMIT) {
            WitnessDecision::Reject(violations) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].invariant_id, "state.lineage.parent_exists");
            }
            other => panic!("expected agreed rejection, got {other:?}"),
        }
        assert_eq!(runner.parity_status(), ParityStatus::Agreed);
    }

    #[test]
    fn test_registration_scope_checks() {
        let mut runner = dual();
        let store = StubRegistry { ids: vec!["A"], max: 0 };
        let transition = Transition::child("A", State::new("B"));

        let good = EvalContext::for_transition(&transition, &store).with_order_index(1);
        assert!(runner.evaluate(&good, &[Scope::Registration]).is_accept());

        let stale = EvalContext::for_transition(&transition, &store).with_order_index(0);
        match runner.evaluate(&stale, &[Scope::Registration]) {
            WitnessDecision::Reject(violations) => {
                let ids: Vec<&str> =
                    violations.iter().map(|v| v.invariant_id.as_str()).collect();
                assert!(ids.contains(&"ordering.deterministic"));
                assert!(ids.contains(&"ordering.monotonic"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_divergence_halts_parity() {
        // A registry whose explicit-id rule is inverted relative to the
        // native witness: accepts empty ids, refuses non-empty ones.
        let mut source: registrum_registry::RegistryDocument =
            serde_json::from_str(registrum_registry::BUILTIN_REGISTRY_JSON).unwrap();
        source.invariants[0].condition.expression = "state.id == \"\"".to_string();
        let skewed = registrum_registry::compile_document(source).unwrap();

        let mut runner = DualWitness::new(&skewed, WitnessMode::Dual, EngineKind::Legacy);
        let store = EmptyRegistry;
        let transition = Transition::root(State::new("A").as_root());
        let ctx = EvalContext::for_transition(&transition, &store);

        match runner.evaluate(&ctx, &PRE_COMMIT) {
            WitnessDecision::Diverged(violations) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].invariant_id, PARITY_DIVERGENCE_ID);
                assert!(violations[0].is_halt());
                assert!(violations[0].message.contains("state.identity.explicit"));
                assert!(violations[0].message.contains("registry="));
                assert!(violations[0].message.contains("legacy="));
            }
            other => panic!("expected divergence, got {other:?}"),
        }
        assert_eq!(runner.parity_status(), ParityStatus::Halted);

        // Sticky: agreement afterwards does not restore parity.
        let clean = Transition::root(State::new("B").as_root());
        let store2 = StubRegistry { ids: vec![], max: -1 };
        let ctx = EvalContext::for_transition(&clean, &store2);
        let _ = runner.evaluate(&ctx, &[Scope::Transition]);
        assert_eq!(runner.parity_status(), ParityStatus::Halted);
    }

    #[test]
    fn test_single_engine_modes() {
        let registry = builtin_registry();
        let store = EmptyRegistry;
        let transition = Transition::child("ghost", State::new("B"));

        for mode in [WitnessMode::LegacyOnly, WitnessMode::RegistryOnly] {
            let mut runner = DualWitness::new(&registry, mode, EngineKind::Legacy);
            let ctx = EvalContext::for_transition(&transition, &store);
            match runner.evaluate(&ctx, &PRE_COMMIT) {
                WitnessDecision::Reject(violations) => {
                    assert_eq!(violations[0].invariant_id, "state.lineage.parent_exists");
                }
                other => panic!("expected rejection in {mode}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_primary_selects_detail_source() {
        // Same verdict set from both engines; the primary's message labels
        // the rejection. The skewed registry reuses the parent_exists rule
        // with a distinct description to make the source observable.
        let mut source: registrum_registry::RegistryDocument =
            serde_json::from_str(registrum_registry::BUILTIN_REGISTRY_JSON).unwrap();
        for invariant in &mut source.invariants {
            invariant.description = format!("registry says: {}", invariant.description);
        }
        let relabeled = registrum_registry::compile_document(source).unwrap();
        let store = EmptyRegistry;
        let transition = Transition::child("ghost", State::new("B"));

        let mut by_registry =
            DualWitness::new(&relabeled, WitnessMode::Dual, EngineKind::Registry);
        let ctx = EvalContext::for_transition(&transition, &store);
        let decision = by_registry.evaluate(&ctx, &PRE_COMMIT);
        assert!(decision.violations()[0].message.starts_with("registry says:"));

        let mut by_legacy = DualWitness::new(&relabeled, WitnessMode::Dual, EngineKind::Legacy);
        let ctx = EvalContext::for_transition(&transition, &store);
        let decision = by_legacy.evaluate(&ctx, &PRE_COMMIT);
        assert!(!decision.violations()[0].message.starts_with("registry says:"));
    }

    #[test]
    fn test_applied_invariants_cover_all_scopes() {
        let runner = dual();
        let all = runner.applied_invariants(&[Scope::State, Scope::Transition, Scope::Registration]);
        assert_eq!(all.len(), 11);
        assert!(all.contains(&"state.identity.explicit".to_string()));
        assert!(all.contains(&"ordering.monotonic".to_string()));
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(WitnessMode::Dual.to_string(), "dual");
        assert_eq!(WitnessMode::LegacyOnly.to_string(), "legacy-only");
        assert_eq!(EngineKind::Registry.only_mode(), "registry-only");
        assert_eq!(ParityStatus::Halted.to_string(), "HALTED");
    }
}
