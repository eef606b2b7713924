//! # The Native ("Legacy") Witness
//!
//! Hand-written implementations of the eleven canonical invariants, one
//! function each, working from typed data. These are the reference
//! judgments the compiled registry is compared against, so they are written
//! to be obviously correct and share no code with the DSL evaluator; only
//! the [`EvalContext`] input type.
//!
//! A check returns `true` when the invariant holds. Transition-scope checks
//! are only ever invoked with a transition target; a bare-state context
//! trivially holds them (the scope filter keeps that path out of real
//! judgments).

use registrum_registry::{EvalContext, FailureMode, Group, Scope, Transition};

/// One hand-written invariant.
pub struct NativeInvariant {
    /// Canonical dotted id, identical to the registry counterpart.
    pub id: &'static str,
    /// Grouping label.
    pub group: Group,
    /// Evaluation scope.
    pub scope: Scope,
    /// Entity kinds this invariant reads.
    pub applies_to: &'static [&'static str],
    /// Human-readable intent.
    pub description: &'static str,
    /// Refusal classification.
    pub failure_mode: FailureMode,
    /// The check itself.
    pub check: fn(&EvalContext<'_>) -> bool,
}

/// The full native invariant set, in canonical order.
pub fn legacy_invariants() -> Vec<NativeInvariant> {
    vec![
        NativeInvariant {
            id: "state.identity.explicit",
            group: Group::Identity,
            scope: Scope::State,
            applies_to: &["state"],
            description: "Every state declares a non-empty string id.",
            failure_mode: FailureMode::Reject,
            check: identity_explicit,
        },
        NativeInvariant {
            id: "state.identity.immutable",
            group: Group::Identity,
            scope: Scope::Transition,
            applies_to: &["transition"],
            description: "A transition targeting an already-registered id must be a self-update.",
            failure_mode: FailureMode::Reject,
            check: identity_immutable,
        },
        NativeInvariant {
            id: "state.identity.unique",
            group: Group::Identity,
            scope: Scope::Transition,
            applies_to: &["transition"],
            description: "A root transition may not re-register an existing id.",
            failure_mode: FailureMode::Halt,
            check: identity_unique,
        },
        NativeInvariant {
            id: "state.lineage.explicit",
            group: Group::Lineage,
            scope: Scope::Transition,
            applies_to: &["transition"],
            description: "A transition is a root exactly when its target declares isRoot.",
            failure_mode: FailureMode::Reject,
            check: lineage_explicit,
        },
        NativeInvariant {
            id: "state.lineage.parent_exists",
            group: Group::Lineage,
            scope: Scope::Transition,
            applies_to: &["transition"],
            description: "A non-root transition must name a registered parent.",
            failure_mode: FailureMode::Reject,
            check: lineage_parent_exists,
        },
        NativeInvariant {
            id: "state.lineage.single_parent",
            group: Group::Lineage,
            scope: Scope::Transition,
            applies_to: &["transition"],
            description: "A transition carries at most one parent reference.",
            failure_mode: FailureMode::Reject,
            check: lineage_single_parent,
        },
        NativeInvariant {
            id: "state.lineage.continuous",
            group: Group::Lineage,
            scope: Scope::Registration,
            applies_to: &["transition", "ordering"],
            description: "The lineage chain is unbroken at commit time.",
            failure_mode: FailureMode::Halt,
            check: lineage_continuous,
        },
        NativeInvariant {
            id: "ordering.total",
            group: Group::Ordering,
            scope: Scope::Registration,
            applies_to: &["transition", "ordering"],
            description: "Every accepted state receives a non-negative order index.",
            failure_mode: FailureMode::Halt,
            check: ordering_total,
        },
        NativeInvariant {
            id: "ordering.deterministic",
            group: Group::Ordering,
            scope: Scope::Registration,
            applies_to: &["transition", "ordering"],
            description: "Recomputing the order index yields the assigned value.",
            failure_mode: FailureMode::Halt,
            check: ordering_deterministic,
        },
        NativeInvariant {
            id: "ordering.monotonic",
            group: Group::Ordering,
            scope: Scope::Registration,
            applies_to: &["transition", "ordering"],
            description: "The assigned index strictly exceeds the prior maximum.",
            failure_mode: FailureMode::Halt,
            check: ordering_monotonic,
        },
        NativeInvariant {
            id: "ordering.non_semantic",
            group: Group::Ordering,
            scope: Scope::Transition,
            applies_to: &["transition"],
            description: "Ordering reads structural fields only.",
            failure_mode: FailureMode::Reject,
            check: ordering_non_semantic,
        },
    ]
}

fn transition_of<'a>(ctx: &'a EvalContext<'_>) -> Option<&'a Transition> {
    ctx.target().transition()
}

/// `state.id` is a non-empty string. The id is typed as a string, so
/// emptiness is the whole check.
fn identity_explicit(ctx: &EvalContext<'_>) -> bool {
    !ctx.target().state().id.is_empty()
}

/// If `to.id` is already registered, the transition must be a self-update.
/// Root transitions are exempt here; `state.identity.unique` owns that case.
fn identity_immutable(ctx: &EvalContext<'_>) -> bool {
    let Some(transition) = transition_of(ctx) else {
        return true;
    };
    match &transition.from {
        None => true,
        Some(from) => {
            !ctx.registry().contains_state(&transition.to.id) || transition.to.id == *from
        }
    }
}

/// A root transition may not reuse a registered id.
fn identity_unique(ctx: &EvalContext<'_>) -> bool {
    let Some(transition) = transition_of(ctx) else {
        return true;
    };
    transition.from.is_some() || !ctx.registry().contains_state(&transition.to.id)
}

/// `from` is absent exactly when the target declares `isRoot: true`.
fn lineage_explicit(ctx: &EvalContext<'_>) -> bool {
    let Some(transition) = transition_of(ctx) else {
        return true;
    };
    let declares_root = transition.to.structure.get("isRoot")
        == Some(&serde_json::Value::Bool(true));
    match transition.from {
        None => declares_root,
        Some(_) => !declares_root,
    }
}

/// A named parent must already be registered.
fn lineage_parent_exists(ctx: &EvalContext<'_>) -> bool {
    let Some(transition) = transition_of(ctx) else {
        return true;
    };
    match &transition.from {
        None => true,
        Some(from) => ctx.registry().contains_state(from),
    }
}

/// A transition holds one `Option<String>` parent slot; plurality is
/// unrepresentable. The check exists so the verdict lists it as applied.
fn lineage_single_parent(_ctx: &EvalContext<'_>) -> bool {
    true
}

/// At commit time the parent must still be present; identical to
/// `parent_exists` but evaluated against the registry the commit will
/// mutate.
fn lineage_continuous(ctx: &EvalContext<'_>) -> bool {
    lineage_parent_exists(ctx)
}

/// A tentative index was computed and is non-negative.
fn ordering_total(ctx: &EvalContext<'_>) -> bool {
    matches!(ctx.order_index(), Some(index) if index >= 0)
}

/// Recomputing the index from the registry yields the tentative value.
fn ordering_deterministic(ctx: &EvalContext<'_>) -> bool {
    ctx.order_index() == Some(ctx.registry().next_order_index())
}

/// The tentative index strictly exceeds every index assigned so far.
fn ordering_monotonic(ctx: &EvalContext<'_>) -> bool {
    matches!(ctx.order_index(), Some(index) if index > ctx.registry().max_order_index())
}

/// The ordering inputs (`from`, `to.id`, `to.structure`) exist by type;
/// nothing semantic participates.
fn ordering_non_semantic(_ctx: &EvalContext<'_>) -> bool {
    true
}
