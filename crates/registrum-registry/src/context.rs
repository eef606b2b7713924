//! # Evaluation Context
//!
//! The single input handed to both witness engines. It carries:
//!
//! - typed borrows of the state/transition for the native witness;
//! - structural JSON projections for the compiled-predicate evaluator;
//! - the tentative order index (registration scope only);
//! - a [`RegistryView`] for the registry-querying builtins.
//!
//! The projections are built here and **omit the opaque payload**: `data`
//! never enters the context, so no predicate path under it can resolve even
//! in principle. The two engines share this input type and nothing else.

use serde_json::{Map, Value};

use crate::models::{State, Transition};

/// Read-only registry queries available to invariants.
///
/// Implemented by the registrar's store; the trait keeps the predicate
/// machinery free of any dependency on the store's representation.
pub trait RegistryView {
    /// True if a state with this id has been registered.
    fn contains_state(&self, id: &str) -> bool;

    /// Highest assigned order index, or -1 on an empty registry.
    fn max_order_index(&self) -> i64;

    /// The index the next accepted transition would receive.
    fn next_order_index(&self) -> i64 {
        self.max_order_index() + 1
    }
}

/// A registry with no states; useful for evaluating predicates in isolation.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyRegistry;

impl RegistryView for EmptyRegistry {
    fn contains_state(&self, _id: &str) -> bool {
        false
    }

    fn max_order_index(&self) -> i64 {
        -1
    }
}

/// What is being judged: a bare state or a whole transition.
#[derive(Debug, Clone, Copy)]
pub enum EvalTarget<'a> {
    /// A state outside any transition (state-scope validation).
    State(&'a State),
    /// A proposed transition.
    Transition(&'a Transition),
}

impl<'a> EvalTarget<'a> {
    /// The state under judgment: the bare state, or the transition's target.
    pub fn state(&self) -> &'a State {
        match self {
            EvalTarget::State(state) => state,
            EvalTarget::Transition(transition) => &transition.to,
        }
    }

    /// The transition, when one is being judged.
    pub fn transition(&self) -> Option<&'a Transition> {
        match self {
            EvalTarget::State(_) => None,
            EvalTarget::Transition(transition) => Some(transition),
        }
    }
}

/// Everything an invariant may look at while judging one input.
pub struct EvalContext<'a> {
    target: EvalTarget<'a>,
    registry: &'a dyn RegistryView,
    order_index: Option<i64>,
    state_value: Value,
    transition_value: Value,
}

impl<'a> EvalContext<'a> {
    /// Context for judging a bare state.
    pub fn for_state(state: &'a State, registry: &'a dyn RegistryView) -> Self {
        Self {
            target: EvalTarget::State(state),
            registry,
            order_index: None,
            state_value: structural_state(state),
            transition_value: Value::Null,
        }
    }

    /// Context for judging a transition.
    pub fn for_transition(transition: &'a Transition, registry: &'a dyn RegistryView) -> Self {
        Self {
            target: EvalTarget::Transition(transition),
            registry,
            order_index: None,
            state_value: structural_state(&transition.to),
            transition_value: structural_transition(transition),
        }
    }

    /// Attaches the tentative order index for registration-scope checks.
    pub fn with_order_index(mut self, index: i64) -> Self {
        self.order_index = Some(index);
        self
    }

    /// The typed target, for the native witness.
    pub fn target(&self) -> &EvalTarget<'a> {
        &self.target
    }

    /// The live registry view.
    pub fn registry(&self) -> &dyn RegistryView {
        self.registry
    }

    /// The tentative order index, when one has been computed.
    pub fn order_index(&self) -> Option<i64> {
        self.order_index
    }

    /// Resolves a root identifier to its structural projection.
    ///
    /// Unknown roots and the `registry` root (queryable only through
    /// builtins) resolve to null, as does `transition` when judging a bare
    /// state.
    pub fn root_value(&self, root: &str) -> Value {
        match root {
            "state" => self.state_value.clone(),
            "transition" => self.transition_value.clone(),
            "ordering" => {
                let mut map = Map::new();
                map.insert(
                    "index".to_string(),
                    match self.order_index {
                        Some(index) => Value::from(index),
                        None => Value::Null,
                    },
                );
                Value::Object(map)
            }
            _ => Value::Null,
        }
    }
}

/// Structural projection of a state: id and structure, never `data`.
fn structural_state(state: &State) -> Value {
    let mut map = Map::new();
    map.insert("id".to_string(), Value::String(state.id.clone()));
    map.insert(
        "structure".to_string(),
        Value::Object(state.structure.clone().into_iter().collect()),
    );
    Value::Object(map)
}

/// Structural projection of a transition: from, to (projected), metadata.
fn structural_transition(transition: &Transition) -> Value {
    let mut map = Map::new();
    map.insert(
        "from".to_string(),
        match &transition.from {
            Some(from) => Value::String(from.clone()),
            None => Value::Null,
        },
    );
    map.insert("to".to_string(), structural_state(&transition.to));
    map.insert(
        "metadata".to_string(),
        match &transition.metadata {
            Some(metadata) => Value::Object(metadata.clone().into_iter().collect()),
            None => Value::Null,
        },
    );
    Value::Object(map)
}
