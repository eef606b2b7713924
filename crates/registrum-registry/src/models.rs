//! # Core Data Models
//!
//! Domain types shared by every Registrum component: states and transitions
//! (the inputs the registrar judges), and the invariant registry schema
//! (the declarative document the loader compiles).
//!
//! ## Opaque payload
//!
//! [`State::data`] is deliberately typed as an uninterpreted
//! [`serde_json::Value`]. No invariant, compiled or native, may read it; the
//! evaluation context never exposes it, and the predicate validator refuses
//! any path that could name it. Strong typing here is the first of those
//! three gates.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::predicate::ast::Expr;

/// Registry document schema version this crate understands.
pub const REGISTRY_VERSION: u32 = 1;

/// A state proposed for registration.
///
/// `structure` is the inspectable surface: invariants may read any field
/// under it. `data` is the opaque payload the core never inspects.
///
/// States are immutable once registered; re-registering an id is only
/// admitted as an explicit self-update transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// The state's identity. Must be non-empty; enforced by invariant, not
    /// by construction, so that the refusal is observable.
    pub id: String,

    /// Structural fields, inspectable by invariants.
    #[serde(default)]
    pub structure: BTreeMap<String, Value>,

    /// Opaque payload. Never read by any invariant.
    #[serde(default)]
    pub data: Value,
}

impl State {
    /// Creates a state with an empty structure and a null payload.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            structure: BTreeMap::new(),
            data: Value::Null,
        }
    }

    /// Adds a structural field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.structure.insert(key.into(), value);
        self
    }

    /// Attaches an opaque payload.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Marks the state as a lineage root (`structure.isRoot = true`).
    pub fn as_root(self) -> Self {
        self.with_field("isRoot", Value::Bool(true))
    }
}

/// A proposed transition from an existing state (or from nothing) to a
/// target state.
///
/// `from: None` denotes a root transition. The single `from` slot is what
/// makes `state.lineage.single_parent` hold by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Parent state id, or `None` for a root.
    pub from: Option<String>,

    /// The state being registered.
    pub to: State,

    /// Optional structural annotations on the transition itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, Value>>,
}

impl Transition {
    /// Creates a root transition.
    pub fn root(to: State) -> Self {
        Self {
            from: None,
            to,
            metadata: None,
        }
    }

    /// Creates a child transition from a registered parent.
    pub fn child(from: impl Into<String>, to: State) -> Self {
        Self {
            from: Some(from.into()),
            to,
            metadata: None,
        }
    }

    /// Attaches transition metadata.
    pub fn with_metadata(mut self, metadata: BTreeMap<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Invariant grouping, mirrored verbatim from the registry document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    /// Identity rules: ids are explicit, unique, immutable.
    Identity,
    /// Lineage rules: parentage is explicit, present, singular, unbroken.
    Lineage,
    /// Ordering rules: total, deterministic, monotonic, structural.
    Ordering,
}

/// When an invariant is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Against the target state alone.
    State,
    /// Against the whole transition, before an index is computed.
    Transition,
    /// Against the transition plus the tentative order index.
    Registration,
}

/// What a refusal of this invariant means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Ordinary refusal of this transition.
    Reject,
    /// Systemic corruption: the refusal is still structural, but flagged.
    Halt,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Identity => write!(f, "identity"),
            Group::Lineage => write!(f, "lineage"),
            Group::Ordering => write!(f, "ordering"),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::State => write!(f, "state"),
            Scope::Transition => write!(f, "transition"),
            Scope::Registration => write!(f, "registration"),
        }
    }
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureMode::Reject => write!(f, "reject"),
            FailureMode::Halt => write!(f, "halt"),
        }
    }
}

/// The invariant registry document, as loaded from JSON.
///
/// Unknown fields are rejected: a registry that says more than this schema
/// understands is refused, not trimmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryDocument {
    /// Schema version; must equal [`REGISTRY_VERSION`].
    pub version: u32,

    /// Stable identifier of this invariant set.
    pub registry_id: String,

    /// Free-form lifecycle marker (e.g. "active").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// The invariant definitions.
    pub invariants: Vec<InvariantSpec>,
}

/// One declarative invariant inside a [`RegistryDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvariantSpec {
    /// Canonical dotted id, e.g. `state.identity.explicit`.
    pub id: String,

    /// Grouping label.
    pub group: Group,

    /// Evaluation scope.
    pub scope: Scope,

    /// Human-readable intent.
    pub description: String,

    /// Entity kinds this invariant reads.
    pub applies_to: Vec<String>,

    /// The predicate definition.
    pub condition: Condition,

    /// Refusal classification.
    pub failure_mode: FailureMode,
}

/// Predicate container inside an invariant definition.
///
/// `type` is an extension point in the document format; this implementation
/// understands only `"predicate"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Condition {
    /// Condition kind; must be `"predicate"`.
    #[serde(rename = "type")]
    pub kind: String,

    /// RPEG v1 expression source.
    pub expression: String,
}

/// An invariant whose predicate has been parsed and statically validated.
#[derive(Debug, Clone)]
pub struct CompiledInvariant {
    /// Canonical dotted id.
    pub id: String,
    /// Grouping label.
    pub group: Group,
    /// Evaluation scope.
    pub scope: Scope,
    /// Entity kinds this invariant reads.
    pub applies_to: Vec<String>,
    /// Human-readable intent.
    pub description: String,
    /// Refusal classification.
    pub failure_mode: FailureMode,
    /// The validated predicate tree.
    pub predicate: Expr,
}

/// A fully compiled invariant registry.
///
/// Produced only by the loader; existence of a value of this type implies
/// every predicate parsed and passed static validation.
#[derive(Debug, Clone)]
pub struct CompiledRegistry {
    /// Stable identifier from the source document.
    pub registry_id: String,
    /// Schema version from the source document.
    pub version: u32,
    /// Canonical hash of the source document (64 lowercase hex chars).
    pub registry_hash: String,
    /// The compiled invariants, in document order.
    pub invariants: Vec<CompiledInvariant>,
}

impl CompiledRegistry {
    /// Iterates the invariants belonging to one evaluation scope.
    pub fn by_scope(&self, scope: Scope) -> impl Iterator<Item = &CompiledInvariant> {
        self.invariants.iter().filter(move |inv| inv.scope == scope)
    }

    /// Returns the invariant ids in document order.
    pub fn invariant_ids(&self) -> Vec<String> {
        self.invariants.iter().map(|inv| inv.id.clone()).collect()
    }

    /// Number of compiled invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// True when the registry holds no invariants.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_builder() {
        let state = State::new("A").as_root().with_data(json!({"payload": 1}));
        assert_eq!(state.id, "A");
        assert_eq!(state.structure.get("isRoot"), Some(&json!(true)));
        assert_eq!(state.data, json!({"payload": 1}));
    }

    #[test]
    fn test_transition_constructors() {
        let root = Transition::root(State::new("A").as_root());
        assert!(root.from.is_none());

        let child = Transition::child("A", State::new("B"));
        assert_eq!(child.from.as_deref(), Some("A"));
    }

    #[test]
    fn test_state_serde_defaults() {
        let state: State = serde_json::from_str(r#"{"id": "A"}"#).unwrap();
        assert!(state.structure.is_empty());
        assert_eq!(state.data, Value::Null);
    }

    #[test]
    fn test_enum_wire_forms() {
        assert_eq!(serde_json::to_string(&Group::Identity).unwrap(), "\"identity\"");
        assert_eq!(serde_json::to_string(&Scope::Registration).unwrap(), "\"registration\"");
        assert_eq!(serde_json::to_string(&FailureMode::Halt).unwrap(), "\"halt\"");
    }

    #[test]
    fn test_registry_document_rejects_unknown_fields() {
        let doc = r#"{
            "version": 1,
            "registry_id": "r",
            "invariants": [],
            "surprise": true
        }"#;
        assert!(serde_json::from_str::<RegistryDocument>(doc).is_err());
    }

    #[test]
    fn test_invariant_spec_round_trip() {
        let spec = InvariantSpec {
            id: "state.identity.explicit".to_string(),
            group: Group::Identity,
            scope: Scope::State,
            description: "id is non-empty".to_string(),
            applies_to: vec!["state".to_string()],
            condition: Condition {
                kind: "predicate".to_string(),
                expression: "is_string(state.id)".to_string(),
            },
            failure_mode: FailureMode::Reject,
        };
        let json = serde_json::to_string(&spec).unwrap();
        let parsed: InvariantSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, spec);
    }
}
