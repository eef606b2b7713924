//! # Registrum Invariant Registry
//!
//! Declarative invariants for the Registrum registrar: the canonical JSON
//! encoder, the RPEG v1 predicate DSL, and the loader that compiles a JSON
//! registry document into auditable judgments.
//!
//! ## Guarantees
//!
//! | Property | Mechanism |
//! |----------|-----------|
//! | Byte-stable hashes | Canonical encoding, keys sorted at every depth |
//! | No unsafe predicates | Static validation before any evaluation |
//! | No payload access | Typed opaque `data` + forbidden-path validation + projection that never materializes payloads |
//! | All-or-nothing loading | One bad invariant rejects the whole registry |
//! | Fail-closed evaluation | Runtime predicate errors become `false` |
//!
//! ## Usage
//!
//! ```rust
//! use registrum_registry::{builtin_registry, EvalContext, EmptyRegistry};
//! use registrum_registry::models::{State, Transition};
//! use registrum_registry::predicate::evaluate;
//!
//! let registry = builtin_registry();
//! let transition = Transition::root(State::new("A").as_root());
//! let store = EmptyRegistry;
//! let ctx = EvalContext::for_transition(&transition, &store);
//!
//! for invariant in &registry.invariants {
//!     let _holds = evaluate(&invariant.predicate, &ctx);
//! }
//! ```

pub mod builtin;
pub mod canonicalize;
pub mod context;
pub mod error;
pub mod loader;
pub mod models;
pub mod predicate;

pub use builtin::{builtin_registry, BUILTIN_REGISTRY_JSON};
pub use canonicalize::{canonicalize, canonicalize_pretty, hash_canonical};
pub use context::{EmptyRegistry, EvalContext, EvalTarget, RegistryView};
pub use error::{
    EvaluationError, InvariantDefinitionError, ParseError, RegistryError, ValidationError,
};
pub use loader::{compile_document, load_registry};
pub use models::{
    CompiledInvariant, CompiledRegistry, Condition, FailureMode, Group, InvariantSpec,
    RegistryDocument, Scope, State, Transition, REGISTRY_VERSION,
};
