//! Error types for registry loading and predicate processing.
//!
//! Load-time failures ([`ParseError`], [`ValidationError`],
//! [`InvariantDefinitionError`]) are aggregated per invariant into a single
//! [`RegistryError::Invalid`]: the registry loads whole or not at all.
//! [`EvaluationError`] is the one runtime error and it never escapes the
//! evaluator; the top-level entry point converts it to `false` (fail
//! closed).

use thiserror::Error;

/// Errors raised when loading an invariant registry document.
///
/// Any of these means the registrar cannot be constructed from the given
/// document. There is no partial load and no runtime fallback.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The document is not valid JSON or does not match the schema.
    #[error("registry document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The document declares a schema version this crate does not understand.
    #[error("unsupported registry version {0} (expected 1)")]
    UnsupportedVersion(u32),

    /// One or more invariant definitions failed to compile. Every issue is
    /// listed, prefixed by the offending invariant id.
    #[error("invariant registry rejected: {}", .issues.join("; "))]
    Invalid {
        /// Per-invariant problem descriptions.
        issues: Vec<String>,
    },
}

/// Result alias for registry loading.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors from tokenizing or parsing a predicate expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The expression is empty or only whitespace.
    #[error("empty predicate expression")]
    EmptyExpression,

    /// A character outside the grammar was encountered.
    #[error("unexpected character '{ch}' at byte {at}")]
    UnexpectedChar {
        /// The offending character.
        ch: char,
        /// Byte offset into the expression.
        at: usize,
    },

    /// A string literal was opened but never closed.
    #[error("unterminated string literal starting at byte {at}")]
    UnterminatedString {
        /// Byte offset of the opening quote.
        at: usize,
    },

    /// An integer literal does not fit in 64 bits.
    #[error("integer literal out of range at byte {at}")]
    IntegerOutOfRange {
        /// Byte offset of the literal.
        at: usize,
    },

    /// The token stream does not match the grammar at this position.
    #[error("unexpected token '{found}' at byte {at}")]
    UnexpectedToken {
        /// Rendering of the unexpected token.
        found: String,
        /// Byte offset of the token.
        at: usize,
    },

    /// The expression ended where more input was required.
    #[error("unexpected end of expression")]
    UnexpectedEnd,
}

/// Structural problems found by the static validator.
///
/// All of these are load-time errors; a predicate that trips any of them
/// keeps the whole registry from loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Identifier root outside `{state, transition, registry, ordering}`.
    #[error("unknown root identifier '{0}'")]
    UnknownRoot(String),

    /// Path touching a declared-semantic segment (`data*`, `content*`,
    /// `embedding*`), at any depth.
    #[error("forbidden semantic path '{0}'")]
    ForbiddenPath(String),

    /// Path outside the allowed structural suffixes for its root.
    #[error("path '{0}' is not an allowed structural field")]
    DisallowedPath(String),

    /// The registry root used as a plain identifier instead of a call.
    #[error("the registry may only be queried through builtin calls, found '{0}'")]
    RegistryAccess(String),

    /// Call to a function outside the closed builtin set.
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// Call to a builtin with the wrong number of arguments.
    #[error("function '{name}' expects {expected} argument(s), found {found}")]
    WrongArity {
        /// Function name as written.
        name: String,
        /// Human rendering of the accepted arity.
        expected: String,
        /// Number of arguments supplied.
        found: usize,
    },
}

/// Problems with an invariant definition outside its expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantDefinitionError {
    /// `condition.type` is something other than `"predicate"`.
    #[error("unsupported condition type '{0}' (expected \"predicate\")")]
    UnsupportedConditionType(String),

    /// Two invariants share an id.
    #[error("duplicate invariant id")]
    DuplicateId,
}

/// A predicate attempted an illegal operation at evaluation time.
///
/// Trapped by the top-level evaluator and converted to `false`; callers of
/// the public evaluation entry point never observe this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// A relational operator was applied to a non-numeric operand.
    #[error("comparison '{op}' requires numeric operands")]
    NonNumericComparison {
        /// The operator symbol.
        op: &'static str,
    },

    /// A builtin required a string argument and received something else.
    #[error("'{function}' expects a string argument")]
    ExpectedString {
        /// The builtin name.
        function: &'static str,
    },

    /// A call slipped past validation (defect guard; unreachable for
    /// registry-compiled predicates).
    #[error("unknown function '{0}' reached evaluation")]
    UnknownFunction(String),
}
