//! Typed syntax tree for RPEG v1 predicate expressions.
//!
//! The grammar is deliberately small: literals, dotted identifiers, one
//! unary operator, eight binary operators, and builtin calls. No loops, no
//! recursion, no user-defined functions; every tree evaluates in bounded
//! steps.

use std::fmt;

/// A predicate expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value.
    Literal(Literal),

    /// A dotted identifier path, e.g. `transition.to.id` as
    /// `["transition", "to", "id"]`. Always non-empty.
    Identifier(Vec<String>),

    /// Logical negation of the operand's truthiness.
    Not(Box<Expr>),

    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },

    /// A builtin call. `name` is the joined dotted path as written, e.g.
    /// `registry.contains_state`.
    Call {
        /// Function name.
        name: String,
        /// Argument expressions.
        args: Vec<Expr>,
    },
}

/// Literal values admitted by the grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `true` / `false`.
    Bool(bool),
    /// A 64-bit integer.
    Int(i64),
    /// A double-quoted string.
    Str(String),
    /// `null`.
    Null,
}

/// Binary operators, in the grammar's four precedence tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `==` strict equality.
    Eq,
    /// `!=` strict inequality.
    Ne,
    /// `>` numeric.
    Gt,
    /// `<` numeric.
    Lt,
    /// `>=` numeric.
    Ge,
    /// `<=` numeric.
    Le,
    /// `&&` short-circuiting conjunction.
    And,
    /// `||` short-circuiting disjunction.
    Or,
}

impl BinaryOp {
    /// The operator's source symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
            BinaryOp::Ge => ">=",
            BinaryOp::Le => "<=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl Expr {
    /// Joined dotted rendering of an identifier path.
    pub fn join_path(path: &[String]) -> String {
        path.join(".")
    }
}
