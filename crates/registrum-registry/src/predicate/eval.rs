//! # Predicate Evaluation
//!
//! Pure tree-walking evaluation of validated predicates against an
//! [`EvalContext`]. No caching, no I/O, bounded steps.
//!
//! ## Fail closed
//!
//! An illegal operation at runtime (comparing non-numerics, handing a
//! non-string to `registry.contains_state`) raises [`EvaluationError`]
//! internally. The public entry point [`evaluate`] traps it and returns
//! `false`: on uncertainty the invariant refuses. The error never reaches a
//! caller.
//!
//! ## Semantics
//!
//! - Truthiness: `false`, `null`, `0`, `""` are false; every other value,
//!   including `[]` and `{}`, is true.
//! - Strict equality: same type and value; `null` equals `null` and nothing
//!   else. Integer-valued numbers compare numerically.
//! - `&&` / `||` short-circuit on truthiness and yield a boolean.
//! - Relational operators require numeric operands on both sides.
//! - Absent paths resolve to `null`.

use serde_json::Value;

use crate::context::EvalContext;
use crate::error::EvaluationError;
use crate::predicate::ast::{BinaryOp, Expr, Literal};

/// Evaluates a predicate to its boolean verdict, trapping runtime errors to
/// `false`.
pub fn evaluate(expr: &Expr, ctx: &EvalContext<'_>) -> bool {
    match eval_expr(expr, ctx) {
        Ok(value) => truthy(&value),
        Err(_) => false,
    }
}

/// Evaluates a predicate, surfacing runtime errors.
///
/// Exposed for tests that assert on the trapped error class; production
/// callers go through [`evaluate`].
pub fn eval_expr(expr: &Expr, ctx: &EvalContext<'_>) -> Result<Value, EvaluationError> {
    match expr {
        Expr::Literal(literal) => Ok(literal_value(literal)),
        Expr::Identifier(path) => Ok(resolve_path(ctx, path)),
        Expr::Not(inner) => {
            let value = eval_expr(inner, ctx)?;
            Ok(Value::Bool(!truthy(&value)))
        }
        Expr::Binary { op, left, right } => eval_binary(*op, left, right, ctx),
        Expr::Call { name, args } => eval_call(name, args, ctx),
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Int(i) => Value::from(*i),
        Literal::Str(s) => Value::String(s.clone()),
        Literal::Null => Value::Null,
    }
}

fn eval_binary(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    ctx: &EvalContext<'_>,
) -> Result<Value, EvaluationError> {
    match op {
        BinaryOp::And => {
            let lhs = eval_expr(left, ctx)?;
            if !truthy(&lhs) {
                return Ok(Value::Bool(false));
            }
            let rhs = eval_expr(right, ctx)?;
            Ok(Value::Bool(truthy(&rhs)))
        }
        BinaryOp::Or => {
            let lhs = eval_expr(left, ctx)?;
            if truthy(&lhs) {
                return Ok(Value::Bool(true));
            }
            let rhs = eval_expr(right, ctx)?;
            Ok(Value::Bool(truthy(&rhs)))
        }
        BinaryOp::Eq => {
            let lhs = eval_expr(left, ctx)?;
            let rhs = eval_expr(right, ctx)?;
            Ok(Value::Bool(strict_eq(&lhs, &rhs)))
        }
        BinaryOp::Ne => {
            let lhs = eval_expr(left, ctx)?;
            let rhs = eval_expr(right, ctx)?;
            Ok(Value::Bool(!strict_eq(&lhs, &rhs)))
        }
        BinaryOp::Gt | BinaryOp::Lt | BinaryOp::Ge | BinaryOp::Le => {
            let lhs = eval_expr(left, ctx)?;
            let rhs = eval_expr(right, ctx)?;
            let (a, b) = (
                as_number(&lhs, op.symbol())?,
                as_number(&rhs, op.symbol())?,
            );
            let result = match op {
                BinaryOp::Gt => a > b,
                BinaryOp::Lt => a < b,
                BinaryOp::Ge => a >= b,
                BinaryOp::Le => a <= b,
                _ => unreachable!("relational arm"),
            };
            Ok(Value::Bool(result))
        }
    }
}

fn eval_call(
    name: &str,
    args: &[Expr],
    ctx: &EvalContext<'_>,
) -> Result<Value, EvaluationError> {
    match name {
        "exists" => {
            let value = eval_expr(&args[0], ctx)?;
            Ok(Value::Bool(!value.is_null()))
        }
        "is_string" => {
            let value = eval_expr(&args[0], ctx)?;
            Ok(Value::Bool(value.is_string()))
        }
        "is_number" => {
            let value = eval_expr(&args[0], ctx)?;
            Ok(Value::Bool(value.is_number()))
        }
        "is_boolean" => {
            let value = eval_expr(&args[0], ctx)?;
            Ok(Value::Bool(value.is_boolean()))
        }
        "equals" => {
            let a = eval_expr(&args[0], ctx)?;
            let b = eval_expr(&args[1], ctx)?;
            Ok(Value::Bool(strict_eq(&a, &b)))
        }
        "registry.contains_state" => {
            let value = eval_expr(&args[0], ctx)?;
            let id = value.as_str().ok_or(EvaluationError::ExpectedString {
                function: "registry.contains_state",
            })?;
            Ok(Value::Bool(ctx.registry().contains_state(id)))
        }
        "registry.max_order_index" => Ok(Value::from(ctx.registry().max_order_index())),
        // The optional argument names the transition under judgment; the
        // computation itself depends only on the registry.
        "registry.compute_order_index" => Ok(Value::from(ctx.registry().next_order_index())),
        other => Err(EvaluationError::UnknownFunction(other.to_string())),
    }
}

/// Walks a dotted path through the context's structural projections.
/// Missing keys and non-object intermediates resolve to null.
fn resolve_path(ctx: &EvalContext<'_>, path: &[String]) -> Value {
    let mut current = ctx.root_value(&path[0]);
    for segment in &path[1..] {
        current = match current {
            Value::Object(ref map) => map.get(segment).cloned().unwrap_or(Value::Null),
            _ => Value::Null,
        };
    }
    current
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i != 0
            } else if let Some(u) = n.as_u64() {
                u != 0
            } else {
                n.as_f64().map(|f| f != 0.0).unwrap_or(false)
            }
        }
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => number_eq(x, y),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| strict_eq(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| strict_eq(v, w)))
        }
        _ => false,
    }
}

fn number_eq(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => return x == y,
        _ => {}
    }
    match (a.as_u64(), b.as_u64()) {
        (Some(x), Some(y)) => return x == y,
        _ => {}
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn as_number(value: &Value, op: &'static str) -> Result<f64, EvaluationError> {
    value
        .as_f64()
        .ok_or(EvaluationError::NonNumericComparison { op })
}
