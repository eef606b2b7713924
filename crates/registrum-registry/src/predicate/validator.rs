//! # Static Predicate Validation
//!
//! Load-time gatekeeper for compiled predicates. Nothing unsafe may reach
//! the evaluator: unknown roots, paths outside the structural surface,
//! unknown functions, and wrong arities are all refused before any
//! evaluation happens, and the refusal takes the whole registry down with
//! it (all-or-nothing).
//!
//! ## Semantic paths
//!
//! `state.data` is an opaque payload the core never inspects. The validator
//! is the exhaustive gate: any path segment equal to or beginning with
//! `data`, `content`, or `embedding` is refused at any depth, under any
//! root. The evaluation context additionally never materializes payload
//! fields, so even a validator bypass could not resolve them.

use crate::error::ValidationError;
use crate::predicate::ast::Expr;

/// Identifier roots the grammar admits.
const ROOTS: [&str; 4] = ["state", "transition", "registry", "ordering"];

/// Path segment prefixes declared semantic and therefore unreachable.
const SEMANTIC_PREFIXES: [&str; 3] = ["data", "content", "embedding"];

/// Builtin functions and their accepted arities (min, max).
const BUILTINS: [(&str, usize, usize); 8] = [
    ("exists", 1, 1),
    ("is_string", 1, 1),
    ("is_number", 1, 1),
    ("is_boolean", 1, 1),
    ("equals", 2, 2),
    ("registry.contains_state", 1, 1),
    ("registry.max_order_index", 0, 0),
    ("registry.compute_order_index", 0, 1),
];

/// Validates a parsed predicate tree.
///
/// Returns every problem found, not just the first; the loader prefixes
/// them with the invariant id and aggregates across the registry.
pub fn validate(expr: &Expr) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    walk(expr, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn walk(expr: &Expr, errors: &mut Vec<ValidationError>) {
    match expr {
        Expr::Literal(_) => {}
        Expr::Identifier(path) => check_path(path, errors),
        Expr::Not(inner) => walk(inner, errors),
        Expr::Binary { left, right, .. } => {
            walk(left, errors);
            walk(right, errors);
        }
        Expr::Call { name, args } => check_call(name, args, errors),
    }
}

fn check_call(name: &str, args: &[Expr], errors: &mut Vec<ValidationError>) {
    match BUILTINS.iter().find(|(builtin, _, _)| *builtin == name) {
        None => errors.push(ValidationError::UnknownFunction(name.to_string())),
        Some((_, min, max)) => {
            if args.len() < *min || args.len() > *max {
                let expected = if min == max {
                    min.to_string()
                } else {
                    format!("{min} to {max}")
                };
                errors.push(ValidationError::WrongArity {
                    name: name.to_string(),
                    expected,
                    found: args.len(),
                });
            }
        }
    }

    for arg in args {
        // The optional argument of compute_order_index names the transition
        // as a whole; it is the one place a bare root is meaningful.
        if name == "registry.compute_order_index" {
            if let Expr::Identifier(path) = arg {
                if path.len() == 1 && path[0] == "transition" {
                    continue;
                }
            }
        }
        walk(arg, errors);
    }
}

fn check_path(path: &[String], errors: &mut Vec<ValidationError>) {
    let joined = Expr::join_path(path);
    let root = path[0].as_str();

    if !ROOTS.contains(&root) {
        errors.push(ValidationError::UnknownRoot(root.to_string()));
        return;
    }

    // Semantic segments are refused before shape checks so the diagnostic
    // names the real problem.
    if path[1..].iter().any(|segment| is_semantic(segment)) {
        errors.push(ValidationError::ForbiddenPath(joined));
        return;
    }

    let suffix = &path[1..];
    let allowed = match root {
        "state" => matches_state_suffix(suffix),
        "transition" => matches_transition_suffix(suffix),
        "ordering" => suffix == ["index"],
        "registry" => {
            errors.push(ValidationError::RegistryAccess(joined));
            return;
        }
        _ => unreachable!("root membership checked above"),
    };

    if !allowed {
        errors.push(ValidationError::DisallowedPath(joined));
    }
}

fn is_semantic(segment: &str) -> bool {
    SEMANTIC_PREFIXES
        .iter()
        .any(|prefix| segment.starts_with(prefix))
}

/// `state.id` or `state.structure(.…)*`.
fn matches_state_suffix(suffix: &[String]) -> bool {
    match suffix.first().map(String::as_str) {
        Some("id") => suffix.len() == 1,
        Some("structure") => true,
        _ => false,
    }
}

/// `transition.from`, `transition.to.id`, `transition.to.structure(.…)*`,
/// or `transition.metadata(.…)*`.
fn matches_transition_suffix(suffix: &[String]) -> bool {
    match suffix.first().map(String::as_str) {
        Some("from") => suffix.len() == 1,
        Some("to") => match suffix.get(1).map(String::as_str) {
            Some("id") => suffix.len() == 2,
            Some("structure") => true,
            _ => false,
        },
        Some("metadata") => true,
        _ => false,
    }
}
