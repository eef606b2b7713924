//! # Canonical JSON Encoding
//!
//! Deterministic JSON serialization used for every hash Registrum produces.
//! Semantically identical documents must encode to identical byte sequences,
//! otherwise snapshot hashes, registry hashes, and attestation hashes would
//! depend on serialization accidents.
//!
//! ## Rules
//!
//! 1. **Object keys**: sorted lexicographically by Unicode code point at
//!    every depth
//! 2. **Arrays**: element order preserved
//! 3. **Numbers**: integers without exponent or fraction drift (`1`, never
//!    `1.0` or `1e0`); snapshot positions only ever contain integers
//! 4. **Strings**: minimal escaping (`"`, `\`, and control characters)
//! 5. **Whitespace**: none in the compact form
//!
//! The compact form is the hashing input. [`canonicalize_pretty`] produces a
//! two-space-indented rendering with the same key order for human-facing
//! output (attestation sinks); it is never hashed.
//!
//! ## Example
//!
//! ```rust
//! use registrum_registry::canonicalize::{canonicalize, hash_canonical};
//! use serde_json::json;
//!
//! let a = json!({"b": 1, "a": 2});
//! let b = json!({"a": 2, "b": 1});
//!
//! assert_eq!(canonicalize(&a), canonicalize(&b));
//! assert_eq!(canonicalize(&a), r#"{"a":2,"b":1}"#);
//! assert_eq!(hash_canonical(&a), hash_canonical(&b));
//! ```

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Canonicalizes a JSON value to its compact deterministic form.
///
/// The contract is an iff: `canonicalize(x) == canonicalize(y)` exactly when
/// `x` and `y` are structurally equal.
pub fn canonicalize(value: &Value) -> String {
    let mut out = String::new();
    write_compact(&mut out, value);
    out
}

/// Canonicalizes a JSON value with two-space indentation.
///
/// Key order matches [`canonicalize`]; only whitespace differs. Intended for
/// human inspection of emitted attestations.
pub fn canonicalize_pretty(value: &Value) -> String {
    let mut out = String::new();
    write_pretty(&mut out, value, 0);
    out
}

/// Computes the SHA-256 hash of the compact canonical form.
///
/// Returns the digest as 64 lowercase hex characters. This is the single
/// hashing primitive behind `registry_hash`, `snapshot_hash`, and the
/// attestation payload hash.
pub fn hash_canonical(value: &Value) -> String {
    let canonical = canonicalize(value);
    let digest = Sha256::digest(canonical.as_bytes());
    let mut hex = String::with_capacity(64);
    for byte in digest {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

fn write_compact(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => out.push_str(&encode_number(n)),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_compact(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_compact(out, &map[*key]);
            }
            out.push('}');
        }
    }
}

fn write_pretty(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Array(items) if !items.is_empty() => {
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                indent(out, depth + 1);
                write_pretty(out, item, depth + 1);
            }
            out.push('\n');
            indent(out, depth);
            out.push(']');
        }
        Value::Object(map) if !map.is_empty() => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push_str("{\n");
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                indent(out, depth + 1);
                write_string(out, key);
                out.push_str(": ");
                write_pretty(out, &map[*key], depth + 1);
            }
            out.push('\n');
            indent(out, depth);
            out.push('}');
        }
        other => write_compact(out, other),
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

/// Encodes a JSON number without exponent drift.
///
/// Integer-valued numbers always render as integers. Snapshot and ordering
/// positions are specified as integers, so the float branch only exists for
/// opaque structure fields that happen to carry fractions.
fn encode_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                (f as i64).to_string()
            } else {
                format!("{f}")
            }
        }
        // Non-finite values are not representable in JSON.
        _ => "null".to_string(),
    }
}

/// Writes a JSON string with minimal escaping.
///
/// Escaped: `"`, `\`, and control characters below 0x20. Everything else,
/// including non-ASCII, passes through as UTF-8.
fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\x08' => out.push_str("\\b"),
            '\x0c' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c < '\x20' => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}
