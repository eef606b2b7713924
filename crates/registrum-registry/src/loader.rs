//! # Registry Loading
//!
//! Compiles a JSON invariant registry into a [`CompiledRegistry`]:
//! schema-check the document, then parse and statically validate every
//! predicate. The constraint is all-or-nothing: one bad invariant rejects
//! the whole registry with every problem listed, and there is no runtime
//! fallback or best-effort parsing.

use std::collections::BTreeSet;

use crate::canonicalize::hash_canonical;
use crate::error::{InvariantDefinitionError, RegistryError, Result};
use crate::models::{CompiledInvariant, CompiledRegistry, RegistryDocument, REGISTRY_VERSION};
use crate::predicate::parser::parse;
use crate::predicate::validator::validate;

/// The one condition kind this loader compiles.
const CONDITION_KIND: &str = "predicate";

/// Loads and compiles a registry from its JSON source.
///
/// # Errors
///
/// - [`RegistryError::Malformed`]: not JSON, or outside the schema
///   (unknown fields included);
/// - [`RegistryError::UnsupportedVersion`]: wrong `version`;
/// - [`RegistryError::Invalid`]: one or more invariants failed to
///   compile; every issue is listed, prefixed with the invariant id.
pub fn load_registry(source: &str) -> Result<CompiledRegistry> {
    let document: RegistryDocument = serde_json::from_str(source)?;
    compile_document(document)
}

/// Compiles an already-deserialized registry document.
pub fn compile_document(document: RegistryDocument) -> Result<CompiledRegistry> {
    if document.version != REGISTRY_VERSION {
        return Err(RegistryError::UnsupportedVersion(document.version));
    }

    // The hash covers the normalized document, so formatting accidents in
    // the source never change the registry identity.
    let normalized = serde_json::to_value(&document)?;
    let registry_hash = hash_canonical(&normalized);

    let mut issues: Vec<String> = Vec::new();
    let mut invariants: Vec<CompiledInvariant> = Vec::new();
    let mut seen_ids: BTreeSet<String> = BTreeSet::new();

    for spec in &document.invariants {
        if !seen_ids.insert(spec.id.clone()) {
            issues.push(format!("{}: {}", spec.id, InvariantDefinitionError::DuplicateId));
            continue;
        }

        if spec.condition.kind != CONDITION_KIND {
            issues.push(format!(
                "{}: {}",
                spec.id,
                InvariantDefinitionError::UnsupportedConditionType(spec.condition.kind.clone())
            ));
            continue;
        }

        let expr = match parse(&spec.condition.expression) {
            Ok(expr) => expr,
            Err(err) => {
                issues.push(format!("{}: {}", spec.id, err));
                continue;
            }
        };

        match validate(&expr) {
            Ok(()) => invariants.push(CompiledInvariant {
                id: spec.id.clone(),
                group: spec.group,
                scope: spec.scope,
                applies_to: spec.applies_to.clone(),
                description: spec.description.clone(),
                failure_mode: spec.failure_mode,
                predicate: expr,
            }),
            Err(errors) => {
                for err in errors {
                    issues.push(format!("{}: {}", spec.id, err));
                }
            }
        }
    }

    if !issues.is_empty() {
        return Err(RegistryError::Invalid { issues });
    }

    Ok(CompiledRegistry {
        registry_id: document.registry_id,
        version: document.version,
        registry_hash,
        invariants,
    })
}
