// crates/taskdef-core/src/validation/normalize.rs
// ============================================================================
// Module: Container Definitions Normalization
// Description: Canonical form of container definitions for equality checks.
// Purpose: Keep equivalent documents from producing a diff.
// Dependencies: serde_json, serde_jcs
// ============================================================================

//! ## Overview
//! Two container definition documents are equivalent when they differ only in
//! key order, whitespace, explicit nulls, empty lists or objects, or an
//! explicit `"essential": true` (the registry default). Normalization removes
//! all of these and renders RFC 8785 canonical JSON, so equivalence becomes
//! string equality. Array order is significant and preserved.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::core::ContainerDefinition;
use crate::core::hashing::HashError;
use crate::core::hashing::canonical_json_string;
use crate::validation::FieldError;
use crate::validation::parse_container_definitions;

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Validates a container definitions document and returns its canonical form.
///
/// # Errors
///
/// Returns the validator's [`FieldError`]s, or a single error when
/// canonicalization fails.
pub fn normalize_container_definitions(text: &str, field: &str) -> Result<String, Vec<FieldError>> {
    let definitions = parse_container_definitions(text, field)?;
    normalized_container_definitions(&definitions)
        .map_err(|err| vec![FieldError::invalid(field, err.to_string())])
}

/// Returns the canonical form of decoded container definitions.
///
/// # Errors
///
/// Returns [`HashError`] when the definitions cannot be serialized.
pub fn normalized_container_definitions(
    definitions: &[ContainerDefinition],
) -> Result<String, HashError> {
    let mut value =
        serde_json::to_value(definitions).map_err(|err| HashError::Canonicalization(err.to_string()))?;
    if let Value::Array(containers) = &mut value {
        for (definition, container) in definitions.iter().zip(containers.iter_mut()) {
            if definition.is_essential()
                && let Value::Object(map) = container
            {
                map.remove("essential");
            }
            strip_empty(container);
        }
    }
    canonical_json_string(&value)
}

/// Removes nulls and empty containers from object members, recursively.
fn strip_empty(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for member in map.values_mut() {
                strip_empty(member);
            }
            map.retain(|_, member| !is_empty(member));
        }
        Value::Array(items) => {
            for item in items {
                strip_empty(item);
            }
        }
        _ => {}
    }
}

/// Returns true for null, `[]`, and `{}`.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
