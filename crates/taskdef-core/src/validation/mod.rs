// crates/taskdef-core/src/validation/mod.rs
// ============================================================================
// Module: Task Definition Validation
// Description: Local validators for task definition attributes.
// Purpose: Reject bad configuration before any registry call.
// Dependencies: jsonschema, serde_json
// ============================================================================

//! ## Overview
//! Validators are pure functions of their input. Each returns every problem it
//! finds as a [`FieldError`] naming the offending field, and an empty list on
//! success. The lifecycle engine runs them during planning, so a failing
//! validator always short-circuits before the registry is touched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Submodules
// ============================================================================

mod container_definitions;
mod network_mode;
mod normalize;
mod spec_rules;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use container_definitions::container_definitions_schema;
pub use container_definitions::parse_container_definitions;
pub use container_definitions::validate_container_definitions;
pub use network_mode::CONTAINER_NETWORK_MODES;
pub use network_mode::validate_network_mode;
pub use network_mode::validate_task_network_mode;
pub use normalize::normalize_container_definitions;
pub use normalize::normalized_container_definitions;
pub use spec_rules::validate_spec;

// ============================================================================
// SECTION: Field Errors
// ============================================================================

/// Category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// Input is not well-formed (not JSON, wrong top-level shape).
    Parse,
    /// Input is well-formed but violates the document schema.
    Schema,
    /// Input violates a semantic rule (enum membership, cross-reference).
    Invalid,
}

/// One validation failure attributed to a configuration field.
///
/// # Invariants
/// - `field` is the user-facing attribute path, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Attribute path (e.g. `network_mode`, `task_definition.web.volume`).
    pub field: String,
    /// Failure category.
    pub kind: FieldErrorKind,
    /// Human-readable description including the offending value.
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    #[must_use]
    pub fn new(field: impl Into<String>, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }

    /// Creates a [`FieldErrorKind::Parse`] error.
    #[must_use]
    pub fn parse(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, FieldErrorKind::Parse, message)
    }

    /// Creates a [`FieldErrorKind::Schema`] error.
    #[must_use]
    pub fn schema(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, FieldErrorKind::Schema, message)
    }

    /// Creates a [`FieldErrorKind::Invalid`] error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, FieldErrorKind::Invalid, message)
    }

    /// Returns a copy addressed under `prefix` (`prefix.field`).
    #[must_use]
    pub fn prefixed(&self, prefix: &str) -> Self {
        Self {
            field: format!("{prefix}.{}", self.field),
            kind: self.kind,
            message: self.message.clone(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldError {}
