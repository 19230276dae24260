// crates/taskdef-core/src/validation/network_mode.rs
// ============================================================================
// Module: Network Mode Validation
// Description: Membership checks for Docker network mode strings.
// Purpose: Reject unknown network modes before registration.
// Dependencies: crate::validation
// ============================================================================

//! ## Overview
//! Two validators share one rule set. [`validate_network_mode`] accepts the
//! container-level Docker modes only. [`validate_task_network_mode`] is the
//! attribute validator for a whole task definition and also admits `awsvpc`.
//! Matching is exact and case-sensitive: `Bridge` and `bridged` are rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::NetworkMode;
use crate::validation::FieldError;

// ============================================================================
// SECTION: Validators
// ============================================================================

/// Docker network modes accepted by [`validate_network_mode`].
pub const CONTAINER_NETWORK_MODES: [&str; 3] = ["bridge", "host", "none"];

/// Validates a Docker network mode.
///
/// Returns an empty list for `bridge`, `host`, or `none` and exactly one
/// error naming `field` and the rejected value otherwise.
#[must_use]
pub fn validate_network_mode(value: &str, field: &str) -> Vec<FieldError> {
    if CONTAINER_NETWORK_MODES.contains(&value) {
        return Vec::new();
    }
    vec![FieldError::invalid(
        field,
        format!(
            "network mode {value:?} is not supported; expected one of {}",
            CONTAINER_NETWORK_MODES.join(", ")
        ),
    )]
}

/// Validates a task-level network mode: `awsvpc` or any Docker network mode.
#[must_use]
pub fn validate_task_network_mode(value: &str, field: &str) -> Vec<FieldError> {
    if value == NetworkMode::Awsvpc.as_str() {
        return Vec::new();
    }
    validate_network_mode(value, field)
}
