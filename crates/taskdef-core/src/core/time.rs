// crates/taskdef-core/src/core/time.rs
// ============================================================================
// Module: Task Definition Time Model
// Description: Timestamps attached to registry records and audit events.
// Purpose: Keep fake registries deterministic while real backends use wall time.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Registry records carry a registration timestamp and, once deregistered, a
//! deregistration timestamp. The in-memory registry stamps logical ticks so
//! tests are reproducible; the SQLite registry and the lifecycle engine stamp
//! unix milliseconds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Timestamp stored on task definition records.
///
/// # Invariants
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Timestamp {
    /// Unix epoch milliseconds.
    UnixMillis(i64),
    /// Monotonic logical tick.
    Logical(u64),
}

/// Current unix time in milliseconds, saturating at `i64::MAX`.
#[must_use]
pub fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
}
