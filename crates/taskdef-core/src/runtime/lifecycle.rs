// crates/taskdef-core/src/runtime/lifecycle.rs
// ============================================================================
// Module: Lifecycle State Machine
// Description: States of a declared task definition and their legal moves.
// Purpose: Let the engine refuse transitions the lifecycle does not allow.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! ```text
//! Absent -> Planned -> Creating -> Active -> Replacing -> Active
//!                                  Active -> Active (in-place revision)
//!                                  Active -> Destroying -> Inactive -> Planned
//! ```
//! Failed remote steps fall back to the state they started from.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Lifecycle State
// ============================================================================

/// Lifecycle state of one declared task definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Nothing registered.
    Absent,
    /// Desired spec validated locally; nothing registered yet.
    Planned,
    /// First registration in flight.
    Creating,
    /// A registered revision is ACTIVE.
    Active,
    /// Replacement revision registered; old revision being deregistered.
    Replacing,
    /// Deregistration in flight.
    Destroying,
    /// Latest revision deregistered.
    Inactive,
}

impl LifecycleState {
    /// Returns true when moving from `self` to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Absent | Self::Inactive, Self::Planned)
                | (Self::Planned, Self::Creating | Self::Absent)
                | (Self::Creating, Self::Active | Self::Absent)
                | (Self::Active, Self::Active | Self::Replacing | Self::Destroying)
                | (Self::Replacing | Self::Destroying, Self::Active)
                | (Self::Destroying, Self::Inactive)
        )
    }

    /// Returns the snake_case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Planned => "planned",
            Self::Creating => "creating",
            Self::Active => "active",
            Self::Replacing => "replacing",
            Self::Destroying => "destroying",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
