// crates/taskdef-core/src/interfaces/mod.rs
// ============================================================================
// Module: Task Definition Interfaces
// Description: Seams between the lifecycle engine and its collaborators.
// Purpose: Keep the engine independent of registry transport and log sinks.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The lifecycle engine reaches the outside world through two traits:
//! [`TaskDefinitionRegistry`] for remote registration state and
//! [`AuditSink`] for lifecycle events. Implementations live in this crate
//! (in-memory fakes), in `taskdef-store-sqlite`, and in the CLI.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::FamilyName;
use crate::core::RegisteredTaskDefinition;
use crate::core::Revision;
use crate::core::TaskDefinitionArn;
use crate::core::TaskDefinitionRecord;
use crate::core::TaskDefinitionRef;
use crate::core::TaskDefinitionSpec;
use crate::core::TaskDefinitionStatus;
use crate::runtime::LifecycleState;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Registry errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - The lifecycle engine passes these through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The referenced family or revision does not exist.
    #[error("task definition not found: {0}")]
    NotFound(String),
    /// The registry rejected the request.
    #[error("task definition registry rejected request: {0}")]
    Invalid(String),
    /// Transport or backend failure.
    #[error("task definition registry error: {0}")]
    Remote(String),
}

/// Remote store of task definition revisions.
///
/// Implementations assign revisions: each family's revisions strictly
/// increase and are never reused, even after deregistration.
pub trait TaskDefinitionRegistry {
    /// Registers `spec` as the next revision of its family.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when registration fails.
    fn register(&self, spec: &TaskDefinitionSpec) -> Result<RegisteredTaskDefinition, RegistryError>;

    /// Describes a revision. A family reference resolves to its latest
    /// revision, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for unknown references.
    fn describe(&self, reference: &TaskDefinitionRef) -> Result<TaskDefinitionRecord, RegistryError>;

    /// Marks a revision `INACTIVE` and returns its resulting status.
    /// Deregistering an inactive revision is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for unknown ARNs.
    fn deregister(&self, arn: &TaskDefinitionArn) -> Result<TaskDefinitionStatus, RegistryError>;
}

impl<T: TaskDefinitionRegistry + ?Sized> TaskDefinitionRegistry for Box<T> {
    fn register(&self, spec: &TaskDefinitionSpec) -> Result<RegisteredTaskDefinition, RegistryError> {
        (**self).register(spec)
    }

    fn describe(&self, reference: &TaskDefinitionRef) -> Result<TaskDefinitionRecord, RegistryError> {
        (**self).describe(reference)
    }

    fn deregister(&self, arn: &TaskDefinitionArn) -> Result<TaskDefinitionStatus, RegistryError> {
        (**self).deregister(arn)
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink errors.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Event serialization failed.
    #[error("audit serialization error: {0}")]
    Serialize(String),
    /// Sink write failed.
    #[error("audit io error: {0}")]
    Io(String),
}

/// Outcome of a lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOutcome {
    /// The step completed.
    Success,
    /// The step failed; `detail` carries the error.
    Failure,
}

/// One lifecycle transition as recorded in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// Event name (`lifecycle_transition`).
    pub event: String,
    /// Wall-clock time in unix milliseconds.
    pub timestamp_ms: i64,
    /// Family the transition applies to.
    pub family: FamilyName,
    /// State before the transition.
    pub from: LifecycleState,
    /// State after the transition.
    pub to: LifecycleState,
    /// Revision involved, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<Revision>,
    /// ARN involved, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<TaskDefinitionArn>,
    /// Step outcome.
    pub outcome: EventOutcome,
    /// Error text or other context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Destination for lifecycle events.
pub trait AuditSink {
    /// Records one event.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] when the event cannot be written.
    fn record(&self, event: &LifecycleEvent) -> Result<(), AuditError>;
}

impl<T: AuditSink + ?Sized> AuditSink for Box<T> {
    fn record(&self, event: &LifecycleEvent) -> Result<(), AuditError> {
        (**self).record(event)
    }
}
