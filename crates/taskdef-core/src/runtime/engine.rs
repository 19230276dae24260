// crates/taskdef-core/src/runtime/engine.rs
// ============================================================================
// Module: Lifecycle Engine
// Description: Plan, apply, destroy, and refresh for task definitions.
// Purpose: Drive the declarative lifecycle against an injected registry.
// Dependencies: crate::{core, interfaces, validation}, thiserror
// ============================================================================

//! ## Overview
//! [`LifecycleEngine`] owns a [`TaskDefinitionRegistry`] and an [`AuditSink`].
//! Current state is never stored locally: [`LifecycleEngine::refresh`]
//! describes the family's latest revision and treats an `INACTIVE` one as
//! absent. Planning validates the desired spec first, so invalid input never
//! reaches the registry.
//!
//! Invariants enforced while applying:
//! - every revision returned by `register` exceeds every revision the engine
//!   has observed for that family;
//! - a replacement never reuses the revision it replaces;
//! - destroy leaves no revision of the family `ACTIVE`, and is confirmed by
//!   describing the ARN and finding it `INACTIVE`.
//!
//! Registry errors propagate unchanged and are never retried.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::MutexGuard;

use thiserror::Error;

use crate::core::FamilyName;
use crate::core::RegisteredTaskDefinition;
use crate::core::Revision;
use crate::core::TaskDefinitionArn;
use crate::core::TaskDefinitionRecord;
use crate::core::TaskDefinitionRef;
use crate::core::TaskDefinitionSpec;
use crate::core::TaskDefinitionStatus;
use crate::core::time::unix_millis;
use crate::interfaces::AuditSink;
use crate::interfaces::EventOutcome;
use crate::interfaces::LifecycleEvent;
use crate::interfaces::RegistryError;
use crate::interfaces::TaskDefinitionRegistry;
use crate::runtime::audit::NoopAuditSink;
use crate::runtime::diff;
use crate::runtime::diff::Plan;
use crate::runtime::diff::PlanAction;
use crate::runtime::lifecycle::LifecycleState;
use crate::validation::FieldError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Lifecycle engine errors.
///
/// # Invariants
/// - `ConfigValidation` is only raised before any registry call.
/// - `Remote` carries the registry error exactly as returned.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Desired configuration failed local validation.
    #[error("configuration invalid: {}", join_field_errors(.0))]
    ConfigValidation(Vec<FieldError>),
    /// Registry call failed.
    #[error("remote error: {0}")]
    Remote(RegistryError),
    /// Registry behavior broke a lifecycle guarantee.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    /// Requested transition is not allowed from the current state.
    #[error("invalid lifecycle transition from {from} to {to}")]
    InvalidTransition {
        /// Current state.
        from: LifecycleState,
        /// Requested state.
        to: LifecycleState,
    },
    /// Spec canonicalization failed.
    #[error("hashing error: {0}")]
    Hash(String),
    /// Audit sink failed.
    #[error("audit error: {0}")]
    Audit(String),
}

impl From<RegistryError> for LifecycleError {
    fn from(err: RegistryError) -> Self {
        Self::Remote(err)
    }
}

/// Renders field errors as a `; `-separated list.
fn join_field_errors(errors: &[FieldError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

// ============================================================================
// SECTION: Resource State
// ============================================================================

/// Current state of a family as seen through the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// No ACTIVE latest revision.
    Absent,
    /// Latest revision is ACTIVE.
    Active(Box<TaskDefinitionRecord>),
}

impl ResourceState {
    /// Returns the lifecycle state this resource state corresponds to.
    #[must_use]
    pub const fn lifecycle_state(&self) -> LifecycleState {
        match self {
            Self::Absent => LifecycleState::Absent,
            Self::Active(_) => LifecycleState::Active,
        }
    }

    /// Returns the current record, if any.
    #[must_use]
    pub fn record(&self) -> Option<&TaskDefinitionRecord> {
        match self {
            Self::Absent => None,
            Self::Active(record) => Some(record.as_ref()),
        }
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Declarative lifecycle engine for task definitions.
pub struct LifecycleEngine<R, A = NoopAuditSink> {
    /// Remote registry.
    registry: R,
    /// Lifecycle event sink.
    audit: A,
    /// Highest revision observed per family.
    observed: Mutex<BTreeMap<FamilyName, Revision>>,
}

impl<R: TaskDefinitionRegistry> LifecycleEngine<R> {
    /// Creates an engine that discards lifecycle events.
    #[must_use]
    pub fn without_audit(registry: R) -> Self {
        Self::new(registry, NoopAuditSink)
    }
}

impl<R: TaskDefinitionRegistry, A: AuditSink> LifecycleEngine<R, A> {
    /// Creates an engine over a registry and an audit sink.
    #[must_use]
    pub fn new(registry: R, audit: A) -> Self {
        Self {
            registry,
            audit,
            observed: Mutex::new(BTreeMap::new()),
        }
    }

    /// Returns the registry.
    #[must_use]
    pub const fn registry(&self) -> &R {
        &self.registry
    }

    /// Returns the audit sink.
    #[must_use]
    pub const fn audit(&self) -> &A {
        &self.audit
    }

    /// Describes the family's latest revision.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Remote`] for registry failures other than
    /// not-found.
    pub fn refresh(&self, family: &FamilyName) -> Result<ResourceState, LifecycleError> {
        match self.registry.describe(&TaskDefinitionRef::from(family)) {
            Ok(record) => {
                self.observe(&record.family, record.revision)?;
                if record.is_active() {
                    Ok(ResourceState::Active(Box::new(record)))
                } else {
                    Ok(ResourceState::Absent)
                }
            }
            Err(RegistryError::NotFound(_)) => Ok(ResourceState::Absent),
            Err(err) => Err(LifecycleError::Remote(err)),
        }
    }

    /// Validates `desired` and plans it against `current`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::ConfigValidation`] without touching the
    /// registry when `desired` is invalid.
    pub fn plan(
        &self,
        desired: &TaskDefinitionSpec,
        current: &ResourceState,
    ) -> Result<Plan, LifecycleError> {
        validate_desired(desired)?;
        let plan = diff::plan(&desired.family, Some(desired), current.record())
            .map_err(|err| LifecycleError::Hash(err.to_string()))?;
        if plan.action == PlanAction::Create {
            self.transition(&plan.family, current.lifecycle_state(), LifecycleState::Planned, None)?;
        }
        Ok(plan)
    }

    /// Plans deregistration of the current revision.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Hash`] when planning fails.
    pub fn plan_destroy(
        &self,
        family: &FamilyName,
        current: &ResourceState,
    ) -> Result<Plan, LifecycleError> {
        diff::plan(family, None, current.record()).map_err(|err| LifecycleError::Hash(err.to_string()))
    }

    /// Executes a plan and returns the resulting state.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] when the plan is stale, validation fails,
    /// the registry fails, or the registry breaks a lifecycle invariant.
    pub fn apply(&self, plan: &Plan, current: &ResourceState) -> Result<ResourceState, LifecycleError> {
        let prior = current.record().map(TaskDefinitionRecord::registered);
        if plan.prior != prior {
            return Err(LifecycleError::InvariantViolation(format!(
                "plan for {} was computed against a different revision",
                plan.family
            )));
        }
        match plan.action {
            PlanAction::NoOp => Ok(current.clone()),
            PlanAction::Destroy => self.destroy(current).map(|_| ResourceState::Absent),
            PlanAction::Create => self.create(&plan.family, desired_spec(plan)?),
            PlanAction::UpdateInPlace => {
                let prior = required_prior(plan)?;
                self.update_in_place(&plan.family, desired_spec(plan)?, prior)
            }
            PlanAction::Replace => {
                let prior = required_prior(plan)?;
                self.replace(&plan.family, desired_spec(plan)?, prior)
            }
        }
    }

    /// Deregisters every active revision of the family and confirms the
    /// current one is `INACTIVE`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidTransition`] when nothing is active,
    /// [`LifecycleError::Remote`] for registry failures, and
    /// [`LifecycleError::InvariantViolation`] when the revision stays active.
    pub fn destroy(&self, current: &ResourceState) -> Result<TaskDefinitionRecord, LifecycleError> {
        let Some(record) = current.record() else {
            return Err(LifecycleError::InvalidTransition {
                from: current.lifecycle_state(),
                to: LifecycleState::Destroying,
            });
        };
        let family = &record.family;
        let registered = record.registered();
        self.transition(family, LifecycleState::Active, LifecycleState::Destroying, Some(&registered))?;
        let outcome = self
            .deregister_superseded(record)
            .and_then(|()| self.deregister_checked(&record.arn))
            .and_then(|()| self.verify_destroyed(&record.arn));
        match outcome {
            Ok(inactive) => {
                self.transition(
                    family,
                    LifecycleState::Destroying,
                    LifecycleState::Inactive,
                    Some(&registered),
                )?;
                Ok(inactive)
            }
            Err(err) => self.fail(
                family,
                LifecycleState::Destroying,
                LifecycleState::Active,
                Some(&registered),
                err,
            ),
        }
    }

    /// Deregisters `arn` and requires the registry to report `INACTIVE`.
    fn deregister_checked(&self, arn: &TaskDefinitionArn) -> Result<(), LifecycleError> {
        let status = self.registry.deregister(arn)?;
        if status == TaskDefinitionStatus::Inactive {
            Ok(())
        } else {
            Err(LifecycleError::InvariantViolation(format!(
                "{arn} reported {status} after deregistration"
            )))
        }
    }

    /// Deregisters older revisions of the family that are still `ACTIVE`.
    ///
    /// In-place updates leave their predecessors active, so destroy walks
    /// every revision below the current one. Revisions the registry no
    /// longer knows are skipped.
    fn deregister_superseded(&self, current: &TaskDefinitionRecord) -> Result<(), LifecycleError> {
        for raw in (1 .. current.revision.get()).rev() {
            let Some(revision) = Revision::from_raw(raw) else {
                continue;
            };
            let reference = TaskDefinitionRef::Revision {
                family: current.family.clone(),
                revision,
            };
            match self.registry.describe(&reference) {
                Ok(record) if record.is_active() => self.deregister_checked(&record.arn)?,
                Ok(_) | Err(RegistryError::NotFound(_)) => {}
                Err(err) => return Err(LifecycleError::Remote(err)),
            }
        }
        Ok(())
    }

    /// Describes `arn` and requires it to be `INACTIVE`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvariantViolation`] when the revision is
    /// still `ACTIVE`, and [`LifecycleError::Remote`] when describe fails
    /// (including not-found: deregistered revisions must stay describable).
    pub fn verify_destroyed(
        &self,
        arn: &TaskDefinitionArn,
    ) -> Result<TaskDefinitionRecord, LifecycleError> {
        let record = self.registry.describe(&TaskDefinitionRef::from(arn))?;
        if record.status == TaskDefinitionStatus::Inactive {
            Ok(record)
        } else {
            Err(LifecycleError::InvariantViolation(format!(
                "{arn} is {} after destroy; expected {}",
                record.status,
                TaskDefinitionStatus::Inactive
            )))
        }
    }

    // ------------------------------------------------------------------------
    // Plan actions
    // ------------------------------------------------------------------------

    /// Registers the first revision.
    fn create(
        &self,
        family: &FamilyName,
        desired: &TaskDefinitionSpec,
    ) -> Result<ResourceState, LifecycleError> {
        validate_desired(desired)?;
        self.transition(family, LifecycleState::Planned, LifecycleState::Creating, None)?;
        match self.register_and_describe(desired, None) {
            Ok(record) => self.activate(family, LifecycleState::Creating, record),
            Err(err) => self.fail(family, LifecycleState::Creating, LifecycleState::Absent, None, err),
        }
    }

    /// Registers a new revision and leaves the prior one ACTIVE.
    fn update_in_place(
        &self,
        family: &FamilyName,
        desired: &TaskDefinitionSpec,
        prior: &RegisteredTaskDefinition,
    ) -> Result<ResourceState, LifecycleError> {
        validate_desired(desired)?;
        match self.register_and_describe(desired, Some(prior)) {
            Ok(record) => self.activate(family, LifecycleState::Active, record),
            Err(err) => self.fail(
                family,
                LifecycleState::Active,
                LifecycleState::Active,
                Some(prior),
                err,
            ),
        }
    }

    /// Registers the replacement first, then deregisters the prior revision.
    fn replace(
        &self,
        family: &FamilyName,
        desired: &TaskDefinitionSpec,
        prior: &RegisteredTaskDefinition,
    ) -> Result<ResourceState, LifecycleError> {
        validate_desired(desired)?;
        self.transition(family, LifecycleState::Active, LifecycleState::Replacing, Some(prior))?;
        let outcome = self.register_and_describe(desired, Some(prior)).and_then(|record| {
            self.registry.deregister(&prior.arn)?;
            Ok(record)
        });
        match outcome {
            Ok(record) => self.activate(family, LifecycleState::Replacing, record),
            Err(err) => self.fail(
                family,
                LifecycleState::Replacing,
                LifecycleState::Active,
                Some(prior),
                err,
            ),
        }
    }

    /// Registers `desired` and reads the new revision back.
    fn register_and_describe(
        &self,
        desired: &TaskDefinitionSpec,
        prior: Option<&RegisteredTaskDefinition>,
    ) -> Result<TaskDefinitionRecord, LifecycleError> {
        let registered = self.registry.register(desired)?;
        if let Some(prior) = prior
            && (prior.revision == registered.revision || prior.arn == registered.arn)
        {
            return Err(LifecycleError::InvariantViolation(format!(
                "new revision {} of {} equals the revision it supersedes",
                registered.revision, desired.family
            )));
        }
        self.check_revision(&desired.family, registered.revision)?;
        Ok(self.registry.describe(&TaskDefinitionRef::from(&registered.arn))?)
    }

    /// Emits the transition into `Active` and wraps the record.
    fn activate(
        &self,
        family: &FamilyName,
        from: LifecycleState,
        record: TaskDefinitionRecord,
    ) -> Result<ResourceState, LifecycleError> {
        self.transition(family, from, LifecycleState::Active, Some(&record.registered()))?;
        Ok(ResourceState::Active(Box::new(record)))
    }

    // ------------------------------------------------------------------------
    // Bookkeeping
    // ------------------------------------------------------------------------

    /// Checks a transition and records it as successful.
    fn transition(
        &self,
        family: &FamilyName,
        from: LifecycleState,
        to: LifecycleState,
        registered: Option<&RegisteredTaskDefinition>,
    ) -> Result<(), LifecycleError> {
        if !from.can_transition_to(to) {
            return Err(LifecycleError::InvalidTransition {
                from,
                to,
            });
        }
        self.emit(family, from, to, registered, EventOutcome::Success, None)
    }

    /// Records a failed step and returns the original error.
    fn fail<T>(
        &self,
        family: &FamilyName,
        from: LifecycleState,
        to: LifecycleState,
        registered: Option<&RegisteredTaskDefinition>,
        err: LifecycleError,
    ) -> Result<T, LifecycleError> {
        // The step error wins over a failure to record it.
        self.emit(family, from, to, registered, EventOutcome::Failure, Some(err.to_string())).ok();
        Err(err)
    }

    /// Writes one audit event.
    fn emit(
        &self,
        family: &FamilyName,
        from: LifecycleState,
        to: LifecycleState,
        registered: Option<&RegisteredTaskDefinition>,
        outcome: EventOutcome,
        detail: Option<String>,
    ) -> Result<(), LifecycleError> {
        let event = LifecycleEvent {
            event: "lifecycle_transition".to_string(),
            timestamp_ms: unix_millis(),
            family: family.clone(),
            from,
            to,
            revision: registered.map(|registered| registered.revision),
            arn: registered.map(|registered| registered.arn.clone()),
            outcome,
            detail,
        };
        self.audit.record(&event).map_err(|err| LifecycleError::Audit(err.to_string()))
    }

    /// Requires `revision` to exceed every revision observed for `family`.
    fn check_revision(&self, family: &FamilyName, revision: Revision) -> Result<(), LifecycleError> {
        let mut observed = self.lock_observed()?;
        if let Some(previous) = observed.get(family)
            && revision <= *previous
        {
            return Err(LifecycleError::InvariantViolation(format!(
                "registry assigned revision {revision} to {family}, not above observed revision {previous}"
            )));
        }
        observed.insert(family.clone(), revision);
        drop(observed);
        Ok(())
    }

    /// Remembers a revision seen through describe.
    fn observe(&self, family: &FamilyName, revision: Revision) -> Result<(), LifecycleError> {
        let mut observed = self.lock_observed()?;
        let entry = observed.entry(family.clone()).or_insert(revision);
        if *entry < revision {
            *entry = revision;
        }
        drop(observed);
        Ok(())
    }

    /// Locks the observed-revision ledger.
    fn lock_observed(
        &self,
    ) -> Result<MutexGuard<'_, BTreeMap<FamilyName, Revision>>, LifecycleError> {
        self.observed
            .lock()
            .map_err(|_| LifecycleError::InvariantViolation("revision ledger mutex poisoned".to_string()))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Runs spec validation, mapping failures to `ConfigValidation`.
fn validate_desired(desired: &TaskDefinitionSpec) -> Result<(), LifecycleError> {
    desired.validate().map_err(|err| LifecycleError::ConfigValidation(err.field_errors().to_vec()))
}

/// Returns the plan's desired spec.
fn desired_spec(plan: &Plan) -> Result<&TaskDefinitionSpec, LifecycleError> {
    plan.desired.as_ref().ok_or_else(|| {
        LifecycleError::InvariantViolation(format!(
            "{} plan for {} has no desired spec",
            plan.action, plan.family
        ))
    })
}

/// Returns the revision the plan supersedes.
fn required_prior(plan: &Plan) -> Result<&RegisteredTaskDefinition, LifecycleError> {
    plan.prior.as_ref().ok_or_else(|| {
        LifecycleError::InvariantViolation(format!(
            "{} plan for {} has no prior revision",
            plan.action, plan.family
        ))
    })
}
