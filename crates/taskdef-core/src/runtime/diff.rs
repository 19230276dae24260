// crates/taskdef-core/src/runtime/diff.rs
// ============================================================================
// Module: Task Definition Diff
// Description: Attribute change policy table and plan construction.
// Purpose: Decide between no-op, in-place revision, and replacement.
// Dependencies: crate::{core, validation}
// ============================================================================

//! ## Overview
//! Every top-level attribute carries a [`ChangePolicy`]. Comparing a desired
//! spec against the registered one yields the list of changed attributes; the
//! strongest policy among them picks the [`PlanAction`]. Container definitions
//! are compared in normalized form, so formatting and omitted defaults never
//! register a change.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::FamilyName;
use crate::core::RegisteredTaskDefinition;
use crate::core::TaskDefinitionRecord;
use crate::core::TaskDefinitionSpec;
use crate::core::hashing::HashError;
use crate::validation::normalized_container_definitions;

// ============================================================================
// SECTION: Attribute Policies
// ============================================================================

/// Top-level attributes of a task definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAttribute {
    /// `family`.
    Family,
    /// `container_definitions`.
    ContainerDefinitions,
    /// `network_mode`.
    NetworkMode,
    /// `task_role_arn`.
    TaskRoleArn,
    /// `execution_role_arn`.
    ExecutionRoleArn,
    /// `volume`.
    Volume,
    /// `placement_constraints`.
    PlacementConstraints,
    /// `cpu`.
    Cpu,
    /// `memory`.
    Memory,
    /// `requires_compatibilities`.
    RequiresCompatibilities,
}

/// How a change to an attribute is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangePolicy {
    /// Register a new revision; the previous revision stays ACTIVE.
    MutableInPlace,
    /// Register a new revision and deregister the previous one.
    ForcesReplace,
}

impl TaskAttribute {
    /// Every attribute, in comparison order.
    pub const ALL: [Self; 10] = [
        Self::Family,
        Self::ContainerDefinitions,
        Self::NetworkMode,
        Self::TaskRoleArn,
        Self::ExecutionRoleArn,
        Self::Volume,
        Self::PlacementConstraints,
        Self::Cpu,
        Self::Memory,
        Self::RequiresCompatibilities,
    ];

    /// Returns the change policy of the attribute.
    #[must_use]
    pub const fn policy(self) -> ChangePolicy {
        match self {
            Self::ContainerDefinitions => ChangePolicy::MutableInPlace,
            Self::Family
            | Self::NetworkMode
            | Self::TaskRoleArn
            | Self::ExecutionRoleArn
            | Self::Volume
            | Self::PlacementConstraints
            | Self::Cpu
            | Self::Memory
            | Self::RequiresCompatibilities => ChangePolicy::ForcesReplace,
        }
    }

    /// Returns the configuration attribute name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Family => "family",
            Self::ContainerDefinitions => "container_definitions",
            Self::NetworkMode => "network_mode",
            Self::TaskRoleArn => "task_role_arn",
            Self::ExecutionRoleArn => "execution_role_arn",
            Self::Volume => "volume",
            Self::PlacementConstraints => "placement_constraints",
            Self::Cpu => "cpu",
            Self::Memory => "memory",
            Self::RequiresCompatibilities => "requires_compatibilities",
        }
    }

    /// Returns true when the attribute differs between `before` and `after`.
    fn differs(
        self,
        before: &TaskDefinitionSpec,
        after: &TaskDefinitionSpec,
    ) -> Result<bool, HashError> {
        Ok(match self {
            Self::Family => before.family != after.family,
            Self::ContainerDefinitions => {
                normalized_container_definitions(&before.container_definitions)?
                    != normalized_container_definitions(&after.container_definitions)?
            }
            Self::NetworkMode => before.network_mode != after.network_mode,
            Self::TaskRoleArn => before.task_role_arn != after.task_role_arn,
            Self::ExecutionRoleArn => before.execution_role_arn != after.execution_role_arn,
            Self::Volume => before.volume_set() != after.volume_set(),
            Self::PlacementConstraints => before.placement_constraints != after.placement_constraints,
            Self::Cpu => before.cpu != after.cpu,
            Self::Memory => before.memory != after.memory,
            Self::RequiresCompatibilities => {
                before.requires_compatibilities != after.requires_compatibilities
            }
        })
    }
}

impl fmt::Display for TaskAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One changed attribute and the policy it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// Changed attribute.
    pub attribute: TaskAttribute,
    /// Policy of the attribute.
    pub policy: ChangePolicy,
}

/// Lists the attributes that differ between two specs.
///
/// # Errors
///
/// Returns [`HashError`] when container definitions cannot be normalized.
pub fn diff_specs(
    before: &TaskDefinitionSpec,
    after: &TaskDefinitionSpec,
) -> Result<Vec<AttributeChange>, HashError> {
    let mut changes = Vec::new();
    for attribute in TaskAttribute::ALL {
        if attribute.differs(before, after)? {
            changes.push(AttributeChange {
                attribute,
                policy: attribute.policy(),
            });
        }
    }
    Ok(changes)
}

// ============================================================================
// SECTION: Plans
// ============================================================================

/// Action a plan will perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanAction {
    /// Nothing to do.
    NoOp,
    /// Register the first revision.
    Create,
    /// Register a new revision and keep the previous one ACTIVE.
    UpdateInPlace,
    /// Register a new revision, then deregister the previous one.
    Replace,
    /// Deregister the current revision.
    Destroy,
}

impl PlanAction {
    /// Returns the snake_case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoOp => "no_op",
            Self::Create => "create",
            Self::UpdateInPlace => "update_in_place",
            Self::Replace => "replace",
            Self::Destroy => "destroy",
        }
    }
}

impl fmt::Display for PlanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Planned change for one task definition family.
///
/// # Invariants
/// - `desired` is `Some` for every action except `Destroy` (and `NoOp` on
///   an absent resource).
/// - `prior` is the revision the plan was computed against, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Family the plan applies to.
    pub family: FamilyName,
    /// Selected action.
    pub action: PlanAction,
    /// Attributes that produced the action.
    pub changes: Vec<AttributeChange>,
    /// Desired spec.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired: Option<TaskDefinitionSpec>,
    /// Revision the plan was computed against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior: Option<RegisteredTaskDefinition>,
}

/// Builds a plan for `family` from a desired spec and the current record.
///
/// The desired spec is assumed valid; [`crate::LifecycleEngine::plan`]
/// validates before calling this.
///
/// # Errors
///
/// Returns [`HashError`] when container definitions cannot be normalized.
pub fn plan(
    family: &FamilyName,
    desired: Option<&TaskDefinitionSpec>,
    current: Option<&TaskDefinitionRecord>,
) -> Result<Plan, HashError> {
    let (action, changes) = match (desired, current) {
        (None, None) => (PlanAction::NoOp, Vec::new()),
        (None, Some(_)) => (PlanAction::Destroy, Vec::new()),
        (Some(_), None) => (PlanAction::Create, Vec::new()),
        (Some(spec), Some(record)) => {
            let changes = diff_specs(&record.spec, spec)?;
            let action = if changes.is_empty() {
                PlanAction::NoOp
            } else if changes.iter().any(|change| change.policy == ChangePolicy::ForcesReplace) {
                PlanAction::Replace
            } else {
                PlanAction::UpdateInPlace
            };
            (action, changes)
        }
    };
    Ok(Plan {
        family: family.clone(),
        action,
        changes,
        desired: desired.cloned(),
        prior: current.map(TaskDefinitionRecord::registered),
    })
}
