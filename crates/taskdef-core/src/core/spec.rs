// crates/taskdef-core/src/core/spec.rs
// ============================================================================
// Module: Task Definition Specification
// Description: Desired-state description of one task definition family.
// Purpose: Hold every attribute the registry accepts at registration time.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`TaskDefinitionSpec`] is what a user declares and what a registry
//! stores for each revision. Registered revisions are immutable; any change
//! produces a new revision. Structural rules (name formats, Fargate
//! requirements, cross-references between containers and volumes) are
//! enforced by [`TaskDefinitionSpec::validate`] before any registry call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::container::ContainerDefinition;
use crate::core::identifiers::FamilyName;
use crate::core::identifiers::VolumeName;
use crate::validation::FieldError;
use crate::validation::validate_spec;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum placement constraints per task definition.
pub const MAX_PLACEMENT_CONSTRAINTS: usize = 10;

// ============================================================================
// SECTION: Network Mode
// ============================================================================

/// Docker networking mode for every container of the task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    /// Docker bridge network.
    #[default]
    Bridge,
    /// Host network namespace.
    Host,
    /// No external networking.
    None,
    /// Task-level elastic network interface.
    Awsvpc,
}

impl NetworkMode {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bridge => "bridge",
            Self::Host => "host",
            Self::None => "none",
            Self::Awsvpc => "awsvpc",
        }
    }

    /// Parses a wire label (case-sensitive).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "bridge" => Some(Self::Bridge),
            "host" => Some(Self::Host),
            "none" => Some(Self::None),
            "awsvpc" => Some(Self::Awsvpc),
            _ => None,
        }
    }
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Launch Type
// ============================================================================

/// Infrastructure a task definition can be launched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LaunchType {
    /// Customer-managed container instances.
    #[serde(rename = "EC2")]
    Ec2,
    /// Serverless compute.
    #[serde(rename = "FARGATE")]
    Fargate,
}

impl LaunchType {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ec2 => "EC2",
            Self::Fargate => "FARGATE",
        }
    }

    /// Parses a wire label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "EC2" => Some(Self::Ec2),
            "FARGATE" => Some(Self::Fargate),
            _ => None,
        }
    }
}

impl fmt::Display for LaunchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Volumes and Placement
// ============================================================================

/// Task-level volume.
///
/// # Invariants
/// - A volume without `host_path` is a scratch volume owned by the task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Volume {
    /// Volume name referenced by `mountPoints[].sourceVolume`.
    pub name: VolumeName,
    /// Host directory backing the volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_path: Option<String>,
}

impl Volume {
    /// Returns true when no host path backs the volume.
    #[must_use]
    pub const fn is_scratch(&self) -> bool {
        self.host_path.is_none()
    }
}

/// Placement constraint kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlacementConstraintType {
    /// Place on instances matching a cluster query expression.
    MemberOf,
    /// One task per instance. Only valid on services, rejected here.
    DistinctInstance,
}

impl PlacementConstraintType {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MemberOf => "memberOf",
            Self::DistinctInstance => "distinctInstance",
        }
    }

    /// Parses a wire label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "memberOf" => Some(Self::MemberOf),
            "distinctInstance" => Some(Self::DistinctInstance),
            _ => None,
        }
    }
}

/// Placement rule applied when tasks are scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlacementConstraint {
    /// Constraint kind.
    #[serde(rename = "type")]
    pub constraint_type: PlacementConstraintType,
    /// Cluster query expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

// ============================================================================
// SECTION: Task Definition Spec
// ============================================================================

/// Desired state of a task definition family.
///
/// # Invariants
/// - `volumes` and `requires_compatibilities` have set semantics; only
///   membership matters when comparing specs.
/// - `container_definitions` and `placement_constraints` are ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinitionSpec {
    /// Family the revision belongs to.
    pub family: FamilyName,
    /// Containers, in declaration order.
    pub container_definitions: Vec<ContainerDefinition>,
    /// Networking mode.
    #[serde(default)]
    pub network_mode: NetworkMode,
    /// IAM role assumed by containers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_role_arn: Option<String>,
    /// IAM role used by the agent to pull images and ship logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_role_arn: Option<String>,
    /// Task-level volumes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
    /// Placement constraints, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub placement_constraints: Vec<PlacementConstraint>,
    /// Task CPU (units or `N vCPU`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    /// Task memory (MiB or `N GB`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    /// Launch types the definition must be compatible with.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub requires_compatibilities: BTreeSet<LaunchType>,
}

impl TaskDefinitionSpec {
    /// Creates a spec with the given family and containers and defaults elsewhere.
    #[must_use]
    pub const fn new(family: FamilyName, container_definitions: Vec<ContainerDefinition>) -> Self {
        Self {
            family,
            container_definitions,
            network_mode: NetworkMode::Bridge,
            task_role_arn: None,
            execution_role_arn: None,
            volumes: Vec::new(),
            placement_constraints: Vec::new(),
            cpu: None,
            memory: None,
            requires_compatibilities: BTreeSet::new(),
        }
    }

    /// Returns the volumes as a set.
    #[must_use]
    pub fn volume_set(&self) -> BTreeSet<&Volume> {
        self.volumes.iter().collect()
    }

    /// Returns true when Fargate compatibility is requested.
    #[must_use]
    pub fn requires_fargate(&self) -> bool {
        self.requires_compatibilities.contains(&LaunchType::Fargate)
    }

    /// Runs every structural rule and collects the failures.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Invalid`] with one entry per violated rule.
    pub fn validate(&self) -> Result<(), SpecError> {
        let errors = validate_spec(self);
        if errors.is_empty() { Ok(()) } else { Err(SpecError::Invalid(errors)) }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Structural errors in a task definition spec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    /// One or more field rules failed.
    #[error("invalid task definition: {}", join_errors(.0))]
    Invalid(Vec<FieldError>),
}

impl SpecError {
    /// Returns the individual field errors.
    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Invalid(errors) => errors,
        }
    }
}

/// Renders field errors as a `; `-separated list.
fn join_errors(errors: &[FieldError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
