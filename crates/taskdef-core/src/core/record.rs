// crates/taskdef-core/src/core/record.rs
// ============================================================================
// Module: Task Definition Registry Records
// Description: Registry-side view of registered task definition revisions.
// Purpose: Describe what a registry returns from register, describe, deregister.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Once registered, a revision is immutable. Its only mutable property is its
//! status: deregistration flips it from `ACTIVE` to `INACTIVE`, and the record
//! stays describable afterwards.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::HashDigest;
use crate::core::identifiers::FamilyName;
use crate::core::identifiers::Revision;
use crate::core::identifiers::TaskDefinitionArn;
use crate::core::identifiers::is_valid_resource_name;
use crate::core::spec::LaunchType;
use crate::core::spec::NetworkMode;
use crate::core::spec::TaskDefinitionSpec;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Status
// ============================================================================

/// Registration status of a revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskDefinitionStatus {
    /// Usable for new tasks and services.
    Active,
    /// Deregistered; still describable, not usable for new tasks.
    Inactive,
}

impl TaskDefinitionStatus {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }

    /// Parses a wire label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ACTIVE" => Some(Self::Active),
            "INACTIVE" => Some(Self::Inactive),
            _ => None,
        }
    }
}

impl fmt::Display for TaskDefinitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// Result of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredTaskDefinition {
    /// ARN of the new revision.
    pub arn: TaskDefinitionArn,
    /// Revision number assigned by the registry.
    pub revision: Revision,
}

/// Full registry view of one revision.
///
/// # Invariants
/// - `arn` encodes `family` and `revision`.
/// - `deregistered_at` is set exactly when `status` is `INACTIVE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinitionRecord {
    /// Revision ARN.
    pub arn: TaskDefinitionArn,
    /// Family name.
    pub family: FamilyName,
    /// Revision number.
    pub revision: Revision,
    /// Registration status.
    pub status: TaskDefinitionStatus,
    /// Spec as registered.
    pub spec: TaskDefinitionSpec,
    /// Launch types the revision is compatible with.
    pub compatibilities: BTreeSet<LaunchType>,
    /// Canonical hash of `spec`.
    pub spec_hash: HashDigest,
    /// Registration time.
    pub registered_at: Timestamp,
    /// Deregistration time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deregistered_at: Option<Timestamp>,
}

impl TaskDefinitionRecord {
    /// Returns true while the revision is `ACTIVE`.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == TaskDefinitionStatus::Active
    }

    /// Returns the registration handle for this record.
    #[must_use]
    pub fn registered(&self) -> RegisteredTaskDefinition {
        RegisteredTaskDefinition {
            arn: self.arn.clone(),
            revision: self.revision,
        }
    }
}

/// Computes the launch types a spec is compatible with.
///
/// Every definition runs on `EC2`. `FARGATE` is added when it was requested,
/// or when the definition already satisfies Fargate (awsvpc with task cpu and memory).
#[must_use]
pub fn derive_compatibilities(spec: &TaskDefinitionSpec) -> BTreeSet<LaunchType> {
    let mut compatibilities = BTreeSet::from([LaunchType::Ec2]);
    let fargate_ready =
        spec.network_mode == NetworkMode::Awsvpc && spec.cpu.is_some() && spec.memory.is_some();
    if spec.requires_fargate() || fargate_ready {
        compatibilities.insert(LaunchType::Fargate);
    }
    compatibilities
}

// ============================================================================
// SECTION: References
// ============================================================================

/// Argument accepted by `describe`: an ARN, a family, or `family:revision`.
///
/// A bare family resolves to its latest revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskDefinitionRef {
    /// Exact revision by ARN.
    Arn {
        /// Revision ARN.
        arn: TaskDefinitionArn,
    },
    /// Latest revision of a family.
    Family {
        /// Family name.
        family: FamilyName,
    },
    /// Exact revision by family and number.
    Revision {
        /// Family name.
        family: FamilyName,
        /// Revision number.
        revision: Revision,
    },
}

impl TaskDefinitionRef {
    /// Parses `arn:...`, `family`, or `family:revision`.
    ///
    /// # Errors
    ///
    /// Returns a message when the text matches none of the accepted forms.
    pub fn parse(value: &str) -> Result<Self, String> {
        if value.starts_with("arn:") {
            return TaskDefinitionArn::parse(value)
                .map(|arn| Self::Arn {
                    arn,
                })
                .ok_or_else(|| format!("invalid task definition arn: {value}"));
        }
        if let Some((family, revision)) = value.rsplit_once(':') {
            let revision = revision
                .parse::<u64>()
                .ok()
                .and_then(Revision::from_raw)
                .ok_or_else(|| format!("invalid revision in task definition reference: {value}"))?;
            if !is_valid_resource_name(family) {
                return Err(format!("invalid family in task definition reference: {value}"));
            }
            return Ok(Self::Revision {
                family: FamilyName::new(family),
                revision,
            });
        }
        if is_valid_resource_name(value) {
            Ok(Self::Family {
                family: FamilyName::new(value),
            })
        } else {
            Err(format!("invalid family in task definition reference: {value}"))
        }
    }

    /// Returns the family the reference points into.
    #[must_use]
    pub fn family(&self) -> FamilyName {
        match self {
            Self::Arn {
                arn,
            } => arn.family(),
            Self::Family {
                family,
            }
            | Self::Revision {
                family, ..
            } => family.clone(),
        }
    }
}

impl From<&TaskDefinitionArn> for TaskDefinitionRef {
    fn from(arn: &TaskDefinitionArn) -> Self {
        Self::Arn {
            arn: arn.clone(),
        }
    }
}

impl From<&FamilyName> for TaskDefinitionRef {
    fn from(family: &FamilyName) -> Self {
        Self::Family {
            family: family.clone(),
        }
    }
}

impl fmt::Display for TaskDefinitionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arn {
                arn,
            } => arn.fmt(f),
            Self::Family {
                family,
            } => family.fmt(f),
            Self::Revision {
                family,
                revision,
            } => write!(f, "{family}:{revision}"),
        }
    }
}
