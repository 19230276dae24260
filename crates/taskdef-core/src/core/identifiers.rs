// crates/taskdef-core/src/core/identifiers.rs
// ============================================================================
// Module: Task Definition Identifiers
// Description: Strongly typed names, ARNs, and revision numbers.
// Purpose: Provide serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers are opaque on the wire (strings or numbers) but typed in Rust
//! so a family name can never be passed where a container name is expected.
//! Name validation lives in [`is_valid_resource_name`]; the types themselves
//! perform no normalization.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU64;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of family, container, and volume names.
pub const MAX_NAME_LENGTH: usize = 255;
/// Resource type segment of a task definition ARN.
const ARN_RESOURCE_TYPE: &str = "task-definition";

/// Returns true when `value` is 1-255 ASCII letters, digits, hyphens, or underscores.
#[must_use]
pub fn is_valid_resource_name(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_NAME_LENGTH
        && value.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_')
}

// ============================================================================
// SECTION: Name Types
// ============================================================================

/// Task definition family name; revisions are chained under it.
///
/// # Invariants
/// - Opaque UTF-8 string; validation happens in spec validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FamilyName(String);

impl FamilyName {
    /// Creates a new family name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the family name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FamilyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for FamilyName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Container name, unique within a task definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerName(String);

impl ContainerName {
    /// Creates a new container name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the container name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ContainerName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Volume name, unique within a task definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VolumeName(String);

impl VolumeName {
    /// Creates a new volume name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the volume name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VolumeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for VolumeName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Configuration-local label of a declared task definition (e.g. `jenkins`).
///
/// # Invariants
/// - Only meaningful inside one configuration file; never sent to a registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceName(String);

impl ResourceName {
    /// Creates a new resource name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the resource name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Revision
// ============================================================================

/// Revision number of a task definition within its family.
///
/// # Invariants
/// - Always >= 1 (non-zero, 1-based).
/// - Strictly increasing per family; never reused after deregistration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(NonZeroU64);

impl Revision {
    /// First revision of any family.
    pub const FIRST: Self = Self(NonZeroU64::MIN);

    /// Creates a revision from a non-zero value.
    #[must_use]
    pub const fn new(value: NonZeroU64) -> Self {
        Self(value)
    }

    /// Creates a revision from a raw value (returns `None` if zero).
    #[must_use]
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Returns the raw revision value (always >= 1).
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }

    /// Returns the following revision, or `None` on overflow.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}

// ============================================================================
// SECTION: ARN
// ============================================================================

/// Task definition ARN: `arn:{partition}:ecs:{region}:{account}:task-definition/{family}:{revision}`.
///
/// # Invariants
/// - Values built by [`TaskDefinitionArn::new`] or [`TaskDefinitionArn::parse`]
///   always carry a family and revision component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskDefinitionArn(String);

impl TaskDefinitionArn {
    /// Builds the ARN of a family revision in the `aws` partition.
    #[must_use]
    pub fn new(region: &str, account_id: &str, family: &FamilyName, revision: Revision) -> Self {
        Self(format!(
            "arn:aws:ecs:{region}:{account_id}:{ARN_RESOURCE_TYPE}/{}:{revision}",
            family.as_str()
        ))
    }

    /// Parses an ARN string, returning `None` when it is not a task definition ARN.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        split_arn(value).map(|_| Self(value.to_string()))
    }

    /// Returns the ARN as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the family component.
    #[must_use]
    pub fn family(&self) -> FamilyName {
        split_arn(&self.0).map_or_else(|| FamilyName::new(""), |(family, _)| family)
    }

    /// Returns the revision component.
    #[must_use]
    pub fn revision(&self) -> Revision {
        split_arn(&self.0).map_or(Revision::FIRST, |(_, revision)| revision)
    }
}

impl fmt::Display for TaskDefinitionArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for TaskDefinitionArn {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if split_arn(&value).is_some() {
            Ok(Self(value))
        } else {
            Err(format!("invalid task definition arn: {value}"))
        }
    }
}

impl From<TaskDefinitionArn> for String {
    fn from(value: TaskDefinitionArn) -> Self {
        value.0
    }
}

/// Splits a task definition ARN into its family and revision.
fn split_arn(value: &str) -> Option<(FamilyName, Revision)> {
    let mut parts = value.splitn(6, ':');
    if parts.next()? != "arn" {
        return None;
    }
    let partition = parts.next()?;
    let service = parts.next()?;
    let _region = parts.next()?;
    let _account = parts.next()?;
    let resource = parts.next()?;
    if partition.is_empty() || service != "ecs" {
        return None;
    }
    let path = resource.strip_prefix(ARN_RESOURCE_TYPE)?.strip_prefix('/')?;
    let (family, revision) = path.rsplit_once(':')?;
    if !is_valid_resource_name(family) {
        return None;
    }
    let revision = Revision::from_raw(revision.parse().ok()?)?;
    Some((FamilyName::new(family), revision))
}
