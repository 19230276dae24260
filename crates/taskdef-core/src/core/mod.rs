// crates/taskdef-core/src/core/mod.rs
// ============================================================================
// Module: Task Definition Core Types
// Description: Canonical task definition schema and registry record structures.
// Purpose: Provide stable, serializable types shared by every crate surface.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Core types define the declarative task definition specification, its
//! container definitions, and the record a registry returns once a revision
//! is registered. These types are the canonical source of truth for the
//! config loader, the registry backends, and the CLI.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod container;
pub mod hashing;
pub mod identifiers;
pub mod record;
pub mod spec;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use container::ContainerDefinition;
pub use container::Device;
pub use container::HostEntry;
pub use container::KernelCapabilities;
pub use container::KeyValuePair;
pub use container::LinuxParameters;
pub use container::MountPoint;
pub use container::PortMapping;
pub use container::Ulimit;
pub use container::VolumeFrom;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use identifiers::ContainerName;
pub use identifiers::FamilyName;
pub use identifiers::ResourceName;
pub use identifiers::Revision;
pub use identifiers::TaskDefinitionArn;
pub use identifiers::VolumeName;
pub use record::RegisteredTaskDefinition;
pub use record::TaskDefinitionRecord;
pub use record::TaskDefinitionRef;
pub use record::TaskDefinitionStatus;
pub use record::derive_compatibilities;
pub use spec::LaunchType;
pub use spec::MAX_PLACEMENT_CONSTRAINTS;
pub use spec::NetworkMode;
pub use spec::PlacementConstraint;
pub use spec::PlacementConstraintType;
pub use spec::SpecError;
pub use spec::TaskDefinitionSpec;
pub use spec::Volume;
pub use time::Timestamp;
