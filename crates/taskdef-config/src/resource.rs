// crates/taskdef-config/src/resource.rs
// ============================================================================
// Module: Task Definition Resource Config
// Description: `[[task_definition]]` blocks and their conversion into specs.
// Purpose: Run every field validator and collect all errors before failing.
// Dependencies: taskdef-core, serde
// ============================================================================

//! ## Overview
//! A [`ResourceConfig`] mirrors the user-facing attributes of one declared
//! task definition. Enumerated attributes stay strings until
//! [`ResourceConfig::to_spec`] runs, so a bad value becomes a field error
//! naming the attribute instead of a TOML parse failure. Field errors are
//! addressed `task_definition.<name>.<field>`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use taskdef_core::FamilyName;
use taskdef_core::FieldError;
use taskdef_core::LaunchType;
use taskdef_core::NetworkMode;
use taskdef_core::PlacementConstraint;
use taskdef_core::PlacementConstraintType;
use taskdef_core::ResourceName;
use taskdef_core::TaskDefinitionSpec;
use taskdef_core::Volume;
use taskdef_core::VolumeName;
use taskdef_core::identifiers::is_valid_resource_name;
use taskdef_core::parse_container_definitions;
use taskdef_core::validate_task_network_mode;
use taskdef_core::validation::validate_spec;

// ============================================================================
// SECTION: Resource Types
// ============================================================================

/// One `[[task_definition]]` block.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    /// Configuration-local label.
    pub name: ResourceName,
    /// Family name.
    pub family: String,
    /// Container definitions as a JSON document.
    pub container_definitions: String,
    /// Network mode; `bridge` when unset.
    #[serde(default)]
    pub network_mode: Option<String>,
    /// Task role ARN.
    #[serde(default)]
    pub task_role_arn: Option<String>,
    /// Execution role ARN.
    #[serde(default)]
    pub execution_role_arn: Option<String>,
    /// Task CPU.
    #[serde(default)]
    pub cpu: Option<String>,
    /// Task memory.
    #[serde(default)]
    pub memory: Option<String>,
    /// Required launch types (`EC2`, `FARGATE`).
    #[serde(default)]
    pub requires_compatibilities: Vec<String>,
    /// Volumes.
    #[serde(default)]
    pub volume: Vec<VolumeConfig>,
    /// Placement constraints.
    #[serde(default)]
    pub placement_constraints: Vec<PlacementConstraintConfig>,
}

/// One `[[task_definition.volume]]` block.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VolumeConfig {
    /// Volume name.
    pub name: String,
    /// Host path; scratch volume when unset.
    #[serde(default)]
    pub host_path: Option<String>,
}

/// One `[[task_definition.placement_constraints]]` block.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlacementConstraintConfig {
    /// Constraint type (`memberOf`).
    #[serde(rename = "type")]
    pub constraint_type: String,
    /// Cluster query expression.
    #[serde(default)]
    pub expression: Option<String>,
}

// ============================================================================
// SECTION: Conversion
// ============================================================================

impl ResourceConfig {
    /// Validates every attribute and builds the spec.
    ///
    /// # Errors
    ///
    /// Returns every [`FieldError`] found, addressed under
    /// `task_definition.<name>`.
    pub fn to_spec(&self) -> Result<TaskDefinitionSpec, Vec<FieldError>> {
        let prefix = format!("task_definition.{}", self.name);
        let mut errors = Vec::new();
        if !is_valid_resource_name(self.name.as_str()) {
            errors.push(FieldError::invalid(
                "name",
                format!(
                    "resource name {:?} must be 1-255 letters, digits, hyphens, or underscores",
                    self.name.as_str()
                ),
            ));
        }
        let network_mode = self.network_mode(&mut errors);
        let requires_compatibilities = self.launch_types(&mut errors);
        let placement_constraints = self.placement_constraints(&mut errors);
        let container_definitions =
            match parse_container_definitions(&self.container_definitions, "container_definitions") {
                Ok(definitions) => Some(definitions),
                Err(mut found) => {
                    errors.append(&mut found);
                    None
                }
            };

        if let Some(container_definitions) = container_definitions
            && errors.is_empty()
        {
            let spec = TaskDefinitionSpec {
                family: FamilyName::new(self.family.as_str()),
                container_definitions,
                network_mode,
                task_role_arn: self.task_role_arn.clone(),
                execution_role_arn: self.execution_role_arn.clone(),
                volumes: self.volumes(),
                placement_constraints,
                cpu: self.cpu.clone(),
                memory: self.memory.clone(),
                requires_compatibilities,
            };
            errors = validate_spec(&spec);
            if errors.is_empty() {
                return Ok(spec);
            }
        }
        Err(errors.iter().map(|err| err.prefixed(&prefix)).collect())
    }

    /// Parses the network mode, defaulting to `bridge`.
    fn network_mode(&self, errors: &mut Vec<FieldError>) -> NetworkMode {
        let Some(value) = self.network_mode.as_deref() else {
            return NetworkMode::default();
        };
        let mut found = validate_task_network_mode(value, "network_mode");
        if found.is_empty() {
            return NetworkMode::parse(value).unwrap_or_default();
        }
        errors.append(&mut found);
        NetworkMode::default()
    }

    /// Parses the required launch types.
    fn launch_types(&self, errors: &mut Vec<FieldError>) -> BTreeSet<LaunchType> {
        let mut launch_types = BTreeSet::new();
        for value in &self.requires_compatibilities {
            match LaunchType::parse(value) {
                Some(launch_type) => {
                    launch_types.insert(launch_type);
                }
                None => errors.push(FieldError::invalid(
                    "requires_compatibilities",
                    format!("launch type {value:?} is not supported; expected one of EC2, FARGATE"),
                )),
            }
        }
        launch_types
    }

    /// Parses placement constraint types, keeping declaration order.
    fn placement_constraints(&self, errors: &mut Vec<FieldError>) -> Vec<PlacementConstraint> {
        let mut constraints = Vec::with_capacity(self.placement_constraints.len());
        for constraint in &self.placement_constraints {
            match PlacementConstraintType::parse(&constraint.constraint_type) {
                Some(constraint_type) => constraints.push(PlacementConstraint {
                    constraint_type,
                    expression: constraint.expression.clone(),
                }),
                None => errors.push(FieldError::invalid(
                    "placement_constraints",
                    format!(
                        "placement constraint type {:?} is not supported; expected memberOf",
                        constraint.constraint_type
                    ),
                )),
            }
        }
        constraints
    }

    /// Converts volume blocks.
    fn volumes(&self) -> Vec<Volume> {
        self.volume
            .iter()
            .map(|volume| Volume {
                name: VolumeName::new(volume.name.as_str()),
                host_path: volume.host_path.clone(),
            })
            .collect()
    }
}
