// crates/taskdef-core/src/validation/spec_rules.rs
// ============================================================================
// Module: Task Definition Spec Rules
// Description: Structural and cross-reference rules over a whole spec.
// Purpose: Catch registry-side rejections locally.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! These rules look across attributes: container names against links and
//! `volumesFrom`, mount points against declared volumes, and launch type
//! requirements against network mode and task size. All rules run and every
//! failure is reported.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use crate::core::ContainerDefinition;
use crate::core::LaunchType;
use crate::core::MAX_PLACEMENT_CONSTRAINTS;
use crate::core::NetworkMode;
use crate::core::PlacementConstraintType;
use crate::core::TaskDefinitionSpec;
use crate::core::identifiers::is_valid_resource_name;
use crate::validation::FieldError;

// ============================================================================
// SECTION: Field Names
// ============================================================================

/// Field label for the family.
const FAMILY: &str = "family";
/// Field label for container definitions.
const CONTAINER_DEFINITIONS: &str = "container_definitions";
/// Field label for volumes.
const VOLUME: &str = "volume";
/// Field label for placement constraints.
const PLACEMENT_CONSTRAINTS: &str = "placement_constraints";

// ============================================================================
// SECTION: Rules
// ============================================================================

/// Returns every structural rule violation in `spec`.
#[must_use]
pub fn validate_spec(spec: &TaskDefinitionSpec) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !is_valid_resource_name(spec.family.as_str()) {
        errors.push(FieldError::invalid(
            FAMILY,
            format!(
                "family {:?} must be 1-255 letters, digits, hyphens, or underscores",
                spec.family.as_str()
            ),
        ));
    }
    check_containers(spec, &mut errors);
    check_volumes(spec, &mut errors);
    check_placement(spec, &mut errors);
    check_role("task_role_arn", spec.task_role_arn.as_deref(), &mut errors);
    check_role("execution_role_arn", spec.execution_role_arn.as_deref(), &mut errors);
    check_task_size(spec, &mut errors);
    check_fargate(spec, &mut errors);
    errors
}

/// Container names, links, `volumesFrom`, and mount points.
fn check_containers(spec: &TaskDefinitionSpec, errors: &mut Vec<FieldError>) {
    let containers = &spec.container_definitions;
    if containers.is_empty() {
        errors.push(FieldError::invalid(
            CONTAINER_DEFINITIONS,
            "at least one container definition is required",
        ));
        return;
    }
    let mut names = BTreeSet::new();
    for container in containers {
        if !names.insert(container.name.as_str()) {
            errors.push(FieldError::invalid(
                CONTAINER_DEFINITIONS,
                format!("duplicate container name {:?}", container.name.as_str()),
            ));
        }
    }
    let volumes: BTreeSet<&str> = spec.volumes.iter().map(|volume| volume.name.as_str()).collect();
    for container in containers {
        check_references(container, &names, &volumes, spec.network_mode, errors);
    }
}

/// Cross-references of one container.
fn check_references(
    container: &ContainerDefinition,
    names: &BTreeSet<&str>,
    volumes: &BTreeSet<&str>,
    network_mode: NetworkMode,
    errors: &mut Vec<FieldError>,
) {
    let owner = container.name.as_str();
    if network_mode == NetworkMode::Awsvpc && !container.links.is_empty() {
        errors.push(FieldError::invalid(
            CONTAINER_DEFINITIONS,
            format!("container {owner:?}: links are not supported with network mode awsvpc"),
        ));
    }
    for target in container.link_targets() {
        if target == owner || !names.contains(target) {
            errors.push(FieldError::invalid(
                CONTAINER_DEFINITIONS,
                format!("container {owner:?}: link target {target:?} is not another container"),
            ));
        }
    }
    for source in &container.volumes_from {
        let target = source.source_container.as_str();
        if target == owner || !names.contains(target) {
            errors.push(FieldError::invalid(
                CONTAINER_DEFINITIONS,
                format!(
                    "container {owner:?}: volumesFrom source {target:?} is not another container"
                ),
            ));
        }
    }
    for mount in &container.mount_points {
        let volume = mount.source_volume.as_str();
        if !volumes.contains(volume) {
            errors.push(FieldError::invalid(
                CONTAINER_DEFINITIONS,
                format!("container {owner:?}: mount point volume {volume:?} is not declared"),
            ));
        }
    }
}

/// Volume names are valid and unique.
fn check_volumes(spec: &TaskDefinitionSpec, errors: &mut Vec<FieldError>) {
    let mut seen = BTreeSet::new();
    for volume in &spec.volumes {
        let name = volume.name.as_str();
        if !is_valid_resource_name(name) {
            errors.push(FieldError::invalid(
                VOLUME,
                format!("volume name {name:?} must be 1-255 letters, digits, hyphens, or underscores"),
            ));
        }
        if !seen.insert(name) {
            errors.push(FieldError::invalid(VOLUME, format!("duplicate volume name {name:?}")));
        }
        if volume.host_path.as_deref().is_some_and(str::is_empty) {
            errors.push(FieldError::invalid(
                VOLUME,
                format!("volume {name:?}: host_path must not be empty; omit it for a scratch volume"),
            ));
        }
    }
}

/// Placement constraint count, type, and expression.
fn check_placement(spec: &TaskDefinitionSpec, errors: &mut Vec<FieldError>) {
    if spec.placement_constraints.len() > MAX_PLACEMENT_CONSTRAINTS {
        errors.push(FieldError::invalid(
            PLACEMENT_CONSTRAINTS,
            format!(
                "at most {MAX_PLACEMENT_CONSTRAINTS} placement constraints are allowed, got {}",
                spec.placement_constraints.len()
            ),
        ));
    }
    for (index, constraint) in spec.placement_constraints.iter().enumerate() {
        match constraint.constraint_type {
            PlacementConstraintType::MemberOf => {
                if constraint.expression.as_deref().is_none_or(|expr| expr.trim().is_empty()) {
                    errors.push(FieldError::invalid(
                        PLACEMENT_CONSTRAINTS,
                        format!("constraint {index}: memberOf requires an expression"),
                    ));
                }
            }
            PlacementConstraintType::DistinctInstance => errors.push(FieldError::invalid(
                PLACEMENT_CONSTRAINTS,
                format!(
                    "constraint {index}: {} is not supported on task definitions",
                    constraint.constraint_type.as_str()
                ),
            )),
        }
    }
}

/// Role references must be ARNs when present.
fn check_role(field: &str, value: Option<&str>, errors: &mut Vec<FieldError>) {
    if let Some(value) = value
        && !value.starts_with("arn:")
    {
        errors.push(FieldError::invalid(field, format!("{value:?} is not an ARN")));
    }
}

/// Task-level cpu and memory formats.
fn check_task_size(spec: &TaskDefinitionSpec, errors: &mut Vec<FieldError>) {
    if let Some(cpu) = spec.cpu.as_deref()
        && !is_size(cpu, "vcpu")
    {
        errors.push(FieldError::invalid(
            "cpu",
            format!("{cpu:?} must be CPU units (e.g. \"256\") or vCPUs (e.g. \"1 vCPU\")"),
        ));
    }
    if let Some(memory) = spec.memory.as_deref()
        && !is_size(memory, "gb")
    {
        errors.push(FieldError::invalid(
            "memory",
            format!("{memory:?} must be MiB (e.g. \"512\") or GB (e.g. \"1 GB\")"),
        ));
    }
}

/// Fargate requires task size and awsvpc networking.
fn check_fargate(spec: &TaskDefinitionSpec, errors: &mut Vec<FieldError>) {
    if !spec.requires_fargate() {
        return;
    }
    let fargate = LaunchType::Fargate.as_str();
    if spec.cpu.is_none() {
        errors.push(FieldError::invalid("cpu", format!("cpu is required for {fargate}")));
    }
    if spec.memory.is_none() {
        errors.push(FieldError::invalid("memory", format!("memory is required for {fargate}")));
    }
    if spec.network_mode != NetworkMode::Awsvpc {
        errors.push(FieldError::invalid(
            "network_mode",
            format!("{fargate} requires network mode awsvpc, got {}", spec.network_mode),
        ));
    }
}

/// Accepts a positive integer or `<number> <unit>` (unit case-insensitive).
fn is_size(value: &str, unit: &str) -> bool {
    let value = value.trim();
    if let Ok(number) = value.parse::<u64>() {
        return number > 0;
    }
    let Some((number, suffix)) = value.split_once(' ') else {
        return false;
    };
    suffix.trim().eq_ignore_ascii_case(unit) && number.parse::<f64>().is_ok_and(|n| n > 0.0)
}
