// crates/taskdef-core/tests/diff_policy.rs
// ============================================================================
// Module: Attribute Policy Diff Tests
// Description: Tests for the change policy table and plan action selection.
// ============================================================================
//! ## Overview
//! Validates that each attribute maps to the documented policy and that plans
//! pick no-op, in-place, or replace from the changed attributes.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions are permitted."
)]

mod common;

use common::JENKINS_CONTAINERS;
use common::JENKINS_CONTAINERS_MODIFIED;
use common::TestResult;
use common::ensure;
use common::jenkins_spec;
use taskdef_core::ChangePolicy;
use taskdef_core::InMemoryTaskDefinitionRegistry;
use taskdef_core::LaunchType;
use taskdef_core::NetworkMode;
use taskdef_core::PlanAction;
use taskdef_core::TaskAttribute;
use taskdef_core::TaskDefinitionRecord;
use taskdef_core::TaskDefinitionRef;
use taskdef_core::TaskDefinitionRegistry;
use taskdef_core::TaskDefinitionSpec;
use taskdef_core::diff_specs;
use taskdef_core::runtime::plan;

fn base() -> TaskDefinitionSpec {
    jenkins_spec(JENKINS_CONTAINERS, "/ecs/jenkins-home")
}

fn changed(before: &TaskDefinitionSpec, after: &TaskDefinitionSpec) -> Vec<TaskAttribute> {
    diff_specs(before, after).unwrap().into_iter().map(|change| change.attribute).collect()
}

#[test]
fn policy_table_matches_resource_schema() {
    for attribute in TaskAttribute::ALL {
        let expected = if attribute == TaskAttribute::ContainerDefinitions {
            ChangePolicy::MutableInPlace
        } else {
            ChangePolicy::ForcesReplace
        };
        assert_eq!(attribute.policy(), expected, "{attribute}");
    }
}

#[test]
fn identical_specs_have_no_changes() -> TestResult {
    let spec = base();
    ensure(changed(&spec, &spec.clone()).is_empty(), "self diff not empty")
}

#[test]
fn volume_order_is_not_a_change() -> TestResult {
    let mut before = common::arrays_spec();
    let mut after = before.clone();
    after.volumes.reverse();
    ensure(changed(&before, &after).is_empty(), "volume reorder reported")?;
    before.volumes.pop();
    ensure(changed(&before, &after) == vec![TaskAttribute::Volume], "volume removal missed")
}

#[test]
fn each_replace_attribute_is_detected() -> TestResult {
    let before = base();
    let cases: Vec<(TaskAttribute, Box<dyn Fn(&mut TaskDefinitionSpec)>)> = vec![
        (TaskAttribute::Family, Box::new(|spec: &mut TaskDefinitionSpec| spec.family = "other".into())),
        (TaskAttribute::NetworkMode, Box::new(|spec: &mut TaskDefinitionSpec| spec.network_mode = NetworkMode::Host)),
        (
            TaskAttribute::TaskRoleArn,
            Box::new(|spec: &mut TaskDefinitionSpec| spec.task_role_arn = Some("arn:aws:iam::1:role/a".to_string())),
        ),
        (
            TaskAttribute::ExecutionRoleArn,
            Box::new(|spec: &mut TaskDefinitionSpec| spec.execution_role_arn = Some("arn:aws:iam::1:role/b".to_string())),
        ),
        (TaskAttribute::Volume, Box::new(|spec: &mut TaskDefinitionSpec| spec.volumes[0].host_path = Some("/ecs/jenkins".into()))),
        (TaskAttribute::PlacementConstraints, Box::new(|spec: &mut TaskDefinitionSpec| spec.placement_constraints.clear())),
        (TaskAttribute::Cpu, Box::new(|spec: &mut TaskDefinitionSpec| spec.cpu = Some("256".to_string()))),
        (TaskAttribute::Memory, Box::new(|spec: &mut TaskDefinitionSpec| spec.memory = Some("512".to_string()))),
        (
            TaskAttribute::RequiresCompatibilities,
            Box::new(|spec: &mut TaskDefinitionSpec| {
                spec.requires_compatibilities.insert(LaunchType::Ec2);
            }),
        ),
    ];
    for (attribute, mutate) in cases {
        let mut after = before.clone();
        mutate(&mut after);
        let attributes = changed(&before, &after);
        ensure(attributes == vec![attribute], format!("{attribute}: got {attributes:?}"))?;
        ensure(attribute.policy() == ChangePolicy::ForcesReplace, attribute.to_string())?;
    }
    Ok(())
}

#[test]
fn container_cpu_change_is_in_place() -> TestResult {
    let before = base();
    let after = jenkins_spec(JENKINS_CONTAINERS_MODIFIED, "/ecs/jenkins-home");
    let record = record_for(&before);
    let plan = plan(&after.family, Some(&after), Some(&record)).map_err(|e| e.to_string())?;
    ensure(plan.action == PlanAction::UpdateInPlace, format!("{:?}", plan.action))?;
    ensure(plan.changes.len() == 1, format!("{:?}", plan.changes))?;
    ensure(plan.changes[0].attribute == TaskAttribute::ContainerDefinitions, "wrong attribute")
}

#[test]
fn mixed_changes_replace() -> TestResult {
    let before = base();
    let after = jenkins_spec(JENKINS_CONTAINERS_MODIFIED, "/ecs/jenkins");
    let record = record_for(&before);
    let plan = plan(&after.family, Some(&after), Some(&record)).map_err(|e| e.to_string())?;
    ensure(plan.action == PlanAction::Replace, format!("{:?}", plan.action))?;
    ensure(plan.changes.len() == 2, format!("{:?}", plan.changes))
}

#[test]
fn plan_actions_without_records() -> TestResult {
    let spec = base();
    let create = plan(&spec.family, Some(&spec), None).map_err(|e| e.to_string())?;
    ensure(create.action == PlanAction::Create && create.prior.is_none(), "create")?;
    let noop = plan(&spec.family, None, None).map_err(|e| e.to_string())?;
    ensure(noop.action == PlanAction::NoOp, "absent no-op")?;
    let record = record_for(&spec);
    let destroy = plan(&spec.family, None, Some(&record)).map_err(|e| e.to_string())?;
    ensure(destroy.action == PlanAction::Destroy, "destroy")?;
    ensure(destroy.prior.as_ref().map(|prior| &prior.arn) == Some(&record.arn), "destroy prior")
}

fn record_for(spec: &TaskDefinitionSpec) -> TaskDefinitionRecord {
    let registry = InMemoryTaskDefinitionRegistry::new();
    let registered = registry.register(spec).unwrap();
    registry.describe(&TaskDefinitionRef::from(&registered.arn)).unwrap()
}
