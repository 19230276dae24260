// crates/taskdef-core/tests/lifecycle_scenarios.rs
// ============================================================================
// Module: Lifecycle Scenario Tests
// Description: End-to-end plan/apply/destroy against the in-memory registry.
// ============================================================================
//! ## Overview
//! Drives the lifecycle engine through create, idempotent re-plan, forced
//! replacement, in-place revision, Fargate registration, and destroy. Fault
//! scripts on the in-memory registry cover remote error pass-through and
//! invariant enforcement.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions are permitted."
)]

mod common;

use std::collections::BTreeSet;

use common::JENKINS_CONTAINERS;
use common::JENKINS_CONTAINERS_MODIFIED;
use common::TestResult;
use common::ensure;
use common::fargate_spec;
use common::jenkins_spec;
use common::scratch_spec;
use taskdef_core::EventOutcome;
use taskdef_core::InMemoryAuditSink;
use taskdef_core::InMemoryTaskDefinitionRegistry;
use taskdef_core::JsonlAuditSink;
use taskdef_core::LaunchType;
use taskdef_core::LifecycleEngine;
use taskdef_core::LifecycleError;
use taskdef_core::LifecycleState;
use taskdef_core::NetworkMode;
use taskdef_core::PlanAction;
use taskdef_core::RegistryCall;
use taskdef_core::RegistryError;
use taskdef_core::RegistryOperation;
use taskdef_core::ResourceState;
use taskdef_core::Revision;
use taskdef_core::TaskAttribute;
use taskdef_core::TaskDefinitionArn;
use taskdef_core::TaskDefinitionRecord;
use taskdef_core::TaskDefinitionRef;
use taskdef_core::TaskDefinitionRegistry;
use taskdef_core::TaskDefinitionSpec;
use taskdef_core::TaskDefinitionStatus;

// ============================================================================
// SECTION: Helpers
// ============================================================================

type Engine = LifecycleEngine<InMemoryTaskDefinitionRegistry, InMemoryAuditSink>;

fn engine() -> (Engine, InMemoryTaskDefinitionRegistry, InMemoryAuditSink) {
    let registry = InMemoryTaskDefinitionRegistry::with_identity("us-west-2", "123456789012");
    let audit = InMemoryAuditSink::new();
    (LifecycleEngine::new(registry.clone(), audit.clone()), registry, audit)
}

/// Refreshes, plans, and applies `desired`; returns the plan action and new state.
fn converge(
    engine: &Engine,
    desired: &TaskDefinitionSpec,
) -> Result<(PlanAction, ResourceState), LifecycleError> {
    let current = engine.refresh(&desired.family)?;
    let plan = engine.plan(desired, &current)?;
    let next = engine.apply(&plan, &current)?;
    Ok((plan.action, next))
}

fn active(state: &ResourceState) -> Result<&TaskDefinitionRecord, String> {
    state.record().ok_or_else(|| "expected an active record".to_string())
}

fn rev(value: u64) -> Revision {
    Revision::from_raw(value).unwrap()
}

fn describe(
    registry: &InMemoryTaskDefinitionRegistry,
    record: &TaskDefinitionRecord,
) -> TaskDefinitionRecord {
    registry.describe(&TaskDefinitionRef::from(&record.arn)).unwrap()
}

// ============================================================================
// SECTION: Create and Idempotence
// ============================================================================

#[test]
fn create_registers_first_revision() -> TestResult {
    let (engine, _, audit) = engine();
    let desired = jenkins_spec(JENKINS_CONTAINERS, "/ecs/jenkins-home");
    let (action, state) = converge(&engine, &desired).map_err(|e| e.to_string())?;
    ensure(action == PlanAction::Create, format!("{action}"))?;
    let record = active(&state)?;
    ensure(record.revision == Revision::FIRST, format!("revision {}", record.revision))?;
    ensure(
        record.arn.as_str()
            == "arn:aws:ecs:us-west-2:123456789012:task-definition/terraform-acc-test:1",
        record.arn.to_string(),
    )?;
    ensure(record.status == TaskDefinitionStatus::Active, "not active")?;
    ensure(record.spec == desired, "registered spec differs")?;

    let transitions: Vec<(LifecycleState, LifecycleState)> = audit
        .events()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|event| (event.from, event.to))
        .collect();
    ensure(
        transitions
            == vec![
                (LifecycleState::Absent, LifecycleState::Planned),
                (LifecycleState::Planned, LifecycleState::Creating),
                (LifecycleState::Creating, LifecycleState::Active),
            ],
        format!("{transitions:?}"),
    )
}

#[test]
fn replanning_unchanged_config_is_a_no_op() -> TestResult {
    let (engine, registry, _) = engine();
    let desired = jenkins_spec(JENKINS_CONTAINERS, "/ecs/jenkins-home");
    converge(&engine, &desired).map_err(|e| e.to_string())?;
    registry.clear_calls().map_err(|e| e.to_string())?;

    let (action, state) = converge(&engine, &desired).map_err(|e| e.to_string())?;
    ensure(action == PlanAction::NoOp, format!("{action}"))?;
    ensure(active(&state)?.revision == Revision::FIRST, "revision moved")?;
    let calls = registry.calls().map_err(|e| e.to_string())?;
    ensure(
        calls.iter().all(|call| call.operation() == RegistryOperation::Describe),
        format!("no-op touched the registry: {calls:?}"),
    )
}

#[test]
fn scratch_volume_registers() -> TestResult {
    let (engine, _, _) = engine();
    let (_, state) = converge(&engine, &scratch_spec()).map_err(|e| e.to_string())?;
    let record = active(&state)?;
    ensure(record.spec.volumes.len() == 1 && record.spec.volumes[0].is_scratch(), "volume lost")
}

// ============================================================================
// SECTION: Replacement and In-Place Revisions
// ============================================================================

#[test]
fn volume_change_forces_replacement() -> TestResult {
    let (engine, registry, _) = engine();
    let original = jenkins_spec(JENKINS_CONTAINERS, "/ecs/jenkins-home");
    let (_, first) = converge(&engine, &original).map_err(|e| e.to_string())?;
    let first = active(&first)?.clone();
    registry.clear_calls().map_err(|e| e.to_string())?;

    let updated = jenkins_spec(JENKINS_CONTAINERS, "/ecs/jenkins");
    let current = engine.refresh(&updated.family).map_err(|e| e.to_string())?;
    let plan = engine.plan(&updated, &current).map_err(|e| e.to_string())?;
    ensure(plan.action == PlanAction::Replace, format!("{}", plan.action))?;
    ensure(
        plan.changes.iter().map(|change| change.attribute).eq([TaskAttribute::Volume]),
        format!("{:?}", plan.changes),
    )?;
    let next = engine.apply(&plan, &current).map_err(|e| e.to_string())?;
    let second = active(&next)?;
    ensure(second.revision == rev(2), format!("revision {}", second.revision))?;
    ensure(second.revision != first.revision, "revision reused")?;

    let old = describe(&registry, &first);
    ensure(old.status == TaskDefinitionStatus::Inactive, "old revision still active")?;
    ensure(old.deregistered_at.is_some(), "deregistration time missing")?;

    let mutating: Vec<RegistryOperation> = registry
        .calls()
        .map_err(|e| e.to_string())?
        .iter()
        .map(RegistryCall::operation)
        .filter(|operation| *operation != RegistryOperation::Describe)
        .collect();
    ensure(
        mutating == vec![RegistryOperation::Register, RegistryOperation::Deregister],
        format!("replacement must register before deregistering: {mutating:?}"),
    )
}

#[test]
fn container_cpu_change_registers_in_place() -> TestResult {
    let (engine, registry, _) = engine();
    let original = jenkins_spec(JENKINS_CONTAINERS, "/ecs/jenkins-home");
    let (_, first) = converge(&engine, &original).map_err(|e| e.to_string())?;
    let first = active(&first)?.clone();

    let modified = jenkins_spec(JENKINS_CONTAINERS_MODIFIED, "/ecs/jenkins-home");
    let (action, next) = converge(&engine, &modified).map_err(|e| e.to_string())?;
    ensure(action == PlanAction::UpdateInPlace, format!("{action}"))?;
    let second = active(&next)?;
    ensure(second.revision == rev(2), format!("revision {}", second.revision))?;
    ensure(second.spec.container_definitions[1].cpu == Some(20), "cpu not updated")?;
    ensure(
        describe(&registry, &first).status == TaskDefinitionStatus::Active,
        "prior revision must stay active after an in-place revision",
    )?;
    let deregistered = registry
        .calls()
        .map_err(|e| e.to_string())?
        .iter()
        .any(|call| call.operation() == RegistryOperation::Deregister);
    ensure(!deregistered, "in-place revision deregistered something")
}

#[test]
fn fargate_definition_registers_with_compatibility() -> TestResult {
    let (engine, _, _) = engine();
    let desired = fargate_spec();
    let (_, state) = converge(&engine, &desired).map_err(|e| e.to_string())?;
    let record = active(&state)?;
    ensure(record.spec.network_mode == NetworkMode::Awsvpc, "network mode")?;
    ensure(record.spec.cpu.as_deref() == Some("256"), "cpu")?;
    ensure(record.spec.memory.as_deref() == Some("512"), "memory")?;
    ensure(
        record.spec.requires_compatibilities == BTreeSet::from([LaunchType::Fargate]),
        format!("requires {:?}", record.spec.requires_compatibilities),
    )?;
    // Registry-derived: every definition also runs on EC2.
    ensure(
        record.compatibilities == BTreeSet::from([LaunchType::Ec2, LaunchType::Fargate]),
        format!("compatibilities {:?}", record.compatibilities),
    )
}

// ============================================================================
// SECTION: Destroy
// ============================================================================

#[test]
fn destroy_leaves_revision_inactive_not_absent() -> TestResult {
    let (engine, registry, audit) = engine();
    let desired = jenkins_spec(JENKINS_CONTAINERS, "/ecs/jenkins-home");
    let (_, state) = converge(&engine, &desired).map_err(|e| e.to_string())?;
    let arn = active(&state)?.arn.clone();

    let current = engine.refresh(&desired.family).map_err(|e| e.to_string())?;
    let plan = engine.plan_destroy(&desired.family, &current).map_err(|e| e.to_string())?;
    ensure(plan.action == PlanAction::Destroy, format!("{}", plan.action))?;
    let after = engine.apply(&plan, &current).map_err(|e| e.to_string())?;
    ensure(after == ResourceState::Absent, "state not absent after destroy")?;

    let record = engine.verify_destroyed(&arn).map_err(|e| e.to_string())?;
    ensure(record.status == TaskDefinitionStatus::Inactive, "not inactive")?;
    let described = registry
        .describe(&TaskDefinitionRef::from(&arn))
        .map_err(|e| format!("deregistered revision must stay describable: {e}"))?;
    ensure(described.status == TaskDefinitionStatus::Inactive, "describe status")?;
    ensure(
        engine.refresh(&desired.family).map_err(|e| e.to_string())? == ResourceState::Absent,
        "inactive latest revision must refresh as absent",
    )?;
    let last = audit.events().map_err(|e| e.to_string())?.pop().ok_or("no events")?;
    ensure(
        last.from == LifecycleState::Destroying && last.to == LifecycleState::Inactive,
        format!("{last:?}"),
    )
}

#[test]
fn destroy_deregisters_revisions_left_active_by_in_place_updates() -> TestResult {
    let (engine, registry, _) = engine();
    let original = jenkins_spec(JENKINS_CONTAINERS, "/ecs/jenkins-home");
    converge(&engine, &original).map_err(|e| e.to_string())?;
    let modified = jenkins_spec(JENKINS_CONTAINERS_MODIFIED, "/ecs/jenkins-home");
    let (action, _) = converge(&engine, &modified).map_err(|e| e.to_string())?;
    ensure(action == PlanAction::UpdateInPlace, format!("{action}"))?;

    let current = engine.refresh(&modified.family).map_err(|e| e.to_string())?;
    let plan = engine.plan_destroy(&modified.family, &current).map_err(|e| e.to_string())?;
    engine.apply(&plan, &current).map_err(|e| e.to_string())?;

    let statuses: Vec<(u64, TaskDefinitionStatus)> = registry
        .revisions(&modified.family)
        .map_err(|e| e.to_string())?
        .iter()
        .map(|record| (record.revision.get(), record.status))
        .collect();
    ensure(
        statuses
            == vec![(1, TaskDefinitionStatus::Inactive), (2, TaskDefinitionStatus::Inactive)],
        format!("{statuses:?}"),
    )?;
    ensure(
        engine.refresh(&modified.family).map_err(|e| e.to_string())? == ResourceState::Absent,
        "destroyed family must refresh as absent",
    )
}

#[test]
fn destroy_skips_revisions_already_inactive() -> TestResult {
    let (engine, registry, _) = engine();
    let original = jenkins_spec(JENKINS_CONTAINERS, "/ecs/jenkins-home");
    converge(&engine, &original).map_err(|e| e.to_string())?;
    let updated = jenkins_spec(JENKINS_CONTAINERS, "/ecs/jenkins");
    let (action, state) = converge(&engine, &updated).map_err(|e| e.to_string())?;
    ensure(action == PlanAction::Replace, format!("{action}"))?;
    registry.clear_calls().map_err(|e| e.to_string())?;

    engine.destroy(&state).map_err(|e| e.to_string())?;
    let deregistered: Vec<RegistryCall> = registry
        .calls()
        .map_err(|e| e.to_string())?
        .into_iter()
        .filter(|call| call.operation() == RegistryOperation::Deregister)
        .collect();
    ensure(deregistered.len() == 1, format!("{deregistered:?}"))
}

#[test]
fn recreate_after_destroy_gets_a_higher_revision() -> TestResult {
    let (engine, _, _) = engine();
    let desired = scratch_spec();
    let (_, state) = converge(&engine, &desired).map_err(|e| e.to_string())?;
    engine.destroy(&state).map_err(|e| e.to_string())?;
    let (action, state) = converge(&engine, &desired).map_err(|e| e.to_string())?;
    ensure(action == PlanAction::Create, format!("{action}"))?;
    ensure(active(&state)?.revision == rev(2), "revision reused after deregistration")
}

#[test]
fn destroy_requires_an_active_revision() {
    let (engine, _, _) = engine();
    let err = engine.destroy(&ResourceState::Absent).unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::InvalidTransition {
            from: LifecycleState::Absent,
            to: LifecycleState::Destroying,
        }
    ));
}

#[test]
fn verify_destroyed_rejects_active_revisions() -> TestResult {
    let (engine, _, _) = engine();
    let (_, state) = converge(&engine, &scratch_spec()).map_err(|e| e.to_string())?;
    let arn = active(&state)?.arn.clone();
    match engine.verify_destroyed(&arn) {
        Err(LifecycleError::InvariantViolation(message)) => {
            ensure(message.contains("ACTIVE"), message.clone())
        }
        other => Err(format!("expected invariant violation, got {other:?}")),
    }
}

// ============================================================================
// SECTION: Validation Short-Circuit
// ============================================================================

#[test]
fn invalid_config_never_reaches_the_registry() -> TestResult {
    let (engine, registry, _) = engine();
    let mut desired = fargate_spec();
    desired.cpu = None;
    desired.network_mode = NetworkMode::Bridge;
    match engine.plan(&desired, &ResourceState::Absent) {
        Err(LifecycleError::ConfigValidation(errors)) => {
            ensure(errors.len() == 2, format!("{errors:?}"))?;
        }
        other => return Err(format!("expected config validation, got {other:?}")),
    }
    let calls = registry.calls().map_err(|e| e.to_string())?;
    ensure(calls.is_empty(), format!("registry touched: {calls:?}"))
}

// ============================================================================
// SECTION: Remote Failures
// ============================================================================

#[test]
fn register_failure_propagates_unchanged_without_retry() -> TestResult {
    let (engine, registry, audit) = engine();
    let scripted = RegistryError::Remote("ThrottlingException: rate exceeded".to_string());
    registry.fail_next(RegistryOperation::Register, scripted.clone()).map_err(|e| e.to_string())?;

    let desired = scratch_spec();
    match converge(&engine, &desired) {
        Err(LifecycleError::Remote(err)) => ensure(err == scripted, format!("{err:?}"))?,
        other => return Err(format!("expected remote error, got {other:?}")),
    }
    let registers = registry
        .calls()
        .map_err(|e| e.to_string())?
        .iter()
        .filter(|call| call.operation() == RegistryOperation::Register)
        .count();
    ensure(registers == 1, format!("register retried: {registers} calls"))?;
    let last = audit.events().map_err(|e| e.to_string())?.pop().ok_or("no events")?;
    ensure(last.outcome == EventOutcome::Failure, "failure not audited")?;
    ensure(last.to == LifecycleState::Absent, format!("{last:?}"))?;
    ensure(
        last.detail.as_deref().is_some_and(|detail| detail.contains("ThrottlingException")),
        "failure detail missing",
    )
}

#[test]
fn deregister_failure_during_replace_propagates() -> TestResult {
    let (engine, registry, _) = engine();
    let original = jenkins_spec(JENKINS_CONTAINERS, "/ecs/jenkins-home");
    converge(&engine, &original).map_err(|e| e.to_string())?;
    let scripted = RegistryError::Remote("AccessDenied".to_string());
    registry.fail_next(RegistryOperation::Deregister, scripted.clone()).map_err(|e| e.to_string())?;

    let updated = jenkins_spec(JENKINS_CONTAINERS, "/ecs/jenkins");
    match converge(&engine, &updated) {
        Err(LifecycleError::Remote(err)) => ensure(err == scripted, format!("{err:?}")),
        other => Err(format!("expected remote error, got {other:?}")),
    }
}

#[test]
fn arn_lookups_require_the_exact_arn() -> TestResult {
    let (engine, registry, _) = engine();
    let (_, state) = converge(&engine, &scratch_spec()).map_err(|e| e.to_string())?;
    let record = active(&state)?;
    let foreign = TaskDefinitionArn::new("eu-west-1", "999999999999", &record.family, record.revision);
    ensure(
        matches!(
            registry.describe(&TaskDefinitionRef::from(&foreign)),
            Err(RegistryError::NotFound(_))
        ),
        "foreign ARN resolved",
    )?;
    ensure(
        matches!(registry.deregister(&foreign), Err(RegistryError::NotFound(_))),
        "foreign ARN deregistered",
    )?;
    ensure(describe(&registry, record).status == TaskDefinitionStatus::Active, "record touched")
}

#[test]
fn refresh_passes_through_describe_failures() -> TestResult {
    let (engine, registry, _) = engine();
    let scripted = RegistryError::Remote("connection reset".to_string());
    registry.fail_next(RegistryOperation::Describe, scripted.clone()).map_err(|e| e.to_string())?;
    match engine.refresh(&"missing".into()) {
        Err(LifecycleError::Remote(err)) => ensure(err == scripted, format!("{err:?}"))?,
        other => return Err(format!("expected remote error, got {other:?}")),
    }
    ensure(
        engine.refresh(&"missing".into()).map_err(|e| e.to_string())? == ResourceState::Absent,
        "unknown family must refresh as absent",
    )
}

// ============================================================================
// SECTION: Invariants
// ============================================================================

#[test]
fn replacement_reusing_the_revision_is_an_invariant_violation() -> TestResult {
    let (engine, registry, _) = engine();
    let original = jenkins_spec(JENKINS_CONTAINERS, "/ecs/jenkins-home");
    converge(&engine, &original).map_err(|e| e.to_string())?;
    registry.pin_next_revision(Revision::FIRST).map_err(|e| e.to_string())?;

    let updated = jenkins_spec(JENKINS_CONTAINERS, "/ecs/jenkins");
    match converge(&engine, &updated) {
        Err(LifecycleError::InvariantViolation(message)) => {
            ensure(message.contains("supersedes"), message.clone())?;
        }
        other => return Err(format!("expected invariant violation, got {other:?}")),
    }
    let deregistered = registry
        .calls()
        .map_err(|e| e.to_string())?
        .iter()
        .any(|call| call.operation() == RegistryOperation::Deregister);
    ensure(!deregistered, "old revision deregistered despite the violation")
}

#[test]
fn non_increasing_revision_is_an_invariant_violation() -> TestResult {
    let (engine, registry, _) = engine();
    let desired = scratch_spec();
    let (_, state) = converge(&engine, &desired).map_err(|e| e.to_string())?;
    engine.destroy(&state).map_err(|e| e.to_string())?;
    converge(&engine, &desired).map_err(|e| e.to_string())?;
    engine.refresh(&desired.family).map_err(|e| e.to_string())?;
    registry.pin_next_revision(rev(1)).map_err(|e| e.to_string())?;

    let mut changed = desired.clone();
    changed.container_definitions[0].cpu = Some(20);
    match converge(&engine, &changed) {
        Err(LifecycleError::InvariantViolation(message)) => {
            ensure(message.contains("not above observed revision 2"), message.clone())
        }
        other => Err(format!("expected invariant violation, got {other:?}")),
    }
}

#[test]
fn stale_plans_are_refused() -> TestResult {
    let (engine, _, _) = engine();
    let original = jenkins_spec(JENKINS_CONTAINERS, "/ecs/jenkins-home");
    let (_, first) = converge(&engine, &original).map_err(|e| e.to_string())?;
    let modified = jenkins_spec(JENKINS_CONTAINERS_MODIFIED, "/ecs/jenkins-home");
    let stale = engine.plan(&modified, &first).map_err(|e| e.to_string())?;
    converge(&engine, &modified).map_err(|e| e.to_string())?;
    let current = engine.refresh(&modified.family).map_err(|e| e.to_string())?;
    match engine.apply(&stale, &current) {
        Err(LifecycleError::InvariantViolation(_)) => Ok(()),
        other => Err(format!("expected invariant violation, got {other:?}")),
    }
}

#[test]
fn lifecycle_transitions_follow_the_state_machine() {
    assert!(LifecycleState::Absent.can_transition_to(LifecycleState::Planned));
    assert!(LifecycleState::Inactive.can_transition_to(LifecycleState::Planned));
    assert!(LifecycleState::Active.can_transition_to(LifecycleState::Replacing));
    assert!(LifecycleState::Replacing.can_transition_to(LifecycleState::Active));
    assert!(LifecycleState::Destroying.can_transition_to(LifecycleState::Inactive));
    assert!(!LifecycleState::Absent.can_transition_to(LifecycleState::Active));
    assert!(!LifecycleState::Absent.can_transition_to(LifecycleState::Destroying));
    assert!(!LifecycleState::Inactive.can_transition_to(LifecycleState::Active));
    assert!(!LifecycleState::Planned.can_transition_to(LifecycleState::Replacing));
}

// ============================================================================
// SECTION: Audit Log
// ============================================================================

#[test]
fn jsonl_sink_writes_one_event_per_line() -> TestResult {
    let mut buffer: Vec<u8> = Vec::new();
    {
        let registry = InMemoryTaskDefinitionRegistry::new();
        let engine = LifecycleEngine::new(registry, JsonlAuditSink::new(&mut buffer));
        let family = "terraform-acc-sc-volume-test".into();
        let current = engine.refresh(&family).map_err(|e| e.to_string())?;
        let plan = engine.plan(&scratch_spec(), &current).map_err(|e| e.to_string())?;
        engine.apply(&plan, &current).map_err(|e| e.to_string())?;
    }
    let text = String::from_utf8(buffer).map_err(|e| e.to_string())?;
    let lines: Vec<&str> = text.lines().collect();
    ensure(lines.len() == 3, format!("expected 3 events, got {}", lines.len()))?;
    let last: serde_json::Value = serde_json::from_str(lines[2]).map_err(|e| e.to_string())?;
    ensure(last["event"] == "lifecycle_transition", format!("{last}"))?;
    ensure(last["from"] == "creating" && last["to"] == "active", format!("{last}"))?;
    ensure(last["outcome"] == "success", format!("{last}"))?;
    ensure(last["family"] == "terraform-acc-sc-volume-test", format!("{last}"))?;
    ensure(last["revision"] == 1, format!("{last}"))
}
