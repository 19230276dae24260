// crates/taskdef-core/src/lib.rs
// ============================================================================
// Module: Task Definition Core Library
// Description: Public API surface for the task definition resource core.
// Purpose: Expose data model, validators, interfaces, and the lifecycle engine.
// Dependencies: crate::{core, interfaces, runtime, validation}
// ============================================================================

//! ## Overview
//! `taskdef-core` models a container task definition resource: a versioned,
//! immutable-once-registered description of containers that run together.
//! Configuration is validated locally before any remote call, and the
//! declarative lifecycle (plan, apply, destroy) is driven against a registry
//! reached only through the [`TaskDefinitionRegistry`] interface.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::AuditError;
pub use interfaces::AuditSink;
pub use interfaces::EventOutcome;
pub use interfaces::LifecycleEvent;
pub use interfaces::RegistryError;
pub use interfaces::TaskDefinitionRegistry;
pub use runtime::AttributeChange;
pub use runtime::ChangePolicy;
pub use runtime::InMemoryAuditSink;
pub use runtime::InMemoryTaskDefinitionRegistry;
pub use runtime::JsonlAuditSink;
pub use runtime::LifecycleEngine;
pub use runtime::LifecycleError;
pub use runtime::LifecycleState;
pub use runtime::NoopAuditSink;
pub use runtime::Plan;
pub use runtime::PlanAction;
pub use runtime::RegistryCall;
pub use runtime::RegistryOperation;
pub use runtime::ResourceState;
pub use runtime::TaskAttribute;
pub use runtime::diff_specs;
pub use validation::FieldError;
pub use validation::FieldErrorKind;
pub use validation::normalize_container_definitions;
pub use validation::parse_container_definitions;
pub use validation::validate_container_definitions;
pub use validation::validate_network_mode;
pub use validation::validate_task_network_mode;
