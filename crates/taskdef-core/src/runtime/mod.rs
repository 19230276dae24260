// crates/taskdef-core/src/runtime/mod.rs
// ============================================================================
// Module: Task Definition Runtime
// Description: Diffing, lifecycle state machine, engine, and in-memory backends.
// Purpose: Drive plan/apply/destroy against an injected registry.
// Dependencies: crate::{core, interfaces, validation}
// ============================================================================

//! ## Overview
//! The runtime turns a desired spec and the registry's current record into a
//! [`Plan`], then executes it through [`LifecycleEngine`]. In-memory registry
//! and audit sinks are provided for tests and dry runs.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod diff;
pub mod engine;
pub mod lifecycle;
pub mod registry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::InMemoryAuditSink;
pub use audit::JsonlAuditSink;
pub use audit::NoopAuditSink;
pub use diff::AttributeChange;
pub use diff::ChangePolicy;
pub use diff::Plan;
pub use diff::PlanAction;
pub use diff::TaskAttribute;
pub use diff::diff_specs;
pub use diff::plan;
pub use engine::LifecycleEngine;
pub use engine::LifecycleError;
pub use engine::ResourceState;
pub use lifecycle::LifecycleState;
pub use registry::InMemoryTaskDefinitionRegistry;
pub use registry::RegistryCall;
pub use registry::RegistryOperation;
