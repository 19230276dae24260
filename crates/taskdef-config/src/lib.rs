// crates/taskdef-config/src/lib.rs
// ============================================================================
// Module: Task Definition Config Library
// Description: Canonical config model and validation for taskdef.toml.
// Purpose: Single source of truth for taskdef.toml semantics.
// Dependencies: taskdef-core, taskdef-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `taskdef-config` defines the configuration model for the `taskdef` tool:
//! the registry backend, the audit log, and the declared task definitions.
//! Loading is strict and fails closed; every declared task definition is
//! validated in full before any registry is contacted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod resource;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use resource::*;
