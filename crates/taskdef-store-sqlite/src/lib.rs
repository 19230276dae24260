// crates/taskdef-store-sqlite/src/lib.rs
// ============================================================================
// Module: Task Definition SQLite Registry Library
// Description: Durable task definition registry backed by SQLite.
// Purpose: Provide a local stand-in for the remote registry with real revisions.
// Dependencies: taskdef-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `taskdef-store-sqlite` implements [`taskdef_core::TaskDefinitionRegistry`]
//! on top of `SQLite`. Revisions are numbered per family, never reused, and
//! deregistration only flips status. Every stored spec carries a canonical
//! hash that is re-verified on read.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod registry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use registry::MAX_SPEC_BYTES;
pub use registry::SqliteJournalMode;
pub use registry::SqliteRegistryConfig;
pub use registry::SqliteRegistryError;
pub use registry::SqliteSyncMode;
pub use registry::SqliteTaskDefinitionRegistry;
