// crates/taskdef-cli/src/lib.rs
// ============================================================================
// Module: Task Definition CLI Library
// Description: Shared helpers for the `taskdef` binary.
// Purpose: Expose the message catalog to the binary and its tests.
// Dependencies: crate::i18n
// ============================================================================

//! ## Overview
//! Library half of the `taskdef` CLI. The binary routes every user-facing
//! string through [`i18n`] and the [`t!`] macro.

pub mod i18n;
