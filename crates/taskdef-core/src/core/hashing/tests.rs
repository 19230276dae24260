// crates/taskdef-core/src/core/hashing/tests.rs
// ============================================================================
// Module: Canonical Hashing Tests
// Description: Unit tests for canonical JSON digests.
// Purpose: Confirm digests ignore key order and match known SHA-256 output.
// Dependencies: taskdef-core
// ============================================================================

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use super::DEFAULT_HASH_ALGORITHM;
use super::HashAlgorithm;
use super::canonical_json_string;
use super::hash_bytes;
use super::hash_canonical_json;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn key_order_does_not_change_digest() {
    let left: serde_json::Value = serde_json::from_str(r#"{"b":1,"a":[2,3]}"#).unwrap();
    let right: serde_json::Value = serde_json::from_str(r#"{ "a": [2, 3], "b": 1 }"#).unwrap();
    let left = hash_canonical_json(DEFAULT_HASH_ALGORITHM, &left).unwrap();
    let right = hash_canonical_json(DEFAULT_HASH_ALGORITHM, &right).unwrap();
    assert_eq!(left, right);
    assert_eq!(left.value.len(), 64);
}

#[test]
fn canonical_string_sorts_keys() {
    let value: serde_json::Value = serde_json::from_str(r#"{"z":true,"a":"x"}"#).unwrap();
    assert_eq!(canonical_json_string(&value).unwrap(), r#"{"a":"x","z":true}"#);
}

#[test]
fn empty_input_matches_known_sha256() {
    let digest = hash_bytes(HashAlgorithm::Sha256, b"");
    assert_eq!(digest.value, "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
    assert!(digest.to_string().starts_with("sha256:"));
}
