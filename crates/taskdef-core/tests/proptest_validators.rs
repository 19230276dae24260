// crates/taskdef-core/tests/proptest_validators.rs
// ============================================================================
// Module: Validator Property-Based Tests
// Description: Property tests for validator purity and rejection behavior.
// Purpose: Detect panics and membership errors across wide input ranges.
// ============================================================================

//! Property-based tests for the attribute validators.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use proptest::prelude::*;
use serde_json::json;
use taskdef_core::FieldErrorKind;
use taskdef_core::normalize_container_definitions;
use taskdef_core::validate_container_definitions;
use taskdef_core::validate_network_mode;

const DOCKER_MODES: [&str; 3] = ["bridge", "host", "none"];

proptest! {
    #[test]
    fn non_member_network_modes_are_rejected(value in ".{0,24}") {
        prop_assume!(!DOCKER_MODES.contains(&value.as_str()));
        let errors = validate_network_mode(&value, "network_mode");
        prop_assert_eq!(errors.len(), 1);
        prop_assert_eq!(errors[0].field.as_str(), "network_mode");
        prop_assert_eq!(errors[0].kind, FieldErrorKind::Invalid);
    }

    #[test]
    fn network_mode_validation_is_pure(value in ".{0,24}", field in "[a-z_.]{1,32}") {
        prop_assert_eq!(
            validate_network_mode(&value, &field),
            validate_network_mode(&value, &field)
        );
    }

    #[test]
    fn arbitrary_text_never_panics(text in ".{0,128}") {
        let errors = validate_container_definitions(&text, "container_definitions");
        prop_assert_eq!(errors, validate_container_definitions(&text, "container_definitions"));
    }

    #[test]
    fn string_commands_are_always_rejected(command in "[a-z ]{0,32}") {
        let document = json!([{ "name": "app", "image": "busybox", "command": command }]).to_string();
        let errors = validate_container_definitions(&document, "container_definitions");
        prop_assert!(!errors.is_empty());
        prop_assert!(errors.iter().all(|error| error.kind == FieldErrorKind::Schema));
    }

    #[test]
    fn string_array_commands_are_always_accepted(
        command in prop::collection::vec(".{0,16}", 0 .. 6),
        cpu in 0_u32 .. 4096,
    ) {
        let document = json!([{ "name": "app", "image": "busybox", "cpu": cpu, "command": command }])
            .to_string();
        prop_assert!(validate_container_definitions(&document, "container_definitions").is_empty());
    }

    #[test]
    fn normalization_ignores_key_order(cpu in 0_u32 .. 4096, memory in 1_u32 .. 8192) {
        let forward = format!(r#"[{{"name":"app","image":"busybox","cpu":{cpu},"memory":{memory}}}]"#);
        let reverse = format!(r#"[{{"memory":{memory},"cpu":{cpu},"image":"busybox","name":"app"}}]"#);
        let left = normalize_container_definitions(&forward, "container_definitions").unwrap();
        let right = normalize_container_definitions(&reverse, "container_definitions").unwrap();
        prop_assert_eq!(left, right);
    }
}
