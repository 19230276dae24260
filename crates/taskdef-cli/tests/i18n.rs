// crates/taskdef-cli/tests/i18n.rs
// ============================================================================
// Module: CLI i18n Tests
// Description: Exercises the translation catalog and placeholder substitution.
// Purpose: Ensure CLI user-facing strings route through stable i18n helpers.
// Dependencies: taskdef-cli i18n module and the `t!` macro.
// ============================================================================

//! ## Overview
//! Validates the `taskdef` CLI i18n catalog behavior:
//! - Message arguments capture key/value substitutions.
//! - Translation falls back to keys on misses.
//! - Every locale carries the same keys.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use taskdef_cli::i18n::Locale;
use taskdef_cli::i18n::MessageArg;
use taskdef_cli::i18n::SUPPORTED_LOCALES;
use taskdef_cli::i18n::catalog_keys;
use taskdef_cli::i18n::translate;
use taskdef_cli::t;

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Confirms message arguments capture key/value pairs.
#[test]
fn message_arg_new_captures_key_and_value() {
    let arg = MessageArg::new("path", "/tmp/taskdef.toml");
    assert_eq!(arg.key, "path");
    assert_eq!(arg.value, "/tmp/taskdef.toml");
}

/// Confirms catalog entries resolve and replace placeholders.
#[test]
fn translate_substitutes_placeholders() {
    let args = vec![MessageArg::new("value", "awsvpc")];
    let result = translate("check.network_mode.ok", args);
    assert_eq!(result, "Network mode awsvpc is valid.");
}

/// Confirms missing keys fall back to the key string.
#[test]
fn translate_falls_back_to_key() {
    let result = translate("missing.key", Vec::new());
    assert_eq!(result, "missing.key");
}

/// Confirms the macro formats every named argument.
#[test]
fn t_macro_formats_arguments() {
    let message = t!("plan.summary", name = "jenkins", family = "terraform-acc-test", action = "create");
    assert_eq!(message, "jenkins (terraform-acc-test): create");
}

/// Confirms unknown placeholders are left untouched.
#[test]
fn translate_ignores_unknown_arguments() {
    let message = t!("config.validate.ok", count = 2, extra = "unused");
    assert_eq!(message, "Config valid: 2 task definition(s).");
}

/// Confirms every locale carries the same catalog keys.
#[test]
fn catalogs_share_keys() {
    let english = catalog_keys(Locale::En);
    for locale in SUPPORTED_LOCALES {
        assert_eq!(catalog_keys(*locale), english, "catalog {} diverges", locale.as_str());
    }
}

/// Confirms locale parsing tolerates case and region tags.
#[test]
fn locale_parse_accepts_region_tags() {
    assert_eq!(Locale::parse("EN-us"), Some(Locale::En));
    assert_eq!(Locale::parse(" ca_ES "), Some(Locale::Ca));
    assert_eq!(Locale::parse(""), None);
    assert_eq!(Locale::parse("de"), None);
}
