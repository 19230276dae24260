// crates/taskdef-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings for localized output.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! The `taskdef` CLI stores user-facing strings in a small translation
//! catalog so messages stay consistent across commands. All runtime output
//! should be routed through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to English and then to the key itself.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported CLI locales.
///
/// # Invariants
/// - [`Locale::En`] is the default fallback locale.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locale {
    /// English (default).
    En,
    /// Catalan.
    Ca,
}

impl Locale {
    /// Returns the canonical locale label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ca => "ca",
        }
    }

    /// Parses a locale value (case-insensitive, tolerant of region tags).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.split(['-', '_', '.']).next() {
            Some("en") => Some(Self::En),
            Some("ca") => Some(Self::Ca),
            _ => None,
        }
    }
}

/// Ordered list of supported CLI locales.
pub const SUPPORTED_LOCALES: &[Locale] = &[Locale::En, Locale::Ca];

/// A formatted message argument captured by the [`macro@crate::t`] macro.
///
/// # Invariants
/// - `key` matches a placeholder name without braces (for example, `path`).
#[derive(Clone)]
pub struct MessageArg {
    /// Placeholder name used in message templates.
    pub key: &'static str,
    /// Formatted value substituted for the placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Locale Selection
// ============================================================================

/// Global locale selection for CLI output.
static CURRENT_LOCALE: OnceLock<Locale> = OnceLock::new();

/// Sets the CLI locale. Only the first call wins.
pub fn set_locale(locale: Locale) {
    let _ = CURRENT_LOCALE.set(locale);
}

/// Returns the current CLI locale (defaults to English).
#[must_use]
pub fn current_locale() -> Locale {
    CURRENT_LOCALE.get().copied().unwrap_or(Locale::En)
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English catalog entries.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "taskdef {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("output.serialize_failed", "Failed to serialize output: {error}"),
    ("input.read_failed", "Failed to read {kind} at {path}: {error}"),
    (
        "input.read_too_large",
        "Refusing to read {kind} at {path} because it is {size} bytes (limit {limit}).",
    ),
    ("input.kind.container_definitions", "container definitions"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid: {count} task definition(s)."),
    ("config.resource.not_found", "No task_definition named {name} in config."),
    ("registry.open_failed", "Failed to open registry: {error}"),
    ("audit.open_failed", "Failed to open audit log {path}: {error}"),
    ("plan.failed", "Plan failed for {name}: {error}"),
    ("plan.summary", "{name} ({family}): {action}"),
    ("plan.current", "  current: {arn}"),
    ("plan.change", "  ~ {attribute} ({policy})"),
    ("plan.policy.in_place", "in place"),
    ("plan.policy.replace", "forces replacement"),
    ("apply.failed", "Apply failed for {name}: {error}"),
    ("apply.result.active", "{name} ({family}): {action} -> {arn}"),
    ("apply.result.absent", "{name} ({family}): {action} -> absent"),
    ("destroy.failed", "Destroy failed for {name}: {error}"),
    ("describe.invalid_reference", "Invalid task definition reference: {error}"),
    ("describe.failed", "Describe failed: {error}"),
    ("describe.text.arn", "ARN: {arn}"),
    ("describe.text.status", "Status: {status}"),
    ("describe.text.network_mode", "Network mode: {network_mode}"),
    ("describe.text.containers", "Containers: {containers}"),
    ("describe.text.compatibilities", "Compatibilities: {compatibilities}"),
    ("describe.text.spec_hash", "Spec hash: {digest}"),
    ("check.network_mode.ok", "Network mode {value} is valid."),
    ("check.container_definitions.ok", "Container definitions valid: {count} container(s)."),
    ("check.failed", "Validation failed with {count} error(s):"),
    ("check.error_line", "  {error}"),
    ("i18n.lang.invalid_env", "Invalid value for {env}: {value}. Expected 'en' or 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Note: non-English output is machine-translated and may be inaccurate.",
    ),
];

/// Catalan catalog entries.
const CATALOG_CA: &[(&str, &str)] = &[
    ("main.version", "taskdef {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "sortida"),
    ("output.write_failed", "No s'ha pogut escriure a {stream}: {error}"),
    ("output.serialize_failed", "No s'ha pogut serialitzar la sortida: {error}"),
    ("input.read_failed", "No s'ha pogut llegir {kind} a {path}: {error}"),
    (
        "input.read_too_large",
        "Es rebutja llegir {kind} a {path} perquè té {size} bytes (límit {limit}).",
    ),
    ("input.kind.container_definitions", "definicions de contenidors"),
    ("config.load_failed", "No s'ha pogut carregar la configuració: {error}"),
    ("config.validate.ok", "Configuració vàlida: {count} definició(ns) de tasca."),
    ("config.resource.not_found", "No hi ha cap task_definition anomenada {name}."),
    ("registry.open_failed", "No s'ha pogut obrir el registre: {error}"),
    ("audit.open_failed", "No s'ha pogut obrir el registre d'auditoria {path}: {error}"),
    ("plan.failed", "La planificació ha fallat per a {name}: {error}"),
    ("plan.summary", "{name} ({family}): {action}"),
    ("plan.current", "  actual: {arn}"),
    ("plan.change", "  ~ {attribute} ({policy})"),
    ("plan.policy.in_place", "in situ"),
    ("plan.policy.replace", "força la substitució"),
    ("apply.failed", "L'aplicació ha fallat per a {name}: {error}"),
    ("apply.result.active", "{name} ({family}): {action} -> {arn}"),
    ("apply.result.absent", "{name} ({family}): {action} -> absent"),
    ("destroy.failed", "La destrucció ha fallat per a {name}: {error}"),
    ("describe.invalid_reference", "Referència de definició de tasca no vàlida: {error}"),
    ("describe.failed", "La descripció ha fallat: {error}"),
    ("describe.text.arn", "ARN: {arn}"),
    ("describe.text.status", "Estat: {status}"),
    ("describe.text.network_mode", "Mode de xarxa: {network_mode}"),
    ("describe.text.containers", "Contenidors: {containers}"),
    ("describe.text.compatibilities", "Compatibilitats: {compatibilities}"),
    ("describe.text.spec_hash", "Hash de l'especificació: {digest}"),
    ("check.network_mode.ok", "El mode de xarxa {value} és vàlid."),
    (
        "check.container_definitions.ok",
        "Definicions de contenidors vàlides: {count} contenidor(s).",
    ),
    ("check.failed", "La validació ha fallat amb {count} error(s):"),
    ("check.error_line", "  {error}"),
    ("i18n.lang.invalid_env", "Valor no vàlid per a {env}: {value}. S'esperava 'en' o 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Nota: la sortida que no és en anglès està traduïda automàticament i pot ser inexacta.",
    ),
];

/// Returns the message catalog for the requested locale.
pub(crate) fn catalog_for(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    static CATALOG_CA_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    match locale {
        Locale::En => CATALOG_EN_MAP.get_or_init(|| CATALOG_EN.iter().copied().collect()),
        Locale::Ca => CATALOG_CA_MAP.get_or_init(|| CATALOG_CA.iter().copied().collect()),
    }
}

/// Returns the catalog keys of `locale`, sorted.
#[must_use]
pub fn catalog_keys(locale: Locale) -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = catalog_for(locale).keys().copied().collect();
    keys.sort_unstable();
    keys
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the selected locale while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let locale = current_locale();
    let template = catalog_for(locale)
        .get(key)
        .copied()
        .or_else(|| catalog_for(Locale::En).get(key).copied())
        .unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
