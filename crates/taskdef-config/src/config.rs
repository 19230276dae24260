// crates/taskdef-config/src/config.rs
// ============================================================================
// Module: Task Definition Configuration
// Description: Configuration loading and validation for taskdef.toml.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: taskdef-core, taskdef-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, then `TASKDEF_CONFIG`, then `taskdef.toml`
//! in the working directory. Missing or invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use taskdef_core::FieldError;
use taskdef_core::ResourceName;
use taskdef_core::TaskDefinitionSpec;
use taskdef_store_sqlite::SqliteJournalMode;
use taskdef_store_sqlite::SqliteRegistryConfig;
use taskdef_store_sqlite::SqliteSyncMode;
use thiserror::Error;

use crate::resource::ResourceConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "taskdef.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "TASKDEF_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of task definitions declared in one file.
pub const MAX_TASK_DEFINITIONS: usize = 64;
/// Default registry busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Top-level `taskdef.toml` configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskdefConfig {
    /// Registry backend configuration.
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Lifecycle audit log configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Declared task definitions.
    #[serde(default, rename = "task_definition")]
    pub task_definitions: Vec<ResourceConfig>,
}

impl TaskdefConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates backend settings and every declared task definition.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for backend or structural problems and
    /// [`ConfigError::Validation`] with every field error across all
    /// declared task definitions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.registry.validate()?;
        self.audit.validate()?;
        if self.task_definitions.len() > MAX_TASK_DEFINITIONS {
            return Err(ConfigError::Invalid(format!(
                "too many task definitions: {} (max {MAX_TASK_DEFINITIONS})",
                self.task_definitions.len()
            )));
        }
        let mut names = BTreeSet::new();
        let mut families = BTreeSet::new();
        for resource in &self.task_definitions {
            if !names.insert(resource.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate task_definition name {:?}",
                    resource.name.as_str()
                )));
            }
            if !families.insert(resource.family.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "family {:?} is declared by more than one task_definition",
                    resource.family
                )));
            }
        }
        let errors: Vec<FieldError> = self
            .task_definitions
            .iter()
            .filter_map(|resource| resource.to_spec().err())
            .flatten()
            .collect();
        if errors.is_empty() { Ok(()) } else { Err(ConfigError::Validation(errors)) }
    }

    /// Returns the declared task definition with the given name.
    #[must_use]
    pub fn resource(&self, name: &str) -> Option<&ResourceConfig> {
        self.task_definitions.iter().find(|resource| resource.name.as_str() == name)
    }

    /// Converts every declared task definition into a validated spec.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] with every field error found.
    pub fn specs(&self) -> Result<Vec<(ResourceName, TaskDefinitionSpec)>, ConfigError> {
        let mut specs = Vec::with_capacity(self.task_definitions.len());
        let mut errors = Vec::new();
        for resource in &self.task_definitions {
            match resource.to_spec() {
                Ok(spec) => specs.push((resource.name.clone(), spec)),
                Err(mut found) => errors.append(&mut found),
            }
        }
        if errors.is_empty() { Ok(specs) } else { Err(ConfigError::Validation(errors)) }
    }
}

/// Registry backend configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Registry backend type.
    #[serde(rename = "type", default)]
    pub registry_type: RegistryType,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Region embedded in issued ARNs.
    #[serde(default = "default_region")]
    pub region: String,
    /// Account id embedded in issued ARNs.
    #[serde(default = "default_account_id")]
    pub account_id: String,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            registry_type: RegistryType::default(),
            path: None,
            region: default_region(),
            account_id: default_account_id(),
            journal_mode: SqliteJournalMode::default(),
            sync_mode: SqliteSyncMode::default(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl RegistryConfig {
    /// Validates registry configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let region_ok = !self.region.is_empty()
            && self
                .region
                .bytes()
                .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-');
        if !region_ok {
            return Err(ConfigError::Invalid(format!(
                "registry region {:?} must be lowercase letters, digits, and hyphens",
                self.region
            )));
        }
        if self.account_id.len() != 12 || !self.account_id.bytes().all(|byte| byte.is_ascii_digit())
        {
            return Err(ConfigError::Invalid(format!(
                "registry account_id {:?} must be 12 digits",
                self.account_id
            )));
        }
        match self.registry_type {
            RegistryType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid(
                        "memory registry must not set path".to_string(),
                    ));
                }
                Ok(())
            }
            RegistryType::Sqlite => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("sqlite registry requires path".to_string())
                })?;
                validate_path_string("registry.path", &path.to_string_lossy())?;
                if self.busy_timeout_ms == 0 {
                    return Err(ConfigError::Invalid(
                        "registry busy_timeout_ms must be greater than zero".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Builds the `SQLite` registry configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the backend is not sqlite or no
    /// path is configured.
    pub fn sqlite_config(&self) -> Result<SqliteRegistryConfig, ConfigError> {
        if self.registry_type != RegistryType::Sqlite {
            return Err(ConfigError::Invalid("registry type is not sqlite".to_string()));
        }
        let path = self
            .path
            .clone()
            .ok_or_else(|| ConfigError::Invalid("sqlite registry requires path".to_string()))?;
        Ok(SqliteRegistryConfig {
            path,
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
            region: self.region.clone(),
            account_id: self.account_id.clone(),
        })
    }
}

/// Registry backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RegistryType {
    /// In-process registry; nothing survives the process.
    #[default]
    Memory,
    /// `SQLite`-backed durable registry.
    Sqlite,
}

/// Lifecycle audit log configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Emit lifecycle events.
    #[serde(default)]
    pub enabled: bool,
    /// JSON-lines output file; stderr when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", &path.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Returns the default ARN region.
fn default_region() -> String {
    "us-east-1".to_string()
}

/// Returns the default ARN account id.
fn default_account_id() -> String {
    "000000000000".to_string()
}

/// Returns the default registry busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// Declared task definitions failed validation.
    #[error("invalid task definitions: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),
}

impl ConfigError {
    /// Returns the field errors carried by a validation failure.
    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation(errors) => errors,
            Self::Io(_) | Self::Parse(_) | Self::Invalid(_) => &[],
        }
    }
}

/// Renders field errors as a `; `-separated list.
fn join_field_errors(errors: &[FieldError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions use unwrap/expect for clarity."
    )]

    use super::*;

    #[test]
    fn validate_path_string_accepts_valid_path() {
        assert!(validate_path_string("registry.path", "./state/registry.db").is_ok());
    }

    #[test]
    fn validate_path_string_rejects_whitespace_only() {
        let err = validate_path_string("audit.path", "   ").unwrap_err();
        assert!(err.to_string().contains("audit.path must be non-empty"));
    }

    #[test]
    fn validate_path_string_rejects_overlong_component() {
        let long = format!("state/{}", "a".repeat(MAX_PATH_COMPONENT_LENGTH + 1));
        let err = validate_path_string("registry.path", &long).unwrap_err();
        assert!(err.to_string().contains("path component too long"));
    }

    #[test]
    fn resolve_path_prefers_explicit_path() {
        let resolved = resolve_path(Some(Path::new("custom.toml"))).unwrap();
        assert_eq!(resolved, PathBuf::from("custom.toml"));
    }

    #[test]
    fn field_errors_are_empty_for_non_validation_errors() {
        assert!(ConfigError::Invalid("x".to_string()).field_errors().is_empty());
    }
}
