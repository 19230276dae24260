// crates/taskdef-store-sqlite/src/registry.rs
// ============================================================================
// Module: SQLite Task Definition Registry
// Description: Durable TaskDefinitionRegistry backed by SQLite.
// Purpose: Persist family revisions with monotonic numbering and integrity hashes.
// Dependencies: taskdef-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`SqliteTaskDefinitionRegistry`] stores each registered revision as a
//! canonical JSON spec with its hash. The `families` table keeps the highest
//! revision ever assigned, so numbering survives deregistration. Reads
//! recompute the hash and fail closed on mismatch; database contents are
//! treated as untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::params;
use serde::Deserialize;
use taskdef_core::FamilyName;
use taskdef_core::HashAlgorithm;
use taskdef_core::HashDigest;
use taskdef_core::LaunchType;
use taskdef_core::RegisteredTaskDefinition;
use taskdef_core::RegistryError;
use taskdef_core::Revision;
use taskdef_core::TaskDefinitionArn;
use taskdef_core::TaskDefinitionRecord;
use taskdef_core::TaskDefinitionRef;
use taskdef_core::TaskDefinitionRegistry;
use taskdef_core::TaskDefinitionSpec;
use taskdef_core::TaskDefinitionStatus;
use taskdef_core::Timestamp;
use taskdef_core::derive_compatibilities;
use taskdef_core::hashing::DEFAULT_HASH_ALGORITHM;
use taskdef_core::hashing::canonical_json_bytes;
use taskdef_core::hashing::hash_bytes;
use taskdef_core::time::unix_millis;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the registry.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum canonical spec size accepted by the registry.
pub const MAX_SPEC_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode.
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode.
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` task definition registry.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `region` and `account_id` are only used to build ARNs.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteRegistryConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Region embedded in issued ARNs.
    #[serde(default = "default_region")]
    pub region: String,
    /// Account id embedded in issued ARNs.
    #[serde(default = "default_account_id")]
    pub account_id: String,
}

impl SqliteRegistryConfig {
    /// Creates a configuration for `path` with default settings.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteJournalMode::default(),
            sync_mode: SqliteSyncMode::default(),
            region: default_region(),
            account_id: default_account_id(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default ARN region.
fn default_region() -> String {
    "us-east-1".to_string()
}

/// Returns the default ARN account id.
fn default_account_id() -> String {
    "000000000000".to_string()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` registry errors.
///
/// # Invariants
/// - Error messages avoid embedding raw spec payloads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteRegistryError {
    /// Filesystem error.
    #[error("sqlite registry io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite registry db error: {0}")]
    Db(String),
    /// Stored data failed an integrity check.
    #[error("sqlite registry corruption: {0}")]
    Corrupt(String),
    /// Database schema version is not supported.
    #[error("sqlite registry version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid input or stored data.
    #[error("sqlite registry invalid data: {0}")]
    Invalid(String),
    /// Requested revision does not exist.
    #[error("task definition not found: {0}")]
    NotFound(String),
}

impl From<SqliteRegistryError> for RegistryError {
    fn from(error: SqliteRegistryError) -> Self {
        match error {
            SqliteRegistryError::NotFound(reference) => Self::NotFound(reference),
            SqliteRegistryError::Invalid(message) => Self::Invalid(message),
            other @ (SqliteRegistryError::Io(_)
            | SqliteRegistryError::Db(_)
            | SqliteRegistryError::Corrupt(_)
            | SqliteRegistryError::VersionMismatch(_)) => Self::Remote(other.to_string()),
        }
    }
}

/// Maps a rusqlite error into [`SqliteRegistryError::Db`].
#[allow(clippy::needless_pass_by_value, reason = "Used directly with map_err.")]
fn db_error(err: rusqlite::Error) -> SqliteRegistryError {
    SqliteRegistryError::Db(err.to_string())
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// `SQLite`-backed task definition registry.
///
/// # Invariants
/// - Revisions are assigned from `families.latest_revision`, which only grows.
/// - Describe verifies the stored hash before deserializing a spec.
/// - Connection access is serialized through a mutex.
pub struct SqliteTaskDefinitionRegistry {
    /// Registry configuration.
    config: SqliteRegistryConfig,
    /// Shared connection.
    connection: Mutex<Connection>,
}

impl SqliteTaskDefinitionRegistry {
    /// Opens (or creates) a registry database.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteRegistryError`] when the path is unsafe or the database
    /// cannot be opened or initialized.
    pub fn open(config: SqliteRegistryConfig) -> Result<Self, SqliteRegistryError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            config,
            connection: Mutex::new(connection),
        })
    }

    /// Returns every stored revision of a family, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteRegistryError`] when a query fails or a row fails its
    /// integrity check.
    pub fn revisions(
        &self,
        family: &FamilyName,
    ) -> Result<Vec<TaskDefinitionRecord>, SqliteRegistryError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT family, revision, arn, status, spec_json, spec_hash, hash_algorithm, \
                 registered_at, deregistered_at FROM task_definitions WHERE family = ?1 ORDER BY \
                 revision ASC",
            )
            .map_err(db_error)?;
        let rows = stmt
            .query_map(params![family.as_str()], map_row)
            .map_err(db_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;
        drop(stmt);
        drop(guard);
        rows.into_iter().map(StoredRow::into_record).collect()
    }

    /// Registers a spec inside one transaction.
    fn register_spec(
        &self,
        spec: &TaskDefinitionSpec,
    ) -> Result<RegisteredTaskDefinition, SqliteRegistryError> {
        let spec_json = canonical_json_bytes(spec)
            .map_err(|err| SqliteRegistryError::Invalid(err.to_string()))?;
        if spec_json.len() > MAX_SPEC_BYTES {
            return Err(SqliteRegistryError::Invalid(format!(
                "spec for family {} exceeds size limit: {} bytes (max {MAX_SPEC_BYTES})",
                spec.family,
                spec_json.len()
            )));
        }
        let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, &spec_json);
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_error)?;
        let revision = next_revision(&tx, &spec.family)?;
        let arn = TaskDefinitionArn::new(
            &self.config.region,
            &self.config.account_id,
            &spec.family,
            revision,
        );
        let revision_value = revision_to_i64(revision)?;
        tx.execute(
            "INSERT INTO families (family, latest_revision) VALUES (?1, ?2) ON CONFLICT(family) \
             DO UPDATE SET latest_revision = excluded.latest_revision",
            params![spec.family.as_str(), revision_value],
        )
        .map_err(db_error)?;
        tx.execute(
            "INSERT INTO task_definitions (family, revision, arn, status, spec_json, spec_hash, \
             hash_algorithm, registered_at, deregistered_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, \
             ?8, NULL)",
            params![
                spec.family.as_str(),
                revision_value,
                arn.as_str(),
                TaskDefinitionStatus::Active.as_str(),
                spec_json.as_slice(),
                digest.value.as_str(),
                hash_algorithm_label(digest.algorithm),
                unix_millis()
            ],
        )
        .map_err(db_error)?;
        tx.commit().map_err(db_error)?;
        drop(guard);
        Ok(RegisteredTaskDefinition {
            arn,
            revision,
        })
    }

    /// Loads and verifies the row a reference resolves to.
    fn describe_reference(
        &self,
        reference: &TaskDefinitionRef,
    ) -> Result<TaskDefinitionRecord, SqliteRegistryError> {
        let not_found = || SqliteRegistryError::NotFound(reference.to_string());
        let guard = self.lock()?;
        let row = match reference {
            TaskDefinitionRef::Family {
                family,
            } => fetch_latest_row(&guard, family)?,
            TaskDefinitionRef::Revision {
                family,
                revision,
            } => fetch_row(&guard, family, *revision)?,
            TaskDefinitionRef::Arn {
                arn,
            } => fetch_row(&guard, &arn.family(), arn.revision())?
                .filter(|row| row.arn == arn.as_str()),
        };
        drop(guard);
        row.ok_or_else(not_found)?.into_record()
    }

    /// Marks a revision `INACTIVE` and returns its resulting status.
    fn deregister_arn(
        &self,
        arn: &TaskDefinitionArn,
    ) -> Result<TaskDefinitionStatus, SqliteRegistryError> {
        let family = arn.family();
        let revision_value = revision_to_i64(arn.revision())?;
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_error)?;
        let status: Option<String> = tx
            .query_row(
                "SELECT status FROM task_definitions WHERE family = ?1 AND revision = ?2 AND arn \
                 = ?3",
                params![family.as_str(), revision_value, arn.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_error)?;
        let Some(status) = status else {
            return Err(SqliteRegistryError::NotFound(arn.to_string()));
        };
        if parse_status(&status)? == TaskDefinitionStatus::Active {
            tx.execute(
                "UPDATE task_definitions SET status = ?1, deregistered_at = ?2 WHERE family = ?3 \
                 AND revision = ?4",
                params![
                    TaskDefinitionStatus::Inactive.as_str(),
                    unix_millis(),
                    family.as_str(),
                    revision_value
                ],
            )
            .map_err(db_error)?;
        }
        tx.commit().map_err(db_error)?;
        drop(guard);
        Ok(TaskDefinitionStatus::Inactive)
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteRegistryError> {
        self.connection
            .lock()
            .map_err(|_| SqliteRegistryError::Io("sqlite registry mutex poisoned".to_string()))
    }
}

impl TaskDefinitionRegistry for SqliteTaskDefinitionRegistry {
    fn register(&self, spec: &TaskDefinitionSpec) -> Result<RegisteredTaskDefinition, RegistryError> {
        self.register_spec(spec).map_err(RegistryError::from)
    }

    fn describe(&self, reference: &TaskDefinitionRef) -> Result<TaskDefinitionRecord, RegistryError> {
        self.describe_reference(reference).map_err(RegistryError::from)
    }

    fn deregister(&self, arn: &TaskDefinitionArn) -> Result<TaskDefinitionStatus, RegistryError> {
        self.deregister_arn(arn).map_err(RegistryError::from)
    }
}

// ============================================================================
// SECTION: Rows
// ============================================================================

/// Raw columns of one `task_definitions` row.
#[derive(Debug)]
struct StoredRow {
    /// Family column.
    family: String,
    /// Revision column.
    revision: i64,
    /// ARN column.
    arn: String,
    /// Status column.
    status: String,
    /// Canonical spec JSON.
    spec_json: Vec<u8>,
    /// Stored hash value.
    spec_hash: String,
    /// Stored hash algorithm label.
    hash_algorithm: String,
    /// Registration time (unix millis).
    registered_at: i64,
    /// Deregistration time (unix millis).
    deregistered_at: Option<i64>,
}

impl StoredRow {
    /// Verifies the row and converts it into a record.
    fn into_record(self) -> Result<TaskDefinitionRecord, SqliteRegistryError> {
        let algorithm = parse_hash_algorithm(&self.hash_algorithm)?;
        let expected = hash_bytes(algorithm, &self.spec_json);
        if expected.value != self.spec_hash {
            return Err(SqliteRegistryError::Corrupt(format!("hash mismatch for {}", self.arn)));
        }
        let spec: TaskDefinitionSpec = serde_json::from_slice(&self.spec_json)
            .map_err(|err| SqliteRegistryError::Invalid(err.to_string()))?;
        if spec.family.as_str() != self.family {
            return Err(SqliteRegistryError::Corrupt(format!(
                "family mismatch between key and payload for {}",
                self.arn
            )));
        }
        let revision = u64::try_from(self.revision)
            .ok()
            .and_then(Revision::from_raw)
            .ok_or_else(|| {
                SqliteRegistryError::Corrupt(format!("invalid revision for {}", self.arn))
            })?;
        let arn = TaskDefinitionArn::parse(&self.arn).ok_or_else(|| {
            SqliteRegistryError::Corrupt(format!("invalid arn stored for {}", self.family))
        })?;
        if arn.family() != spec.family || arn.revision() != revision {
            return Err(SqliteRegistryError::Corrupt(format!(
                "arn {arn} does not match stored family and revision"
            )));
        }
        let status = parse_status(&self.status)?;
        if (status == TaskDefinitionStatus::Inactive) != self.deregistered_at.is_some() {
            return Err(SqliteRegistryError::Corrupt(format!(
                "status {status} inconsistent with deregistration time for {arn}"
            )));
        }
        let compatibilities: BTreeSet<LaunchType> = derive_compatibilities(&spec);
        Ok(TaskDefinitionRecord {
            arn,
            family: spec.family.clone(),
            revision,
            status,
            compatibilities,
            spec,
            spec_hash: HashDigest {
                algorithm,
                value: self.spec_hash,
            },
            registered_at: Timestamp::UnixMillis(self.registered_at),
            deregistered_at: self.deregistered_at.map(Timestamp::UnixMillis),
        })
    }
}

/// Maps a query row into a [`StoredRow`].
fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredRow> {
    Ok(StoredRow {
        family: row.get(0)?,
        revision: row.get(1)?,
        arn: row.get(2)?,
        status: row.get(3)?,
        spec_json: row.get(4)?,
        spec_hash: row.get(5)?,
        hash_algorithm: row.get(6)?,
        registered_at: row.get(7)?,
        deregistered_at: row.get(8)?,
    })
}

/// Fetches one revision of a family.
fn fetch_row(
    connection: &Connection,
    family: &FamilyName,
    revision: Revision,
) -> Result<Option<StoredRow>, SqliteRegistryError> {
    connection
        .query_row(
            "SELECT family, revision, arn, status, spec_json, spec_hash, hash_algorithm, \
             registered_at, deregistered_at FROM task_definitions WHERE family = ?1 AND revision \
             = ?2",
            params![family.as_str(), revision_to_i64(revision)?],
            map_row,
        )
        .optional()
        .map_err(db_error)
}

/// Fetches the highest stored revision of a family, whatever its status.
fn fetch_latest_row(
    connection: &Connection,
    family: &FamilyName,
) -> Result<Option<StoredRow>, SqliteRegistryError> {
    connection
        .query_row(
            "SELECT family, revision, arn, status, spec_json, spec_hash, hash_algorithm, \
             registered_at, deregistered_at FROM task_definitions WHERE family = ?1 ORDER BY \
             revision DESC LIMIT 1",
            params![family.as_str()],
            map_row,
        )
        .optional()
        .map_err(db_error)
}

/// Returns the revision the next registration of `family` receives.
fn next_revision(
    tx: &Transaction<'_>,
    family: &FamilyName,
) -> Result<Revision, SqliteRegistryError> {
    let latest: Option<i64> = tx
        .query_row(
            "SELECT latest_revision FROM families WHERE family = ?1",
            params![family.as_str()],
            |row| row.get(0),
        )
        .optional()
        .map_err(db_error)?;
    let Some(latest) = latest else {
        return Ok(Revision::FIRST);
    };
    u64::try_from(latest)
        .ok()
        .and_then(Revision::from_raw)
        .ok_or_else(|| {
            SqliteRegistryError::Corrupt(format!("invalid latest_revision for family {family}"))
        })?
        .next()
        .ok_or_else(|| SqliteRegistryError::Invalid(format!("revision overflow for family {family}")))
}

/// Converts a revision into an `SQLite` integer.
fn revision_to_i64(revision: Revision) -> Result<i64, SqliteRegistryError> {
    i64::try_from(revision.get())
        .map_err(|_| SqliteRegistryError::Invalid(format!("revision {revision} out of range")))
}

/// Parses a stored status label.
fn parse_status(label: &str) -> Result<TaskDefinitionStatus, SqliteRegistryError> {
    TaskDefinitionStatus::parse(label)
        .ok_or_else(|| SqliteRegistryError::Corrupt(format!("unknown status: {label}")))
}

/// Returns the canonical hash algorithm label.
const fn hash_algorithm_label(algorithm: HashAlgorithm) -> &'static str {
    match algorithm {
        HashAlgorithm::Sha256 => "sha256",
    }
}

/// Parses a hash algorithm label.
fn parse_hash_algorithm(label: &str) -> Result<HashAlgorithm, SqliteRegistryError> {
    match label {
        "sha256" => Ok(HashAlgorithm::Sha256),
        other => Err(SqliteRegistryError::Invalid(format!("unsupported hash algorithm: {other}"))),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the database exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteRegistryError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteRegistryError::Io("registry path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteRegistryError::Io(err.to_string()))
}

/// Validates registry paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteRegistryError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteRegistryError::Invalid("registry path must not be empty".to_string()));
    }
    if path.display().to_string().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteRegistryError::Invalid("registry path exceeds length limit".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteRegistryError::Invalid(
                "registry path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteRegistryError::Invalid(
            "registry path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection and applies pragmas.
fn open_connection(config: &SqliteRegistryConfig) -> Result<Connection, SqliteRegistryError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(db_error)?;
    connection.execute_batch("PRAGMA foreign_keys = ON;").map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db_error)?;
    connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms)).map_err(db_error)?;
    Ok(connection)
}

/// Creates the schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteRegistryError> {
    let tx = connection.transaction().map_err(db_error)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(db_error)?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(db_error)?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(db_error)?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS families (
                    family TEXT PRIMARY KEY,
                    latest_revision INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS task_definitions (
                    family TEXT NOT NULL,
                    revision INTEGER NOT NULL,
                    arn TEXT NOT NULL UNIQUE,
                    status TEXT NOT NULL,
                    spec_json BLOB NOT NULL,
                    spec_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL,
                    registered_at INTEGER NOT NULL,
                    deregistered_at INTEGER,
                    PRIMARY KEY (family, revision),
                    FOREIGN KEY (family) REFERENCES families(family)
                );",
            )
            .map_err(db_error)?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteRegistryError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(db_error)
}
