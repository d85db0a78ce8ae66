// crates/mcp-hub-store-sqlite/src/pool.rs
// ============================================================================
// Module: SQLite Connection Pool
// Description: Fixed-size round-robin pool with lazy schema creation.
// Purpose: Share a few connections between the token store and usage log.
// Dependencies: mcp-hub-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! [`SqlitePool`] opens `pool_size` connections up front and hands them out
//! round-robin. A busy connection blocks the caller (bounded by the SQLite
//! busy timeout), so pool exhaustion shows up as latency rather than as an
//! error. Tables are created on first use with `CREATE TABLE IF NOT EXISTS`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use mcp_hub_core::StoreError;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default connection count.
const DEFAULT_POOL_SIZE: usize = 3;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Schema shared by the token store and the usage log.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS oauth_tokens (
        provider TEXT NOT NULL,
        subject TEXT NOT NULL,
        access_token TEXT NOT NULL,
        refresh_token TEXT,
        expires_at INTEGER,
        scope TEXT,
        metadata TEXT NOT NULL,
        raw TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        PRIMARY KEY (provider, subject)
    );
    CREATE TABLE IF NOT EXISTS tool_usage (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        provider TEXT NOT NULL,
        tool_name TEXT NOT NULL,
        subject TEXT,
        success INTEGER NOT NULL,
        latency_ms INTEGER NOT NULL,
        error_message TEXT,
        created_at INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_tool_usage_provider_tool
        ON tool_usage (provider, tool_name);
";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode.
    #[default]
    Wal,
    /// Delete journal mode.
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// Configuration for the `SQLite` hub stores.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Number of pooled connections.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
}

impl SqliteStoreConfig {
    /// Creates a config with default pool size and timeouts.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pool_size: DEFAULT_POOL_SIZE,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::Wal,
        }
    }
}

/// Returns the default pool size.
const fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Invalid configuration or stored data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// A pooled connection mutex was poisoned.
    #[error("sqlite store lock poisoned")]
    Poisoned,
}

impl From<SqliteStoreError> for StoreError {
    fn from(err: SqliteStoreError) -> Self {
        match err {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Db(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::Poisoned => Self::Poisoned("sqlite connection".to_string()),
        }
    }
}

/// Maps a rusqlite error into the store error type.
pub(crate) fn db_err(err: &rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Pool
// ============================================================================

/// Fixed-size `SQLite` connection pool.
#[derive(Debug)]
pub struct SqlitePool {
    /// Pooled connections.
    connections: Vec<Mutex<Connection>>,
    /// Round-robin cursor.
    next: AtomicUsize,
    /// Set once the schema has been created.
    schema_ready: AtomicBool,
}

impl SqlitePool {
    /// Opens `pool_size` connections to the configured database.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the path is invalid or the database
    /// cannot be opened.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        if config.pool_size == 0 {
            return Err(SqliteStoreError::Invalid("pool_size must be greater than zero".to_string()));
        }
        validate_store_path(&config.path)?;
        if let Some(parent) = config.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|err| SqliteStoreError::Io(err.to_string()))?;
        }
        let mut connections = Vec::with_capacity(config.pool_size);
        for _ in 0..config.pool_size {
            connections.push(Mutex::new(open_connection(config)?));
        }
        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
            schema_ready: AtomicBool::new(false),
        })
    }

    /// Returns the number of pooled connections.
    #[must_use]
    pub fn size(&self) -> usize {
        self.connections.len()
    }

    /// Runs `work` on the next pooled connection, creating the schema first
    /// when it has not been created yet.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] from schema creation or from `work`.
    pub fn with_connection<T>(
        &self,
        work: impl FnOnce(&mut Connection) -> Result<T, SqliteStoreError>,
    ) -> Result<T, SqliteStoreError> {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        let slot = self.connections.get(index).ok_or(SqliteStoreError::Poisoned)?;
        let mut connection = slot.lock().map_err(|_| SqliteStoreError::Poisoned)?;
        if !self.schema_ready.load(Ordering::Acquire) {
            connection.execute_batch(SCHEMA).map_err(|err| db_err(&err))?;
            self.schema_ready.store(true, Ordering::Release);
        }
        work(&mut connection)
    }
}

/// Validates the database path before opening.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.to_string_lossy();
    if path_string.is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens one connection and applies pragmas.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection =
        Connection::open_with_flags(&config.path, flags).map_err(|err| db_err(&err))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| db_err(&err))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| db_err(&err))?;
    connection.execute_batch("PRAGMA synchronous = normal;").map_err(|err| db_err(&err))?;
    Ok(connection)
}
