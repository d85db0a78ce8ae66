// crates/mcp-hub-store-sqlite/src/token.rs
// ============================================================================
// Module: SQLite Token Store
// Description: TokenStore backed by the `oauth_tokens` table.
// Purpose: Persist per-(provider, subject) credentials with upsert semantics.
// Dependencies: mcp-hub-core, rusqlite, serde_json
// ============================================================================

//! ## Overview
//! Upserts use `ON CONFLICT (provider, subject) DO UPDATE`, overwriting every
//! column except `created_at`. Metadata and the raw upstream payload are
//! stored as JSON text; stored JSON is untrusted and re-parsed on load.

use std::sync::Arc;

use mcp_hub_core::StoreError;
use mcp_hub_core::TokenRecord;
use mcp_hub_core::TokenStore;
use mcp_hub_core::time::unix_millis;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde_json::Value;

use crate::pool::SqlitePool;
use crate::pool::SqliteStoreError;
use crate::pool::db_err;

/// SQLite-backed token store.
#[derive(Debug, Clone)]
pub struct SqliteTokenStore {
    /// Shared connection pool.
    pool: Arc<SqlitePool>,
}

impl SqliteTokenStore {
    /// Creates a token store over the shared pool.
    #[must_use]
    pub const fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            pool,
        }
    }
}

impl TokenStore for SqliteTokenStore {
    fn upsert_token(&self, mut record: TokenRecord) -> Result<TokenRecord, StoreError> {
        let metadata = serde_json::to_string(&record.metadata)
            .map_err(|err| StoreError::Invalid(err.to_string()))?;
        let raw = record
            .raw
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|err| StoreError::Invalid(err.to_string()))?;
        let now = unix_millis();
        let created_at = self.pool.with_connection(|connection| {
            connection
                .query_row(
                    "INSERT INTO oauth_tokens (
                        provider, subject, access_token, refresh_token, expires_at, scope,
                        metadata, raw, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
                    ON CONFLICT (provider, subject) DO UPDATE SET
                        access_token = excluded.access_token,
                        refresh_token = excluded.refresh_token,
                        expires_at = excluded.expires_at,
                        scope = excluded.scope,
                        metadata = excluded.metadata,
                        raw = excluded.raw,
                        updated_at = excluded.updated_at
                    RETURNING created_at",
                    params![
                        record.provider,
                        record.subject,
                        record.access_token,
                        record.refresh_token,
                        record.expires_at_ms,
                        record.scope,
                        metadata,
                        raw,
                        now,
                    ],
                    |row| row.get::<_, i64>(0),
                )
                .map_err(|err| db_err(&err))
        })?;
        record.created_at_ms = created_at;
        record.updated_at_ms = now;
        Ok(record)
    }

    fn get_token(&self, provider: &str, subject: &str) -> Result<Option<TokenRecord>, StoreError> {
        let row = self.pool.with_connection(|connection| {
            connection
                .query_row(
                    "SELECT access_token, refresh_token, expires_at, scope, metadata, raw,
                            created_at, updated_at
                     FROM oauth_tokens WHERE provider = ?1 AND subject = ?2",
                    params![provider, subject],
                    |row| {
                        Ok(StoredRow {
                            access_token: row.get(0)?,
                            refresh_token: row.get(1)?,
                            expires_at_ms: row.get(2)?,
                            scope: row.get(3)?,
                            metadata: row.get(4)?,
                            raw: row.get(5)?,
                            created_at_ms: row.get(6)?,
                            updated_at_ms: row.get(7)?,
                        })
                    },
                )
                .optional()
                .map_err(|err| db_err(&err))
        })?;
        row.map(|row| row.into_record(provider, subject)).transpose().map_err(StoreError::from)
    }
}

/// Raw column values for one `oauth_tokens` row.
struct StoredRow {
    /// Access credential.
    access_token: String,
    /// Refresh credential.
    refresh_token: Option<String>,
    /// Expiry (unix ms).
    expires_at_ms: Option<i64>,
    /// Granted scope.
    scope: Option<String>,
    /// Metadata JSON text.
    metadata: String,
    /// Raw payload JSON text.
    raw: Option<String>,
    /// Creation timestamp.
    created_at_ms: i64,
    /// Update timestamp.
    updated_at_ms: i64,
}

impl StoredRow {
    /// Decodes JSON columns into a [`TokenRecord`].
    fn into_record(self, provider: &str, subject: &str) -> Result<TokenRecord, SqliteStoreError> {
        let metadata: Value = serde_json::from_str(&self.metadata)
            .map_err(|err| SqliteStoreError::Invalid(format!("token metadata: {err}")))?;
        let raw = self
            .raw
            .as_deref()
            .map(serde_json::from_str::<Value>)
            .transpose()
            .map_err(|err| SqliteStoreError::Invalid(format!("token raw payload: {err}")))?;
        Ok(TokenRecord {
            provider: provider.to_string(),
            subject: subject.to_string(),
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at_ms: self.expires_at_ms,
            scope: self.scope,
            metadata,
            raw,
            created_at_ms: self.created_at_ms,
            updated_at_ms: self.updated_at_ms,
        })
    }
}
