// crates/mcp-hub-store-sqlite/src/usage.rs
// ============================================================================
// Module: SQLite Usage Recorder
// Description: UsageRecorder backed by the append-only `tool_usage` table.
// Purpose: Persist per-call outcomes and aggregate them with SQL.
// Dependencies: mcp-hub-core, rusqlite
// ============================================================================

//! `UsageRecorder` backed by the append-only `tool_usage` table.

use std::sync::Arc;

use mcp_hub_core::StoreError;
use mcp_hub_core::UsageRecord;
use mcp_hub_core::UsageRecorder;
use mcp_hub_core::UsageStats;
use rusqlite::params;

use crate::pool::SqlitePool;
use crate::pool::db_err;

/// SQLite-backed usage log.
#[derive(Debug, Clone)]
pub struct SqliteUsageRecorder {
    /// Shared connection pool.
    pool: Arc<SqlitePool>,
}

impl SqliteUsageRecorder {
    /// Creates a usage recorder over the shared pool.
    #[must_use]
    pub const fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            pool,
        }
    }
}

impl UsageRecorder for SqliteUsageRecorder {
    fn record(&self, record: UsageRecord) -> Result<(), StoreError> {
        let latency_ms = i64::try_from(record.latency_ms).unwrap_or(i64::MAX);
        self.pool.with_connection(|connection| {
            connection
                .execute(
                    "INSERT INTO tool_usage (
                        provider, tool_name, subject, success, latency_ms, error_message, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        record.provider,
                        record.tool_name,
                        record.subject,
                        record.success,
                        latency_ms,
                        record.error_message,
                        record.created_at_ms,
                    ],
                )
                .map_err(|err| db_err(&err))
        })?;
        Ok(())
    }

    fn stats(&self) -> Result<UsageStats, StoreError> {
        let groups = self.pool.with_connection(|connection| {
            let mut statement = connection
                .prepare(
                    "SELECT provider, tool_name, success, COUNT(*)
                     FROM tool_usage GROUP BY provider, tool_name, success",
                )
                .map_err(|err| db_err(&err))?;
            let rows = statement
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, bool>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                })
                .map_err(|err| db_err(&err))?;
            rows.collect::<Result<Vec<_>, _>>().map_err(|err| db_err(&err))
        })?;
        let mut stats = UsageStats::default();
        for (provider, tool_name, success, count) in groups {
            stats.add_counts(&provider, &tool_name, success, u64::try_from(count).unwrap_or(0));
        }
        Ok(stats)
    }
}
