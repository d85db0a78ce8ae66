// crates/mcp-hub-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Hub Stores
// Description: Durable TokenStore and UsageRecorder backends using SQLite.
// Purpose: Persist credentials and usage across restarts.
// Dependencies: mcp-hub-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides SQLite-backed implementations of the hub's
//! [`mcp_hub_core::TokenStore`] and [`mcp_hub_core::UsageRecorder`]
//! contracts. Both share one small, fixed-size connection pool and create
//! their tables lazily on first use. Observable semantics match the
//! in-memory backends in `mcp-hub-core`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod pool;
pub mod token;
pub mod usage;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use pool::SqlitePool;
pub use pool::SqliteStoreConfig;
pub use pool::SqliteStoreError;
pub use pool::SqliteStoreMode;
pub use token::SqliteTokenStore;
pub use usage::SqliteUsageRecorder;

/// Opens the pool and returns both stores sharing it.
///
/// # Errors
///
/// Returns [`SqliteStoreError`] when the database cannot be opened.
pub fn open_stores(
    config: &SqliteStoreConfig,
) -> Result<(SqliteTokenStore, SqliteUsageRecorder), SqliteStoreError> {
    let pool = std::sync::Arc::new(SqlitePool::open(config)?);
    Ok((SqliteTokenStore::new(pool.clone()), SqliteUsageRecorder::new(pool)))
}
