// crates/mcp-hub-core/src/token.rs
// ============================================================================
// Module: Token Store
// Description: Per-(provider, subject) credential records and their store.
// Purpose: Define the upsert/get contract plus the in-memory backend.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`TokenRecord`] is keyed by `(provider, subject)`. Writes are idempotent
//! upserts: every field of the prior record is overwritten except its creation
//! timestamp. Records are never deleted automatically.
//!
//! # Invariants
//! - At most one record per `(provider, subject)`.
//! - `created_at_ms` is assigned by the store on first write and never changes.
//! - `updated_at_ms` is assigned by the store on every write.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;
use crate::time::unix_millis;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Subject used when the caller is single-tenant.
pub const DEFAULT_SUBJECT: &str = "default";

// ============================================================================
// SECTION: Token Record
// ============================================================================

/// Stored credential for one provider and subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Provider name.
    pub provider: String,
    /// Subject (workspace, user, or [`DEFAULT_SUBJECT`]).
    pub subject: String,
    /// Access credential.
    pub access_token: String,
    /// Refresh credential, when the provider issued one.
    pub refresh_token: Option<String>,
    /// Expiry as unix milliseconds.
    pub expires_at_ms: Option<i64>,
    /// Granted scope.
    pub scope: Option<String>,
    /// Provider-specific metadata (workspace name, bot id, ...).
    pub metadata: Value,
    /// Raw upstream payload retained for audit.
    pub raw: Option<Value>,
    /// First-write timestamp (unix milliseconds, store-assigned).
    pub created_at_ms: i64,
    /// Last-write timestamp (unix milliseconds, store-assigned).
    pub updated_at_ms: i64,
}

impl TokenRecord {
    /// Creates a record with only the access credential set.
    #[must_use]
    pub fn new(
        provider: impl Into<String>,
        subject: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            subject: subject.into(),
            access_token: access_token.into(),
            refresh_token: None,
            expires_at_ms: None,
            scope: None,
            metadata: Value::Object(serde_json::Map::new()),
            raw: None,
            created_at_ms: 0,
            updated_at_ms: 0,
        }
    }

    /// Sets the refresh credential.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }
}

// ============================================================================
// SECTION: Store Contract
// ============================================================================

/// Durable key-value store of credential records.
pub trait TokenStore: Send + Sync {
    /// Inserts or overwrites the record for `(provider, subject)`.
    ///
    /// Returns the stored record with store-assigned timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn upsert_token(&self, record: TokenRecord) -> Result<TokenRecord, StoreError>;

    /// Loads the record for `(provider, subject)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn get_token(&self, provider: &str, subject: &str) -> Result<Option<TokenRecord>, StoreError>;
}

// ============================================================================
// SECTION: In-Memory Backend
// ============================================================================

/// Process-local token store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTokenStore {
    /// Records keyed by `(provider, subject)`.
    records: Arc<Mutex<BTreeMap<(String, String), TokenRecord>>>,
}

impl InMemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn upsert_token(&self, mut record: TokenRecord) -> Result<TokenRecord, StoreError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Poisoned("token store mutex poisoned".to_string()))?;
        let key = (record.provider.clone(), record.subject.clone());
        let now = unix_millis();
        record.created_at_ms = guard.get(&key).map_or(now, |prior| prior.created_at_ms);
        record.updated_at_ms = now;
        guard.insert(key, record.clone());
        drop(guard);
        Ok(record)
    }

    fn get_token(&self, provider: &str, subject: &str) -> Result<Option<TokenRecord>, StoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Poisoned("token store mutex poisoned".to_string()))?;
        Ok(guard.get(&(provider.to_string(), subject.to_string())).cloned())
    }
}

// ============================================================================
// SECTION: Shared Store Wrapper
// ============================================================================

/// Shared token store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedTokenStore {
    /// Inner store implementation.
    inner: Arc<dyn TokenStore>,
}

impl SharedTokenStore {
    /// Wraps a token store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl TokenStore + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl TokenStore for SharedTokenStore {
    fn upsert_token(&self, record: TokenRecord) -> Result<TokenRecord, StoreError> {
        self.inner.upsert_token(record)
    }

    fn get_token(&self, provider: &str, subject: &str) -> Result<Option<TokenRecord>, StoreError> {
        self.inner.get_token(provider, subject)
    }
}

impl std::fmt::Debug for SharedTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedTokenStore").finish_non_exhaustive()
    }
}
