// crates/mcp-hub-core/src/usage.rs
// ============================================================================
// Module: Usage Recorder
// Description: Append-only log of tool invocation outcomes.
// Purpose: Record per-call latency and outcome, and aggregate them on read.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The dispatcher appends exactly one [`UsageRecord`] per handler invocation.
//! Credential refresh retries happen inside the handler and are invisible
//! here. [`UsageStats`] aggregates by provider and by `provider:tool`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use serde::Deserialize;
use serde::Serialize;

use crate::error::StoreError;

// ============================================================================
// SECTION: Records
// ============================================================================

/// Outcome of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Provider that owns the tool.
    pub provider: String,
    /// Fully-qualified tool name.
    pub tool_name: String,
    /// Subject the call acted on, when supplied.
    pub subject: Option<String>,
    /// Whether the handler succeeded.
    pub success: bool,
    /// Handler latency in milliseconds.
    pub latency_ms: u64,
    /// Failure message for unsuccessful calls.
    pub error_message: Option<String>,
    /// Record timestamp (unix milliseconds).
    pub created_at_ms: i64,
}

/// Aggregate view over the usage log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    /// Total records.
    pub total: u64,
    /// Successful invocations.
    pub successes: u64,
    /// Failed invocations.
    pub failures: u64,
    /// Counts keyed by provider.
    pub by_provider: BTreeMap<String, u64>,
    /// Counts keyed by `provider:tool`.
    pub by_tool: BTreeMap<String, u64>,
}

impl UsageStats {
    /// Folds one record into the aggregate.
    pub fn add(&mut self, record: &UsageRecord) {
        self.add_counts(&record.provider, &record.tool_name, record.success, 1);
    }

    /// Folds a pre-aggregated group into the aggregate.
    pub fn add_counts(&mut self, provider: &str, tool_name: &str, success: bool, count: u64) {
        self.total += count;
        if success {
            self.successes += count;
        } else {
            self.failures += count;
        }
        *self.by_provider.entry(provider.to_string()).or_default() += count;
        *self.by_tool.entry(format!("{provider}:{tool_name}")).or_default() += count;
    }
}

// ============================================================================
// SECTION: Recorder Contract
// ============================================================================

/// Append-only usage log.
pub trait UsageRecorder: Send + Sync {
    /// Appends a record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn record(&self, record: UsageRecord) -> Result<(), StoreError>;

    /// Aggregates every record appended so far.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn stats(&self) -> Result<UsageStats, StoreError>;
}

// ============================================================================
// SECTION: In-Memory Backend
// ============================================================================

/// Process-local usage log.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUsageRecorder {
    /// Appended records in arrival order.
    records: Arc<Mutex<Vec<UsageRecord>>>,
}

impl InMemoryUsageRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when the log mutex is poisoned.
    pub fn records(&self) -> Result<Vec<UsageRecord>, StoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Poisoned("usage log mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }
}

impl UsageRecorder for InMemoryUsageRecorder {
    fn record(&self, record: UsageRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Poisoned("usage log mutex poisoned".to_string()))?
            .push(record);
        Ok(())
    }

    fn stats(&self) -> Result<UsageStats, StoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Poisoned("usage log mutex poisoned".to_string()))?;
        let mut stats = UsageStats::default();
        for record in guard.iter() {
            stats.add(record);
        }
        drop(guard);
        Ok(stats)
    }
}

// ============================================================================
// SECTION: Shared Recorder Wrapper
// ============================================================================

/// Shared usage recorder backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedUsageRecorder {
    /// Inner recorder implementation.
    inner: Arc<dyn UsageRecorder>,
}

impl SharedUsageRecorder {
    /// Wraps a recorder in a shared, clonable wrapper.
    #[must_use]
    pub fn from_recorder(recorder: impl UsageRecorder + 'static) -> Self {
        Self {
            inner: Arc::new(recorder),
        }
    }

    /// Wraps an existing shared recorder.
    #[must_use]
    pub const fn new(recorder: Arc<dyn UsageRecorder>) -> Self {
        Self {
            inner: recorder,
        }
    }
}

impl UsageRecorder for SharedUsageRecorder {
    fn record(&self, record: UsageRecord) -> Result<(), StoreError> {
        self.inner.record(record)
    }

    fn stats(&self) -> Result<UsageStats, StoreError> {
        self.inner.stats()
    }
}

impl std::fmt::Debug for SharedUsageRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedUsageRecorder").finish_non_exhaustive()
    }
}
