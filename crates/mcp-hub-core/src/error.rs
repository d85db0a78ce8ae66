// crates/mcp-hub-core/src/error.rs
// ============================================================================
// Module: Hub Error Taxonomy
// Description: Invocation-scoped and storage errors shared across the hub.
// Purpose: Separate dispatch rejections, handler failures, and store faults.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`ToolError`] covers everything that can go wrong while a single tool
//! invocation is dispatched. None of its variants are fatal to a session or
//! to the process; transports translate them into caller-visible envelopes.
//! Transport-level failures (missing or unknown sessions, shared-secret
//! rejections) are not represented here and never reach the dispatcher.

use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Errors raised by token and usage store backends.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Filesystem or connection I/O failure.
    #[error("store io error: {0}")]
    Io(String),
    /// Database engine failure.
    #[error("store db error: {0}")]
    Db(String),
    /// Stored or supplied data is invalid.
    #[error("store invalid data: {0}")]
    Invalid(String),
    /// A lock guarding in-process state was poisoned.
    #[error("store lock poisoned: {0}")]
    Poisoned(String),
}

// ============================================================================
// SECTION: Tool Errors
// ============================================================================

/// Invocation-scoped errors for tool dispatch and tool handlers.
///
/// # Invariants
/// - `UnknownTool` and `InvalidArguments` are raised before any handler runs.
/// - Upstream variants carry the upstream payload unchanged.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    /// No tool is registered under the requested name.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    /// Arguments failed schema validation.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    /// No usable credential is available for the provider.
    #[error("{0}")]
    Credentials(String),
    /// Upstream rejected the credential.
    #[error("{message} (status {status}): {payload}")]
    UpstreamAuth {
        /// Operation label.
        message: String,
        /// Upstream HTTP status.
        status: u16,
        /// Upstream response payload.
        payload: Value,
    },
    /// Upstream returned a non-success or malformed response.
    #[error("{message}: {payload}")]
    Upstream {
        /// Operation label.
        message: String,
        /// Upstream HTTP status when a response was received.
        status: Option<u16>,
        /// Upstream response payload (or a transport description).
        payload: Value,
    },
    /// The refresh exchange itself was rejected.
    #[error("refresh failed: {0}")]
    RefreshFailed(String),
    /// Token or usage store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Internal handler failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Returns true for errors raised before a handler was invoked.
    #[must_use]
    pub const fn is_dispatch_rejection(&self) -> bool {
        matches!(self, Self::UnknownTool(_) | Self::InvalidArguments(_))
    }

    /// Returns a stable label for audit events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownTool(_) => "unknown_tool",
            Self::InvalidArguments(_) => "invalid_arguments",
            Self::Credentials(_) => "credentials",
            Self::UpstreamAuth {
                ..
            } => "upstream_auth",
            Self::Upstream {
                ..
            } => "upstream",
            Self::RefreshFailed(_) => "refresh_failed",
            Self::Store(_) => "store",
            Self::Internal(_) => "internal",
        }
    }
}
