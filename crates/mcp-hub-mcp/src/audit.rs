// crates/mcp-hub-mcp/src/audit.rs
// ============================================================================
// Module: Hub Audit Logging
// Description: Structured audit events for request, session, and rejection.
// Purpose: Emit JSON-line audit records without a logging framework.
// Dependencies: serde, serde_json, mcp-hub-config
// ============================================================================

//! ## Overview
//! Four event kinds are emitted: `hub_request` (one per JSON-RPC message),
//! `hub_session` (open/close), `hub_transport_reject` (rejections before
//! dispatch), and `hub_usage_error` (a usage record that could not be
//! appended). Sinks write one JSON object per line. Tool arguments and
//! credentials are never logged.

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use mcp_hub_config::AuditConfig;
use mcp_hub_core::time::unix_millis;
use serde::Serialize;

use crate::sessions::TransportKind;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Request outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    /// Successful request.
    Ok,
    /// JSON-RPC error returned.
    Error,
    /// Tool ran and reported a failure (`isError`).
    ToolError,
    /// Notification accepted without a reply.
    Accepted,
}

/// `hub_request` event payload.
#[derive(Debug, Clone, Serialize)]
pub struct HubRequestEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (unix milliseconds).
    pub timestamp_ms: i64,
    /// Transport that carried the message.
    pub transport: TransportKind,
    /// Session the message belongs to.
    pub session_id: Option<String>,
    /// JSON-RPC method when parsed.
    pub method: Option<String>,
    /// Tool name for `tools/call`.
    pub tool: Option<String>,
    /// Request outcome.
    pub outcome: RequestOutcome,
    /// JSON-RPC error code when present.
    pub error_code: Option<i64>,
    /// Handling latency in milliseconds.
    pub latency_ms: u64,
    /// Request body size in bytes.
    pub request_bytes: usize,
}

impl HubRequestEvent {
    /// Creates a request event stamped with the current time.
    #[must_use]
    pub fn new(transport: TransportKind, session_id: Option<String>) -> Self {
        Self {
            event: "hub_request",
            timestamp_ms: unix_millis(),
            transport,
            session_id,
            method: None,
            tool: None,
            outcome: RequestOutcome::Ok,
            error_code: None,
            latency_ms: 0,
            request_bytes: 0,
        }
    }
}

/// Session lifecycle action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionAction {
    /// Session registered.
    Opened,
    /// Session removed.
    Closed,
}

/// `hub_session` event payload.
#[derive(Debug, Clone, Serialize)]
pub struct HubSessionEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (unix milliseconds).
    pub timestamp_ms: i64,
    /// Session identifier.
    pub session_id: String,
    /// Transport kind.
    pub transport: TransportKind,
    /// Lifecycle action.
    pub action: SessionAction,
    /// Why the session opened or closed.
    pub reason: &'static str,
}

impl HubSessionEvent {
    /// Creates a session event stamped with the current time.
    #[must_use]
    pub fn new(
        session_id: &str,
        transport: TransportKind,
        action: SessionAction,
        reason: &'static str,
    ) -> Self {
        Self {
            event: "hub_session",
            timestamp_ms: unix_millis(),
            session_id: session_id.to_string(),
            transport,
            action,
            reason,
        }
    }
}

/// `hub_transport_reject` event payload.
#[derive(Debug, Clone, Serialize)]
pub struct HubRejectEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (unix milliseconds).
    pub timestamp_ms: i64,
    /// Request path.
    pub path: String,
    /// Rejection kind label.
    pub kind: &'static str,
}

impl HubRejectEvent {
    /// Creates a rejection event stamped with the current time.
    #[must_use]
    pub fn new(path: &str, kind: &'static str) -> Self {
        Self {
            event: "hub_transport_reject",
            timestamp_ms: unix_millis(),
            path: path.to_string(),
            kind,
        }
    }
}

/// `hub_usage_error` event payload.
#[derive(Debug, Clone, Serialize)]
pub struct HubUsageErrorEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (unix milliseconds).
    pub timestamp_ms: i64,
    /// Provider that owns the tool.
    pub provider: String,
    /// Tool whose record was lost.
    pub tool: String,
    /// Store failure message.
    pub error: String,
}

impl HubUsageErrorEvent {
    /// Creates a usage error event stamped with the current time.
    #[must_use]
    pub fn new(provider: &str, tool: &str, error: &str) -> Self {
        Self {
            event: "hub_usage_error",
            timestamp_ms: unix_millis(),
            provider: provider.to_string(),
            tool: tool.to_string(),
            error: error.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for hub events.
pub trait HubAuditSink: Send + Sync {
    /// Records a request event.
    fn record_request(&self, event: &HubRequestEvent);

    /// Records a session lifecycle event.
    fn record_session(&self, _event: &HubSessionEvent) {}

    /// Records a transport rejection.
    fn record_reject(&self, _event: &HubRejectEvent) {}

    /// Records a usage record that the usage log refused.
    fn record_usage_error(&self, _event: &HubUsageErrorEvent) {}
}

/// Serializes an event to one JSON line.
fn to_line(event: &impl Serialize) -> Option<String> {
    serde_json::to_string(event).ok()
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl StderrAuditSink {
    /// Writes one line to stderr.
    fn emit(line: Option<String>) {
        if let Some(line) = line {
            let _ = writeln!(io::stderr(), "{line}");
        }
    }
}

impl HubAuditSink for StderrAuditSink {
    fn record_request(&self, event: &HubRequestEvent) {
        Self::emit(to_line(event));
    }

    fn record_session(&self, event: &HubSessionEvent) {
        Self::emit(to_line(event));
    }

    fn record_reject(&self, event: &HubRejectEvent) {
        Self::emit(to_line(event));
    }

    fn record_usage_error(&self, event: &HubUsageErrorEvent) {
        Self::emit(to_line(event));
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one line.
    fn emit(&self, line: Option<String>) {
        if let Some(line) = line
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{line}");
            let _ = file.flush();
        }
    }
}

impl HubAuditSink for FileAuditSink {
    fn record_request(&self, event: &HubRequestEvent) {
        self.emit(to_line(event));
    }

    fn record_session(&self, event: &HubSessionEvent) {
        self.emit(to_line(event));
    }

    fn record_reject(&self, event: &HubRejectEvent) {
        self.emit(to_line(event));
    }

    fn record_usage_error(&self, event: &HubUsageErrorEvent) {
        self.emit(to_line(event));
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl HubAuditSink for NoopAuditSink {
    fn record_request(&self, _event: &HubRequestEvent) {}
}

/// Builds the sink selected by configuration.
///
/// # Errors
///
/// Returns an error when the audit file cannot be opened.
pub fn audit_sink_from_config(config: &AuditConfig) -> io::Result<Arc<dyn HubAuditSink>> {
    if !config.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &config.path {
        Some(path) => Ok(Arc::new(FileAuditSink::new(Path::new(path))?)),
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
