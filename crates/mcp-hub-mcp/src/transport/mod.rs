// crates/mcp-hub-mcp/src/transport/mod.rs
// ============================================================================
// Module: HTTP Transport Adapters
// Description: Streaming (session-header) and push-stream (SSE) adapters.
// Purpose: Bind HTTP requests to sessions before JSON-RPC handling.
// Dependencies: axum, http-body-util
// ============================================================================

//! ## Overview
//! Both adapters read the body under the configured size limit, resolve the
//! addressed session, and pass parsed messages to the JSON-RPC handler.
//! Rejections are audited and rendered through [`TransportError`].

pub mod sse;
pub mod streamable;

use std::time::Instant;

use axum::body::Body;
use axum::body::Bytes;
use axum::response::IntoResponse;
use axum::response::Response;
use http_body_util::LengthLimitError;

use crate::audit::HubRejectEvent;
use crate::audit::HubRequestEvent;
use crate::error::TransportError;
use crate::jsonrpc::MessageReport;
use crate::server::HubState;
use crate::sessions::Session;

/// Reads a request body, enforcing the size limit.
///
/// # Errors
///
/// Returns [`TransportError::PayloadTooLarge`] over the limit and
/// [`TransportError::InvalidRequest`] when the body cannot be read.
pub(crate) async fn read_body(body: Body, limit: usize) -> Result<Bytes, TransportError> {
    axum::body::to_bytes(body, limit).await.map_err(|err| {
        let source = err.into_inner();
        if source.downcast_ref::<LengthLimitError>().is_some() {
            TransportError::PayloadTooLarge
        } else {
            TransportError::InvalidRequest("failed to read request body".to_string())
        }
    })
}

/// Audits a rejection and renders it.
pub(crate) fn reject(state: &HubState, path: &str, err: TransportError) -> Response {
    state.audit.record_reject(&HubRejectEvent::new(path, err.kind()));
    err.into_response()
}

/// Audits one handled message.
pub(crate) fn audit_message(
    state: &HubState,
    session: &Session,
    report: MessageReport,
    request_bytes: usize,
    started: Instant,
) {
    let mut event = HubRequestEvent::new(session.transport(), Some(session.id().to_string()));
    event.method = Some(report.method);
    event.tool = report.tool;
    event.outcome = report.outcome;
    event.error_code = report.error_code;
    event.latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    event.request_bytes = request_bytes;
    state.audit.record_request(&event);
}
