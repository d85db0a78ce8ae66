// crates/mcp-hub-mcp/src/transport/streamable.rs
// ============================================================================
// Module: Streaming Transport Adapter
// Description: Session-header request/response transport on the MCP path.
// Purpose: Create sessions on initialize and route later messages by header.
// Dependencies: axum, serde_json, tokio-stream
// ============================================================================

//! ## Overview
//! `POST` carries one JSON-RPC message. Without an `mcp-session-id` header
//! only `initialize` is accepted, and it creates the session whose id is
//! returned in the same header. The session is resolved before the body is
//! checked as JSON-RPC, so a missing or unknown id is reported for any
//! payload. `GET` drains server-initiated messages as a
//! finite event stream. `DELETE` ends the session.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::response::sse::Event;
use axum::response::sse::Sse;
use serde_json::Value;

use super::audit_message;
use super::read_body;
use super::reject;
use crate::audit::HubSessionEvent;
use crate::audit::SessionAction;
use crate::error::TransportError;
use crate::jsonrpc::handle_request;
use crate::jsonrpc::parse_request;
use crate::server::HubState;
use crate::sessions::TransportKind;

/// Session header name.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Extracts the session id header.
fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers.get(SESSION_HEADER).and_then(|value| value.to_str().ok()).filter(|id| !id.is_empty())
}

/// Reads only the `method` member, so session checks precede body validation.
fn is_initialize(bytes: &[u8]) -> bool {
    serde_json::from_slice::<Value>(bytes)
        .ok()
        .is_some_and(|value| value.get("method").and_then(Value::as_str) == Some("initialize"))
}

/// Handles `POST <mcp-path>`.
pub async fn handle_post(
    State(state): State<Arc<HubState>>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let started = Instant::now();
    let path = state.paths.mcp.as_str();
    let bytes = match read_body(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(err) => return reject(&state, path, err),
    };
    let resolved = state.sessions.create_or_resolve(session_id(&headers), is_initialize(&bytes));
    let (session, created) = match resolved {
        Ok(resolved) => resolved,
        Err(err) => return reject(&state, path, err),
    };
    let request = match parse_request(&bytes) {
        Ok(request) => request,
        Err(err) => {
            if created {
                state.sessions.remove(session.id());
            }
            return reject(&state, path, err);
        }
    };
    if created {
        state.audit.record_session(&HubSessionEvent::new(
            session.id(),
            TransportKind::Streaming,
            SessionAction::Opened,
            "initialize",
        ));
    }

    let (reply, report) = {
        let _turn = session.turn().await;
        handle_request(&state.dispatcher, &session, request).await
    };
    audit_message(&state, &session, report, bytes.len(), started);

    let mut response = match reply {
        Some(reply) => (StatusCode::OK, Json(reply)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    };
    if let Ok(value) = HeaderValue::from_str(session.id()) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}

/// Handles `GET <mcp-path>`: drains queued server-initiated messages.
pub async fn handle_get(State(state): State<Arc<HubState>>, headers: HeaderMap) -> Response {
    let path = state.paths.mcp.as_str();
    let Some(id) = session_id(&headers) else {
        return reject(&state, path, TransportError::MissingSessionId);
    };
    let Some(session) = state.sessions.lookup(id) else {
        return reject(&state, path, TransportError::SessionNotFound);
    };
    let events: Vec<Result<Event, Infallible>> = session
        .drain()
        .into_iter()
        .map(|message| Ok(Event::default().event("message").data(message.to_string())))
        .collect();
    Sse::new(tokio_stream::iter(events)).into_response()
}

/// Handles `DELETE <mcp-path>`: ends the session.
pub async fn handle_delete(State(state): State<Arc<HubState>>, headers: HeaderMap) -> Response {
    let path = state.paths.mcp.as_str();
    let Some(id) = session_id(&headers) else {
        return reject(&state, path, TransportError::MissingSessionId);
    };
    let Some(session) = state.sessions.remove(id) else {
        return reject(&state, path, TransportError::SessionNotFound);
    };
    state.audit.record_session(&HubSessionEvent::new(
        session.id(),
        session.transport(),
        SessionAction::Closed,
        "deleted",
    ));
    StatusCode::OK.into_response()
}
