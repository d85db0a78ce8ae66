// crates/mcp-hub-mcp/src/error.rs
// ============================================================================
// Module: Hub Errors
// Description: Transport rejections and server lifecycle errors.
// Purpose: Map adapter-level failures to fixed HTTP responses.
// Dependencies: axum, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`TransportError`] covers everything an adapter rejects before a message
//! reaches the dispatcher. Each variant has a fixed status and body shape;
//! unknown sessions answer in plain text.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// SECTION: Transport Errors
// ============================================================================

/// JSON-RPC code for session errors on the streaming transport.
pub const SESSION_ERROR_CODE: i64 = -32000;
/// JSON-RPC code for oversized request bodies.
pub const PAYLOAD_TOO_LARGE_CODE: i64 = -32070;
/// JSON-RPC code for malformed requests.
pub const INVALID_REQUEST_CODE: i64 = -32600;

/// Rejection raised by a transport adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Non-initialize message without a session id.
    #[error("Bad Request: No valid session ID provided")]
    MissingSessionId,
    /// Streaming session id not registered.
    #[error("Invalid or missing session ID")]
    SessionNotFound,
    /// Push-stream session id not registered.
    #[error("No transport found for sessionId")]
    NoTransportForSession,
    /// Shared secret absent or wrong.
    #[error("Unauthorized")]
    Unauthorized,
    /// Request body over the configured limit.
    #[error("request body too large")]
    PayloadTooLarge,
    /// Body unreadable or not a JSON-RPC message.
    #[error("{0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Stable label for audit events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingSessionId => "missing_session_id",
            Self::SessionNotFound => "session_not_found",
            Self::NoTransportForSession => "no_transport_for_session",
            Self::Unauthorized => "unauthorized",
            Self::PayloadTooLarge => "payload_too_large",
            Self::InvalidRequest(_) => "invalid_request",
        }
    }

    /// HTTP status for the rejection.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::MissingSessionId
            | Self::SessionNotFound
            | Self::NoTransportForSession
            | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Builds a JSON-RPC error envelope with a null id.
fn jsonrpc_envelope(code: i64, message: &str) -> serde_json::Value {
    json!({
        "jsonrpc": "2.0",
        "id": null,
        "error": { "code": code, "message": message },
    })
}

impl IntoResponse for TransportError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        match self {
            Self::MissingSessionId => {
                (status, Json(jsonrpc_envelope(SESSION_ERROR_CODE, &message))).into_response()
            }
            Self::PayloadTooLarge => {
                (status, Json(jsonrpc_envelope(PAYLOAD_TOO_LARGE_CODE, &message))).into_response()
            }
            Self::InvalidRequest(_) => {
                (status, Json(jsonrpc_envelope(INVALID_REQUEST_CODE, &message))).into_response()
            }
            Self::Unauthorized => (status, Json(json!({ "error": message }))).into_response(),
            Self::SessionNotFound | Self::NoTransportForSession => {
                (status, message).into_response()
            }
        }
    }
}

// ============================================================================
// SECTION: Server Errors
// ============================================================================

/// Hub construction and serving errors.
#[derive(Debug, Error)]
pub enum McpServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}
