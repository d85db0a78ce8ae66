// crates/mcp-hub-mcp/src/jsonrpc.rs
// ============================================================================
// Module: JSON-RPC Session Protocol
// Description: MCP method handling shared by both transports.
// Purpose: Turn one inbound message into at most one reply.
// Dependencies: mcp-hub-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Both transports parse the body with [`parse_request`] and hand the result
//! to [`handle_request`], which answers the MCP method set against the shared
//! [`Dispatcher`]. Messages without an id are notifications and never get a
//! reply. Tool failures are reported in-band as `isError` results; only
//! dispatch-level rejections become JSON-RPC errors.

use mcp_hub_core::ToolError;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::audit::RequestOutcome;
use crate::dispatch::Dispatcher;
use crate::dispatch::ToolDefinition;
use crate::error::TransportError;
use crate::sessions::LogLevel;
use crate::sessions::Session;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Protocol version answered when the client does not name one.
pub const PROTOCOL_VERSION: &str = "2025-03-26";
/// Server name reported by `initialize`.
pub const SERVER_NAME: &str = "mcp-hub";
/// JSON-RPC code for unknown methods.
pub const METHOD_NOT_FOUND_CODE: i64 = -32601;
/// JSON-RPC code for rejected parameters.
pub const INVALID_PARAMS_CODE: i64 = -32602;
/// JSON-RPC code for internal failures.
pub const INTERNAL_ERROR_CODE: i64 = -32603;

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// JSON-RPC request or notification.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC protocol version.
    pub jsonrpc: String,
    /// Request identifier; absent for notifications. An explicit `null` is
    /// kept as `Some(Value::Null)` and still gets a reply.
    #[serde(default, deserialize_with = "present_value")]
    pub id: Option<Value>,
    /// Method name.
    pub method: String,
    /// Optional parameters payload.
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Returns true for messages that expect no reply.
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Maps a present member, including `null`, to `Some`.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Parsed client message together with its wire size.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Parsed request.
    pub request: JsonRpcRequest,
    /// Body size in bytes.
    pub bytes: usize,
}

/// JSON-RPC response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC protocol version.
    pub jsonrpc: &'static str,
    /// Request identifier.
    pub id: Value,
    /// Successful result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error payload when the request fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Builds a success response.
    #[must_use]
    pub const fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Builds an error response.
    #[must_use]
    pub fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }

    /// Renders the response as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// JSON-RPC error payload.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,
    /// Human-readable error message.
    pub message: String,
}

/// Tool call parameters.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    /// Tool name.
    name: String,
    /// Raw JSON arguments.
    #[serde(default)]
    arguments: Option<Value>,
}

/// `logging/setLevel` parameters.
#[derive(Debug, Deserialize)]
struct SetLevelParams {
    /// Requested minimum level.
    level: String,
}

/// Tool list response payload.
#[derive(Debug, Serialize)]
struct ToolListResult {
    /// Registered tool definitions.
    tools: Vec<ToolDefinition>,
}

/// What happened to one message, for the audit log.
#[derive(Debug, Clone)]
pub struct MessageReport {
    /// JSON-RPC method.
    pub method: String,
    /// Tool name for `tools/call`.
    pub tool: Option<String>,
    /// Outcome classification.
    pub outcome: RequestOutcome,
    /// JSON-RPC error code when one was returned.
    pub error_code: Option<i64>,
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses a request body into a JSON-RPC message.
///
/// # Errors
///
/// Returns [`TransportError::InvalidRequest`] when the body is not a single
/// JSON-RPC 2.0 message.
pub fn parse_request(bytes: &[u8]) -> Result<JsonRpcRequest, TransportError> {
    let request: JsonRpcRequest = serde_json::from_slice(bytes)
        .map_err(|_| TransportError::InvalidRequest("invalid json-rpc request".to_string()))?;
    if request.jsonrpc != "2.0" {
        return Err(TransportError::InvalidRequest("invalid json-rpc version".to_string()));
    }
    Ok(request)
}

// ============================================================================
// SECTION: Handling
// ============================================================================

/// Handles one message within a session.
///
/// Returns the reply (none for notifications) and an audit report.
pub async fn handle_request(
    dispatcher: &Dispatcher,
    session: &Session,
    request: JsonRpcRequest,
) -> (Option<JsonRpcResponse>, MessageReport) {
    let mut report = MessageReport {
        method: request.method.clone(),
        tool: None,
        outcome: RequestOutcome::Ok,
        error_code: None,
    };
    let Some(id) = request.id else {
        report.outcome = RequestOutcome::Accepted;
        return (None, report);
    };
    let params = request.params.unwrap_or(Value::Null);

    let response = match request.method.as_str() {
        "initialize" => JsonRpcResponse::success(id, initialize_result(&params)),
        "ping" => JsonRpcResponse::success(id, json!({})),
        "tools/list" => match serde_json::to_value(ToolListResult {
            tools: dispatcher.registry().definitions(),
        }) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(_) => JsonRpcResponse::failure(id, INTERNAL_ERROR_CODE, "serialization failed"),
        },
        "tools/call" => match serde_json::from_value::<ToolCallParams>(params) {
            Ok(call) => {
                report.tool = Some(call.name.clone());
                call_tool(dispatcher, session, id, call, &mut report).await
            }
            Err(_) => JsonRpcResponse::failure(id, INVALID_PARAMS_CODE, "invalid tool params"),
        },
        "logging/setLevel" => {
            let level = serde_json::from_value::<SetLevelParams>(params)
                .ok()
                .and_then(|params| LogLevel::parse(&params.level));
            match level {
                Some(level) => {
                    session.set_log_level(level);
                    JsonRpcResponse::success(id, json!({}))
                }
                None => JsonRpcResponse::failure(id, INVALID_PARAMS_CODE, "invalid log level"),
            }
        }
        _ => JsonRpcResponse::failure(id, METHOD_NOT_FOUND_CODE, "method not found"),
    };

    if let Some(error) = &response.error {
        report.outcome = RequestOutcome::Error;
        report.error_code = Some(error.code);
    }
    (Some(response), report)
}

/// Builds the `initialize` result, echoing the client's protocol version.
fn initialize_result(params: &Value) -> Value {
    let version =
        params.get("protocolVersion").and_then(Value::as_str).unwrap_or(PROTOCOL_VERSION);
    json!({
        "protocolVersion": version,
        "capabilities": {
            "tools": { "listChanged": false },
            "logging": {},
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

/// Runs `tools/call` through the dispatcher.
async fn call_tool(
    dispatcher: &Dispatcher,
    session: &Session,
    id: Value,
    call: ToolCallParams,
    report: &mut MessageReport,
) -> JsonRpcResponse {
    let arguments = call.arguments.unwrap_or_else(|| json!({}));
    match dispatcher.invoke(&call.name, arguments).await {
        Ok(output) => match serde_json::to_value(&output) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(_) => JsonRpcResponse::failure(id, INTERNAL_ERROR_CODE, "serialization failed"),
        },
        Err(err) if err.is_dispatch_rejection() => {
            JsonRpcResponse::failure(id, INVALID_PARAMS_CODE, err.to_string())
        }
        Err(err) => {
            report.outcome = RequestOutcome::ToolError;
            notify_tool_failure(session, &call.name, &err);
            let result = json!({
                "content": [{ "type": "text", "text": err.to_string() }],
                "isError": true,
            });
            JsonRpcResponse::success(id, result)
        }
    }
}

/// Queues an error-level log notification when the session asked for one.
fn notify_tool_failure(session: &Session, tool: &str, err: &ToolError) {
    if !session.wants_log(LogLevel::Error) {
        return;
    }
    session.notify(json!({
        "jsonrpc": "2.0",
        "method": "notifications/message",
        "params": {
            "level": "error",
            "logger": SERVER_NAME,
            "data": { "tool": tool, "kind": err.kind(), "error": err.to_string() },
        },
    }));
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
