// crates/mcp-hub-mcp/src/jsonrpc/tests.rs
// ============================================================================
// Module: JSON-RPC Protocol Unit Tests
// Description: Method handling against an echo-backed dispatcher.
// Purpose: Validate reply shapes, error codes, and log notifications.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::sync::Arc;

use mcp_hub_core::FnHandler;
use mcp_hub_core::InMemoryUsageRecorder;
use mcp_hub_core::Provider;
use mcp_hub_core::SharedUsageRecorder;
use mcp_hub_core::ToolDescriptor;
use mcp_hub_core::ToolError;
use mcp_hub_core::ToolOutput;
use mcp_hub_core::ToolSchema;
use mcp_hub_providers::echo;
use serde_json::Value;
use serde_json::json;

use super::INVALID_PARAMS_CODE;
use super::METHOD_NOT_FOUND_CODE;
use super::handle_request;
use super::parse_request;
use crate::audit::NoopAuditSink;
use crate::audit::RequestOutcome;
use crate::dispatch::Dispatcher;
use crate::dispatch::ToolRegistry;
use crate::error::TransportError;
use crate::sessions::SessionRegistry;

fn broken_provider() -> Provider {
    let handler = FnHandler::new(|_args: Value| async {
        Err::<ToolOutput, _>(ToolError::Credentials("no token".to_string()))
    });
    Provider::new(
        "broken",
        vec![ToolDescriptor::new(
            "broken.call",
            "Broken",
            "Always fails",
            ToolSchema::new(),
            Arc::new(handler),
        )],
    )
}

fn dispatcher() -> (Dispatcher, InMemoryUsageRecorder) {
    let usage = InMemoryUsageRecorder::new();
    let registry = ToolRegistry::from_providers(&[echo::provider(), broken_provider()]).unwrap();
    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        SharedUsageRecorder::from_recorder(usage.clone()),
        Arc::new(NoopAuditSink),
    );
    (dispatcher, usage)
}

async fn call(dispatcher: &Dispatcher, registry: &SessionRegistry, body: Value) -> Option<Value> {
    let session = registry.create_streaming();
    let request = parse_request(body.to_string().as_bytes()).unwrap();
    let (reply, _) = handle_request(dispatcher, &session, request).await;
    reply.map(|reply| reply.to_value())
}

#[tokio::test]
async fn initialize_echoes_client_protocol_version() {
    let (dispatcher, _) = dispatcher();
    let registry = SessionRegistry::new();
    let reply = call(
        &dispatcher,
        &registry,
        json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize",
                "params": { "protocolVersion": "2024-11-05" } }),
    )
    .await
    .unwrap();
    assert_eq!(reply["id"], 1);
    assert_eq!(reply["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(reply["result"]["serverInfo"]["name"], "mcp-hub");
    assert_eq!(reply["result"]["capabilities"]["tools"]["listChanged"], false);
}

#[tokio::test]
async fn notifications_get_no_reply() {
    let (dispatcher, _) = dispatcher();
    let registry = SessionRegistry::new();
    let session = registry.create_streaming();
    let request =
        parse_request(br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).unwrap();
    let (reply, report) = handle_request(&dispatcher, &session, request).await;
    assert!(reply.is_none());
    assert_eq!(report.outcome, RequestOutcome::Accepted);
}

#[tokio::test]
async fn explicit_null_id_still_gets_a_reply() {
    let (dispatcher, _) = dispatcher();
    let registry = SessionRegistry::new();
    let request = parse_request(br#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#).unwrap();
    assert!(!request.is_notification());
    let reply = call(&dispatcher, &registry, json!({ "jsonrpc": "2.0", "id": null, "method": "ping" }))
        .await
        .unwrap();
    assert_eq!(reply["id"], Value::Null);
    assert_eq!(reply["result"], json!({}));
}

#[tokio::test]
async fn tools_list_and_call_round_through_the_dispatcher() {
    let (dispatcher, usage) = dispatcher();
    let registry = SessionRegistry::new();
    let list = call(&dispatcher, &registry, json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }))
        .await
        .unwrap();
    let names: Vec<&str> = list["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tool| tool["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["echo.say", "broken.call"]);
    assert!(list["result"]["tools"][0]["inputSchema"].is_object());

    let reply = call(
        &dispatcher,
        &registry,
        json!({ "jsonrpc": "2.0", "id": 3, "method": "tools/call",
                "params": { "name": "echo.say", "arguments": { "text": "hi" } } }),
    )
    .await
    .unwrap();
    assert_eq!(reply["result"]["content"][0]["text"], "hi");
    assert_eq!(usage.records().unwrap().len(), 1);
}

#[tokio::test]
async fn dispatch_rejections_become_invalid_params() {
    let (dispatcher, usage) = dispatcher();
    let registry = SessionRegistry::new();
    for params in [
        json!({ "name": "echo.say", "arguments": {} }),
        json!({ "name": "echo.nothing", "arguments": { "text": "hi" } }),
        json!({ "arguments": {} }),
    ] {
        let reply = call(
            &dispatcher,
            &registry,
            json!({ "jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": params }),
        )
        .await
        .unwrap();
        assert_eq!(reply["error"]["code"], INVALID_PARAMS_CODE, "{reply}");
    }
    assert!(usage.records().unwrap().is_empty());
}

#[tokio::test]
async fn handler_failure_is_an_in_band_error_with_log_notification() {
    let (dispatcher, usage) = dispatcher();
    let registry = SessionRegistry::new();
    let session = registry.create_streaming();
    let set_level = parse_request(
        br#"{"jsonrpc":"2.0","id":1,"method":"logging/setLevel","params":{"level":"error"}}"#,
    )
    .unwrap();
    let (reply, _) = handle_request(&dispatcher, &session, set_level).await;
    assert_eq!(reply.unwrap().to_value()["result"], json!({}));

    let request = parse_request(
        br#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"broken.call"}}"#,
    )
    .unwrap();
    let (reply, report) = handle_request(&dispatcher, &session, request).await;
    let reply = reply.unwrap().to_value();
    assert_eq!(reply["result"]["isError"], true);
    assert_eq!(reply["result"]["content"][0]["text"], "no token");
    assert_eq!(report.outcome, RequestOutcome::ToolError);
    assert_eq!(report.tool.as_deref(), Some("broken.call"));
    assert_eq!(usage.records().unwrap().len(), 1);

    let pending = session.drain();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["method"], "notifications/message");
    assert_eq!(pending[0]["params"]["level"], "error");
}

#[tokio::test]
async fn tool_failure_without_log_level_queues_nothing() {
    let (dispatcher, _) = dispatcher();
    let registry = SessionRegistry::new();
    let session = registry.create_streaming();
    let request = parse_request(
        br#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"broken.call"}}"#,
    )
    .unwrap();
    let _ = handle_request(&dispatcher, &session, request).await;
    assert!(session.drain().is_empty());
}

#[tokio::test]
async fn unknown_method_and_bad_level_are_errors() {
    let (dispatcher, _) = dispatcher();
    let registry = SessionRegistry::new();
    let reply =
        call(&dispatcher, &registry, json!({ "jsonrpc": "2.0", "id": 5, "method": "resources/list" }))
            .await
            .unwrap();
    assert_eq!(reply["error"]["code"], METHOD_NOT_FOUND_CODE);

    let reply = call(
        &dispatcher,
        &registry,
        json!({ "jsonrpc": "2.0", "id": 6, "method": "logging/setLevel",
                "params": { "level": "loud" } }),
    )
    .await
    .unwrap();
    assert_eq!(reply["error"]["code"], INVALID_PARAMS_CODE);

    let reply = call(&dispatcher, &registry, json!({ "jsonrpc": "2.0", "id": 7, "method": "ping" }))
        .await
        .unwrap();
    assert_eq!(reply["result"], json!({}));
}

#[test]
fn malformed_messages_are_invalid_requests() {
    for body in [&b"not json"[..], br#"{"jsonrpc":"1.0","id":1,"method":"ping"}"#, br#"{"id":1}"#] {
        let err = parse_request(body).unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)), "{err:?}");
    }
}
