// crates/mcp-hub-providers/tests/pinecone_nova_providers.rs
// ============================================================================
// Module: Pinecone and Nova Memory Provider Tests
// Description: Outbound request shape and error mapping for API-key providers.
// Purpose: Verify host resolution, key precedence, and request forwarding.
// ============================================================================

//! Outbound request shape and error mapping for API-key providers.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use mcp_hub_config::NovaMemoryConfig;
use mcp_hub_config::PineconeConfig;
use mcp_hub_core::Provider;
use mcp_hub_core::ToolError;
use mcp_hub_providers::nova_memory;
use mcp_hub_providers::pinecone;
use serde_json::Value;
use serde_json::json;

use crate::common::MockUpstream;
use crate::common::deps;

async fn call(provider: &Provider, tool: &str, args: Value) -> Result<String, ToolError> {
    let descriptor = provider.tools.iter().find(|desc| desc.name == tool).unwrap();
    let output = descriptor.handler.call(args).await?;
    Ok(output.first_text().unwrap_or_default().to_string())
}

fn pinecone_config(api_base: &str) -> PineconeConfig {
    PineconeConfig {
        api_base: api_base.to_string(),
        timeout_ms: 5_000,
        ..PineconeConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn pinecone_without_key_reports_credentials_error() {
    let (deps, _tokens) = deps();
    let provider = pinecone::provider(&deps, &pinecone_config("http://127.0.0.1:9")).unwrap();
    let err = call(&provider, "pinecone.describeIndex", json!({ "index_name": "docs" }))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Credentials(_)), "{err:?}");
    assert!(err.to_string().contains("PINECONE_API_KEY"), "{err}");
}

#[tokio::test(flavor = "multi_thread")]
async fn pinecone_query_without_host_is_rejected() {
    let (deps, _tokens) = deps();
    let config = PineconeConfig {
        api_key: Some("k".to_string()),
        ..pinecone_config("http://127.0.0.1:9")
    };
    let provider = pinecone::provider(&deps, &config).unwrap();
    let err = call(&provider, "pinecone.query", json!({ "id": "a", "topK": 3 })).await.unwrap_err();
    assert!(err.to_string().contains("index_host required"), "{err}");
}

#[tokio::test(flavor = "multi_thread")]
async fn pinecone_per_call_key_overrides_config_and_host_is_trimmed() {
    let upstream = MockUpstream::start(vec![(200, json!({ "matches": [] }))]);
    let (deps, _tokens) = deps();
    let config = PineconeConfig {
        api_key: Some("configured".to_string()),
        index_host: Some(format!("{}//", upstream.base_url)),
        ..pinecone_config("http://127.0.0.1:9")
    };
    let provider = pinecone::provider(&deps, &config).unwrap();
    call(
        &provider,
        "pinecone.query",
        json!({ "vector": [0.1, 0.2], "topK": 10, "api_key": "override", "namespace": "ns" }),
    )
    .await
    .unwrap();

    let requests = upstream.finish();
    assert_eq!(requests[0].url, "/query");
    assert_eq!(requests[0].header("api-key"), Some("override"));
    assert_eq!(requests[0].body, json!({ "vector": [0.1, 0.2], "topK": 10, "namespace": "ns" }));
}

#[tokio::test(flavor = "multi_thread")]
async fn pinecone_unauthorized_key_is_terminal() {
    let upstream = MockUpstream::start(vec![(401, json!({ "error": "bad key" }))]);
    let (deps, _tokens) = deps();
    let config = PineconeConfig {
        api_key: Some("configured".to_string()),
        ..pinecone_config(&upstream.base_url)
    };
    let provider = pinecone::provider(&deps, &config).unwrap();
    let err = call(&provider, "pinecone.describeIndex", json!({ "index_name": "docs" }))
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("describeIndex failed (status 401)"), "{err}");
    let requests = upstream.finish();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].url, "/indexes/docs");
}

#[tokio::test(flavor = "multi_thread")]
async fn assistant_chat_defaults_message_role() {
    let upstream = MockUpstream::start(vec![(200, json!({ "message": { "content": "hi" } }))]);
    let (deps, _tokens) = deps();
    let config = PineconeConfig {
        api_key: Some("configured".to_string()),
        ..pinecone_config(&upstream.base_url)
    };
    let provider = pinecone::provider(&deps, &config).unwrap();
    call(
        &provider,
        "pineconeAssistant.chat",
        json!({ "assistant_name": "helper", "messages": [{ "content": "hello" }] }),
    )
    .await
    .unwrap();
    let requests = upstream.finish();
    assert_eq!(requests[0].url, "/chat/helper");
    assert_eq!(requests[0].body, json!({ "messages": [{ "role": "user", "content": "hello" }] }));
}

#[tokio::test(flavor = "multi_thread")]
async fn nova_forwards_arguments_to_endpoint() {
    let upstream = MockUpstream::start(vec![(200, json!({ "id": "m1" }))]);
    let (deps, _tokens) = deps();
    let config = NovaMemoryConfig {
        base_url: upstream.base_url.clone(),
        timeout_ms: 5_000,
        ..NovaMemoryConfig::default()
    };
    let provider = nova_memory::provider(&deps, &config).unwrap();
    let args = json!({ "text": "remember", "type": "note", "tags": ["a"], "namespace": "moneypenny" });
    let text = call(&provider, "novaMemory.store", args.clone()).await.unwrap();
    assert!(text.contains("m1"));

    let requests = upstream.finish();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].url, "/storeMemory");
    assert_eq!(requests[0].header("authorization"), None);
    assert_eq!(requests[0].body, args);
}

#[tokio::test(flavor = "multi_thread")]
async fn nova_upstream_error_carries_status_and_payload() {
    let upstream = MockUpstream::start(vec![(503, json!({ "error": "down" }))]);
    let (deps, _tokens) = deps();
    let config = NovaMemoryConfig {
        base_url: upstream.base_url.clone(),
        timeout_ms: 5_000,
        ..NovaMemoryConfig::default()
    };
    let provider = nova_memory::provider(&deps, &config).unwrap();
    let err = call(&provider, "novaMemory.stats", json!({ "namespace": "moneypenny" }))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Upstream { status: Some(503), .. }), "{err:?}");
    assert!(err.to_string().starts_with("describeStats failed"), "{err}");
    upstream.finish();
}
