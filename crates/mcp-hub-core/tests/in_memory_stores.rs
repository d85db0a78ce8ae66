// crates/mcp-hub-core/tests/in_memory_stores.rs
// ============================================================================
// Module: In-Memory Store Tests
// Description: Observable semantics of the in-memory token and usage stores.
// Purpose: Pin upsert idempotence and usage aggregation for the reference backend.
// Dependencies: mcp-hub-core
// ============================================================================

//! ## Overview
//! The in-memory backends are the reference implementation that the SQLite
//! backends are checked against.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only store assertions."
)]

use std::sync::Arc;
use std::thread;

use mcp_hub_core::DEFAULT_SUBJECT;
use mcp_hub_core::InMemoryTokenStore;
use mcp_hub_core::InMemoryUsageRecorder;
use mcp_hub_core::SharedTokenStore;
use mcp_hub_core::TokenRecord;
use mcp_hub_core::TokenStore;
use mcp_hub_core::UsageRecord;
use mcp_hub_core::UsageRecorder;

fn usage(provider: &str, tool: &str, success: bool) -> UsageRecord {
    UsageRecord {
        provider: provider.to_string(),
        tool_name: tool.to_string(),
        subject: None,
        success,
        latency_ms: 3,
        error_message: (!success).then(|| "boom".to_string()),
        created_at_ms: 0,
    }
}

#[test]
fn upsert_overwrites_fields_but_keeps_creation_time() {
    let store = InMemoryTokenStore::new();
    let first = store
        .upsert_token(TokenRecord::new("notion", DEFAULT_SUBJECT, "a1").with_refresh_token("r1"))
        .unwrap();
    thread::sleep(std::time::Duration::from_millis(5));
    let second = store.upsert_token(TokenRecord::new("notion", DEFAULT_SUBJECT, "a2")).unwrap();

    let stored = store.get_token("notion", DEFAULT_SUBJECT).unwrap().unwrap();
    assert_eq!(stored.access_token, "a2");
    assert_eq!(stored.refresh_token, None);
    assert_eq!(stored.created_at_ms, first.created_at_ms);
    assert!(second.updated_at_ms >= first.updated_at_ms);
}

#[test]
fn records_are_keyed_by_provider_and_subject() {
    let store = SharedTokenStore::from_store(InMemoryTokenStore::new());
    store.upsert_token(TokenRecord::new("notion", "ws-1", "a")).unwrap();
    store.upsert_token(TokenRecord::new("notion", "ws-2", "b")).unwrap();
    store.upsert_token(TokenRecord::new("pinecone", "ws-1", "c")).unwrap();

    assert_eq!(store.get_token("notion", "ws-1").unwrap().unwrap().access_token, "a");
    assert_eq!(store.get_token("notion", "ws-2").unwrap().unwrap().access_token, "b");
    assert_eq!(store.get_token("pinecone", "ws-1").unwrap().unwrap().access_token, "c");
    assert!(store.get_token("pinecone", "ws-2").unwrap().is_none());
}

#[test]
fn usage_stats_aggregate_by_provider_and_tool() {
    let recorder = InMemoryUsageRecorder::new();
    recorder.record(usage("echo", "echo.say", true)).unwrap();
    recorder.record(usage("echo", "echo.say", false)).unwrap();
    recorder.record(usage("notion", "notion.search", true)).unwrap();

    let stats = recorder.stats().unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.successes, 2);
    assert_eq!(stats.failures, 1);
    assert_eq!(stats.by_provider.get("echo"), Some(&2));
    assert_eq!(stats.by_tool.get("echo:echo.say"), Some(&2));
    assert_eq!(stats.by_tool.get("notion:notion.search"), Some(&1));
}

#[test]
fn concurrent_appends_are_all_kept() {
    let recorder = Arc::new(InMemoryUsageRecorder::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let recorder = Arc::clone(&recorder);
            thread::spawn(move || {
                for _ in 0..50 {
                    recorder.record(usage("echo", "echo.say", true)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(recorder.stats().unwrap().total, 400);
    assert_eq!(recorder.records().unwrap().len(), 400);
}

#[test]
fn concurrent_upserts_keep_one_record_per_key() {
    let store = Arc::new(InMemoryTokenStore::new());
    let handles: Vec<_> = (0..8)
        .map(|writer| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for subject in 0..25 {
                    let record =
                        TokenRecord::new("notion", format!("ws-{subject}"), format!("t{writer}"));
                    store.upsert_token(record).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    for subject in 0..25 {
        let record = store.get_token("notion", &format!("ws-{subject}")).unwrap().unwrap();
        let writer: usize = record.access_token.trim_start_matches('t').parse().unwrap();
        assert!(writer < 8, "{}", record.access_token);
    }
    assert!(store.get_token("notion", "ws-25").unwrap().is_none());
}
