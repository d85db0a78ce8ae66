// crates/mcp-hub-store-sqlite/tests/sqlite_stores.rs
// ============================================================================
// Module: SQLite Hub Store Tests
// Description: Persistence, upsert, and aggregation tests for SQLite stores.
// Purpose: Ensure the SQLite backends match the in-memory reference semantics.
// Dependencies: mcp-hub-core, mcp-hub-store-sqlite, tempfile
// ============================================================================

//! ## Overview
//! Exercises both SQLite backends against temporary database files.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only store assertions."
)]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use mcp_hub_core::DEFAULT_SUBJECT;
use mcp_hub_core::TokenRecord;
use mcp_hub_core::TokenStore;
use mcp_hub_core::UsageRecord;
use mcp_hub_core::UsageRecorder;
use mcp_hub_store_sqlite::SqlitePool;
use mcp_hub_store_sqlite::SqliteStoreConfig;
use mcp_hub_store_sqlite::SqliteStoreError;
use mcp_hub_store_sqlite::SqliteTokenStore;
use mcp_hub_store_sqlite::open_stores;
use serde_json::json;
use tempfile::TempDir;

fn config(temp: &TempDir) -> SqliteStoreConfig {
    SqliteStoreConfig::new(temp.path().join("hub.sqlite"))
}

fn usage(tool: &str, success: bool) -> UsageRecord {
    UsageRecord {
        provider: "echo".to_string(),
        tool_name: tool.to_string(),
        subject: Some(DEFAULT_SUBJECT.to_string()),
        success,
        latency_ms: 12,
        error_message: (!success).then(|| "upstream said no".to_string()),
        created_at_ms: 1_700_000_000_000,
    }
}

#[test]
fn upsert_keeps_one_row_with_first_creation_time() {
    let temp = TempDir::new().unwrap();
    let (tokens, _usage) = open_stores(&config(&temp)).unwrap();

    let first = tokens.upsert_token(TokenRecord::new("notion", DEFAULT_SUBJECT, "a1")).unwrap();
    thread::sleep(Duration::from_millis(5));
    let mut second = TokenRecord::new("notion", DEFAULT_SUBJECT, "a2").with_refresh_token("r2");
    second.metadata = json!({ "workspace_name": "Acme" });
    second.raw = Some(json!({ "access_token": "a2" }));
    tokens.upsert_token(second).unwrap();

    let stored = tokens.get_token("notion", DEFAULT_SUBJECT).unwrap().unwrap();
    assert_eq!(stored.access_token, "a2");
    assert_eq!(stored.refresh_token.as_deref(), Some("r2"));
    assert_eq!(stored.metadata["workspace_name"], json!("Acme"));
    assert_eq!(stored.raw, Some(json!({ "access_token": "a2" })));
    assert_eq!(stored.created_at_ms, first.created_at_ms);
    assert!(stored.updated_at_ms >= first.updated_at_ms);
}

#[test]
fn missing_token_returns_none() {
    let temp = TempDir::new().unwrap();
    let (tokens, _usage) = open_stores(&config(&temp)).unwrap();
    assert!(tokens.get_token("notion", "nobody").unwrap().is_none());
}

#[test]
fn tokens_survive_reopen() {
    let temp = TempDir::new().unwrap();
    {
        let (tokens, _usage) = open_stores(&config(&temp)).unwrap();
        tokens.upsert_token(TokenRecord::new("pinecone", "ws", "key")).unwrap();
    }
    let (tokens, _usage) = open_stores(&config(&temp)).unwrap();
    assert_eq!(tokens.get_token("pinecone", "ws").unwrap().unwrap().access_token, "key");
}

#[test]
fn usage_stats_group_by_provider_and_tool() {
    let temp = TempDir::new().unwrap();
    let (_tokens, recorder) = open_stores(&config(&temp)).unwrap();
    recorder.record(usage("echo.say", true)).unwrap();
    recorder.record(usage("echo.say", true)).unwrap();
    recorder.record(usage("echo.shout", false)).unwrap();

    let stats = recorder.stats().unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.successes, 2);
    assert_eq!(stats.failures, 1);
    assert_eq!(stats.by_provider.get("echo"), Some(&3));
    assert_eq!(stats.by_tool.get("echo:echo.say"), Some(&2));
    assert_eq!(stats.by_tool.get("echo:echo.shout"), Some(&1));
}

#[test]
fn empty_log_has_zero_stats() {
    let temp = TempDir::new().unwrap();
    let (_tokens, recorder) = open_stores(&config(&temp)).unwrap();
    assert_eq!(recorder.stats().unwrap().total, 0);
}

#[test]
fn concurrent_writers_share_the_pool() {
    let temp = TempDir::new().unwrap();
    let pool = Arc::new(SqlitePool::open(&config(&temp)).unwrap());
    assert_eq!(pool.size(), 3);
    let tokens = SqliteTokenStore::new(Arc::clone(&pool));
    let handles: Vec<_> = (0..6)
        .map(|n| {
            let tokens = tokens.clone();
            thread::spawn(move || {
                for round in 0..10 {
                    tokens
                        .upsert_token(TokenRecord::new("notion", format!("s{n}"), format!("t{round}")))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    for n in 0..6 {
        let stored = tokens.get_token("notion", &format!("s{n}")).unwrap().unwrap();
        assert_eq!(stored.access_token, "t9");
    }
}

#[test]
fn zero_pool_size_is_rejected() {
    let temp = TempDir::new().unwrap();
    let mut config = config(&temp);
    config.pool_size = 0;
    assert!(matches!(SqlitePool::open(&config), Err(SqliteStoreError::Invalid(_))));
}

#[test]
fn directory_path_is_rejected() {
    let temp = TempDir::new().unwrap();
    let config = SqliteStoreConfig::new(temp.path());
    assert!(matches!(SqlitePool::open(&config), Err(SqliteStoreError::Invalid(_))));
}
