// crates/mcp-hub-mcp/src/sessions/tests.rs
// ============================================================================
// Module: Session Registry Unit Tests
// Description: Identity, resolution, and teardown of sessions.
// Purpose: Validate registry semantics independent of HTTP.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;

use super::LogLevel;
use super::MAX_PENDING_MESSAGES;
use super::SessionChannel;
use super::SessionRegistry;
use super::TransportKind;
use super::new_session_id;
use crate::error::TransportError;

#[test]
fn session_ids_are_unique_over_ten_thousand_creations() {
    let registry = SessionRegistry::new();
    let mut seen = HashSet::new();
    for _ in 0 .. 10_000 {
        let session = registry.create_streaming();
        assert!(seen.insert(session.id().to_string()));
    }
    assert_eq!(registry.len(), 10_000);
}

#[test]
fn session_ids_are_uuid_v4_shaped() {
    let id = new_session_id();
    assert_eq!(id.len(), 36);
    assert_eq!(id.as_bytes()[14], b'4');
    assert!(matches!(id.as_bytes()[19], b'8' | b'9' | b'a' | b'b'));
}

#[test]
fn missing_id_creates_only_for_initialize() {
    let registry = SessionRegistry::new();
    assert_eq!(registry.create_or_resolve(None, false).unwrap_err(), TransportError::MissingSessionId);
    assert!(registry.is_empty());

    let (session, created) = registry.create_or_resolve(None, true).unwrap();
    assert!(created);
    assert_eq!(session.transport(), TransportKind::Streaming);

    let (resolved, created) = registry.create_or_resolve(Some(session.id()), false).unwrap();
    assert!(!created);
    assert_eq!(resolved.id(), session.id());
}

#[test]
fn unknown_id_never_creates_a_session() {
    let registry = SessionRegistry::new();
    let err = registry.create_or_resolve(Some("nope"), true).unwrap_err();
    assert_eq!(err, TransportError::SessionNotFound);
    assert!(registry.is_empty());
}

#[test]
fn removed_session_is_not_found() {
    let registry = SessionRegistry::new();
    let session = registry.create_streaming();
    let id = session.id().to_string();
    assert!(registry.remove(&id).is_some());
    assert!(registry.lookup(&id).is_none());
    assert_eq!(
        registry.create_or_resolve(Some(&id), false).unwrap_err(),
        TransportError::SessionNotFound
    );
    assert!(registry.remove(&id).is_none());
}

#[test]
fn streaming_queue_is_bounded_and_drained_in_order() {
    let registry = SessionRegistry::new();
    let session = registry.create_streaming();
    for index in 0 .. MAX_PENDING_MESSAGES + 2 {
        session.notify(json!(index));
    }
    let drained = session.drain();
    assert_eq!(drained.len(), MAX_PENDING_MESSAGES);
    assert_eq!(drained[0], json!(2));
    assert!(session.drain().is_empty());
}

#[tokio::test]
async fn push_session_notifications_reach_the_outbox() {
    let registry = SessionRegistry::new();
    let (inbox, _inbox_rx) = mpsc::channel(4);
    let (outbox, mut outbox_rx) = mpsc::channel(4);
    let session = registry.create(SessionChannel::Push {
        inbox,
        outbox,
    });
    assert_eq!(session.transport(), TransportKind::Sse);
    session.notify(json!({ "hello": true }));
    assert_eq!(outbox_rx.recv().await.unwrap(), json!({ "hello": true }));
    assert!(session.drain().is_empty());
}

#[test]
fn log_level_threshold_is_inclusive() {
    let registry = SessionRegistry::new();
    let session = registry.create_streaming();
    assert!(!session.wants_log(LogLevel::Emergency));
    session.set_log_level(LogLevel::Error);
    assert!(session.wants_log(LogLevel::Error));
    assert!(session.wants_log(LogLevel::Critical));
    assert!(!session.wants_log(LogLevel::Warning));
    assert_eq!(LogLevel::parse("warning"), Some(LogLevel::Warning));
    assert_eq!(LogLevel::parse("loud"), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_create_and_remove_keep_the_map_consistent() {
    let registry = Arc::new(SessionRegistry::new());
    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                let mut kept = Vec::new();
                for round in 0..100 {
                    let session = registry.create_streaming();
                    if round % 2 == 0 {
                        assert!(registry.remove(session.id()).is_some());
                    } else {
                        kept.push(session.id().to_string());
                    }
                    tokio::task::yield_now().await;
                }
                kept
            })
        })
        .collect();
    let mut kept = Vec::new();
    for task in tasks {
        kept.extend(task.await.unwrap());
    }
    assert_eq!(kept.len(), 800);
    assert_eq!(registry.len(), 800);
    assert!(kept.iter().all(|id| registry.lookup(id).is_some()));
}
