// crates/mcp-hub-core/src/credentials/tests.rs
// ============================================================================
// Module: Credential Broker Unit Tests
// Description: Unit tests for credential resolution and the refresh retry.
// Purpose: Pin the two-attempt bound and the static-credential bypass.
// Dependencies: mcp-hub-core, tokio
// ============================================================================

//! ## Overview
//! Drives [`CredentialBroker::call_with_refresh`] with counting fakes for the
//! upstream call, the refresh exchange, and the token store.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only broker assertions."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use serde_json::json;

use super::CredentialBroker;
use super::TokenRefresher;
use super::UpstreamFailure;
use crate::error::StoreError;
use crate::error::ToolError;
use crate::token::DEFAULT_SUBJECT;
use crate::token::InMemoryTokenStore;
use crate::token::SharedTokenStore;
use crate::token::TokenRecord;
use crate::token::TokenStore;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Refresh exchange that always succeeds with a numbered access token.
#[derive(Default)]
struct CountingRefresher {
    calls: AtomicUsize,
}

#[async_trait]
impl TokenRefresher for CountingRefresher {
    async fn refresh(&self, current: &TokenRecord) -> Result<TokenRecord, ToolError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let mut next = current.clone();
        next.access_token = format!("refreshed-{n}");
        Ok(next)
    }
}

/// Refresh exchange that is always rejected.
struct RejectingRefresher;

#[async_trait]
impl TokenRefresher for RejectingRefresher {
    async fn refresh(&self, _current: &TokenRecord) -> Result<TokenRecord, ToolError> {
        Err(ToolError::RefreshFailed("invalid_grant".to_string()))
    }
}

/// Token store that counts lookups.
#[derive(Default)]
struct CountingStore {
    inner: InMemoryTokenStore,
    gets: Arc<AtomicUsize>,
}

impl TokenStore for CountingStore {
    fn upsert_token(&self, record: TokenRecord) -> Result<TokenRecord, StoreError> {
        self.inner.upsert_token(record)
    }

    fn get_token(&self, provider: &str, subject: &str) -> Result<Option<TokenRecord>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get_token(provider, subject)
    }
}

fn seeded_store(refresh_token: Option<&str>) -> SharedTokenStore {
    let store = InMemoryTokenStore::new();
    let mut record = TokenRecord::new("notion", DEFAULT_SUBJECT, "stale");
    record.refresh_token = refresh_token.map(str::to_string);
    store.upsert_token(record).unwrap();
    SharedTokenStore::from_store(store)
}

fn unauthorized() -> UpstreamFailure {
    UpstreamFailure::Auth {
        status: 401,
        body: json!({ "code": "unauthorized" }),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test]
async fn success_on_first_attempt_skips_refresh() {
    let refresher = Arc::new(CountingRefresher::default());
    let broker = CredentialBroker::new("notion", seeded_store(Some("r1")))
        .with_refresher(refresher.clone());
    let result = broker
        .call_with_refresh(None, "notion.search", |token| async move { Ok::<_, UpstreamFailure>(token) })
        .await
        .unwrap();
    assert_eq!(result, "stale");
    assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn auth_failure_refreshes_once_then_retries_with_new_token() {
    let refresher = Arc::new(CountingRefresher::default());
    let store = seeded_store(Some("r1"));
    let broker = CredentialBroker::new("notion", store.clone()).with_refresher(refresher.clone());
    let result = broker
        .call_with_refresh(None, "notion.search", |token| async move {
            if token == "stale" { Err(unauthorized()) } else { Ok(token) }
        })
        .await
        .unwrap();
    assert_eq!(result, "refreshed-1");
    assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    let stored = store.get_token("notion", DEFAULT_SUBJECT).unwrap().unwrap();
    assert_eq!(stored.access_token, "refreshed-1");
}

#[tokio::test]
async fn persistent_auth_failure_is_bounded_to_two_calls_and_one_refresh() {
    let refresher = Arc::new(CountingRefresher::default());
    let broker = CredentialBroker::new("notion", seeded_store(Some("r1")))
        .with_refresher(refresher.clone());
    let upstream_calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&upstream_calls);
    let err = broker
        .call_with_refresh(None, "notion.search", move |_token| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(unauthorized())
            }
        })
        .await
        .unwrap_err();
    assert_eq!(upstream_calls.load(Ordering::SeqCst), 2);
    assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    assert!(matches!(err, ToolError::UpstreamAuth { status: 401, .. }));
}

#[tokio::test]
async fn missing_refresh_token_fails_without_refresh() {
    let refresher = Arc::new(CountingRefresher::default());
    let broker =
        CredentialBroker::new("notion", seeded_store(None)).with_refresher(refresher.clone());
    let err = broker
        .call_with_refresh(None, "notion.search", |_token| async { Err::<(), _>(unauthorized()) })
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::UpstreamAuth { .. }));
    assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn non_auth_failure_is_not_retried() {
    let refresher = Arc::new(CountingRefresher::default());
    let broker = CredentialBroker::new("notion", seeded_store(Some("r1")))
        .with_refresher(refresher.clone());
    let err = broker
        .call_with_refresh(None, "notion.fetchPage", |_token| async {
            Err::<(), _>(UpstreamFailure::Http {
                status: 404,
                body: json!({ "code": "object_not_found" }),
            })
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Upstream { status: Some(404), .. }));
    assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rejected_refresh_is_terminal() {
    let upstream_calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&upstream_calls);
    let broker = CredentialBroker::new("notion", seeded_store(Some("r1")))
        .with_refresher(Arc::new(RejectingRefresher));
    let err = broker
        .call_with_refresh(None, "notion.search", move |_token| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(unauthorized())
            }
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::RefreshFailed(_)));
    assert_eq!(upstream_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn static_credential_skips_store_and_never_refreshes() {
    let gets = Arc::new(AtomicUsize::new(0));
    let store = CountingStore {
        inner: InMemoryTokenStore::new(),
        gets: Arc::clone(&gets),
    };
    let refresher = Arc::new(CountingRefresher::default());
    let broker = CredentialBroker::new("notion", SharedTokenStore::from_store(store))
        .with_static_credential(Some("secret_static".to_string()))
        .with_refresher(refresher.clone());
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let err = broker
        .call_with_refresh(None, "notion.getSelf", move |token| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(token);
                Err::<(), _>(unauthorized())
            }
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::UpstreamAuth { .. }));
    assert_eq!(gets.load(Ordering::SeqCst), 0);
    assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
    assert_eq!(*seen.lock().unwrap(), vec!["secret_static".to_string()]);
}

#[tokio::test]
async fn blank_static_credential_falls_back_to_store() {
    let broker = CredentialBroker::new("notion", seeded_store(None))
        .with_static_credential(Some("  ".to_string()));
    assert!(!broker.is_static());
    assert_eq!(broker.resolve(None).unwrap().access_token(), "stale");
}

#[test]
fn missing_record_names_subject_and_hint() {
    let broker = CredentialBroker::new("notion", SharedTokenStore::from_store(InMemoryTokenStore::new()))
        .with_authorize_hint("Visit /auth/notion to connect");
    let err = broker.resolve(Some("ws-1")).unwrap_err();
    let ToolError::Credentials(message) = err else {
        panic!("expected credentials error, got {err:?}");
    };
    assert!(message.contains("ws-1"));
    assert!(message.contains("/auth/notion"));
}
