// crates/mcp-hub-mcp/src/auth.rs
// ============================================================================
// Module: Shared-Secret Gate
// Description: Optional pre-shared header check for every hub route.
// Purpose: Reject unauthenticated requests before any session logic runs.
// Dependencies: axum, subtle
// ============================================================================

//! ## Overview
//! When a secret is configured, every request must carry it in the
//! configured header. Comparison is constant-time. With no secret, the gate
//! passes everything through.

use std::sync::Arc;

use axum::extract::Request;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderName;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use subtle::ConstantTimeEq;

use crate::audit::HubAuditSink;
use crate::audit::HubRejectEvent;
use crate::error::TransportError;

/// Compares two strings in constant time.
#[must_use]
pub fn constant_time_eq_str(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Shared-secret check applied to every route.
pub struct SharedSecretGate {
    /// Header carrying the secret.
    header: HeaderName,
    /// Expected secret; `None` disables the gate.
    secret: Option<String>,
    /// Sink for rejections.
    audit: Arc<dyn HubAuditSink>,
}

impl SharedSecretGate {
    /// Creates a gate.
    #[must_use]
    pub fn new(header: HeaderName, secret: Option<String>, audit: Arc<dyn HubAuditSink>) -> Self {
        Self {
            header,
            secret,
            audit,
        }
    }

    /// Returns true when a secret is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Checks the request headers.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Unauthorized`] when the header is absent or
    /// does not match.
    pub fn check(&self, headers: &HeaderMap) -> Result<(), TransportError> {
        let Some(secret) = &self.secret else {
            return Ok(());
        };
        let presented = headers.get(&self.header).and_then(|value| value.to_str().ok());
        match presented {
            Some(value) if constant_time_eq_str(value, secret) => Ok(()),
            _ => Err(TransportError::Unauthorized),
        }
    }
}

/// Middleware enforcing [`SharedSecretGate`].
pub async fn require_shared_secret(
    State(gate): State<Arc<SharedSecretGate>>,
    request: Request,
    next: Next,
) -> Response {
    match gate.check(request.headers()) {
        Ok(()) => next.run(request).await,
        Err(err) => {
            gate.audit.record_reject(&HubRejectEvent::new(request.uri().path(), err.kind()));
            err.into_response()
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use std::sync::Arc;

    use axum::http::HeaderMap;
    use axum::http::HeaderName;
    use axum::http::HeaderValue;

    use super::SharedSecretGate;
    use super::constant_time_eq_str;
    use crate::audit::NoopAuditSink;
    use crate::error::TransportError;

    fn gate(secret: Option<&str>) -> SharedSecretGate {
        SharedSecretGate::new(
            HeaderName::from_static("x-mcp-key"),
            secret.map(str::to_string),
            Arc::new(NoopAuditSink),
        )
    }

    #[test]
    fn disabled_gate_passes_everything() {
        assert!(gate(None).check(&HeaderMap::new()).is_ok());
    }

    #[test]
    fn enabled_gate_requires_exact_secret() {
        let gate = gate(Some("s3cret"));
        assert_eq!(gate.check(&HeaderMap::new()), Err(TransportError::Unauthorized));
        let mut headers = HeaderMap::new();
        headers.insert("x-mcp-key", HeaderValue::from_static("s3cre"));
        assert_eq!(gate.check(&headers), Err(TransportError::Unauthorized));
        headers.insert("x-mcp-key", HeaderValue::from_static("s3cret"));
        assert!(gate.check(&headers).is_ok());
    }

    #[test]
    fn constant_time_compare_matches_equality() {
        assert!(constant_time_eq_str("abc", "abc"));
        assert!(!constant_time_eq_str("abc", "abd"));
        assert!(!constant_time_eq_str("abc", "abcd"));
    }
}
