// crates/mcp-hub-core/src/credentials.rs
// ============================================================================
// Module: Credential Broker
// Description: Credential resolution and the bounded token-refresh retry.
// Purpose: Implement the two-attempt upstream protocol once for all providers.
// Dependencies: async-trait, serde_json
// ============================================================================

//! ## Overview
//! [`CredentialBroker::call_with_refresh`] runs an upstream call with the
//! resolved access credential. When the call reports an authorization
//! failure and a refresh credential is on record, the broker performs exactly
//! one refresh exchange, persists the replacement record, and retries once.
//!
//! # Invariants
//! - At most two upstream calls and one refresh per invocation.
//! - A statically configured credential bypasses the token store and is never
//!   refreshed.
//! - A failed refresh is terminal for the invocation.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::blocking::run_blocking;
use crate::error::ToolError;
use crate::token::DEFAULT_SUBJECT;
use crate::token::SharedTokenStore;
use crate::token::TokenRecord;
use crate::token::TokenStore;

// ============================================================================
// SECTION: Upstream Failures
// ============================================================================

/// Failure reported by one upstream call.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamFailure {
    /// Upstream rejected the credential.
    Auth {
        /// HTTP status.
        status: u16,
        /// Response payload.
        body: Value,
    },
    /// Non-success or malformed response.
    Http {
        /// HTTP status.
        status: u16,
        /// Response payload.
        body: Value,
    },
    /// Connection, timeout, or decoding failure.
    Transport(String),
}

impl UpstreamFailure {
    /// Converts the failure into a tool error labelled with the operation.
    #[must_use]
    pub fn into_tool_error(self, label: &str) -> ToolError {
        match self {
            Self::Auth {
                status,
                body,
            } => ToolError::UpstreamAuth {
                message: label.to_string(),
                status,
                payload: body,
            },
            Self::Http {
                status,
                body,
            } => ToolError::Upstream {
                message: label.to_string(),
                status: Some(status),
                payload: body,
            },
            Self::Transport(message) => ToolError::Upstream {
                message: label.to_string(),
                status: None,
                payload: Value::String(message),
            },
        }
    }
}

// ============================================================================
// SECTION: Credentials
// ============================================================================

/// Credential resolved for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Credential {
    /// Statically configured credential.
    Static(String),
    /// Record loaded from the token store.
    Stored(TokenRecord),
}

impl Credential {
    /// Returns the access credential.
    #[must_use]
    pub fn access_token(&self) -> &str {
        match self {
            Self::Static(token) => token,
            Self::Stored(record) => &record.access_token,
        }
    }
}

/// Provider-specific refresh exchange.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Exchanges the record's refresh credential for a replacement record.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::RefreshFailed`] when the exchange is rejected.
    async fn refresh(&self, current: &TokenRecord) -> Result<TokenRecord, ToolError>;
}

// ============================================================================
// SECTION: Broker
// ============================================================================

/// Resolves credentials and runs upstream calls with one bounded refresh.
#[derive(Clone)]
pub struct CredentialBroker {
    /// Provider name used as the token store key.
    provider: String,
    /// Statically configured credential.
    static_credential: Option<String>,
    /// Shared token store.
    store: SharedTokenStore,
    /// Refresh exchange, when the provider supports one.
    refresher: Option<Arc<dyn TokenRefresher>>,
    /// Hint appended to "not connected" errors.
    authorize_hint: String,
}

impl fmt::Debug for CredentialBroker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBroker")
            .field("provider", &self.provider)
            .field("static_credential", &self.static_credential.is_some())
            .field("refresher", &self.refresher.is_some())
            .finish_non_exhaustive()
    }
}

impl CredentialBroker {
    /// Creates a broker reading from the token store.
    #[must_use]
    pub fn new(provider: impl Into<String>, store: SharedTokenStore) -> Self {
        Self {
            provider: provider.into(),
            static_credential: None,
            store,
            refresher: None,
            authorize_hint: String::new(),
        }
    }

    /// Uses a static credential; empty values are ignored.
    #[must_use]
    pub fn with_static_credential(mut self, credential: Option<String>) -> Self {
        self.static_credential = credential.filter(|value| !value.trim().is_empty());
        self
    }

    /// Installs the refresh exchange.
    #[must_use]
    pub fn with_refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Sets the hint shown when no credential is on record.
    #[must_use]
    pub fn with_authorize_hint(mut self, hint: impl Into<String>) -> Self {
        self.authorize_hint = hint.into();
        self
    }

    /// Returns the provider name.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Returns true when a static credential is configured.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.static_credential.is_some()
    }

    /// Returns the shared token store.
    #[must_use]
    pub const fn store(&self) -> &SharedTokenStore {
        &self.store
    }

    /// Resolves the credential for `subject` (default subject when absent).
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Credentials`] when no record exists and
    /// [`ToolError::Store`] when the store fails.
    pub fn resolve(&self, subject: Option<&str>) -> Result<Credential, ToolError> {
        if let Some(token) = &self.static_credential {
            return Ok(Credential::Static(token.clone()));
        }
        let subject = subject.unwrap_or(DEFAULT_SUBJECT);
        let record = run_blocking(|| self.store.get_token(&self.provider, subject))?;
        record.map(Credential::Stored).ok_or_else(|| {
            let mut message =
                format!("{} is not connected for subject \"{subject}\"", self.provider);
            if !self.authorize_hint.is_empty() {
                message.push_str(". ");
                message.push_str(&self.authorize_hint);
            }
            ToolError::Credentials(message)
        })
    }

    /// Runs `call` with the resolved access credential, refreshing once on an
    /// authorization failure.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure (labelled with `label`) when the call
    /// fails and no retry applies or the retry also fails; returns
    /// [`ToolError::RefreshFailed`] when the refresh exchange is rejected.
    pub async fn call_with_refresh<T, F, Fut>(
        &self,
        subject: Option<&str>,
        label: &str,
        call: F,
    ) -> Result<T, ToolError>
    where
        F: Fn(String) -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, UpstreamFailure>> + Send,
        T: Send,
    {
        let credential = self.resolve(subject)?;
        let failure = match call(credential.access_token().to_string()).await {
            Ok(value) => return Ok(value),
            Err(failure) => failure,
        };
        let refreshable = match (&failure, &credential, &self.refresher) {
            (
                UpstreamFailure::Auth {
                    ..
                },
                Credential::Stored(record),
                Some(refresher),
            ) if record.refresh_token.is_some() => Some((record, refresher)),
            _ => None,
        };
        let Some((record, refresher)) = refreshable else {
            return Err(failure.into_tool_error(label));
        };

        let replacement = refresher.refresh(record).await?;
        let stored = run_blocking(|| self.store.upsert_token(replacement))?;
        call(stored.access_token).await.map_err(|failure| failure.into_tool_error(label))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
