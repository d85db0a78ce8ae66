// crates/mcp-hub-mcp/src/server.rs
// ============================================================================
// Module: MCP Hub Server
// Description: Hub assembly from configuration and the HTTP router.
// Purpose: Wire stores, providers, dispatch, sessions, and transports.
// Dependencies: axum, mcp-hub-config, mcp-hub-providers, mcp-hub-store-sqlite, tokio
// ============================================================================

//! ## Overview
//! [`McpHub::from_config`] validates configuration, opens the token and usage
//! stores, mounts enabled providers, and builds the immutable tool registry.
//! [`McpHub::router`] exposes both MCP transports, the introspection routes,
//! and each provider's authorization routes. The shared-secret gate covers
//! everything except provider authorization routes, which receive browser
//! redirects that cannot carry the header.

use std::io;
use std::io::Write;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use mcp_hub_config::HubConfig;
use mcp_hub_config::StoreConfig;
use mcp_hub_config::StoreType;
use mcp_hub_core::AuthRoutes;
use mcp_hub_core::InMemoryTokenStore;
use mcp_hub_core::InMemoryUsageRecorder;
use mcp_hub_core::Provider;
use mcp_hub_core::ProviderDeps;
use mcp_hub_core::SharedTokenStore;
use mcp_hub_core::SharedUsageRecorder;
use mcp_hub_core::UsageRecorder;
use mcp_hub_core::run_blocking;
use mcp_hub_core::time::rfc3339_now;
use mcp_hub_providers::build_providers;
use mcp_hub_store_sqlite::open_stores;
use serde_json::json;

use crate::audit::HubAuditSink;
use crate::audit::audit_sink_from_config;
use crate::auth::SharedSecretGate;
use crate::auth::require_shared_secret;
use crate::dispatch::Dispatcher;
use crate::dispatch::ToolRegistry;
use crate::error::McpServerError;
use crate::sessions::SessionRegistry;
use crate::transport::sse;
use crate::transport::streamable;

// ============================================================================
// SECTION: State
// ============================================================================

/// Configured endpoint paths.
#[derive(Debug, Clone)]
pub struct HubPaths {
    /// Streaming transport endpoint.
    pub mcp: String,
    /// Push-stream downstream endpoint.
    pub sse: String,
    /// Push-stream message endpoint.
    pub messages: String,
}

/// State shared by every route.
pub struct HubState {
    /// Tool dispatcher.
    pub dispatcher: Dispatcher,
    /// Live sessions.
    pub sessions: SessionRegistry,
    /// Audit sink.
    pub audit: Arc<dyn HubAuditSink>,
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
    /// Endpoint paths.
    pub paths: HubPaths,
}

/// Token and usage stores selected by configuration.
#[derive(Clone)]
pub struct HubStores {
    /// Credential store.
    pub tokens: SharedTokenStore,
    /// Usage log.
    pub usage: SharedUsageRecorder,
}

impl HubStores {
    /// In-memory stores.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            tokens: SharedTokenStore::from_store(InMemoryTokenStore::new()),
            usage: SharedUsageRecorder::from_recorder(InMemoryUsageRecorder::new()),
        }
    }
}

/// Opens the stores selected by configuration.
///
/// # Errors
///
/// Returns [`McpServerError`] when the sqlite database cannot be opened.
pub fn build_stores(config: &StoreConfig) -> Result<HubStores, McpServerError> {
    match config.store_type {
        StoreType::Memory => Ok(HubStores::in_memory()),
        StoreType::Sqlite => {
            let sqlite = config.sqlite_config().ok_or_else(|| {
                McpServerError::Config("sqlite store requires store.path".to_string())
            })?;
            let (tokens, usage) =
                open_stores(&sqlite).map_err(|err| McpServerError::Init(err.to_string()))?;
            Ok(HubStores {
                tokens: SharedTokenStore::from_store(tokens),
                usage: SharedUsageRecorder::from_recorder(usage),
            })
        }
    }
}

// ============================================================================
// SECTION: Hub
// ============================================================================

/// Assembled hub.
pub struct McpHub {
    /// Validated configuration.
    config: HubConfig,
    /// Shared route state.
    state: Arc<HubState>,
    /// Shared-secret gate.
    gate: Arc<SharedSecretGate>,
    /// Provider authorization route mounts.
    auth_routes: Vec<AuthRoutes>,
}

impl McpHub {
    /// Builds a hub from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when validation, store, audit, or provider
    /// initialization fails.
    pub fn from_config(config: HubConfig) -> Result<Self, McpServerError> {
        config.validate().map_err(|err| McpServerError::Config(err.to_string()))?;
        let stores = build_stores(&config.store)?;
        let audit = audit_sink_from_config(&config.audit)
            .map_err(|err| McpServerError::Init(format!("audit log: {err}")))?;
        let deps = ProviderDeps::new(stores.tokens.clone());
        let providers = build_providers(&config.providers, &deps)
            .map_err(|err| McpServerError::Init(err.to_string()))?;
        let hub = Self::from_parts(config, &stores, &providers, audit)?;
        emit_unauthenticated_warning(&hub);
        Ok(hub)
    }

    /// Builds a hub from already-constructed parts.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when a tool schema or the secret header
    /// name is invalid.
    pub fn from_parts(
        config: HubConfig,
        stores: &HubStores,
        providers: &[Provider],
        audit: Arc<dyn HubAuditSink>,
    ) -> Result<Self, McpServerError> {
        let registry = ToolRegistry::from_providers(providers)
            .map_err(|err| McpServerError::Init(err.to_string()))?;
        let header = HeaderName::try_from(config.server.shared_secret_header.as_str())
            .map_err(|_| McpServerError::Config("invalid shared secret header".to_string()))?;
        let gate = Arc::new(SharedSecretGate::new(
            header,
            config.server.effective_shared_secret().map(str::to_string),
            Arc::clone(&audit),
        ));
        let state = Arc::new(HubState {
            dispatcher: Dispatcher::new(
                Arc::new(registry),
                stores.usage.clone(),
                Arc::clone(&audit),
            ),
            sessions: SessionRegistry::new(),
            audit,
            max_body_bytes: config.server.max_body_bytes,
            paths: HubPaths {
                mcp: config.server.mcp_path.clone(),
                sse: config.server.sse_path.clone(),
                messages: config.server.messages_path.clone(),
            },
        });
        let auth_routes =
            providers.iter().filter_map(|provider| provider.auth_routes.clone()).collect();
        Ok(Self {
            config,
            state,
            gate,
            auth_routes,
        })
    }

    /// Shared route state.
    #[must_use]
    pub const fn state(&self) -> &Arc<HubState> {
        &self.state
    }

    /// Builds the HTTP router.
    #[must_use]
    pub fn router(&self) -> Router {
        let paths = &self.state.paths;
        let gated = Router::new()
            .route(
                &paths.mcp,
                post(streamable::handle_post)
                    .get(streamable::handle_get)
                    .delete(streamable::handle_delete),
            )
            .route(&paths.sse, get(sse::handle_open))
            .route(&paths.messages, post(sse::handle_message))
            .route("/providers", get(handle_providers))
            .route("/health", get(handle_health))
            .route("/usage", get(handle_usage))
            .with_state(Arc::clone(&self.state))
            .layer(middleware::from_fn_with_state(Arc::clone(&self.gate), require_shared_secret));
        self.auth_routes.iter().fold(gated, |router, mount| mount(router))
    }

    /// Binds the configured address and serves until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), McpServerError> {
        let addr =
            self.config.server.bind_addr().map_err(|err| McpServerError::Config(err.to_string()))?;
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| McpServerError::Transport(format!("http bind failed: {err}")))?;
        let _ = writeln!(
            io::stderr(),
            "mcp-hub: listening on {addr} (tools: {})",
            self.state.dispatcher.registry().tool_names().join(", ")
        );
        axum::serve(listener, app)
            .await
            .map_err(|err| McpServerError::Transport(format!("http server failed: {err}")))
    }
}

/// Warns when the hub accepts unauthenticated requests.
fn emit_unauthenticated_warning(hub: &McpHub) {
    if !hub.gate.is_enabled() {
        let _ = writeln!(
            io::stderr(),
            "mcp-hub: WARNING: no shared secret configured; every route accepts \
             unauthenticated requests. Set server.shared_secret or MCP_HUB_SHARED_SECRET."
        );
    }
}

// ============================================================================
// SECTION: Introspection Routes
// ============================================================================

/// Handles `GET /providers`.
async fn handle_providers(State(state): State<Arc<HubState>>) -> Response {
    let registry = state.dispatcher.registry();
    Json(json!({
        "providers": registry.provider_names(),
        "tools": registry.tool_names(),
    }))
    .into_response()
}

/// Handles `GET /health`.
async fn handle_health() -> Response {
    Json(json!({ "ok": true, "mcp": true, "time": rfc3339_now() })).into_response()
}

/// Handles `GET /usage`.
async fn handle_usage(State(state): State<Arc<HubState>>) -> Response {
    match run_blocking(|| state.dispatcher.usage().stats()) {
        Ok(stats) => Json(stats).into_response(),
        Err(err) => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": err.to_string() })))
                .into_response()
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions favor direct unwrap/expect for clarity."
    )]

    use mcp_hub_config::StoreConfig;
    use mcp_hub_config::StoreType;
    use mcp_hub_core::UsageRecorder;

    use super::build_stores;

    #[test]
    fn sqlite_store_requires_a_path() {
        let config = StoreConfig {
            store_type: StoreType::Sqlite,
            path: None,
            ..StoreConfig::default()
        };
        assert!(build_stores(&config).is_err());
    }

    #[test]
    fn sqlite_stores_open_under_a_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            store_type: StoreType::Sqlite,
            path: Some(dir.path().join("hub.db").to_string_lossy().into_owned()),
            ..StoreConfig::default()
        };
        let stores = build_stores(&config).unwrap();
        assert_eq!(stores.usage.stats().unwrap().total, 0);
    }
}
