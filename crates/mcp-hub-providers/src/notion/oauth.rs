// crates/mcp-hub-providers/src/notion/oauth.rs
// ============================================================================
// Module: Notion OAuth Routes
// Description: Consent redirect and callback for Notion authorization.
// Purpose: Bootstrap token records outside the tool dispatch path.
// Dependencies: axum, base64, rand, mcp-hub-core
// ============================================================================

//! ## Overview
//! `GET /auth/notion` redirects to Notion's consent page with a random
//! `state`. `GET /oauth/notion/callback` checks the `state`, exchanges the
//! code, and upserts the record under the workspace id (or the default
//! subject). Issued states are kept in a small bounded queue.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use axum::Router;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use axum::routing::get;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use mcp_hub_config::NotionConfig;
use mcp_hub_config::non_blank;
use mcp_hub_core::AuthRoutes;
use mcp_hub_core::DEFAULT_SUBJECT;
use mcp_hub_core::SharedTokenStore;
use mcp_hub_core::TokenStore;
use mcp_hub_core::run_blocking;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::Deserialize;

use super::NotionTokenExchange;
use super::record_from_token_response;
use crate::upstream::arg_str;
use crate::upstream::join_url;

/// Route that starts the consent flow.
pub const START_PATH: &str = "/auth/notion";
/// Route Notion redirects back to.
pub const CALLBACK_PATH: &str = "/oauth/notion/callback";
/// Maximum outstanding `state` values.
const MAX_PENDING_STATES: usize = 64;

/// Query parameters on the callback.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    /// Authorization code.
    #[serde(default)]
    pub code: Option<String>,
    /// Echoed `state`.
    #[serde(default)]
    pub state: Option<String>,
}

/// Notion OAuth route handlers.
pub struct NotionOAuth {
    /// Static-token mode disables the flow.
    static_mode: bool,
    /// OAuth client id.
    client_id: Option<String>,
    /// Registered redirect URI.
    redirect_uri: Option<String>,
    /// API base for the consent URL.
    api_base: String,
    /// Token endpoint client.
    exchange: Option<Arc<NotionTokenExchange>>,
    /// Token store receiving authorized records.
    tokens: SharedTokenStore,
    /// Issued, unconsumed `state` values.
    pending: Mutex<VecDeque<String>>,
}

impl NotionOAuth {
    /// Creates the route handlers from configuration.
    #[must_use]
    pub fn new(
        config: &NotionConfig,
        exchange: Option<Arc<NotionTokenExchange>>,
        tokens: SharedTokenStore,
    ) -> Self {
        Self {
            static_mode: non_blank(config.static_token.as_deref()).is_some(),
            client_id: non_blank(config.client_id.as_deref()).map(str::to_string),
            redirect_uri: non_blank(config.redirect_uri.as_deref()).map(str::to_string),
            api_base: config.api_base.clone(),
            exchange,
            tokens,
            pending: Mutex::new(VecDeque::new()),
        }
    }

    /// Wraps the handlers into a route mount function.
    #[must_use]
    pub fn into_routes(self) -> AuthRoutes {
        let oauth = Arc::new(self);
        Arc::new(move |router: Router| {
            let start = Arc::clone(&oauth);
            let callback = Arc::clone(&oauth);
            router.route(START_PATH, get(move || std::future::ready(start.start()))).route(
                CALLBACK_PATH,
                get(move |Query(params): Query<CallbackParams>| {
                    let callback = Arc::clone(&callback);
                    async move { callback.callback(params).await }
                }),
            )
        })
    }

    /// Handles `GET /auth/notion`.
    fn start(&self) -> Response {
        if self.static_mode {
            return (StatusCode::OK, "Static token mode enabled; OAuth not required.")
                .into_response();
        }
        let (Some(client_id), Some(redirect_uri)) = (&self.client_id, &self.redirect_uri) else {
            return (StatusCode::BAD_REQUEST, "Set NOTION_CLIENT_ID and NOTION_REDIRECT_URI")
                .into_response();
        };
        let mut url = match join_url(&self.api_base, &["oauth", "authorize"]) {
            Ok(url) => url,
            Err(err) => return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
        };
        let state = self.issue_state();
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("response_type", "code")
            .append_pair("owner", "user")
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("state", &state);
        Redirect::to(url.as_str()).into_response()
    }

    /// Handles `GET /oauth/notion/callback`.
    async fn callback(&self, params: CallbackParams) -> Response {
        let Some(code) = params.code.filter(|code| !code.is_empty()) else {
            return (StatusCode::BAD_REQUEST, "Missing code").into_response();
        };
        if !self.consume_state(params.state.as_deref()) {
            return (StatusCode::BAD_REQUEST, "Invalid or expired state").into_response();
        }
        let (Some(exchange), Some(redirect_uri)) = (&self.exchange, &self.redirect_uri) else {
            return (StatusCode::BAD_REQUEST, "Set NOTION_CLIENT_ID and NOTION_REDIRECT_URI")
                .into_response();
        };
        let outcome = async {
            let response = exchange.exchange_code(&code, redirect_uri).await?;
            let subject = arg_str(&response, "workspace_id").unwrap_or(DEFAULT_SUBJECT);
            let record = record_from_token_response(&response, subject, None)?;
            run_blocking(|| self.tokens.upsert_token(record))?;
            Ok::<_, mcp_hub_core::ToolError>(())
        }
        .await;
        match outcome {
            Ok(()) => (StatusCode::OK, "Notion authorized. You can close this tab.").into_response(),
            Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Notion OAuth failed: {err}"))
                .into_response(),
        }
    }

    /// Issues and remembers a random `state` value.
    fn issue_state(&self) -> String {
        let mut bytes = [0_u8; 16];
        OsRng.fill_bytes(&mut bytes);
        let state = URL_SAFE_NO_PAD.encode(bytes);
        if let Ok(mut pending) = self.pending.lock() {
            if pending.len() >= MAX_PENDING_STATES {
                pending.pop_front();
            }
            pending.push_back(state.clone());
        }
        state
    }

    /// Removes `state` from the pending set; true when it was issued.
    fn consume_state(&self, state: Option<&str>) -> bool {
        let Some(state) = state else {
            return false;
        };
        let Ok(mut pending) = self.pending.lock() else {
            return false;
        };
        pending.iter().position(|issued| issued == state).is_some_and(|index| {
            pending.remove(index);
            true
        })
    }
}
