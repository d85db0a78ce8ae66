// crates/mcp-hub-providers/src/notion.rs
// ============================================================================
// Module: Notion Provider
// Description: Notion workspace tools over OAuth or a static token.
// Purpose: Search, read, query, and create Notion content for agents.
// Dependencies: mcp-hub-core, mcp-hub-config, reqwest, serde_json
// ============================================================================

//! ## Overview
//! Every Notion tool goes through the credential broker: a configured static
//! integration token is used as-is; otherwise the token stored for the
//! caller's subject is used and refreshed once on a `401`. Refresh and the
//! OAuth code exchange share [`NotionTokenExchange`], which posts to
//! `<api_base>/oauth/token` with HTTP basic authentication built from the
//! client id and secret.

pub mod oauth;

use std::sync::Arc;

use async_trait::async_trait;
use mcp_hub_config::NotionConfig;
use mcp_hub_config::non_blank;
use mcp_hub_core::CredentialBroker;
use mcp_hub_core::FieldSpec;
use mcp_hub_core::FieldType;
use mcp_hub_core::Provider;
use mcp_hub_core::ProviderDeps;
use mcp_hub_core::TokenRecord;
use mcp_hub_core::TokenRefresher;
use mcp_hub_core::ToolDescriptor;
use mcp_hub_core::ToolError;
use mcp_hub_core::ToolHandler;
use mcp_hub_core::ToolOutput;
use mcp_hub_core::ToolSchema;
use mcp_hub_core::UpstreamFailure;
use mcp_hub_core::time::unix_millis;
use reqwest::Method;
use serde_json::Value;
use serde_json::json;

use crate::upstream::UpstreamAuth;
use crate::upstream::UpstreamClient;
use crate::upstream::UpstreamRequest;
use crate::upstream::arg_str;
use crate::upstream::join_url;
use crate::upstream::pick;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Provider name.
pub const NAME: &str = "notion";
/// Notion API version header value.
pub const NOTION_VERSION: &str = "2022-06-28";
/// Metadata keys carried over from token responses.
const METADATA_KEYS: [&str; 3] = ["workspace_id", "workspace_name", "bot_id"];

// ============================================================================
// SECTION: Token Exchange
// ============================================================================

/// Client for Notion's `/oauth/token` endpoint.
#[derive(Debug, Clone)]
pub struct NotionTokenExchange {
    /// Upstream client.
    client: UpstreamClient,
    /// API base URL.
    api_base: String,
    /// OAuth client id.
    client_id: String,
    /// OAuth client secret.
    client_secret: String,
}

impl NotionTokenExchange {
    /// Posts a grant to the token endpoint and returns the response JSON.
    async fn exchange(&self, grant: Value) -> Result<Value, ToolError> {
        let url = join_url(&self.api_base, &["oauth", "token"])?;
        let request = UpstreamRequest::post(url, grant).auth(UpstreamAuth::Basic {
            user: self.client_id.clone(),
            password: self.client_secret.clone(),
        });
        self.client.execute(request).await.map_err(|failure| match failure {
            UpstreamFailure::Auth {
                status,
                body,
            }
            | UpstreamFailure::Http {
                status,
                body,
            } => ToolError::RefreshFailed(format!("notion token exchange failed ({status}): {body}")),
            UpstreamFailure::Transport(message) => ToolError::RefreshFailed(message),
        })
    }

    /// Exchanges an authorization code for a token response.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::RefreshFailed`] when Notion rejects the exchange.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<Value, ToolError> {
        self.exchange(json!({
            "grant_type": "authorization_code",
            "code": code,
            "redirect_uri": redirect_uri,
        }))
        .await
    }
}

#[async_trait]
impl TokenRefresher for NotionTokenExchange {
    async fn refresh(&self, current: &TokenRecord) -> Result<TokenRecord, ToolError> {
        let refresh_token = current
            .refresh_token
            .as_deref()
            .ok_or_else(|| ToolError::RefreshFailed("no refresh token on record".to_string()))?;
        let response = self
            .exchange(json!({ "grant_type": "refresh_token", "refresh_token": refresh_token }))
            .await?;
        record_from_token_response(&response, &current.subject, Some(current))
    }
}

/// Builds a token record from a Notion token response.
///
/// Fields absent from the response fall back to `prior`. `expires_in`
/// (seconds) is turned into an absolute expiry.
///
/// # Errors
///
/// Returns [`ToolError::RefreshFailed`] when the response has no access token.
pub fn record_from_token_response(
    response: &Value,
    subject: &str,
    prior: Option<&TokenRecord>,
) -> Result<TokenRecord, ToolError> {
    let access_token = arg_str(response, "access_token").ok_or_else(|| {
        ToolError::RefreshFailed(format!("token response missing access_token: {response}"))
    })?;
    let mut record = TokenRecord::new(NAME, subject, access_token);
    record.refresh_token = arg_str(response, "refresh_token")
        .map(str::to_string)
        .or_else(|| prior.and_then(|prior| prior.refresh_token.clone()));
    record.scope = match response.get("scope") {
        Some(Value::Array(items)) => {
            Some(items.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(" "))
        }
        Some(Value::String(scope)) if !scope.is_empty() => Some(scope.clone()),
        _ => prior.and_then(|prior| prior.scope.clone()),
    };
    let mut metadata = serde_json::Map::new();
    for key in METADATA_KEYS {
        let value = response
            .get(key)
            .filter(|value| !value.is_null())
            .or_else(|| prior.and_then(|prior| prior.metadata.get(key)))
            .cloned();
        if let Some(value) = value {
            metadata.insert(key.to_string(), value);
        }
    }
    record.metadata = Value::Object(metadata);
    record.expires_at_ms = response
        .get("expires_in")
        .and_then(Value::as_i64)
        .map(|seconds| unix_millis().saturating_add(seconds.saturating_mul(1_000)))
        .or_else(|| prior.and_then(|prior| prior.expires_at_ms));
    record.raw = Some(response.clone());
    Ok(record)
}

// ============================================================================
// SECTION: Tools
// ============================================================================

/// Shared Notion API access for every tool.
struct NotionApi {
    /// Upstream client.
    client: UpstreamClient,
    /// API base URL.
    api_base: String,
    /// Credential broker.
    broker: CredentialBroker,
}

/// Notion tool operations.
#[derive(Debug, Clone, Copy)]
enum NotionOp {
    /// `GET users/me`.
    GetSelf,
    /// `POST search`.
    Search,
    /// `GET pages/{id}`.
    FetchPage,
    /// `POST databases/{id}/query`.
    QueryDatabase,
    /// `POST pages`.
    CreatePage,
}

/// Handler for one Notion operation.
struct NotionTool {
    /// Shared API access.
    api: Arc<NotionApi>,
    /// Operation to run.
    op: NotionOp,
}

#[async_trait]
impl ToolHandler for NotionTool {
    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let id = |name: &str| {
            arg_str(&args, name)
                .map(str::to_string)
                .ok_or_else(|| ToolError::InvalidArguments(format!("{name} is required")))
        };
        let (method, segments, body, label) = match self.op {
            NotionOp::GetSelf => {
                (Method::GET, vec!["users".to_string(), "me".to_string()], None, "getSelf failed")
            }
            NotionOp::Search => (
                Method::POST,
                vec!["search".to_string()],
                Some(pick(&args, &["query", "page_size", "filter", "sort", "start_cursor"])),
                "search failed",
            ),
            NotionOp::FetchPage => {
                (Method::GET, vec!["pages".to_string(), id("page_id")?], None, "fetchPage failed")
            }
            NotionOp::QueryDatabase => (
                Method::POST,
                vec!["databases".to_string(), id("database_id")?, "query".to_string()],
                Some(pick(&args, &["page_size", "filter", "sorts", "start_cursor"])),
                "queryDatabase failed",
            ),
            NotionOp::CreatePage => (
                Method::POST,
                vec!["pages".to_string()],
                Some(pick(&args, &["parent", "properties", "children"])),
                "createPage failed",
            ),
        };
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
        let url = join_url(&self.api.api_base, &segments)?;
        let subject = arg_str(&args, "subject");
        let response = self
            .api
            .broker
            .call_with_refresh(subject, label, |token| {
                let mut request = UpstreamRequest::new(method.clone(), url.clone())
                    .auth(UpstreamAuth::Bearer(token))
                    .header("Notion-Version", NOTION_VERSION);
                if let Some(body) = &body {
                    request = request.json(body.clone());
                }
                self.api.client.execute(request)
            })
            .await?;
        Ok(ToolOutput::pretty_json(&response))
    }
}

/// Schema with the optional `subject` field every Notion tool accepts.
fn subject_schema() -> ToolSchema {
    ToolSchema::new()
        .field(FieldSpec::string("subject").describe("Workspace subject; defaults to \"default\""))
}

/// Page-size field shared by search and database queries.
fn page_size() -> FieldSpec {
    FieldSpec::integer("page_size").range(1.0, 100.0).default_value(json!(25))
}

/// Builds the tool descriptors.
fn tools(api: &Arc<NotionApi>) -> Vec<ToolDescriptor> {
    let tool = |name: &str, title: &str, description: &str, schema: ToolSchema, op: NotionOp| {
        ToolDescriptor::new(
            name,
            title,
            description,
            schema,
            Arc::new(NotionTool {
                api: Arc::clone(api),
                op,
            }),
        )
    };
    vec![
        tool(
            "notion.getSelf",
            "Notion: Get Bot User",
            "Returns the bot user and workspace for the current token",
            subject_schema(),
            NotionOp::GetSelf,
        ),
        tool(
            "notion.search",
            "Notion: Search",
            "Search your Notion workspace",
            subject_schema()
                .field(FieldSpec::string("query").default_value(json!("")))
                .field(FieldSpec::new("filter", FieldType::Any))
                .field(FieldSpec::new("sort", FieldType::Any))
                .field(FieldSpec::string("start_cursor"))
                .field(page_size()),
            NotionOp::Search,
        ),
        tool(
            "notion.fetchPage",
            "Notion: Fetch Page",
            "Fetch page metadata by ID",
            subject_schema().field(FieldSpec::string("page_id").required()),
            NotionOp::FetchPage,
        ),
        tool(
            "notion.queryDatabase",
            "Notion: Query Database",
            "Query a database with optional filter/sort",
            subject_schema()
                .field(FieldSpec::string("database_id").required())
                .field(FieldSpec::new("filter", FieldType::Any))
                .field(FieldSpec::new("sorts", FieldType::Any))
                .field(FieldSpec::string("start_cursor"))
                .field(page_size()),
            NotionOp::QueryDatabase,
        ),
        tool(
            "notion.createPage",
            "Notion: Create Page",
            "Create a new page (supply a parent and properties)",
            subject_schema()
                .field(FieldSpec::new("parent", FieldType::Any).required())
                .field(FieldSpec::object("properties").required())
                .field(FieldSpec::new("children", FieldType::array(FieldType::Any))),
            NotionOp::CreatePage,
        ),
    ]
}

// ============================================================================
// SECTION: Factory
// ============================================================================

/// Builds the Notion provider.
///
/// # Errors
///
/// Returns [`ToolError::Internal`] when the HTTP client cannot be built.
pub fn provider(deps: &ProviderDeps, config: &NotionConfig) -> Result<Provider, ToolError> {
    let client = UpstreamClient::new(config.timeout_ms, &deps.user_agent)?;
    let exchange = non_blank(config.client_id.as_deref()).map(|client_id| {
        Arc::new(NotionTokenExchange {
            client: client.clone(),
            api_base: config.api_base.clone(),
            client_id: client_id.to_string(),
            client_secret: non_blank(config.client_secret.as_deref())
                .unwrap_or_default()
                .to_string(),
        })
    });
    let mut broker = CredentialBroker::new(NAME, deps.tokens.clone())
        .with_static_credential(config.static_token.clone())
        .with_authorize_hint("Visit /auth/notion or set NOTION_STATIC_TOKEN");
    if let Some(exchange) = &exchange {
        broker = broker.with_refresher(exchange.clone());
    }
    let api = Arc::new(NotionApi {
        client,
        api_base: config.api_base.clone(),
        broker,
    });
    let routes = oauth::NotionOAuth::new(config, exchange, deps.tokens.clone()).into_routes();
    Ok(Provider::new(NAME, tools(&api)).with_auth_routes(routes))
}
