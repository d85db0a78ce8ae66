// crates/mcp-hub-providers/src/pinecone.rs
// ============================================================================
// Module: Pinecone Provider
// Description: Vector upsert/query, index description, and assistant chat.
// Purpose: Expose Pinecone data-plane and assistant calls as tools.
// Dependencies: mcp-hub-core, mcp-hub-config, reqwest, serde_json
// ============================================================================

//! ## Overview
//! Pinecone authenticates with an `Api-Key` header. A per-call `api_key`
//! argument wins; otherwise the broker supplies the configured key, falling
//! back to a key stored under the caller's subject. Pinecone issues no
//! refresh credential, so a `401` is terminal.
//!
//! Data-plane calls go to the index host (`index_host` argument or the
//! configured default, trailing slashes trimmed); control-plane and assistant
//! calls go to `api_base`.

use std::sync::Arc;

use async_trait::async_trait;
use mcp_hub_config::PineconeConfig;
use mcp_hub_config::non_blank;
use mcp_hub_core::CredentialBroker;
use mcp_hub_core::FieldSpec;
use mcp_hub_core::FieldType;
use mcp_hub_core::Provider;
use mcp_hub_core::ProviderDeps;
use mcp_hub_core::ToolDescriptor;
use mcp_hub_core::ToolError;
use mcp_hub_core::ToolHandler;
use mcp_hub_core::ToolOutput;
use mcp_hub_core::ToolSchema;
use reqwest::Method;
use serde_json::Value;
use serde_json::json;

use crate::upstream::UpstreamAuth;
use crate::upstream::UpstreamClient;
use crate::upstream::UpstreamRequest;
use crate::upstream::arg_str;
use crate::upstream::join_url;
use crate::upstream::pick;

/// Provider name.
pub const NAME: &str = "pinecone";
/// Header carrying the API key.
const API_KEY_HEADER: &str = "Api-Key";

/// Shared Pinecone access for every tool.
struct PineconeApi {
    /// Upstream client.
    client: UpstreamClient,
    /// Control-plane and assistant base URL.
    api_base: String,
    /// Default index host.
    default_index_host: Option<String>,
    /// Credential broker for the API key.
    broker: CredentialBroker,
}

impl PineconeApi {
    /// Resolves the index host, trimming trailing slashes.
    fn index_host(&self, args: &Value) -> Result<String, ToolError> {
        arg_str(args, "index_host")
            .or(self.default_index_host.as_deref())
            .map(|host| host.trim_end_matches('/').to_string())
            .ok_or_else(|| {
                ToolError::InvalidArguments(
                    "index_host required (set PINECONE_INDEX_HOST or pass index_host)".to_string(),
                )
            })
    }

    /// Sends a request with the per-call key or the brokered key.
    async fn send(
        &self,
        args: &Value,
        method: Method,
        url: url::Url,
        body: Option<Value>,
        label: &str,
    ) -> Result<Value, ToolError> {
        let build = |key: String| {
            let request = UpstreamRequest::new(method.clone(), url.clone())
                .auth(UpstreamAuth::Header(API_KEY_HEADER, key));
            match &body {
                Some(body) => request.json(body.clone()),
                None => request,
            }
        };
        if let Some(key) = arg_str(args, "api_key") {
            return self
                .client
                .execute(build(key.to_string()))
                .await
                .map_err(|failure| failure.into_tool_error(label));
        }
        let subject = arg_str(args, "subject");
        self.broker
            .call_with_refresh(subject, label, |key| self.client.execute(build(key)))
            .await
    }
}

/// Pinecone tool operations.
#[derive(Debug, Clone, Copy)]
enum PineconeOp {
    /// `POST {host}/vectors/upsert`.
    Upsert,
    /// `POST {host}/query`.
    Query,
    /// `GET {api_base}/indexes/{name}`.
    DescribeIndex,
    /// `POST {api_base}/chat/{assistant}`.
    AssistantChat,
}

/// Handler for one Pinecone operation.
struct PineconeTool {
    /// Shared API access.
    api: Arc<PineconeApi>,
    /// Operation to run.
    op: PineconeOp,
}

#[async_trait]
impl ToolHandler for PineconeTool {
    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let api = &self.api;
        let response = match self.op {
            PineconeOp::Upsert => {
                let url = join_url(&api.index_host(&args)?, &["vectors", "upsert"])?;
                let body = pick(&args, &["vectors", "namespace"]);
                api.send(&args, Method::POST, url, Some(body), "upsert failed").await?
            }
            PineconeOp::Query => {
                let url = join_url(&api.index_host(&args)?, &["query"])?;
                let body = pick(
                    &args,
                    &["topK", "vector", "id", "namespace", "filter", "includeValues", "includeMetadata"],
                );
                api.send(&args, Method::POST, url, Some(body), "query failed").await?
            }
            PineconeOp::DescribeIndex => {
                let name = required(&args, "index_name")?;
                let url = join_url(&api.api_base, &["indexes", name])?;
                api.send(&args, Method::GET, url, None, "describeIndex failed").await?
            }
            PineconeOp::AssistantChat => {
                let name = required(&args, "assistant_name")?;
                let url = join_url(&api.api_base, &["chat", name])?;
                let messages = normalize_messages(args.get("messages"));
                api.send(&args, Method::POST, url, Some(json!({ "messages": messages })), "assistant.chat failed")
                    .await?
            }
        };
        Ok(ToolOutput::pretty_json(&response))
    }
}

/// Returns a required string argument.
fn required<'a>(args: &'a Value, name: &str) -> Result<&'a str, ToolError> {
    arg_str(args, name).ok_or_else(|| ToolError::InvalidArguments(format!("{name} is required")))
}

/// Applies the `role = "user"` default to chat messages.
fn normalize_messages(messages: Option<&Value>) -> Value {
    let Some(Value::Array(items)) = messages else {
        return Value::Array(Vec::new());
    };
    Value::Array(
        items
            .iter()
            .map(|item| {
                let mut item = item.clone();
                if let Value::Object(map) = &mut item
                    && !map.get("role").is_some_and(Value::is_string)
                {
                    map.insert("role".to_string(), json!("user"));
                }
                item
            })
            .collect(),
    )
}

/// Schema fields shared by every Pinecone tool.
fn base_schema() -> ToolSchema {
    ToolSchema::new()
        .field(FieldSpec::string("api_key").describe("Overrides the configured API key"))
        .field(FieldSpec::string("subject").describe("Subject whose stored key to use"))
}

/// Builds the tool descriptors.
fn tools(api: &Arc<PineconeApi>) -> Vec<ToolDescriptor> {
    let tool = |name: &str, title: &str, description: &str, schema: ToolSchema, op: PineconeOp| {
        ToolDescriptor::new(
            name,
            title,
            description,
            schema,
            Arc::new(PineconeTool {
                api: Arc::clone(api),
                op,
            }),
        )
    };
    vec![
        tool(
            "pinecone.upsert",
            "Pinecone: Upsert Vectors",
            "Write vectors (id, values, metadata?) into a namespace at an index host",
            base_schema()
                .field(FieldSpec::string("index_host").url())
                .field(FieldSpec::string("namespace"))
                .field(FieldSpec::new("vectors", FieldType::array(FieldType::Object)).required()),
            PineconeOp::Upsert,
        ),
        tool(
            "pinecone.query",
            "Pinecone: Query",
            "Search a namespace using a query vector or by record id",
            base_schema()
                .field(FieldSpec::string("index_host").url())
                .field(FieldSpec::string("namespace"))
                .field(FieldSpec::new("vector", FieldType::array(FieldType::Number)))
                .field(FieldSpec::string("id"))
                .field(FieldSpec::integer("topK").range(1.0, 100.0).default_value(json!(10)))
                .field(FieldSpec::object("filter"))
                .field(FieldSpec::boolean("includeValues"))
                .field(FieldSpec::boolean("includeMetadata"))
                .require_one_of(&["vector", "id"]),
            PineconeOp::Query,
        ),
        tool(
            "pinecone.describeIndex",
            "Pinecone: Describe Index",
            "Describe an index by name via control-plane (returns host, dimension, status, etc.)",
            base_schema().field(FieldSpec::string("index_name").required()),
            PineconeOp::DescribeIndex,
        ),
        tool(
            "pineconeAssistant.chat",
            "Pinecone Assistant: Chat",
            "Chat with a Pinecone Assistant by name. Returns message + optional citations.",
            base_schema()
                .field(FieldSpec::string("assistant_name").required())
                .field(
                    FieldSpec::new("messages", FieldType::array(FieldType::Object))
                        .required()
                        .min_length(1),
                ),
            PineconeOp::AssistantChat,
        ),
    ]
}

/// Builds the Pinecone provider.
///
/// # Errors
///
/// Returns [`ToolError::Internal`] when the HTTP client cannot be built.
pub fn provider(deps: &ProviderDeps, config: &PineconeConfig) -> Result<Provider, ToolError> {
    let client = UpstreamClient::new(config.timeout_ms, &deps.user_agent)?;
    let broker = CredentialBroker::new(NAME, deps.tokens.clone())
        .with_static_credential(config.api_key.clone())
        .with_authorize_hint("Set PINECONE_API_KEY or pass api_key");
    let api = Arc::new(PineconeApi {
        client,
        api_base: config.api_base.clone(),
        default_index_host: non_blank(config.index_host.as_deref()).map(str::to_string),
        broker,
    });
    Ok(Provider::new(NAME, tools(&api)))
}
