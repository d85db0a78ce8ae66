// crates/mcp-hub-providers/src/nova_memory.rs
// ============================================================================
// Module: Nova Memory Provider
// Description: Proxy tools for the Nova Memory HTTP service.
// Purpose: Forward memory store/search/fetch/delete/stats calls.
// Dependencies: mcp-hub-core, mcp-hub-config, serde_json
// ============================================================================

//! ## Overview
//! Every tool forwards its validated arguments (defaults applied) as the JSON
//! body of an unauthenticated `POST` to `{base_url}/<endpoint>` and returns
//! the response pretty-printed.

use std::sync::Arc;

use async_trait::async_trait;
use mcp_hub_config::NovaMemoryConfig;
use mcp_hub_core::FieldSpec;
use mcp_hub_core::FieldType;
use mcp_hub_core::Provider;
use mcp_hub_core::ProviderDeps;
use mcp_hub_core::ToolDescriptor;
use mcp_hub_core::ToolError;
use mcp_hub_core::ToolHandler;
use mcp_hub_core::ToolOutput;
use mcp_hub_core::ToolSchema;
use serde_json::Value;
use serde_json::json;

use crate::upstream::UpstreamClient;
use crate::upstream::UpstreamRequest;
use crate::upstream::join_url;

/// Provider name.
pub const NAME: &str = "nova-memory";
/// Namespace applied when the caller omits one.
pub const DEFAULT_NAMESPACE: &str = "moneypenny";
/// Embedding dimension accepted by `novaMemory.search`.
pub const VECTOR_DIMENSION: usize = 1536;

/// Forwards arguments to one Nova Memory endpoint.
struct NovaTool {
    /// Upstream client.
    client: UpstreamClient,
    /// Service base URL.
    base_url: String,
    /// Endpoint path segment.
    endpoint: &'static str,
}

#[async_trait]
impl ToolHandler for NovaTool {
    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let url = join_url(&self.base_url, &[self.endpoint])?;
        let label = format!("{} failed", self.endpoint);
        let response = self
            .client
            .execute(UpstreamRequest::post(url, args))
            .await
            .map_err(|failure| failure.into_tool_error(&label))?;
        Ok(ToolOutput::pretty_json(&response))
    }
}

/// String or array of strings.
fn string_or_list() -> FieldType {
    FieldType::OneOf(vec![FieldType::String, FieldType::array(FieldType::String)])
}

/// Optional namespace with the default applied.
fn namespace() -> FieldSpec {
    FieldSpec::string("namespace").default_value(json!(DEFAULT_NAMESPACE))
}

/// Tool definitions as `(name, title, description, endpoint, schema)`.
fn definitions() -> Vec<(&'static str, &'static str, &'static str, &'static str, ToolSchema)> {
    vec![
        (
            "novaMemory.store",
            "Nova Memory: Store",
            "Store a memory record (text, type, tags) in a namespace",
            "storeMemory",
            ToolSchema::new()
                .field(FieldSpec::string("text").required().min_length(1))
                .field(namespace())
                .field(FieldSpec::string("type").required())
                .field(
                    FieldSpec::new("tags", FieldType::array(FieldType::String))
                        .required()
                        .min_length(1),
                )
                .field(FieldSpec::string("id")),
        ),
        (
            "novaMemory.search",
            "Nova Memory: Search",
            "Search memories by text query or embedding vector",
            "searchMemory",
            ToolSchema::new()
                .field(FieldSpec::string("query").min_length(2))
                .field(
                    FieldSpec::new("vector", FieldType::array(FieldType::Number))
                        .length(VECTOR_DIMENSION),
                )
                .field(namespace())
                .field(FieldSpec::integer("top_k").range(1.0, 100.0).default_value(json!(5)))
                .field(FieldSpec::number("min_score").range(0.0, 1.0).default_value(json!(0)))
                .field(FieldSpec::new("type", string_or_list()))
                .field(FieldSpec::new("tags", string_or_list()))
                .field(FieldSpec::new("exclude_types", FieldType::array(FieldType::String)))
                .field(FieldSpec::object("date_range"))
                .require_one_of(&["query", "vector"]),
        ),
        (
            "novaMemory.fetch",
            "Nova Memory: Fetch",
            "Fetch memory records by id",
            "fetchMemory",
            ToolSchema::new()
                .field(
                    FieldSpec::new("ids", FieldType::array(FieldType::String))
                        .required()
                        .min_length(1),
                )
                .field(namespace()),
        ),
        (
            "novaMemory.delete",
            "Nova Memory: Delete",
            "Delete memory records by id or metadata filter",
            "deleteMemory",
            ToolSchema::new()
                .field(FieldSpec::new("ids", FieldType::array(FieldType::String)))
                .field(FieldSpec::object("filter"))
                .field(namespace())
                .require_one_of(&["ids", "filter"]),
        ),
        (
            "novaMemory.stats",
            "Nova Memory: Stats",
            "Describe index statistics for a namespace",
            "describeStats",
            ToolSchema::new().field(namespace()).field(FieldSpec::object("filter")),
        ),
    ]
}

/// Builds the Nova Memory provider.
///
/// # Errors
///
/// Returns [`ToolError::Internal`] when the HTTP client cannot be built.
pub fn provider(deps: &ProviderDeps, config: &NovaMemoryConfig) -> Result<Provider, ToolError> {
    let client = UpstreamClient::new(config.timeout_ms, &deps.user_agent)?;
    let tools = definitions()
        .into_iter()
        .map(|(name, title, description, endpoint, schema)| {
            ToolDescriptor::new(
                name,
                title,
                description,
                schema,
                Arc::new(NovaTool {
                    client: client.clone(),
                    base_url: config.base_url.clone(),
                    endpoint,
                }),
            )
        })
        .collect();
    Ok(Provider::new(NAME, tools))
}
