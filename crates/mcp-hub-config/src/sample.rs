// crates/mcp-hub-config/src/sample.rs
// ============================================================================
// Module: Sample Configuration
// Description: Canonical annotated mcp-hub.toml.
// Purpose: Give operators a starting file that always validates.
// Dependencies: none
// ============================================================================

//! Canonical annotated `mcp-hub.toml`.

/// Annotated sample configuration covering every section.
const SAMPLE: &str = r#"# mcp-hub configuration

[server]
bind = "127.0.0.1:8787"
max_body_bytes = 2097152
shared_secret_header = "x-mcp-key"
# shared_secret = "change-me"
mcp_path = "/mcp"
sse_path = "/sse"
messages_path = "/messages"

[store]
# "memory" keeps tokens and usage in process; "sqlite" persists them.
type = "memory"
# path = "data/mcp-hub.sqlite"
pool_size = 3
busy_timeout_ms = 5000

[audit]
enabled = true
# path = "mcp-hub-audit.jsonl"

[providers.echo]
enabled = false

[providers.notion]
enabled = true
# client_id = ""
# client_secret = ""
# redirect_uri = "http://127.0.0.1:8787/oauth/notion/callback"
# static_token = ""
api_base = "https://api.notion.com/v1"
timeout_ms = 15000

[providers.pinecone]
enabled = true
# api_key = ""
# index_host = "https://my-index.svc.us-east-1-aws.pinecone.io"
api_base = "https://api.pinecone.io"
timeout_ms = 15000

[providers.nova_memory]
enabled = true
base_url = "https://nova-memory.example.run.app"
timeout_ms = 15000
"#;

/// Returns the sample `mcp-hub.toml`.
#[must_use]
pub const fn config_toml_sample() -> &'static str {
    SAMPLE
}
