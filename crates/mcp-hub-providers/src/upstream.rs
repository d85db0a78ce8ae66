// crates/mcp-hub-providers/src/upstream.rs
// ============================================================================
// Module: Upstream HTTP Client
// Description: Shared JSON-over-HTTP helper for provider handlers.
// Purpose: Apply timeouts and size limits, and classify upstream failures.
// Dependencies: mcp-hub-core, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! [`UpstreamClient::execute`] sends one request and returns the decoded JSON
//! body for `2xx` responses. Failures are classified as
//! [`UpstreamFailure::Auth`] (`401`), [`UpstreamFailure::Http`] (any other
//! non-success status), or [`UpstreamFailure::Transport`]. Bodies that are
//! not JSON are wrapped as `{"raw": <text>}`; empty bodies decode to `null`.
//! Upstream responses are untrusted and size-limited.

use std::time::Duration;

use mcp_hub_core::ToolError;
use mcp_hub_core::UpstreamFailure;
use reqwest::Client;
use reqwest::Method;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde_json::Value;
use serde_json::json;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum upstream response size accepted.
pub const MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Credential attached to an upstream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamAuth {
    /// No credential.
    None,
    /// `Authorization: Bearer <token>`.
    Bearer(String),
    /// Credential in a named header.
    Header(&'static str, String),
    /// HTTP basic authentication.
    Basic {
        /// User name (client id).
        user: String,
        /// Password (client secret).
        password: String,
    },
}

/// One upstream JSON request.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: Url,
    /// Attached credential.
    pub auth: UpstreamAuth,
    /// Extra headers.
    pub headers: Vec<(&'static str, String)>,
    /// JSON body.
    pub body: Option<Value>,
}

impl UpstreamRequest {
    /// Creates a request without credential or body.
    #[must_use]
    pub const fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            auth: UpstreamAuth::None,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Creates a `GET` request.
    #[must_use]
    pub const fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Creates a `POST` request with a JSON body.
    #[must_use]
    pub fn post(url: Url, body: Value) -> Self {
        Self::new(Method::POST, url).json(body)
    }

    /// Attaches a credential.
    #[must_use]
    pub fn auth(mut self, auth: UpstreamAuth) -> Self {
        self.auth = auth;
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Shared upstream HTTP client.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    /// Underlying reqwest client.
    client: Client,
}

impl UpstreamClient {
    /// Builds a client with the given timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Internal`] when the client cannot be built.
    pub fn new(timeout_ms: u64, user_agent: &str) -> Result<Self, ToolError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .user_agent(user_agent.to_string())
            .redirect(Policy::none())
            .build()
            .map_err(|err| ToolError::Internal(format!("http client build failed: {err}")))?;
        Ok(Self {
            client,
        })
    }

    /// Sends the request and decodes the response.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamFailure`] for transport failures and non-success
    /// statuses.
    pub async fn execute(&self, request: UpstreamRequest) -> Result<Value, UpstreamFailure> {
        let mut builder = self.client.request(request.method, request.url);
        builder = builder.header(ACCEPT, "application/json");
        builder = match request.auth {
            UpstreamAuth::None => builder,
            UpstreamAuth::Bearer(token) => builder.bearer_auth(token),
            UpstreamAuth::Header(name, value) => builder.header(name, value),
            UpstreamAuth::Basic {
                user,
                password,
            } => builder.basic_auth(user, Some(password)),
        };
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            let bytes = serde_json::to_vec(&body)
                .map_err(|err| UpstreamFailure::Transport(format!("encode body: {err}")))?;
            builder = builder.header(CONTENT_TYPE, "application/json").body(bytes);
        }

        let response =
            builder.send().await.map_err(|err| UpstreamFailure::Transport(err.to_string()))?;
        let status = response.status();
        if let Some(length) = response.content_length()
            && length > MAX_RESPONSE_BYTES as u64
        {
            return Err(UpstreamFailure::Transport("upstream response exceeds size limit".to_string()));
        }
        let bytes =
            response.bytes().await.map_err(|err| UpstreamFailure::Transport(err.to_string()))?;
        if bytes.len() > MAX_RESPONSE_BYTES {
            return Err(UpstreamFailure::Transport("upstream response exceeds size limit".to_string()));
        }
        let body = decode_body(&bytes);
        if status.is_success() {
            Ok(body)
        } else if status.as_u16() == 401 {
            Err(UpstreamFailure::Auth {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(UpstreamFailure::Http {
                status: status.as_u16(),
                body,
            })
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes a response body as JSON, wrapping non-JSON text.
#[must_use]
pub fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| json!({ "raw": String::from_utf8_lossy(bytes) }))
}

/// Appends percent-encoded path segments to a base URL.
///
/// # Errors
///
/// Returns [`ToolError::InvalidArguments`] when the base is not a URL that can
/// carry path segments.
pub fn join_url(base: &str, segments: &[&str]) -> Result<Url, ToolError> {
    let mut url = Url::parse(base.trim())
        .map_err(|err| ToolError::InvalidArguments(format!("invalid base url {base}: {err}")))?;
    {
        let mut path = url.path_segments_mut().map_err(|()| {
            ToolError::InvalidArguments(format!("base url cannot have a path: {base}"))
        })?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

/// Returns a string argument when present and non-empty.
#[must_use]
pub fn arg_str<'a>(args: &'a Value, name: &str) -> Option<&'a str> {
    args.get(name).and_then(Value::as_str).filter(|value| !value.is_empty())
}

/// Copies the named arguments into a request body when present and not null.
#[must_use]
pub fn pick(args: &Value, names: &[&str]) -> Value {
    let mut body = serde_json::Map::new();
    for name in names {
        if let Some(value) = args.get(*name)
            && !value.is_null()
        {
            body.insert((*name).to_string(), value.clone());
        }
    }
    Value::Object(body)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use serde_json::json;

    use super::decode_body;
    use super::join_url;
    use super::pick;

    #[test]
    fn decode_body_wraps_text_and_handles_empty() {
        assert_eq!(decode_body(b""), serde_json::Value::Null);
        assert_eq!(decode_body(b"{\"ok\":true}"), json!({ "ok": true }));
        assert_eq!(decode_body(b"<html>"), json!({ "raw": "<html>" }));
    }

    #[test]
    fn join_url_encodes_segments_and_trims_trailing_slash() {
        let url = join_url("https://api.pinecone.io/", &["indexes", "my index"]).unwrap();
        assert_eq!(url.as_str(), "https://api.pinecone.io/indexes/my%20index");
        let url = join_url("https://api.notion.com/v1", &["pages", "abc"]).unwrap();
        assert_eq!(url.as_str(), "https://api.notion.com/v1/pages/abc");
    }

    #[test]
    fn pick_skips_absent_and_null() {
        let args = json!({ "a": 1, "b": null, "c": "x" });
        assert_eq!(pick(&args, &["a", "b", "d"]), json!({ "a": 1 }));
    }
}
