// crates/mcp-hub-providers/tests/common/mod.rs
// ============================================================================
// Module: Provider Test Support
// Description: Scripted local HTTP upstream for provider tests.
// Purpose: Capture outbound requests and replay canned responses.
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    dead_code,
    reason = "Shared test helpers; not every test binary uses every helper."
)]

use std::thread;
use std::thread::JoinHandle;

use mcp_hub_core::InMemoryTokenStore;
use mcp_hub_core::ProviderDeps;
use mcp_hub_core::SharedTokenStore;
use serde_json::Value;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

/// One request received by the mock upstream.
#[derive(Debug, Clone)]
pub struct Captured {
    /// HTTP method.
    pub method: String,
    /// Request path and query.
    pub url: String,
    /// Header pairs with lowercase names.
    pub headers: Vec<(String, String)>,
    /// Body parsed as JSON (null when empty).
    pub body: Value,
}

impl Captured {
    /// Returns the first header value with the given name.
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers.iter().find(|(key, _)| *key == name).map(|(_, value)| value.as_str())
    }
}

/// Local upstream answering a fixed script of responses.
pub struct MockUpstream {
    /// Base URL, e.g. `http://127.0.0.1:1234`.
    pub base_url: String,
    /// Thread serving the script.
    handle: JoinHandle<Vec<Captured>>,
}

impl MockUpstream {
    /// Starts a server that answers one request per scripted `(status, body)`.
    pub fn start(script: Vec<(u16, Value)>) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let handle = thread::spawn(move || {
            let mut captured = Vec::new();
            for (status, body) in script {
                let Ok(mut request) = server.recv() else {
                    break;
                };
                let mut text = String::new();
                request.as_reader().read_to_string(&mut text).unwrap();
                captured.push(Captured {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|header| {
                            (
                                header.field.as_str().as_str().to_ascii_lowercase(),
                                header.value.as_str().to_string(),
                            )
                        })
                        .collect(),
                    body: serde_json::from_str(&text).unwrap_or(Value::Null),
                });
                let content_type =
                    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
                let response = Response::from_string(body.to_string())
                    .with_status_code(status)
                    .with_header(content_type);
                let _ = request.respond(response);
            }
            captured
        });
        Self {
            base_url: format!("http://{addr}"),
            handle,
        }
    }

    /// Waits for the script to finish and returns the captured requests.
    pub fn finish(self) -> Vec<Captured> {
        self.handle.join().expect("mock upstream thread panicked")
    }
}

/// Provider dependencies over a fresh in-memory token store.
pub fn deps() -> (ProviderDeps, SharedTokenStore) {
    let tokens = SharedTokenStore::from_store(InMemoryTokenStore::new());
    (ProviderDeps::new(tokens.clone()), tokens)
}
