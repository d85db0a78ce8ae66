// crates/mcp-hub-mcp/src/lib.rs
// ============================================================================
// Module: MCP Hub Server Library
// Description: Sessions, dispatch, JSON-RPC handling, and HTTP transports.
// Purpose: Expose every mounted provider's tools to MCP clients.
// Dependencies: axum, mcp-hub-core, mcp-hub-config, mcp-hub-providers, tokio
// ============================================================================

//! ## Overview
//! `mcp-hub-mcp` assembles the hub: a [`dispatch::ToolRegistry`] over every
//! enabled provider, a [`dispatch::Dispatcher`] that validates and records
//! each call, a [`sessions::SessionRegistry`] shared by the streaming and
//! push-stream transports, and the HTTP router built by [`McpHub`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod auth;
pub mod dispatch;
pub mod error;
pub mod jsonrpc;
pub mod server;
pub mod sessions;
pub mod transport;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::HubAuditSink;
pub use audit::NoopAuditSink;
pub use dispatch::Dispatcher;
pub use dispatch::ToolRegistry;
pub use error::McpServerError;
pub use error::TransportError;
pub use server::HubState;
pub use server::HubStores;
pub use server::McpHub;
pub use server::build_stores;
pub use sessions::SessionRegistry;
pub use transport::streamable::SESSION_HEADER;
