// crates/mcp-hub-providers/src/lib.rs
// ============================================================================
// Module: MCP Hub Providers
// Description: Built-in provider plugins for the hub.
// Purpose: Wrap third-party services as schema-validated tools.
// Dependencies: mcp-hub-core, mcp-hub-config, reqwest
// ============================================================================

//! ## Overview
//! Each provider module exposes a factory taking the shared
//! [`mcp_hub_core::ProviderDeps`] record plus its configuration section and
//! returning a plain [`mcp_hub_core::Provider`]. [`build_providers`] mounts
//! every enabled provider in a fixed order.
//!
//! Upstream calls share [`upstream::UpstreamClient`]: per-provider timeouts,
//! no redirects, bounded response bodies, and `401` mapped to an
//! authorization failure so the credential broker can refresh.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod echo;
pub mod notion;
pub mod nova_memory;
pub mod pinecone;
pub mod registry;
pub mod upstream;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use registry::ProviderBuildError;
pub use registry::build_providers;
pub use upstream::UpstreamClient;
pub use upstream::UpstreamRequest;
