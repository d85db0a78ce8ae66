// crates/mcp-hub-core/src/lib.rs
// ============================================================================
// Module: MCP Hub Core
// Description: Tool, provider, credential, and storage contracts for the hub.
// Purpose: Provide the provider-facing contracts shared by every hub crate.
// Dependencies: async-trait, axum, jsonschema, serde, serde_json, thiserror, tokio
// ============================================================================

//! ## Overview
//! `mcp-hub-core` defines what a provider plugin is (a named bundle of
//! schema-validated tools plus optional authorization routes), the storage
//! seams for credentials and usage, and the bounded token-refresh protocol
//! used by providers that call authenticated upstream services.
//!
//! Both stores ship an in-memory backend here; durable backends live in
//! `mcp-hub-store-sqlite` and honor the same observable semantics.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod blocking;
pub mod credentials;
pub mod error;
pub mod provider;
pub mod schema;
pub mod time;
pub mod token;
pub mod tool;
pub mod usage;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use blocking::run_blocking;
pub use credentials::Credential;
pub use credentials::CredentialBroker;
pub use credentials::TokenRefresher;
pub use credentials::UpstreamFailure;
pub use error::StoreError;
pub use error::ToolError;
pub use provider::AuthRoutes;
pub use provider::Provider;
pub use provider::ProviderDeps;
pub use schema::FieldSpec;
pub use schema::FieldType;
pub use schema::SchemaValidator;
pub use schema::ToolSchema;
pub use token::DEFAULT_SUBJECT;
pub use token::InMemoryTokenStore;
pub use token::SharedTokenStore;
pub use token::TokenRecord;
pub use token::TokenStore;
pub use tool::FnHandler;
pub use tool::ToolContent;
pub use tool::ToolDescriptor;
pub use tool::ToolHandler;
pub use tool::ToolOutput;
pub use usage::InMemoryUsageRecorder;
pub use usage::SharedUsageRecorder;
pub use usage::UsageRecord;
pub use usage::UsageRecorder;
pub use usage::UsageStats;
