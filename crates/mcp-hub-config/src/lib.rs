// crates/mcp-hub-config/src/lib.rs
// ============================================================================
// Module: MCP Hub Config Library
// Description: Canonical config model, validation, and sample generation.
// Purpose: Single source of truth for mcp-hub.toml semantics.
// Dependencies: mcp-hub-store-sqlite, serde, toml, url
// ============================================================================

//! ## Overview
//! `mcp-hub-config` defines the configuration model for the hub: server
//! surface, store backend selection, audit output, and per-provider
//! sections. Configuration is strict: unknown keys and inconsistent values
//! fail closed. Secrets and deployment knobs may be overridden from the
//! environment through an injectable lookup.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod sample;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use sample::config_toml_sample;
