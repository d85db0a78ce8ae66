// crates/mcp-hub-core/src/provider.rs
// ============================================================================
// Module: Provider Contract
// Description: Named bundles of tools plus optional authorization routes.
// Purpose: Give provider factories one explicit dependency record.
// Dependencies: axum
// ============================================================================

//! ## Overview
//! Providers are plain data: a name, an ordered tool list, and an optional
//! function that mounts authorization routes onto the hub router. Factories
//! receive a [`ProviderDeps`] record instead of capturing ambient state, so
//! tests can substitute fakes for every collaborator.

use std::fmt;
use std::sync::Arc;

use axum::Router;

use crate::token::SharedTokenStore;
use crate::tool::ToolDescriptor;

/// Mount function adding a provider's authorization routes to the hub router.
pub type AuthRoutes = Arc<dyn Fn(Router) -> Router + Send + Sync>;

/// Dependencies handed to every provider factory.
#[derive(Debug, Clone)]
pub struct ProviderDeps {
    /// Shared credential store.
    pub tokens: SharedTokenStore,
    /// User agent for upstream HTTP calls.
    pub user_agent: String,
}

impl ProviderDeps {
    /// Creates a dependency record with the default user agent.
    #[must_use]
    pub fn new(tokens: SharedTokenStore) -> Self {
        Self {
            tokens,
            user_agent: format!("mcp-hub/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Mounted provider plugin.
#[derive(Clone)]
pub struct Provider {
    /// Short provider name.
    pub name: String,
    /// Tools in registration order.
    pub tools: Vec<ToolDescriptor>,
    /// Optional authorization route mount.
    pub auth_routes: Option<AuthRoutes>,
}

impl Provider {
    /// Creates a provider without authorization routes.
    #[must_use]
    pub fn new(name: impl Into<String>, tools: Vec<ToolDescriptor>) -> Self {
        Self {
            name: name.into(),
            tools,
            auth_routes: None,
        }
    }

    /// Attaches an authorization route mount.
    #[must_use]
    pub fn with_auth_routes(mut self, mount: AuthRoutes) -> Self {
        self.auth_routes = Some(mount);
        self
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("tools", &self.tools)
            .field("auth_routes", &self.auth_routes.is_some())
            .finish()
    }
}
