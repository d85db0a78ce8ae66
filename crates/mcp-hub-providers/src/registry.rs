// crates/mcp-hub-providers/src/registry.rs
// ============================================================================
// Module: Provider Registry
// Description: Builds the enabled built-in providers from configuration.
// Purpose: Give the server one ordered list of providers to mount.
// Dependencies: mcp-hub-config, mcp-hub-core, thiserror
// ============================================================================

//! ## Overview
//! Providers are built in a fixed order (`echo`, `notion`, `pinecone`,
//! `nova-memory`); disabled sections are skipped. A provider that fails to
//! build aborts startup.

use mcp_hub_config::ProvidersConfig;
use mcp_hub_core::Provider;
use mcp_hub_core::ProviderDeps;
use mcp_hub_core::ToolError;
use thiserror::Error;

use crate::echo;
use crate::notion;
use crate::nova_memory;
use crate::pinecone;

/// Provider construction failure.
#[derive(Debug, Error)]
#[error("provider {provider} failed to initialize: {source}")]
pub struct ProviderBuildError {
    /// Provider name.
    pub provider: &'static str,
    /// Underlying failure.
    #[source]
    pub source: ToolError,
}

/// Tags a provider factory error with the provider name.
fn tagged(provider: &'static str) -> impl FnOnce(ToolError) -> ProviderBuildError {
    move |source| ProviderBuildError {
        provider,
        source,
    }
}

/// Builds every enabled provider in mount order.
///
/// # Errors
///
/// Returns [`ProviderBuildError`] when a provider cannot be constructed.
pub fn build_providers(
    config: &ProvidersConfig,
    deps: &ProviderDeps,
) -> Result<Vec<Provider>, ProviderBuildError> {
    let mut providers = Vec::new();
    if config.echo.enabled {
        providers.push(echo::provider());
    }
    if config.notion.enabled {
        providers.push(notion::provider(deps, &config.notion).map_err(tagged(notion::NAME))?);
    }
    if config.pinecone.enabled {
        providers.push(pinecone::provider(deps, &config.pinecone).map_err(tagged(pinecone::NAME))?);
    }
    if config.nova_memory.enabled {
        providers.push(
            nova_memory::provider(deps, &config.nova_memory).map_err(tagged(nova_memory::NAME))?,
        );
    }
    Ok(providers)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use mcp_hub_config::ProvidersConfig;
    use mcp_hub_core::InMemoryTokenStore;
    use mcp_hub_core::ProviderDeps;
    use mcp_hub_core::SharedTokenStore;

    use super::build_providers;

    fn deps() -> ProviderDeps {
        ProviderDeps::new(SharedTokenStore::from_store(InMemoryTokenStore::new()))
    }

    fn names(config: &ProvidersConfig) -> Vec<String> {
        build_providers(config, &deps()).unwrap().into_iter().map(|p| p.name).collect()
    }

    #[test]
    fn default_config_mounts_service_providers_in_order() {
        assert_eq!(names(&ProvidersConfig::default()), ["notion", "pinecone", "nova-memory"]);
    }

    #[test]
    fn disabled_sections_are_skipped() {
        let mut config = ProvidersConfig::default();
        config.echo.enabled = true;
        config.notion.enabled = false;
        config.nova_memory.enabled = false;
        assert_eq!(names(&config), ["echo", "pinecone"]);
    }

    #[test]
    fn notion_mounts_auth_routes_and_others_do_not() {
        let providers = build_providers(&ProvidersConfig::default(), &deps()).unwrap();
        let with_routes: Vec<_> = providers
            .iter()
            .filter(|provider| provider.auth_routes.is_some())
            .map(|provider| provider.name.as_str())
            .collect();
        assert_eq!(with_routes, ["notion"]);
    }
}
