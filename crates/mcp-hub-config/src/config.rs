// crates/mcp-hub-config/src/config.rs
// ============================================================================
// Module: MCP Hub Configuration
// Description: Configuration loading and validation for the hub.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: mcp-hub-store-sqlite, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits,
//! then environment overrides are applied, then the result is validated.
//! When no path is given and the default file is absent, defaults are used so
//! the hub can run from environment variables alone.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use mcp_hub_store_sqlite::SqliteStoreConfig;
use mcp_hub_store_sqlite::SqliteStoreMode;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "mcp-hub.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "MCP_HUB_CONFIG";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum shared secret length.
const MAX_SHARED_SECRET_LENGTH: usize = 512;
/// Smallest accepted timeout in milliseconds.
const MIN_TIMEOUT_MS: u64 = 100;
/// Largest accepted timeout in milliseconds.
const MAX_TIMEOUT_MS: u64 = 120_000;
/// Default upstream timeout in milliseconds.
const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 15_000;
/// Default request body limit (2 MiB).
const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Environment override keys.
pub mod env_keys {
    /// Bind address override.
    pub const BIND: &str = "MCP_HUB_BIND";
    /// Shared secret override.
    pub const SHARED_SECRET: &str = "MCP_HUB_SHARED_SECRET";
    /// Database path override; presence selects the sqlite backend.
    pub const DATABASE_PATH: &str = "MCP_HUB_DATABASE_PATH";
    /// Notion OAuth client id.
    pub const NOTION_CLIENT_ID: &str = "NOTION_CLIENT_ID";
    /// Notion OAuth client secret.
    pub const NOTION_CLIENT_SECRET: &str = "NOTION_CLIENT_SECRET";
    /// Notion OAuth redirect URI.
    pub const NOTION_REDIRECT_URI: &str = "NOTION_REDIRECT_URI";
    /// Notion static integration token.
    pub const NOTION_STATIC_TOKEN: &str = "NOTION_STATIC_TOKEN";
    /// Pinecone API key.
    pub const PINECONE_API_KEY: &str = "PINECONE_API_KEY";
    /// Default Pinecone index host.
    pub const PINECONE_INDEX_HOST: &str = "PINECONE_INDEX_HOST";
    /// Nova memory service base URL.
    pub const NOVA_MEMORY_URL: &str = "NOVA_MEMORY_URL";
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Root `mcp-hub.toml` model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HubConfig {
    /// HTTP surface configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Token store and usage log backend.
    #[serde(default)]
    pub store: StoreConfig,
    /// Audit output configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Provider sections.
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl HubConfig {
    /// Loads configuration using the default resolution rules and the
    /// process environment for overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| env::var(key).ok())
    }

    /// Loads configuration with an injectable environment lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with_env(
        path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path, &lookup)?;
        let mut config = match resolved {
            ResolvedPath::Explicit(path) => Self::read_file(&path)?,
            ResolvedPath::Default(path) if path.exists() => Self::read_file(&path)?,
            ResolvedPath::Default(_) => Self::default(),
        };
        config.apply_env_overrides(&lookup);
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from TOML text without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses one config file.
    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies environment overrides; blank values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| {
            lookup(key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
        };
        if let Some(bind) = get(env_keys::BIND) {
            self.server.bind = bind;
        }
        if let Some(secret) = get(env_keys::SHARED_SECRET) {
            self.server.shared_secret = Some(secret);
        }
        if let Some(path) = get(env_keys::DATABASE_PATH) {
            self.store.store_type = StoreType::Sqlite;
            self.store.path = Some(path);
        }
        let notion = &mut self.providers.notion;
        override_opt(&mut notion.client_id, get(env_keys::NOTION_CLIENT_ID));
        override_opt(&mut notion.client_secret, get(env_keys::NOTION_CLIENT_SECRET));
        override_opt(&mut notion.redirect_uri, get(env_keys::NOTION_REDIRECT_URI));
        override_opt(&mut notion.static_token, get(env_keys::NOTION_STATIC_TOKEN));
        let pinecone = &mut self.providers.pinecone;
        override_opt(&mut pinecone.api_key, get(env_keys::PINECONE_API_KEY));
        override_opt(&mut pinecone.index_host, get(env_keys::PINECONE_INDEX_HOST));
        if let Some(url) = get(env_keys::NOVA_MEMORY_URL) {
            self.providers.nova_memory.base_url = url;
        }
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.store.validate()?;
        self.audit.validate()?;
        self.providers.validate()?;
        Ok(())
    }
}

/// Replaces an optional value when an override is present.
fn override_opt(slot: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *slot = value;
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP surface configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Header carrying the shared secret.
    #[serde(default = "default_shared_secret_header")]
    pub shared_secret_header: String,
    /// Shared secret; absent disables gating.
    #[serde(default)]
    pub shared_secret: Option<String>,
    /// Streaming transport endpoint.
    #[serde(default = "default_mcp_path")]
    pub mcp_path: String,
    /// Push-stream downstream endpoint.
    #[serde(default = "default_sse_path")]
    pub sse_path: String,
    /// Push-stream message endpoint.
    #[serde(default = "default_messages_path")]
    pub messages_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
            shared_secret_header: default_shared_secret_header(),
            shared_secret: None,
            mcp_path: default_mcp_path(),
            sse_path: default_sse_path(),
            messages_path: default_messages_path(),
        }
    }
}

impl ServerConfig {
    /// Parses the bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("server.bind is not an address: {}", self.bind)))
    }

    /// Returns the shared secret when one is configured and non-blank.
    #[must_use]
    pub fn effective_shared_secret(&self) -> Option<&str> {
        self.shared_secret.as_deref().map(str::trim).filter(|secret| !secret.is_empty())
    }

    /// Validates server settings.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_body_bytes must be greater than zero".to_string(),
            ));
        }
        validate_header_name(&self.shared_secret_header)?;
        if let Some(secret) = &self.shared_secret
            && secret.len() > MAX_SHARED_SECRET_LENGTH
        {
            return Err(ConfigError::Invalid("server.shared_secret exceeds max length".to_string()));
        }
        let paths = [
            ("server.mcp_path", &self.mcp_path),
            ("server.sse_path", &self.sse_path),
            ("server.messages_path", &self.messages_path),
        ];
        for (field, path) in paths {
            if !path.starts_with('/') || path.len() < 2 {
                return Err(ConfigError::Invalid(format!("{field} must start with '/'")));
            }
            if path.contains(char::is_whitespace) || path.contains('{') || path.contains('}') {
                return Err(ConfigError::Invalid(format!("{field} contains invalid characters")));
            }
        }
        if self.mcp_path == self.sse_path
            || self.mcp_path == self.messages_path
            || self.sse_path == self.messages_path
        {
            return Err(ConfigError::Invalid("server endpoint paths must be distinct".to_string()));
        }
        Ok(())
    }
}

/// Validates a lowercase HTTP header name.
fn validate_header_name(name: &str) -> Result<(), ConfigError> {
    let valid = !name.is_empty()
        && name.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::Invalid(
            "server.shared_secret_header must be a lowercase header name".to_string(),
        ))
    }
}

/// Default bind address.
fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}

/// Default request body limit.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Default shared secret header.
fn default_shared_secret_header() -> String {
    "x-mcp-key".to_string()
}

/// Default streaming endpoint.
fn default_mcp_path() -> String {
    "/mcp".to_string()
}

/// Default push-stream endpoint.
fn default_sse_path() -> String {
    "/sse".to_string()
}

/// Default push-stream message endpoint.
fn default_messages_path() -> String {
    "/messages".to_string()
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Store backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Process-local maps.
    #[default]
    Memory,
    /// `SQLite` database file.
    Sqlite,
}

/// Token store and usage log configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// Database path for the sqlite backend.
    #[serde(default)]
    pub path: Option<String>,
    /// Pooled connection count.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    /// `SQLite` busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::Memory,
            path: None,
            pool_size: default_pool_size(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl StoreConfig {
    /// Returns the sqlite store config when the sqlite backend is selected.
    #[must_use]
    pub fn sqlite_config(&self) -> Option<SqliteStoreConfig> {
        if self.store_type != StoreType::Sqlite {
            return None;
        }
        let path = self.path.as_ref()?;
        Some(SqliteStoreConfig {
            path: PathBuf::from(path.trim()),
            pool_size: self.pool_size,
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: SqliteStoreMode::Wal,
        })
    }

    /// Validates store settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::Invalid(
                "store.pool_size must be greater than zero".to_string(),
            ));
        }
        validate_timeout("store.busy_timeout_ms", self.busy_timeout_ms)?;
        match (self.store_type, &self.path) {
            (StoreType::Sqlite, None) => {
                Err(ConfigError::Invalid("sqlite store requires store.path".to_string()))
            }
            (StoreType::Sqlite, Some(path)) => validate_path_string("store.path", path),
            (StoreType::Memory, _) => Ok(()),
        }
    }
}

/// Default pool size.
const fn default_pool_size() -> usize {
    3
}

/// Default busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    5_000
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Emit audit events.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// JSON-lines file; stderr when absent.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates audit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        Ok(())
    }
}

/// Serde default helper.
const fn default_true() -> bool {
    true
}

// ============================================================================
// SECTION: Providers
// ============================================================================

/// Per-provider sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    /// Diagnostic echo provider.
    #[serde(default)]
    pub echo: EchoConfig,
    /// Notion provider.
    #[serde(default)]
    pub notion: NotionConfig,
    /// Pinecone provider.
    #[serde(default)]
    pub pinecone: PineconeConfig,
    /// Nova memory provider.
    #[serde(default)]
    pub nova_memory: NovaMemoryConfig,
}

impl ProvidersConfig {
    /// Validates every provider section.
    fn validate(&self) -> Result<(), ConfigError> {
        self.notion.validate()?;
        self.pinecone.validate()?;
        self.nova_memory.validate()?;
        Ok(())
    }
}

/// Echo provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EchoConfig {
    /// Mount the provider.
    #[serde(default)]
    pub enabled: bool,
}

/// Notion provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotionConfig {
    /// Mount the provider.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// OAuth client id.
    #[serde(default)]
    pub client_id: Option<String>,
    /// OAuth client secret.
    #[serde(default)]
    pub client_secret: Option<String>,
    /// OAuth redirect URI.
    #[serde(default)]
    pub redirect_uri: Option<String>,
    /// Static integration token; bypasses OAuth when set.
    #[serde(default)]
    pub static_token: Option<String>,
    /// API base URL.
    #[serde(default = "default_notion_api_base")]
    pub api_base: String,
    /// Upstream timeout in milliseconds.
    #[serde(default = "default_upstream_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            static_token: None,
            api_base: default_notion_api_base(),
            timeout_ms: default_upstream_timeout_ms(),
        }
    }
}

impl NotionConfig {
    /// Validates notion settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_url("providers.notion.api_base", &self.api_base)?;
        validate_timeout("providers.notion.timeout_ms", self.timeout_ms)?;
        if let Some(uri) = non_blank(self.redirect_uri.as_deref()) {
            validate_url("providers.notion.redirect_uri", uri)?;
        }
        Ok(())
    }
}

/// Pinecone provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PineconeConfig {
    /// Mount the provider.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Default API key.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Default index host.
    #[serde(default)]
    pub index_host: Option<String>,
    /// Control-plane and assistant base URL.
    #[serde(default = "default_pinecone_api_base")]
    pub api_base: String,
    /// Upstream timeout in milliseconds.
    #[serde(default = "default_upstream_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            index_host: None,
            api_base: default_pinecone_api_base(),
            timeout_ms: default_upstream_timeout_ms(),
        }
    }
}

impl PineconeConfig {
    /// Validates pinecone settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_url("providers.pinecone.api_base", &self.api_base)?;
        validate_timeout("providers.pinecone.timeout_ms", self.timeout_ms)?;
        if let Some(host) = non_blank(self.index_host.as_deref()) {
            validate_url("providers.pinecone.index_host", host)?;
        }
        Ok(())
    }
}

/// Nova memory provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NovaMemoryConfig {
    /// Mount the provider.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Service base URL.
    #[serde(default = "default_nova_base_url")]
    pub base_url: String,
    /// Upstream timeout in milliseconds.
    #[serde(default = "default_upstream_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for NovaMemoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_nova_base_url(),
            timeout_ms: default_upstream_timeout_ms(),
        }
    }
}

impl NovaMemoryConfig {
    /// Validates nova memory settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_url("providers.nova_memory.base_url", &self.base_url)?;
        validate_timeout("providers.nova_memory.timeout_ms", self.timeout_ms)
    }
}

/// Default Notion API base.
fn default_notion_api_base() -> String {
    "https://api.notion.com/v1".to_string()
}

/// Default Pinecone API base.
fn default_pinecone_api_base() -> String {
    "https://api.pinecone.io".to_string()
}

/// Default nova memory base URL.
fn default_nova_base_url() -> String {
    "https://nova-memory.example.run.app".to_string()
}

/// Default upstream timeout.
const fn default_upstream_timeout_ms() -> u64 {
    DEFAULT_UPSTREAM_TIMEOUT_MS
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Config path resolved from CLI, environment, or the default name.
enum ResolvedPath {
    /// Path given explicitly (flag or environment); must exist.
    Explicit(PathBuf),
    /// Default filename; optional.
    Default(PathBuf),
}

/// Resolves the config path.
fn resolve_path(
    path: Option<&Path>,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<ResolvedPath, ConfigError> {
    if let Some(path) = path {
        return Ok(ResolvedPath::Explicit(path.to_path_buf()));
    }
    if let Some(env_path) = lookup(CONFIG_ENV_VAR).filter(|value| !value.trim().is_empty()) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(ResolvedPath::Explicit(PathBuf::from(env_path)));
    }
    Ok(ResolvedPath::Default(PathBuf::from(DEFAULT_CONFIG_NAME)))
}

/// Validates a config path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates an absolute http(s) URL.
fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|err| ConfigError::Invalid(format!("{field} is not a valid url: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid(format!("{field} has unsupported scheme {other}"))),
    }
}

/// Validates a timeout range.
fn validate_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if (MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{field} must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
        )))
    }
}

/// Returns the trimmed value when non-blank.
#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
