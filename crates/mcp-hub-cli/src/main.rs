// crates/mcp-hub-cli/src/main.rs
// ============================================================================
// Module: MCP Hub CLI Entry Point
// Description: Command dispatcher for serving the hub and inspecting state.
// Purpose: Run the hub and read its configuration and usage log offline.
// Dependencies: clap, mcp-hub-config, mcp-hub-core, mcp-hub-mcp, thiserror, tokio.
// ============================================================================

//! ## Overview
//! `mcp-hub serve` assembles the hub from `mcp-hub.toml` and serves it.
//! `mcp-hub config check` validates configuration without starting anything,
//! `mcp-hub config sample` prints an annotated starting point, and
//! `mcp-hub usage stats` aggregates the configured usage log as JSON.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use mcp_hub_config::HubConfig;
use mcp_hub_config::StoreType;
use mcp_hub_config::config_toml_sample;
use mcp_hub_core::UsageRecorder;
use mcp_hub_core::UsageStats;
use mcp_hub_mcp::McpHub;
use mcp_hub_mcp::McpServerError;
use mcp_hub_mcp::build_stores;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "mcp-hub", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the hub.
    Serve(ConfigArgs),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Usage log utilities.
    Usage {
        /// Selected usage subcommand.
        #[command(subcommand)]
        command: UsageCommand,
    },
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate the configuration.
    Check(ConfigArgs),
    /// Print a sample configuration file.
    Sample,
}

/// Usage subcommands.
#[derive(Subcommand, Debug)]
enum UsageCommand {
    /// Print aggregate usage statistics as JSON.
    Stats(ConfigArgs),
}

/// Shared `--config` argument.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Path to `mcp-hub.toml` (defaults to `MCP_HUB_CONFIG`, then `mcp-hub.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI failures, each rendered as one stderr line.
#[derive(Debug, Error)]
enum CliError {
    /// Configuration could not be loaded or validated.
    #[error("config error: {0}")]
    Config(String),
    /// Hub assembly or serving failed.
    #[error("{0}")]
    Server(#[from] McpServerError),
    /// Store access failed.
    #[error("store error: {0}")]
    Store(String),
    /// Writing output failed.
    #[error("failed to write {stream}: {error}")]
    Output {
        /// Stream label.
        stream: &'static str,
        /// Underlying error.
        error: std::io::Error,
    },
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the selected command.
async fn run(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Commands::Serve(args) => command_serve(args).await,
        Commands::Config {
            command: ConfigCommand::Check(args),
        } => command_config_check(&args),
        Commands::Config {
            command: ConfigCommand::Sample,
        } => {
            write_stdout_line(config_toml_sample().trim_end())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Usage {
            command: UsageCommand::Stats(args),
        } => command_usage_stats(&args),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Loads configuration from an explicit path or the default locations.
fn load_config(path: Option<&Path>) -> CliResult<HubConfig> {
    HubConfig::load(path).map_err(|err| CliError::Config(err.to_string()))
}

/// Executes `serve`.
async fn command_serve(args: ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args.config.as_deref())?;
    let hub = tokio::task::spawn_blocking(move || McpHub::from_config(config))
        .await
        .map_err(|err| McpServerError::Init(format!("init join failed: {err}")))??;
    hub.serve().await?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `config check`.
fn command_config_check(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args.config.as_deref())?;
    write_stdout_line(&config_summary(&config))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `usage stats`.
fn command_usage_stats(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args.config.as_deref())?;
    let stats = usage_stats(&config)?;
    let rendered =
        serde_json::to_string_pretty(&stats).map_err(|err| CliError::Store(err.to_string()))?;
    write_stdout_line(&rendered)?;
    Ok(ExitCode::SUCCESS)
}

/// Reads aggregate usage from the configured store.
fn usage_stats(config: &HubConfig) -> CliResult<UsageStats> {
    let stores = build_stores(&config.store)?;
    stores.usage.stats().map_err(|err| CliError::Store(err.to_string()))
}

/// One-line description of a valid configuration.
fn config_summary(config: &HubConfig) -> String {
    let providers = &config.providers;
    let enabled: Vec<&str> = [
        ("echo", providers.echo.enabled),
        ("notion", providers.notion.enabled),
        ("pinecone", providers.pinecone.enabled),
        ("nova-memory", providers.nova_memory.enabled),
    ]
    .into_iter()
    .filter_map(|(name, enabled)| enabled.then_some(name))
    .collect();
    let gate = if config.server.effective_shared_secret().is_some() { "on" } else { "off" };
    let store = match config.store.store_type {
        StoreType::Memory => "memory",
        StoreType::Sqlite => "sqlite",
    };
    format!(
        "config ok: bind={} store={store} shared_secret={gate} providers=[{}]",
        config.server.bind,
        enabled.join(", ")
    )
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes one line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    writeln!(std::io::stdout(), "{message}").map_err(|error| CliError::Output {
        stream: "stdout",
        error,
    })
}

/// Writes one line to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = writeln!(std::io::stderr(), "mcp-hub: {message}");
    ExitCode::FAILURE
}

// ============================================================================
// SECTION: Tests
// ============================================================================
