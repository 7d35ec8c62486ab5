// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0

//! # Bonus Agreements CLI
//!
//! The `bonus` binary runs the supplier bonus agreements service.
//!
//! ## Commands
//!
//! - `bonus serve` - Start the HTTP API
//! - `bonus config show|validate|generate` - Configuration management
//! - `bonus update` - Apply database migrations

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use bonus_agreements::commands::{self, ConfigCommand, ServeCommand, UpdateCommand};
use bonus_core::domain::service_config::{
    ConfigSource, ObservabilityConfig, ServiceConfigManifest,
};
use tracing::{info, warn};

/// Supplier bonus agreements service
#[derive(Parser)]
#[command(name = "bonus")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "BONUS_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); defaults to spec.observability.log_level
    #[arg(long, global = true, env = "BONUS_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    #[command(name = "serve")]
    Serve {
        #[command(flatten)]
        command: ServeCommand,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Apply database migrations
    #[command(name = "update")]
    Update {
        #[command(flatten)]
        command: UpdateCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Loaded before logging so the configured format applies; errors surface
    // from the command that needs the configuration.
    let source = ServiceConfigManifest::resolve_source(cli.config.clone());
    let config = ServiceConfigManifest::load_from(&source);
    let observability = config
        .as_ref()
        .map(|c| c.spec.observability.clone())
        .unwrap_or_default();

    init_logging(cli.log_level.as_deref(), &observability)?;
    log_config_source(&source, &config);

    match cli.command {
        Some(Commands::Serve { command }) => {
            let config = config.context("Failed to load configuration")?;
            commands::serve::execute(command, config).await
        }
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        Some(Commands::Update { command }) => {
            let database_url = config.ok().and_then(|c| c.spec.database.url);
            commands::update::execute(command, database_url).await
        }
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Report how configuration was resolved once the subscriber is installed
fn log_config_source(source: &ConfigSource, config: &Result<ServiceConfigManifest>) {
    match (source, config) {
        (_, Err(e)) => warn!(%source, error = %e, "Configuration failed to load"),
        (ConfigSource::Defaults, Ok(_)) => {
            warn!("No configuration file found in standard locations. Using defaults.")
        }
        (_, Ok(_)) => info!(%source, "Configuration loaded"),
    }

    for key in ServiceConfigManifest::env_overrides_present(|key| std::env::var(key).ok()) {
        info!("Environment override: {}", key);
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: Option<&str>, observability: &ObservabilityConfig) -> Result<()> {
    let level = level.unwrap_or(&observability.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if observability.log_format == "json" {
        builder.json().with_current_span(false).init();
    } else {
        builder.with_target(false).compact().init();
    }

    Ok(())
}
