// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use bonus_core::application::calculation_engine::StrategyRegistry;
use bonus_core::domain::service_config::{DatabaseBackend, ServiceConfigManifest};

const CONFIG_TEMPLATE: &str = include_str!("../../templates/bonus-config.yaml");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./bonus-config.yaml)
        #[arg(short, long, default_value = "./bonus-config.yaml")]
        output: PathBuf,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output } => generate(&output).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = ServiceConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. BONUS_CONFIG_PATH: {}",
            std::env::var("BONUS_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./bonus-config.yaml");
        println!("  4. ~/.bonus/config.yaml");
        println!("  5. /etc/bonus/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Service:".bold());
    println!("  Name: {}", config.metadata.name);
    if let Some(version) = &config.metadata.version {
        println!("  Version: {}", version);
    }
    println!();

    println!("{}", "Database:".bold());
    match config.spec.database.backend {
        DatabaseBackend::InMemory => println!("  Backend: in-memory"),
        DatabaseBackend::Postgres => {
            println!("  Backend: postgres");
            println!(
                "  URL: {}",
                config
                    .spec
                    .database
                    .url
                    .as_deref()
                    .map(redact_url)
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!("  Max connections: {}", config.spec.database.max_connections);
        }
    }
    println!();

    println!("{}", "HTTP:".bold());
    println!(
        "  Listen: {}:{}",
        config.spec.http.bind_address, config.spec.http.port
    );
    println!("  CORS origins: {}", config.spec.http.cors_origins.join(", "));
    println!();

    println!("{}", "Auth:".bold());
    if config.spec.auth.uses_default_secret() {
        println!("  JWT secret: {}", "default (change before production)".yellow());
    } else {
        println!("  JWT secret: (set)");
    }
    println!(
        "  Token lifetime: {} min",
        config.spec.auth.access_token_expire_minutes
    );
    println!("  Default admin: {}", config.spec.auth.default_admin.username);
    println!();

    println!("{}", "Calculation strategies:".bold());
    if config.spec.calculation.strategies.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for binding in &config.spec.calculation.strategies {
        println!("  {} → {}", binding.agreement_type, binding.strategy);
    }
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = ServiceConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    check(&config)?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

/// Manifest validation plus strategy kind resolution
fn check(config: &ServiceConfigManifest) -> Result<()> {
    config
        .validate()
        .context("Configuration validation failed")?;
    StrategyRegistry::from_config(&config.spec.calculation)
        .context("Configuration validation failed")?;
    Ok(())
}

async fn generate(output: &Path) -> Result<()> {
    std::fs::write(output, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

/// Hide the password part of a connection string
fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.split_once('@') {
        Some((credentials, host)) => {
            let user = credentials.split(':').next().unwrap_or_default();
            format!("{}://{}:****@{}", scheme, user, host)
        }
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_is_a_valid_configuration() {
        let config = ServiceConfigManifest::from_yaml_str(CONFIG_TEMPLATE).unwrap();
        check(&config).unwrap();
        assert_eq!(config.spec.calculation.strategies.len(), 1);
        assert_eq!(config.spec.database.backend, DatabaseBackend::InMemory);
    }

    #[test]
    fn test_unknown_strategy_kind_fails_check() {
        let mut config = ServiceConfigManifest::from_yaml_str(CONFIG_TEMPLATE).unwrap();
        config.spec.calculation.strategies[0].strategy = "flat-rebate".to_string();

        assert!(config.validate().is_ok());
        assert!(check(&config).is_err());
    }

    #[tokio::test]
    async fn test_generate_writes_template() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("bonus-config.yaml");

        generate(&output).await.unwrap();

        let written = ServiceConfigManifest::from_yaml_file(&output).unwrap();
        assert_eq!(written.metadata.name, "bonus-agreements");
    }

    #[test]
    fn test_redact_url_hides_password() {
        assert_eq!(
            redact_url("postgres://bonus:secret@db:5432/bonus"),
            "postgres://bonus:****@db:5432/bonus"
        );
        assert_eq!(redact_url("postgres://db/bonus"), "postgres://db/bonus");
    }
}
