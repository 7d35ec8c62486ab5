// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0
//! Database Update Command
//!
//! This module implements the `bonus update` command for applying database
//! migrations to keep the schema in sync with the application version.
//!
//! # Architecture
//!
//! - **Layer:** CLI/Presentation
//! - **Purpose:** Database schema migration management
//! - **Integration:** CLI → SQLx Migrator → PostgreSQL
//!
//! # Usage
//!
//! ```bash
//! # Apply all pending migrations
//! bonus update
//!
//! # Preview migrations without applying
//! bonus update --dry-run
//! ```
//!
//! # Environment
//!
//! Uses `BONUS_DATABASE_URL`, or `spec.database.url` from the configuration.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::Row;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Args)]
pub struct UpdateCommand {
    /// Perform a dry run without applying changes
    #[arg(long)]
    dry_run: bool,
}

pub async fn execute(cmd: UpdateCommand, database_url: Option<String>) -> Result<()> {
    println!("{}", "Bonus Agreements Update".bold().green());

    let database_url = database_url.context(
        "No database URL configured. Set BONUS_DATABASE_URL or spec.database.url to run updates.",
    )?;

    println!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    // Missing table means nothing has been applied yet
    let applied: Vec<i64> = sqlx::query("SELECT version FROM _sqlx_migrations WHERE success")
        .fetch_all(&pool)
        .await
        .map(|rows| rows.iter().map(|row| row.get("version")).collect())
        .unwrap_or_default();

    let pending: Vec<_> = MIGRATOR
        .iter()
        .filter(|m| !applied.contains(&m.version))
        .collect();

    println!(
        "Migration status: {} applied, {} total available.",
        applied.len(),
        MIGRATOR.iter().count()
    );

    if pending.is_empty() {
        println!("{}", "✓ Database is up to date.".green());
        return Ok(());
    }

    if cmd.dry_run {
        println!("Pending migrations found (Dry Run):");
        for migration in &pending {
            println!(" - {} {}", migration.version, migration.description);
        }
        println!("Skipping application due to --dry-run");
        return Ok(());
    }

    println!("Applying {} pending migration(s)...", pending.len());
    MIGRATOR
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;
    println!("{}", "✓ Database updated successfully.".green());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_migrations_are_ordered() {
        let versions: Vec<i64> = MIGRATOR.iter().map(|m| m.version).collect();
        assert_eq!(versions.len(), 3);
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_missing_database_url_is_an_error() {
        let err = execute(UpdateCommand { dry_run: true }, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("BONUS_DATABASE_URL"));
    }
}
