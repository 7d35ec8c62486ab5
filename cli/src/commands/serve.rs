// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0
//! Serve Command
//!
//! `bonus serve` wires the repositories, authentication, strategy registry
//! and HTTP router from the loaded configuration and serves the API until
//! Ctrl+C or SIGTERM.
//!
//! # Architecture
//!
//! - **Layer:** CLI/Presentation
//! - **Purpose:** Service bootstrap
//! - **Integration:** CLI → Repositories → Application services → axum

use anyhow::{Context, Result};
use clap::Args;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use bonus_core::application::auth_service::AuthService;
use bonus_core::application::calculation_engine::StrategyRegistry;
use bonus_core::application::repository_factory::Repositories;
use bonus_core::domain::service_config::ServiceConfigManifest;
use bonus_core::infrastructure::credentials::{PasswordHasher, TokenIssuer};
use bonus_core::presentation::api::{app, cors_layer, AppState};

#[derive(Args)]
pub struct ServeCommand {
    /// HTTP bind address (default: spec.http.bind_address)
    #[arg(long, env = "BONUS_HOST")]
    host: Option<String>,

    /// HTTP port (default: spec.http.port)
    #[arg(long, env = "BONUS_PORT")]
    port: Option<u16>,
}

impl ServeCommand {
    fn bind_address(&self, config: &ServiceConfigManifest) -> String {
        let host = self
            .host
            .clone()
            .unwrap_or_else(|| config.spec.http.bind_address.clone());
        let port = self.port.unwrap_or(config.spec.http.port);
        format!("{}:{}", host, port)
    }
}

pub async fn execute(cmd: ServeCommand, config: ServiceConfigManifest) -> Result<()> {
    config
        .validate()
        .context("Configuration validation failed")?;
    info!("Configuration loaded: name={}", config.metadata.name);

    if config.spec.auth.uses_default_secret() {
        warn!("Using the default JWT secret; set BONUS_JWT_SECRET before exposing this service");
    }

    if let Some(port) = config.spec.observability.metrics_port {
        PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], port))
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!("Prometheus metrics available on 0.0.0.0:{}", port);
    }

    let backend = config.storage_backend()?;
    let repositories = Repositories::connect(&backend)
        .await
        .context("Failed to initialize repositories")?;

    let auth = AuthService::new(
        repositories.users.clone(),
        PasswordHasher::default(),
        TokenIssuer::new(
            &config.spec.auth.jwt_secret,
            config.spec.auth.access_token_expire_minutes,
        ),
    );
    auth.ensure_admin_exists(&config.spec.auth.default_admin)
        .await
        .context("Failed to create default admin user")?;

    let registry = StrategyRegistry::from_config(&config.spec.calculation)
        .context("Failed to initialize calculation strategies")?;
    if !registry.is_empty() {
        info!(types = ?registry.registered_types(), "Calculation strategies registered");
    }

    let router = app(AppState::new(&repositories, registry, auth))
        .layer(cors_layer(&config.spec.http.cors_origins));

    let addr = cmd.bind_address(&config);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Bonus agreements API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
