// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0
//! HTTP API
//!
//! JSON endpoints for authentication, reference data and agreements, mounted
//! under `/api`. Everything except `POST /api/auth/login` requires a bearer
//! token.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | POST | `/api/auth/login` | [`auth::login`] |
//! | GET | `/api/auth/me` | [`auth::me`] |
//! | GET | `/api/ref/suppliers` | [`reference::suppliers`] |
//! | GET | `/api/ref/agreement-types` | [`reference::agreement_types`] |
//! | GET | `/api/ref/scales` | [`reference::scales`] |
//! | GET, POST | `/api/agreements` | [`agreements::list`], [`agreements::create`] |
//! | GET, PUT | `/api/agreements/{id}` | [`agreements::get_one`], [`agreements::update`] |
//! | PATCH | `/api/agreements/{id}/status` | [`agreements::update_status`] |
//! | POST | `/api/agreements/{id}/calculate` | [`agreements::calculate`] |

pub mod agreements;
pub mod auth;
pub mod error;
pub mod reference;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, patch, post};
use axum::{middleware, Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::application::agreement_service::{
    AgreementLifecycleService, StandardAgreementLifecycleService,
};
use crate::application::auth_service::AuthService;
use crate::application::calculation_engine::{CalculationDispatcher, StrategyRegistry};
use crate::application::projection::AgreementProjector;
use crate::application::reference_service::ReferenceService;
use crate::application::repository_factory::Repositories;

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub agreements: Arc<dyn AgreementLifecycleService>,
    pub projector: AgreementProjector,
    pub references: ReferenceService,
    pub dispatcher: Arc<CalculationDispatcher>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Wire the standard services over a set of repositories
    pub fn new(repositories: &Repositories, registry: StrategyRegistry, auth: AuthService) -> Self {
        Self {
            agreements: Arc::new(StandardAgreementLifecycleService::new(
                repositories.agreements.clone(),
                repositories.catalog.clone(),
            )),
            projector: AgreementProjector::new(repositories.catalog.clone()),
            references: ReferenceService::new(repositories.catalog.clone()),
            dispatcher: Arc::new(CalculationDispatcher::new(
                repositories.agreements.clone(),
                Arc::new(registry),
            )),
            auth: Arc::new(auth),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/ref/suppliers", get(reference::suppliers))
        .route("/ref/agreement-types", get(reference::agreement_types))
        .route("/ref/scales", get(reference::scales))
        .route("/agreements", get(agreements::list).post(agreements::create))
        .route(
            "/agreements/{id}",
            get(agreements::get_one).put(agreements::update),
        )
        .route("/agreements/{id}/status", patch(agreements::update_status))
        .route("/agreements/{id}/calculate", post(agreements::calculate))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    let api = Router::new()
        .route("/auth/login", post(auth::login))
        .merge(protected);

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the configured origins, with credentials allowed
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(_) if origin == "*" => {
                tracing::warn!("Wildcard CORS origin cannot be combined with credentials; ignoring");
                None
            }
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
