// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0

use axum::extract::State;
use axum::Json;

use super::error::ApiError;
use super::AppState;
use crate::domain::reference::{AgreementType, Scale, Supplier};

pub async fn suppliers(State(state): State<AppState>) -> Result<Json<Vec<Supplier>>, ApiError> {
    Ok(Json(state.references.suppliers().await?))
}

pub async fn agreement_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<AgreementType>>, ApiError> {
    Ok(Json(state.references.agreement_types().await?))
}

pub async fn scales(State(state): State<AppState>) -> Result<Json<Vec<Scale>>, ApiError> {
    Ok(Json(state.references.scales().await?))
}
