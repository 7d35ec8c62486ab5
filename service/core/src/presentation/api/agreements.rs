// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::AppState;
use crate::application::projection::AgreementView;
use crate::domain::agreement::{AgreementError, AgreementId, AgreementStatus, AgreementTerms};

/// Body of create and full-update requests; every field is required
#[derive(Debug, Deserialize)]
pub struct AgreementRequest {
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub supplier_code: String,
    pub agreement_type_code: String,
    pub scale_code: String,
    pub condition_value: Decimal,
}

impl AgreementRequest {
    fn into_terms(self) -> Result<AgreementTerms, AgreementError> {
        AgreementTerms::new(
            self.valid_from,
            self.valid_to,
            self.supplier_code,
            self.agreement_type_code,
            self.scale_code,
            self.condition_value,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: AgreementStatus,
}

#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    pub period_from: NaiveDate,
    pub period_to: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct CalculationResponse {
    pub agreement_id: AgreementId,
    pub period_from: NaiveDate,
    pub period_to: NaiveDate,
    pub amount: Decimal,
}

fn parse_id(raw: &str) -> Result<AgreementId, ApiError> {
    AgreementId::from_string(raw).map_err(|_| ApiError::InvalidId(raw.to_string()))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<AgreementRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AgreementView>), ApiError> {
    let Json(payload) = payload?;
    let agreement = state.agreements.create(payload.into_terms()?).await?;
    let view = state.projector.project(&agreement).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<AgreementView>>, ApiError> {
    let agreements = state.agreements.get_all().await?;
    Ok(Json(state.projector.project_all(&agreements).await?))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AgreementView>, ApiError> {
    let agreement = state.agreements.get_by_id(parse_id(&id)?).await?;
    Ok(Json(state.projector.project(&agreement).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AgreementRequest>, JsonRejection>,
) -> Result<Json<AgreementView>, ApiError> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let agreement = state.agreements.update(id, payload.into_terms()?).await?;
    Ok(Json(state.projector.project(&agreement).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> Result<Json<AgreementView>, ApiError> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let agreement = state.agreements.update_status(id, payload.status).await?;
    Ok(Json(state.projector.project(&agreement).await?))
}

pub async fn calculate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<Json<CalculationResponse>, ApiError> {
    let agreement_id = parse_id(&id)?;
    let Json(payload) = payload?;
    let amount = state
        .dispatcher
        .run(agreement_id, payload.period_from, payload.period_to)
        .await?;

    Ok(Json(CalculationResponse {
        agreement_id,
        period_from: payload.period_from,
        period_to: payload.period_to,
        amount,
    }))
}
