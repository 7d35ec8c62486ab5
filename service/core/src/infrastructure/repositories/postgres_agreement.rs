// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0
//! Postgres Agreement
//!
//! PostgreSQL-backed `AgreementRepository`. The `code` column defaults to the
//! zero-padded next value of `agreement_code_seq`, and a trigger refreshes
//! `updated_at` on every UPDATE, so both are read back with `RETURNING`.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Implements agreement persistence

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::agreement::{
    Agreement, AgreementCode, AgreementDraft, AgreementId, AgreementStatus, AgreementTerms,
};
use crate::domain::repository::{AgreementRepository, RepositoryError};

const AGREEMENT_COLUMNS: &str = r#"
    id, code, valid_from, valid_to, supplier_code, agreement_type_code,
    scale_code, condition_value, status::text AS status, created_at, updated_at
"#;

pub struct PostgresAgreementRepository {
    pool: PgPool,
}

impl PostgresAgreementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgreementRepository for PostgresAgreementRepository {
    async fn insert(&self, draft: AgreementDraft) -> Result<Agreement, RepositoryError> {
        let sql = format!(
            r#"
            INSERT INTO agreements (
                id, valid_from, valid_to, supplier_code, agreement_type_code,
                scale_code, condition_value, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8::agreement_status_enum, $9, $10)
            RETURNING {AGREEMENT_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(draft.id.0)
            .bind(draft.terms.valid_from())
            .bind(draft.terms.valid_to())
            .bind(draft.terms.supplier_code())
            .bind(draft.terms.agreement_type_code())
            .bind(draft.terms.scale_code())
            .bind(draft.terms.condition_value())
            .bind(draft.status.as_str())
            .bind(draft.created_at)
            .bind(draft.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to insert agreement: {}", e)))?;

        parse_agreement_row(row)
    }

    async fn select_all(&self) -> Result<Vec<Agreement>, RepositoryError> {
        let sql = format!(
            "SELECT {AGREEMENT_COLUMNS} FROM agreements ORDER BY created_at DESC, code DESC"
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.into_iter().map(parse_agreement_row).collect()
    }

    async fn select_by_id(&self, id: AgreementId) -> Result<Option<Agreement>, RepositoryError> {
        let sql = format!("SELECT {AGREEMENT_COLUMNS} FROM agreements WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        row.map(parse_agreement_row).transpose()
    }

    async fn persist_update(&self, agreement: &Agreement) -> Result<Agreement, RepositoryError> {
        let sql = format!(
            r#"
            UPDATE agreements SET
                valid_from = $2,
                valid_to = $3,
                supplier_code = $4,
                agreement_type_code = $5,
                scale_code = $6,
                condition_value = $7,
                status = $8::agreement_status_enum
            WHERE id = $1
            RETURNING {AGREEMENT_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(agreement.id.0)
            .bind(agreement.terms.valid_from())
            .bind(agreement.terms.valid_to())
            .bind(agreement.terms.supplier_code())
            .bind(agreement.terms.agreement_type_code())
            .bind(agreement.terms.scale_code())
            .bind(agreement.terms.condition_value())
            .bind(agreement.status.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to update agreement: {}", e)))?;

        match row {
            Some(row) => parse_agreement_row(row),
            None => Err(RepositoryError::NotFound(format!("agreement {}", agreement.id))),
        }
    }
}

fn parse_agreement_row(row: PgRow) -> Result<Agreement, RepositoryError> {
    let id: uuid::Uuid = row.get("id");
    let code: String = row.get("code");
    let valid_from: NaiveDate = row.get("valid_from");
    let valid_to: NaiveDate = row.get("valid_to");
    let supplier_code: String = row.get("supplier_code");
    let agreement_type_code: String = row.get("agreement_type_code");
    let scale_code: String = row.get("scale_code");
    let condition_value: Decimal = row.get("condition_value");
    let status_str: String = row.get("status");
    let created_at: DateTime<Utc> = row.get("created_at");
    let updated_at: DateTime<Utc> = row.get("updated_at");

    let status: AgreementStatus = status_str
        .parse()
        .map_err(RepositoryError::Serialization)?;

    let terms = AgreementTerms::new(
        valid_from,
        valid_to,
        supplier_code,
        agreement_type_code,
        scale_code,
        condition_value,
    )
    .map_err(|e| RepositoryError::Serialization(format!("Stored agreement {} is invalid: {}", id, e)))?;

    Ok(Agreement {
        id: AgreementId(id),
        code: AgreementCode::from_stored(code),
        terms,
        status,
        created_at,
        updated_at,
    })
}
