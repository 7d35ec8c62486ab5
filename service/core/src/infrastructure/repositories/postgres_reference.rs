// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0
//! Postgres Reference Catalog
//!
//! Read-only access to `ref_suppliers`, `ref_agreement_types` and
//! `ref_scales`. Rows are seeded by migrations.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::reference::{AgreementType, GridType, Scale, Supplier};
use crate::domain::repository::{ReferenceCatalog, RepositoryError};

pub struct PostgresReferenceCatalog {
    pool: PgPool,
}

impl PostgresReferenceCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceCatalog for PostgresReferenceCatalog {
    async fn supplier(&self, code: &str) -> Result<Option<Supplier>, RepositoryError> {
        let row = sqlx::query("SELECT code, name FROM ref_suppliers WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| Supplier::new(r.get::<String, _>("code"), r.get::<String, _>("name"))))
    }

    async fn agreement_type(&self, code: &str) -> Result<Option<AgreementType>, RepositoryError> {
        let row = sqlx::query("SELECT code, name FROM ref_agreement_types WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| AgreementType::new(r.get::<String, _>("code"), r.get::<String, _>("name"))))
    }

    async fn scale(&self, code: &str) -> Result<Option<Scale>, RepositoryError> {
        let row = sqlx::query("SELECT code, name, grid::text AS grid FROM ref_scales WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        row.map(parse_scale_row).transpose()
    }

    async fn list_suppliers(&self) -> Result<Vec<Supplier>, RepositoryError> {
        let rows = sqlx::query("SELECT code, name FROM ref_suppliers ORDER BY code")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| Supplier::new(r.get::<String, _>("code"), r.get::<String, _>("name")))
            .collect())
    }

    async fn list_agreement_types(&self) -> Result<Vec<AgreementType>, RepositoryError> {
        let rows = sqlx::query("SELECT code, name FROM ref_agreement_types ORDER BY code")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| AgreementType::new(r.get::<String, _>("code"), r.get::<String, _>("name")))
            .collect())
    }

    async fn list_scales(&self) -> Result<Vec<Scale>, RepositoryError> {
        let rows = sqlx::query("SELECT code, name, grid::text AS grid FROM ref_scales ORDER BY code")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(parse_scale_row).collect()
    }
}

fn parse_scale_row(row: PgRow) -> Result<Scale, RepositoryError> {
    let code: String = row.get("code");
    let name: String = row.get("name");
    let grid: String = row.get("grid");
    let grid: GridType = grid.parse().map_err(RepositoryError::Serialization)?;
    Ok(Scale::new(code, name, grid))
}
