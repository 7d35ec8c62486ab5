// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contracts, one per aggregate, defined in the domain layer and
//! implemented in `crate::infrastructure::repositories`.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `AgreementRepository` | `Agreement` | `InMemoryAgreementRepository`, `PostgresAgreementRepository` |
//! | `ReferenceCatalog` | `Supplier`, `AgreementType`, `Scale` | `InMemoryReferenceCatalog`, `PostgresReferenceCatalog` |
//! | `UserRepository` | `User` | `InMemoryUserRepository`, `PostgresUserRepository` |
//!
//! ## Storage Backend Abstraction
//!
//! Concrete implementations are selected at startup from `spec.database` in
//! the service configuration. In-memory implementations serve development and
//! tests; PostgreSQL implementations serve production.

use async_trait::async_trait;
use crate::domain::agreement::{Agreement, AgreementDraft, AgreementId};
use crate::domain::reference::{AgreementType, Scale, Supplier};
use crate::domain::user::User;

/// Storage backend enum for pluggable persistence
#[derive(Debug, Clone)]
pub enum StorageBackend {
    InMemory,
    PostgreSQL(PostgresConfig),
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub connection_string: String,
    pub max_connections: u32,
}

/// Repository interface for Agreement aggregates.
///
/// Code assignment and the `created_at` default belong to the store.
#[async_trait]
pub trait AgreementRepository: Send + Sync {
    /// Store a new agreement, assigning its code
    async fn insert(&self, draft: AgreementDraft) -> Result<Agreement, RepositoryError>;

    /// All agreements, most recently created first
    async fn select_all(&self) -> Result<Vec<Agreement>, RepositoryError>;

    /// Find agreement by ID
    async fn select_by_id(&self, id: AgreementId) -> Result<Option<Agreement>, RepositoryError>;

    /// Persist the current state of an existing agreement
    async fn persist_update(&self, agreement: &Agreement) -> Result<Agreement, RepositoryError>;
}

/// Read-only lookup of seeded reference data.
///
/// Absence is `Ok(None)`, never an error.
#[async_trait]
pub trait ReferenceCatalog: Send + Sync {
    async fn supplier(&self, code: &str) -> Result<Option<Supplier>, RepositoryError>;

    async fn agreement_type(&self, code: &str) -> Result<Option<AgreementType>, RepositoryError>;

    async fn scale(&self, code: &str) -> Result<Option<Scale>, RepositoryError>;

    /// Suppliers ordered by code
    async fn list_suppliers(&self) -> Result<Vec<Supplier>, RepositoryError>;

    /// Agreement types ordered by code
    async fn list_agreement_types(&self) -> Result<Vec<AgreementType>, RepositoryError>;

    /// Scales ordered by code
    async fn list_scales(&self) -> Result<Vec<Scale>, RepositoryError>;
}

/// Repository interface for operator accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    async fn create(&self, user: &User) -> Result<(), RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}

