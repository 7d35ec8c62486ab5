// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0
//! Repository Factory - Application Layer
//!
//! Creates concrete repository implementations based on the storage backend
//! configuration, keeping the domain layer free of infrastructure types.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Wire repository trait objects for the configured backend

use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repository::{
    AgreementRepository, ReferenceCatalog, StorageBackend, UserRepository,
};
use crate::infrastructure::db::Database;
use crate::infrastructure::repositories::{
    InMemoryAgreementRepository, InMemoryReferenceCatalog, InMemoryUserRepository,
    PostgresAgreementRepository, PostgresReferenceCatalog, PostgresUserRepository,
};

/// Creates an AgreementRepository implementation based on the configured backend
pub fn create_agreement_repository(
    backend: &StorageBackend,
    pool: Option<&PgPool>,
) -> anyhow::Result<Arc<dyn AgreementRepository>> {
    Ok(match backend {
        StorageBackend::InMemory => Arc::new(InMemoryAgreementRepository::new()),
        StorageBackend::PostgreSQL(_) => {
            Arc::new(PostgresAgreementRepository::new(require_pool(pool)?))
        }
    })
}

/// Creates a ReferenceCatalog implementation based on the configured backend
pub fn create_reference_catalog(
    backend: &StorageBackend,
    pool: Option<&PgPool>,
) -> anyhow::Result<Arc<dyn ReferenceCatalog>> {
    Ok(match backend {
        StorageBackend::InMemory => Arc::new(InMemoryReferenceCatalog::seeded()),
        StorageBackend::PostgreSQL(_) => Arc::new(PostgresReferenceCatalog::new(require_pool(pool)?)),
    })
}

/// Creates a UserRepository implementation based on the configured backend
pub fn create_user_repository(
    backend: &StorageBackend,
    pool: Option<&PgPool>,
) -> anyhow::Result<Arc<dyn UserRepository>> {
    Ok(match backend {
        StorageBackend::InMemory => Arc::new(InMemoryUserRepository::new()),
        StorageBackend::PostgreSQL(_) => Arc::new(PostgresUserRepository::new(require_pool(pool)?)),
    })
}

fn require_pool(pool: Option<&PgPool>) -> anyhow::Result<PgPool> {
    pool.cloned()
        .ok_or_else(|| anyhow::anyhow!("PostgreSQL backend selected but no connection pool was provided"))
}

/// The full set of repositories the service runs on
#[derive(Clone)]
pub struct Repositories {
    pub agreements: Arc<dyn AgreementRepository>,
    pub catalog: Arc<dyn ReferenceCatalog>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// Connect to the backend (if it needs a connection) and build every repository
    pub async fn connect(backend: &StorageBackend) -> anyhow::Result<Self> {
        let database = match backend {
            StorageBackend::InMemory => {
                tracing::warn!("Using in-memory storage; agreements are lost on restart");
                None
            }
            StorageBackend::PostgreSQL(config) => Some(Database::connect(config).await?),
        };
        let pool = database.as_ref().map(Database::get_pool);

        Ok(Self {
            agreements: create_agreement_repository(backend, pool)?,
            catalog: create_reference_catalog(backend, pool)?,
            users: create_user_repository(backend, pool)?,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            agreements: Arc::new(InMemoryAgreementRepository::new()),
            catalog: Arc::new(InMemoryReferenceCatalog::seeded()),
            users: Arc::new(InMemoryUserRepository::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::PostgresConfig;

    #[tokio::test]
    async fn test_in_memory_backend_needs_no_pool() {
        let repos = Repositories::connect(&StorageBackend::InMemory).await.unwrap();
        assert!(repos.catalog.supplier("K0000001").await.unwrap().is_some());
        assert!(repos.agreements.select_all().await.unwrap().is_empty());
    }

    #[test]
    fn test_postgres_backend_requires_pool() {
        let backend = StorageBackend::PostgreSQL(PostgresConfig {
            connection_string: "postgres://localhost/bonuses".to_string(),
            max_connections: 5,
        });
        assert!(create_agreement_repository(&backend, None).is_err());
    }
}
