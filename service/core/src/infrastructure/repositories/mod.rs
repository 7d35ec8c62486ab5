// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! Infrastructure implementations of the repository abstractions defined in
//! `crate::domain::repository`.
//!
//! # Available Implementations
//!
//! ## PostgreSQL Repositories
//!
//! - **PostgresAgreementRepository** - Agreement persistence, code assigned by
//!   the `agreement_code_seq` column default
//! - **PostgresReferenceCatalog** - Reads the migration-seeded `ref_*` tables
//! - **PostgresUserRepository** - Operator accounts
//!
//! ## In-Memory Repositories
//!
//! Lightweight implementations for tests and local development:
//! - **InMemoryAgreementRepository** - Lock-guarded map with its own code sequence
//! - **InMemoryReferenceCatalog** - Holds the same seed data as the migrations
//! - **InMemoryUserRepository** - Accounts keyed by username

pub mod postgres_agreement;
pub mod postgres_reference;
pub mod postgres_user;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::domain::agreement::{Agreement, AgreementCode, AgreementDraft, AgreementId};
use crate::domain::reference::{AgreementType, GridType, Scale, Supplier};
use crate::domain::repository::{
    AgreementRepository, ReferenceCatalog, RepositoryError, UserRepository,
};
use crate::domain::user::User;

pub use postgres_agreement::PostgresAgreementRepository;
pub use postgres_reference::PostgresReferenceCatalog;
pub use postgres_user::PostgresUserRepository;

// ============================================================================
// Agreements
// ============================================================================

#[derive(Default)]
struct AgreementTable {
    rows: HashMap<AgreementId, Agreement>,
    last_code: u64,
}

#[derive(Clone, Default)]
pub struct InMemoryAgreementRepository {
    table: Arc<RwLock<AgreementTable>>,
}

impl InMemoryAgreementRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AgreementRepository for InMemoryAgreementRepository {
    async fn insert(&self, draft: AgreementDraft) -> Result<Agreement, RepositoryError> {
        let mut table = self.table.write();
        if table.rows.contains_key(&draft.id) {
            return Err(RepositoryError::Database(format!(
                "duplicate agreement id {}",
                draft.id
            )));
        }
        table.last_code += 1;
        let agreement = Agreement::from_draft(draft, AgreementCode::from_sequence(table.last_code));
        table.rows.insert(agreement.id, agreement.clone());
        Ok(agreement)
    }

    async fn select_all(&self) -> Result<Vec<Agreement>, RepositoryError> {
        let table = self.table.read();
        let mut agreements: Vec<Agreement> = table.rows.values().cloned().collect();
        // created_at desc; codes break ties for rows created in the same instant
        agreements.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.code.cmp(&a.code))
        });
        Ok(agreements)
    }

    async fn select_by_id(&self, id: AgreementId) -> Result<Option<Agreement>, RepositoryError> {
        Ok(self.table.read().rows.get(&id).cloned())
    }

    async fn persist_update(&self, agreement: &Agreement) -> Result<Agreement, RepositoryError> {
        let mut table = self.table.write();
        match table.rows.get_mut(&agreement.id) {
            Some(row) => {
                *row = agreement.clone();
                Ok(agreement.clone())
            }
            None => Err(RepositoryError::NotFound(format!(
                "agreement {}",
                agreement.id
            ))),
        }
    }
}

// ============================================================================
// Reference catalog
// ============================================================================

/// Suppliers seeded by the reference-data migration
pub const SEED_SUPPLIERS: &[(&str, &str)] = &[
    ("K0000001", "ООО \"Альфа Трейд\""),
    ("K0000002", "ООО \"Бета Логистика\""),
    ("K0000003", "ЗАО \"Вектор Плюс\""),
    ("K0000004", "ООО \"Гамма Снаб\""),
    ("K0000005", "ИП Дельта"),
    ("K0000006", "ООО \"Эпсилон Групп\""),
    ("K0000007", "АО \"Зета Фуд\""),
    ("K0000008", "ООО \"Эта Маркет\""),
    ("K0000009", "ООО \"Тета Дистрибуция\""),
    ("K0000010", "ЗАО \"Йота Сервис\""),
    ("K0000011", "ООО \"Каппа Продукт\""),
    ("K0000012", "ООО \"Лямбда Оптторг\""),
    ("K0000013", "ИП Мю Консалтинг"),
    ("K0000014", "ООО \"Ню Импорт\""),
    ("K0000015", "АО \"Кси Холдинг\""),
    ("K0000016", "ООО \"Омикрон Ритейл\""),
    ("K0000017", "ООО \"Пи Фарма\""),
    ("K0000018", "ЗАО \"Ро Инвест\""),
    ("K0000019", "ООО \"Сигма Партнёр\""),
    ("K0000020", "ООО \"Тау Снабжение\""),
];

pub const SEED_AGREEMENT_TYPES: &[(&str, &str)] = &[
    ("T001", "Оборотный бонус"),
    ("M001", "Маркетинг"),
    ("P001", "Промо"),
    ("E001", "Extra"),
    ("E002", "Доп. маржа"),
];

pub const SEED_SCALES: &[(&str, &str, GridType)] = &[
    ("01", "% от продаж", GridType::Percent),
    ("02", "% от закупок", GridType::Percent),
    ("03", "Фиксированная сумма, руб", GridType::Fix),
];

/// Read-only catalog; `BTreeMap` keeps listings ordered by code
#[derive(Clone, Default)]
pub struct InMemoryReferenceCatalog {
    suppliers: Arc<BTreeMap<String, Supplier>>,
    agreement_types: Arc<BTreeMap<String, AgreementType>>,
    scales: Arc<BTreeMap<String, Scale>>,
}

impl InMemoryReferenceCatalog {
    pub fn new(
        suppliers: impl IntoIterator<Item = Supplier>,
        agreement_types: impl IntoIterator<Item = AgreementType>,
        scales: impl IntoIterator<Item = Scale>,
    ) -> Self {
        Self {
            suppliers: Arc::new(suppliers.into_iter().map(|s| (s.code.clone(), s)).collect()),
            agreement_types: Arc::new(
                agreement_types
                    .into_iter()
                    .map(|t| (t.code.clone(), t))
                    .collect(),
            ),
            scales: Arc::new(scales.into_iter().map(|s| (s.code.clone(), s)).collect()),
        }
    }

    /// Catalog holding the same rows as the reference-data migrations
    pub fn seeded() -> Self {
        Self::new(
            SEED_SUPPLIERS
                .iter()
                .map(|(code, name)| Supplier::new(*code, *name)),
            SEED_AGREEMENT_TYPES
                .iter()
                .map(|(code, name)| AgreementType::new(*code, *name)),
            SEED_SCALES
                .iter()
                .map(|(code, name, grid)| Scale::new(*code, *name, *grid)),
        )
    }
}

#[async_trait]
impl ReferenceCatalog for InMemoryReferenceCatalog {
    async fn supplier(&self, code: &str) -> Result<Option<Supplier>, RepositoryError> {
        Ok(self.suppliers.get(code).cloned())
    }

    async fn agreement_type(&self, code: &str) -> Result<Option<AgreementType>, RepositoryError> {
        Ok(self.agreement_types.get(code).cloned())
    }

    async fn scale(&self, code: &str) -> Result<Option<Scale>, RepositoryError> {
        Ok(self.scales.get(code).cloned())
    }

    async fn list_suppliers(&self) -> Result<Vec<Supplier>, RepositoryError> {
        Ok(self.suppliers.values().cloned().collect())
    }

    async fn list_agreement_types(&self) -> Result<Vec<AgreementType>, RepositoryError> {
        Ok(self.agreement_types.values().cloned().collect())
    }

    async fn list_scales(&self) -> Result<Vec<Scale>, RepositoryError> {
        Ok(self.scales.values().cloned().collect())
    }
}

// ============================================================================
// Users
// ============================================================================

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().get(username).cloned())
    }

    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.users.write();
        if users.contains_key(&user.username) {
            return Err(RepositoryError::Database(format!(
                "username '{}' already exists",
                user.username
            )));
        }
        users.insert(user.username.clone(), user.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agreement::{AgreementStatus, AgreementTerms};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn draft() -> AgreementDraft {
        let terms = AgreementTerms::new(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            "K0000001",
            "T001",
            "02",
            Decimal::new(1550, 2),
        )
        .unwrap();
        AgreementDraft::new(terms)
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_codes() {
        let repo = InMemoryAgreementRepository::new();
        let first = repo.insert(draft()).await.unwrap();
        let second = repo.insert(draft()).await.unwrap();
        assert_eq!(first.code.as_str(), "00000001");
        assert_eq!(second.code.as_str(), "00000002");
        assert_eq!(first.status, AgreementStatus::ReadyForCalculation);
    }

    #[tokio::test]
    async fn test_select_all_orders_newest_first() {
        let repo = InMemoryAgreementRepository::new();
        let a = repo.insert(draft()).await.unwrap();
        let b = repo.insert(draft()).await.unwrap();
        let c = repo.insert(draft()).await.unwrap();

        let ids: Vec<_> = repo.select_all().await.unwrap().into_iter().map(|x| x.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
    }

    #[tokio::test]
    async fn test_persist_update_requires_existing_row() {
        let repo = InMemoryAgreementRepository::new();
        let stored = repo.insert(draft()).await.unwrap();

        let mut changed = stored.clone();
        changed.set_status(AgreementStatus::Calculated);
        let persisted = repo.persist_update(&changed).await.unwrap();
        assert_eq!(persisted.status, AgreementStatus::Calculated);
        assert_eq!(
            repo.select_by_id(stored.id).await.unwrap().unwrap().status,
            AgreementStatus::Calculated
        );

        let stranger = Agreement::from_draft(draft(), AgreementCode::from_sequence(99));
        assert!(matches!(
            repo.persist_update(&stranger).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_seeded_catalog_lookups() {
        let catalog = InMemoryReferenceCatalog::seeded();
        assert!(catalog.supplier("K0000001").await.unwrap().is_some());
        assert!(catalog.supplier("K9999999").await.unwrap().is_none());
        assert_eq!(
            catalog.scale("03").await.unwrap().unwrap().grid,
            GridType::Fix
        );

        let suppliers = catalog.list_suppliers().await.unwrap();
        assert_eq!(suppliers.len(), 20);
        assert_eq!(suppliers[0].code, "K0000001");

        let types: Vec<_> = catalog
            .list_agreement_types()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.code)
            .collect();
        assert_eq!(types, vec!["E001", "E002", "M001", "P001", "T001"]);
    }

    #[tokio::test]
    async fn test_user_usernames_are_unique() {
        let repo = InMemoryUserRepository::new();
        let user = User::new("admin", "admin@example.com", "hash", true);
        repo.create(&user).await.unwrap();
        assert!(repo.create(&user).await.is_err());
        assert!(repo.find_by_username("admin").await.unwrap().is_some());
        assert!(repo.find_by_username("nobody").await.unwrap().is_none());
    }
}
