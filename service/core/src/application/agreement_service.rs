// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0
//! Agreement Lifecycle Service
//!
//! Orchestrates create, read, update and status transitions of supplier
//! agreements against the reference catalog and the agreement store.
//!
//! Structural rules (date order, positive value, non-empty codes) are enforced
//! when [`AgreementTerms`] is constructed. This service adds the referential
//! checks and the PERCENT grid bound, which need the catalog.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Agreement use cases

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::agreement::{
    Agreement, AgreementDraft, AgreementError, AgreementId, AgreementStatus, AgreementTerms,
};
use crate::domain::repository::{AgreementRepository, ReferenceCatalog};

#[async_trait]
pub trait AgreementLifecycleService: Send + Sync {
    /// Validate against the catalog and store a new agreement
    async fn create(&self, terms: AgreementTerms) -> Result<Agreement, AgreementError>;

    async fn get_by_id(&self, id: AgreementId) -> Result<Agreement, AgreementError>;

    /// All agreements, most recently created first
    async fn get_all(&self) -> Result<Vec<Agreement>, AgreementError>;

    /// Replace every mutable field of a non-deleted agreement
    async fn update(&self, id: AgreementId, terms: AgreementTerms)
        -> Result<Agreement, AgreementError>;

    /// Set the status. Any transition is accepted.
    async fn update_status(
        &self,
        id: AgreementId,
        status: AgreementStatus,
    ) -> Result<Agreement, AgreementError>;
}

pub struct StandardAgreementLifecycleService {
    repository: Arc<dyn AgreementRepository>,
    catalog: Arc<dyn ReferenceCatalog>,
}

impl StandardAgreementLifecycleService {
    pub fn new(
        repository: Arc<dyn AgreementRepository>,
        catalog: Arc<dyn ReferenceCatalog>,
    ) -> Self {
        Self {
            repository,
            catalog,
        }
    }

    /// Referential checks shared by create and update
    async fn validate_references(&self, terms: &AgreementTerms) -> Result<(), AgreementError> {
        if self.catalog.supplier(terms.supplier_code()).await?.is_none() {
            return Err(rejected("supplier_code", "Invalid supplier_code"));
        }

        if self
            .catalog
            .agreement_type(terms.agreement_type_code())
            .await?
            .is_none()
        {
            return Err(rejected("agreement_type_code", "Invalid agreement_type_code"));
        }

        let scale = self
            .catalog
            .scale(terms.scale_code())
            .await?
            .ok_or_else(|| rejected("scale_code", "Invalid scale_code"))?;

        let value = terms.condition_value();
        if let Some(bound) = scale.grid.upper_bound().filter(|_| !scale.grid.admits(value)) {
            return Err(rejected(
                "condition_value",
                format!("For {} grid, condition_value must be <= {}", scale.grid, bound),
            ));
        }

        Ok(())
    }
}

fn rejected(field: &'static str, message: impl Into<String>) -> AgreementError {
    let message = message.into();
    warn!(field, %message, "Agreement rejected");
    metrics::counter!("bonus_agreement_validation_failures_total", "field" => field).increment(1);
    AgreementError::validation(field, message)
}

#[async_trait]
impl AgreementLifecycleService for StandardAgreementLifecycleService {
    async fn create(&self, terms: AgreementTerms) -> Result<Agreement, AgreementError> {
        self.validate_references(&terms).await?;

        let agreement = self.repository.insert(AgreementDraft::new(terms)).await?;

        info!(
            agreement_id = %agreement.id,
            code = %agreement.code,
            supplier = agreement.terms.supplier_code(),
            "Agreement created"
        );
        metrics::counter!("bonus_agreements_created_total").increment(1);
        Ok(agreement)
    }

    async fn get_by_id(&self, id: AgreementId) -> Result<Agreement, AgreementError> {
        debug!(agreement_id = %id, "Loading agreement");
        self.repository
            .select_by_id(id)
            .await?
            .ok_or(AgreementError::NotFound(id))
    }

    async fn get_all(&self) -> Result<Vec<Agreement>, AgreementError> {
        Ok(self.repository.select_all().await?)
    }

    async fn update(
        &self,
        id: AgreementId,
        terms: AgreementTerms,
    ) -> Result<Agreement, AgreementError> {
        let mut agreement = self.get_by_id(id).await?;

        if agreement.is_deleted() {
            warn!(agreement_id = %id, "Rejected edit of a deleted agreement");
            return Err(AgreementError::Deleted(id));
        }

        self.validate_references(&terms).await?;
        agreement.apply_terms(terms)?;

        let stored = self.repository.persist_update(&agreement).await?;

        info!(agreement_id = %stored.id, code = %stored.code, "Agreement updated");
        metrics::counter!("bonus_agreements_updated_total").increment(1);
        Ok(stored)
    }

    async fn update_status(
        &self,
        id: AgreementId,
        status: AgreementStatus,
    ) -> Result<Agreement, AgreementError> {
        let mut agreement = self.get_by_id(id).await?;
        let previous = agreement.status;
        agreement.set_status(status);

        let stored = self.repository.persist_update(&agreement).await?;

        info!(
            agreement_id = %stored.id,
            code = %stored.code,
            from = %previous,
            to = %stored.status,
            "Agreement status changed"
        );
        metrics::counter!("bonus_agreement_status_changes_total", "status" => status.as_str())
            .increment(1);
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::{
        InMemoryAgreementRepository, InMemoryReferenceCatalog,
    };
    use crate::domain::reference::{AgreementType, GridType, Scale, Supplier};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn service() -> StandardAgreementLifecycleService {
        StandardAgreementLifecycleService::new(
            Arc::new(InMemoryAgreementRepository::new()),
            Arc::new(InMemoryReferenceCatalog::seeded()),
        )
    }

    fn terms(supplier: &str, agreement_type: &str, scale: &str, value: Decimal) -> AgreementTerms {
        AgreementTerms::new(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            supplier,
            agreement_type,
            scale,
            value,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_reference_checks_name_the_field() {
        let service = service();
        let cases = [
            (terms("K9999999", "T001", "02", Decimal::TEN), "supplier_code"),
            (terms("K0000001", "X999", "02", Decimal::TEN), "agreement_type_code"),
            (terms("K0000001", "T001", "99", Decimal::TEN), "scale_code"),
        ];

        for (input, field) in cases {
            let err = service.create(input).await.unwrap_err();
            assert_eq!(err.field(), Some(field));
        }
        assert!(service.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_grid_bound_message_follows_the_scale() {
        let service = service();
        let err = service
            .create(terms("K0000001", "T001", "01", Decimal::new(10001, 2)))
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("condition_value"));
        assert!(err
            .to_string()
            .contains("For PERCENT grid, condition_value must be <= 100"));

        // A catalog-defined scale reports its own grid
        let custom = StandardAgreementLifecycleService::new(
            Arc::new(InMemoryAgreementRepository::new()),
            Arc::new(InMemoryReferenceCatalog::new(
                [Supplier::new("K0000001", "Supplier")],
                [AgreementType::new("T001", "Turnover")],
                [Scale::new("07", "Markup", GridType::Percent)],
            )),
        );
        let err = custom
            .create(terms("K0000001", "T001", "07", Decimal::new(250, 0)))
            .await
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("For PERCENT grid, condition_value must be <= 100"));
        assert!(custom.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fix_scale_accepts_large_values() {
        let service = service();
        let created = service
            .create(terms("K0000002", "M001", "03", Decimal::new(150_000, 0)))
            .await
            .unwrap();
        assert_eq!(created.terms.condition_value(), Decimal::new(150_000, 0));
    }

    #[tokio::test]
    async fn test_update_status_touches_updated_at() {
        let service = service();
        let created = service
            .create(terms("K0000001", "T001", "01", Decimal::TEN))
            .await
            .unwrap();

        let changed = service
            .update_status(created.id, AgreementStatus::Calculated)
            .await
            .unwrap();
        assert_eq!(changed.status, AgreementStatus::Calculated);
        assert!(changed.updated_at >= created.updated_at);
        assert_eq!(changed.code, created.code);
    }
}
