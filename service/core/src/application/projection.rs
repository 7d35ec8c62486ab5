// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0

//! Read-side projection of agreements.
//!
//! Agreements store reference codes only. Callers want the supplier name, the
//! agreement type name and the scale name and grid next to them, so views are
//! assembled by resolving codes through the catalog. A code the catalog no
//! longer knows yields `None` for its display fields.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::agreement::{Agreement, AgreementCode, AgreementId, AgreementStatus};
use crate::domain::reference::{GridType, Scale};
use crate::domain::repository::{ReferenceCatalog, RepositoryError};

/// Flattened agreement with resolved reference names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgreementView {
    pub id: AgreementId,
    pub code: AgreementCode,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub supplier_code: String,
    pub supplier_name: Option<String>,
    pub agreement_type_code: String,
    pub agreement_type_name: Option<String>,
    pub scale_code: String,
    pub scale_name: Option<String>,
    pub scale_grid: Option<GridType>,
    pub condition_value: Decimal,
    pub status: AgreementStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AgreementView {
    fn assemble(
        agreement: &Agreement,
        supplier_name: Option<String>,
        agreement_type_name: Option<String>,
        scale: Option<Scale>,
    ) -> Self {
        let terms = &agreement.terms;
        let (scale_name, scale_grid) = match scale {
            Some(scale) => (Some(scale.name), Some(scale.grid)),
            None => (None, None),
        };

        Self {
            id: agreement.id,
            code: agreement.code.clone(),
            valid_from: terms.valid_from(),
            valid_to: terms.valid_to(),
            supplier_code: terms.supplier_code().to_string(),
            supplier_name,
            agreement_type_code: terms.agreement_type_code().to_string(),
            agreement_type_name,
            scale_code: terms.scale_code().to_string(),
            scale_name,
            scale_grid,
            condition_value: terms.condition_value(),
            status: agreement.status,
            created_at: agreement.created_at,
            updated_at: agreement.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct AgreementProjector {
    catalog: Arc<dyn ReferenceCatalog>,
}

impl AgreementProjector {
    pub fn new(catalog: Arc<dyn ReferenceCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn project(&self, agreement: &Agreement) -> Result<AgreementView, RepositoryError> {
        let terms = &agreement.terms;
        let supplier = self.catalog.supplier(terms.supplier_code()).await?;
        let agreement_type = self.catalog.agreement_type(terms.agreement_type_code()).await?;
        let scale = self.catalog.scale(terms.scale_code()).await?;

        Ok(AgreementView::assemble(
            agreement,
            supplier.map(|s| s.name),
            agreement_type.map(|t| t.name),
            scale,
        ))
    }

    /// Project a batch with one catalog listing per reference kind
    pub async fn project_all(
        &self,
        agreements: &[Agreement],
    ) -> Result<Vec<AgreementView>, RepositoryError> {
        if agreements.is_empty() {
            return Ok(Vec::new());
        }

        let suppliers: HashMap<String, String> = self
            .catalog
            .list_suppliers()
            .await?
            .into_iter()
            .map(|s| (s.code, s.name))
            .collect();
        let agreement_types: HashMap<String, String> = self
            .catalog
            .list_agreement_types()
            .await?
            .into_iter()
            .map(|t| (t.code, t.name))
            .collect();
        let scales: HashMap<String, Scale> = self
            .catalog
            .list_scales()
            .await?
            .into_iter()
            .map(|s| (s.code.clone(), s))
            .collect();

        Ok(agreements
            .iter()
            .map(|agreement| {
                let terms = &agreement.terms;
                AgreementView::assemble(
                    agreement,
                    suppliers.get(terms.supplier_code()).cloned(),
                    agreement_types.get(terms.agreement_type_code()).cloned(),
                    scales.get(terms.scale_code()).cloned(),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agreement::{AgreementDraft, AgreementTerms};
    use crate::domain::reference::{AgreementType, Supplier};
    use crate::infrastructure::repositories::InMemoryReferenceCatalog;

    fn agreement(supplier: &str) -> Agreement {
        let terms = AgreementTerms::new(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
            supplier,
            "T001",
            "02",
            Decimal::new(1550, 2),
        )
        .unwrap();
        Agreement::from_draft(AgreementDraft::new(terms), AgreementCode::from_sequence(1))
    }

    #[tokio::test]
    async fn test_project_resolves_names() {
        let projector = AgreementProjector::new(Arc::new(InMemoryReferenceCatalog::seeded()));
        let view = projector.project(&agreement("K0000001")).await.unwrap();

        assert_eq!(view.supplier_name.as_deref(), Some("ООО \"Альфа Трейд\""));
        assert_eq!(view.agreement_type_name.as_deref(), Some("Оборотный бонус"));
        assert_eq!(view.scale_name.as_deref(), Some("% от закупок"));
        assert_eq!(view.scale_grid, Some(GridType::Percent));
        assert_eq!(view.code.as_str(), "00000001");
    }

    #[tokio::test]
    async fn test_unknown_codes_project_to_none() {
        let catalog = InMemoryReferenceCatalog::new(
            vec![Supplier::new("K0000001", "Alpha")],
            vec![AgreementType::new("T001", "Turnover")],
            Vec::new(),
        );
        let projector = AgreementProjector::new(Arc::new(catalog));

        let views = projector
            .project_all(&[agreement("K0000001"), agreement("K0000042")])
            .await
            .unwrap();

        assert_eq!(views[0].supplier_name.as_deref(), Some("Alpha"));
        assert_eq!(views[1].supplier_name, None);
        assert_eq!(views[1].agreement_type_name.as_deref(), Some("Turnover"));
        assert!(views.iter().all(|v| v.scale_name.is_none() && v.scale_grid.is_none()));
    }
}
