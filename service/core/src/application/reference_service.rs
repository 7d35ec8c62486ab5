// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0

use std::sync::Arc;

use crate::domain::reference::{AgreementType, Scale, Supplier};
use crate::domain::repository::{ReferenceCatalog, RepositoryError};

/// Listing of reference data for pickers and lookups
#[derive(Clone)]
pub struct ReferenceService {
    catalog: Arc<dyn ReferenceCatalog>,
}

impl ReferenceService {
    pub fn new(catalog: Arc<dyn ReferenceCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn suppliers(&self) -> Result<Vec<Supplier>, RepositoryError> {
        self.catalog.list_suppliers().await
    }

    pub async fn agreement_types(&self) -> Result<Vec<AgreementType>, RepositoryError> {
        self.catalog.list_agreement_types().await
    }

    pub async fn scales(&self) -> Result<Vec<Scale>, RepositoryError> {
        self.catalog.list_scales().await
    }
}
