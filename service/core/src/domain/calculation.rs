// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0
//! Bonus Calculation Domain Interface
//!
//! A calculation strategy turns an agreement and a date range into a bonus
//! amount. Strategies are selected by agreement type code through
//! `crate::application::calculation_engine::StrategyRegistry`; each agreement
//! type plugs in its own implementation without the dispatcher knowing about
//! it.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Strategy contract and calculation errors

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::agreement::AgreementId;
use crate::domain::repository::RepositoryError;

/// Capability interface implemented once per agreement type
#[async_trait]
pub trait CalculationStrategy: Send + Sync {
    /// Short identifier used in configuration bindings and logs
    fn name(&self) -> &str;

    /// Compute the bonus for an agreement over an inclusive date range
    async fn calculate(
        &self,
        agreement_id: AgreementId,
        period_from: NaiveDate,
        period_to: NaiveDate,
    ) -> Result<Decimal, CalculationError>;
}

/// Inclusive date range a bonus is calculated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationPeriod {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl CalculationPeriod {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, CalculationError> {
        if to < from {
            return Err(CalculationError::InvalidPeriod { from, to });
        }
        Ok(Self { from, to })
    }
}

/// Errors that can occur while dispatching or running a calculation
#[derive(Debug, thiserror::Error)]
pub enum CalculationError {
    #[error("Agreement not found: {0}")]
    AgreementNotFound(AgreementId),

    #[error("No calculation strategy registered for agreement type '{0}'")]
    UnsupportedAgreementType(String),

    #[error("Invalid calculation period: {from} is after {to}")]
    InvalidPeriod { from: NaiveDate, to: NaiveDate },

    #[error("Calculation unavailable: {0}")]
    Unavailable(String),

    #[error("Calculation failed: {0}")]
    Failed(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CalculationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::AgreementNotFound(_) => "agreement_not_found",
            Self::UnsupportedAgreementType(_) => "unsupported_agreement_type",
            Self::InvalidPeriod { .. } => "validation_error",
            Self::Unavailable(_) => "calculation_unavailable",
            Self::Failed(_) => "calculation_failed",
            Self::Repository(_) => "repository_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_rejects_inverted_range() {
        let from = NaiveDate::from_ymd_opt(2026, 6, 30).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let err = CalculationPeriod::new(from, to).unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn test_period_accepts_single_day() {
        let day = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        assert!(CalculationPeriod::new(day, day).is_ok());
    }
}
