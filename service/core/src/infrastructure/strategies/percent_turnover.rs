// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::agreement::AgreementId;
use crate::domain::calculation::{CalculationError, CalculationStrategy};

/// Bonus as a percentage of purchase or sales turnover.
///
/// There is no turnover source wired in yet, so every call reports
/// [`CalculationError::Unavailable`].
#[derive(Debug, Default, Clone)]
pub struct PercentTurnoverStrategy;

impl PercentTurnoverStrategy {
    pub const KIND: &'static str = "percent-turnover";

    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CalculationStrategy for PercentTurnoverStrategy {
    fn name(&self) -> &str {
        Self::KIND
    }

    async fn calculate(
        &self,
        agreement_id: AgreementId,
        period_from: NaiveDate,
        period_to: NaiveDate,
    ) -> Result<Decimal, CalculationError> {
        tracing::debug!(
            agreement_id = %agreement_id,
            %period_from,
            %period_to,
            "Turnover calculation requested without a turnover source"
        );
        Err(CalculationError::Unavailable(
            "turnover data source is not configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reports_unavailable() {
        let strategy = PercentTurnoverStrategy::new();
        let day = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let err = strategy
            .calculate(AgreementId::new(), day, day)
            .await
            .unwrap_err();
        assert!(matches!(err, CalculationError::Unavailable(_)));
        assert_eq!(strategy.name(), "percent-turnover");
    }
}
