// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0

// Calculation Engine - Strategy Registry and Dispatch
//
// Maps agreement type codes to calculation strategies and runs the selected
// strategy for an agreement over a date range. The registry is built once at
// startup and handed to the dispatcher; it is not mutated afterwards.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::agreement::AgreementId;
use crate::domain::calculation::{CalculationError, CalculationPeriod, CalculationStrategy};
use crate::domain::repository::AgreementRepository;
use crate::domain::service_config::CalculationConfig;
use crate::infrastructure::strategies::PercentTurnoverStrategy;

/// Agreement type code -> strategy
#[derive(Default, Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn CalculationStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from `spec.calculation.strategies`
    pub fn from_config(config: &CalculationConfig) -> anyhow::Result<Self> {
        let mut registry = Self::new();

        info!("Initializing calculation strategy registry");

        for binding in &config.strategies {
            let strategy = Self::create_strategy(&binding.strategy)?;
            info!(
                "Binding agreement type '{}' -> {}",
                binding.agreement_type, binding.strategy
            );
            registry.register(binding.agreement_type.clone(), strategy);
        }

        if registry.is_empty() {
            warn!("No calculation strategies configured - every dispatch will be unsupported");
        }

        Ok(registry)
    }

    fn create_strategy(kind: &str) -> anyhow::Result<Arc<dyn CalculationStrategy>> {
        let strategy: Arc<dyn CalculationStrategy> = match kind {
            PercentTurnoverStrategy::KIND => Arc::new(PercentTurnoverStrategy::new()),
            _ => anyhow::bail!("Unsupported calculation strategy: {}", kind),
        };
        Ok(strategy)
    }

    /// Bind a strategy to an agreement type. A later binding for the same code
    /// replaces the earlier one, which is returned.
    pub fn register(
        &mut self,
        agreement_type_code: impl Into<String>,
        strategy: Arc<dyn CalculationStrategy>,
    ) -> Option<Arc<dyn CalculationStrategy>> {
        let code = agreement_type_code.into();
        let previous = self.strategies.insert(code.clone(), strategy);
        if let Some(prev) = &previous {
            debug!(agreement_type = %code, replaced = prev.name(), "Strategy binding replaced");
        }
        previous
    }

    pub fn get(&self, agreement_type_code: &str) -> Option<Arc<dyn CalculationStrategy>> {
        self.strategies.get(agreement_type_code).cloned()
    }

    /// Bound agreement type codes, sorted
    pub fn registered_types(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.strategies.keys().cloned().collect();
        codes.sort();
        codes
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

pub struct CalculationDispatcher {
    repository: Arc<dyn AgreementRepository>,
    registry: Arc<StrategyRegistry>,
}

impl CalculationDispatcher {
    pub fn new(repository: Arc<dyn AgreementRepository>, registry: Arc<StrategyRegistry>) -> Self {
        Self {
            repository,
            registry,
        }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Calculate the bonus of an agreement over `[period_from, period_to]`
    pub async fn run(
        &self,
        agreement_id: AgreementId,
        period_from: NaiveDate,
        period_to: NaiveDate,
    ) -> Result<Decimal, CalculationError> {
        let result = self.dispatch(agreement_id, period_from, period_to).await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(CalculationError::AgreementNotFound(_)) => "not_found",
            Err(CalculationError::UnsupportedAgreementType(_)) => "unsupported",
            Err(CalculationError::InvalidPeriod { .. }) => "invalid_period",
            Err(CalculationError::Unavailable(_)) => "unavailable",
            Err(CalculationError::Failed(_)) => "failed",
            Err(CalculationError::Repository(_)) => "repository_error",
        };
        metrics::counter!("bonus_calculation_dispatch_total", "outcome" => outcome).increment(1);

        match &result {
            Ok(amount) => info!(agreement_id = %agreement_id, %amount, "Bonus calculated"),
            Err(e) => warn!(agreement_id = %agreement_id, outcome, "Bonus calculation did not complete: {}", e),
        }
        result
    }

    async fn dispatch(
        &self,
        agreement_id: AgreementId,
        period_from: NaiveDate,
        period_to: NaiveDate,
    ) -> Result<Decimal, CalculationError> {
        let period = CalculationPeriod::new(period_from, period_to)?;

        let agreement = self
            .repository
            .select_by_id(agreement_id)
            .await?
            .ok_or(CalculationError::AgreementNotFound(agreement_id))?;

        let type_code = agreement.terms.agreement_type_code();
        let strategy = self
            .registry
            .get(type_code)
            .ok_or_else(|| CalculationError::UnsupportedAgreementType(type_code.to_string()))?;

        debug!(
            agreement_id = %agreement_id,
            agreement_type = type_code,
            strategy = strategy.name(),
            "Dispatching bonus calculation"
        );

        strategy.calculate(agreement_id, period.from, period.to).await
    }
}
