// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0

pub mod agreement_service;
pub mod projection;
pub mod reference_service;
pub mod calculation_engine;
pub mod auth_service;
pub mod repository_factory;

pub use agreement_service::{AgreementLifecycleService, StandardAgreementLifecycleService};
pub use calculation_engine::{CalculationDispatcher, StrategyRegistry};
