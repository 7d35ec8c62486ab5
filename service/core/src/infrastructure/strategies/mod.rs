// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0

//! Bonus calculation strategies.
//!
//! Each strategy has a stable kind string used in
//! `spec.calculation.strategies` bindings.

pub mod percent_turnover;

pub use percent_turnover::PercentTurnoverStrategy;
