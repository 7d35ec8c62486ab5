// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0

//! Reference data: suppliers, agreement types and scales.
//!
//! These rows are seeded by migrations and never mutated by the service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the condition value of an agreement is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GridType {
    /// Percentage of a base, bounded to 100
    Percent,
    /// Fixed monetary amount, unbounded
    Fix,
}

impl GridType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Percent => "PERCENT",
            Self::Fix => "FIX",
        }
    }

    /// Upper bound for condition values on this grid, if any
    pub fn upper_bound(&self) -> Option<Decimal> {
        match self {
            Self::Percent => Some(Decimal::ONE_HUNDRED),
            Self::Fix => None,
        }
    }

    /// Check whether a condition value fits this grid
    pub fn admits(&self, value: Decimal) -> bool {
        match self.upper_bound() {
            Some(bound) => value <= bound,
            None => true,
        }
    }
}

impl std::fmt::Display for GridType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GridType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PERCENT" => Ok(Self::Percent),
            "FIX" => Ok(Self::Fix),
            other => Err(format!("unknown grid type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementType {
    pub code: String,
    pub name: String,
}

/// A scale defines the grid a condition value is measured on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    pub code: String,
    pub name: String,
    pub grid: GridType,
}

impl Supplier {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self { code: code.into(), name: name.into() }
    }
}

impl AgreementType {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self { code: code.into(), name: name.into() }
    }
}

impl Scale {
    pub fn new(code: impl Into<String>, name: impl Into<String>, grid: GridType) -> Self {
        Self { code: code.into(), name: name.into(), grid }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_grid_bound_is_inclusive() {
        assert!(GridType::Percent.admits(Decimal::ONE_HUNDRED));
        assert!(GridType::Percent.admits(Decimal::new(1550, 2)));
        assert!(!GridType::Percent.admits(Decimal::new(10001, 2)));
    }

    #[test]
    fn test_fix_grid_is_unbounded() {
        assert!(GridType::Fix.admits(Decimal::new(150_000, 0)));
        assert_eq!(GridType::Fix.upper_bound(), None);
    }

    #[test]
    fn test_grid_type_string_forms() {
        assert_eq!("PERCENT".parse::<GridType>().unwrap(), GridType::Percent);
        assert_eq!("FIX".parse::<GridType>().unwrap(), GridType::Fix);
        assert!("percent".parse::<GridType>().is_err());
        assert_eq!(serde_json::to_string(&GridType::Percent).unwrap(), "\"PERCENT\"");
    }
}
