// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::repository::RepositoryError;

// ============================================================================
// Value Objects
// ============================================================================

/// Unique identifier for an agreement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgreementId(pub Uuid);

impl AgreementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for AgreementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AgreementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Width of the human-facing agreement code
pub const AGREEMENT_CODE_WIDTH: usize = 8;

/// Human-facing agreement number, e.g. `00000042`.
///
/// Assigned by the store from a monotonically increasing sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgreementCode(String);

impl AgreementCode {
    /// Build the code for the n-th sequence value
    pub fn from_sequence(value: u64) -> Self {
        Self(format!("{:0width$}", value, width = AGREEMENT_CODE_WIDTH))
    }

    /// Wrap a code read back from storage
    pub fn from_stored(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgreementCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fractional digits kept for condition values
pub const CONDITION_VALUE_SCALE: u32 = 2;

/// Agreement lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgreementStatus {
    /// Waiting for the next bonus calculation run
    ReadyForCalculation,
    /// Bonus has been calculated
    Calculated,
    /// Soft-deleted; terminal for field edits
    Deleted,
}

impl AgreementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadyForCalculation => "READY_FOR_CALCULATION",
            Self::Calculated => "CALCULATED",
            Self::Deleted => "DELETED",
        }
    }
}

impl Default for AgreementStatus {
    fn default() -> Self {
        Self::ReadyForCalculation
    }
}

impl std::fmt::Display for AgreementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgreementStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "READY_FOR_CALCULATION" => Ok(Self::ReadyForCalculation),
            "CALCULATED" => Ok(Self::Calculated),
            "DELETED" => Ok(Self::Deleted),
            other => Err(format!("unknown agreement status: {}", other)),
        }
    }
}

/// The mutable business fields of an agreement.
///
/// Construction goes through [`AgreementTerms::new`], which enforces the
/// structural invariants (date order, positive condition value, non-empty
/// reference codes). Referential checks against the catalog happen in the
/// lifecycle service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgreementTerms {
    valid_from: NaiveDate,
    valid_to: NaiveDate,
    supplier_code: String,
    agreement_type_code: String,
    scale_code: String,
    condition_value: Decimal,
}

impl AgreementTerms {
    pub fn new(
        valid_from: NaiveDate,
        valid_to: NaiveDate,
        supplier_code: impl Into<String>,
        agreement_type_code: impl Into<String>,
        scale_code: impl Into<String>,
        condition_value: Decimal,
    ) -> Result<Self, AgreementError> {
        if valid_to < valid_from {
            return Err(AgreementError::validation(
                "valid_to",
                "valid_to must be >= valid_from",
            ));
        }

        if condition_value <= Decimal::ZERO {
            return Err(AgreementError::validation(
                "condition_value",
                "condition_value must be greater than zero",
            ));
        }

        // Trailing zeros do not count: 15.500 is stored as 15.50
        if condition_value.normalize().scale() > CONDITION_VALUE_SCALE {
            return Err(AgreementError::validation(
                "condition_value",
                format!(
                    "condition_value must have at most {} decimal places",
                    CONDITION_VALUE_SCALE
                ),
            ));
        }

        let supplier_code = required_code("supplier_code", supplier_code.into())?;
        let agreement_type_code = required_code("agreement_type_code", agreement_type_code.into())?;
        let scale_code = required_code("scale_code", scale_code.into())?;

        Ok(Self {
            valid_from,
            valid_to,
            supplier_code,
            agreement_type_code,
            scale_code,
            condition_value: condition_value.round_dp(CONDITION_VALUE_SCALE),
        })
    }

    pub fn valid_from(&self) -> NaiveDate {
        self.valid_from
    }

    pub fn valid_to(&self) -> NaiveDate {
        self.valid_to
    }

    pub fn supplier_code(&self) -> &str {
        &self.supplier_code
    }

    pub fn agreement_type_code(&self) -> &str {
        &self.agreement_type_code
    }

    pub fn scale_code(&self) -> &str {
        &self.scale_code
    }

    pub fn condition_value(&self) -> Decimal {
        self.condition_value
    }
}

fn required_code(field: &'static str, value: String) -> Result<String, AgreementError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AgreementError::validation(field, format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

// ============================================================================
// Aggregate Root: Agreement
// ============================================================================

/// An agreement that has been validated but not stored yet.
///
/// The store turns it into an [`Agreement`] by assigning the code.
#[derive(Debug, Clone)]
pub struct AgreementDraft {
    pub id: AgreementId,
    pub terms: AgreementTerms,
    pub status: AgreementStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AgreementDraft {
    pub fn new(terms: AgreementTerms) -> Self {
        let now = Utc::now();
        Self {
            id: AgreementId::new(),
            terms,
            status: AgreementStatus::ReadyForCalculation,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Supplier bonus agreement aggregate root
#[derive(Debug, Clone, Serialize)]
pub struct Agreement {
    pub id: AgreementId,
    pub code: AgreementCode,
    #[serde(flatten)]
    pub terms: AgreementTerms,
    pub status: AgreementStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agreement {
    /// Materialize a draft once the store has assigned its code
    pub fn from_draft(draft: AgreementDraft, code: AgreementCode) -> Self {
        Self {
            id: draft.id,
            code,
            terms: draft.terms,
            status: draft.status,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.status == AgreementStatus::Deleted
    }

    /// Replace all mutable fields. Rejected once the agreement is deleted.
    pub fn apply_terms(&mut self, terms: AgreementTerms) -> Result<(), AgreementError> {
        if self.is_deleted() {
            return Err(AgreementError::Deleted(self.id));
        }
        self.terms = terms;
        self.touch();
        Ok(())
    }

    /// Move to another status. Any transition is accepted, including out of
    /// `Deleted`.
    pub fn set_status(&mut self, status: AgreementStatus) {
        self.status = status;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// Domain Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum AgreementError {
    #[error("Agreement not found: {0}")]
    NotFound(AgreementId),

    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("Cannot edit a deleted agreement")]
    Deleted(AgreementId),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AgreementError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable code callers can branch on
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "agreement_not_found",
            Self::Validation { .. } => "validation_error",
            Self::Deleted(_) => "agreement_deleted",
            Self::Repository(_) => "repository_error",
        }
    }

    /// Field the rejection refers to, for validation failures
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn terms(value: Decimal) -> Result<AgreementTerms, AgreementError> {
        AgreementTerms::new(
            date(2026, 1, 1),
            date(2026, 12, 31),
            "K0000001",
            "T001",
            "02",
            value,
        )
    }

    #[test]
    fn test_agreement_code_is_zero_padded() {
        assert_eq!(AgreementCode::from_sequence(1).as_str(), "00000001");
        assert_eq!(AgreementCode::from_sequence(12345).as_str(), "00012345");
        assert!(AgreementCode::from_sequence(2) > AgreementCode::from_sequence(1));
    }

    #[test]
    fn test_status_string_forms() {
        assert_eq!(
            "READY_FOR_CALCULATION".parse::<AgreementStatus>().unwrap(),
            AgreementStatus::ReadyForCalculation
        );
        assert_eq!(AgreementStatus::Deleted.as_str(), "DELETED");
        assert!("deleted".parse::<AgreementStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&AgreementStatus::Calculated).unwrap(),
            "\"CALCULATED\""
        );
    }

    #[test]
    fn test_terms_accept_single_day_period() {
        let result = AgreementTerms::new(
            date(2026, 3, 1),
            date(2026, 3, 1),
            "K0000001",
            "T001",
            "03",
            Decimal::new(5000, 0),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_terms_reject_inverted_period() {
        let err = AgreementTerms::new(
            date(2026, 12, 31),
            date(2026, 1, 1),
            "K0000001",
            "T001",
            "02",
            Decimal::TEN,
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("valid_to"));
    }

    #[test]
    fn test_terms_reject_non_positive_value() {
        assert_eq!(terms(Decimal::ZERO).unwrap_err().field(), Some("condition_value"));
        assert_eq!(terms(Decimal::new(-1, 0)).unwrap_err().field(), Some("condition_value"));
    }

    #[test]
    fn test_terms_reject_sub_cent_values() {
        for value in ["0.001", "0.004", "100.004"] {
            let err = terms(value.parse().unwrap()).unwrap_err();
            assert_eq!(err.field(), Some("condition_value"));
        }
        let kept = terms("15.500".parse().unwrap()).unwrap();
        assert_eq!(kept.condition_value(), Decimal::new(1550, 2));
        assert_eq!(kept.condition_value().scale(), 2);
    }

    #[test]
    fn test_terms_reject_blank_codes() {
        let err = AgreementTerms::new(
            date(2026, 1, 1),
            date(2026, 2, 1),
            "  ",
            "T001",
            "02",
            Decimal::TEN,
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("supplier_code"));
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn test_new_draft_is_ready_for_calculation() {
        let draft = AgreementDraft::new(terms(Decimal::new(1550, 2)).unwrap());
        assert_eq!(draft.status, AgreementStatus::ReadyForCalculation);
        assert_eq!(draft.created_at, draft.updated_at);
    }

    #[test]
    fn test_deleted_agreement_rejects_new_terms() {
        let draft = AgreementDraft::new(terms(Decimal::TEN).unwrap());
        let mut agreement = Agreement::from_draft(draft, AgreementCode::from_sequence(7));
        agreement.set_status(AgreementStatus::Deleted);

        let before = agreement.terms.clone();
        let err = agreement.apply_terms(terms(Decimal::new(20, 0)).unwrap()).unwrap_err();

        assert!(matches!(err, AgreementError::Deleted(_)));
        assert_eq!(err.code(), "agreement_deleted");
        assert_eq!(agreement.terms, before);
    }

    #[test]
    fn test_status_can_leave_deleted() {
        let draft = AgreementDraft::new(terms(Decimal::TEN).unwrap());
        let mut agreement = Agreement::from_draft(draft, AgreementCode::from_sequence(1));
        agreement.set_status(AgreementStatus::Deleted);
        agreement.set_status(AgreementStatus::ReadyForCalculation);
        assert_eq!(agreement.status, AgreementStatus::ReadyForCalculation);
    }

    #[test]
    fn test_serialized_agreement_is_flat() {
        let draft = AgreementDraft::new(terms(Decimal::new(1550, 2)).unwrap());
        let agreement = Agreement::from_draft(draft, AgreementCode::from_sequence(3));
        let json = serde_json::to_value(&agreement).unwrap();
        assert_eq!(json["code"], "00000003");
        assert_eq!(json["supplier_code"], "K0000001");
        assert_eq!(json["valid_from"], "2026-01-01");
        assert_eq!(json["status"], "READY_FOR_CALCULATION");
    }
}
