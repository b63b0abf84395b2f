// 📐 Transaction validator - cross-field invariants before persistence
// Every check runs; the caller gets the full list of violations at once

use crate::db::{TaxationType, Transaction};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// FIELD ERROR
// ============================================================================

/// Machine-readable reason; localization is a UI concern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReasonCode {
    NotPositive,
    Negative,
    MustBeZero,
    ExceedsGross,
    OutOfRange,
    Empty,
    InFuture,
    TooOld,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub code: ReasonCode,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:?}", self.field, self.code)
    }
}

impl std::error::Error for FieldError {}

// ============================================================================
// OUTCOME
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

impl ValidationOutcome {
    pub fn error_on(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Sanity floor: dates before this are rejected
    pub date_floor: NaiveDate,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig {
            date_floor: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        }
    }
}

/// Validate a fully populated draft against the persistence invariants.
///
/// `today` is passed in by the caller (local calendar date) so the check is
/// a pure function. Checks are never short-circuited. The six-value evidence
/// set is enforced at the enum parse boundary and cannot be violated here.
pub fn validate_transaction(
    tx: &Transaction,
    config: &ValidatorConfig,
    today: NaiveDate,
) -> ValidationOutcome {
    let mut errors = Vec::new();

    if tx.amount_gross <= 0 {
        errors.push(FieldError { field: "amount_gross", code: ReasonCode::NotPositive });
    }

    if tx.vat_amount < 0 {
        errors.push(FieldError { field: "vat_amount", code: ReasonCode::Negative });
    }

    // Outside the TAXABLE regime the VAT portion must be zero
    if tx.taxation_type != TaxationType::Taxable && tx.vat_amount != 0 {
        errors.push(FieldError { field: "vat_amount", code: ReasonCode::MustBeZero });
    }

    if tx.vat_amount > tx.amount_gross {
        errors.push(FieldError { field: "vat_amount", code: ReasonCode::ExceedsGross });
    }

    if !tx.business_use_ratio.is_finite()
        || tx.business_use_ratio < 0.0
        || tx.business_use_ratio > 1.0
    {
        errors.push(FieldError { field: "business_use_ratio", code: ReasonCode::OutOfRange });
    }

    if tx.counterparty_name.trim().is_empty() {
        errors.push(FieldError { field: "counterparty_name", code: ReasonCode::Empty });
    }

    if tx.date > today {
        errors.push(FieldError { field: "date", code: ReasonCode::InFuture });
    }

    if tx.date < config.date_floor {
        errors.push(FieldError { field: "date", code: ReasonCode::TooOld });
    }

    ValidationOutcome { valid: errors.is_empty(), errors }
}

// ============================================================================
// TESTS
// ============================================================================
