// ⚙️ Draft pipeline - one canonical path from raw form fields to a
// persistable transaction: split → evidence → withholding → validate

use crate::amounts::{compute_withholding, split_amount, ArithmeticError};
use crate::db::{
    EvidenceType, PaymentMethod, TaxationType, Transaction, TransactionStatus, TransactionType,
};
use crate::entities::CategoryRegistry;
use crate::evidence::EvidenceRuleSet;
use crate::validate::{validate_transaction, FieldError, ValidatorConfig};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// DRAFT INPUT
// ============================================================================

/// Raw fields as an entry form hands them over
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftInput {
    pub user_id: String,
    pub tx_type: TransactionType,
    pub date: NaiveDate,
    pub counterparty_name: String,
    pub description: String,
    pub category: String,
    pub amount_gross: i64,

    /// None: take the category default. Some: an explicit user choice,
    /// allowed only when the category permits overrides.
    pub taxation_type: Option<TaxationType>,

    pub payment_method: PaymentMethod,

    /// Some = the user hand-picked the evidence; the resolver must not
    /// replace it. None = untouched, a suggestion may fill it.
    pub evidence_type: Option<EvidenceType>,

    pub business_use_ratio: f64,
}

// ============================================================================
// DRAFT ERROR
// ============================================================================

#[derive(Debug)]
pub enum DraftError {
    UnknownCategory(String),
    /// Category default is fixed and the requested regime differs
    RegimeNotAllowed {
        category: String,
        requested: TaxationType,
    },
    Arithmetic(ArithmeticError),
    /// Draft failed validation; the caller must not persist it
    Invalid(Vec<FieldError>),
}

impl std::fmt::Display for DraftError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DraftError::UnknownCategory(name) => write!(f, "unknown category: {:?}", name),
            DraftError::RegimeNotAllowed { category, requested } => write!(
                f,
                "category {:?} does not allow the {} regime",
                category,
                requested.as_str()
            ),
            DraftError::Arithmetic(err) => write!(f, "{}", err),
            DraftError::Invalid(errors) => {
                write!(f, "draft failed validation ({} errors)", errors.len())
            }
        }
    }
}

impl std::error::Error for DraftError {}

impl From<ArithmeticError> for DraftError {
    fn from(err: ArithmeticError) -> Self {
        DraftError::Arithmetic(err)
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Build a persistable draft from raw form fields.
///
/// Applies the rule components in fixed order: category lookup, amount
/// split, evidence suggestion, withholding, validation. Each step is pure;
/// edits re-enter through this same path so every form shares one behavior.
pub fn prepare_draft(
    input: &DraftInput,
    registry: &CategoryRegistry,
    evidence_rules: &EvidenceRuleSet,
    validator: &ValidatorConfig,
    today: NaiveDate,
) -> Result<Transaction, DraftError> {
    // 1. Category lookup: regime default + withholding eligibility
    let category = registry
        .find_by_name(&input.category)
        .ok_or_else(|| DraftError::UnknownCategory(input.category.clone()))?;

    let taxation = match input.taxation_type {
        Some(requested) => {
            if requested != category.default_taxation_type && !category.allow_override {
                return Err(DraftError::RegimeNotAllowed {
                    category: category.name.clone(),
                    requested,
                });
            }
            requested
        }
        None => category.default_taxation_type,
    };

    // 2. Amount split (recomputed in full, never carried over from the form)
    let split = split_amount(input.amount_gross, taxation)?;

    // 3. Evidence: a hand-picked value always wins over the rule suggestion
    let evidence = match input.evidence_type {
        Some(picked) => picked,
        None => evidence_rules.apply(EvidenceType::None, false, input.payment_method),
    };

    // 4. Withholding: per-category flag, income side only
    let eligible =
        input.tx_type == TransactionType::Income && category.is_withholding_eligible;
    let withholding = compute_withholding(input.amount_gross, eligible)?;

    let draft = Transaction {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: input.user_id.clone(),
        tx_type: input.tx_type,
        date: input.date,
        counterparty_name: input.counterparty_name.clone(),
        description: input.description.clone(),
        category: category.name.clone(),
        amount_gross: input.amount_gross,
        vat_amount: split.vat,
        taxation_type: taxation,
        evidence_type: evidence,
        payment_method: input.payment_method,
        business_use_ratio: input.business_use_ratio,
        withholding_income_tax: withholding.income_tax,
        withholding_local_tax: withholding.local_tax,
        status: TransactionStatus::Draft,
        created_at: Utc::now(),
        deleted_at: None,
    };

    // 5. Validation last, over the fully populated draft
    let outcome = validate_transaction(&draft, validator, today);
    if !outcome.valid {
        return Err(DraftError::Invalid(outcome.errors));
    }

    Ok(draft)
}

// ============================================================================
// TESTS
// ============================================================================
