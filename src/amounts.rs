// 🧮 Monetary rules - VAT split + withholding tax
// All arithmetic in whole currency units (i64), half-up rounding

use crate::db::TaxationType;
use serde::{Deserialize, Serialize};

// ============================================================================
// ARITHMETIC ERROR
// ============================================================================

/// Fatal to the single call; a draft must not be persisted after this
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticError {
    /// Total was negative
    NegativeAmount(i64),
}

impl std::fmt::Display for ArithmeticError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArithmeticError::NegativeAmount(total) => {
                write!(f, "amount must be non-negative, got {}", total)
            }
        }
    }
}

impl std::error::Error for ArithmeticError {}

// ============================================================================
// AMOUNT SPLITTER
// ============================================================================

/// Supply amount + VAT derived from a gross total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountSplit {
    /// Taxable base before VAT
    pub supply: i64,

    /// VAT portion; supply + vat == total, always
    pub vat: i64,
}

/// Split a VAT-inclusive total into supply amount and VAT.
///
/// TAXABLE: supply = round(total / 1.1) half-up, vat = total - supply.
/// VAT is never rounded independently, which keeps the sum exact.
/// ZERO_RATED / EXEMPT: supply = total, vat = 0.
pub fn split_amount(total: i64, taxation: TaxationType) -> Result<AmountSplit, ArithmeticError> {
    if total < 0 {
        return Err(ArithmeticError::NegativeAmount(total));
    }

    match taxation {
        TaxationType::Taxable => {
            // round(total * 10 / 11) half-up in integer arithmetic
            let supply = (total * 10 + 5) / 11;
            Ok(AmountSplit { supply, vat: total - supply })
        }
        TaxationType::ZeroRated | TaxationType::Exempt => {
            Ok(AmountSplit { supply: total, vat: 0 })
        }
    }
}

// ============================================================================
// WITHHOLDING CALCULATOR
// ============================================================================

/// 3.3% freelancer withholding: 3% income tax + 10% local surtax on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withholding {
    pub income_tax: i64,
    pub local_tax: i64,

    /// What actually lands on the account: total - both taxes
    pub net: i64,
}

/// Compute withholding from a gross total.
///
/// Eligibility is a per-category flag resolved by the caller; ineligible
/// income gets zero taxes and net == total. Always recomputed in full from
/// the total, never adjusted incrementally.
pub fn compute_withholding(total: i64, eligible: bool) -> Result<Withholding, ArithmeticError> {
    if total < 0 {
        return Err(ArithmeticError::NegativeAmount(total));
    }

    if !eligible {
        return Ok(Withholding { income_tax: 0, local_tax: 0, net: total });
    }

    // income = round(total * 0.033), local = round(income * 0.1), half-up
    let income_tax = (total * 33 + 500) / 1000;
    let local_tax = (income_tax + 5) / 10;

    Ok(Withholding {
        income_tax,
        local_tax,
        net: total - income_tax - local_tax,
    })
}

// ============================================================================
// TESTS
// ============================================================================
