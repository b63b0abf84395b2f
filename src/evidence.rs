// 🧾 Evidence rules - payment method → suggested evidence type
// Rules as data: the mapping is configuration, not ambient constants

use crate::db::{EvidenceType, PaymentMethod};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceRule {
    /// Payment method token this rule fires on. Accepts input-side aliases
    /// (e.g. "simple_pay") that are not persisted payment tokens.
    pub payment_method: String,

    /// Evidence type to suggest
    pub evidence_type: EvidenceType,

    /// Optional hint surfaced next to the suggestion
    pub notice: Option<String>,
}

// ============================================================================
// SUGGESTION
// ============================================================================

/// Advisory output; the caller decides whether and when to apply it
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceSuggestion {
    /// None = no rule fired, keep whatever the field already holds
    pub evidence_type: Option<EvidenceType>,
    pub notice: Option<String>,
}

impl EvidenceSuggestion {
    pub fn none() -> Self {
        EvidenceSuggestion { evidence_type: None, notice: None }
    }
}

// ============================================================================
// RULE SET
// ============================================================================

pub struct EvidenceRuleSet {
    rules: Vec<EvidenceRule>,
}

impl EvidenceRuleSet {
    /// Stock mapping: transfer→TAX_INVOICE, card/simple_pay→CARD,
    /// cash→CASH_RCPT. "etc" deliberately has no rule.
    pub fn default_rules() -> Self {
        EvidenceRuleSet {
            rules: vec![
                EvidenceRule {
                    payment_method: "transfer".to_string(),
                    evidence_type: EvidenceType::TaxInvoice,
                    notice: Some("Request a tax invoice from the counterparty".to_string()),
                },
                EvidenceRule {
                    payment_method: "card".to_string(),
                    evidence_type: EvidenceType::Card,
                    notice: None,
                },
                EvidenceRule {
                    payment_method: "simple_pay".to_string(),
                    evidence_type: EvidenceType::Card,
                    notice: None,
                },
                EvidenceRule {
                    payment_method: "cash".to_string(),
                    evidence_type: EvidenceType::CashReceipt,
                    notice: Some("Ask for a cash receipt with the business number".to_string()),
                },
            ],
        }
    }

    pub fn from_rules(rules: Vec<EvidenceRule>) -> Self {
        EvidenceRuleSet { rules }
    }

    /// Load a rule set override from JSON
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read evidence rules file: {:?}", path.as_ref()))?;

        let rules: Vec<EvidenceRule> =
            serde_json::from_str(&content).context("Failed to parse evidence rules JSON")?;

        Ok(EvidenceRuleSet::from_rules(rules))
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Suggest an evidence type for a payment method token.
    ///
    /// Pure and advisory: never mutates caller state. An unmapped method
    /// ("etc", unknown alias) yields no suggestion, meaning the existing
    /// field value is retained by the caller.
    pub fn resolve(&self, payment_method: &str) -> EvidenceSuggestion {
        for rule in &self.rules {
            if rule.payment_method.eq_ignore_ascii_case(payment_method) {
                return EvidenceSuggestion {
                    evidence_type: Some(rule.evidence_type),
                    notice: rule.notice.clone(),
                };
            }
        }

        EvidenceSuggestion::none()
    }

    /// Convenience over the persisted payment enum
    pub fn resolve_method(&self, method: PaymentMethod) -> EvidenceSuggestion {
        self.resolve(method.as_str())
    }

    /// What the evidence field should hold after a payment method pick.
    ///
    /// The suggestion applies only when the user has not hand-edited the
    /// field; an override always wins, and an unmapped method keeps the
    /// current value. Callers invoke this at explicit trigger points (first
    /// selection, explicit recompute), never on unrelated field changes.
    pub fn apply(
        &self,
        current: EvidenceType,
        user_overridden: bool,
        method: PaymentMethod,
    ) -> EvidenceType {
        if user_overridden {
            return current;
        }

        self.resolve_method(method).evidence_type.unwrap_or(current)
    }
}

impl Default for EvidenceRuleSet {
    fn default() -> Self {
        Self::default_rules()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_suggests_tax_invoice() {
        let rules = EvidenceRuleSet::default_rules();

        let suggestion = rules.resolve("transfer");
        assert_eq!(suggestion.evidence_type, Some(EvidenceType::TaxInvoice));
        assert!(suggestion.notice.is_some());
    }

    #[test]
    fn test_card_and_simple_pay_suggest_card() {
        let rules = EvidenceRuleSet::default_rules();

        assert_eq!(rules.resolve("card").evidence_type, Some(EvidenceType::Card));
        assert_eq!(rules.resolve("simple_pay").evidence_type, Some(EvidenceType::Card));
    }

    #[test]
    fn test_cash_suggests_cash_receipt() {
        let rules = EvidenceRuleSet::default_rules();
        assert_eq!(rules.resolve("cash").evidence_type, Some(EvidenceType::CashReceipt));
    }

    #[test]
    fn test_etc_yields_no_suggestion() {
        let rules = EvidenceRuleSet::default_rules();

        let suggestion = rules.resolve("etc");
        assert_eq!(suggestion, EvidenceSuggestion::none());
    }

    #[test]
    fn test_apply_keeps_prior_value_for_etc() {
        let rules = EvidenceRuleSet::default_rules();

        let kept = rules.apply(EvidenceType::SimpleReceipt, false, PaymentMethod::Etc);
        assert_eq!(kept, EvidenceType::SimpleReceipt);
    }

    #[test]
    fn test_apply_never_clobbers_user_override() {
        let rules = EvidenceRuleSet::default_rules();

        // User picked INVOICE by hand; a later transfer selection must not win
        let kept = rules.apply(EvidenceType::Invoice, true, PaymentMethod::Transfer);
        assert_eq!(kept, EvidenceType::Invoice);
    }

    #[test]
    fn test_apply_suggests_when_untouched() {
        let rules = EvidenceRuleSet::default_rules();

        let applied = rules.apply(EvidenceType::None, false, PaymentMethod::Transfer);
        assert_eq!(applied, EvidenceType::TaxInvoice);
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let rules = EvidenceRuleSet::default_rules();
        assert_eq!(rules.resolve("TRANSFER").evidence_type, Some(EvidenceType::TaxInvoice));
    }

    #[test]
    fn test_custom_rules_replace_defaults() {
        let rules = EvidenceRuleSet::from_rules(vec![EvidenceRule {
            payment_method: "cash".to_string(),
            evidence_type: EvidenceType::SimpleReceipt,
            notice: None,
        }]);

        assert_eq!(rules.rule_count(), 1);
        assert_eq!(rules.resolve("cash").evidence_type, Some(EvidenceType::SimpleReceipt));
        // transfer no longer mapped in the custom set
        assert_eq!(rules.resolve("transfer").evidence_type, None);
    }
}
