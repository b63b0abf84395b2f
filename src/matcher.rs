// 🔍 Receipt matcher - rank candidate transactions for an uploaded receipt
// Deterministic weighted heuristic: amount 0.4, text overlap 0.3, date 0.2

use crate::db::{OcrStatus, Receipt, Transaction};
use serde::{Deserialize, Serialize};

// ============================================================================
// RECONCILE STATE MACHINE
// ============================================================================

/// Per-receipt reconciliation status.
///
/// pending_ocr → needs_matching → matched, with failed reachable only from
/// pending_ocr. The matched step happens solely through an explicit link
/// action by a caller, never inside the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileState {
    PendingOcr,
    NeedsMatching,
    Matched,
    Failed,
}

impl ReconcileState {
    /// Derive the state from a receipt's OCR status and link
    pub fn of(receipt: &Receipt) -> ReconcileState {
        match receipt.ocr_status {
            OcrStatus::Pending => ReconcileState::PendingOcr,
            OcrStatus::Failed => ReconcileState::Failed,
            OcrStatus::Done => {
                if receipt.is_linked() {
                    ReconcileState::Matched
                } else {
                    ReconcileState::NeedsMatching
                }
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReconcileState::Matched | ReconcileState::Failed)
    }

    /// Attempt a transition, rejecting anything outside the legal edges
    pub fn transition(self, to: ReconcileState) -> Result<ReconcileState, TransitionError> {
        let legal = matches!(
            (self, to),
            (ReconcileState::PendingOcr, ReconcileState::NeedsMatching)
                | (ReconcileState::PendingOcr, ReconcileState::Failed)
                | (ReconcileState::NeedsMatching, ReconcileState::Matched)
        );

        if legal {
            Ok(to)
        } else {
            Err(TransitionError { from: self, to })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionError {
    pub from: ReconcileState,
    pub to: ReconcileState,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "illegal reconcile transition: {:?} → {:?}", self.from, self.to)
    }
}

impl std::error::Error for TransitionError {}

// ============================================================================
// RANKED MATCH
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
    pub transaction_id: String,

    /// Sum of the three component scores, capped at 1.0
    pub score: f64,

    pub amount_score: f64,
    pub text_score: f64,
    pub date_score: f64,

    /// score >= confidence threshold (default 0.6)
    pub confident: bool,
}

// ============================================================================
// RECEIPT MATCHER
// ============================================================================

pub struct ReceiptMatcher {
    /// |extracted - gross| below this earns the full amount score (default 1_000)
    pub amount_tight_tolerance: i64,

    /// |extracted - gross| below this earns the half amount score (default 5_000)
    pub amount_loose_tolerance: i64,

    /// Full amount score (default 0.4)
    pub amount_weight: f64,

    /// Maximum text-overlap score (default 0.3)
    pub text_weight: f64,

    /// Candidates at or above this total are flagged confident (default 0.6)
    pub confidence_threshold: f64,

    /// Candidates at or below this total are dropped (default 0.1)
    pub min_score: f64,

    /// Ranked list is truncated to this many entries (default 5)
    pub max_candidates: usize,
}

impl ReceiptMatcher {
    pub fn new() -> Self {
        ReceiptMatcher {
            amount_tight_tolerance: 1_000,
            amount_loose_tolerance: 5_000,
            amount_weight: 0.4,
            text_weight: 0.3,
            confidence_threshold: 0.6,
            min_score: 0.1,
            max_candidates: 5,
        }
    }

    /// Score and rank candidate transactions against a receipt.
    ///
    /// Read-only and deterministic: identical inputs always produce the
    /// identical ordered list. Soft-deleted transactions are skipped. The
    /// matcher never writes transaction_id; linking is a separate explicit
    /// action. An empty or low-confidence list is the ambiguity signal,
    /// not an error.
    pub fn match_receipt(
        &self,
        receipt: &Receipt,
        transactions: &[Transaction],
    ) -> Vec<RankedMatch> {
        let ocr_text = match receipt.ocr_text.as_deref() {
            Some(text) => text,
            None => return Vec::new(),
        };

        let extracted_amount = extract_first_amount(ocr_text);
        let ocr_lower = ocr_text.to_lowercase();
        let receipt_date = receipt.uploaded_at.date_naive();

        let mut ranked: Vec<(RankedMatch, chrono::NaiveDate)> = Vec::new();

        for tx in transactions {
            if tx.is_deleted() {
                continue;
            }

            let amount_score = self.amount_score(extracted_amount, tx.amount_gross);
            let text_score = self.text_overlap_score(&tx.description, &ocr_lower);
            let date_score = date_proximity_score((receipt_date - tx.date).num_days().abs());

            let score = (amount_score + text_score + date_score).min(1.0);
            if score <= self.min_score {
                continue;
            }

            ranked.push((
                RankedMatch {
                    transaction_id: tx.id.clone(),
                    score,
                    amount_score,
                    text_score,
                    date_score,
                    confident: score >= self.confidence_threshold,
                },
                tx.date,
            ));
        }

        // Score descending; ties by transaction date descending, then id,
        // so the order is fully deterministic
        ranked.sort_by(|(a, a_date), (b, b_date)| {
            b.score
                .total_cmp(&a.score)
                .then(b_date.cmp(a_date))
                .then(b.transaction_id.cmp(&a.transaction_id))
        });
        ranked.truncate(self.max_candidates);

        ranked.into_iter().map(|(m, _)| m).collect()
    }

    fn amount_score(&self, extracted: Option<i64>, gross: i64) -> f64 {
        let extracted = match extracted {
            Some(amount) => amount,
            None => return 0.0,
        };

        let diff = (extracted - gross).abs();
        if diff < self.amount_tight_tolerance {
            self.amount_weight
        } else if diff < self.amount_loose_tolerance {
            self.amount_weight / 2.0
        } else {
            0.0
        }
    }

    fn text_overlap_score(&self, description: &str, ocr_lower: &str) -> f64 {
        // Tokens of more than one character; single characters match too easily
        let tokens: Vec<String> = description
            .split_whitespace()
            .filter(|t| t.chars().count() > 1)
            .map(|t| t.to_lowercase())
            .collect();

        if tokens.is_empty() {
            return 0.0;
        }

        let matched = tokens.iter().filter(|t| ocr_lower.contains(t.as_str())).count();
        self.text_weight * (matched as f64 / tokens.len() as f64)
    }
}

impl Default for ReceiptMatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn date_proximity_score(days_apart: i64) -> f64 {
    if days_apart <= 1 {
        0.2
    } else if days_apart <= 3 {
        0.1
    } else if days_apart <= 7 {
        0.05
    } else {
        0.0
    }
}

/// First run of digits/thousands separators in OCR text, parsed as an
/// integer amount. "합계 12,000원" → 12000. None when no digits appear.
pub fn extract_first_amount(text: &str) -> Option<i64> {
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            break;
        }
        chars.next();
    }

    let mut digits = String::new();
    for c in chars {
        if c.is_ascii_digit() {
            digits.push(c);
        } else if c == ',' || c == '.' {
            // Thousands separator inside the run; stripped
            continue;
        } else {
            break;
        }
    }

    if digits.is_empty() {
        return None;
    }

    digits.parse::<i64>().ok()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{
        EvidenceType, PaymentMethod, TaxationType, TransactionStatus, TransactionType,
    };
    use chrono::{NaiveDate, TimeZone, Utc};

    fn tx(id: &str, description: &str, gross: i64, date: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            tx_type: TransactionType::Expense,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            counterparty_name: description.to_string(),
            description: description.to_string(),
            category: "Meals".to_string(),
            amount_gross: gross,
            vat_amount: 0,
            taxation_type: TaxationType::Exempt,
            evidence_type: EvidenceType::Card,
            payment_method: PaymentMethod::Card,
            business_use_ratio: 1.0,
            withholding_income_tax: 0,
            withholding_local_tax: 0,
            status: TransactionStatus::Confirmed,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn receipt_with_ocr(text: &str, uploaded: &str) -> Receipt {
        let uploaded_at = Utc
            .from_utc_datetime(
                &NaiveDate::parse_from_str(uploaded, "%Y-%m-%d")
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap(),
            );

        Receipt {
            id: "receipt-1".to_string(),
            user_id: "user-1".to_string(),
            file_name: "receipt.jpg".to_string(),
            file_hash: "hash".to_string(),
            ocr_text: Some(text.to_string()),
            ocr_status: OcrStatus::Done,
            uploaded_at,
            transaction_id: None,
            match_confidence: None,
        }
    }

    #[test]
    fn test_extract_first_amount() {
        assert_eq!(extract_first_amount("스타벅스 12,000원"), Some(12_000));
        assert_eq!(extract_first_amount("합계: 1.250.000 KRW"), Some(1_250_000));
        assert_eq!(extract_first_amount("total 500"), Some(500));
        assert_eq!(extract_first_amount("no digits here"), None);
        assert_eq!(extract_first_amount(""), None);
        // Only the first run counts
        assert_eq!(extract_first_amount("15,000원 중 5,000원 현금"), Some(15_000));
    }

    #[test]
    fn test_starbucks_scenario_is_confident() {
        let matcher = ReceiptMatcher::new();
        let receipt = receipt_with_ocr("스타벅스 12,000원", "2026-03-10");
        let pool = vec![tx("tx-1", "스타벅스 강남점", 12_000, "2026-03-10")];

        let matches = matcher.match_receipt(&receipt, &pool);
        assert_eq!(matches.len(), 1);

        let top = &matches[0];
        assert_eq!(top.amount_score, 0.4);
        assert!(top.text_score > 0.0);
        assert_eq!(top.date_score, 0.2);
        assert!(top.score >= 0.6);
        assert!(top.confident);
    }

    #[test]
    fn test_empty_when_nothing_close() {
        let matcher = ReceiptMatcher::new();
        let receipt = receipt_with_ocr("편의점 3,500원", "2026-03-10");

        // Far in amount and far in time, no shared tokens
        let pool = vec![tx("tx-1", "사무실 임대료", 900_000, "2026-01-02")];

        assert!(matcher.match_receipt(&receipt, &pool).is_empty());
    }

    #[test]
    fn test_amount_tiers() {
        let matcher = ReceiptMatcher::new();
        assert_eq!(matcher.amount_score(Some(12_000), 12_500), 0.4);
        assert_eq!(matcher.amount_score(Some(12_000), 15_000), 0.2);
        assert_eq!(matcher.amount_score(Some(12_000), 20_000), 0.0);
        assert_eq!(matcher.amount_score(None, 12_000), 0.0);
    }

    #[test]
    fn test_date_proximity_tiers() {
        assert_eq!(date_proximity_score(0), 0.2);
        assert_eq!(date_proximity_score(1), 0.2);
        assert_eq!(date_proximity_score(3), 0.1);
        assert_eq!(date_proximity_score(7), 0.05);
        assert_eq!(date_proximity_score(8), 0.0);
    }

    #[test]
    fn test_empty_description_scores_zero_text() {
        let matcher = ReceiptMatcher::new();
        assert_eq!(matcher.text_overlap_score("", "whatever"), 0.0);
        // Single-character tokens are ignored too
        assert_eq!(matcher.text_overlap_score("a b c", "a b c"), 0.0);
    }

    #[test]
    fn test_deterministic_ordering() {
        let matcher = ReceiptMatcher::new();
        let receipt = receipt_with_ocr("스타벅스 12,000원", "2026-03-10");
        let pool = vec![
            tx("tx-1", "스타벅스 강남점", 12_000, "2026-03-10"),
            tx("tx-2", "스타벅스 역삼점", 12_000, "2026-03-09"),
            tx("tx-3", "커피빈", 13_000, "2026-03-10"),
        ];

        let first = matcher.match_receipt(&receipt, &pool);
        for _ in 0..10 {
            assert_eq!(matcher.match_receipt(&receipt, &pool), first);
        }
    }

    #[test]
    fn test_ties_broken_by_date_descending() {
        let matcher = ReceiptMatcher::new();
        let receipt = receipt_with_ocr("12,000", "2026-03-10");

        // Identical scores except the transaction date
        let pool = vec![
            tx("tx-old", "", 12_000, "2026-03-09"),
            tx("tx-new", "", 12_000, "2026-03-10"),
        ];

        let matches = matcher.match_receipt(&receipt, &pool);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].transaction_id, "tx-new");
        assert_eq!(matches[1].transaction_id, "tx-old");
    }

    #[test]
    fn test_truncated_to_top_five() {
        let matcher = ReceiptMatcher::new();
        let receipt = receipt_with_ocr("12,000", "2026-03-10");

        let pool: Vec<Transaction> = (0..8)
            .map(|i| tx(&format!("tx-{}", i), "", 12_000, "2026-03-10"))
            .collect();

        assert_eq!(matcher.match_receipt(&receipt, &pool).len(), 5);
    }

    #[test]
    fn test_soft_deleted_transactions_skipped() {
        let matcher = ReceiptMatcher::new();
        let receipt = receipt_with_ocr("스타벅스 12,000원", "2026-03-10");

        let mut deleted = tx("tx-1", "스타벅스 강남점", 12_000, "2026-03-10");
        deleted.deleted_at = Some(Utc::now());

        assert!(matcher.match_receipt(&receipt, &[deleted]).is_empty());
    }

    #[test]
    fn test_receipt_without_ocr_text_matches_nothing() {
        let matcher = ReceiptMatcher::new();
        let mut receipt = receipt_with_ocr("x", "2026-03-10");
        receipt.ocr_text = None;

        let pool = vec![tx("tx-1", "스타벅스", 12_000, "2026-03-10")];
        assert!(matcher.match_receipt(&receipt, &pool).is_empty());
    }

    #[test]
    fn test_score_capped_at_one() {
        let mut matcher = ReceiptMatcher::new();
        matcher.amount_weight = 0.9;
        matcher.text_weight = 0.9;

        let receipt = receipt_with_ocr("스타벅스 12,000원", "2026-03-10");
        let pool = vec![tx("tx-1", "스타벅스", 12_000, "2026-03-10")];

        let matches = matcher.match_receipt(&receipt, &pool);
        assert!(matches[0].score <= 1.0);
    }

    // ========================================================================
    // STATE MACHINE
    // ========================================================================

    #[test]
    fn test_state_derived_from_receipt() {
        let mut receipt = receipt_with_ocr("text", "2026-03-10");

        receipt.ocr_status = OcrStatus::Pending;
        assert_eq!(ReconcileState::of(&receipt), ReconcileState::PendingOcr);

        receipt.ocr_status = OcrStatus::Failed;
        assert_eq!(ReconcileState::of(&receipt), ReconcileState::Failed);

        receipt.ocr_status = OcrStatus::Done;
        assert_eq!(ReconcileState::of(&receipt), ReconcileState::NeedsMatching);

        receipt.transaction_id = Some("tx-1".to_string());
        assert_eq!(ReconcileState::of(&receipt), ReconcileState::Matched);
    }

    #[test]
    fn test_legal_transitions() {
        assert_eq!(
            ReconcileState::PendingOcr.transition(ReconcileState::NeedsMatching),
            Ok(ReconcileState::NeedsMatching)
        );
        assert_eq!(
            ReconcileState::PendingOcr.transition(ReconcileState::Failed),
            Ok(ReconcileState::Failed)
        );
        assert_eq!(
            ReconcileState::NeedsMatching.transition(ReconcileState::Matched),
            Ok(ReconcileState::Matched)
        );
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        // failed is reachable only from pending_ocr
        assert!(ReconcileState::NeedsMatching.transition(ReconcileState::Failed).is_err());
        // no skipping straight to matched
        assert!(ReconcileState::PendingOcr.transition(ReconcileState::Matched).is_err());
        // terminal states stay terminal
        assert!(ReconcileState::Matched.transition(ReconcileState::NeedsMatching).is_err());
        assert!(ReconcileState::Failed.transition(ReconcileState::NeedsMatching).is_err());

        let err = ReconcileState::PendingOcr.transition(ReconcileState::Matched).unwrap_err();
        assert_eq!(err.from, ReconcileState::PendingOcr);
        assert_eq!(err.to, ReconcileState::Matched);
    }

    #[test]
    fn test_terminal_states() {
        assert!(ReconcileState::Matched.is_terminal());
        assert!(ReconcileState::Failed.is_terminal());
        assert!(!ReconcileState::PendingOcr.is_terminal());
        assert!(!ReconcileState::NeedsMatching.is_terminal());
    }
}
