// Tallybook - bookkeeping core for freelancers
// One canonical engine for the monetary/taxation rules and receipt matching
// that entry forms and the reconciliation UI all share

pub mod amounts;
pub mod db;
pub mod engine;
pub mod entities;
pub mod evidence;
pub mod matcher;
pub mod validate;

// Re-export commonly used types
pub use amounts::{compute_withholding, split_amount, AmountSplit, ArithmeticError, Withholding};
pub use db::{
    get_receipt, get_transaction, insert_receipt, insert_transaction, link_receipt,
    list_transactions, list_unmatched_receipts, receipt_file_hash, set_ocr_result,
    setup_database, soft_delete_transaction, update_transaction,
    EvidenceType, OcrStatus, PaymentMethod, Receipt, TaxationType, Transaction, TransactionPatch,
    TransactionStatus, TransactionType, UnknownToken,
};
pub use engine::{prepare_draft, DraftError, DraftInput};
pub use entities::{Category, CategoryRegistry};
pub use evidence::{EvidenceRule, EvidenceRuleSet, EvidenceSuggestion};
pub use matcher::{
    extract_first_amount, RankedMatch, ReceiptMatcher, ReconcileState, TransitionError,
};
pub use validate::{
    validate_transaction, FieldError, ReasonCode, ValidationOutcome, ValidatorConfig,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
