// 💾 Persistence collaborator - typed records + SQLite store
// Closed enum contract: every persisted token parses back or is rejected

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, ToSql};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ============================================================================
// CLOSED ENUMS (persisted contract - unknown tokens are rejected)
// ============================================================================

/// Error for a persisted token outside the closed set
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownToken {
    pub field: &'static str,
    pub value: String,
}

impl std::fmt::Display for UnknownToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} token: {:?}", self.field, self.value)
    }
}

impl std::error::Error for UnknownToken {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "expense")]
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Result<Self, UnknownToken> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(UnknownToken { field: "type", value: s.to_string() }),
        }
    }
}

/// VAT regime classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxationType {
    /// Standard regime: 10% VAT on the supply amount
    #[serde(rename = "TAXABLE")]
    Taxable,
    /// 0% rate (e.g. export income) - still VAT-registered, vat must be 0
    #[serde(rename = "ZERO_RATED")]
    ZeroRated,
    /// Outside the VAT system entirely - vat must be 0
    #[serde(rename = "EXEMPT")]
    Exempt,
}

impl TaxationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxationType::Taxable => "TAXABLE",
            TaxationType::ZeroRated => "ZERO_RATED",
            TaxationType::Exempt => "EXEMPT",
        }
    }

    pub fn parse(s: &str) -> Result<Self, UnknownToken> {
        match s {
            "TAXABLE" => Ok(TaxationType::Taxable),
            "ZERO_RATED" => Ok(TaxationType::ZeroRated),
            "EXEMPT" => Ok(TaxationType::Exempt),
            _ => Err(UnknownToken { field: "taxation_type", value: s.to_string() }),
        }
    }
}

/// Documentary proof attached to a transaction for deduction purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvidenceType {
    #[serde(rename = "TAX_INVOICE")]
    TaxInvoice,
    #[serde(rename = "INVOICE")]
    Invoice,
    #[serde(rename = "CARD")]
    Card,
    #[serde(rename = "CASH_RCPT")]
    CashReceipt,
    #[serde(rename = "SIMPLE_RCPT")]
    SimpleReceipt,
    #[serde(rename = "NONE")]
    None,
}

impl EvidenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceType::TaxInvoice => "TAX_INVOICE",
            EvidenceType::Invoice => "INVOICE",
            EvidenceType::Card => "CARD",
            EvidenceType::CashReceipt => "CASH_RCPT",
            EvidenceType::SimpleReceipt => "SIMPLE_RCPT",
            EvidenceType::None => "NONE",
        }
    }

    pub fn parse(s: &str) -> Result<Self, UnknownToken> {
        match s {
            "TAX_INVOICE" => Ok(EvidenceType::TaxInvoice),
            "INVOICE" => Ok(EvidenceType::Invoice),
            "CARD" => Ok(EvidenceType::Card),
            "CASH_RCPT" => Ok(EvidenceType::CashReceipt),
            "SIMPLE_RCPT" => Ok(EvidenceType::SimpleReceipt),
            "NONE" => Ok(EvidenceType::None),
            _ => Err(UnknownToken { field: "evidence_type", value: s.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "transfer")]
    Transfer,
    #[serde(rename = "card")]
    Card,
    #[serde(rename = "cash")]
    Cash,
    #[serde(rename = "etc")]
    Etc,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Card => "card",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Etc => "etc",
        }
    }

    pub fn parse(s: &str) -> Result<Self, UnknownToken> {
        match s {
            "transfer" => Ok(PaymentMethod::Transfer),
            "card" => Ok(PaymentMethod::Card),
            "cash" => Ok(PaymentMethod::Cash),
            "etc" => Ok(PaymentMethod::Etc),
            _ => Err(UnknownToken { field: "payment_method", value: s.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    #[serde(rename = "draft")]
    Draft,
    #[serde(rename = "confirmed")]
    Confirmed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Draft => "draft",
            TransactionStatus::Confirmed => "confirmed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, UnknownToken> {
        match s {
            "draft" => Ok(TransactionStatus::Draft),
            "confirmed" => Ok(TransactionStatus::Confirmed),
            _ => Err(UnknownToken { field: "status", value: s.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OcrStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "done")]
    Done,
    #[serde(rename = "failed")]
    Failed,
}

impl OcrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrStatus::Pending => "pending",
            OcrStatus::Done => "done",
            OcrStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, UnknownToken> {
        match s {
            "pending" => Ok(OcrStatus::Pending),
            "done" => Ok(OcrStatus::Done),
            "failed" => Ok(OcrStatus::Failed),
            _ => Err(UnknownToken { field: "ocr_status", value: s.to_string() }),
        }
    }
}

// ============================================================================
// TRANSACTION RECORD
// ============================================================================

/// A single income/expense entry, amounts in whole currency units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Stable identity (UUID)
    pub id: String,

    /// Owning user
    pub user_id: String,

    pub tx_type: TransactionType,

    /// Local calendar date of the transaction
    pub date: NaiveDate,

    /// Who was paid / who paid
    pub counterparty_name: String,

    /// Free memo, consumed by the receipt matcher
    pub description: String,

    /// Category name (looked up in the category registry)
    pub category: String,

    /// VAT-inclusive total
    pub amount_gross: i64,

    /// VAT portion of amount_gross (0 outside the TAXABLE regime)
    pub vat_amount: i64,

    pub taxation_type: TaxationType,
    pub evidence_type: EvidenceType,
    pub payment_method: PaymentMethod,

    /// Fraction of a mixed expense attributable to business use, 0.0 - 1.0
    pub business_use_ratio: f64,

    pub withholding_income_tax: i64,
    pub withholding_local_tax: i64,

    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,

    /// Soft delete marker; deleted rows are excluded from listings
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Supply amount is derived, never stored: gross minus VAT
    pub fn supply_amount(&self) -> i64 {
        self.amount_gross - self.vat_amount
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Net amount the freelancer actually receives after withholding
    pub fn net_receivable(&self) -> i64 {
        self.amount_gross - self.withholding_income_tax - self.withholding_local_tax
    }
}

/// Partial update for a transaction; None fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionPatch {
    pub date: Option<NaiveDate>,
    pub counterparty_name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub amount_gross: Option<i64>,
    pub vat_amount: Option<i64>,
    pub taxation_type: Option<TaxationType>,
    pub evidence_type: Option<EvidenceType>,
    pub payment_method: Option<PaymentMethod>,
    pub business_use_ratio: Option<f64>,
    pub withholding_income_tax: Option<i64>,
    pub withholding_local_tax: Option<i64>,
    pub status: Option<TransactionStatus>,
}

// ============================================================================
// RECEIPT RECORD
// ============================================================================

/// An uploaded receipt; OCR fields are written once by the OCR collaborator,
/// transaction_id is written once by an explicit link action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub id: String,
    pub user_id: String,

    /// Original file name of the upload
    pub file_name: String,

    /// SHA-256 of the file bytes, used to spot duplicate uploads
    pub file_hash: String,

    pub ocr_text: Option<String>,
    pub ocr_status: OcrStatus,
    pub uploaded_at: DateTime<Utc>,

    /// Linked transaction, at most one, set exactly once
    pub transaction_id: Option<String>,

    /// Match score recorded at link time, 0.0 - 1.0
    pub match_confidence: Option<f64>,
}

impl Receipt {
    /// Fresh upload awaiting OCR
    pub fn new(user_id: &str, file_name: &str, file_bytes: &[u8]) -> Self {
        Receipt {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            file_name: file_name.to_string(),
            file_hash: receipt_file_hash(file_bytes),
            ocr_text: None,
            ocr_status: OcrStatus::Pending,
            uploaded_at: Utc::now(),
            transaction_id: None,
            match_confidence: None,
        }
    }

    pub fn is_linked(&self) -> bool {
        self.transaction_id.is_some()
    }
}

/// SHA-256 hex digest of receipt file bytes (upload idempotency key)
pub fn receipt_file_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// DATABASE SETUP
// ============================================================================

const DATE_FMT: &str = "%Y-%m-%d";

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            tx_type TEXT NOT NULL,
            date TEXT NOT NULL,
            counterparty_name TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            amount_gross INTEGER NOT NULL,
            vat_amount INTEGER NOT NULL,
            taxation_type TEXT NOT NULL,
            evidence_type TEXT NOT NULL,
            payment_method TEXT NOT NULL,
            business_use_ratio REAL NOT NULL,
            withholding_income_tax INTEGER NOT NULL,
            withholding_local_tax INTEGER NOT NULL,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL,
            deleted_at TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS receipts (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            file_name TEXT NOT NULL,
            file_hash TEXT NOT NULL,
            ocr_text TEXT,
            ocr_status TEXT NOT NULL,
            uploaded_at TEXT NOT NULL,
            transaction_id TEXT REFERENCES transactions(id),
            match_confidence REAL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tx_user_date ON transactions(user_id, date)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_receipts_user ON receipts(user_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_receipts_hash ON receipts(file_hash)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// TRANSACTION STORE
// ============================================================================

pub fn insert_transaction(conn: &Connection, tx: &Transaction) -> Result<String> {
    conn.execute(
        "INSERT INTO transactions (
            id, user_id, tx_type, date, counterparty_name, description, category,
            amount_gross, vat_amount, taxation_type, evidence_type, payment_method,
            business_use_ratio, withholding_income_tax, withholding_local_tax,
            status, created_at, deleted_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            tx.id,
            tx.user_id,
            tx.tx_type.as_str(),
            tx.date.format(DATE_FMT).to_string(),
            tx.counterparty_name,
            tx.description,
            tx.category,
            tx.amount_gross,
            tx.vat_amount,
            tx.taxation_type.as_str(),
            tx.evidence_type.as_str(),
            tx.payment_method.as_str(),
            tx.business_use_ratio,
            tx.withholding_income_tax,
            tx.withholding_local_tax,
            tx.status.as_str(),
            tx.created_at.to_rfc3339(),
            tx.deleted_at.map(|dt| dt.to_rfc3339()),
        ],
    )
    .context("Failed to insert transaction")?;

    Ok(tx.id.clone())
}

fn row_to_transaction(row: &rusqlite::Row<'_>) -> rusqlite::Result<Transaction> {
    let date_str: String = row.get(3)?;
    let taxation_str: String = row.get(9)?;
    let evidence_str: String = row.get(10)?;
    let payment_str: String = row.get(11)?;
    let tx_type_str: String = row.get(2)?;
    let status_str: String = row.get(15)?;
    let created_str: String = row.get(16)?;
    let deleted_str: Option<String> = row.get(17)?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        tx_type: TransactionType::parse(&tx_type_str)
            .map_err(|_| rusqlite::Error::InvalidQuery)?,
        date: NaiveDate::parse_from_str(&date_str, DATE_FMT)
            .map_err(|_| rusqlite::Error::InvalidQuery)?,
        counterparty_name: row.get(4)?,
        description: row.get(5)?,
        category: row.get(6)?,
        amount_gross: row.get(7)?,
        vat_amount: row.get(8)?,
        taxation_type: TaxationType::parse(&taxation_str)
            .map_err(|_| rusqlite::Error::InvalidQuery)?,
        evidence_type: EvidenceType::parse(&evidence_str)
            .map_err(|_| rusqlite::Error::InvalidQuery)?,
        payment_method: PaymentMethod::parse(&payment_str)
            .map_err(|_| rusqlite::Error::InvalidQuery)?,
        business_use_ratio: row.get(12)?,
        withholding_income_tax: row.get(13)?,
        withholding_local_tax: row.get(14)?,
        status: TransactionStatus::parse(&status_str)
            .map_err(|_| rusqlite::Error::InvalidQuery)?,
        created_at: DateTime::parse_from_rfc3339(&created_str)
            .map_err(|_| rusqlite::Error::InvalidQuery)?
            .with_timezone(&Utc),
        deleted_at: match deleted_str {
            Some(s) => Some(
                DateTime::parse_from_rfc3339(&s)
                    .map_err(|_| rusqlite::Error::InvalidQuery)?
                    .with_timezone(&Utc),
            ),
            None => None,
        },
    })
}

const TX_COLUMNS: &str = "id, user_id, tx_type, date, counterparty_name, description, category,
     amount_gross, vat_amount, taxation_type, evidence_type, payment_method,
     business_use_ratio, withholding_income_tax, withholding_local_tax,
     status, created_at, deleted_at";

/// Live (non-deleted) transactions for a user, newest first
pub fn list_transactions(conn: &Connection, user_id: &str) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TX_COLUMNS} FROM transactions
         WHERE user_id = ?1 AND deleted_at IS NULL
         ORDER BY date DESC, created_at DESC"
    ))?;

    let transactions = stmt
        .query_map(params![user_id], row_to_transaction)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(transactions)
}

pub fn get_transaction(conn: &Connection, id: &str) -> Result<Option<Transaction>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {TX_COLUMNS} FROM transactions WHERE id = ?1"))?;

    let mut rows = stmt.query_map(params![id], row_to_transaction)?;
    match rows.next() {
        Some(tx) => Ok(Some(tx?)),
        None => Ok(None),
    }
}

/// Apply a partial update; None fields are left as-is
pub fn update_transaction(conn: &Connection, id: &str, patch: &TransactionPatch) -> Result<()> {
    let mut sets: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(date) = patch.date {
        sets.push("date = ?");
        values.push(Box::new(date.format(DATE_FMT).to_string()));
    }
    if let Some(ref name) = patch.counterparty_name {
        sets.push("counterparty_name = ?");
        values.push(Box::new(name.clone()));
    }
    if let Some(ref description) = patch.description {
        sets.push("description = ?");
        values.push(Box::new(description.clone()));
    }
    if let Some(ref category) = patch.category {
        sets.push("category = ?");
        values.push(Box::new(category.clone()));
    }
    if let Some(gross) = patch.amount_gross {
        sets.push("amount_gross = ?");
        values.push(Box::new(gross));
    }
    if let Some(vat) = patch.vat_amount {
        sets.push("vat_amount = ?");
        values.push(Box::new(vat));
    }
    if let Some(taxation) = patch.taxation_type {
        sets.push("taxation_type = ?");
        values.push(Box::new(taxation.as_str()));
    }
    if let Some(evidence) = patch.evidence_type {
        sets.push("evidence_type = ?");
        values.push(Box::new(evidence.as_str()));
    }
    if let Some(method) = patch.payment_method {
        sets.push("payment_method = ?");
        values.push(Box::new(method.as_str()));
    }
    if let Some(ratio) = patch.business_use_ratio {
        sets.push("business_use_ratio = ?");
        values.push(Box::new(ratio));
    }
    if let Some(income_tax) = patch.withholding_income_tax {
        sets.push("withholding_income_tax = ?");
        values.push(Box::new(income_tax));
    }
    if let Some(local_tax) = patch.withholding_local_tax {
        sets.push("withholding_local_tax = ?");
        values.push(Box::new(local_tax));
    }
    if let Some(status) = patch.status {
        sets.push("status = ?");
        values.push(Box::new(status.as_str()));
    }

    if sets.is_empty() {
        return Ok(());
    }

    let sql = format!("UPDATE transactions SET {} WHERE id = ?", sets.join(", "));
    values.push(Box::new(id.to_string()));

    let updated = conn
        .execute(&sql, rusqlite::params_from_iter(values.iter().map(|v| v.as_ref())))
        .context("Failed to update transaction")?;

    if updated != 1 {
        bail!("Transaction not found: {}", id);
    }

    Ok(())
}

/// Soft delete: the row stays for audit, listings skip it
pub fn soft_delete_transaction(conn: &Connection, id: &str) -> Result<()> {
    let updated = conn.execute(
        "UPDATE transactions SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
        params![Utc::now().to_rfc3339(), id],
    )?;

    if updated != 1 {
        bail!("Transaction not found or already deleted: {}", id);
    }

    Ok(())
}

// ============================================================================
// RECEIPT STORE
// ============================================================================

pub fn insert_receipt(conn: &Connection, receipt: &Receipt) -> Result<String> {
    conn.execute(
        "INSERT INTO receipts (
            id, user_id, file_name, file_hash, ocr_text, ocr_status,
            uploaded_at, transaction_id, match_confidence
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            receipt.id,
            receipt.user_id,
            receipt.file_name,
            receipt.file_hash,
            receipt.ocr_text,
            receipt.ocr_status.as_str(),
            receipt.uploaded_at.to_rfc3339(),
            receipt.transaction_id,
            receipt.match_confidence,
        ],
    )
    .context("Failed to insert receipt")?;

    Ok(receipt.id.clone())
}

fn row_to_receipt(row: &rusqlite::Row<'_>) -> rusqlite::Result<Receipt> {
    let status_str: String = row.get(5)?;
    let uploaded_str: String = row.get(6)?;

    Ok(Receipt {
        id: row.get(0)?,
        user_id: row.get(1)?,
        file_name: row.get(2)?,
        file_hash: row.get(3)?,
        ocr_text: row.get(4)?,
        ocr_status: OcrStatus::parse(&status_str).map_err(|_| rusqlite::Error::InvalidQuery)?,
        uploaded_at: DateTime::parse_from_rfc3339(&uploaded_str)
            .map_err(|_| rusqlite::Error::InvalidQuery)?
            .with_timezone(&Utc),
        transaction_id: row.get(7)?,
        match_confidence: row.get(8)?,
    })
}

pub fn get_receipt(conn: &Connection, id: &str) -> Result<Option<Receipt>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, file_name, file_hash, ocr_text, ocr_status,
                uploaded_at, transaction_id, match_confidence
         FROM receipts WHERE id = ?1",
    )?;

    let mut rows = stmt.query_map(params![id], row_to_receipt)?;
    match rows.next() {
        Some(receipt) => Ok(Some(receipt?)),
        None => Ok(None),
    }
}

/// Record the OCR outcome. Writable exactly once: only a pending receipt
/// accepts a result, a second write is an error.
pub fn set_ocr_result(
    conn: &Connection,
    id: &str,
    status: OcrStatus,
    text: Option<&str>,
) -> Result<()> {
    if status == OcrStatus::Pending {
        bail!("OCR result cannot be 'pending'");
    }

    let updated = conn.execute(
        "UPDATE receipts SET ocr_status = ?1, ocr_text = ?2
         WHERE id = ?3 AND ocr_status = 'pending'",
        params![status.as_str(), text, id],
    )?;

    if updated != 1 {
        bail!("Receipt not found or OCR already recorded: {}", id);
    }

    Ok(())
}

/// The explicit link action. Sets transaction_id exactly once; requires a
/// completed OCR and an unlinked receipt.
pub fn link_receipt(
    conn: &Connection,
    receipt_id: &str,
    transaction_id: &str,
    confidence: f64,
) -> Result<()> {
    if !(0.0..=1.0).contains(&confidence) {
        bail!("Match confidence out of range: {}", confidence);
    }

    let updated = conn.execute(
        "UPDATE receipts SET transaction_id = ?1, match_confidence = ?2
         WHERE id = ?3 AND transaction_id IS NULL AND ocr_status = 'done'",
        params![transaction_id, confidence, receipt_id],
    )?;

    if updated != 1 {
        bail!("Receipt not linkable (missing, already linked, or OCR incomplete): {}", receipt_id);
    }

    Ok(())
}

/// Receipts for a user that have finished OCR but are not yet linked
pub fn list_unmatched_receipts(conn: &Connection, user_id: &str) -> Result<Vec<Receipt>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, file_name, file_hash, ocr_text, ocr_status,
                uploaded_at, transaction_id, match_confidence
         FROM receipts
         WHERE user_id = ?1 AND ocr_status = 'done' AND transaction_id IS NULL
         ORDER BY uploaded_at DESC",
    )?;

    let receipts = stmt
        .query_map(params![user_id], row_to_receipt)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(receipts)
}

// ============================================================================
// TESTS
// ============================================================================
