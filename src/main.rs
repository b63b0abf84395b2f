// Demo driver: exercise the full engine against a local SQLite file

use anyhow::Result;
use chrono::{Local, NaiveDate};
use rusqlite::Connection;

use tallybook::{
    insert_receipt, insert_transaction, link_receipt, list_transactions, prepare_draft,
    set_ocr_result, setup_database, CategoryRegistry, DraftInput, EvidenceRuleSet, OcrStatus,
    PaymentMethod, Receipt, ReceiptMatcher, ReconcileState, TransactionType, ValidatorConfig,
};

fn main() -> Result<()> {
    let db_path = std::env::args().nth(1).unwrap_or_else(|| "tallybook.db".to_string());
    let conn = Connection::open(&db_path)?;
    setup_database(&conn)?;
    println!("✓ Database ready: {}", db_path);

    let registry = CategoryRegistry::with_defaults();
    let rules = EvidenceRuleSet::default_rules();
    let validator = ValidatorConfig::default();
    let today = Local::now().date_naive();

    // 1. Record an income entry through the canonical pipeline
    let income = prepare_draft(
        &DraftInput {
            user_id: "demo".to_string(),
            tx_type: TransactionType::Income,
            date: today,
            counterparty_name: "Acme Studio".to_string(),
            description: "Logo design project".to_string(),
            category: "Freelance Income".to_string(),
            amount_gross: 1_000_000,
            taxation_type: None,
            payment_method: PaymentMethod::Transfer,
            evidence_type: None,
            business_use_ratio: 1.0,
        },
        &registry,
        &rules,
        &validator,
        today,
    )?;

    println!(
        "✓ Income draft: gross {} | withholding {}+{} | net {}",
        income.amount_gross,
        income.withholding_income_tax,
        income.withholding_local_tax,
        income.net_receivable()
    );
    insert_transaction(&conn, &income)?;

    // 2. Record a card expense
    let expense = prepare_draft(
        &DraftInput {
            user_id: "demo".to_string(),
            tx_type: TransactionType::Expense,
            date: date_days_ago(today, 1),
            counterparty_name: "스타벅스 강남점".to_string(),
            description: "스타벅스 강남점".to_string(),
            category: "Meals".to_string(),
            amount_gross: 12_000,
            taxation_type: None,
            payment_method: PaymentMethod::Card,
            evidence_type: None,
            business_use_ratio: 1.0,
        },
        &registry,
        &rules,
        &validator,
        today,
    )?;

    println!(
        "✓ Expense draft: gross {} = supply {} + vat {} | evidence {}",
        expense.amount_gross,
        expense.supply_amount(),
        expense.vat_amount,
        expense.evidence_type.as_str()
    );
    insert_transaction(&conn, &expense)?;

    // 3. Upload a receipt and simulate the OCR collaborator finishing
    let receipt = Receipt::new("demo", "starbucks.jpg", b"demo-receipt-bytes");
    insert_receipt(&conn, &receipt)?;
    set_ocr_result(&conn, &receipt.id, OcrStatus::Done, Some("스타벅스 12,000원"))?;
    let receipt = tallybook::get_receipt(&conn, &receipt.id)?
        .ok_or_else(|| anyhow::anyhow!("receipt disappeared after insert"))?;
    println!("✓ Receipt OCR done, state: {:?}", ReconcileState::of(&receipt));

    // 4. Match against the live transaction pool
    let pool = list_transactions(&conn, "demo")?;
    let matcher = ReceiptMatcher::new();
    let candidates = matcher.match_receipt(&receipt, &pool);

    println!("✓ {} candidate(s):", candidates.len());
    for candidate in &candidates {
        println!(
            "  {} | score {:.2} (amount {:.2}, text {:.2}, date {:.2}){}",
            candidate.transaction_id,
            candidate.score,
            candidate.amount_score,
            candidate.text_score,
            candidate.date_score,
            if candidate.confident { " ← confident" } else { "" }
        );
    }

    // 5. Explicit link action on a confident top candidate
    if let Some(top) = candidates.first().filter(|c| c.confident) {
        link_receipt(&conn, &receipt.id, &top.transaction_id, top.score)?;
        let linked = tallybook::get_receipt(&conn, &receipt.id)?
            .ok_or_else(|| anyhow::anyhow!("receipt disappeared after link"))?;
        println!("✓ Linked receipt, state: {:?}", ReconcileState::of(&linked));
    } else {
        println!("· No confident match; leaving receipt for manual search");
    }

    Ok(())
}

fn date_days_ago(today: NaiveDate, days: i64) -> NaiveDate {
    today - chrono::Duration::days(days)
}
