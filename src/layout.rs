use serde::Serialize;

use crate::error::{InvoiceError, Result};
use crate::model::InvoiceRecord;

pub const CURRENCY_LABEL: &str = "USD";
pub const NOTE_TEXT: &str =
    "Services performed outside the U.S.; no U.S. withholding applies.";

/// One discrete visual unit in the rendered document. The renderer consumes
/// these in order; it never inspects the invoice record itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// Centered large-type document title.
    Title { text: String },
    /// Two-column key/value table (invoice number, date, currency).
    KeyValues { rows: Vec<KeyValue> },
    /// Heading plus free lines (the From / Bill To sections).
    Party { heading: String, lines: Vec<String> },
    /// Bordered data table with a header row.
    ItemTable {
        heading: String,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Right-aligned total row.
    Total { label: String, value: String },
    /// Remittance instructions: heading, bold intro, detail lines.
    Remittance {
        heading: String,
        intro: String,
        lines: Vec<String>,
    },
    /// Bordered, muted advisory paragraph.
    Note { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

fn kv(key: &str, value: &str) -> KeyValue {
    KeyValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Builds the fixed block sequence for one invoice.
///
/// Pure function of the record: same input, same blocks, byte for byte.
/// Optional party lines are omitted entirely when their field is empty;
/// the payment identity is required and fails loudly when absent.
pub fn build_blocks(record: &InvoiceRecord) -> Result<Vec<Block>> {
    if record.account_holder.trim().is_empty() {
        return Err(InvoiceError::MissingRequiredField("account holder"));
    }
    if record.dolartag.trim().is_empty() {
        return Err(InvoiceError::MissingRequiredField("dolartag"));
    }

    let amount = format_usd(record.amount);

    let mut blocks = vec![
        Block::Title {
            text: "INVOICE".to_string(),
        },
        Block::KeyValues {
            rows: vec![
                kv("Invoice Number:", &record.invoice_number),
                kv("Issue Date:", &record.issue_date),
                kv("Currency:", CURRENCY_LABEL),
            ],
        },
    ];

    let mut from_lines = Vec::new();
    if !record.contractor_name.is_empty() {
        from_lines.push(record.contractor_name.clone());
    }
    if !record.contractor_cuil.is_empty() {
        from_lines.push(format!("CUIL: {}", record.contractor_cuil));
    }
    if !record.contractor_tax_status.is_empty() {
        from_lines.push(format!("Tax Status: {}", record.contractor_tax_status));
    }
    blocks.push(Block::Party {
        heading: "From:".to_string(),
        lines: from_lines,
    });

    let mut to_lines = Vec::new();
    if !record.client_name.is_empty() {
        to_lines.push(record.client_name.clone());
    }
    if !record.client_address.is_empty() {
        to_lines.push(record.client_address.clone());
    }
    if !record.client_ein.is_empty() {
        to_lines.push(format!("EIN: {}", record.client_ein));
    }
    blocks.push(Block::Party {
        heading: "Bill To:".to_string(),
        lines: to_lines,
    });

    // Single service row; the period rides in the same cell on its own line.
    let mut description = record.service_description.clone();
    if !record.service_period.is_empty() {
        description.push('\n');
        description.push_str(&record.service_period);
    }
    blocks.push(Block::ItemTable {
        heading: "Services".to_string(),
        columns: vec![
            "Description".to_string(),
            format!("Amount ({CURRENCY_LABEL})"),
        ],
        rows: vec![vec![description, amount.clone()]],
    });

    blocks.push(Block::Total {
        label: "Total:".to_string(),
        value: amount,
    });

    let mut remit_lines = vec![
        format!("Account Holder: {}", record.account_holder),
        format!("Dolartag: {}", record.dolartag),
    ];
    if !record.additional_payment_info.is_empty() {
        remit_lines.push(record.additional_payment_info.clone());
    }
    blocks.push(Block::Remittance {
        heading: "Remittance Instructions".to_string(),
        intro: "Dolarapp Account Information:".to_string(),
        lines: remit_lines,
    });

    blocks.push(Block::Note {
        text: NOTE_TEXT.to_string(),
    });

    Ok(blocks)
}

/// Fixed-point dollar formatting: two decimals, comma thousands grouping,
/// `$` prefix, for any magnitude.
pub fn format_usd(amount: f64) -> String {
    let fixed = format!("{amount:.2}");
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some(parts) => parts,
        None => (fixed.as_str(), "00"),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${grouped}.{frac_part}")
}
