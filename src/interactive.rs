use std::path::PathBuf;

use chrono::Local;
use inquire::{DateSelect, Text};

use crate::error::Result;
use crate::merge::{InvoiceDraft, parse_amount};
use crate::model::DEFAULT_SERVICE_DESCRIPTION;

/// Collects a full invoice interactively, in the same order the flags are
/// documented. Returns the draft plus the chosen output path.
pub fn collect() -> Result<(InvoiceDraft, PathBuf)> {
    println!("\n--- Invoice Generator - Interactive Mode ---\n");

    let client_name = optional(Text::new("Client name (optional, press Enter to skip):").prompt()?);
    let client_address =
        optional(Text::new("Client address (optional, press Enter to skip):").prompt()?);

    let service_description = Text::new("Service description:")
        .with_default(DEFAULT_SERVICE_DESCRIPTION)
        .prompt()?;

    let amount = prompt_amount("Invoice amount (USD):")?;

    let issue_date = DateSelect::new("Issue date:")
        .with_default(Local::now().date_naive())
        .prompt()?;

    let account_holder = prompt_required("Account holder name:")?;
    let dolartag = prompt_required("Dolartag:")?;
    let additional_payment_info = optional(
        Text::new("Additional payment info (optional, press Enter to skip):").prompt()?,
    );

    let default_filename = format!("invoice_{}.pdf", Local::now().format("%Y%m%d_%H%M%S"));
    let output = Text::new("Output filename:")
        .with_default(&default_filename)
        .prompt()?;

    let draft = InvoiceDraft {
        client_name,
        client_address,
        service_description: Some(service_description),
        issue_date: Some(issue_date),
        amount: Some(amount),
        account_holder: Some(account_holder),
        dolartag: Some(dolartag),
        additional_payment_info,
        ..Default::default()
    };
    Ok((draft, PathBuf::from(output)))
}

fn optional(input: String) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Loops until the user enters something non-empty.
pub fn prompt_required(message: &str) -> Result<String> {
    loop {
        let value = Text::new(message).prompt()?;
        if !value.trim().is_empty() {
            return Ok(value.trim().to_string());
        }
        println!("This field is required.");
    }
}

/// Loops until the input parses as a non-negative amount.
pub fn prompt_amount(message: &str) -> Result<f64> {
    loop {
        let value = Text::new(message).prompt()?;
        match parse_amount(&value) {
            Ok(amount) => return Ok(amount),
            Err(err) => println!("{err}. Please enter a numeric value."),
        }
    }
}
