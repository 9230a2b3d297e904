use inquire::{Confirm, Text};
use slug::slugify;

use crate::error::Result;
use crate::interactive::prompt_required;
use crate::model::{DEFAULT_SERVICE_DESCRIPTION, StoreDocument, TemplateRecord};
use crate::store::{Store, TemplateRegistry, format_invoice_number};

/// Guided first-time setup: picks the starting invoice number, collects the
/// contractor's details, and saves the first template. Overwrites any
/// existing store after confirmation (the counter is reset).
pub fn run(store: &Store) -> Result<()> {
    println!("\n--- Invoice Generator - Onboarding ---\n");
    println!("This will set up your invoice numbering and a reusable template");
    println!("for your main client.\n");

    if store.path().exists() {
        println!("⚠️  Found existing store: {}", store.path().display());
        let overwrite = Confirm::new("Overwrite it? This will reset your invoice counter.")
            .with_default(false)
            .prompt()?;
        if !overwrite {
            println!("Onboarding cancelled.");
            return Ok(());
        }
    }

    let start: u64 = loop {
        let value = Text::new("First invoice number (e.g. 1 for 0001):")
            .with_default("1")
            .prompt()?;
        match value.trim().parse::<u64>() {
            Ok(n) if n >= 1 => break n,
            _ => println!("Please enter a whole number of 1 or more."),
        }
    };

    println!("\n--- Your contractor information ---");
    let contractor_name = prompt_required("Your full name:")?;
    let contractor_cuil = prompt_required("Your CUIL number:")?;
    let contractor_tax_status = Text::new("Tax status (monotributista/autónomo, optional):")
        .with_default("")
        .prompt()?
        .trim()
        .to_string();

    println!("\n--- Payment information (Dolarapp) ---");
    let account_holder = Text::new("Account holder name:")
        .with_default(&contractor_name)
        .prompt()?;
    let mut dolartag = prompt_required("Your dolartag (e.g. $username):")?;
    if !dolartag.starts_with('$') {
        dolartag = format!("${dolartag}");
        println!("Added $ prefix to dolartag: {dolartag}");
    }

    println!("\n--- Your main client ---");
    let client_name = prompt_required("Client name:")?;
    let client_address = Text::new("Client address (optional):")
        .with_default("")
        .prompt()?
        .trim()
        .to_string();
    let client_ein = Text::new("Client EIN (optional):")
        .with_default("")
        .prompt()?
        .trim()
        .to_string();

    let service_description = Text::new("Default service description:")
        .with_default(DEFAULT_SERVICE_DESCRIPTION)
        .prompt()?;

    let template_name = Text::new("Template name:")
        .with_default(&slugify(&client_name))
        .prompt()?;

    let template = TemplateRecord {
        client_name,
        client_address,
        client_ein,
        contractor_name: contractor_name.clone(),
        contractor_cuil,
        contractor_tax_status,
        service_description,
        account_holder,
        dolartag,
        additional_payment_info: String::new(),
    };

    // Fresh document: the counter stores one less than the first number
    // because allocation increments before formatting.
    store.save(&StoreDocument {
        last_invoice_number: start - 1,
        templates: Default::default(),
    })?;
    TemplateRegistry::new(store).save(&template_name, &template)?;

    println!("\n✨ Template '{template_name}' created.");
    println!("✅ Next invoice will be #{}", format_invoice_number(start));
    println!("\nGenerate your first invoice with:");
    println!("  factura new --use-template \"{template_name}\" --amount 5000 \\");
    println!("    --service-period \"Services provided during January 2025\"");
    println!("\nList templates any time with: factura templates");
    Ok(())
}
