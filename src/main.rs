mod config;
mod error;
mod interactive;
mod layout;
mod merge;
mod model;
mod onboard;
mod render;
mod store;

use std::path::PathBuf;

use anyhow::bail;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use comfy_table::{Attribute, Cell, Table};
use inquire::Text;

use crate::config::Settings;
use crate::error::Result;
use crate::merge::{InvoiceDraft, parse_amount};
use crate::store::{Numbering, Store, TemplateRegistry};

#[derive(Parser)]
#[command(name = "factura", version, about = "Generate contractor invoices as PDF documents")]
struct Cli {
    /// Store file to use instead of the configured data root
    #[arg(long, global = true, value_name = "FILE")]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new invoice (interactive unless enough flags are given)
    New(NewArgs),
    /// List saved templates
    Templates,
    /// Show the current invoice number without allocating one
    Number,
    /// Guided first-time setup: numbering, contractor details, first template
    Onboard,
    /// Configure the data directory used for the invoice store
    Config,
}

#[derive(Args)]
struct NewArgs {
    /// Invoice amount in USD (accepts $ and thousands separators)
    #[arg(long)]
    amount: Option<String>,

    /// Account holder name for payment
    #[arg(long)]
    account_holder: Option<String>,

    /// Dolarapp dolartag
    #[arg(long)]
    dolartag: Option<String>,

    /// Client name
    #[arg(long)]
    client_name: Option<String>,

    /// Client address
    #[arg(long)]
    client_address: Option<String>,

    /// Client EIN (Employer Identification Number)
    #[arg(long)]
    client_ein: Option<String>,

    /// Contractor name
    #[arg(long)]
    contractor_name: Option<String>,

    /// Contractor CUIL
    #[arg(long)]
    contractor_cuil: Option<String>,

    /// Argentine tax status (monotributista/autónomo)
    #[arg(long)]
    contractor_tax_status: Option<String>,

    /// Service description (default: Contractor services - Software Engineer)
    #[arg(long)]
    service_description: Option<String>,

    /// Service period (e.g. "Services provided during October 2025")
    #[arg(long)]
    service_period: Option<String>,

    /// Issue date (YYYY-MM-DD, default: today)
    #[arg(long)]
    issue_date: Option<NaiveDate>,

    /// Additional payment information
    #[arg(long)]
    additional_payment_info: Option<String>,

    /// Output filename (default: invoice_YYYYMMDD_HHMMSS.pdf)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Load invoice details from a saved template
    #[arg(long, value_name = "NAME")]
    use_template: Option<String>,

    /// Save the resolved invoice details as a template
    #[arg(long, value_name = "NAME")]
    save_template: Option<String>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("❌ Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let store = Store::new(config::store_path(cli.data_file));

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::New(args) => generate(&store, args),
        Commands::Templates => list_templates(&store),
        Commands::Number => {
            let current = Numbering::new(&store).peek_current()?;
            println!("Current invoice number: {current}");
            Ok(())
        }
        Commands::Onboard => Ok(onboard::run(&store)?),
        Commands::Config => configure(),
    }
}

fn generate(store: &Store, args: NewArgs) -> anyhow::Result<()> {
    let registry = TemplateRegistry::new(store);

    // Template lookup happens before anything can mutate the store.
    let template = match &args.use_template {
        Some(name) => {
            let record = registry.load(name)?;
            println!("Loaded template: {name}");
            Some(record)
        }
        None => None,
    };

    let save_template = args.save_template.clone();
    let output_flag = args.output.clone();
    let draft = draft_from_args(args)?;

    let (draft, output, template) = if draft.can_run_unattended(template.as_ref()) {
        (draft, resolve_output(output_flag), template)
    } else if draft.wants_argument_mode() {
        bail!(
            "argument mode needs --amount, --account-holder and --dolartag \
             (directly or via --use-template); run `factura new` without flags \
             for interactive mode"
        );
    } else {
        // Prompts collect every field themselves; templates only
        // participate in argument mode.
        let (draft, output) = interactive::collect()?;
        (draft, output, None)
    };

    // The counter only advances after everything else that can still fail
    // has been checked, so a validation error never burns a number.
    render::ensure_typst()?;
    let number = Numbering::new(store).allocate_next()?;
    let record = draft.resolve(number.clone(), template.as_ref())?;

    let output = force_pdf_suffix(output);
    let renderer = render::Renderer::new()?;
    let blocks = layout::build_blocks(&record)?;
    renderer.compile(&blocks, &render::LETTER, &output)?;
    println!("✅ Invoice #{number} generated: {}", output.display());

    if let Some(name) = save_template {
        registry.save(&name, &record.as_template())?;
        println!("✅ Template saved as '{name}'");
    }
    Ok(())
}

fn draft_from_args(args: NewArgs) -> Result<InvoiceDraft> {
    let amount = match &args.amount {
        Some(raw) => Some(parse_amount(raw)?),
        None => None,
    };
    Ok(InvoiceDraft {
        client_name: args.client_name,
        client_address: args.client_address,
        client_ein: args.client_ein,
        contractor_name: args.contractor_name,
        contractor_cuil: args.contractor_cuil,
        contractor_tax_status: args.contractor_tax_status,
        service_description: args.service_description,
        service_period: args.service_period,
        issue_date: args.issue_date,
        amount,
        account_holder: args.account_holder,
        dolartag: args.dolartag,
        additional_payment_info: args.additional_payment_info,
    })
}

fn resolve_output(output: Option<PathBuf>) -> PathBuf {
    output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "invoice_{}.pdf",
            Local::now().format("%Y%m%d_%H%M%S")
        ))
    })
}

fn force_pdf_suffix(path: PathBuf) -> PathBuf {
    if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    {
        return path;
    }
    let mut name = path.into_os_string();
    name.push(".pdf");
    PathBuf::from(name)
}

fn list_templates(store: &Store) -> anyhow::Result<()> {
    let entries = TemplateRegistry::new(store).entries()?;
    if entries.is_empty() {
        println!("No templates saved yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Template").add_attribute(Attribute::Bold),
        Cell::new("Client").add_attribute(Attribute::Bold),
        Cell::new("Account Holder").add_attribute(Attribute::Bold),
        Cell::new("Dolartag").add_attribute(Attribute::Bold),
    ]);
    for (name, record) in entries {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(record.client_name),
            Cell::new(record.account_holder),
            Cell::new(record.dolartag),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let current = config::load_settings().map(|s| s.data_root);
    let default_root = current.unwrap_or_else(|| ".".to_string());
    let data_root = Text::new("Data directory for the invoice store:")
        .with_default(&default_root)
        .prompt()?;
    config::save_settings(&Settings { data_root })?;
    println!(
        "✅ Settings saved. Store file: {}",
        config::store_path(None).display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_suffix_is_forced_but_never_doubled() {
        assert_eq!(
            force_pdf_suffix(PathBuf::from("invoice_january")),
            PathBuf::from("invoice_january.pdf")
        );
        assert_eq!(
            force_pdf_suffix(PathBuf::from("invoice.v2")),
            PathBuf::from("invoice.v2.pdf")
        );
        assert_eq!(
            force_pdf_suffix(PathBuf::from("invoice.pdf")),
            PathBuf::from("invoice.pdf")
        );
    }

    #[test]
    fn default_output_name_is_timestamped_pdf() {
        let name = resolve_output(None);
        let name = name.to_string_lossy().to_string();
        assert!(name.starts_with("invoice_"));
        assert!(name.ends_with(".pdf"));
    }
}
