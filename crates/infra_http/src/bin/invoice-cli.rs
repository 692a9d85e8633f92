//! Invoice Desk - Command Line Client
//!
//! Validates, submits and lists invoices against the invoice service.
//!
//! # Usage
//!
//! ```bash
//! # Check a draft without sending it
//! invoice-cli validate draft.json
//!
//! # Sign in and create the invoice
//! INVOICE_USERNAME=jane INVOICE_PASSWORD=... invoice-cli submit draft.json
//!
//! # First page of invoices matching a keyword
//! invoice-cli list acme --page 1 --page-size 10
//! ```
//!
//! # Environment Variables
//!
//! * `INVOICE_API_BASE_URL` - Invoice and membership services (default: http://localhost:8080/api)
//! * `INVOICE_AUTH_BASE_URL` - Identity provider (default: http://localhost:8080/auth)
//! * `INVOICE_CLIENT_ID` / `INVOICE_CLIENT_SECRET` - OAuth client credentials
//! * `INVOICE_TIMEOUT_SECS` - Request timeout (default: 10)
//! * `INVOICE_LOG_LEVEL` - Log level when `RUST_LOG` is unset (default: info)
//! * `INVOICE_REMOVE_POLICY` - `flag_at_submit` or `block`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_invoice::{
    CreateInvoiceSession, InvoiceDraft, InvoiceListState, LoginForm, Notification, Notifier,
    RefreshTrigger, Severity, SubmissionPipeline, SubmitOutcome, ValidationErrors,
};
use infra_http::{AuthClient, ClientConfig, HttpInvoiceAdapter, SessionTokens};

#[derive(Debug, Parser)]
#[command(name = "invoice-cli", version, about = "Create and browse invoices")]
struct Cli {
    /// Username for commands that call the backend
    #[arg(long, global = true, env = "INVOICE_USERNAME")]
    username: Option<String>,

    /// Password for commands that call the backend
    #[arg(long, global = true, env = "INVOICE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the validation errors of a draft
    Validate { draft: PathBuf },
    /// Print the totals preview of a draft
    Totals { draft: PathBuf },
    /// Sign in and create the invoice described by a draft
    Submit { draft: PathBuf },
    /// Print one page of invoices
    List {
        keyword: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },
}

/// Shows notifications on the terminal
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Default => info!(title = %notification.title, "{}", notification.description),
            Severity::Destructive => warn!(title = %notification.title, "{}", notification.description),
        }
        println!("{}: {}", notification.title, notification.description);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ClientConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.log_level);

    match cli.command {
        Command::Validate { ref draft } => {
            let draft = read_draft(draft)?;
            let errors = domain_invoice::INVOICE_SCHEMA.validate(&draft);
            print_errors(&errors);
            if !errors.is_empty() {
                bail!("{} field(s) failed validation", errors.len());
            }
            println!("Draft is valid");
        }
        Command::Totals { ref draft } => {
            let draft = read_draft(draft)?;
            let totals = draft.totals().context("Cannot compute totals")?;
            for (index, line) in totals.lines.iter().enumerate() {
                println!("item {:>3}  gross {:>12}  adj {:>12}  net {:>12}", index, line.gross, line.adjustments, line.net);
            }
            println!("subtotal    {:>12}", totals.subtotal);
            println!("adjustments {:>12}", totals.adjustments);
            println!("total       {:>12}", totals.total);
        }
        Command::Submit { ref draft } => {
            let draft = read_draft(draft)?;
            let tokens = sign_in(&cli, &config).await?;
            submit(&config, tokens, &draft).await?;
        }
        Command::List {
            ref keyword,
            page,
            page_size,
        } => {
            let tokens = sign_in(&cli, &config).await?;
            list(&config, tokens, keyword.as_deref(), page, page_size).await?;
        }
    }
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

fn read_draft(path: &Path) -> Result<InvoiceDraft> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not an invoice draft", path.display()))
}

fn print_errors(errors: &ValidationErrors) {
    for (path, messages) in errors.iter() {
        for message in messages {
            println!("{}: {}", path, message);
        }
    }
}

async fn sign_in(cli: &Cli, config: &ClientConfig) -> Result<Arc<SessionTokens>> {
    let form = LoginForm::new(
        cli.username.clone().unwrap_or_default(),
        cli.password.clone().unwrap_or_default(),
    );
    let tokens = Arc::new(SessionTokens::new());
    AuthClient::new(config, tokens.clone())?
        .login(&form)
        .await
        .context("Login failed")?;
    Ok(tokens)
}

async fn submit(config: &ClientConfig, tokens: Arc<SessionTokens>, draft: &InvoiceDraft) -> Result<()> {
    let adapter = Arc::new(HttpInvoiceAdapter::new(config, tokens)?);
    let pipeline = SubmissionPipeline::new(adapter, Arc::new(RefreshTrigger::new()), Arc::new(ConsoleNotifier));
    let session = CreateInvoiceSession::new(pipeline, config.remove_policy);
    session.fill(draft).context("Draft does not fit the invoice form")?;

    match session.submit().await {
        SubmitOutcome::Created => Ok(()),
        SubmitOutcome::Invalid(errors) => {
            print_errors(&errors);
            bail!("{} field(s) failed validation", errors.len())
        }
        SubmitOutcome::Failed => bail!("The invoice service rejected the draft"),
        outcome => bail!("Submission did not run: {:?}", outcome),
    }
}

async fn list(
    config: &ClientConfig,
    tokens: Arc<SessionTokens>,
    keyword: Option<&str>,
    page: u32,
    page_size: u32,
) -> Result<()> {
    let adapter = HttpInvoiceAdapter::new(config, tokens)?;
    let mut state = InvoiceListState::new();
    state.set_page(page);
    state.set_page_size(page_size);
    state.set_keyword(keyword.unwrap_or_default());

    if let Err(e) = state.load(&adapter).await {
        let message = state.error().unwrap_or("Failed to fetch invoices");
        return Err(anyhow::Error::new(e).context(message.to_string()));
    }

    for invoice in state.invoices() {
        println!(
            "{:<14} {:<24} {:>12} {} {}",
            invoice.invoice_number,
            invoice.customer_name(),
            invoice.total_amount,
            invoice.currency,
            if invoice.is_paid() { "PAID" } else { "" }
        );
    }
    println!(
        "page {} of {} ({} invoices)",
        state.query().page_num,
        state.total_pages(),
        state.total_records()
    );
    Ok(())
}
