use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use quote_api::QuoteApiClient;
use quote_core::{QuoteFilter, QuoteRepository, QuoteStatus};
use tracing::{debug, info};

use quote_app::app::{self, CreateOutcome};
use quote_app::catalog;
use quote_app::config::AppConfig;
use quote_app::logging;
use quote_app::preview::{CatalogTable, QuotePreview, QuoteTable};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Quote desk: build, validate and list sales quotes.
///
/// Reads `quote-desk.toml` from the working directory when present; the
/// `QUOTE_DESK_*` environment variables and the flags below override it.
#[derive(Debug, Parser)]
#[command(name = "quote-desk", version)]
struct Cli {
    /// Configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage backend (`sqlite` or `memory`).
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Backend connection string.
    /// For SQLite this is a file path (e.g. `quotes.db`) or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Base URL of the quote service used by `editable --remote`.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log level or full filter directive (e.g. `debug`).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Total quote count and the most recent quotes.
    Home,

    /// All quotes, newest first.
    List {
        /// Only show quotes with this status (repeatable).
        #[arg(long = "status", value_parser = parse_status)]
        statuses: Vec<QuoteStatus>,
    },

    /// Quotes that can still be edited (DRAFT and NOT_SENT).
    Editable {
        /// Fetch from the quote service instead of local storage.
        #[arg(long)]
        remote: bool,
    },

    /// Load a draft file, preview it and store it as a new quote.
    Create {
        /// Draft file (TOML).
        #[arg(long)]
        draft: PathBuf,

        /// Product catalog (CSV: id,name,price).
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Validate and preview only; store nothing.
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the product catalog.
    Products {
        /// Product catalog (CSV: id,name,price).
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

fn parse_status(s: &str) -> Result<QuoteStatus, String> {
    QuoteStatus::parse(&s.to_ascii_uppercase()).ok_or_else(|| {
        let known: Vec<_> = QuoteStatus::all().iter().map(QuoteStatus::as_str).collect();
        format!("unknown status '{s}', expected one of {}", known.join(", "))
    })
}

/// Flags win over everything loaded from file and environment.
fn apply_cli_overrides(
    config: &mut AppConfig,
    cli: &Cli,
) {
    if let Some(backend) = &cli.backend {
        config.database.backend = backend.clone();
    }
    if let Some(db) = &cli.db {
        config.database.connection_string = db.clone();
    }
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
}

async fn open_repository(config: &AppConfig) -> anyhow::Result<Box<dyn QuoteRepository>> {
    app::open_repository(&config.db_config()).await
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    apply_cli_overrides(&mut config, &cli);

    logging::init_logging(&config.logging.level);
    if let Some(path) = &config.logging.file {
        logging::enable_file_logging(path)?;
    }
    debug!(?config, "effective configuration");

    match cli.command {
        Command::Products {
            catalog: catalog_path,
        } => {
            let products = catalog::load_or_default(catalog_path.as_deref())?;
            println!("{}", CatalogTable(&products));
        }
        Command::Editable { remote: true } => {
            let client = QuoteApiClient::new(config.api.base_url.as_str());
            let quotes = client.editable_quotes().await;
            println!("{}", QuoteTable(&quotes));
        }
        Command::Editable { remote: false } => {
            let repo = open_repository(&config).await?;
            let quotes = repo
                .list(&QuoteFilter::editable())
                .await
                .context("Failed to list editable quotes")?;
            println!("{}", QuoteTable(&quotes));
        }
        Command::Home => {
            let repo = open_repository(&config).await?;
            let summary = app::load_home_summary(&*repo).await?;
            println!("{summary}");
        }
        Command::List { statuses } => {
            let repo = open_repository(&config).await?;
            let quotes = repo
                .list(&QuoteFilter::with_statuses(statuses))
                .await
                .context("Failed to list quotes")?;
            println!("{}", QuoteTable(&quotes));
        }
        Command::Create {
            draft,
            catalog,
            dry_run,
        } => {
            let session = app::load_draft_session(
                &draft,
                catalog.as_deref(),
                config.quote.default_tax_rate,
            )?;
            println!("{}", QuotePreview(session.draft()));
            println!();

            match app::create_quote(&config.db_config(), &session, dry_run).await? {
                CreateOutcome::Created(quote) => {
                    println!("Created quote {} for {}", quote.quote_number, quote.customer_name);
                }
                CreateOutcome::Validated => println!("Draft is valid (dry run, nothing stored)."),
            }
        }
    }

    info!("done");
    Ok(())
}
