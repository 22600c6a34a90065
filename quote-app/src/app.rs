//! Glue between configuration, storage and the draft workflow.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use quote_core::db::{DbConfig, InMemoryRepositoryFactory, RepositoryRegistry};
use quote_core::{DraftSession, NewQuote, Quote, QuoteFilter, QuoteRepository};
use quote_db_sqlite::SqliteRepositoryFactory;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::catalog;
use crate::draft_file::DraftFile;
use crate::preview::QuoteTable;

/// Number of quotes shown under "recent" on the home summary.
pub const RECENT_QUOTES: usize = 3;

/// Registry with every storage backend this binary ships.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry.register(Box::new(InMemoryRepositoryFactory));
    registry
}

/// Total quote count plus the most recent quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeSummary {
    pub total_quotes: usize,
    pub recent: Vec<Quote>,
}

impl fmt::Display for HomeSummary {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "Total quotes: {}", self.total_quotes)?;
        writeln!(f)?;
        writeln!(f, "Recent quotes")?;
        write!(f, "{}", QuoteTable(&self.recent))
    }
}

pub async fn load_home_summary(repo: &dyn QuoteRepository) -> Result<HomeSummary> {
    let mut quotes = repo
        .list(&QuoteFilter::all())
        .await
        .context("Failed to list quotes")?;
    let total_quotes = quotes.len();
    quotes.truncate(RECENT_QUOTES);

    Ok(HomeSummary {
        total_quotes,
        recent: quotes,
    })
}

/// Result of running a draft file through the submission gate.
#[derive(Debug)]
pub enum CreateOutcome {
    /// The draft was stored.
    Created(Quote),
    /// The draft passed the gate but `--dry-run` kept it out of storage.
    Validated,
}

/// Load a draft file into a session using the given catalog (or the
/// built-in one) and tax rate fallback.
pub fn load_draft_session(
    draft_path: &Path,
    catalog_path: Option<&Path>,
    default_tax_rate: Decimal,
) -> Result<DraftSession> {
    let products = catalog::load_or_default(catalog_path).context("Failed to load catalog")?;
    let file = DraftFile::from_file(draft_path)
        .with_context(|| format!("Failed to load draft: {}", draft_path.display()))?;
    info!(
        path = %draft_path.display(),
        items = file.item_count(),
        "draft file read"
    );

    file.into_session(products, default_tax_rate)
        .with_context(|| format!("Invalid draft: {}", draft_path.display()))
}

pub async fn open_repository(db_config: &DbConfig) -> Result<Box<dyn QuoteRepository>> {
    debug!("connecting to {} backend", db_config.backend);
    build_registry()
        .create(db_config)
        .await
        .with_context(|| format!("Failed to open '{}' storage", db_config.backend))
}

/// Run the session's draft through the submission gate and, unless
/// `dry_run`, store it in the configured backend.
///
/// Storage is opened only once the draft has passed the gate and a real
/// create was asked for. A rejected draft yields the gate's own error
/// message.
pub async fn create_quote(
    db_config: &DbConfig,
    session: &DraftSession,
    dry_run: bool,
) -> Result<CreateOutcome> {
    let new_quote = session.submit().map_err(|e| {
        warn!(error = %e, "draft rejected");
        anyhow::Error::new(e)
    })?;

    if dry_run {
        info!("dry run, quote not stored");
        return Ok(CreateOutcome::Validated);
    }

    let repo = open_repository(db_config).await?;
    let quote = store_quote(&*repo, new_quote).await?;
    Ok(CreateOutcome::Created(quote))
}

pub async fn store_quote(
    repo: &dyn QuoteRepository,
    new_quote: NewQuote,
) -> Result<Quote> {
    let quote = repo
        .create(new_quote)
        .await
        .context("Failed to store quote")?;
    info!(id = quote.id, number = %quote.quote_number, "quote created");
    Ok(quote)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quote_core::db::InMemoryQuoteRepository;
    use quote_core::{QuoteStatus, SubmissionError, default_catalog};
    use rust_decimal_macros::dec;

    use super::*;

    fn ready_session() -> DraftSession {
        let mut session = DraftSession::new(default_catalog());
        let draft = session.draft_mut();
        draft.customer.name = "Acme Corp".to_string();
        draft.etc.poc = "Dana".to_string();
        draft.etc.email = "dana@example.com".to_string();
        draft.etc.phone = "555-0100".to_string();
        session.select_product("3").unwrap();
        session.confirm_add_item().unwrap();
        session
    }

    #[test]
    fn registry_has_both_backends() {
        assert_eq!(build_registry().available_backends(), vec!["memory", "sqlite"]);
    }

    #[tokio::test]
    async fn registry_opens_sample_memory_backend() {
        let repo = build_registry()
            .create(&DbConfig {
                backend: "memory".to_string(),
                connection_string: "sample".to_string(),
            })
            .await
            .unwrap();

        let summary = load_home_summary(&*repo).await.unwrap();

        assert_eq!(summary.total_quotes, 5);
        assert_eq!(summary.recent.len(), 3);
        assert_eq!(summary.recent[0].customer_name, "Acme Corp");
    }

    #[tokio::test]
    async fn home_summary_on_empty_store() {
        let repo = InMemoryQuoteRepository::new();

        let summary = load_home_summary(&repo).await.unwrap();

        assert_eq!(summary.total_quotes, 0);
        assert!(summary.recent.is_empty());
        assert!(summary.to_string().ends_with("No quotes found."));
    }

    fn memory_config() -> DbConfig {
        DbConfig {
            backend: "memory".to_string(),
            connection_string: "empty".to_string(),
        }
    }

    #[tokio::test]
    async fn store_quote_persists_submitted_draft() {
        let repo = InMemoryQuoteRepository::new();
        let new_quote = ready_session().submit().unwrap();

        let quote = store_quote(&repo, new_quote).await.unwrap();

        assert_eq!(quote.status, QuoteStatus::Draft);
        assert_eq!(quote.total, dec!(500));
        assert_eq!(repo.list(&QuoteFilter::all()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_quote_stores_in_configured_backend() {
        let outcome = create_quote(&memory_config(), &ready_session(), false)
            .await
            .unwrap();

        let CreateOutcome::Created(quote) = outcome else {
            panic!("expected a stored quote");
        };
        assert_eq!(quote.customer_name, "Acme Corp");
        assert_eq!(quote.quote_number, "Q-001");
    }

    #[tokio::test]
    async fn dry_run_leaves_no_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("quotes.db");
        let config = DbConfig {
            backend: "sqlite".to_string(),
            connection_string: db_path.display().to_string(),
        };

        let outcome = create_quote(&config, &ready_session(), true).await.unwrap();

        assert!(matches!(outcome, CreateOutcome::Validated));
        assert!(!db_path.exists());
    }

    #[tokio::test]
    async fn rejected_draft_leaves_no_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("quotes.db");
        let config = DbConfig {
            backend: "sqlite".to_string(),
            connection_string: db_path.display().to_string(),
        };
        let mut session = ready_session();
        session.draft_mut().etc.phone.clear();

        let err = create_quote(&config, &session, false).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<SubmissionError>(),
            Some(&SubmissionError::MissingEtcContact)
        );
        assert_eq!(
            err.to_string(),
            "All ETC Information fields are required (POC, Email, Phone)"
        );
        assert!(!db_path.exists());
    }

    #[tokio::test]
    async fn unknown_backend_is_reported() {
        let config = DbConfig {
            backend: "postgres".to_string(),
            connection_string: String::new(),
        };

        let err = open_repository(&config).await.err().unwrap();

        assert!(err.to_string().contains("Failed to open 'postgres' storage"));
    }
}
