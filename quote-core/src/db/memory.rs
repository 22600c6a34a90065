//! In-process [`QuoteRepository`] backed by a vector.
//!
//! Used for demos, for tests of code that only needs *some* repository, and
//! as the `"memory"` backend of the [`RepositoryRegistry`](super::RepositoryRegistry).

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use super::factory::{DbConfig, RepositoryFactory};
use super::repository::{QuoteFilter, QuoteRepository, RepositoryError, check_requested_number};
use crate::models::{LineItem, NewQuote, Quote, QuoteStatus, QuoteType, format_quote_number};

#[derive(Debug, Clone)]
struct StoredQuote {
    quote: Quote,
    items: Vec<LineItem>,
}

#[derive(Debug, Default)]
struct MemoryState {
    quotes: Vec<StoredQuote>,
    next_id: i64,
}

#[derive(Debug, Default)]
pub struct InMemoryQuoteRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryQuoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository pre-filled with [`sample_quotes`].
    pub fn with_sample_data() -> Self {
        let quotes: Vec<_> = sample_quotes()
            .into_iter()
            .map(|quote| StoredQuote {
                quote,
                items: Vec::new(),
            })
            .collect();
        let next_id = quotes.iter().map(|q| q.quote.id).max().unwrap_or(0);

        Self {
            state: RwLock::new(MemoryState { quotes, next_id }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>, RepositoryError> {
        self.state
            .read()
            .map_err(|e| RepositoryError::Database(format!("state lock poisoned: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>, RepositoryError> {
        self.state
            .write()
            .map_err(|e| RepositoryError::Database(format!("state lock poisoned: {e}")))
    }
}

#[async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn list(
        &self,
        filter: &QuoteFilter,
    ) -> Result<Vec<Quote>, RepositoryError> {
        let state = self.read()?;
        let mut quotes: Vec<Quote> = state
            .quotes
            .iter()
            .map(|stored| &stored.quote)
            .filter(|quote| filter.matches(quote))
            .cloned()
            .collect();

        quotes.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(quotes)
    }

    async fn get(
        &self,
        id: i64,
    ) -> Result<Quote, RepositoryError> {
        self.read()?
            .quotes
            .iter()
            .find(|stored| stored.quote.id == id)
            .map(|stored| stored.quote.clone())
            .ok_or(RepositoryError::NotFound)
    }

    async fn create(
        &self,
        quote: NewQuote,
    ) -> Result<Quote, RepositoryError> {
        check_requested_number(&quote)?;
        let mut state = self.write()?;
        if let Some(number) = &quote.quote_number {
            if state.quotes.iter().any(|s| &s.quote.quote_number == number) {
                return Err(RepositoryError::DuplicateQuoteNumber(number.clone()));
            }
        }
        state.next_id += 1;
        let id = state.next_id;

        let created = Quote {
            id,
            quote_number: quote
                .quote_number
                .unwrap_or_else(|| format_quote_number(id)),
            customer_name: quote.customer_name,
            quote_type: quote.quote_type,
            status: quote.status,
            date_sent: None,
            created_at: Utc::now().date_naive(),
            total: quote.totals.total,
        };

        debug!(id, quote_number = %created.quote_number, "quote stored in memory");
        state.quotes.push(StoredQuote {
            quote: created.clone(),
            items: quote.items,
        });
        Ok(created)
    }

    async fn update(
        &self,
        quote: &Quote,
    ) -> Result<(), RepositoryError> {
        let mut state = self.write()?;
        let stored = state
            .quotes
            .iter_mut()
            .find(|stored| stored.quote.id == quote.id)
            .ok_or(RepositoryError::NotFound)?;

        stored.quote = quote.clone();
        Ok(())
    }

    async fn delete(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let mut state = self.write()?;
        let before = state.quotes.len();
        state.quotes.retain(|stored| stored.quote.id != id);

        if state.quotes.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_items(
        &self,
        quote_id: i64,
    ) -> Result<Vec<LineItem>, RepositoryError> {
        self.read()?
            .quotes
            .iter()
            .find(|stored| stored.quote.id == quote_id)
            .map(|stored| stored.items.clone())
            .ok_or(RepositoryError::NotFound)
    }
}

/// The five demo quotes shown on the home screen and in the quote list.
pub fn sample_quotes() -> Vec<Quote> {
    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, day).unwrap_or_default()
    }

    let rows = [
        (1, "Acme Corp", QuoteType::StraightSale, QuoteStatus::Sent, 20, 5200),
        (2, "Tech Solutions Inc", QuoteType::ToProject, QuoteStatus::Accepted, 19, 8950),
        (3, "BuildPro Ltd", QuoteType::EstimateBid, QuoteStatus::Draft, 18, 12400),
        (4, "Urban Designs", QuoteType::StraightSale, QuoteStatus::Sent, 17, 3750),
        (5, "Coast Builders", QuoteType::ToProject, QuoteStatus::Rejected, 16, 9200),
    ];

    rows.into_iter()
        .map(|(id, customer, quote_type, status, day, total)| Quote {
            id,
            quote_number: format_quote_number(id),
            customer_name: customer.to_string(),
            quote_type,
            status,
            date_sent: Some(date(day)),
            created_at: date(day),
            total: Decimal::from(total),
        })
        .collect()
}

/// [`RepositoryFactory`] for the in-memory backend.
///
/// | connection_string | result                          |
/// |-------------------|---------------------------------|
/// | `empty`           | a repository with no quotes     |
/// | anything else     | a repository with sample quotes |
pub struct InMemoryRepositoryFactory;

#[async_trait]
impl RepositoryFactory for InMemoryRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn QuoteRepository>, RepositoryError> {
        let repo = match config.connection_string.as_str() {
            "empty" => InMemoryQuoteRepository::new(),
            _ => InMemoryQuoteRepository::with_sample_data(),
        };
        Ok(Box::new(repo))
    }
}
