use async_trait::async_trait;
use thiserror::Error;

use crate::models::{LineItem, NewQuote, Quote, QuoteStatus, is_assigned_quote_number};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Quote number '{0}' is reserved for assigned numbers")]
    ReservedQuoteNumber(String),

    #[error("Quote number '{0}' already exists")]
    DuplicateQuoteNumber(String),
}

/// Reject a caller-chosen quote number in the assigned `Q-nnn` range.
pub fn check_requested_number(quote: &NewQuote) -> Result<(), RepositoryError> {
    match quote.quote_number.as_deref() {
        Some(number) if is_assigned_quote_number(number) => {
            Err(RepositoryError::ReservedQuoteNumber(number.to_string()))
        }
        _ => Ok(()),
    }
}

/// Which quotes a list call returns. No statuses means every quote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteFilter {
    pub statuses: Vec<QuoteStatus>,
}

impl QuoteFilter {
    pub fn all() -> Self {
        Self::default()
    }

    /// Quotes that can still be edited: `DRAFT` and `NOT_SENT`.
    pub fn editable() -> Self {
        Self {
            statuses: QuoteStatus::all()
                .iter()
                .copied()
                .filter(QuoteStatus::is_editable)
                .collect(),
        }
    }

    pub fn with_statuses(statuses: impl IntoIterator<Item = QuoteStatus>) -> Self {
        Self {
            statuses: statuses.into_iter().collect(),
        }
    }

    pub fn matches(
        &self,
        quote: &Quote,
    ) -> bool {
        self.statuses.is_empty() || self.statuses.contains(&quote.status)
    }
}

/// Storage for quotes.
///
/// Lists are ordered newest first: by `created_at` descending, then by id
/// descending.
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn list(
        &self,
        filter: &QuoteFilter,
    ) -> Result<Vec<Quote>, RepositoryError>;

    async fn get(&self, id: i64) -> Result<Quote, RepositoryError>;

    /// Store a new quote. Without a requested number one is assigned as
    /// `Q-nnn` from the new id; requested numbers in that range are refused
    /// with [`RepositoryError::ReservedQuoteNumber`].
    async fn create(&self, quote: NewQuote) -> Result<Quote, RepositoryError>;

    async fn update(&self, quote: &Quote) -> Result<(), RepositoryError>;

    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;

    /// Line items stored with a quote, in their original order.
    async fn list_items(
        &self,
        quote_id: i64,
    ) -> Result<Vec<LineItem>, RepositoryError>;
}
