pub mod factory;
pub mod memory;
pub mod repository;

pub use factory::{DbConfig, RepositoryFactory, RepositoryRegistry};
pub use memory::{InMemoryQuoteRepository, InMemoryRepositoryFactory, sample_quotes};
pub use repository::{QuoteFilter, QuoteRepository, RepositoryError, check_requested_number};
