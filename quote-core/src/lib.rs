pub mod calculations;
pub mod db;
pub mod models;
pub mod session;

pub use calculations::{QuoteTotals, SubmissionError};
pub use db::repository::{QuoteFilter, QuoteRepository, RepositoryError};
pub use models::*;
pub use session::{DraftSession, Section, SessionError};
