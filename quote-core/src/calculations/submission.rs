//! The gate a draft must pass before it becomes a quote.
//!
//! Checks run in a fixed order and the first failure is returned:
//!
//! 1. customer name present
//! 2. ETC point of contact, email and phone present
//! 3. at least one line item
//!
//! Only presence is checked. Email and phone formats are not looked at.

use thiserror::Error;
use tracing::warn;

use crate::models::QuoteDraft;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Customer name is required")]
    MissingCustomerName,

    #[error("All ETC Information fields are required (POC, Email, Phone)")]
    MissingEtcContact,

    #[error("Please add at least one item to the quote")]
    NoItems,
}

pub fn validate_submission(draft: &QuoteDraft) -> Result<(), SubmissionError> {
    let result = check(draft);
    if let Err(error) = &result {
        warn!(%error, "quote submission rejected");
    }
    result
}

fn check(draft: &QuoteDraft) -> Result<(), SubmissionError> {
    if draft.customer.name.is_empty() {
        return Err(SubmissionError::MissingCustomerName);
    }

    let etc = &draft.etc;
    if etc.poc.is_empty() || etc.email.is_empty() || etc.phone.is_empty() {
        return Err(SubmissionError::MissingEtcContact);
    }

    if draft.items().is_empty() {
        return Err(SubmissionError::NoItems);
    }

    Ok(())
}
