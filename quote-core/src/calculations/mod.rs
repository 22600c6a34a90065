//! Quote pricing and validation.
//!
//! Everything in here is a pure function over its inputs. Totals and section
//! progress are recomputed from scratch whenever a draft changes.

pub mod common;
pub mod completeness;
pub mod pricing;
pub mod submission;

pub use completeness::{
    DraftProgress, SectionProgress, loose_section_completeness, section_completeness,
};
pub use pricing::{QuoteTotals, compute_totals, extended_price};
pub use submission::{SubmissionError, validate_submission};
