//! Section progress for the draft form.
//!
//! Two rules are in use and they are applied per section:
//!
//! * **strict** ([`section_completeness`]): every field must hold
//!   non-whitespace text. Customer and ETC information use this.
//! * **loose** ([`loose_section_completeness`]): a single filled field is
//!   enough. Job details and project dates use this.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionProgress {
    pub filled: usize,
    pub total: usize,
    pub is_complete: bool,
}

/// Progress of every section of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftProgress {
    pub customer: SectionProgress,
    pub etc: SectionProgress,
    pub job_details: bool,
    pub project_details: bool,
}

impl DraftProgress {
    /// Number of sections currently considered complete, out of four.
    pub fn completed_sections(&self) -> usize {
        [
            self.customer.is_complete,
            self.etc.is_complete,
            self.job_details,
            self.project_details,
        ]
        .into_iter()
        .filter(|done| *done)
        .count()
    }
}

/// Strict rule: complete only when all fields are non-empty after trimming.
pub fn section_completeness(fields: &[&str]) -> SectionProgress {
    let filled = fields.iter().filter(|f| !f.trim().is_empty()).count();
    let total = fields.len();

    SectionProgress {
        filled,
        total,
        is_complete: filled == total,
    }
}

/// Loose rule: complete when any field is non-empty.
///
/// Fields are not trimmed here, so a whitespace-only value counts as filled.
pub fn loose_section_completeness(fields: &[&str]) -> bool {
    fields.iter().any(|f| !f.is_empty())
}
