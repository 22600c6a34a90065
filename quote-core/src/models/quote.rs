use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::QuoteTotals;
use crate::models::LineItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteType {
    #[default]
    StraightSale,
    ToProject,
    EstimateBid,
}

impl QuoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StraightSale => "straight_sale",
            Self::ToProject => "to_project",
            Self::EstimateBid => "estimate_bid",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::StraightSale => "Straight Sale",
            Self::ToProject => "To Project",
            Self::EstimateBid => "Estimate/Bid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "straight_sale" => Some(Self::StraightSale),
            "to_project" => Some(Self::ToProject),
            "estimate_bid" => Some(Self::EstimateBid),
            _ => None,
        }
    }

    /// Whether the job and project blocks are relevant for this kind of quote.
    pub fn has_project_info(&self) -> bool {
        matches!(self, Self::ToProject | Self::EstimateBid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
    NotSent,
}

impl QuoteStatus {
    pub fn all() -> &'static [QuoteStatus] {
        &[
            Self::Draft,
            Self::Sent,
            Self::Accepted,
            Self::Rejected,
            Self::NotSent,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Sent => "SENT",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::NotSent => "NOT_SENT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(Self::Draft),
            "SENT" => Some(Self::Sent),
            "ACCEPTED" => Some(Self::Accepted),
            "REJECTED" => Some(Self::Rejected),
            "NOT_SENT" => Some(Self::NotSent),
            _ => None,
        }
    }

    /// Quotes that have not gone out yet and may still be edited.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::NotSent)
    }
}

/// A stored quote as shown in lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: i64,
    pub quote_number: String,
    pub customer_name: String,
    pub quote_type: QuoteType,
    pub status: QuoteStatus,
    pub date_sent: Option<NaiveDate>,
    pub created_at: NaiveDate,
    #[serde(default)]
    pub total: Decimal,
}

/// For creating new quotes (no id or creation date).
///
/// When `quote_number` is `None` the repository assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuote {
    pub quote_number: Option<String>,
    pub customer_name: String,
    pub quote_type: QuoteType,
    pub status: QuoteStatus,
    pub tax_rate_percent: Decimal,
    pub items: Vec<LineItem>,
    pub totals: QuoteTotals,
}

/// Quote number used when the caller does not provide one.
pub fn format_quote_number(id: i64) -> String {
    format!("Q-{:03}", id)
}

/// Whether `number` has the `Q-<digits>` shape of an assigned number.
///
/// Repositories refuse such numbers from callers so that a later assigned
/// number can never collide with them.
pub fn is_assigned_quote_number(number: &str) -> bool {
    number
        .strip_prefix("Q-")
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn status_wire_codes() {
        assert_eq!(
            serde_json::to_string(&QuoteStatus::NotSent).unwrap(),
            "\"NOT_SENT\""
        );
        for status in QuoteStatus::all() {
            assert_eq!(QuoteStatus::parse(status.as_str()), Some(*status));
        }
    }

    #[test]
    fn only_draft_and_not_sent_are_editable() {
        let editable: Vec<_> = QuoteStatus::all()
            .iter()
            .filter(|s| s.is_editable())
            .copied()
            .collect();

        assert_eq!(editable, vec![QuoteStatus::Draft, QuoteStatus::NotSent]);
    }

    #[test]
    fn quote_type_labels_and_codes() {
        assert_eq!(QuoteType::EstimateBid.label(), "Estimate/Bid");
        assert_eq!(
            serde_json::to_string(&QuoteType::ToProject).unwrap(),
            "\"to_project\""
        );
        assert_eq!(QuoteType::parse("bogus"), None);
        assert!(!QuoteType::StraightSale.has_project_info());
        assert!(QuoteType::EstimateBid.has_project_info());
    }

    #[test]
    fn quote_number_is_zero_padded() {
        assert_eq!(format_quote_number(7), "Q-007");
        assert_eq!(format_quote_number(1234), "Q-1234");
    }

    #[test]
    fn assigned_number_shape() {
        assert!(is_assigned_quote_number("Q-007"));
        assert!(is_assigned_quote_number(&format_quote_number(1234)));
        assert!(!is_assigned_quote_number("Q-"));
        assert!(!is_assigned_quote_number("Q-7A"));
        assert!(!is_assigned_quote_number("EST-007"));
        assert!(!is_assigned_quote_number("q-007"));
    }
}
