use chrono::{DateTime, NaiveDate};
use quote_core::{Quote, QuoteStatus, QuoteType};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// Envelope returned by `GET /api/quotes`.
///
/// Entries stay undecoded so that one malformed quote does not sink the
/// whole list; see [`decode_entry`].
#[derive(Debug, Deserialize)]
pub(crate) struct QuoteListResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Vec<serde_json::Value>>,
}

/// A quote as the service serializes it.
#[derive(Debug, Deserialize)]
pub(crate) struct WireQuote {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub quote_number: String,
    #[serde(alias = "quote_type")]
    pub type_quote: String,
    pub status: String,
    pub customer_name: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub date_sent: Option<NaiveDate>,
    #[serde(deserialize_with = "deserialize_date")]
    pub created_at: NaiveDate,
    #[serde(default)]
    pub total: Decimal,
}

impl TryFrom<WireQuote> for Quote {
    type Error = String;

    fn try_from(wire: WireQuote) -> Result<Self, Self::Error> {
        let quote_type = QuoteType::parse(&wire.type_quote)
            .ok_or_else(|| format!("unknown quote type '{}'", wire.type_quote))?;
        let status = QuoteStatus::parse(&wire.status)
            .ok_or_else(|| format!("unknown status '{}'", wire.status))?;

        Ok(Quote {
            id: wire.id,
            quote_number: wire.quote_number,
            customer_name: wire.customer_name,
            quote_type,
            status,
            date_sent: wire.date_sent,
            created_at: wire.created_at,
            total: wire.total,
        })
    }
}

/// Decode and convert a single list entry.
pub(crate) fn decode_entry(value: serde_json::Value) -> Result<Quote, String> {
    let wire: WireQuote = serde_json::from_value(value).map_err(|e| e.to_string())?;
    Quote::try_from(wire)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Number(i64),
    Text(String),
}

/// Ids arrive either as JSON numbers or as numeric strings.
fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match IdRepr::deserialize(deserializer)? {
        IdRepr::Number(n) => Ok(n),
        IdRepr::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid quote id '{}'", s))),
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.date_naive()))
        .map_err(|_| format!("invalid date '{}'", s))
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_date(s.trim()).map_err(serde::de::Error::custom)
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_date(s).map(Some).map_err(serde::de::Error::custom),
    }
}
