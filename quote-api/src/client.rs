use quote_core::{Quote, QuoteStatus};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::wire::{QuoteListResponse, decode_entry};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded with {0}")]
    Status(StatusCode),

    #[error("server reported an unsuccessful response")]
    Unsuccessful,
}

/// Read-only client for `GET {base_url}/api/quotes`.
#[derive(Debug, Clone)]
pub struct QuoteApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl QuoteApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch quotes with any of the given statuses.
    ///
    /// Statuses are sent as one comma-separated `status` parameter. An entry
    /// that cannot be decoded (bad id or date, unknown type or status) is
    /// skipped with a warning; the rest of the list is kept.
    pub async fn list_quotes(
        &self,
        statuses: &[QuoteStatus],
    ) -> Result<Vec<Quote>, ApiError> {
        let url = format!("{}/api/quotes", self.base_url);
        let status_param = statuses
            .iter()
            .map(QuoteStatus::as_str)
            .collect::<Vec<_>>()
            .join(",");
        debug!(%url, status = %status_param, "fetching quotes");

        let mut request = self.client.get(&url);
        if !status_param.is_empty() {
            request = request.query(&[("status", status_param.as_str())]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        let body: QuoteListResponse = response.json().await?;
        if !body.success {
            return Err(ApiError::Unsuccessful);
        }

        let quotes = body
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| {
                let id = entry.get("id").cloned().unwrap_or_default();
                decode_entry(entry)
                    .inspect_err(|reason| warn!(%id, %reason, "skipping quote"))
                    .ok()
            })
            .collect();

        Ok(quotes)
    }

    /// DRAFT and NOT_SENT quotes, or an empty list when the fetch fails.
    pub async fn editable_quotes(&self) -> Vec<Quote> {
        match self
            .list_quotes(&[QuoteStatus::Draft, QuoteStatus::NotSent])
            .await
        {
            Ok(quotes) => quotes,
            Err(e) => {
                error!(error = %e, "Error fetching quotes");
                Vec::new()
            }
        }
    }
}
