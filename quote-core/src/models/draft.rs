//! The quote being assembled before submission.
//!
//! A [`QuoteDraft`] is never stored as-is. Once it passes the submission
//! gate it is turned into a [`NewQuote`](crate::NewQuote) and handed to a
//! repository.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::calculations::{
    DraftProgress, QuoteTotals, SubmissionError, compute_totals, loose_section_completeness,
    section_completeness, validate_submission,
};
use crate::models::{
    LineItem, LineItemError, LineItemId, LineItemPatch, NewLineItem, NewQuote, Product,
    QuoteStatus, QuoteType, UnitOfMeasure,
};

/// Tax rate a fresh draft starts with, in percent.
pub const DEFAULT_TAX_RATE_PERCENT: Decimal = Decimal::from_parts(6, 0, 0, false, 0);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("no line item with id {0}")]
    UnknownItem(LineItemId),

    #[error("invalid line item: {0}")]
    InvalidItem(#[from] LineItemError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerInfo {
    pub name: String,
    pub poc: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub job_number: String,
    pub purchase_order: String,
}

impl CustomerInfo {
    pub fn fields(&self) -> [&str; 7] {
        [
            &self.name,
            &self.poc,
            &self.phone,
            &self.email,
            &self.address,
            &self.job_number,
            &self.purchase_order,
        ]
    }
}

/// Internal point-of-contact block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtcInfo {
    pub poc: String,
    pub email: String,
    pub phone: String,
    pub branch: String,
    pub job_number: String,
}

impl EtcInfo {
    pub fn fields(&self) -> [&str; 5] {
        [
            &self.poc,
            &self.email,
            &self.phone,
            &self.branch,
            &self.job_number,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobDetails {
    pub township: String,
    pub county: String,
    pub sr_route: String,
    pub job_address: String,
    pub ecms_number: String,
}

impl JobDetails {
    pub fn fields(&self) -> [&str; 5] {
        [
            &self.township,
            &self.county,
            &self.sr_route,
            &self.job_address,
            &self.ecms_number,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDetails {
    pub bid_date: String,
    pub start_date: String,
    pub end_date: String,
    pub notes: String,
}

impl ProjectDetails {
    /// The dated fields. Notes never count towards completeness.
    pub fn date_fields(&self) -> [&str; 3] {
        [&self.bid_date, &self.start_date, &self.end_date]
    }
}

/// How a product is turned into a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemConfig {
    pub unit_of_measure: UnitOfMeasure,
    pub quantity: u32,
    pub apply_tax: bool,
}

impl Default for ItemConfig {
    fn default() -> Self {
        Self {
            unit_of_measure: UnitOfMeasure::Ea,
            quantity: 1,
            apply_tax: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteDraft {
    pub quote_type: QuoteType,
    pub customer: CustomerInfo,
    pub etc: EtcInfo,
    pub job_details: JobDetails,
    pub project_details: ProjectDetails,
    pub tax_rate_percent: Decimal,
    items: Vec<LineItem>,
    next_item_id: u64,
}

impl Default for QuoteDraft {
    fn default() -> Self {
        Self {
            quote_type: QuoteType::default(),
            customer: CustomerInfo::default(),
            etc: EtcInfo::default(),
            job_details: JobDetails::default(),
            project_details: ProjectDetails::default(),
            tax_rate_percent: DEFAULT_TAX_RATE_PERCENT,
            items: Vec::new(),
            next_item_id: 1,
        }
    }
}

impl QuoteDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn item(
        &self,
        id: LineItemId,
    ) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn allocate_id(&mut self) -> LineItemId {
        // Deserialized drafts may carry items whose ids are ahead of the counter.
        let floor = self.items.iter().map(|i| i.id.0 + 1).max().unwrap_or(1);
        let id = LineItemId(self.next_item_id.max(floor));
        self.next_item_id = id.0 + 1;
        id
    }

    /// Append a line item and return its freshly allocated id.
    pub fn add_item(
        &mut self,
        item: NewLineItem,
    ) -> Result<LineItemId, DraftError> {
        let id = self.allocate_id();
        let item = item.with_id(id);
        item.validate()?;
        debug!(%id, sku = %item.sku, "line item added");
        self.items.push(item);
        Ok(id)
    }

    /// Append a line item built from a catalog product.
    pub fn add_product(
        &mut self,
        product: &Product,
        config: &ItemConfig,
    ) -> Result<LineItemId, DraftError> {
        self.add_item(NewLineItem {
            sku: product.sku().to_string(),
            description: product.description().to_string(),
            unit_of_measure: config.unit_of_measure,
            quantity: config.quantity,
            unit_price: product.price,
            discount: Decimal::ZERO,
            apply_tax: config.apply_tax,
        })
    }

    /// Change an item in place. The item is left untouched if the patched
    /// version would be invalid.
    pub fn update_item(
        &mut self,
        id: LineItemId,
        patch: &LineItemPatch,
    ) -> Result<(), DraftError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(DraftError::UnknownItem(id))?;

        let mut updated = item.clone();
        updated.apply(patch);
        updated.validate()?;
        *item = updated;
        Ok(())
    }

    /// Remove the item with `id`. Returns `false` when there was none.
    pub fn remove_item(
        &mut self,
        id: LineItemId,
    ) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Set the tax flag on every current item.
    pub fn set_apply_tax_all(
        &mut self,
        apply_tax: bool,
    ) {
        for item in &mut self.items {
            item.apply_tax = apply_tax;
        }
    }

    pub fn totals(&self) -> QuoteTotals {
        compute_totals(&self.items, self.tax_rate_percent)
    }

    pub fn progress(&self) -> DraftProgress {
        DraftProgress {
            customer: section_completeness(&self.customer.fields()),
            etc: section_completeness(&self.etc.fields()),
            job_details: loose_section_completeness(&self.job_details.fields()),
            project_details: loose_section_completeness(&self.project_details.date_fields()),
        }
    }

    /// Run the submission gate and build the quote to persist.
    pub fn to_new_quote(&self) -> Result<NewQuote, SubmissionError> {
        validate_submission(self)?;

        Ok(NewQuote {
            quote_number: None,
            customer_name: self.customer.name.clone(),
            quote_type: self.quote_type,
            status: QuoteStatus::Draft,
            tax_rate_percent: self.tax_rate_percent,
            items: self.items.clone(),
            totals: self.totals(),
        })
    }
}
