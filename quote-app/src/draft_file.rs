//! Quote drafts written as TOML files.
//!
//! Items either reference a catalog product by id or spell out a custom
//! line:
//!
//! ```toml
//! quote_type = "to_project"
//! tax_rate_percent = "6"
//! apply_tax_all = false
//!
//! [customer]
//! name = "Keystone Paving"
//!
//! [etc]
//! poc = "Dana Whitfield"
//! email = "dana@example.com"
//! phone = "555-0100"
//!
//! [[items]]
//! product = "1"
//! quantity = 2
//! apply_tax = true
//!
//! [[items]]
//! sku = "HAUL-01"
//! description = "Haul-off"
//! unit_price = "85"
//! unit = "HR"
//! quantity = 3
//! discount = "15"
//! ```
//!
//! A file is replayed through a [`DraftSession`] the same way an operator
//! would build the quote: pick a product, configure it, add it, then edit
//! the added line for quantity and discount.

use std::path::Path;

use quote_core::{
    CustomerInfo, DraftSession, EtcInfo, JobDetails, LineItemPatch, NewLineItem, Product,
    ProjectDetails, QuoteDraft, QuoteType, SessionError, UnitOfMeasure,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DraftFileError {
    #[error("cannot read draft '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid draft file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("item {index}: {source}")]
    InvalidItem {
        index: usize,
        #[source]
        source: SessionError,
    },

    #[error("item {index}: needs either `product` or all of `sku`, `description`, `unit_price`")]
    IncompleteItem { index: usize },
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct ItemEntry {
    product: Option<String>,
    sku: Option<String>,
    description: Option<String>,
    unit_price: Option<Decimal>,
    #[serde(default)]
    unit: UnitOfMeasure,
    #[serde(default = "default_quantity")]
    quantity: u32,
    #[serde(default)]
    discount: Decimal,
    #[serde(default)]
    apply_tax: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DraftFile {
    quote_type: QuoteType,
    tax_rate_percent: Option<Decimal>,
    apply_tax_all: bool,
    customer: CustomerInfo,
    etc: EtcInfo,
    job_details: JobDetails,
    project_details: ProjectDetails,
    items: Vec<ItemEntry>,
}

impl DraftFile {
    pub fn from_toml_str(input: &str) -> Result<Self, DraftFileError> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, DraftFileError> {
        let contents = std::fs::read_to_string(path).map_err(|source| DraftFileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Build a session holding this draft.
    ///
    /// `default_tax_rate` applies when the file does not set
    /// `tax_rate_percent`. Item numbers in errors are 1-based.
    pub fn into_session(
        self,
        catalog: Vec<Product>,
        default_tax_rate: Decimal,
    ) -> Result<DraftSession, DraftFileError> {
        let mut draft = QuoteDraft::new();
        draft.quote_type = self.quote_type;
        draft.customer = self.customer;
        draft.etc = self.etc;
        draft.job_details = self.job_details;
        draft.project_details = self.project_details;

        let mut session = DraftSession::with_draft(draft, catalog);
        session.set_tax_rate(self.tax_rate_percent.unwrap_or(default_tax_rate));
        session.set_apply_tax_all(self.apply_tax_all);

        for (idx, entry) in self.items.into_iter().enumerate() {
            add_entry(&mut session, entry, idx + 1)?;
        }

        debug!(
            items = session.draft().items().len(),
            total = %session.totals().total,
            "draft file loaded"
        );
        Ok(session)
    }
}

fn add_entry(
    session: &mut DraftSession,
    entry: ItemEntry,
    index: usize,
) -> Result<(), DraftFileError> {
    let invalid = |source: SessionError| DraftFileError::InvalidItem { index, source };

    match entry.product {
        Some(product_id) => {
            session.select_product(&product_id).map_err(invalid)?;
            session.begin_add_item().map_err(invalid)?;
            session.set_item_unit(entry.unit);
            session.set_item_apply_tax(entry.apply_tax);
            let id = session.confirm_add_item().map_err(invalid)?;

            session.begin_edit(id).map_err(invalid)?;
            let edited = session.edit_item(&LineItemPatch {
                quantity: Some(entry.quantity),
                discount: Some(entry.discount),
                ..Default::default()
            });
            session.finish_edit();

            if let Err(e) = edited {
                // Leave no half-configured line behind.
                session.begin_delete(id);
                session.confirm_delete().map_err(invalid)?;
                return Err(invalid(e));
            }
            Ok(())
        }
        None => {
            let (Some(sku), Some(description), Some(unit_price)) =
                (entry.sku, entry.description, entry.unit_price)
            else {
                return Err(DraftFileError::IncompleteItem { index });
            };
            let apply_tax = entry.apply_tax || session.apply_tax_all();
            session
                .draft_mut()
                .add_item(NewLineItem {
                    sku,
                    description,
                    unit_of_measure: entry.unit,
                    quantity: entry.quantity,
                    unit_price,
                    discount: entry.discount,
                    apply_tax,
                })
                .map_err(|e| invalid(e.into()))?;
            Ok(())
        }
    }
}
