mod draft;
mod line_item;
mod product;
mod quote;

pub use draft::{
    CustomerInfo, DEFAULT_TAX_RATE_PERCENT, DraftError, EtcInfo, ItemConfig, JobDetails,
    ProjectDetails, QuoteDraft,
};
pub use line_item::{LineItem, LineItemError, LineItemId, LineItemPatch, NewLineItem, UnitOfMeasure};
pub use product::{Product, default_catalog, find_product};
pub use quote::{
    NewQuote, Quote, QuoteStatus, QuoteType, format_quote_number, is_assigned_quote_number,
};
