//! CSV loader for the product catalog.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does not matter.
//!
//! | Column  | Type    | Notes                                               |
//! |---------|---------|-----------------------------------------------------|
//! | `id`    | string  | unique within the file                              |
//! | `name`  | string  | `"<description> - <SKU>"`; the SKU is optional      |
//! | `price` | decimal | unit price, must not be negative                    |
//!
//! ```csv
//! id,name,price
//! 1,Product A - SKU001,100
//! 4,Service X - SVC001,150.00
//! ```
use std::collections::HashSet;
use std::path::Path;

use quote_core::{Product, default_catalog};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    name: String,
    price: Decimal,
}

/// Errors that can occur while loading a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("cannot read catalog '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("duplicate product id '{id}' on row {row}")]
    DuplicateId { id: String, row: usize },

    #[error("negative price for product '{id}' on row {row}")]
    NegativePrice { id: String, row: usize },

    #[error("catalog is empty")]
    Empty,
}

/// Parse catalog CSV text. Products are returned in file order.
pub fn load_from_str(input: &str) -> Result<Vec<Product>, CatalogError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    let mut seen = HashSet::new();
    let mut products = Vec::new();

    for (idx, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        let row_number = idx + 1;

        if row.price.is_sign_negative() && !row.price.is_zero() {
            return Err(CatalogError::NegativePrice {
                id: row.id,
                row: row_number,
            });
        }
        if !seen.insert(row.id.clone()) {
            return Err(CatalogError::DuplicateId {
                id: row.id,
                row: row_number,
            });
        }

        products.push(Product::new(row.id, row.name, row.price));
    }

    if products.is_empty() {
        return Err(CatalogError::Empty);
    }
    Ok(products)
}

pub fn load_from_file(path: &Path) -> Result<Vec<Product>, CatalogError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let products = load_from_str(&contents)?;
    info!(path = %path.display(), count = products.len(), "catalog loaded");
    Ok(products)
}

/// The catalog at `path`, or the built-in one when no path is given.
pub fn load_or_default(path: Option<&Path>) -> Result<Vec<Product>, CatalogError> {
    match path {
        Some(path) => load_from_file(path),
        None => Ok(default_catalog()),
    }
}
