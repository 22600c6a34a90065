use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalog entry a line item can be built from.
///
/// `name` follows the `"<description> - <sku>"` convention, e.g.
/// `"Product A - SKU001"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Decimal,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }

    /// Part of the name after `" - "`, or an empty string when there is none.
    pub fn sku(&self) -> &str {
        self.name.split(" - ").nth(1).unwrap_or("")
    }

    /// Part of the name before `" - "`.
    pub fn description(&self) -> &str {
        self.name.split(" - ").next().unwrap_or("")
    }
}

/// The built-in catalog used when no catalog file is configured.
pub fn default_catalog() -> Vec<Product> {
    vec![
        Product::new("1", "Product A - SKU001", Decimal::from(100)),
        Product::new("2", "Product B - SKU002", Decimal::from(250)),
        Product::new("3", "Product C - SKU003", Decimal::from(500)),
        Product::new("4", "Service X - SVC001", Decimal::from(150)),
        Product::new("5", "Service Y - SVC002", Decimal::from(200)),
    ]
}

pub fn find_product<'a>(
    catalog: &'a [Product],
    id: &str,
) -> Option<&'a Product> {
    catalog.iter().find(|p| p.id == id)
}
