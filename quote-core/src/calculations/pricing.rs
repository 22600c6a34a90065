//! Line item pricing and quote totals.
//!
//! | Amount         | Formula                                             |
//! |----------------|-----------------------------------------------------|
//! | extended price | `quantity × unit_price − discount`                  |
//! | subtotal       | sum of extended prices over all items               |
//! | tax amount     | sum of `extended × rate / 100` over taxable items   |
//! | total          | `subtotal + tax amount`                             |
//!
//! A discount larger than the line amount produces a negative extended
//! price. That value flows into the subtotal (and into the tax, for a
//! taxable line) unchanged.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use quote_core::calculations::compute_totals;
//! use quote_core::{LineItem, LineItemId, UnitOfMeasure};
//!
//! let items = vec![
//!     LineItem {
//!         id: LineItemId(1),
//!         sku: "SKU001".into(),
//!         description: "Product A".into(),
//!         unit_of_measure: UnitOfMeasure::Ea,
//!         quantity: 2,
//!         unit_price: dec!(100),
//!         discount: dec!(0),
//!         apply_tax: true,
//!     },
//!     LineItem {
//!         id: LineItemId(2),
//!         sku: "SKU002".into(),
//!         description: "Product B".into(),
//!         unit_of_measure: UnitOfMeasure::Ea,
//!         quantity: 1,
//!         unit_price: dec!(250),
//!         discount: dec!(50),
//!         apply_tax: false,
//!     },
//! ];
//!
//! let totals = compute_totals(&items, dec!(6));
//!
//! assert_eq!(totals.subtotal, dec!(400));
//! assert_eq!(totals.tax_amount, dec!(12));
//! assert_eq!(totals.total, dec!(412));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::LineItem;

/// Aggregate amounts for a set of line items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// `quantity × unit_price − discount`, without flooring at zero.
pub fn extended_price(item: &LineItem) -> Decimal {
    let line_amount = Decimal::from(item.quantity) * item.unit_price;
    line_amount - item.discount
}

/// Sum the items and apply `tax_rate_percent` to the taxable ones.
///
/// The rate is not range-checked; callers that accept user input are
/// expected to keep it within 0–100.
pub fn compute_totals(
    items: &[LineItem],
    tax_rate_percent: Decimal,
) -> QuoteTotals {
    let rate = tax_rate_percent / Decimal::ONE_HUNDRED;

    let (subtotal, tax_amount) = items.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(subtotal, tax_amount), item| {
            let extended = extended_price(item);
            let tax = if item.apply_tax {
                extended * rate
            } else {
                Decimal::ZERO
            };
            (subtotal + extended, tax_amount + tax)
        },
    );

    QuoteTotals {
        subtotal,
        tax_amount,
        total: subtotal + tax_amount,
    }
}
