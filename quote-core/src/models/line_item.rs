use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a line item within a single draft.
///
/// Allocated by [`crate::QuoteDraft`] from a counter that only moves forward,
/// so an id is never handed out twice for the same draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(pub u64);

impl fmt::Display for LineItemId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnitOfMeasure {
    #[default]
    Ea,
    Ft,
    In,
    Lb,
    Gal,
    Hr,
    Day,
}

impl UnitOfMeasure {
    pub fn all() -> &'static [UnitOfMeasure] {
        &[
            Self::Ea,
            Self::Ft,
            Self::In,
            Self::Lb,
            Self::Gal,
            Self::Hr,
            Self::Day,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ea => "EA",
            Self::Ft => "FT",
            Self::In => "IN",
            Self::Lb => "LB",
            Self::Gal => "GAL",
            Self::Hr => "HR",
            Self::Day => "DAY",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ea => "Each",
            Self::Ft => "Feet",
            Self::In => "Inches",
            Self::Lb => "Pounds",
            Self::Gal => "Gallons",
            Self::Hr => "Hours",
            Self::Day => "Days",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "EA" => Some(Self::Ea),
            "FT" => Some(Self::Ft),
            "IN" => Some(Self::In),
            "LB" => Some(Self::Lb),
            "GAL" => Some(Self::Gal),
            "HR" => Some(Self::Hr),
            "DAY" => Some(Self::Day),
            _ => None,
        }
    }
}

/// Errors reported by [`LineItem::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineItemError {
    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(u32),

    #[error("unit price must be non-negative, got {0}")]
    NegativeUnitPrice(Decimal),

    #[error("discount must be non-negative, got {0}")]
    NegativeDiscount(Decimal),
}

/// One product or service entry on a quote.
///
/// `discount` is an absolute currency amount taken off the line, not a
/// percentage. It is allowed to exceed `quantity * unit_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub sku: String,
    pub description: String,
    #[serde(default)]
    pub unit_of_measure: UnitOfMeasure,
    pub quantity: u32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub apply_tax: bool,
}

impl LineItem {
    pub fn validate(&self) -> Result<(), LineItemError> {
        if self.quantity < 1 {
            return Err(LineItemError::InvalidQuantity(self.quantity));
        }
        if self.unit_price < Decimal::ZERO {
            return Err(LineItemError::NegativeUnitPrice(self.unit_price));
        }
        if self.discount < Decimal::ZERO {
            return Err(LineItemError::NegativeDiscount(self.discount));
        }
        Ok(())
    }

    /// Apply every field that is set in `patch`.
    pub fn apply(
        &mut self,
        patch: &LineItemPatch,
    ) {
        if let Some(unit) = patch.unit_of_measure {
            self.unit_of_measure = unit;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(unit_price) = patch.unit_price {
            self.unit_price = unit_price;
        }
        if let Some(discount) = patch.discount {
            self.discount = discount;
        }
        if let Some(apply_tax) = patch.apply_tax {
            self.apply_tax = apply_tax;
        }
    }
}

/// Line item fields without an id; the draft assigns one on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub sku: String,
    pub description: String,
    #[serde(default)]
    pub unit_of_measure: UnitOfMeasure,
    pub quantity: u32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub apply_tax: bool,
}

impl NewLineItem {
    pub fn with_id(
        self,
        id: LineItemId,
    ) -> LineItem {
        LineItem {
            id,
            sku: self.sku,
            description: self.description,
            unit_of_measure: self.unit_of_measure,
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount: self.discount,
            apply_tax: self.apply_tax,
        }
    }
}

/// Partial update of a line item. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineItemPatch {
    pub unit_of_measure: Option<UnitOfMeasure>,
    pub quantity: Option<u32>,
    pub unit_price: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub apply_tax: Option<bool>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn item() -> LineItem {
        LineItem {
            id: LineItemId(1),
            sku: "SKU001".to_string(),
            description: "Product A".to_string(),
            unit_of_measure: UnitOfMeasure::Ea,
            quantity: 2,
            unit_price: dec!(100),
            discount: dec!(0),
            apply_tax: true,
        }
    }

    #[test]
    fn unit_of_measure_codes_parse_back() {
        for unit in UnitOfMeasure::all() {
            assert_eq!(UnitOfMeasure::parse(unit.as_str()), Some(*unit));
        }
        assert_eq!(UnitOfMeasure::parse("ea"), None);
    }

    #[test]
    fn unit_of_measure_serializes_as_code() {
        let json = serde_json::to_string(&UnitOfMeasure::Gal).unwrap();

        assert_eq!(json, "\"GAL\"");
    }

    #[test]
    fn validate_accepts_well_formed_item() {
        assert_eq!(item().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_zero_quantity() {
        let mut it = item();
        it.quantity = 0;

        assert_eq!(it.validate(), Err(LineItemError::InvalidQuantity(0)));
    }

    #[test]
    fn validate_rejects_negative_price_and_discount() {
        let mut it = item();
        it.unit_price = dec!(-1);
        assert_eq!(
            it.validate(),
            Err(LineItemError::NegativeUnitPrice(dec!(-1)))
        );

        let mut it = item();
        it.discount = dec!(-0.01);
        assert_eq!(
            it.validate(),
            Err(LineItemError::NegativeDiscount(dec!(-0.01)))
        );
    }

    #[test]
    fn validate_allows_discount_above_line_amount() {
        let mut it = item();
        it.discount = dec!(1000);

        assert_eq!(it.validate(), Ok(()));
    }

    #[test]
    fn apply_only_touches_patched_fields() {
        let mut it = item();
        it.apply(&LineItemPatch {
            quantity: Some(5),
            discount: Some(dec!(10)),
            ..Default::default()
        });

        assert_eq!(it.quantity, 5);
        assert_eq!(it.discount, dec!(10));
        assert_eq!(it.unit_price, dec!(100));
        assert!(it.apply_tax);
    }
}
