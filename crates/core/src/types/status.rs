//! Derived stock status.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::Quantity;

/// Whether an item can currently be picked. Computed from the quantity on
/// read and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockStatus {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

impl StockStatus {
    /// Status for a given quantity on hand.
    #[must_use]
    pub const fn for_quantity(quantity: Quantity) -> Self {
        if quantity.is_in_stock() {
            Self::InStock
        } else {
            Self::OutOfStock
        }
    }

    /// Human-readable label, as rendered in API responses.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InStock => "In Stock",
            Self::OutOfStock => "Out of Stock",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_from_quantity() {
        assert_eq!(
            StockStatus::for_quantity(Quantity::ZERO),
            StockStatus::OutOfStock
        );
        assert_eq!(
            StockStatus::for_quantity(Quantity::new(10).unwrap()),
            StockStatus::InStock
        );
    }

    #[test]
    fn test_serializes_as_label() {
        assert_eq!(
            serde_json::to_string(&StockStatus::OutOfStock).unwrap(),
            "\"Out of Stock\""
        );
        assert_eq!(StockStatus::InStock.to_string(), "In Stock");
    }
}
