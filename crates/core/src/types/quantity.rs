//! Stock quantity type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// The count is below zero.
    #[error("quantity must not be negative")]
    Negative,
    /// The count does not fit the storage column.
    #[error("quantity must be at most {max}")]
    TooLarge {
        /// Largest storable quantity.
        max: i32,
    },
}

/// Units on hand. Never negative.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    /// An empty shelf.
    pub const ZERO: Self = Self(0);

    /// Validate a count.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Negative`] below zero and
    /// [`QuantityError::TooLarge`] above `i32::MAX`.
    pub fn new(count: i64) -> Result<Self, QuantityError> {
        if count < 0 {
            return Err(QuantityError::Negative);
        }
        i32::try_from(count)
            .map(Self)
            .map_err(|_| QuantityError::TooLarge { max: i32::MAX })
    }

    /// Returns the raw count.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Whether any units are on hand.
    #[must_use]
    pub const fn is_in_stock(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_zero_and_positive() {
        assert_eq!(Quantity::new(0).unwrap(), Quantity::ZERO);
        assert_eq!(Quantity::new(10).unwrap().get(), 10);
        assert!(!Quantity::ZERO.is_in_stock());
        assert!(Quantity::new(1).unwrap().is_in_stock());
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(Quantity::new(-1), Err(QuantityError::Negative));
        assert_eq!(
            Quantity::new(i64::from(i32::MAX) + 1),
            Err(QuantityError::TooLarge { max: i32::MAX })
        );
    }

    #[test]
    fn test_deserialize_validates() {
        assert_eq!(serde_json::from_str::<Quantity>("7").unwrap().get(), 7);
        assert!(serde_json::from_str::<Quantity>("-3").is_err());
    }
}
