//! Type-safe unit price using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price must not be negative")]
    Negative,
    /// The amount has more fractional digits than the column stores.
    #[error("price must have at most {max} decimal places")]
    TooManyDecimalPlaces {
        /// Maximum number of decimal places.
        max: u32,
    },
    /// The integer part is wider than the column stores.
    #[error("price must have at most {max} digits before the decimal point")]
    TooManyWholeDigits {
        /// Maximum number of digits before the decimal point.
        max: u32,
    },
}

/// A non-negative unit price, stored as `NUMERIC(10, 2)`.
///
/// The amount is always rescaled to two decimal places, so `100`, `100.0`
/// and `"100.00"` all produce the same value and serialize as `"100.00"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Number of decimal places kept.
    pub const DECIMAL_PLACES: u32 = 2;
    /// Total significant digits the column holds.
    pub const MAX_DIGITS: u32 = 10;

    /// Validate and normalize a price.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if the amount is negative or does not fit
    /// `NUMERIC(10, 2)`.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        if amount.normalize().scale() > Self::DECIMAL_PLACES {
            return Err(PriceError::TooManyDecimalPlaces {
                max: Self::DECIMAL_PLACES,
            });
        }

        let whole_digits = Self::MAX_DIGITS - Self::DECIMAL_PLACES;
        if amount.trunc() >= Decimal::from(10_i64.pow(whole_digits)) {
            return Err(PriceError::TooManyWholeDigits { max: whole_digits });
        }

        let mut amount = amount.abs();
        amount.rescale(Self::DECIMAL_PLACES);
        Ok(Self(amount))
    }

    /// Returns the amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}
