//! Inventory item types.
//!
//! - [`Item`] is what the store holds.
//! - [`ItemFields`] is a validated set of writable fields.
//! - [`ItemInput`] is a raw request body, checked field by field.
//! - [`ItemView`] is the public representation, and what the cache holds.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use stockroom_core::{ItemId, Price, PriceError, Quantity, QuantityError, StockStatus};

use super::validation::{FieldErrors, NOT_A_STRING, REQUIRED};

/// Maximum length of an item name.
pub const MAX_NAME_LENGTH: usize = 255;

/// A stored inventory item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub quantity: Quantity,
    pub price: Price,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    #[must_use]
    pub const fn stock_status(&self) -> StockStatus {
        StockStatus::for_quantity(self.quantity)
    }
}

/// Writable item fields, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFields {
    pub name: String,
    pub description: String,
    pub quantity: Quantity,
    pub price: Price,
}

/// Public representation of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemView {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub quantity: Quantity,
    pub price: Price,
    pub stock_status: StockStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Item> for ItemView {
    fn from(item: Item) -> Self {
        Self {
            stock_status: item.stock_status(),
            id: item.id,
            name: item.name,
            description: item.description,
            quantity: item.quantity,
            price: item.price,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// Raw body of an item create or update.
///
/// Fields stay untyped so that one bad field yields a message for that field
/// instead of rejecting the whole body. Unknown keys (such as a client
/// echoing back `stock_status`) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemInput {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub quantity: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
}

impl ItemInput {
    /// The name as sent, trimmed, if it is a string at all.
    #[must_use]
    pub fn name_hint(&self) -> Option<&str> {
        self.name.as_ref().and_then(Value::as_str).map(str::trim)
    }

    /// Validate a full set of fields (create, `PUT`).
    ///
    /// # Errors
    ///
    /// Returns the field errors if any required field is missing or invalid.
    pub fn validate(&self) -> Result<ItemFields, FieldErrors> {
        self.validate_against(None)
    }

    /// Validate a partial set of fields (`PATCH`). Absent fields keep the
    /// values of `current`.
    ///
    /// # Errors
    ///
    /// Returns the field errors if any supplied field is invalid.
    pub fn validate_partial(&self, current: &Item) -> Result<ItemFields, FieldErrors> {
        self.validate_against(Some(current))
    }

    fn validate_against(&self, current: Option<&Item>) -> Result<ItemFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = match (&self.name, current) {
            (Some(value), _) => check(&mut errors, "name", parse_name(value)),
            (None, Some(item)) => Some(item.name.clone()),
            (None, None) => check(&mut errors, "name", Err(REQUIRED.to_owned())),
        };

        let description = match (&self.description, current) {
            (Some(value), _) => check(&mut errors, "description", parse_description(value)),
            (None, Some(item)) => Some(item.description.clone()),
            (None, None) => Some(String::new()),
        };

        let quantity = match (&self.quantity, current) {
            (Some(value), _) => check(&mut errors, "quantity", parse_quantity(value)),
            (None, Some(item)) => Some(item.quantity),
            (None, None) => check(&mut errors, "quantity", Err(REQUIRED.to_owned())),
        };

        let price = match (&self.price, current) {
            (Some(value), _) => check(&mut errors, "price", parse_price(value)),
            (None, Some(item)) => Some(item.price),
            (None, None) => check(&mut errors, "price", Err(REQUIRED.to_owned())),
        };

        match (name, description, quantity, price) {
            (Some(name), Some(description), Some(quantity), Some(price)) => Ok(ItemFields {
                name,
                description,
                quantity,
                price,
            }),
            _ => Err(errors),
        }
    }
}

fn check<T>(errors: &mut FieldErrors, field: &str, result: Result<T, String>) -> Option<T> {
    result.map_err(|message| errors.add(field, message)).ok()
}

fn parse_name(value: &Value) -> Result<String, String> {
    let name = match value {
        Value::Null => return Err(REQUIRED.to_owned()),
        Value::String(s) => s.trim(),
        _ => return Err(NOT_A_STRING.to_owned()),
    };
    if name.is_empty() {
        return Err("Item name cannot be empty.".to_owned());
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(format!(
            "Ensure this field has no more than {MAX_NAME_LENGTH} characters."
        ));
    }
    Ok(name.to_owned())
}

fn parse_description(value: &Value) -> Result<String, String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.trim().to_owned()),
        _ => Err(NOT_A_STRING.to_owned()),
    }
}

/// Integers, or strings holding one, like `"10"`. A zero fraction is
/// allowed, so `10.0` and `"10.0"` both mean 10.
fn parse_quantity(value: &Value) -> Result<Quantity, String> {
    const INVALID: &str = "A valid integer is required.";

    let count = match value {
        Value::Null => return Err(REQUIRED.to_owned()),
        Value::Number(n) => n.as_i64().or_else(|| parse_integral(&n.to_string())),
        Value::String(s) => parse_integral(s),
        _ => None,
    }
    .ok_or_else(|| INVALID.to_owned())?;

    Quantity::new(count).map_err(|e| match e {
        QuantityError::Negative => "Quantity must be a non-negative integer.".to_owned(),
        QuantityError::TooLarge { max } => {
            format!("Ensure this value is less than or equal to {max}.")
        }
    })
}

fn parse_integral(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let whole = match raw.split_once('.') {
        Some((whole, fraction)) if fraction.bytes().all(|b| b == b'0') => whole,
        Some(_) => return None,
        None => raw,
    };
    whole.parse().ok()
}

/// Numbers, or strings holding one, like `"100.00"`.
fn parse_price(value: &Value) -> Result<Price, String> {
    const INVALID: &str = "A valid number is required.";

    let raw = match value {
        Value::Null => return Err(REQUIRED.to_owned()),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_owned(),
        _ => return Err(INVALID.to_owned()),
    };
    let amount = Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| INVALID.to_owned())?;

    Price::new(amount).map_err(|e| match e {
        PriceError::Negative => "Price must be a non-negative float.".to_owned(),
        PriceError::TooManyDecimalPlaces { max } => {
            format!("Ensure that there are no more than {max} decimal places.")
        }
        PriceError::TooManyWholeDigits { max } => {
            format!("Ensure that there are no more than {max} digits before the decimal point.")
        }
    })
}
