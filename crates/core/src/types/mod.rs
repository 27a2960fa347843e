//! Core types for Stockroom.
//!
//! Each type validates on construction, so holding one is proof the value
//! satisfies the domain rules.

pub mod email;
pub mod id;
pub mod price;
pub mod quantity;
pub mod status;
pub mod username;

pub use email::{Email, EmailError};
pub use id::{ItemId, UserId};
pub use price::{Price, PriceError};
pub use quantity::{Quantity, QuantityError};
pub use status::StockStatus;
pub use username::{Username, UsernameError};
