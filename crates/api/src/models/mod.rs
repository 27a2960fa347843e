//! Domain models for the inventory service.
//!
//! These types represent validated domain objects, separate from database
//! row types and from raw request bodies.

pub mod item;
pub mod session;
pub mod user;
pub mod validation;

pub use item::{Item, ItemFields, ItemInput, ItemView};
pub use session::CurrentUser;
pub use user::{LoginInput, LogoutInput, NewUser, RefreshInput, RegisterInput, User};
pub use validation::FieldErrors;
