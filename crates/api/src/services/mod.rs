//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, login, logout and session refresh
//! - `items` - Inventory CRUD with a cache-aside read path
//! - `tokens` - JWT issuance, verification and revocation

pub mod auth;
pub mod items;
pub mod tokens;

pub use auth::{AuthError, AuthService};
pub use items::{ItemError, ItemService};
pub use tokens::{Claims, TokenError, TokenPair, TokenService, TokenType};
