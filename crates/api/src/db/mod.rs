//! Persistence for the inventory service.
//!
//! # Database
//!
//! Everything lives in the `stockroom` schema:
//!
//! - `users` - Accounts that can obtain tokens
//! - `items` - Inventory records (unique `name`)
//! - `revoked_tokens` - Blacklisted refresh-token IDs until they expire
//!
//! Handlers never touch a pool directly. They go through the store traits in
//! [`store`], which have a `PostgreSQL` implementation for production and an
//! in-memory one for tests and local runs.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p stockroom-cli -- migrate
//! ```

pub mod items;
pub mod memory;
pub mod revoked_tokens;
pub mod store;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use items::PgItemRepository;
pub use memory::{MemoryCredentialStore, MemoryItemStore, MemoryTokenBlacklist};
pub use revoked_tokens::PgRevokedTokenRepository;
pub use store::{CredentialStore, ItemStore, TokenBlacklist};
pub use users::PgUserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation. Carries the offending field name.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Turn a unique violation into [`RepositoryError::Conflict`] naming `field`.
pub(crate) fn conflict_on_unique(
    err: sqlx::Error,
    field: impl FnOnce(&str) -> &'static str,
) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        let constraint = db_err.constraint().unwrap_or_default();
        return RepositoryError::Conflict(field(constraint).to_owned());
    }
    RepositoryError::Database(err)
}
