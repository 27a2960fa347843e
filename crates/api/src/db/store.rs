//! Store contracts the services depend on.
//!
//! Each trait is object-safe so the application state can hold
//! `Arc<dyn Trait>` and tests can swap in the in-memory implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stockroom_core::{Email, ItemId, UserId};

use super::RepositoryError;
use crate::models::item::{Item, ItemFields};
use crate::models::user::{NewUser, User};

/// User accounts and their password hashes.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a user by ID.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Look up a user and their password hash by exact (normalized) email.
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Look up a user and their password hash by exact username.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Insert a new user.
    ///
    /// Returns `RepositoryError::Conflict("username" | "email")` when either
    /// is already taken.
    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError>;
}

/// The inventory table. Source of truth for items.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// All items, oldest first.
    async fn list(&self) -> Result<Vec<Item>, RepositoryError>;

    async fn get(&self, id: ItemId) -> Result<Option<Item>, RepositoryError>;

    async fn exists_by_name(&self, name: &str) -> Result<bool, RepositoryError>;

    /// Insert a new item. `Conflict("name")` on a duplicate name.
    async fn create(&self, fields: &ItemFields) -> Result<Item, RepositoryError>;

    /// Replace every writable field. `NotFound` if the id is absent,
    /// `Conflict("name")` if renamed onto another item.
    async fn update(&self, id: ItemId, fields: &ItemFields) -> Result<Item, RepositoryError>;

    /// `NotFound` if the id is absent.
    async fn delete(&self, id: ItemId) -> Result<(), RepositoryError>;

    /// Cheap round trip used by the readiness check.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Revoked refresh-token IDs.
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Mark a token ID as revoked until `expires_at`. Idempotent.
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), RepositoryError>;

    async fn is_revoked(&self, jti: &str) -> Result<bool, RepositoryError>;

    /// Drop records whose token has expired anyway. Returns how many went.
    async fn purge_expired(&self) -> Result<u64, RepositoryError>;
}
