//! Revoked-token maintenance.
//!
//! Revoked refresh tokens are remembered until they would have expired on
//! their own; after that the record is dead weight.

use stockroom_api::db::{PgRevokedTokenRepository, RepositoryError, TokenBlacklist};

use super::{ConnectError, connect};

/// Errors that can occur while purging.
#[derive(Debug, thiserror::Error)]
pub enum TokensError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Delete expired revoked-token records, returning how many went.
pub async fn purge() -> Result<u64, TokensError> {
    let pool = connect().await?;
    let purged = PgRevokedTokenRepository::new(pool).purge_expired().await?;

    tracing::info!("Purged {} expired revoked tokens", purged);
    Ok(purged)
}
