//! Item service error types.

use thiserror::Error;

use crate::cache::CacheError;
use crate::db::RepositoryError;
use crate::models::validation::FieldErrors;

/// Errors that can occur during item operations.
#[derive(Debug, Error)]
pub enum ItemError {
    /// No item has the requested ID.
    #[error("item not found")]
    NotFound,

    /// Another item already has this name.
    #[error("item already exists")]
    AlreadyExists,

    /// Submitted fields were rejected.
    #[error("invalid item: {0}")]
    Validation(FieldErrors),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),

    /// The write succeeded but the cached copy could not be dropped.
    #[error("cache invalidation failed: {0}")]
    Cache(#[from] CacheError),
}

impl From<RepositoryError> for ItemError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(_) => Self::AlreadyExists,
            other => Self::Repository(other),
        }
    }
}
