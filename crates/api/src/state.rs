//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::cache::{ItemCache, MokaItemCache};
use crate::config::{AuthConfig, CacheConfig};
use crate::db::{
    CredentialStore, ItemStore, MemoryCredentialStore, MemoryItemStore, MemoryTokenBlacklist,
    PgItemRepository, PgRevokedTokenRepository, PgUserRepository, TokenBlacklist,
};
use crate::services::auth::AuthService;
use crate::services::items::ItemService;
use crate::services::tokens::TokenService;

/// The storage and cache backends the services are built on.
#[derive(Clone)]
pub struct Collaborators {
    pub users: Arc<dyn CredentialStore>,
    pub items: Arc<dyn ItemStore>,
    pub blacklist: Arc<dyn TokenBlacklist>,
    pub cache: Arc<dyn ItemCache>,
}

impl Collaborators {
    /// `PostgreSQL` repositories sharing `pool`, with a moka item cache.
    #[must_use]
    pub fn postgres(pool: &PgPool, cache: CacheConfig) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            items: Arc::new(PgItemRepository::new(pool.clone())),
            blacklist: Arc::new(PgRevokedTokenRepository::new(pool.clone())),
            cache: Arc::new(MokaItemCache::new(cache.capacity)),
        }
    }

    /// Process-local stores, for tests and local experiments.
    #[must_use]
    pub fn in_memory(cache: CacheConfig) -> Self {
        Self {
            users: Arc::new(MemoryCredentialStore::new()),
            items: Arc::new(MemoryItemStore::new()),
            blacklist: Arc::new(MemoryTokenBlacklist::new()),
            cache: Arc::new(MokaItemCache::new(cache.capacity)),
        }
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// services and the stores behind them.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    auth: AuthService,
    items: ItemService,
    item_store: Arc<dyn ItemStore>,
}

impl AppState {
    /// Wire the services onto `collaborators`.
    #[must_use]
    pub fn new(auth: &AuthConfig, item_ttl: Duration, collaborators: Collaborators) -> Self {
        let tokens = Arc::new(TokenService::new(
            &auth.jwt_secret,
            auth.access_token_ttl,
            auth.refresh_token_ttl,
            collaborators.blacklist,
        ));

        Self {
            inner: Arc::new(AppStateInner {
                auth: AuthService::new(collaborators.users, tokens),
                items: ItemService::new(
                    Arc::clone(&collaborators.items),
                    collaborators.cache,
                    item_ttl,
                ),
                item_store: collaborators.items,
            }),
        }
    }

    /// Get a reference to the authentication service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Get a reference to the item service.
    #[must_use]
    pub fn items(&self) -> &ItemService {
        &self.inner.items
    }

    /// Get the item store, used by the readiness check.
    #[must_use]
    pub fn item_store(&self) -> &dyn ItemStore {
        self.inner.item_store.as_ref()
    }
}
