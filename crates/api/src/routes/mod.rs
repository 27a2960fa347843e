//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                 - Welcome message
//! GET    /health           - Liveness check
//! GET    /health/ready     - Readiness check (store reachable)
//!
//! # Auth
//! POST   /auth/register    - Create an account
//! POST   /auth/login       - Exchange credentials for a token pair
//! POST   /auth/refresh     - Exchange a refresh token for an access token
//! POST   /auth/logout      - Revoke a refresh token (bearer)
//! GET    /auth/me          - Current account (bearer)
//!
//! # Items (bearer)
//! GET    /items            - List items
//! POST   /items            - Create an item
//! GET    /items/{id}       - Retrieve an item (cached)
//! PUT    /items/{id}       - Replace an item
//! PATCH  /items/{id}       - Update some fields of an item
//! DELETE /items/{id}       - Delete an item
//! ```
//!
//! Trailing slashes are stripped before routing, so `/items/` matches too.

pub mod auth;
pub mod health;
pub mod home;
pub mod items;

use axum::{
    Router,
    routing::{get, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the item routes router.
pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(items::index).post(items::create))
        .route(
            "/{id}",
            get(items::show)
                .put(items::update)
                .patch(items::partial_update)
                .delete(items::destroy),
        )
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/auth", auth_routes())
        .nest("/items", item_routes())
        .fallback(|| async { AppError::NotFound })
}
