//! HTTP middleware for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Trailing-slash normalization
//! 2. Sentry layers (hub per request, transaction)
//! 3. `TraceLayer` (request span)
//! 4. Request ID (recorded into the span opened above)
//!
//! Authentication is an extractor rather than a layer, so public routes
//! don't pay for it.

pub mod auth;
pub mod request_id;

pub use auth::RequireAuth;
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
