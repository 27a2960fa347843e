//! Authentication extractor.
//!
//! Provides the extractor that requires a bearer access token in route
//! handlers.

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use tracing::Span;

use crate::error::{AppError, set_sentry_user};
use crate::models::session::CurrentUser;
use crate::services::auth::AuthError;
use crate::state::AppState;

const MISSING_CREDENTIALS: &str = "Authentication credentials were not provided.";
const INVALID_TOKEN: &str = "Given token not valid for any token type";

/// Extractor that requires a valid `Authorization: Bearer <access token>`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AppError::Unauthorized(MISSING_CREDENTIALS))?;

        let user = match state.auth().authenticate(token).await {
            Ok(user) => user,
            Err(AuthError::Token(e)) if !e.is_internal() => {
                tracing::debug!(error = %e, "Rejected access token");
                return Err(AppError::Unauthorized(INVALID_TOKEN));
            }
            Err(e) => return Err(e.into()),
        };

        Span::current().record("user_id", user.id.into_inner());
        set_sentry_user(&user.id, &user.username);

        Ok(Self(user))
    }
}

/// The token from a `Bearer` authorization value.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic dXNlcjpwdw=="), None);
        assert_eq!(bearer_token("abc"), None);
    }
}
