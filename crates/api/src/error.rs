//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that renders the response envelope and
//! captures server errors to Sentry before responding to the client. All
//! route handlers return `Result<T, AppError>`.

use std::borrow::Cow;
use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

use crate::models::validation::FieldErrors;
use crate::response::Envelope;
use crate::services::auth::AuthError;
use crate::services::items::ItemError;

/// Item endpoint an error came from; picks the client-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAction {
    Retrieve,
    List,
    Create,
    Update,
    Delete,
}

impl ItemAction {
    /// Message sent with a successful response.
    #[must_use]
    pub const fn success(self) -> &'static str {
        match self {
            Self::Retrieve => "Item retrieved successfully.",
            Self::List => "Items retrieved successfully.",
            Self::Create => "Item created successfully.",
            Self::Update => "Item updated successfully.",
            Self::Delete => "Item deleted successfully.",
        }
    }

    /// Message sent when validation or a collaborator fails.
    #[must_use]
    pub const fn failure(self) -> &'static str {
        match self {
            Self::Retrieve => "Error retrieving item.",
            Self::List => "Error retrieving items.",
            Self::Create => "Failed to create item.",
            Self::Update => "Failed to update item.",
            Self::Delete => "Failed to delete item.",
        }
    }
}

impl fmt::Display for ItemAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Retrieve => "retrieve item",
            Self::List => "list items",
            Self::Create => "create item",
            Self::Update => "update item",
            Self::Delete => "delete item",
        })
    }
}

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication operation failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Item operation failed.
    #[error("{action} failed: {source}")]
    Item {
        action: ItemAction,
        #[source]
        source: ItemError,
    },

    /// Request lacks usable credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    /// Body was not valid JSON for the endpoint.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// No route matched.
    #[error("not found")]
    NotFound,
}

impl AppError {
    /// Wrap an item service error, tagging it with the endpoint's action.
    pub fn item(action: ItemAction) -> impl FnOnce(ItemError) -> Self {
        move |source| Self::Item { action, source }
    }

    fn parts(&self) -> (StatusCode, Cow<'static, str>, Option<Value>) {
        match self {
            Self::Auth(err) => auth_parts(err),
            Self::Item { action, source } => item_parts(*action, source),
            Self::Unauthorized(message) => (StatusCode::UNAUTHORIZED, (*message).into(), None),
            Self::InvalidBody(detail) => (
                StatusCode::BAD_REQUEST,
                "Invalid request body.".into(),
                field_errors(&FieldErrors::single("non_field_errors", detail.clone())),
            ),
            Self::NotFound => (StatusCode::NOT_FOUND, "Not found.".into(), None),
        }
    }
}

fn auth_parts(err: &AuthError) -> (StatusCode, Cow<'static, str>, Option<Value>) {
    match err {
        AuthError::Validation(errors) => (
            StatusCode::BAD_REQUEST,
            "User registration failed due to invalid data.".into(),
            field_errors(errors),
        ),
        AuthError::InvalidCredentials => {
            (StatusCode::UNAUTHORIZED, "Invalid credentials".into(), None)
        }
        AuthError::UserNotFound => (StatusCode::UNAUTHORIZED, "User not found".into(), None),
        AuthError::Token(e) if !e.is_internal() => {
            (StatusCode::UNAUTHORIZED, e.detail().into(), None)
        }
        AuthError::Logout(e) if !e.is_internal() => (
            StatusCode::BAD_REQUEST,
            "Logout failed.".into(),
            Some(json!({ "error": e.detail() })),
        ),
        AuthError::Token(_)
        | AuthError::Logout(_)
        | AuthError::Repository(_)
        | AuthError::PasswordHash => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".into(),
            None,
        ),
    }
}

fn item_parts(
    action: ItemAction,
    err: &ItemError,
) -> (StatusCode, Cow<'static, str>, Option<Value>) {
    match err {
        ItemError::NotFound => (StatusCode::NOT_FOUND, "Item not found.".into(), None),
        ItemError::AlreadyExists => (StatusCode::BAD_REQUEST, "Item already exists".into(), None),
        ItemError::Validation(errors) => (
            StatusCode::BAD_REQUEST,
            action.failure().into(),
            field_errors(errors),
        ),
        ItemError::Repository(_) | ItemError::Cache(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            action.failure().into(),
            None,
        ),
    }
}

fn field_errors(errors: &FieldErrors) -> Option<Value> {
    serde_json::to_value(errors).ok()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, data) = self.parts();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = Envelope {
            status: status.as_u16(),
            message: message.into_owned(),
            data,
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: Some(username.to_owned()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;
    use crate::cache::CacheError;
    use crate::db::RepositoryError;
    use crate::services::tokens::TokenError;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_item_validation_uses_action_message() {
        let errors = FieldErrors::single("name", "Item name cannot be empty.");
        let err = AppError::item(ItemAction::Create)(ItemError::Validation(errors));

        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
        assert_eq!(body["message"], "Failed to create item.");
        assert_eq!(body["data"]["name"][0], "Item name cannot be empty.");
    }

    #[tokio::test]
    async fn test_item_not_found_and_conflict() {
        let (status, body) = render(AppError::item(ItemAction::Delete)(ItemError::NotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Item not found.");
        assert!(body["data"].is_null());

        let (status, body) =
            render(AppError::item(ItemAction::Create)(ItemError::AlreadyExists)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Item already exists");
    }

    #[tokio::test]
    async fn test_internal_item_errors_are_opaque() {
        let err = AppError::item(ItemAction::Retrieve)(ItemError::Repository(
            RepositoryError::DataCorruption("bad price column".to_owned()),
        ));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Error retrieving item.");
        assert!(!body.to_string().contains("price column"));

        let err = AppError::item(ItemAction::Update)(ItemError::Cache(CacheError::Unavailable(
            "down".to_owned(),
        )));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Failed to update item.");
    }

    #[tokio::test]
    async fn test_auth_statuses() {
        let (status, body) = render(AuthError::InvalidCredentials.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");

        let (status, body) = render(AuthError::Token(TokenError::Revoked).into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Token is blacklisted");

        let (status, body) = render(AuthError::Logout(TokenError::Expired).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["data"]["error"], "Token is invalid or expired");

        let (status, _) = render(AuthError::PasswordHash.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_invalid_body_is_field_error() {
        let (status, body) = render(AppError::InvalidBody("expected value".to_owned())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["data"]["non_field_errors"][0], "expected value");
    }

    #[test]
    fn test_item_action_messages() {
        assert_eq!(ItemAction::List.success(), "Items retrieved successfully.");
        assert_eq!(ItemAction::Delete.failure(), "Failed to delete item.");
        assert_eq!(ItemAction::Update.to_string(), "update item");
    }
}
