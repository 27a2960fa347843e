//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! STOCKROOM_NEW_USER_PASSWORD='...' stockroom user create -u keeper -e keeper@example.com
//! ```
//!
//! The password is never taken from argv, where it would end up in shell
//! history and process listings.

use stockroom_api::db::PgUserRepository;
use stockroom_api::models::user::RegisterInput;
use stockroom_api::services::auth::{AuthError, register_user};
use thiserror::Error;

use super::{ConnectError, connect};

/// Environment variable the new user's password is read from.
pub const PASSWORD_VAR: &str = "STOCKROOM_NEW_USER_PASSWORD";

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Registration rejected or failed.
    #[error(transparent)]
    Register(#[from] AuthError),
}

/// Create a user with the same validation as `POST /auth/register/`.
///
/// # Returns
///
/// The ID of the created user.
pub async fn create_user(
    username: String,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
) -> Result<i32, UserError> {
    dotenvy::dotenv().ok();

    let password =
        std::env::var(PASSWORD_VAR).map_err(|_| UserError::MissingEnvVar(PASSWORD_VAR))?;

    let pool = connect().await?;
    let users = PgUserRepository::new(pool);

    let input = RegisterInput {
        username: Some(username),
        email: Some(email),
        password: Some(password),
        first_name,
        last_name,
    };

    let user = register_user(&users, input).await.inspect_err(|e| {
        if let AuthError::Validation(fields) = e {
            tracing::error!(?fields, "User rejected");
        }
    })?;

    tracing::info!("Created user {} ({}) with id {}", user.username, user.email, user.id);
    Ok(user.id.into_inner())
}
