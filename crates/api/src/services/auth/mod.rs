//! Authentication service.
//!
//! Password registration and login, plus the token lifecycle around them:
//! login opens a session (token pair), refresh extends it, logout revokes it.
//! Login and logout outcomes are written to the `stockroom::audit` target.

mod error;
mod password;

pub use error::AuthError;
pub use password::{hash_password, verify_against_dummy, verify_password};

use std::sync::Arc;

use stockroom_core::Email;
use tracing::{info, warn};

use crate::db::RepositoryError;
use crate::db::store::CredentialStore;
use crate::models::session::CurrentUser;
use crate::models::user::{LoginInput, LogoutInput, NewUser, RefreshInput, RegisterInput, User};
use crate::models::validation::FieldErrors;
use crate::services::tokens::{TokenError, TokenPair, TokenService};

const AUDIT: &str = "stockroom::audit";

/// Authentication service.
pub struct AuthService {
    users: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(users: Arc<dyn CredentialStore>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` with per-field messages if the input
    /// is invalid or the username/email is taken.
    pub async fn register(&self, input: RegisterInput) -> Result<User, AuthError> {
        register_user(self.users.as_ref(), input).await
    }

    /// Log in with a username or email address and a password.
    ///
    /// An identifier containing `@` is tried as an email first; if that
    /// doesn't match (or the password is wrong for that account) it is tried
    /// as a username. Surrounding whitespace on the identifier is ignored,
    /// as it is at registration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` without saying which part was
    /// wrong.
    pub async fn login(&self, input: LoginInput) -> Result<TokenPair, AuthError> {
        let (Some(identifier), Some(password)) =
            (input.username.as_deref(), input.password.as_deref())
        else {
            warn!(target: AUDIT, event = "login", outcome = "failure", "Login failed: missing credentials");
            return Err(AuthError::InvalidCredentials);
        };
        let identifier = identifier.trim();

        let Some(user) = self.verify_credentials(identifier, password).await? else {
            warn!(target: AUDIT, event = "login", outcome = "failure", identifier, "Login failed: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        };

        let pair = self.tokens.issue(&user).map_err(AuthError::Token)?;
        info!(target: AUDIT, event = "login", outcome = "success", user_id = %user.id, identifier, "User logged in");
        Ok(pair)
    }

    /// Revoke the caller's refresh token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Logout` if the token is missing, invalid, expired,
    /// already revoked, or not the caller's.
    pub async fn logout(&self, current: &CurrentUser, input: LogoutInput) -> Result<(), AuthError> {
        let Some(refresh_token) = input.refresh_token.as_deref() else {
            return Err(AuthError::Logout(TokenError::Invalid));
        };

        match self.tokens.revoke(refresh_token, current.id).await {
            Ok(claims) => {
                info!(target: AUDIT, event = "logout", outcome = "success", user_id = %current.id, session = %claims.jti, "User logged out");
                Ok(())
            }
            Err(e) => {
                warn!(target: AUDIT, event = "logout", outcome = "failure", user_id = %current.id, error = %e, "Logout failed");
                Err(AuthError::Logout(e))
            }
        }
    }

    /// Mint a new access token from a refresh token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if the refresh token is unusable.
    pub async fn refresh(&self, input: RefreshInput) -> Result<String, AuthError> {
        let refresh_token = input
            .refresh_token
            .as_deref()
            .ok_or(AuthError::Token(TokenError::Invalid))?;

        self.tokens
            .refresh(refresh_token)
            .await
            .map_err(AuthError::Token)
    }

    /// Resolve a bearer access token to the caller's identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if the token is unusable.
    pub async fn authenticate(&self, access_token: &str) -> Result<CurrentUser, AuthError> {
        let claims = self
            .tokens
            .verify_access(access_token)
            .await
            .map_err(AuthError::Token)?;

        Ok(CurrentUser {
            id: claims.user_id().map_err(AuthError::Token)?,
            session_id: claims.session_id().to_owned(),
            username: claims.username,
        })
    }

    /// Load the caller's account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the account no longer exists.
    pub async fn current_user(&self, current: &CurrentUser) -> Result<User, AuthError> {
        self.users
            .find_by_id(current.id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn verify_credentials(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Option<User>, AuthError> {
        if identifier.contains('@')
            && let Ok(email) = Email::parse(identifier)
            && let Some((user, hash)) = self.users.find_by_email(&email).await?
            && verify_password(password, &hash).is_ok()
        {
            return Ok(Some(user));
        }

        match self.users.find_by_username(identifier).await? {
            Some((user, hash)) if verify_password(password, &hash).is_ok() => Ok(Some(user)),
            Some(_) => Ok(None),
            None => {
                verify_against_dummy(password);
                Ok(None)
            }
        }
    }
}

/// Validate, hash and store a new user.
///
/// Shared by the HTTP handler and the `stockroom user create` command.
///
/// # Errors
///
/// Returns `AuthError::Validation` if a field is invalid or already taken,
/// `AuthError::PasswordHash` if hashing fails, and `AuthError::Repository`
/// for storage failures.
pub async fn register_user(
    users: &dyn CredentialStore,
    input: RegisterInput,
) -> Result<User, AuthError> {
    let registration = input.validate().map_err(AuthError::Validation)?;

    let mut taken = FieldErrors::new();
    if users
        .find_by_username(registration.username.as_str())
        .await?
        .is_some()
    {
        taken.add("username", taken_message("username"));
    }
    if users.find_by_email(&registration.email).await?.is_some() {
        taken.add("email", taken_message("email"));
    }
    taken.into_result().map_err(AuthError::Validation)?;

    let new_user = NewUser {
        password_hash: hash_password(&registration.password)?,
        username: registration.username,
        email: registration.email,
        first_name: registration.first_name,
        last_name: registration.last_name,
    };

    // Lost a race with a concurrent registration.
    users.create(&new_user).await.map_err(|e| match e {
        RepositoryError::Conflict(field) => {
            AuthError::Validation(FieldErrors::single(&field, taken_message(&field)))
        }
        other => AuthError::Repository(other),
    })
}

fn taken_message(field: &str) -> String {
    format!("A user with that {field} already exists.")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;
    use stockroom_core::UserId;

    use super::*;
    use crate::db::{MemoryCredentialStore, MemoryTokenBlacklist};

    fn service() -> AuthService {
        let tokens = TokenService::new(
            &SecretString::from("kR8#vQ2!mZ5$wL9@pX3^tN7&bH1*yF4%"),
            Duration::from_secs(300),
            Duration::from_secs(3600),
            Arc::new(MemoryTokenBlacklist::new()),
        );
        AuthService::new(Arc::new(MemoryCredentialStore::new()), Arc::new(tokens))
    }

    fn registration(username: &str, email: &str, password: &str) -> RegisterInput {
        RegisterInput {
            username: Some(username.to_owned()),
            email: Some(email.to_owned()),
            password: Some(password.to_owned()),
            ..RegisterInput::default()
        }
    }

    fn login(username: &str, password: &str) -> LoginInput {
        LoginInput {
            username: Some(username.to_owned()),
            password: Some(password.to_owned()),
        }
    }

    #[tokio::test]
    async fn test_register_then_login_by_username_and_email() {
        let auth = service();
        let user = auth
            .register(registration("keeper", "keeper@depot.io", "s3cure-pass"))
            .await
            .unwrap();
        assert_eq!(user.id, UserId::new(1));

        assert!(auth.login(login("keeper", "s3cure-pass")).await.is_ok());
        assert!(auth.login(login("keeper@depot.io", "s3cure-pass")).await.is_ok());
        assert!(auth.login(login("keeper@DEPOT.io", "s3cure-pass")).await.is_ok());
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let auth = service();
        auth.register(registration("keeper", "keeper@depot.io", "s3cure-pass"))
            .await
            .unwrap();

        for input in [
            login("keeper", "wrong-pass"),
            login("nobody", "s3cure-pass"),
            login("keeper@depot.io", "wrong-pass"),
            LoginInput::default(),
        ] {
            assert!(matches!(
                auth.login(input).await,
                Err(AuthError::InvalidCredentials)
            ));
        }
    }

    #[tokio::test]
    async fn test_login_ignores_surrounding_whitespace() {
        let auth = service();
        auth.register(registration("  keeper ", "keeper@depot.io", "s3cure-pass"))
            .await
            .unwrap();

        assert!(auth.login(login(" keeper ", "s3cure-pass")).await.is_ok());
        assert!(auth.login(login("\tkeeper@depot.io ", "s3cure-pass")).await.is_ok());
        assert!(matches!(
            auth.login(login(" keeper ", "wrong-pass")).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_unknown_identifier_is_rejected_after_hashing() {
        let auth = service();
        auth.register(registration("keeper", "keeper@depot.io", "s3cure-pass"))
            .await
            .unwrap();

        // The dummy hash's own password must not open any account.
        for input in [
            login("nobody", "no account has this password"),
            login("nobody@depot.io", "no account has this password"),
            login("nobody", "s3cure-pass"),
        ] {
            assert!(matches!(
                auth.login(input).await,
                Err(AuthError::InvalidCredentials)
            ));
        }
    }

    #[tokio::test]
    async fn test_email_shaped_username_falls_through() {
        let auth = service();
        // Username that looks like somebody else's email.
        auth.register(registration("boss@depot.io", "boss@depot.io", "boss-password"))
            .await
            .unwrap();
        auth.register(registration("clerk@depot.io", "clerk@other.io", "clerk-password"))
            .await
            .unwrap();

        // Email match wins.
        assert!(auth.login(login("boss@depot.io", "boss-password")).await.is_ok());
        // No account has this email, so it resolves as a username.
        assert!(auth.login(login("clerk@depot.io", "clerk-password")).await.is_ok());
    }

    #[tokio::test]
    async fn test_register_rejects_taken_fields() {
        let auth = service();
        auth.register(registration("keeper", "keeper@depot.io", "s3cure-pass"))
            .await
            .unwrap();

        let Err(AuthError::Validation(errors)) = auth
            .register(registration("keeper", "keeper@depot.io", "s3cure-pass"))
            .await
        else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors.get("username").unwrap(),
            ["A user with that username already exists."]
        );
        assert_eq!(
            errors.get("email").unwrap(),
            ["A user with that email already exists."]
        );
    }

    #[tokio::test]
    async fn test_logout_revokes_session() {
        let auth = service();
        auth.register(registration("keeper", "keeper@depot.io", "s3cure-pass"))
            .await
            .unwrap();
        let pair = auth.login(login("keeper", "s3cure-pass")).await.unwrap();
        let current = auth.authenticate(&pair.access_token).await.unwrap();
        assert_eq!(current.username, "keeper");

        auth.logout(
            &current,
            LogoutInput {
                refresh_token: Some(pair.refresh_token.clone()),
            },
        )
        .await
        .unwrap();

        assert!(matches!(
            auth.authenticate(&pair.access_token).await,
            Err(AuthError::Token(TokenError::Revoked))
        ));
        assert!(matches!(
            auth.refresh(RefreshInput {
                refresh_token: Some(pair.refresh_token.clone()),
            })
            .await,
            Err(AuthError::Token(TokenError::Revoked))
        ));

        // Logging out twice is an error, not a crash.
        assert!(matches!(
            auth.logout(
                &current,
                LogoutInput {
                    refresh_token: Some(pair.refresh_token),
                },
            )
            .await,
            Err(AuthError::Logout(TokenError::Revoked))
        ));
    }

    #[tokio::test]
    async fn test_logout_with_missing_or_bad_token() {
        let auth = service();
        let current = CurrentUser {
            id: UserId::new(1),
            username: "keeper".to_owned(),
            session_id: "s".to_owned(),
        };

        assert!(matches!(
            auth.logout(&current, LogoutInput::default()).await,
            Err(AuthError::Logout(TokenError::Invalid))
        ));
        assert!(matches!(
            auth.logout(
                &current,
                LogoutInput {
                    refresh_token: Some("garbage".to_owned()),
                },
            )
            .await,
            Err(AuthError::Logout(TokenError::Invalid))
        ));
    }

    #[tokio::test]
    async fn test_current_user() {
        let auth = service();
        let user = auth
            .register(registration("keeper", "keeper@depot.io", "s3cure-pass"))
            .await
            .unwrap();
        let pair = auth.login(login("keeper", "s3cure-pass")).await.unwrap();
        let current = auth.authenticate(&pair.access_token).await.unwrap();

        assert_eq!(auth.current_user(&current).await.unwrap(), user);
    }
}
