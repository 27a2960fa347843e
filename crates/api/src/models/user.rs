//! User domain types and request bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{Email, UserId, Username};

use super::validation::{FieldErrors, REQUIRED};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;
/// Maximum length of first and last names.
pub const MAX_NAME_LENGTH: usize = 150;

/// A registered user (domain type).
///
/// This is also the public representation: it never carries the password
/// hash, which stores hand out separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
}

/// A user about to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub email: Email,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

/// Body of `POST /auth/register/`.
#[derive(Default, Deserialize)]
pub struct RegisterInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// A registration that passed field validation; uniqueness is still unchecked.
pub struct Registration {
    pub username: Username,
    pub email: Email,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterInput {
    /// Check every field and collect all failures at once.
    ///
    /// # Errors
    ///
    /// Returns the field errors if any field is missing or malformed.
    pub fn validate(self) -> Result<Registration, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = match self.username.as_deref() {
            None => {
                errors.add("username", REQUIRED);
                None
            }
            Some(raw) => Username::parse(raw)
                .map_err(|e| errors.add("username", username_message(&e)))
                .ok(),
        };

        let email = match self.email.as_deref() {
            None => {
                errors.add("email", REQUIRED);
                None
            }
            Some(raw) => Email::parse(raw)
                .map_err(|_| errors.add("email", "Enter a valid email address."))
                .ok(),
        };

        match self.password.as_deref() {
            None => errors.add("password", REQUIRED),
            Some(p) if p.chars().count() < MIN_PASSWORD_LENGTH => errors.add(
                "password",
                format!(
                    "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
                ),
            ),
            Some(_) => {}
        }

        let first_name = self.first_name.unwrap_or_default().trim().to_owned();
        let last_name = self.last_name.unwrap_or_default().trim().to_owned();
        for (field, value) in [("first_name", &first_name), ("last_name", &last_name)] {
            if value.chars().count() > MAX_NAME_LENGTH {
                errors.add(
                    field,
                    format!("Ensure this field has no more than {MAX_NAME_LENGTH} characters."),
                );
            }
        }

        match (username, email, self.password) {
            (Some(username), Some(email), Some(password)) if errors.is_empty() => {
                Ok(Registration {
                    username,
                    email,
                    password,
                    first_name,
                    last_name,
                })
            }
            _ => Err(errors),
        }
    }
}

fn username_message(err: &stockroom_core::UsernameError) -> String {
    use stockroom_core::UsernameError;

    match err {
        UsernameError::Empty => "This field may not be blank.".to_owned(),
        UsernameError::TooLong { max } => {
            format!("Ensure this field has no more than {max} characters.")
        }
        UsernameError::InvalidCharacter(_) => "Enter a valid username. This value may contain \
                                               only letters, numbers, and @/./+/-/_ characters."
            .to_owned(),
    }
}

impl std::fmt::Debug for RegisterInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterInput")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Body of `POST /auth/login/`. `username` may also be an email address.
#[derive(Default, Deserialize)]
pub struct LoginInput {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for LoginInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginInput")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /auth/logout/`.
#[derive(Debug, Default, Deserialize)]
pub struct LogoutInput {
    pub refresh_token: Option<String>,
}

/// Body of `POST /auth/refresh/`.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshInput {
    pub refresh_token: Option<String>,
}
