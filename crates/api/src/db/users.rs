//! User repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use stockroom_core::{Email, UserId, Username};

use super::store::CredentialStore;
use super::{RepositoryError, conflict_on_unique};
use crate::models::user::{NewUser, User};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, first_name, last_name, date_joined";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    date_joined: DateTime<Utc>,
}

impl UserRow {
    fn into_domain(self) -> Result<(User, String), RepositoryError> {
        let username = Username::parse(&self.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        let user = User {
            id: UserId::new(self.id),
            username,
            email,
            first_name: self.first_name,
            last_name: self.last_name,
            date_joined: self.date_joined,
        };
        Ok((user, self.password_hash))
    }
}

/// `PostgreSQL`-backed [`CredentialStore`].
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_where(
        &self,
        column: &'static str,
        value: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM stockroom.users WHERE {column} = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_domain).transpose()
    }
}

#[async_trait]
impl CredentialStore for PgUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM stockroom.users WHERE id = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row
            .map(UserRow::into_domain)
            .transpose()?
            .map(|(user, _)| user))
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        self.find_where("email", email.as_str()).await
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        self.find_where("username", username).await
    }

    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO stockroom.users (username, email, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "
        );
        let row: UserRow = sqlx::query_as(&sql)
            .bind(user.username.as_str())
            .bind(user.email.as_str())
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                conflict_on_unique(e, |constraint| {
                    if constraint.contains("email") {
                        "email"
                    } else {
                        "username"
                    }
                })
            })?;

        row.into_domain().map(|(user, _)| user)
    }
}
