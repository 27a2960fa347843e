//! CLI subcommands.

pub mod migrate;
pub mod tokens;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;

/// Environment variable holding the database URL.
pub const DATABASE_URL_VAR: &str = "STOCKROOM_DATABASE_URL";

/// Failure to reach the database.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect using `STOCKROOM_DATABASE_URL` (or `DATABASE_URL`).
pub async fn connect() -> Result<PgPool, ConnectError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var(DATABASE_URL_VAR)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConnectError::MissingEnvVar(DATABASE_URL_VAR))?;

    tracing::info!("Connecting to database...");
    Ok(stockroom_api::db::create_pool(&database_url).await?)
}
