//! JWT token issuance and validation.
//!
//! Tokens are HS256-signed and come in pairs bound to one user:
//!
//! - a short-lived **access** token sent as `Authorization: Bearer ...`
//! - a longer-lived **refresh** token used to mint new access tokens
//!
//! Every access token carries `sid`, the `jti` of the refresh token it was
//! issued with. Revoking a refresh token puts its `jti` on the blacklist,
//! which also rejects every access token naming it, so a logged-out session
//! is dead immediately rather than when its access token expires.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use stockroom_core::UserId;

use crate::db::RepositoryError;
use crate::db::store::TokenBlacklist;
use crate::models::user::User;

/// Errors from token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Malformed token, bad signature, or unparseable claims.
    #[error("token is invalid")]
    Invalid,

    /// Signature is fine but `exp` has passed.
    #[error("token has expired")]
    Expired,

    /// An access token was presented where a refresh token was expected, or
    /// the other way round.
    #[error("token has the wrong type")]
    WrongType,

    /// The refresh token (or the session an access token belongs to) has been
    /// revoked.
    #[error("token is blacklisted")]
    Revoked,

    /// The token belongs to a different user than the caller.
    #[error("token belongs to another user")]
    NotOwner,

    /// Signing failed.
    #[error("failed to sign token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),

    /// The blacklist could not be read or written.
    #[error("token blacklist error: {0}")]
    Blacklist(#[from] RepositoryError),
}

impl TokenError {
    /// Client-facing explanation, safe to return in a response body.
    #[must_use]
    pub const fn detail(&self) -> &'static str {
        match self {
            Self::Revoked => "Token is blacklisted",
            _ => "Token is invalid or expired",
        }
    }

    /// Whether the failure is on our side rather than the token's.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Encoding(_) | Self::Blacklist(_))
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Invalid,
        }
    }
}

/// Which half of a pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims carried by both token types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID, as a string.
    pub sub: String,
    pub username: String,
    /// Unique token ID.
    pub jti: String,
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
    /// Refresh-token `jti` this access token was issued under. Absent on
    /// refresh tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

impl Claims {
    /// The subject as a [`UserId`].
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if `sub` is not a user ID.
    pub fn user_id(&self) -> Result<UserId, TokenError> {
        self.sub
            .parse::<i32>()
            .map(UserId::new)
            .map_err(|_| TokenError::Invalid)
    }

    /// The session this token belongs to: its own `jti` for refresh tokens,
    /// `sid` for access tokens.
    #[must_use]
    pub fn session_id(&self) -> &str {
        self.sid.as_deref().unwrap_or(&self.jti)
    }

    fn expires_at(&self) -> Result<DateTime<Utc>, TokenError> {
        DateTime::from_timestamp(self.exp, 0).ok_or(TokenError::Invalid)
    }
}

/// An access/refresh token pair, as returned by login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues, verifies and revokes JWTs.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
    blacklist: Arc<dyn TokenBlacklist>,
}

impl TokenService {
    /// Create a token service signing with `secret`.
    #[must_use]
    pub fn new(
        secret: &SecretString,
        access_ttl: Duration,
        refresh_ttl: Duration,
        blacklist: Arc<dyn TokenBlacklist>,
    ) -> Self {
        let secret = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl,
            refresh_ttl,
            blacklist,
        }
    }

    /// Mint a fresh token pair for `user`, opening a new session.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` if signing fails.
    pub fn issue(&self, user: &User) -> Result<TokenPair, TokenError> {
        let refresh = self.claims(
            &user.id.to_string(),
            user.username.as_str(),
            TokenType::Refresh,
            None,
        );
        let access = self.claims(
            &refresh.sub,
            &refresh.username,
            TokenType::Access,
            Some(refresh.jti.clone()),
        );

        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
        })
    }

    /// Verify an access token and that its session is still live.
    ///
    /// # Errors
    ///
    /// Returns the reason the token is not acceptable.
    pub async fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.decode(token, TokenType::Access)?;
        let Some(sid) = claims.sid.as_deref() else {
            return Err(TokenError::Invalid);
        };
        if self.blacklist.is_revoked(sid).await? {
            return Err(TokenError::Revoked);
        }
        Ok(claims)
    }

    /// Verify a refresh token and that it has not been revoked.
    ///
    /// # Errors
    ///
    /// Returns the reason the token is not acceptable.
    pub async fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.decode(token, TokenType::Refresh)?;
        if self.blacklist.is_revoked(&claims.jti).await? {
            return Err(TokenError::Revoked);
        }
        Ok(claims)
    }

    /// Mint a new access token in the session of `refresh_token`.
    ///
    /// # Errors
    ///
    /// Fails if the refresh token is invalid, expired or revoked.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, TokenError> {
        let refresh = self.verify_refresh(refresh_token).await?;
        let access = self.claims(
            &refresh.sub,
            &refresh.username,
            TokenType::Access,
            Some(refresh.jti),
        );
        self.sign(&access)
    }

    /// Blacklist `refresh_token`, ending its session. The token must belong
    /// to `owner`.
    ///
    /// # Errors
    ///
    /// Fails if the token is invalid, expired, already revoked, or belongs to
    /// someone else.
    pub async fn revoke(&self, refresh_token: &str, owner: UserId) -> Result<Claims, TokenError> {
        let claims = self.verify_refresh(refresh_token).await?;
        if claims.user_id()? != owner {
            return Err(TokenError::NotOwner);
        }

        self.blacklist
            .revoke(&claims.jti, claims.expires_at()?)
            .await?;
        Ok(claims)
    }

    fn claims(
        &self,
        sub: &str,
        username: &str,
        token_type: TokenType,
        sid: Option<String>,
    ) -> Claims {
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let iat = Utc::now().timestamp();
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);

        Claims {
            sub: sub.to_owned(),
            username: username.to_owned(),
            jti: Uuid::new_v4().simple().to_string(),
            token_type,
            iat,
            exp: iat.saturating_add(ttl_secs),
            sid,
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(TokenError::Encoding)
    }

    fn decode(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;
        if claims.token_type != expected {
            return Err(TokenError::WrongType);
        }
        Ok(claims)
    }
}
