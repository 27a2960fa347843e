//! Authentication route handlers.
//!
//! Registration and login are public; logout and `me` need a bearer access
//! token. Token pairs are returned in the body, never as cookies.

use axum::{extract::State, http::StatusCode};
use serde::Serialize;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::user::{LoginInput, LogoutInput, RefreshInput, RegisterInput, User};
use crate::response::ApiResponse;
use crate::services::tokens::TokenPair;
use crate::state::AppState;

/// Body of a successful refresh.
#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access_token: String,
}

/// `POST /auth/register/`
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RegisterInput>,
) -> Result<ApiResponse<User>> {
    let user = state.auth().register(input).await?;
    Ok(ApiResponse::created("user registered successfully", user))
}

/// `POST /auth/login/`
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<ApiResponse<TokenPair>> {
    let pair = state.auth().login(input).await?;
    Ok(ApiResponse::ok("User logged in successfully.", pair))
}

/// `POST /auth/refresh/`
#[instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RefreshInput>,
) -> Result<ApiResponse<AccessToken>> {
    let access_token = state.auth().refresh(input).await?;
    Ok(ApiResponse::ok(
        "Token refreshed successfully.",
        AccessToken { access_token },
    ))
}

/// `POST /auth/logout/`
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(input): ApiJson<LogoutInput>,
) -> Result<ApiResponse<()>> {
    state.auth().logout(&user, input).await?;
    clear_sentry_user();
    Ok(ApiResponse::message(StatusCode::OK, "Successfully logged out."))
}

/// `GET /auth/me/`
#[instrument(skip_all)]
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiResponse<User>> {
    let account = state.auth().current_user(&user).await?;
    Ok(ApiResponse::ok("User retrieved successfully.", account))
}
