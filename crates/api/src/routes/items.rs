//! Inventory item route handlers.
//!
//! Every endpoint requires a bearer access token. A path ID that isn't a
//! UUID can't name an item, so it is answered like any unknown item.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use stockroom_core::ItemId;
use tracing::instrument;

use crate::error::{AppError, ItemAction, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::item::{ItemInput, ItemView};
use crate::response::ApiResponse;
use crate::services::items::ItemError;
use crate::state::AppState;

/// `GET /items/`
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Result<ApiResponse<Vec<ItemView>>> {
    let action = ItemAction::List;
    let items = state.items().list().await.map_err(AppError::item(action))?;
    Ok(ApiResponse::ok(action.success(), items))
}

/// `POST /items/`
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    ApiJson(input): ApiJson<ItemInput>,
) -> Result<ApiResponse<ItemView>> {
    let action = ItemAction::Create;
    let item = state
        .items()
        .create(&input)
        .await
        .map_err(AppError::item(action))?;
    Ok(ApiResponse::created(action.success(), item))
}

/// `GET /items/{id}/`
#[instrument(skip(state, _user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<String>,
) -> Result<ApiResponse<ItemView>> {
    let action = ItemAction::Retrieve;
    let id = parse_id(&id, action)?;
    let item = state.items().get(id).await.map_err(AppError::item(action))?;
    Ok(ApiResponse::ok(action.success(), item))
}

/// `PUT /items/{id}/`
#[instrument(skip(state, _user, input))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ItemInput>,
) -> Result<ApiResponse<ItemView>> {
    let action = ItemAction::Update;
    let id = parse_id(&id, action)?;
    let item = state
        .items()
        .update(id, &input)
        .await
        .map_err(AppError::item(action))?;
    Ok(ApiResponse::ok(action.success(), item))
}

/// `PATCH /items/{id}/`
#[instrument(skip(state, _user, input))]
pub async fn partial_update(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ItemInput>,
) -> Result<ApiResponse<ItemView>> {
    let action = ItemAction::Update;
    let id = parse_id(&id, action)?;
    let item = state
        .items()
        .partial_update(id, &input)
        .await
        .map_err(AppError::item(action))?;
    Ok(ApiResponse::ok(action.success(), item))
}

/// `DELETE /items/{id}/`
#[instrument(skip(state, _user))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>> {
    let action = ItemAction::Delete;
    let id = parse_id(&id, action)?;
    state
        .items()
        .delete(id)
        .await
        .map_err(AppError::item(action))?;
    Ok(ApiResponse::message(StatusCode::OK, action.success()))
}

fn parse_id(raw: &str, action: ItemAction) -> Result<ItemId> {
    raw.parse()
        .map_err(|_| AppError::item(action)(ItemError::NotFound))
}
