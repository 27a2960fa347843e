//! Welcome route handler.

use axum::http::StatusCode;

use crate::response::ApiResponse;

/// `GET /`
pub async fn home() -> ApiResponse<()> {
    ApiResponse::message(StatusCode::OK, "Welcome to Inventory Management System App")
}
