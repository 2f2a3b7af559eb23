use axum::{
    Json, Router,
    http::{StatusCode, Uri},
};

use crate::{
    response::{ApiResponse, Meta},
    state::AppState,
};

pub mod auth;
pub mod availability;
pub mod categories;
pub mod checkout;
pub mod doc;
pub mod health;
pub mod kuin;
pub mod orders;
pub mod params;
pub mod products;
pub mod roles;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/product", products::router().merge(checkout::router()))
        .nest("/receipts", checkout::receipts_router())
        .nest("/category", categories::router())
        .nest("/order", orders::router())
        .nest("/customer", orders::customer_router())
        .nest("/user", users::router())
        .nest("/role", roles::router())
        .nest("/availability", availability::router())
        .nest("/kuin", kuin::router())
}

pub async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::success(
        "Route not found",
        serde_json::json!({ "path": uri.path() }),
        Some(Meta::empty()),
    );
    (StatusCode::NOT_FOUND, Json(body))
}
