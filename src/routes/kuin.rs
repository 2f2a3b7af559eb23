use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde_json::Value;

use crate::{
    dto::inventory::{PlacedRemoteOrders, StoreRemoteOrderRequest, SyncedOrder},
    error::AppResult,
    inventory::RemoteOrderDetail,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::inventory_service,
    state::AppState,
};

/// Proxy and sync endpoints for the Kuin wholesale API.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(remote_products))
        .route("/orders", get(remote_orders))
        .route("/order/{id}", get(remote_order))
        .route("/order/{id}/sync", post(sync_order))
        .route("/store", post(store_order))
}

#[utoipa::path(
    get,
    path = "/api/kuin/products",
    responses(
        (status = 200, description = "Remote product catalogue", body = ApiResponse<Value>),
        (status = 502, description = "Inventory service unavailable"),
    ),
    tag = "Kuin"
)]
pub async fn remote_products(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Value>>> {
    let resp = inventory_service::remote_products(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/kuin/orders",
    responses(
        (status = 200, description = "Remote orders", body = ApiResponse<Value>),
        (status = 502, description = "Inventory service unavailable"),
    ),
    tag = "Kuin"
)]
pub async fn remote_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Value>>> {
    let resp = inventory_service::remote_orders(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/kuin/order/{id}",
    params(("id" = i64, Path, description = "Remote order ID")),
    responses(
        (status = 200, description = "Order items with product details", body = ApiResponse<RemoteOrderDetail>),
        (status = 502, description = "Inventory service unavailable"),
    ),
    tag = "Kuin"
)]
pub async fn remote_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<RemoteOrderDetail>>> {
    let resp = inventory_service::remote_order(&state.inventory, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/kuin/store",
    request_body = StoreRemoteOrderRequest,
    responses(
        (status = 200, description = "Order items placed", body = ApiResponse<PlacedRemoteOrders>),
        (status = 502, description = "Inventory service unavailable"),
    ),
    tag = "Kuin"
)]
pub async fn store_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<StoreRemoteOrderRequest>,
) -> AppResult<Json<ApiResponse<PlacedRemoteOrders>>> {
    let resp = inventory_service::store_remote_order(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/kuin/order/{id}/sync",
    params(("id" = i64, Path, description = "Remote order ID")),
    responses(
        (status = 200, description = "Stock received into the local catalogue", body = ApiResponse<SyncedOrder>),
        (status = 502, description = "Inventory service unavailable, nothing changed"),
    ),
    tag = "Kuin"
)]
pub async fn sync_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<SyncedOrder>>> {
    let resp = inventory_service::sync_order(&state, &state.inventory, &user, id).await?;
    Ok(Json(resp))
}
