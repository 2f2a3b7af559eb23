use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};

use crate::{
    dto::checkout::{
        CheckoutLineList, ClearedCart, CreateCheckoutLineRequest, FinalizedReceipt, ReceiptList,
    },
    error::AppResult,
    middleware::{auth::AuthUser, register::RegisterId},
    models::{CheckoutLine, Product},
    response::ApiResponse,
    routes::params::ReceiptQuery,
    services::checkout_service,
    state::AppState,
};

/// Register-scoped checkout routes, mounted under `/product`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/code/{code}", get(find_by_code))
        .route("/barcode/{code}", post(scan_barcode))
        .route("/checkoutproduct/all", get(list_lines))
        .route("/checkoutproduct", post(add_line).delete(clear_cart))
        .route("/checkoutproduct/{id}", delete(remove_line))
        .route("/receipt", post(finalize_receipt))
}

pub fn receipts_router() -> Router<AppState> {
    Router::new().route("/", get(list_receipts))
}

#[utoipa::path(
    get,
    path = "/api/product/code/{code}",
    params(("code" = String, Path, description = "Barcode")),
    responses(
        (status = 200, description = "Product for barcode", body = ApiResponse<Product>),
        (status = 404, description = "Unknown barcode"),
    ),
    security(()),
    tag = "Checkout"
)]
pub async fn find_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = checkout_service::find_by_code(&state, &code).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/product/barcode/{code}",
    params(
        ("code" = String, Path, description = "Scanned barcode"),
        ("x-register-id" = Option<String>, Header, description = "Register id, defaults to user-{id}"),
    ),
    responses(
        (status = 200, description = "Scanned product", body = ApiResponse<Product>),
        (status = 404, description = "Unknown barcode, checkout untouched"),
    ),
    tag = "Checkout"
)]
pub async fn scan_barcode(
    State(state): State<AppState>,
    user: AuthUser,
    register: RegisterId,
    Path(code): Path<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = checkout_service::scan_barcode(&state, &user, &register, &code).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/product/checkoutproduct/all",
    params(("x-register-id" = Option<String>, Header, description = "Register id")),
    responses(
        (status = 200, description = "Lines of the register", body = ApiResponse<CheckoutLineList>)
    ),
    tag = "Checkout"
)]
pub async fn list_lines(
    State(state): State<AppState>,
    user: AuthUser,
    register: RegisterId,
) -> AppResult<Json<ApiResponse<CheckoutLineList>>> {
    let resp = checkout_service::list_lines(&state, &user, &register).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/product/checkoutproduct",
    params(("x-register-id" = Option<String>, Header, description = "Register id")),
    request_body = CreateCheckoutLineRequest,
    responses(
        (status = 200, description = "Saved line", body = ApiResponse<CheckoutLine>),
        (status = 400, description = "Invalid payload"),
    ),
    tag = "Checkout"
)]
pub async fn add_line(
    State(state): State<AppState>,
    user: AuthUser,
    register: RegisterId,
    Json(payload): Json<CreateCheckoutLineRequest>,
) -> AppResult<Json<ApiResponse<CheckoutLine>>> {
    let resp = checkout_service::add_line(&state, &user, &register, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/product/checkoutproduct/{id}",
    params(
        ("id" = i32, Path, description = "Checkout line ID"),
        ("x-register-id" = Option<String>, Header, description = "Register id"),
    ),
    responses(
        (status = 200, description = "Removed line", body = ApiResponse<CheckoutLine>),
        (status = 404, description = "No such line at this register"),
    ),
    tag = "Checkout"
)]
pub async fn remove_line(
    State(state): State<AppState>,
    user: AuthUser,
    register: RegisterId,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<CheckoutLine>>> {
    let resp = checkout_service::remove_line(&state, &user, &register, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/product/checkoutproduct",
    params(("x-register-id" = Option<String>, Header, description = "Register id")),
    responses(
        (status = 200, description = "Cleared checkout", body = ApiResponse<ClearedCart>)
    ),
    tag = "Checkout"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
    register: RegisterId,
) -> AppResult<Json<ApiResponse<ClearedCart>>> {
    let resp = checkout_service::clear_cart(&state, &user, &register).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/product/receipt",
    params(("x-register-id" = Option<String>, Header, description = "Register id")),
    responses(
        (status = 200, description = "Receipt created", body = ApiResponse<FinalizedReceipt>),
        (status = 400, description = "Checkout is empty"),
        (status = 409, description = "Not enough stock, nothing was changed"),
    ),
    tag = "Checkout"
)]
pub async fn finalize_receipt(
    State(state): State<AppState>,
    user: AuthUser,
    register: RegisterId,
) -> AppResult<Json<ApiResponse<FinalizedReceipt>>> {
    let resp = checkout_service::finalize_receipt(&state, &user, &register).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/receipts",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("register_id" = Option<String>, Query, description = "Only receipts of this register"),
    ),
    responses(
        (status = 200, description = "Receipts, newest first", body = ApiResponse<ReceiptList>)
    ),
    tag = "Checkout"
)]
pub async fn list_receipts(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ReceiptQuery>,
) -> AppResult<Json<ApiResponse<ReceiptList>>> {
    let resp = checkout_service::list_receipts(&state, &user, query).await?;
    Ok(Json(resp))
}
