use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::availability::{AvailabilityList, CreateAvailabilityRequest, UpdateAvailabilityRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Availability,
    response::ApiResponse,
    routes::params::ListQuery,
    services::availability_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_availability).post(create_availability))
        .route(
            "/{id}",
            get(get_availability)
                .put(update_availability)
                .delete(delete_availability),
        )
}

#[utoipa::path(
    get,
    path = "/api/availability",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("sort_order" = Option<String>, Query, description = "asc or desc on start time"),
    ),
    responses(
        (status = 200, description = "Availability records", body = ApiResponse<AvailabilityList>)
    ),
    tag = "Availability"
)]
pub async fn list_availability(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<AvailabilityList>>> {
    let resp = availability_service::list_availability(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/availability/{id}",
    params(("id" = i32, Path, description = "Availability ID")),
    responses(
        (status = 200, description = "Availability record", body = ApiResponse<Availability>),
        (status = 403, description = "Record belongs to someone else"),
        (status = 404, description = "Record not found"),
    ),
    tag = "Availability"
)]
pub async fn get_availability(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Availability>>> {
    let resp = availability_service::get_availability(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/availability",
    request_body = CreateAvailabilityRequest,
    responses(
        (status = 200, description = "Availability created", body = ApiResponse<Availability>),
        (status = 400, description = "Finish time before start time"),
    ),
    tag = "Availability"
)]
pub async fn create_availability(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateAvailabilityRequest>,
) -> AppResult<Json<ApiResponse<Availability>>> {
    let resp = availability_service::create_availability(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/availability/{id}",
    params(("id" = i32, Path, description = "Availability ID")),
    request_body = UpdateAvailabilityRequest,
    responses(
        (status = 200, description = "Availability updated", body = ApiResponse<Availability>),
        (status = 404, description = "Record not found"),
    ),
    tag = "Availability"
)]
pub async fn update_availability(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateAvailabilityRequest>,
) -> AppResult<Json<ApiResponse<Availability>>> {
    let resp = availability_service::update_availability(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/availability/{id}",
    params(("id" = i32, Path, description = "Availability ID")),
    responses(
        (status = 200, description = "Availability deleted"),
        (status = 404, description = "Record not found"),
    ),
    tag = "Availability"
)]
pub async fn delete_availability(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = availability_service::delete_availability(&state, &user, id).await?;
    Ok(Json(resp))
}
