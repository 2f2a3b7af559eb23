use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};

use crate::{
    dto::roles::{AssignRoleRequest, CreateRoleRequest, RoleList, UpdateRoleRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Role, UserWithRole},
    response::ApiResponse,
    services::role_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route(
            "/{id}",
            get(get_role).put(update_role).delete(delete_role),
        )
        .route("/user/{id}", put(assign_role))
}

#[utoipa::path(
    get,
    path = "/api/role",
    responses(
        (status = 200, description = "All roles", body = ApiResponse<RoleList>)
    ),
    tag = "Roles"
)]
pub async fn list_roles(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<RoleList>>> {
    let resp = role_service::list_roles(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/role/{id}",
    params(("id" = i32, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role", body = ApiResponse<Role>),
        (status = 404, description = "Role not found"),
    ),
    tag = "Roles"
)]
pub async fn get_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Role>>> {
    let resp = role_service::get_role(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/role",
    request_body = CreateRoleRequest,
    responses(
        (status = 200, description = "Role created", body = ApiResponse<Role>),
        (status = 400, description = "Role already exists"),
    ),
    tag = "Roles"
)]
pub async fn create_role(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateRoleRequest>,
) -> AppResult<Json<ApiResponse<Role>>> {
    let resp = role_service::create_role(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/role/{id}",
    params(("id" = i32, Path, description = "Role ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = ApiResponse<Role>),
        (status = 404, description = "Role not found"),
    ),
    tag = "Roles"
)]
pub async fn update_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateRoleRequest>,
) -> AppResult<Json<ApiResponse<Role>>> {
    let resp = role_service::update_role(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/role/{id}",
    params(("id" = i32, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role deleted"),
        (status = 404, description = "Role not found"),
    ),
    tag = "Roles"
)]
pub async fn delete_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = role_service::delete_role(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/role/user/{id}",
    params(("id" = i32, Path, description = "User ID")),
    request_body = AssignRoleRequest,
    responses(
        (status = 200, description = "Role assigned", body = ApiResponse<UserWithRole>),
        (status = 400, description = "Unknown role"),
        (status = 404, description = "User not found"),
    ),
    tag = "Roles"
)]
pub async fn assign_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<AssignRoleRequest>,
) -> AppResult<Json<ApiResponse<UserWithRole>>> {
    let resp = role_service::assign_role(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
