use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::{
    audit,
    dto::availability::{
        AvailabilityList, CreateAvailabilityRequest, UpdateAvailabilityRequest, check_window,
    },
    entity::availability::{self, ActiveModel, Column, Entity as Availabilities},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ROLE_SUPERADMIN, ensure_staff},
    models::Availability,
    response::{ApiResponse, Meta},
    routes::params::{ListQuery, SortOrder},
    state::AppState,
};

fn is_admin(user: &AuthUser) -> bool {
    user.role == ROLE_SUPERADMIN
}

/// Load a record the caller may touch: their own, or any for a superadmin.
async fn find_owned(state: &AppState, user: &AuthUser, id: i32) -> AppResult<availability::Model> {
    let record = Availabilities::find_by_id(id).one(&state.orm).await?;
    match record {
        Some(r) if r.user_id == user.user_id || is_admin(user) => Ok(r),
        Some(_) => Err(AppError::Forbidden),
        None => Err(AppError::NotFound),
    }
}

pub async fn list_availability(
    state: &AppState,
    user: &AuthUser,
    query: ListQuery,
) -> AppResult<ApiResponse<AvailabilityList>> {
    ensure_staff(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = Availabilities::find();
    if !is_admin(user) {
        finder = finder.filter(Column::UserId.eq(user.user_id));
    }
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(Column::StartTime),
        SortOrder::Desc => finder.order_by_desc(Column::StartTime),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Availability::from)
        .collect();

    Ok(ApiResponse::success(
        "Availability",
        AvailabilityList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_availability(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<Availability>> {
    ensure_staff(user)?;
    let record = find_owned(state, user, id).await?;
    Ok(ApiResponse::success("Availability", record.into(), None))
}

pub async fn create_availability(
    state: &AppState,
    user: &AuthUser,
    payload: CreateAvailabilityRequest,
) -> AppResult<ApiResponse<Availability>> {
    ensure_staff(user)?;
    payload.validate()?;

    let record = ActiveModel {
        id: NotSet,
        user_id: Set(user.user_id),
        absence: Set(payload.absence),
        start_time: Set(payload.start_time.into()),
        finish_time: Set(payload.finish_time.into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "availability_create",
        "availability",
        serde_json::json!({ "availability_id": record.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Availability created",
        record.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_availability(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateAvailabilityRequest,
) -> AppResult<ApiResponse<Availability>> {
    ensure_staff(user)?;
    payload.validate()?;
    let existing = find_owned(state, user, id).await?;

    let start = payload
        .start_time
        .unwrap_or_else(|| existing.start_time.with_timezone(&Utc));
    let finish = payload
        .finish_time
        .unwrap_or_else(|| existing.finish_time.with_timezone(&Utc));
    check_window(start, finish)?;

    let mut active: ActiveModel = existing.into();
    if let Some(absence) = payload.absence {
        active.absence = Set(absence);
    }
    active.start_time = Set(start.into());
    active.finish_time = Set(finish.into());
    active.updated_at = Set(Utc::now().into());
    let record = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Availability updated",
        record.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_availability(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;
    let existing = find_owned(state, user, id).await?;
    existing.delete(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "availability_delete",
        "availability",
        serde_json::json!({ "availability_id": id }),
    )
    .await;

    Ok(ApiResponse::done("Availability deleted"))
}
