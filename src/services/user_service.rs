use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, LoaderTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::{
    audit,
    dto::users::{CreateUserRequest, UpdateUserRequest, UserList},
    entity::{
        RoleUser, Roles,
        users::{self, ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_staff},
    models::{Role, UserWithRole},
    response::{ApiResponse, Meta},
    routes::params::{ListQuery, SortOrder},
    services::{
        auth_service::hash_password,
        role_service::{current_role, set_role},
    },
    state::AppState,
};

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: ListQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = Users::find();
    if let Some(q) = query.q.as_ref().filter(|s| !s.is_empty()) {
        finder = finder.filter(
            Condition::any()
                .add(UserCol::Name.contains(q.as_str()))
                .add(UserCol::LastName.contains(q.as_str()))
                .add(UserCol::Email.contains(q.as_str())),
        );
    }
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(UserCol::Id),
        SortOrder::Desc => finder.order_by_desc(UserCol::Id),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let users = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = with_roles(&state.orm, users).await?;

    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_user(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<UserWithRole>> {
    if user.user_id != id {
        ensure_admin(user)?;
    }
    let model = find_user(&state.orm, id).await?;
    let item = with_roles(&state.orm, vec![model])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("User", item, None))
}

pub async fn get_by_customer_number(
    state: &AppState,
    user: &AuthUser,
    number: &str,
) -> AppResult<ApiResponse<UserWithRole>> {
    ensure_staff(user)?;
    let model = Users::find()
        .filter(UserCol::CustomerNumber.eq(number.trim()))
        .one(&state.orm)
        .await?;
    let model = match model {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };
    let item = with_roles(&state.orm, vec![model])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("User", item, None))
}

/// Back-office user creation with an explicit role.
pub async fn create_user(
    state: &AppState,
    user: &AuthUser,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<UserWithRole>> {
    ensure_admin(user)?;
    payload.validate()?;
    let email = payload.email.trim().to_lowercase();

    let txn = state.orm.begin().await?;
    let exists = Users::find()
        .filter(UserCol::Email.eq(email.clone()))
        .count(&txn)
        .await?;
    if exists > 0 {
        return Err(AppError::BadRequest("Email is already taken".into()));
    }

    let created = UserActive {
        id: NotSet,
        name: Set(payload.name),
        last_name: Set(payload.last_name),
        email: Set(email),
        password_hash: Set(hash_password(&payload.password)?),
        city: Set(payload.city),
        phone: Set(payload.phone),
        birthday: Set(payload.birthday),
        cashier_number: Set(None),
        customer_number: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;
    let (created, role) = set_role(&txn, created.id, &payload.role).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "user_create",
        "users",
        serde_json::json!({ "user_id": created.id, "role": role.name }),
    )
    .await;

    Ok(ApiResponse::success(
        "User created",
        UserWithRole {
            user: created.into(),
            role: Some(role.into()),
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_user(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<UserWithRole>> {
    if user.user_id != id || payload.role.is_some() {
        ensure_admin(user)?;
    }
    payload.validate()?;

    let txn = state.orm.begin().await?;
    let existing = find_user(&txn, id).await?;

    if let Some(email) = payload.email.as_ref() {
        let email = email.trim().to_lowercase();
        let clash = Users::find()
            .filter(UserCol::Email.eq(email))
            .filter(UserCol::Id.ne(id))
            .count(&txn)
            .await?;
        if clash > 0 {
            return Err(AppError::BadRequest("Email is already taken".into()));
        }
    }

    let mut active: UserActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(last_name) = payload.last_name {
        active.last_name = Set(last_name);
    }
    if let Some(email) = payload.email {
        active.email = Set(email.trim().to_lowercase());
    }
    if let Some(city) = payload.city {
        active.city = Set(Some(city));
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if payload.birthday.is_some() {
        active.birthday = Set(payload.birthday);
    }
    active.updated_at = Set(Utc::now().into());
    let mut updated = active.update(&txn).await?;

    let role = match payload.role.as_ref() {
        Some(role_name) => {
            let (with_role, role) = set_role(&txn, updated.id, role_name).await?;
            updated = with_role;
            Some(role)
        }
        None => current_role(&txn, updated.id).await?,
    };
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "user_update",
        "users",
        serde_json::json!({ "user_id": updated.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "User updated",
        UserWithRole {
            user: updated.into(),
            role: role.map(Role::from),
        },
        Some(Meta::empty()),
    ))
}

pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    if user.user_id == id {
        return Err(AppError::BadRequest("You cannot delete yourself".into()));
    }
    let existing = find_user(&state.orm, id).await?;
    existing.delete(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "user_delete",
        "users",
        serde_json::json!({ "user_id": id }),
    )
    .await;

    Ok(ApiResponse::done("User deleted"))
}

async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<users::Model> {
    let user = Users::find_by_id(id).one(db).await?;
    match user {
        Some(u) => Ok(u),
        None => Err(AppError::NotFound),
    }
}

async fn with_roles<C: ConnectionTrait>(
    db: &C,
    users: Vec<users::Model>,
) -> AppResult<Vec<UserWithRole>> {
    let roles = users.load_many_to_many(Roles, RoleUser, db).await?;
    Ok(users
        .into_iter()
        .zip(roles)
        .map(|(user, roles)| UserWithRole {
            user: user.into(),
            role: roles.into_iter().next().map(Role::from),
        })
        .collect())
}
