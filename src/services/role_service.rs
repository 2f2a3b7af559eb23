use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, JoinType, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use chrono::Utc;

use crate::{
    audit,
    dto::roles::{AssignRoleRequest, CreateRoleRequest, RoleList, UpdateRoleRequest},
    entity::{
        role_user::{self, ActiveModel as RoleUserActive, Column as RoleUserCol, Entity as RoleUser},
        roles::{self, ActiveModel as RoleActive, Column as RoleCol, Entity as Roles},
        users::{self, Entity as Users},
    },
    error::{AppError, AppResult},
    identifiers::cashier_number_after_transition,
    middleware::auth::{AuthUser, ROLE_CASHIER, ensure_admin},
    models::{Role, UserWithRole},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// The role a user currently holds, if any.
pub(crate) async fn current_role<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> AppResult<Option<roles::Model>> {
    let role = Roles::find()
        .join(JoinType::InnerJoin, role_user::Relation::Roles.def().rev())
        .filter(RoleUserCol::UserId.eq(user_id))
        .order_by_asc(RoleCol::Id)
        .one(db)
        .await?;
    Ok(role)
}

/// Replace the user's role with `role_name` and keep the cashier number in
/// step with the transition.
pub(crate) async fn set_role<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    role_name: &str,
) -> AppResult<(users::Model, roles::Model)> {
    let role = Roles::find()
        .filter(RoleCol::Name.eq(role_name.trim()))
        .one(db)
        .await?;
    let role = match role {
        Some(r) => r,
        None => {
            return Err(AppError::BadRequest(format!(
                "Unknown role {}",
                role_name.trim()
            )));
        }
    };

    let user = Users::find_by_id(user_id)
        .lock(LockType::Update)
        .one(db)
        .await?;
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let previous = current_role(db, user.id).await?;

    RoleUser::delete_many()
        .filter(RoleUserCol::UserId.eq(user.id))
        .exec(db)
        .await?;
    RoleUserActive {
        user_id: Set(user.id),
        role_id: Set(role.id),
    }
    .insert(db)
    .await?;

    let cashier_number = cashier_number_after_transition(
        user.id,
        previous.as_ref().map(|r| r.name.as_str()),
        &role.name,
        user.cashier_number.clone(),
        ROLE_CASHIER,
    );

    let user = if cashier_number != user.cashier_number {
        tracing::info!(
            user_id = user.id,
            cashier_number = ?cashier_number,
            "cashier number changed"
        );
        let mut active: users::ActiveModel = user.into();
        active.cashier_number = Set(cashier_number);
        active.updated_at = Set(Utc::now().into());
        active.update(db).await?
    } else {
        user
    };

    Ok((user, role))
}

pub async fn list_roles(state: &AppState, _user: &AuthUser) -> AppResult<ApiResponse<RoleList>> {
    let items: Vec<Role> = Roles::find()
        .order_by_asc(RoleCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Role::from)
        .collect();
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Roles",
        RoleList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn get_role(state: &AppState, _user: &AuthUser, id: i32) -> AppResult<ApiResponse<Role>> {
    let role = Roles::find_by_id(id).one(&state.orm).await?;
    let role = match role {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Role", role.into(), None))
}

pub async fn create_role(
    state: &AppState,
    user: &AuthUser,
    payload: CreateRoleRequest,
) -> AppResult<ApiResponse<Role>> {
    ensure_admin(user)?;
    payload.validate()?;

    let name = payload.name.trim().to_string();
    let exists = Roles::find()
        .filter(RoleCol::Name.eq(name.clone()))
        .count(&state.orm)
        .await?;
    if exists > 0 {
        return Err(AppError::BadRequest("Role already exists".into()));
    }

    let role = RoleActive {
        id: NotSet,
        name: Set(name),
        description: Set(payload.description),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "role_create",
        "roles",
        serde_json::json!({ "role_id": role.id }),
    )
    .await;

    Ok(ApiResponse::success("Role created", role.into(), Some(Meta::empty())))
}

pub async fn update_role(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateRoleRequest,
) -> AppResult<ApiResponse<Role>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = Roles::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    let mut active: RoleActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    let role = active.update(&state.orm).await?;

    Ok(ApiResponse::success("Role updated", role.into(), Some(Meta::empty())))
}

pub async fn delete_role(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let existing = Roles::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };
    existing.delete(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "role_delete",
        "roles",
        serde_json::json!({ "role_id": id }),
    )
    .await;

    Ok(ApiResponse::done("Role deleted"))
}

pub async fn assign_role(
    state: &AppState,
    user: &AuthUser,
    user_id: i32,
    payload: AssignRoleRequest,
) -> AppResult<ApiResponse<UserWithRole>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let (target, role) = set_role(&txn, user_id, &payload.name).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "role_assign",
        "role_user",
        serde_json::json!({ "user_id": target.id, "role": role.name }),
    )
    .await;

    Ok(ApiResponse::success(
        "Role assigned",
        UserWithRole {
            user: target.into(),
            role: Some(role.into()),
        },
        Some(Meta::empty()),
    ))
}
