use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::{
    audit,
    config::AppConfig,
    dto::auth::{Claims, CustomerLoginRequest, LoginRequest, LoginResponse, RegisterRequest},
    entity::users::{self, ActiveModel as UserActive, Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    identifiers::{random_customer_number, unique_number},
    middleware::auth::{AuthUser, ROLE_USER},
    models::{User, UserWithRole},
    response::{ApiResponse, Meta},
    services::role_service::{current_role, set_role},
    state::AppState,
};

pub(crate) fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn issue_token(config: &AppConfig, user_id: i32, role: &str) -> AppResult<LoginResponse> {
    let ttl = Duration::hours(config.jwt_ttl_hours);
    let expiration = Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    Ok(LoginResponse {
        token,
        token_type: "Bearer".into(),
        expires_in: ttl.num_seconds(),
    })
}

/// Random 8 digit customer number no user holds yet.
pub(crate) async fn generate_customer_number<C: ConnectionTrait>(db: &C) -> AppResult<String> {
    unique_number(
        || random_customer_number(&mut rand::rng()),
        move |candidate| async move {
            let taken = Users::find()
                .filter(UserCol::CustomerNumber.eq(candidate))
                .count(db)
                .await?;
            Ok::<bool, AppError>(taken > 0)
        },
    )
    .await
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    payload.validate()?;
    let email = payload.email.trim().to_lowercase();

    let txn = state.orm.begin().await?;
    let exists = Users::find()
        .filter(UserCol::Email.eq(email.clone()))
        .count(&txn)
        .await?;
    if exists > 0 {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let customer_number = generate_customer_number(&txn).await?;
    let password_hash = hash_password(&payload.password)?;

    let user = UserActive {
        id: NotSet,
        name: Set(payload.name),
        last_name: Set(payload.last_name),
        email: Set(email),
        password_hash: Set(password_hash),
        city: Set(payload.city),
        phone: Set(payload.phone),
        birthday: Set(payload.birthday),
        cashier_number: Set(None),
        customer_number: Set(Some(customer_number)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;
    set_role(&txn, user.id, ROLE_USER).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.id),
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "User created",
        user.into(),
        Some(Meta::empty()),
    ))
}

async fn login(
    state: &AppState,
    user: Option<users::Model>,
    password: &str,
) -> AppResult<ApiResponse<LoginResponse>> {
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::Unauthorized("Invalid credentials".into())),
    };

    if !verify_password(password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let role = current_role(&state.orm, user.id)
        .await?
        .map(|r| r.name)
        .unwrap_or_else(|| ROLE_USER.to_string());
    let resp = issue_token(&state.config, user.id, &role)?;

    audit::record(
        &state.pool,
        Some(user.id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let user = Users::find()
        .filter(UserCol::Email.eq(payload.email.trim().to_lowercase()))
        .one(&state.orm)
        .await?;
    login(state, user, &payload.password).await
}

pub async fn login_customer(
    state: &AppState,
    payload: CustomerLoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let user = Users::find()
        .filter(UserCol::CustomerNumber.eq(payload.customer_number.trim()))
        .one(&state.orm)
        .await?;
    login(state, user, &payload.password).await
}

pub async fn me(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserWithRole>> {
    let model = Users::find_by_id(user.user_id).one(&state.orm).await?;
    let model = match model {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };
    let role = current_role(&state.orm, model.id).await?;
    Ok(ApiResponse::success(
        "Current user",
        UserWithRole {
            user: model.into(),
            role: role.map(Into::into),
        },
        None,
    ))
}

/// New token for the caller, carrying their current role.
pub async fn refresh(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<LoginResponse>> {
    let exists = Users::find_by_id(user.user_id).one(&state.orm).await?;
    if exists.is_none() {
        return Err(AppError::Unauthorized("User no longer exists".into()));
    }
    let role = current_role(&state.orm, user.user_id)
        .await?
        .map(|r| r.name)
        .unwrap_or_else(|| ROLE_USER.to_string());
    let resp = issue_token(&state.config, user.user_id, &role)?;
    Ok(ApiResponse::success("Token refreshed", resp, Some(Meta::empty())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::InventoryConfig, middleware::auth::decode_token};

    fn config() -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/unused".into(),
            host: "127.0.0.1".into(),
            port: 3000,
            db_max_connections: 1,
            jwt_secret: "test-secret".into(),
            jwt_ttl_hours: 2,
            inventory: InventoryConfig {
                base_url: "http://localhost".into(),
                token: None,
            },
        }
    }

    #[test]
    fn issued_token_decodes_to_same_actor() {
        let config = config();
        let resp = issue_token(&config, 7, "kassamedewerker").unwrap();
        assert_eq!(resp.token_type, "Bearer");
        assert_eq!(resp.expires_in, 2 * 3600);

        let actor = decode_token(&resp.token, &config.jwt_secret).unwrap();
        assert_eq!(actor.user_id, 7);
        assert_eq!(actor.role, "kassamedewerker");
    }

    #[test]
    fn token_with_other_secret_is_rejected() {
        let resp = issue_token(&config(), 7, "staff").unwrap();
        assert!(decode_token(&resp.token, "another-secret").is_err());
    }

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("geheim123").unwrap();
        assert!(verify_password("geheim123", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }
}
