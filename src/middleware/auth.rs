use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::{dto::auth::Claims, error::AppError, state::AppState};

pub const ROLE_SUPERADMIN: &str = "superadmin";
pub const ROLE_STAFF: &str = "staff";
pub const ROLE_USER: &str = "user";
pub const ROLE_CASHIER: &str = "kassamedewerker";

/// Authenticated actor, resolved from the bearer token and handed to services explicitly.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub role: String,
}

pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    ensure_any_role(user, &[role])
}

pub fn ensure_any_role(user: &AuthUser, roles: &[&str]) -> Result<(), AppError> {
    if !roles.contains(&user.role.as_str()) {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, ROLE_SUPERADMIN)
}

/// Staff-facing back office: superadmins, staff and cashiers.
pub fn ensure_staff(user: &AuthUser) -> Result<(), AppError> {
    ensure_any_role(user, &[ROLE_SUPERADMIN, ROLE_STAFF, ROLE_CASHIER])
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let user_id = decoded
        .claims
        .sub
        .parse::<i32>()
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    Ok(AuthUser {
        user_id,
        role: decoded.claims.role,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?
            .trim();

        decode_token(token, &state.config.jwt_secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> AuthUser {
        AuthUser {
            user_id: 1,
            role: role.to_string(),
        }
    }

    #[test]
    fn admin_check() {
        assert!(ensure_admin(&user(ROLE_SUPERADMIN)).is_ok());
        assert!(matches!(ensure_admin(&user(ROLE_STAFF)), Err(AppError::Forbidden)));
    }

    #[test]
    fn staff_check_admits_cashiers() {
        assert!(ensure_staff(&user(ROLE_CASHIER)).is_ok());
        assert!(ensure_staff(&user(ROLE_STAFF)).is_ok());
        assert!(matches!(ensure_staff(&user(ROLE_USER)), Err(AppError::Forbidden)));
    }

    #[test]
    fn garbage_token_is_unauthorized() {
        assert!(matches!(
            decode_token("not-a-jwt", "secret"),
            Err(AppError::Unauthorized(_))
        ));
    }
}
