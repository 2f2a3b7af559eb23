use axum::extract::FromRequestParts;

use crate::{error::AppError, middleware::auth::AuthUser, state::AppState};

pub const REGISTER_HEADER: &str = "x-register-id";
const MAX_REGISTER_ID_LEN: usize = 64;

/// Register (till) a checkout request operates on. Taken from `X-Register-Id`;
/// without the header every authenticated user gets a register of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterId(pub String);

impl RegisterId {
    pub fn for_user(user_id: i32) -> Self {
        Self(format!("user-{user_id}"))
    }

    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let raw = raw.trim();
        if raw.is_empty() || raw.len() > MAX_REGISTER_ID_LEN {
            return Err(AppError::BadRequest("Invalid register id".into()));
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(AppError::BadRequest("Invalid register id".into()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequestParts<AppState> for RegisterId {
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(value) = parts.headers.get(REGISTER_HEADER) {
            let raw = value
                .to_str()
                .map_err(|_| AppError::BadRequest("Invalid register id".into()))?;
            return RegisterId::parse(raw);
        }
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RegisterId::for_user(user.user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_register_is_per_user() {
        assert_eq!(RegisterId::for_user(7).as_str(), "user-7");
    }

    #[test]
    fn parse_accepts_simple_ids() {
        assert_eq!(RegisterId::parse(" till-01 ").unwrap().as_str(), "till-01");
    }

    #[test]
    fn parse_rejects_odd_ids() {
        assert!(RegisterId::parse("").is_err());
        assert!(RegisterId::parse("till 1").is_err());
        assert!(RegisterId::parse(&"x".repeat(65)).is_err());
    }
}
