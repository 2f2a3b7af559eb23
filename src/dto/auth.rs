use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::{limit_text, require_email, require_text},
    error::{AppError, AppResult},
};

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
}

impl RegisterRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_text("name", &self.name, 100)?;
        require_text("last_name", &self.last_name, 50)?;
        require_email(&self.email)?;
        validate_password(&self.password, &self.password_confirmation)?;
        limit_text("city", self.city.as_deref(), 50)?;
        limit_text("phone", self.phone.as_deref(), 10)?;
        Ok(())
    }
}

pub(crate) fn validate_password(password: &str, confirmation: &str) -> AppResult<()> {
    if password.chars().count() < 6 {
        return Err(AppError::BadRequest(
            "password must be at least 6 characters".into(),
        ));
    }
    if password != confirmation {
        return Err(AppError::BadRequest(
            "password confirmation does not match".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct CustomerLoginRequest {
    pub customer_number: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            name: "Jan".into(),
            last_name: "Jansen".into(),
            email: "jan@example.com".into(),
            password: "geheim123".into(),
            password_confirmation: "geheim123".into(),
            city: Some("Utrecht".into()),
            phone: Some("0612345678".into()),
            birthday: None,
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn mismatched_confirmation_is_rejected() {
        let mut req = request();
        req.password_confirmation = "other".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn long_phone_is_rejected() {
        let mut req = request();
        req.phone = Some("06123456789".into());
        assert!(req.validate().is_err());
    }
}
