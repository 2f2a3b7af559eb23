use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::{auth::validate_password, limit_text, require_email, require_text},
    error::AppResult,
    models::UserWithRole,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub role: String,
}

impl CreateUserRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_text("name", &self.name, 100)?;
        require_text("last_name", &self.last_name, 50)?;
        require_email(&self.email)?;
        validate_password(&self.password, &self.password_confirmation)?;
        limit_text("city", self.city.as_deref(), 50)?;
        limit_text("phone", self.phone.as_deref(), 10)?;
        require_text("role", &self.role, 50)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub role: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            require_text("name", name, 100)?;
        }
        if let Some(last_name) = &self.last_name {
            require_text("last_name", last_name, 50)?;
        }
        if let Some(email) = &self.email {
            require_email(email)?;
        }
        limit_text("city", self.city.as_deref(), 50)?;
        limit_text("phone", self.phone.as_deref(), 10)?;
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct UserList {
    #[schema(value_type = Vec<UserWithRole>)]
    pub items: Vec<UserWithRole>,
}
