use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::{limit_text, require_text},
    error::AppResult,
    models::Role,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoleRequest {
    pub name: String,
    pub description: Option<String>,
}

impl CreateRoleRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_text("name", &self.name, 50)?;
        limit_text("description", self.description.as_deref(), 200)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateRoleRequest {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            require_text("name", name, 50)?;
        }
        limit_text("description", self.description.as_deref(), 200)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRoleRequest {
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct RoleList {
    #[schema(value_type = Vec<Role>)]
    pub items: Vec<Role>,
}
