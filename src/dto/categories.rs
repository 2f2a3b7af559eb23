use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::{limit_text, require_text},
    error::AppResult,
    models::CategoryWithProducts,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    /// Product (by name) to attach to the category; its SKU is regenerated.
    pub product: Option<String>,
}

impl CreateCategoryRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_text("name", &self.name, 50)?;
        limit_text("product", self.product.as_deref(), 50)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: String,
}

impl UpdateCategoryRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_text("name", &self.name, 50)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DetachProductRequest {
    pub product: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<CategoryWithProducts>)]
    pub items: Vec<CategoryWithProducts>,
}
