use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::{limit_text, require_non_negative, require_positive, require_text},
    error::AppResult,
    models::ProductWithCategories,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub article_number: i64,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub image: Option<String>,
    pub color: Option<String>,
    pub height_cm: Option<i32>,
    pub width_cm: Option<i32>,
    pub depth_cm: Option<i32>,
    pub weight_gr: Option<i32>,
    pub barcode: String,
    pub stock: i32,
}

impl CreateProductRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_positive("article_number", self.article_number)?;
        require_text("name", &self.name, 50)?;
        require_text("description", &self.description, 200)?;
        require_non_negative("price", self.price)?;
        require_text("barcode", &self.barcode, 64)?;
        require_non_negative("stock", i64::from(self.stock))?;
        limit_text("color", self.color.as_deref(), 50)?;
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub image: Option<String>,
    pub color: Option<String>,
    pub height_cm: Option<i32>,
    pub width_cm: Option<i32>,
    pub depth_cm: Option<i32>,
    pub weight_gr: Option<i32>,
    pub barcode: Option<String>,
    pub stock: Option<i32>,
    /// Replace the product's categories with this one (by name).
    pub category: Option<String>,
}

impl UpdateProductRequest {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            require_text("name", name, 50)?;
        }
        limit_text("description", self.description.as_deref(), 200)?;
        if let Some(price) = self.price {
            require_non_negative("price", price)?;
        }
        if let Some(barcode) = &self.barcode {
            require_text("barcode", barcode, 64)?;
        }
        if let Some(stock) = self.stock {
            require_non_negative("stock", i64::from(stock))?;
        }
        Ok(())
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<ProductWithCategories>)]
    pub items: Vec<ProductWithCategories>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_stock_is_rejected() {
        let req = UpdateProductRequest {
            stock: Some(-1),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn empty_update_is_fine() {
        assert!(UpdateProductRequest::default().validate().is_ok());
    }
}
