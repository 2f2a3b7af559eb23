use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::{require_email, require_positive, require_text},
    error::{AppError, AppResult},
    models::{Order, OrderItem},
};

/// Staff order for a single product, referenced by name.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub product: String,
    pub quantity: i32,
}

impl CreateOrderRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_text("product", &self.product, 50)?;
        require_positive("quantity", i64::from(self.quantity))
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub product: String,
    pub quantity: i32,
}

/// Anonymous webshop order.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CustomerOrderRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub zipcode: String,
    pub house_number: String,
    pub address: String,
    pub city: String,
    pub products: Vec<OrderLineRequest>,
}

impl CustomerOrderRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_text("name", &self.name, 100)?;
        require_email(&self.email)?;
        require_text("phone", &self.phone, 15)?;
        require_text("zipcode", &self.zipcode, 10)?;
        require_text("house_number", &self.house_number, 10)?;
        require_text("address", &self.address, 200)?;
        require_text("city", &self.city, 50)?;
        if self.products.is_empty() {
            return Err(AppError::BadRequest("products must not be empty".into()));
        }
        for line in &self.products {
            require_text("product", &line.product, 50)?;
            require_positive("quantity", i64::from(line.quantity))?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_order_needs_lines() {
        let req = CustomerOrderRequest {
            name: "Piet".into(),
            email: "piet@example.com".into(),
            phone: "0612345678".into(),
            zipcode: "1234AB".into(),
            house_number: "12".into(),
            address: "Dorpsstraat".into(),
            city: "Gouda".into(),
            products: vec![],
        };
        assert!(req.validate().is_err());
    }
}
