use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::{
    availability, categories, checkout_lines, order_items, orders, products, receipts, roles,
    users,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub cashier_number: Option<String>,
    pub customer_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserWithRole {
    #[serde(flatten)]
    pub user: User,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i32,
    pub article_number: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub image: Option<String>,
    pub color: Option<String>,
    pub height_cm: Option<i32>,
    pub width_cm: Option<i32>,
    pub depth_cm: Option<i32>,
    pub weight_gr: Option<i32>,
    pub barcode: String,
    pub stock: i32,
    pub sku: Option<String>,
    pub user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductWithCategories {
    #[serde(flatten)]
    pub product: Product,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryWithProducts {
    #[serde(flatten)]
    pub category: Category,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutLine {
    pub id: i32,
    pub register_id: String,
    pub article_number: i64,
    pub name: String,
    pub price: i64,
    pub quantity: i32,
    pub user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Receipt {
    pub id: i32,
    pub register_id: String,
    pub user_id: Option<i32>,
    pub data: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Availability {
    pub id: i32,
    pub user_id: i32,
    pub absence: String,
    pub start_time: DateTime<Utc>,
    pub finish_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: i32,
    pub user_id: Option<i32>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub zipcode: Option<String>,
    pub house_number: Option<String>,
    pub city: Option<String>,
    pub total: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            last_name: model.last_name,
            email: model.email,
            city: model.city,
            phone: model.phone,
            birthday: model.birthday,
            cashier_number: model.cashier_number,
            customer_number: model.customer_number,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<roles::Model> for Role {
    fn from(model: roles::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            article_number: model.article_number,
            name: model.name,
            description: model.description,
            price: model.price,
            image: model.image,
            color: model.color,
            height_cm: model.height_cm,
            width_cm: model.width_cm,
            depth_cm: model.depth_cm,
            weight_gr: model.weight_gr,
            barcode: model.barcode,
            stock: model.stock,
            sku: model.sku,
            user_id: model.user_id,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            user_id: model.user_id,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<checkout_lines::Model> for CheckoutLine {
    fn from(model: checkout_lines::Model) -> Self {
        Self {
            id: model.id,
            register_id: model.register_id,
            article_number: model.article_number,
            name: model.name,
            price: model.price,
            quantity: model.quantity,
            user_id: model.user_id,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<receipts::Model> for Receipt {
    fn from(model: receipts::Model) -> Self {
        Self {
            id: model.id,
            register_id: model.register_id,
            user_id: model.user_id,
            data: model.data,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<availability::Model> for Availability {
    fn from(model: availability::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            absence: model.absence,
            start_time: model.start_time.with_timezone(&Utc),
            finish_time: model.finish_time.with_timezone(&Utc),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            address: model.address,
            zipcode: model.zipcode,
            house_number: model.house_number,
            city: model.city,
            total: model.total,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            quantity: model.quantity,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
