pub mod auth_service;
pub mod availability_service;
pub mod category_service;
pub mod checkout_service;
pub mod inventory_service;
pub mod order_service;
pub mod product_service;
pub mod role_service;
pub mod user_service;
