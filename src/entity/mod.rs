pub mod availability;
pub mod categories;
pub mod checkout_lines;
pub mod order_items;
pub mod orders;
pub mod product_categories;
pub mod products;
pub mod receipts;
pub mod role_user;
pub mod roles;
pub mod users;

pub use availability::Entity as Availability;
pub use categories::Entity as Categories;
pub use checkout_lines::Entity as CheckoutLines;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use product_categories::Entity as ProductCategories;
pub use products::Entity as Products;
pub use receipts::Entity as Receipts;
pub use role_user::Entity as RoleUser;
pub use roles::Entity as Roles;
pub use users::Entity as Users;
