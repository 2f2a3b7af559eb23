use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{CustomerLoginRequest, LoginRequest, LoginResponse, RegisterRequest},
        availability::{AvailabilityList, CreateAvailabilityRequest, UpdateAvailabilityRequest},
        categories::{CategoryList, CreateCategoryRequest, DetachProductRequest, UpdateCategoryRequest},
        checkout::{
            CheckoutLineList, ClearedCart, CreateCheckoutLineRequest, FinalizedReceipt,
            ReceiptList,
        },
        inventory::{PlacedRemoteOrders, StoreRemoteOrderRequest, SyncedItem, SyncedOrder},
        orders::{CreateOrderRequest, CustomerOrderRequest, OrderLineRequest, OrderList, OrderWithItems},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        roles::{AssignRoleRequest, CreateRoleRequest, RoleList, UpdateRoleRequest},
        users::{CreateUserRequest, UpdateUserRequest, UserList},
    },
    inventory::{RemoteOrderDetail, RemoteOrderItem, RemoteProduct},
    models::{
        Availability, Category, CategoryWithProducts, CheckoutLine, Order, OrderItem, Product,
        ProductWithCategories, Receipt, Role, User, UserWithRole,
    },
    receipt::ReceiptTotals,
    response::{ApiResponse, Meta},
    routes::{
        auth, availability, categories, checkout, health, kuin, orders, params, products, roles,
        users,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::customer_login,
        auth::me,
        auth::refresh,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        checkout::find_by_code,
        checkout::scan_barcode,
        checkout::list_lines,
        checkout::add_line,
        checkout::remove_line,
        checkout::clear_cart,
        checkout::finalize_receipt,
        checkout::list_receipts,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        categories::detach_product,
        orders::list_orders,
        orders::get_order,
        orders::create_order,
        orders::create_customer_order,
        users::list_users,
        users::get_user,
        users::get_by_customer_number,
        users::create_user,
        users::update_user,
        users::delete_user,
        roles::list_roles,
        roles::get_role,
        roles::create_role,
        roles::update_role,
        roles::delete_role,
        roles::assign_role,
        availability::list_availability,
        availability::get_availability,
        availability::create_availability,
        availability::update_availability,
        availability::delete_availability,
        kuin::remote_products,
        kuin::remote_orders,
        kuin::remote_order,
        kuin::store_order,
        kuin::sync_order
    ),
    components(
        schemas(
            User,
            Role,
            UserWithRole,
            Product,
            ProductWithCategories,
            Category,
            CategoryWithProducts,
            CheckoutLine,
            Receipt,
            ReceiptTotals,
            Availability,
            Order,
            OrderItem,
            RegisterRequest,
            LoginRequest,
            CustomerLoginRequest,
            LoginResponse,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CreateCheckoutLineRequest,
            CheckoutLineList,
            ClearedCart,
            FinalizedReceipt,
            ReceiptList,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            DetachProductRequest,
            CategoryList,
            CreateOrderRequest,
            OrderLineRequest,
            CustomerOrderRequest,
            OrderWithItems,
            OrderList,
            CreateUserRequest,
            UpdateUserRequest,
            UserList,
            CreateRoleRequest,
            UpdateRoleRequest,
            AssignRoleRequest,
            RoleList,
            CreateAvailabilityRequest,
            UpdateAvailabilityRequest,
            AvailabilityList,
            StoreRemoteOrderRequest,
            PlacedRemoteOrders,
            SyncedItem,
            SyncedOrder,
            RemoteOrderItem,
            RemoteProduct,
            RemoteOrderDetail,
            params::Pagination,
            params::SortOrder,
            params::ProductSortBy,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<FinalizedReceipt>,
            ApiResponse<OrderWithItems>,
            ApiResponse<UserWithRole>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Product catalogue endpoints"),
        (name = "Checkout", description = "Register checkout and receipt endpoints"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Users", description = "User management endpoints"),
        (name = "Roles", description = "Role endpoints"),
        (name = "Availability", description = "Staff availability endpoints"),
        (name = "Kuin", description = "Wholesale inventory endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
