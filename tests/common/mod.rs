#![allow(dead_code)]

use retail_backend::{
    config::{AppConfig, InventoryConfig},
    db::{create_pool, orm_from_pool, run_migrations},
    dto::roles::AssignRoleRequest,
    entity::{products::ActiveModel as ProductActive, users::ActiveModel as UserActive},
    middleware::auth::AuthUser,
    models::Product,
    services::role_service,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};

/// Connection string for integration tests, or `None` to skip them.
pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
            None
        }
    }
}

pub async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url, 5).await?;
    run_migrations(&pool).await?;
    let orm = orm_from_pool(&pool);
    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        db_max_connections: 5,
        jwt_secret: "integration-secret".into(),
        jwt_ttl_hours: 1,
        inventory: InventoryConfig {
            base_url: "http://127.0.0.1:1/api".into(),
            token: None,
        },
    };
    AppState::new(pool, orm, config)
}

/// Random suffix so tests sharing a database never collide.
pub fn unique() -> u32 {
    rand::random::<u32>() % 1_000_000_000
}

pub fn admin() -> AuthUser {
    AuthUser {
        user_id: 0,
        role: "superadmin".into(),
    }
}

pub async fn create_user(state: &AppState, name: &str, role: &str) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: NotSet,
        name: Set(name.to_string()),
        last_name: Set("Test".into()),
        email: Set(format!("{name}-{}@example.com", unique())),
        password_hash: Set("not-a-real-hash".into()),
        city: Set(None),
        phone: Set(None),
        birthday: Set(None),
        cashier_number: Set(None),
        customer_number: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    role_service::assign_role(
        state,
        &admin(),
        user.id,
        AssignRoleRequest {
            name: role.to_string(),
        },
    )
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role: role.to_string(),
    })
}

pub async fn create_product(
    state: &AppState,
    name: &str,
    price: i64,
    stock: i32,
) -> anyhow::Result<Product> {
    let n = unique();
    let product = ProductActive {
        id: NotSet,
        article_number: Set(10_000_000_000 + i64::from(n)),
        name: Set(name.to_string()),
        description: Set(None),
        price: Set(price),
        image: Set(None),
        color: Set(None),
        height_cm: Set(None),
        width_cm: Set(None),
        depth_cm: Set(None),
        weight_gr: Set(None),
        barcode: Set(format!("99{:011}", n)),
        stock: Set(stock),
        sku: Set(None),
        user_id: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(product.into())
}
