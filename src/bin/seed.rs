use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use retail_backend::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    identifiers::{cashier_number, sku_for_category},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, 2).await?;
    run_migrations(&pool).await?;

    let admin_id = ensure_user(&pool, "Beheer", "admin@example.com", "admin123", "superadmin").await?;
    let cashier_id =
        ensure_user(&pool, "Kassa", "kassa@example.com", "kassa123", "kassamedewerker").await?;
    sqlx::query("UPDATE users SET cashier_number = $1 WHERE id = $2")
        .bind(cashier_number(cashier_id))
        .bind(cashier_id)
        .execute(&pool)
        .await?;

    seed_catalog(&pool, admin_id).await?;

    println!("Seed completed. Admin ID: {admin_id}, Cashier ID: {cashier_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<i32> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let (user_id,): (i32,) = sqlx::query_as(
        r#"
        INSERT INTO users (name, last_name, email, password_hash)
        VALUES ($1, 'Demo', $2, $3)
        ON CONFLICT (email) DO UPDATE SET updated_at = now()
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    sqlx::query("DELETE FROM role_user WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    sqlx::query(
        r#"
        INSERT INTO role_user (user_id, role_id)
        SELECT $1, id FROM roles WHERE name = $2
        "#,
    )
    .bind(user_id)
    .bind(role)
    .execute(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_catalog(pool: &sqlx::PgPool, owner_id: i32) -> anyhow::Result<()> {
    // (category, article number, name, price in cents, barcode, stock)
    let products = [
        ("Kamerplanten", 1001_i64, "Ficus Benjamina", 1499_i64, "8712345000011", 25),
        ("Kamerplanten", 1002, "Monstera Deliciosa", 2495, "8712345000028", 12),
        ("Tuinplanten", 2001, "Lavendel", 399, "8712345000035", 60),
        ("Potten", 3001, "Terracotta pot 20cm", 699, "8712345000042", 40),
        ("Potten", 3002, "Keramiek pot wit", 1250, "8712345000059", 0),
    ];

    for (category, article_number, name, price, barcode, stock) in products {
        let (category_id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO categories (name, user_id) VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET updated_at = now()
            RETURNING id
            "#,
        )
        .bind(category)
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

        let (product_id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO products (article_number, name, description, price, barcode, stock, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (article_number) DO UPDATE SET updated_at = now()
            RETURNING id
            "#,
        )
        .bind(article_number)
        .bind(name)
        .bind(format!("{name} uit het {category} assortiment"))
        .bind(price)
        .bind(barcode)
        .bind(stock)
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO product_categories (product_id, category_id) VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(product_id)
        .bind(category_id)
        .execute(pool)
        .await?;

        sqlx::query("UPDATE products SET sku = $1 WHERE id = $2")
            .bind(sku_for_category(category, name, product_id))
            .bind(product_id)
            .execute(pool)
            .await?;
    }

    println!("Seeded catalogue");
    Ok(())
}
