use std::env;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub inventory: InventoryConfig,
}

/// Remote inventory API ("Kuin") settings.
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    pub base_url: String,
    pub token: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let jwt_ttl_hours = env::var("JWT_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|h| *h > 0)
            .unwrap_or(24);
        let inventory = InventoryConfig {
            base_url: env::var("KUIN_API_URL")
                .unwrap_or_else(|_| "https://kuin.summaict.nl/api".to_string()),
            token: env::var("KUIN_TOKEN").ok().filter(|t| !t.is_empty()),
        };
        Ok(Self {
            port,
            database_url,
            host,
            db_max_connections,
            jwt_secret,
            jwt_ttl_hours,
            inventory,
        })
    }
}
