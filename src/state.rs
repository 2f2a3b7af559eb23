use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn},
    inventory::KuinClient,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub inventory: KuinClient,
}

impl AppState {
    pub fn new(pool: DbPool, orm: OrmConn, config: AppConfig) -> anyhow::Result<Self> {
        let inventory = KuinClient::new(&config.inventory)?;
        Ok(Self {
            pool,
            orm,
            config: Arc::new(config),
            inventory,
        })
    }
}
