//! Connection pool configuration and setup

use std::time::Duration;

use iotgw_core::GatewayResult;
use serde::Deserialize;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::db_err;

/// Database settings, loaded from the daemon's TOML config
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// SQLite connection URL. `mode=rwc` creates the file on first run.
    pub url: String,
    /// Maximum pooled connections
    pub max_connections: u32,
    /// Seconds to wait for a free connection before failing the operation
    pub acquire_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://iotgw.db?mode=rwc".to_string(),
            max_connections: 8,
            acquire_timeout_secs: 5,
        }
    }
}

/// Open the pool described by `config`
pub async fn connect(config: &DbConfig) -> GatewayResult<SqlitePool> {
    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await
        .map_err(db_err)
}
