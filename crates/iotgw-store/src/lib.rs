//! iotgw-store - SQL-backed node directory and sample persistence
//!
//! Implements the gateway's two storage capabilities over a pooled SQLite
//! connection: the node directory ([`iotgw_core::NodeDirectory`]) and the
//! fixed-shape measurement tables ([`iotgw_core::SamplePersistence`]).
//!
//! The pool is an explicit dependency with its own lifecycle: created at
//! startup from [`DbConfig`], one connection acquired and released per
//! operation, closed at shutdown via [`Store::close`].

pub mod persistence;
pub mod pool;
pub mod registry;

pub use pool::{connect, DbConfig};

use iotgw_core::{GatewayError, GatewayResult};
use sqlx::SqlitePool;

/// Schema bootstrap: the four fixed record shapes.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS iot_nodes (
        address TEXT PRIMARY KEY,
        resource_exposed TEXT NOT NULL,
        registered_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS temphum_sensor (
        temperature REAL NOT NULL,
        humidity REAL NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS co_sensor (
        co REAL NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS hvac_actuator (
        status BOOLEAN NOT NULL
    )",
];

/// Handle to the relational store shared by all gateway subsystems
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the node directory and measurement tables if absent
    pub async fn migrate(&self) -> GatewayResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
        }
        tracing::debug!("store schema ready");
        Ok(())
    }

    /// Underlying pool, exposed for integration tests and shutdown wiring
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool, waiting for in-flight operations to finish
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

pub(crate) fn db_err(err: sqlx::Error) -> GatewayError {
    GatewayError::Storage(err.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use tempfile::NamedTempFile;

    use super::*;

    /// On-disk temp database; the file handle must outlive the store.
    pub(crate) async fn open_test_store() -> (Store, NamedTempFile) {
        let db = NamedTempFile::new().unwrap();
        let config = DbConfig {
            url: format!("sqlite://{}?mode=rwc", db.path().display()),
            max_connections: 4,
            acquire_timeout_secs: 5,
        };
        let store = Store::new(connect(&config).await.unwrap());
        store.migrate().await.unwrap();
        (store, db)
    }

    #[tokio::test]
    async fn migrate_is_idempotent() {
        let (store, _db) = open_test_store().await;
        store.migrate().await.unwrap();
    }
}
