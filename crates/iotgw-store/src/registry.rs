//! Node directory: upsert and lookup of (address, resource type) pairs

use async_trait::async_trait;
use chrono::Utc;
use iotgw_core::{GatewayResult, NodeDirectory, ResourceType};

use crate::{db_err, Store};

#[async_trait]
impl NodeDirectory for Store {
    async fn register(&self, address: &str, resource: ResourceType) -> GatewayResult<()> {
        sqlx::query(
            "INSERT INTO iot_nodes (address, resource_exposed, registered_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(address) DO UPDATE SET
                 resource_exposed = excluded.resource_exposed,
                 registered_at = excluded.registered_at",
        )
        .bind(address)
        .bind(resource.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        tracing::info!(%address, %resource, "node registered");
        Ok(())
    }

    /// Returns the most-recently-registered owner of the resource type.
    /// The address is the secondary sort key so equal timestamps still
    /// resolve deterministically.
    async fn discover(&self, resource: ResourceType) -> GatewayResult<Option<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT address FROM iot_nodes
             WHERE resource_exposed = ?1
             ORDER BY registered_at DESC, address ASC
             LIMIT 1",
        )
        .bind(resource.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }
}

#[cfg(test)]
mod tests {
    use iotgw_core::{NodeDirectory, ResourceType};

    use crate::tests::open_test_store;

    #[tokio::test]
    async fn discover_returns_registered_address() {
        let (store, _db) = open_test_store().await;

        store
            .register("2001:db8::1", ResourceType::Hvac)
            .await
            .unwrap();

        let found = store.discover(ResourceType::Hvac).await.unwrap();
        assert_eq!(found.as_deref(), Some("2001:db8::1"));
    }

    #[tokio::test]
    async fn discover_misses_unregistered_type() {
        let (store, _db) = open_test_store().await;

        store.register("10.0.0.1", ResourceType::Co).await.unwrap();

        assert_eq!(store.discover(ResourceType::Hvac).await.unwrap(), None);
    }

    #[tokio::test]
    async fn reregistration_overwrites_instead_of_accumulating() {
        let (store, _db) = open_test_store().await;

        store.register("10.0.0.7", ResourceType::Co).await.unwrap();
        store
            .register("10.0.0.7", ResourceType::Hvac)
            .await
            .unwrap();

        // Exactly one record, reflecting the second resource type
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM iot_nodes")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(store.discover(ResourceType::Co).await.unwrap(), None);
        assert_eq!(
            store.discover(ResourceType::Hvac).await.unwrap().as_deref(),
            Some("10.0.0.7")
        );
    }

    #[tokio::test]
    async fn discover_prefers_most_recently_registered_owner() {
        let (store, _db) = open_test_store().await;

        store.register("10.0.0.1", ResourceType::Co).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.register("10.0.0.2", ResourceType::Co).await.unwrap();

        assert_eq!(
            store.discover(ResourceType::Co).await.unwrap().as_deref(),
            Some("10.0.0.2")
        );
    }
}
