//! iotgw-observe - Observe relation lifecycle and notification pipeline
//!
//! One relation exists per observed (address, resource type) pair. Each
//! relation runs its own task that subscribes through the
//! [`ObserveTransport`], decodes every notification, and hands real
//! measurements to the persistence layer. The manager owns an explicit
//! registry of relations so cancellation and inspection never depend on
//! holding a live subscription reference.
//!
//! State machine per relation:
//!
//! ```text
//! Created ──subscribe ok──▶ Active ──stop_observing──▶ Cancelled
//!    │                        │
//!    └──subscribe failed──────┴──transport error──────▶ Errored
//! ```
//!
//! `Cancelled` and `Errored` are terminal; the gateway never resubscribes.

pub mod transport;

pub use transport::{resource_url, HttpObserveTransport};

use std::collections::HashMap;
use std::sync::Arc;

use iotgw_core::{
    is_registration_echo, senml, GatewayError, ObserveTransport, ResourceType, SamplePersistence,
};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Lifecycle state of one observe relation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationStatus {
    /// Relation exists, subscription not yet established
    Created,
    /// Subscription open, notifications flowing
    Active,
    /// Explicitly stopped; terminal
    Cancelled,
    /// Subscription failed or the transport broke; terminal
    Errored,
}

type RelationKey = (String, ResourceType);

struct Relation {
    status: Arc<Mutex<RelationStatus>>,
    task: JoinHandle<()>,
}

impl Relation {
    /// Tear the relation down. Aborting and then awaiting the task
    /// guarantees no further persistence call happens for this relation
    /// once `cancel` returns.
    async fn cancel(mut self) {
        self.task.abort();
        let _ = (&mut self.task).await;
        let mut status = self.status.lock();
        if matches!(*status, RelationStatus::Created | RelationStatus::Active) {
            *status = RelationStatus::Cancelled;
        }
    }
}

/// Owns every observe relation in the gateway
pub struct ObservationManager {
    transport: Arc<dyn ObserveTransport>,
    persistence: Arc<dyn SamplePersistence>,
    relations: tokio::sync::Mutex<HashMap<RelationKey, Relation>>,
}

impl ObservationManager {
    pub fn new(transport: Arc<dyn ObserveTransport>, persistence: Arc<dyn SamplePersistence>) -> Self {
        Self {
            transport,
            persistence,
            relations: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Start observing `(address, resource)`, fire-and-forget: the
    /// subscription is established on the relation's own task, so callers
    /// never wait on the node.
    ///
    /// Re-registering a pair that already has a live relation replaces it:
    /// the old relation is cancelled before the new one starts, keeping at
    /// most one relation per pair and ruling out duplicate inserts per
    /// notification.
    pub async fn start_observing(&self, address: &str, resource: ResourceType) {
        let key = (address.to_string(), resource);
        let mut relations = self.relations.lock().await;

        if let Some(existing) = relations.remove(&key) {
            info!(%address, %resource, "replacing existing observe relation");
            existing.cancel().await;
        }

        let status = Arc::new(Mutex::new(RelationStatus::Created));
        let task = tokio::spawn(run_relation(
            self.transport.clone(),
            self.persistence.clone(),
            address.to_string(),
            resource,
            status.clone(),
        ));

        relations.insert(key, Relation { status, task });
    }

    /// Stop observing `(address, resource)`. Idempotent: stopping a pair
    /// with no open relation is a no-op. When this returns, no further
    /// persistence call will occur for the relation.
    pub async fn stop_observing(&self, address: &str, resource: ResourceType) {
        let key = (address.to_string(), resource);
        let removed = self.relations.lock().await.remove(&key);
        if let Some(relation) = removed {
            relation.cancel().await;
            info!(%address, %resource, "observe relation cancelled");
        }
    }

    /// Current status of a relation, if one was ever started and not stopped
    pub async fn status(&self, address: &str, resource: ResourceType) -> Option<RelationStatus> {
        let key = (address.to_string(), resource);
        self.relations
            .lock()
            .await
            .get(&key)
            .map(|relation| *relation.status.lock())
    }

    /// Cancel every relation; used at daemon shutdown
    pub async fn shutdown(&self) {
        let mut relations = self.relations.lock().await;
        for (_, relation) in relations.drain() {
            relation.cancel().await;
        }
    }
}

async fn run_relation(
    transport: Arc<dyn ObserveTransport>,
    persistence: Arc<dyn SamplePersistence>,
    address: String,
    resource: ResourceType,
    status: Arc<Mutex<RelationStatus>>,
) {
    let mut notifications = match transport.observe(&address, resource).await {
        Ok(rx) => {
            *status.lock() = RelationStatus::Active;
            info!(%address, %resource, "observe relation active");
            rx
        }
        Err(err) => {
            *status.lock() = RelationStatus::Errored;
            warn!(%address, %resource, error = %err, "observe subscription failed");
            return;
        }
    };

    while let Some(event) = notifications.recv().await {
        match event {
            Ok(payload) => handle_notification(&*persistence, &address, resource, &payload).await,
            Err(err) => {
                *status.lock() = RelationStatus::Errored;
                warn!(%address, %resource, error = %err, "observe relation broke");
                return;
            }
        }
    }

    // The node closed the stream; without a resubscribe policy that is a
    // transport-level end of the relation.
    *status.lock() = RelationStatus::Errored;
    warn!(%address, %resource, "observe stream ended by node");
}

/// Decode one notification and persist it unless it is a registration echo.
/// Decode and persistence failures are logged and dropped; they never
/// propagate out of the relation task.
async fn handle_notification(
    persistence: &dyn SamplePersistence,
    address: &str,
    resource: ResourceType,
    payload: &[u8],
) {
    let sample = senml::decode(payload);

    if sample.is_empty() {
        debug!(%address, %resource, "dropping undecodable notification payload");
        return;
    }
    if is_registration_echo(&sample) {
        debug!(%address, %resource, "dropping registration echo");
        return;
    }

    if let Err(err) = persistence.persist(resource, &sample).await {
        match err {
            GatewayError::ArityMismatch { .. } | GatewayError::UnsupportedResource(_) => {
                warn!(%address, %resource, error = %err, "sample does not fit its table shape")
            }
            other => warn!(%address, %resource, error = %other, "failed to persist sample"),
        }
    }
}
