//! Capability traits at the gateway's seams
//!
//! Each subsystem depends on these small traits rather than on concrete
//! implementations, so the HTTP layer, the observe pipeline, and the tests
//! can all be wired against fakes.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::GatewayResult;
use crate::resource::ResourceType;
use crate::sample::SampleValue;

/// One raw notification payload (or a transport failure) from an observed
/// node. Delivery is FIFO within a single relation.
pub type NotificationReceiver = mpsc::Receiver<GatewayResult<Bytes>>;

/// Directory of registered nodes, keyed by address with last-write-wins
/// semantics.
#[async_trait]
pub trait NodeDirectory: Send + Sync {
    /// Upsert a node's declared resource type. A later registration from the
    /// same address replaces the earlier record wholesale.
    async fn register(&self, address: &str, resource: ResourceType) -> GatewayResult<()>;

    /// Address of one current owner of the given resource type, or `None`
    /// when no node exposes it.
    async fn discover(&self, resource: ResourceType) -> GatewayResult<Option<String>>;
}

/// Maps a resource type and an ordered sample to one parameterized insert.
#[async_trait]
pub trait SamplePersistence: Send + Sync {
    /// Persist one decoded sample. Each call is its own unit of work against
    /// the pooled store; the connection is released on every exit path.
    async fn persist(&self, resource: ResourceType, sample: &[SampleValue]) -> GatewayResult<()>;
}

/// Opens long-lived observe relations against node resource endpoints.
#[async_trait]
pub trait ObserveTransport: Send + Sync {
    /// Subscribe to `<address>/<resource>`. The returned channel yields one
    /// item per notification and closes when the node ends the stream.
    /// Dropping the receiver releases the underlying transport resource.
    async fn observe(
        &self,
        address: &str,
        resource: ResourceType,
    ) -> GatewayResult<NotificationReceiver>;
}

/// External command dispatcher the registration path hands actuator
/// addresses to. The interactive front-end driving it lives outside this
/// gateway core.
pub trait CommandSink: Send + Sync {
    /// Remember the latest ready-to-use resource URL for one-shot commands.
    fn arm(&self, target_url: String);
}
