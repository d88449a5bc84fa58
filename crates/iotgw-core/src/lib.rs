//! iotgw-core - Core types and capability traits for the IoT gateway
//!
//! This crate holds everything the gateway's subsystems share: the resource
//! type vocabulary, decoded sample values, the compact-encoding decoder, the
//! common error type, and the small capability traits the other crates
//! implement (node directory, sample persistence, observe transport, command
//! sink). It has no storage or HTTP dependencies of its own.

pub mod error;
pub mod resource;
pub mod sample;
pub mod senml;
pub mod traits;

pub use error::{GatewayError, GatewayResult};
pub use resource::ResourceType;
pub use sample::{is_registration_echo, SampleValue, REGISTRATION_SENTINEL};
pub use traits::{
    CommandSink, NodeDirectory, NotificationReceiver, ObserveTransport, SamplePersistence,
};
