//! Application state shared across handlers

use std::sync::Arc;

use iotgw_core::{CommandSink, NodeDirectory};
use iotgw_observe::ObservationManager;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Node directory backing registration and discovery
    pub registry: Arc<dyn NodeDirectory>,
    /// Owner of all observe relations
    pub observations: Arc<ObservationManager>,
    /// External command dispatcher armed with the movement actuator's URL
    pub commands: Arc<dyn CommandSink>,
    /// Well-known port nodes serve their resource endpoints on
    pub node_port: u16,
}

impl AppState {
    pub fn new(
        registry: Arc<dyn NodeDirectory>,
        observations: Arc<ObservationManager>,
        commands: Arc<dyn CommandSink>,
        node_port: u16,
    ) -> Self {
        Self {
            registry,
            observations,
            commands,
            node_port,
        }
    }
}
