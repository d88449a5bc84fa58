//! Common error types for gateway operations

use thiserror::Error;

use crate::resource::ResourceType;

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors that can occur in the gateway's subsystems
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Invalid or missing client input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Discovery miss - no node exposes the requested resource
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Connection or query failure against the store
    #[error("Storage error: {0}")]
    Storage(String),

    /// No table shape is mapped for this resource type
    #[error("Unsupported resource type: {0}")]
    UnsupportedResource(ResourceType),

    /// Decoded sample does not fit the target table shape
    #[error("Sample arity mismatch for {resource}: expected {expected}, got {actual}")]
    ArityMismatch {
        resource: ResourceType,
        expected: usize,
        actual: usize,
    },

    /// Transport-level failure on an observe relation
    #[error("Transport error: {0}")]
    Transport(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::InvalidRequest(_) => 400,
            GatewayError::NotFound(_) => 404,
            GatewayError::Storage(_) => 500,
            GatewayError::UnsupportedResource(_) => 500,
            GatewayError::ArityMismatch { .. } => 500,
            GatewayError::Transport(_) => 503,
            GatewayError::Internal(_) => 500,
        }
    }
}
