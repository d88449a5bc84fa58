//! Node discovery handler

use axum::extract::{Query, State};
use iotgw_core::ResourceType;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for a discovery request
#[derive(Debug, Deserialize)]
pub struct DiscoveryQuery {
    #[serde(default)]
    requested_resource: Option<String>,
}

/// GET /discovery?requested_resource=<type>
/// Responds with the owning node's address as plain text.
pub async fn discover_node(
    State(state): State<AppState>,
    Query(query): Query<DiscoveryQuery>,
) -> Result<String, ApiError> {
    let tag = query
        .requested_resource
        .ok_or_else(|| ApiError::BadRequest("Requested Resource parameter missing".to_string()))?;
    let resource = ResourceType::from_tag(&tag)
        .ok_or_else(|| ApiError::BadRequest("Requested Resource parameter empty".to_string()))?;

    match state.registry.discover(resource).await? {
        Some(address) => Ok(address),
        None => Err(ApiError::NotFound(format!(
            "no node exposes resource: {resource}"
        ))),
    }
}
