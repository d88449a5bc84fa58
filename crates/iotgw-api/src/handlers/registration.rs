//! Node registration handler
//!
//! A node announces the single resource type it exposes; the gateway records
//! it and, depending on the type, starts observing the node or arms the
//! command dispatcher with the node's actuator endpoint. Both side effects
//! are fire-and-forget: the registration response never waits on the node.

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use iotgw_core::ResourceType;
use iotgw_observe::resource_url;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /register
/// Body: raw text resource-type tag. Source address comes from the socket.
pub async fn register_node(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let tag = std::str::from_utf8(&body)
        .map_err(|_| ApiError::BadRequest("resource type must be UTF-8 text".to_string()))?;
    let resource = ResourceType::from_tag(tag)
        .ok_or_else(|| ApiError::BadRequest("resource type missing".to_string()))?;

    // Nodes are addressed by IP only; they all serve on the well-known port
    let address = peer.ip().to_string();

    state.registry.register(&address, resource).await?;

    if resource.is_observed() {
        state.observations.start_observing(&address, resource).await;
    } else if resource == ResourceType::Movement {
        let url = resource_url(&address, state.node_port, resource);
        info!(%address, %url, "arming command dispatcher");
        state.commands.arm(url);
    }

    Ok(StatusCode::CREATED)
}
