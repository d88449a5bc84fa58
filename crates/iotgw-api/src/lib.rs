//! iotgw-api - HTTP layer for node registration and discovery
//!
//! Two endpoints, matching what constrained nodes speak:
//!
//! - `POST /register` - body is the raw resource-type tag; the node's
//!   address comes from the transport layer, not the payload
//! - `GET /discovery?requested_resource=<type>` - plain-text address of one
//!   current owner of the type
//!
//! Handlers are thin: they validate input, call the capability traits held
//! in [`AppState`], and translate [`iotgw_core::GatewayError`] into HTTP
//! responses via [`ApiError`].

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the gateway router with the given application state
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(|| async { "OK" }))
        .route("/register", post(handlers::registration::register_node))
        .route("/discovery", get(handlers::discovery::discover_node))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
