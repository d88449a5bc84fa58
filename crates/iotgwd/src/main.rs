//! iotgwd - IoT gateway daemon
//!
//! Bridges constrained sensor/actuator nodes to a relational store and
//! exposes the registration/discovery API.
//!
//! Usage:
//!   iotgwd [config.toml]
//!
//! If no config file is provided, built-in defaults are used (listen on
//! 0.0.0.0:5683, SQLite database `iotgw.db` in the working directory).

mod command;
mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use iotgw_api::{create_router, AppState};
use iotgw_observe::{HttpObserveTransport, ObservationManager};
use iotgw_store::Store;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::command::ButtonDispatcher;
use crate::config::GatewayConfig;

/// Parsed command-line arguments
struct Args {
    /// Daemon config file (TOML)
    config_path: Option<String>,
}

fn parse_args() -> Args {
    let mut result = Args { config_path: None };

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                // Positional argument = config file
                result.config_path = Some(arg.to_string());
            }
            _ => {
                tracing::warn!("Unknown argument: {}", arg);
            }
        }
    }

    result
}

fn print_help() {
    eprintln!(
        r#"iotgwd - IoT gateway daemon

Usage: iotgwd [OPTIONS] [config.toml]

Options:
  -h, --help    Print this help message

Examples:
  # Run with built-in defaults
  iotgwd

  # Run with a config file
  iotgwd gateway.toml
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iotgwd=info,iotgw_api=info,iotgw_observe=info,iotgw_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting iotgwd (IoT gateway daemon)");

    let args = parse_args();
    let config = GatewayConfig::load(args.config_path.as_deref())?;

    // Storage: explicit pool lifecycle, shared by registry and persistence
    let pool = iotgw_store::connect(&config.database).await?;
    let store = Arc::new(Store::new(pool));
    store.migrate().await?;

    let client = reqwest::Client::new();
    let transport = Arc::new(HttpObserveTransport::new(client.clone(), config.node_port));
    let observations = Arc::new(ObservationManager::new(transport, store.clone()));
    let commands = Arc::new(ButtonDispatcher::new(client));

    let state = AppState::new(
        store.clone(),
        observations.clone(),
        commands,
        config.node_port,
    );
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(bind = %config.bind, "gateway API listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // Tear down every observe relation before closing the pool
    observations.shutdown().await;
    store.close().await;
    tracing::info!("iotgwd stopped");

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
}
