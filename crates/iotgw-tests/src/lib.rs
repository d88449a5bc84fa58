//! Test harness for gateway integration tests
//!
//! Runs the full stack in-process:
//!
//! 1. A fake node server streams scripted notification lines per resource.
//! 2. The gateway (store on a temp SQLite db, HTTP observe transport, real
//!    router) listens on an ephemeral loopback port.
//! 3. Tests drive the REST API with reqwest and assert against the store.
//!
//! Both servers bind 127.0.0.1, so the source address the gateway sees for
//! a registration is also the address its observe transport dials back.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use iotgw_api::{create_router, AppState};
use iotgw_core::CommandSink;
use iotgw_observe::{HttpObserveTransport, ObservationManager};
use iotgw_store::{connect, DbConfig, Store};
use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Command sink fake recording the armed actuator URL
#[derive(Default)]
pub struct RecordingSink {
    armed: Mutex<Option<String>>,
}

impl RecordingSink {
    pub fn armed(&self) -> Option<String> {
        self.armed.lock().clone()
    }
}

impl CommandSink for RecordingSink {
    fn arm(&self, target_url: String) {
        *self.armed.lock() = Some(target_url);
    }
}

/// Full in-process gateway plus a scripted fake node
pub struct Harness {
    pub base_url: String,
    pub client: reqwest::Client,
    pub store: Arc<Store>,
    pub observations: Arc<ObservationManager>,
    pub commands: Arc<RecordingSink>,
    pub node_port: u16,
    node_lines: broadcast::Sender<(String, String)>,
    _db: NamedTempFile,
}

impl Harness {
    pub async fn start() -> Self {
        // Fake node: one streaming endpoint per resource
        let (node_lines, _) = broadcast::channel::<(String, String)>(64);
        let node_router = Router::new()
            .route("/{resource}", get(node_stream))
            .with_state(node_lines.clone());
        let node_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let node_port = node_listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(node_listener, node_router).await.unwrap();
        });

        // Gateway store on a temp database
        let db = NamedTempFile::new().unwrap();
        let config = DbConfig {
            url: format!("sqlite://{}?mode=rwc", db.path().display()),
            max_connections: 4,
            acquire_timeout_secs: 5,
        };
        let store = Arc::new(Store::new(connect(&config).await.unwrap()));
        store.migrate().await.unwrap();

        let transport = Arc::new(HttpObserveTransport::new(reqwest::Client::new(), node_port));
        let observations = Arc::new(ObservationManager::new(transport, store.clone()));
        let commands = Arc::new(RecordingSink::default());

        let state = AppState::new(
            store.clone(),
            observations.clone(),
            commands.clone(),
            node_port,
        );
        let app = create_router(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
            store,
            observations,
            commands,
            node_port,
            node_lines,
            _db: db,
        }
    }

    /// Register the fake node with the given resource-type tag
    pub async fn register(&self, tag: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/register", self.base_url))
            .body(tag.to_string())
            .send()
            .await
            .unwrap()
    }

    pub async fn discover(&self, query: &str) -> reqwest::Response {
        self.client
            .get(format!("{}/discovery{}", self.base_url, query))
            .send()
            .await
            .unwrap()
    }

    /// Stream one notification line from the fake node's resource endpoint
    pub fn notify(&self, resource: &str, payload: &str) {
        let _ = self
            .node_lines
            .send((resource.to_string(), payload.to_string()));
    }

    pub async fn wait_active(&self, resource: iotgw_core::ResourceType) {
        for _ in 0..200 {
            if self.observations.status("127.0.0.1", resource).await
                == Some(iotgw_observe::RelationStatus::Active)
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "relation for {resource} never became active (status {:?})",
            self.observations.status("127.0.0.1", resource).await
        );
    }

    pub async fn count_rows(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(self.store.pool())
            .await
            .unwrap()
    }

    pub async fn wait_rows(&self, table: &str, expected: i64) {
        for _ in 0..200 {
            if self.count_rows(table).await >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "table {table} never reached {expected} rows (has {})",
            self.count_rows(table).await
        );
    }
}

/// Fake node resource endpoint: an open-ended stream of newline-terminated
/// notification payloads scripted through the harness broadcast channel.
async fn node_stream(
    Path(resource): Path<String>,
    State(lines): State<broadcast::Sender<(String, String)>>,
) -> Body {
    let rx = lines.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |item| match item {
        Ok((target, line)) if target == resource => {
            Some(Ok::<_, Infallible>(Bytes::from(format!("{line}\n"))))
        }
        _ => None,
    });
    Body::from_stream(stream)
}
