//! End-to-end tests for the gateway
//!
//! Full stack in one process: real router, real observe transport over HTTP,
//! real SQLite store, scripted fake node. Run with:
//! `cargo test -p iotgw-tests --test gateway_e2e`

use iotgw_core::ResourceType;
use iotgw_tests::Harness;
use reqwest::StatusCode;

#[tokio::test]
async fn hvac_notification_lands_in_the_actuator_table() {
    let harness = Harness::start().await;

    let response = harness.register("hvac").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Registry holds (127.0.0.1, hvac)
    let discovered = harness.discover("?requested_resource=hvac").await;
    assert_eq!(discovered.status(), StatusCode::OK);
    assert_eq!(discovered.text().await.unwrap(), "127.0.0.1");

    harness.wait_active(ResourceType::Hvac).await;
    harness.notify("hvac", r#"{"bn":"hvac","bv":true}"#);
    harness.wait_rows("hvac_actuator", 1).await;

    let status: bool = sqlx::query_scalar("SELECT status FROM hvac_actuator")
        .fetch_one(harness.store.pool())
        .await
        .unwrap();
    assert!(status);
}

#[tokio::test]
async fn registration_echo_inserts_no_row() {
    let harness = Harness::start().await;

    harness.register("co").await;
    harness.wait_active(ResourceType::Co).await;

    // The node's own registration echo, then a real measurement
    harness.notify("co", r#"{"v":-100000}"#);
    harness.notify("co", r#"{"v":150000}"#);
    harness.wait_rows("co_sensor", 1).await;

    // FIFO within the relation: had the echo been persisted, it would have
    // landed before the measurement
    let values: Vec<f64> = sqlx::query_scalar("SELECT co FROM co_sensor")
        .fetch_all(harness.store.pool())
        .await
        .unwrap();
    assert_eq!(values, vec![1.5]);
}

#[tokio::test]
async fn concurrent_relations_do_not_cross_contaminate() {
    let harness = Harness::start().await;

    harness.register("co").await;
    harness.wait_active(ResourceType::Co).await;
    harness.register("hvac").await;
    harness.wait_active(ResourceType::Hvac).await;

    harness.notify("co", r#"{"v":80000}"#);
    harness.notify("hvac", r#"{"bv":false}"#);
    harness.wait_rows("co_sensor", 1).await;
    harness.wait_rows("hvac_actuator", 1).await;

    // Each sample went to its own table, nothing leaked across
    let co: f64 = sqlx::query_scalar("SELECT co FROM co_sensor")
        .fetch_one(harness.store.pool())
        .await
        .unwrap();
    let status: bool = sqlx::query_scalar("SELECT status FROM hvac_actuator")
        .fetch_one(harness.store.pool())
        .await
        .unwrap();
    assert_eq!(co, 0.8);
    assert!(!status);
    assert_eq!(harness.count_rows("temphum_sensor").await, 0);
}

#[tokio::test]
async fn temphum_notification_fills_both_columns() {
    let harness = Harness::start().await;

    harness.register("temperatureandhumidity").await;
    harness.wait_active(ResourceType::TemperatureAndHumidity).await;

    harness.notify(
        "temperatureandhumidity",
        r#"{"bn":"temphum","v":2150000,"v":6400000}"#,
    );
    harness.wait_rows("temphum_sensor", 1).await;

    let (temperature, humidity): (f64, f64) =
        sqlx::query_as("SELECT temperature, humidity FROM temphum_sensor")
            .fetch_one(harness.store.pool())
            .await
            .unwrap();
    assert_eq!(temperature, 21.5);
    assert_eq!(humidity, 64.0);
}

#[tokio::test]
async fn registering_movement_arms_the_command_dispatcher() {
    let harness = Harness::start().await;

    let response = harness.register("movement").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    assert_eq!(
        harness.commands.armed(),
        Some(format!("http://127.0.0.1:{}/movement", harness.node_port))
    );
    // Movement nodes are never observed
    assert_eq!(
        harness
            .observations
            .status("127.0.0.1", ResourceType::Movement)
            .await,
        None
    );
}

#[tokio::test]
async fn reregistration_keeps_a_single_node_record() {
    let harness = Harness::start().await;

    harness.register("co").await;
    harness.register("hvac").await;

    // One record for the address, reflecting the second type
    assert_eq!(harness.count_rows("iot_nodes").await, 1);
    let miss = harness.discover("?requested_resource=co").await;
    assert_eq!(miss.status(), StatusCode::NOT_FOUND);
    let hit = harness.discover("?requested_resource=hvac").await;
    assert_eq!(hit.text().await.unwrap(), "127.0.0.1");
}

#[tokio::test]
async fn discovery_without_parameter_is_a_bad_request() {
    let harness = Harness::start().await;

    let response = harness.discover("").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn discovery_for_an_unregistered_type_is_not_found() {
    let harness = Harness::start().await;

    let response = harness.discover("?requested_resource=co").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_registration_payload_is_a_bad_request() {
    let harness = Harness::start().await;

    let response = harness.register("").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(harness.count_rows("iot_nodes").await, 0);
}

#[tokio::test]
async fn stopping_an_observation_halts_persistence() {
    let harness = Harness::start().await;

    harness.register("co").await;
    harness.wait_active(ResourceType::Co).await;
    harness.notify("co", r#"{"v":100000}"#);
    harness.wait_rows("co_sensor", 1).await;

    harness
        .observations
        .stop_observing("127.0.0.1", ResourceType::Co)
        .await;
    harness.notify("co", r#"{"v":200000}"#);
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    assert_eq!(harness.count_rows("co_sensor").await, 1);
}
