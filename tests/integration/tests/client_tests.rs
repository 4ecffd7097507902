//! Admin client integration tests
//!
//! Each test starts its own in-process gateway on an ephemeral port.
//!
//! Run with: cargo test -p integration-tests --test client_tests

use std::sync::Arc;
use std::time::Duration;

use admin_client::{
    message_types, AdminClient, ClientError, ClientOptions, ConnectionEvent, FileTokenStore,
    MemoryTokenStore, ReconnectPolicy, Request, ServerError, Session, TokenStore,
};
use integration_tests::{
    unused_url, wait_until, TestGateway, ADMIN_EMAIL, ADMIN_PASSWORD, VALID_TOKEN,
};
use parking_lot::Mutex;
use serde_json::{json, Value};

fn memory_client(gateway: &TestGateway) -> AdminClient {
    AdminClient::websocket(gateway.options(), Arc::new(MemoryTokenStore::new()))
}

// ============================================================================
// Outbound queue
// ============================================================================

#[tokio::test]
async fn test_queued_request_flushes_on_connect() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let client = memory_client(&gateway);

    let products = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&products);
    let _sub = client.on_message(message_types::PRODUCTS_DATA, move |payload| {
        *sink.lock() = Some(payload);
    });

    client.request(Request::GetProducts).unwrap();
    assert_eq!(client.pending_messages(), 1);

    client.connect().await.unwrap();
    assert!(wait_until(|| products.lock().is_some()).await);

    let payload = products.lock().clone().unwrap();
    assert_eq!(payload["products"][0]["name"], "Masala Chai");
    assert!(payload.get("type").is_none());
    assert_eq!(gateway.frames_of_type("get_products").len(), 1);
    assert_eq!(client.pending_messages(), 0);

    client.disconnect();
}

#[tokio::test]
async fn test_frames_arrive_in_submission_order() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let client = memory_client(&gateway);

    client.subscribe("orders").unwrap();
    client.subscribe("users").unwrap();
    client.connect().await.unwrap();
    client.subscribe("notifications").unwrap();

    assert!(wait_until(|| gateway.frames().len() == 3).await);
    let channels: Vec<Value> = gateway
        .frames()
        .iter()
        .map(|frame| frame["channel"].clone())
        .collect();
    assert_eq!(channels, vec![json!("orders"), json!("users"), json!("notifications")]);

    client.disconnect();
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_credential_login_persists_token() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let client = AdminClient::websocket(gateway.options(), Arc::new(FileTokenStore::new(&path)));
    client.connect().await.unwrap();
    client.authenticate(ADMIN_EMAIL, ADMIN_PASSWORD).unwrap();

    assert!(wait_until(|| client.is_authenticated()).await);
    assert_eq!(client.cached_token().as_deref(), Some(VALID_TOKEN));

    // A fresh store over the same file sees the token
    let reopened = FileTokenStore::new(&path);
    assert_eq!(
        reopened.load("admin_token").unwrap().as_deref(),
        Some(VALID_TOKEN)
    );

    client.disconnect();
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_rejected_credentials() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let client = memory_client(&gateway);

    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    let _sub = client.on_message(message_types::ERROR, move |payload| {
        sink.lock().push(ServerError::from_payload(&payload));
    });

    client.connect().await.unwrap();
    client.authenticate(ADMIN_EMAIL, "wrong").unwrap();

    assert!(wait_until(|| !errors.lock().is_empty()).await);
    assert!(errors.lock()[0].is_authentication());
    assert!(!client.is_authenticated());
    assert!(client.cached_token().is_none());

    client.disconnect();
}

#[tokio::test]
async fn test_credential_attempts_are_rate_limited() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let client = memory_client(&gateway);
    client.connect().await.unwrap();

    for _ in 0..5 {
        client.authenticate(ADMIN_EMAIL, "wrong").unwrap();
    }
    let err = client.authenticate(ADMIN_EMAIL, ADMIN_PASSWORD).unwrap_err();
    assert!(matches!(err, ClientError::RateLimited { .. }));

    assert!(wait_until(|| gateway.frames_of_type("authenticate").len() == 5).await);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(gateway.frames_of_type("authenticate").len(), 5);

    client.disconnect();
}

// ============================================================================
// Dispatch
// ============================================================================

#[tokio::test]
async fn test_unknown_message_type_error_is_dispatched() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let client = memory_client(&gateway);

    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    let _errors = client.on_message(message_types::ERROR, move |payload| {
        sink.lock().push(ServerError::from_payload(&payload));
    });
    let everything = Arc::new(Mutex::new(Vec::new()));
    let all = Arc::clone(&everything);
    let _any = client.on_any(move |raw| all.lock().push(raw));

    client.connect().await.unwrap();
    client.send(&json!({"type": "foo"})).unwrap();

    assert!(wait_until(|| !errors.lock().is_empty()).await);
    let error = errors.lock()[0].clone();
    assert_eq!(error.message, "Unknown message type: foo");
    assert!(error.is_unknown_message_type());

    assert!(wait_until(|| !everything.lock().is_empty()).await);
    assert_eq!(everything.lock()[0]["type"], "error");

    client.disconnect();
}

// ============================================================================
// Reconnect
// ============================================================================

#[tokio::test]
async fn test_reconnect_restores_session() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let client = memory_client(&gateway);
    let _session = Session::attach(&client);
    let mut events = client.events();

    client.connect().await.unwrap();
    client.authenticate(ADMIN_EMAIL, ADMIN_PASSWORD).unwrap();
    assert!(wait_until(|| client.is_authenticated()).await);
    assert!(wait_until(|| gateway.connections() == 1).await);

    gateway.drop_connections();

    let reconnected = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match events.recv().await {
                Ok(ConnectionEvent::Reconnected { attempt }) => break attempt,
                Ok(_) => {}
                Err(e) => panic!("event stream failed: {e}"),
            }
        }
    })
    .await
    .expect("no reconnect");
    assert_eq!(reconnected, 1);

    assert!(wait_until(|| gateway.frames_of_type("authenticate").len() == 2).await);
    let reauth = &gateway.frames_of_type("authenticate")[1];
    assert_eq!(reauth["payload"], json!({"token": VALID_TOKEN}));
    assert!(wait_until(|| client.is_authenticated()).await);
    assert_eq!(gateway.connections(), 2);

    client.disconnect();
}

#[tokio::test]
async fn test_no_reconnect_after_disconnect() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let client = memory_client(&gateway);

    let statuses = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&statuses);
    client.on_connection(move |connected| sink.lock().push(connected));

    client.connect().await.unwrap();
    assert!(wait_until(|| gateway.connections() == 1).await);
    client.disconnect();

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(gateway.connections(), 1);
    assert!(!client.is_connected());
    assert_eq!(*statuses.lock(), vec![true, false]);
}

#[tokio::test]
async fn test_server_normal_close_does_not_reconnect() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let client = memory_client(&gateway);

    client.connect().await.unwrap();
    assert!(wait_until(|| gateway.connections() == 1).await);
    gateway.close_connections(1000);

    assert!(wait_until(|| !client.is_connected()).await);
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(gateway.connections(), 1);
}

#[tokio::test]
async fn test_server_restart_close_reconnects() {
    let gateway = TestGateway::start().await.expect("Failed to start gateway");
    let client = memory_client(&gateway);

    client.connect().await.unwrap();
    assert!(wait_until(|| gateway.connections() == 1).await);
    gateway.close_connections(1012);

    assert!(wait_until(|| gateway.connections() == 2).await);
    assert!(wait_until(|| client.is_connected()).await);

    client.disconnect();
}

#[tokio::test]
async fn test_failed_connect_is_not_retried() {
    let options = ClientOptions::new(unused_url().unwrap())
        .with_reconnect(ReconnectPolicy::new(3, Duration::from_millis(50)));
    let client = AdminClient::websocket(options, Arc::new(MemoryTokenStore::new()));
    let mut events = client.events();

    let err = client.connect().await.unwrap_err();
    assert!(matches!(err, ClientError::Connect(_)));

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(events.try_recv().is_err());
    assert!(!client.is_connected());

    // Messages still queue for a later connect
    client.request(Request::GetShopStatus).unwrap();
    assert_eq!(client.pending_messages(), 1);
}
