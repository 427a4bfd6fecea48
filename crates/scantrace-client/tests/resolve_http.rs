//! End-to-end resolution tests against a local lookup endpoint.
//!
//! A small axum server plays the remote service so every row of the
//! classification matrix is exercised over real HTTP: success JSON,
//! failure JSON with a message, plain-text bodies on both status classes,
//! and a transport fault against a dead port.

use std::net::SocketAddr;

use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use scantrace_client::{ClientConfig, ResolutionClient, Resolver};
use scantrace_core::{normalize, InputOrigin, LookupOutcome, RawInput};

/// Lookup endpoint double: routes behavior on the submitted key.
async fn scan_handler(headers: HeaderMap, Json(body): Json<Value>) -> axum::response::Response {
    let key = body
        .get("data")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match key.as_str() {
        "missing" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "not found"})),
        )
            .into_response(),
        "broken" => (StatusCode::BAD_GATEWAY, "upstream fell over").into_response(),
        "plain" => (StatusCode::OK, "plain text").into_response(),
        "authed" => {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            Json(json!({"id": key, "auth": auth})).into_response()
        }
        _ => Json(json!({
            "id": key,
            "name": "Tulsi",
            "origin": {"farmer": "Asha", "location": "Pune"}
        }))
        .into_response(),
    }
}

async fn spawn_lookup_service() -> SocketAddr {
    let app = Router::new().route("/scan", post(scan_handler));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> ResolutionClient {
    let mut config = ClientConfig::default();
    config.lookup.base_url = Some(format!("http://{}", addr));
    ResolutionClient::new(&config).unwrap()
}

fn key(text: &str) -> scantrace_core::CanonicalKey {
    normalize(&RawInput::new(text, InputOrigin::ManualPaste))
}

#[tokio::test]
async fn success_status_with_json_body_yields_payload() {
    let addr = spawn_lookup_service().await;
    let client = client_for(addr);

    let outcome = client.resolve(&key("herb_9c1")).await;

    match outcome {
        LookupOutcome::Success(payload) => {
            assert_eq!(payload["id"], "herb_9c1");
            assert_eq!(payload["origin"]["farmer"], "Asha");
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn failure_status_with_message_field_yields_that_message() {
    let addr = spawn_lookup_service().await;
    let client = client_for(addr);

    let outcome = client.resolve(&key("missing")).await;
    assert_eq!(outcome, LookupOutcome::Failure("not found".to_string()));
}

#[tokio::test]
async fn failure_status_with_plain_body_yields_body_text() {
    let addr = spawn_lookup_service().await;
    let client = client_for(addr);

    let outcome = client.resolve(&key("broken")).await;
    assert_eq!(
        outcome,
        LookupOutcome::Failure("upstream fell over".to_string())
    );
}

#[tokio::test]
async fn success_status_with_plain_body_wraps_raw_text() {
    let addr = spawn_lookup_service().await;
    let client = client_for(addr);

    let outcome = client.resolve(&key("plain")).await;
    assert_eq!(
        outcome,
        LookupOutcome::Success(json!({"raw": "plain text"}))
    );
}

#[tokio::test]
async fn auth_token_from_login_collaborator_rides_along() {
    let addr = spawn_lookup_service().await;
    let mut config = ClientConfig::default();
    config.lookup.base_url = Some(format!("http://{}", addr));
    config.lookup.auth_token = Some("sesame".to_string());
    let client = ResolutionClient::new(&config).unwrap();

    let outcome = client.resolve(&key("authed")).await;
    match outcome {
        LookupOutcome::Success(payload) => assert_eq!(payload["auth"], "Bearer sesame"),
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_host_yields_failure_not_panic() {
    // Bind and immediately drop a listener so the port is dead
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr);
    let outcome = client.resolve(&key("herb_9c1")).await;

    match outcome {
        LookupOutcome::Failure(message) => assert!(!message.is_empty()),
        other => panic!("expected transport failure, got {:?}", other),
    }
}

#[tokio::test]
async fn scanned_url_resolves_through_normalizer_and_wire() {
    // The full pipeline shape: a scanned product URL ends up as its last
    // path segment in the outbound {"data": ...} body.
    let addr = spawn_lookup_service().await;
    let client = client_for(addr);

    let outcome = client
        .resolve(&key("https://trace.example.com/p/herb_42"))
        .await;

    match outcome {
        LookupOutcome::Success(payload) => assert_eq!(payload["id"], "herb_42"),
        other => panic!("expected success, got {:?}", other),
    }
}
