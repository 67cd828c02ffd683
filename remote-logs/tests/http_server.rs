#![cfg(feature = "http-server")]
//! Integration tests for the pull endpoint over an in-memory store.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use remote_logs::server::build_router;
use remote_logs::server::handlers::AppState;
use remote_logs::server::metrics::Metrics;
use remote_logs::{
    CursorQueryEngine, InMemoryLogStore, LogRecord, SecretKey, SharedSecretValidator,
};
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "sk_5a1b3c4d2e6f7a8b9c0d1e2f3a4b5c6d";

fn line(n: u64) -> LogRecord {
    LogRecord {
        id: 0,
        received_at: Some(format!("2024-01-15 10:30:{:02}", n)),
        hostname: Some(format!("host-{n}")),
        facility: Some("local0".to_string()),
        message: Some(format!("message {n}")),
        port: 514,
    }
}

/// Store holding records with ids 1..=5.
async fn setup_test_app() -> (Router, Arc<InMemoryLogStore>) {
    setup_test_app_with_max_page_size(None).await
}

async fn setup_test_app_with_max_page_size(
    max_page_size: Option<usize>,
) -> (Router, Arc<InMemoryLogStore>) {
    let store = Arc::new(InMemoryLogStore::new());
    for n in 1..=5 {
        store.append(line(n)).await;
    }

    let state = AppState {
        engine: CursorQueryEngine::new(store.clone()).with_max_page_size(max_page_size),
        validator: Arc::new(SharedSecretValidator::new(&SecretKey::new(SECRET))),
        metrics: Arc::new(Metrics::new()),
    };

    (build_router(state), store)
}

fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

fn fetch_request(body: Value) -> Request<Body> {
    post_json("/api/v1/logs", body.to_string())
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let json = serde_json::from_slice(&body_bytes(response).await).unwrap();
    (status, json)
}

fn record_ids(json: &Value) -> Vec<u64> {
    json["data"]["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_fetch_all_records_from_zero_cursor() {
    let (app, _store) = setup_test_app().await;

    let body = json!({"secret_key": SECRET, "last_id": 0});
    let (status, json) = send(&app, fetch_request(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(record_ids(&json), vec![1, 2, 3, 4, 5]);
    assert_eq!(json["data"]["count"], 5);
    assert_eq!(json["data"]["total_available"], 5);
    assert_eq!(json["data"]["last_id_requested"], 0);
    assert_eq!(json["data"]["next_last_id"], 5);
}

#[tokio::test]
async fn test_fetch_records_after_cursor() {
    let (app, _store) = setup_test_app().await;

    let body = json!({"secret_key": SECRET, "last_id": 3});
    let (status, json) = send(&app, fetch_request(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(record_ids(&json), vec![4, 5]);
    assert_eq!(json["data"]["count"], 2);
    assert_eq!(json["data"]["total_available"], 2);
    assert_eq!(json["data"]["last_id_requested"], 3);
    assert_eq!(json["data"]["next_last_id"], 5);
}

#[tokio::test]
async fn test_fetch_with_no_newer_records() {
    let (app, _store) = setup_test_app().await;

    let body = json!({"secret_key": SECRET, "last_id": 5});
    let (status, json) = send(&app, fetch_request(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["records"], json!([]));
    assert_eq!(json["data"]["count"], 0);
    assert_eq!(json["data"]["total_available"], 0);
    assert!(json["data"].get("next_last_id").is_none());
}

#[tokio::test]
async fn test_missing_last_id_defaults_to_zero() {
    let (app, _store) = setup_test_app().await;

    let (status, json) = send(&app, fetch_request(json!({"secret_key": SECRET}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["count"], 5);
    assert_eq!(json["data"]["last_id_requested"], 0);
}

#[tokio::test]
async fn test_record_fields_match_wire_contract() {
    let (app, _store) = setup_test_app().await;

    let response = app
        .clone()
        .oneshot(fetch_request(json!({"secret_key": SECRET, "last_id": 4})))
        .await
        .unwrap();
    let body = String::from_utf8(body_bytes(response).await).unwrap();

    assert!(body.contains(
        r#"{"id":5,"received_at":"2024-01-15 10:30:05","hostname":"host-5","facility":"local0","message":"message 5","port":514}"#
    ));
}

#[tokio::test]
async fn test_missing_secret_key_is_rejected() {
    let (app, _store) = setup_test_app().await;

    let (status, json) = send(&app, fetch_request(json!({"last_id": 0}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        json!({"success": false, "error": "Secret key is required", "code": "MISSING_SECRET_KEY"})
    );
}

#[tokio::test]
async fn test_wrong_secret_key_is_rejected() {
    let (app, _store) = setup_test_app().await;

    let body = json!({"secret_key": "sk_wrong", "last_id": 0});
    let (status, json) = send(&app, fetch_request(body)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "INVALID_SECRET_KEY");
    assert!(json.get("data").is_none());
}

#[tokio::test]
async fn test_secret_differing_in_last_character_is_rejected() {
    let (app, _store) = setup_test_app().await;
    let mut almost = SECRET.to_string();
    almost.pop();
    almost.push('7');

    let (status, json) = send(&app, fetch_request(json!({"secret_key": almost}))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "INVALID_SECRET_KEY");
}

#[tokio::test]
async fn test_get_method_is_not_allowed() {
    let (app, _store) = setup_test_app().await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/logs")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "METHOD_NOT_ALLOWED");
}

#[tokio::test]
async fn test_put_on_legacy_alias_is_not_allowed() {
    let (app, _store) = setup_test_app().await;

    let request = Request::builder()
        .method("PUT")
        .uri("/api.php")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json["code"], "METHOD_NOT_ALLOWED");
}

#[tokio::test]
async fn test_invalid_json_is_rejected() {
    let (app, _store) = setup_test_app().await;

    let (status, json) = send(&app, post_json("/api/v1/logs", "{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid JSON format");
    assert_eq!(json["code"], "INVALID_JSON");
}

#[tokio::test]
async fn test_loosely_typed_cursor_is_coerced() {
    let (app, _store) = setup_test_app().await;
    let cases = [
        (json!(1.5), vec![2, 3, 4, 5]),
        (json!(true), vec![2, 3, 4, 5]),
        (json!("2abc"), vec![3, 4, 5]),
        (json!("abc"), vec![1, 2, 3, 4, 5]),
    ];

    for (last_id, expected) in cases {
        let body = json!({"secret_key": SECRET, "last_id": last_id});
        let (status, json) = send(&app, fetch_request(body)).await;

        assert_eq!(status, StatusCode::OK, "last_id: {last_id}");
        assert_eq!(record_ids(&json), expected, "last_id: {last_id}");
    }
}

#[tokio::test]
async fn test_negative_cursor_is_echoed_and_reads_from_start() {
    let (app, _store) = setup_test_app().await;

    let body = json!({"secret_key": SECRET, "last_id": -5});
    let (status, json) = send(&app, fetch_request(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(record_ids(&json), vec![1, 2, 3, 4, 5]);
    assert_eq!(json["data"]["last_id_requested"], -5);
    assert_eq!(json["data"]["next_last_id"], 5);
}

#[tokio::test]
async fn test_legacy_alias_serves_same_payload() {
    let (app, _store) = setup_test_app().await;
    let body = json!({"secret_key": SECRET, "last_id": 2});

    let primary = app.clone().oneshot(fetch_request(body.clone())).await.unwrap();
    let legacy = app
        .clone()
        .oneshot(post_json("/api.php", body.to_string()))
        .await
        .unwrap();

    assert_eq!(primary.status(), StatusCode::OK);
    assert_eq!(legacy.status(), StatusCode::OK);
    assert_eq!(body_bytes(primary).await, body_bytes(legacy).await);
}

#[tokio::test]
async fn test_repeated_request_returns_identical_bytes() {
    let (app, _store) = setup_test_app().await;
    let body = json!({"secret_key": SECRET, "last_id": 1});

    let first = app.clone().oneshot(fetch_request(body.clone())).await.unwrap();
    let second = app.clone().oneshot(fetch_request(body)).await.unwrap();

    assert_eq!(body_bytes(first).await, body_bytes(second).await);
}

#[tokio::test]
async fn test_polling_with_next_last_id_picks_up_new_records() {
    let (app, store) = setup_test_app().await;

    let (_, first) = send(&app, fetch_request(json!({"secret_key": SECRET}))).await;
    let cursor = first["data"]["next_last_id"].as_u64().unwrap();

    store.append(line(6)).await;
    store.append(line(7)).await;

    let body = json!({"secret_key": SECRET, "last_id": cursor});
    let (_, second) = send(&app, fetch_request(body)).await;
    assert_eq!(record_ids(&second), vec![6, 7]);
    assert_eq!(second["data"]["next_last_id"], 7);

    let (_, third) = send(&app, fetch_request(json!({"secret_key": SECRET, "last_id": 7}))).await;
    assert_eq!(third["data"]["count"], 0);
    assert!(third["data"].get("next_last_id").is_none());
}

#[tokio::test]
async fn test_request_limit_truncates_page() {
    let (app, _store) = setup_test_app().await;

    let (status, json) = send(
        &app,
        fetch_request(json!({"secret_key": SECRET, "last_id": 0, "limit": 2})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(record_ids(&json), vec![1, 2]);
    assert_eq!(json["data"]["count"], 2);
    assert_eq!(json["data"]["total_available"], 5);
    assert_eq!(json["data"]["next_last_id"], 2);
}

#[tokio::test]
async fn test_max_page_size_caps_unbounded_request() {
    let (app, _store) = setup_test_app_with_max_page_size(Some(3)).await;

    let (_, json) = send(&app, fetch_request(json!({"secret_key": SECRET}))).await;

    assert_eq!(record_ids(&json), vec![1, 2, 3]);
    assert_eq!(json["data"]["total_available"], 5);
    assert_eq!(json["data"]["next_last_id"], 3);
}

#[tokio::test]
async fn test_responses_carry_cors_headers() {
    let (app, _store) = setup_test_app().await;

    let ok = app
        .clone()
        .oneshot(fetch_request(json!({"secret_key": SECRET})))
        .await
        .unwrap();
    let rejected = app
        .clone()
        .oneshot(fetch_request(json!({"secret_key": "wrong"})))
        .await
        .unwrap();

    for response in [ok, rejected] {
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
    }
}

#[tokio::test]
async fn test_index_lists_endpoints() {
    let (app, _store) = setup_test_app().await;

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(json["endpoints"].get("POST /api/v1/logs").is_some());
    assert!(json["required_fields"].get("secret_key").is_some());
}

#[tokio::test]
async fn test_metrics_count_served_records_and_failures() {
    let (app, _store) = setup_test_app().await;

    send(&app, fetch_request(json!({"secret_key": SECRET, "last_id": 3}))).await;
    send(&app, fetch_request(json!({"secret_key": "wrong"}))).await;

    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let text = String::from_utf8(body_bytes(response).await).unwrap();

    assert!(text.contains("log_records_served_total 2"));
    assert!(text.contains(r#"log_fetch_failures_total{code="INVALID_SECRET_KEY"} 1"#));
}

#[tokio::test]
async fn test_health_and_readiness() {
    let (app, _store) = setup_test_app().await;

    for uri in ["/-/healthy", "/-/ready"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "uri: {uri}");
    }
}
