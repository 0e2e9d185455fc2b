//! Integration test: Server API endpoints

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use regression_studio::server::{create_router, AppState, ServerConfig};
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "regression-studio-boundary";

const HOUSES: &str = "size,color,price\n\
    10,red,100\n\
    12,blue,120\n\
    15,red,150\n\
    18,blue,170\n\
    20,red,210\n\
    22,blue,230\n\
    25,red,260\n\
    28,blue,270\n";

fn test_state() -> Arc<AppState> {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_upload_size: 10 * 1024 * 1024,
    };
    Arc::new(AppState::new(config))
}

fn upload_request(csv: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"houses.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n{csv}\r\n--{b}--\r\n",
        b = BOUNDARY,
        csv = csv
    );
    Request::builder()
        .method("POST")
        .uri("/api/data/upload")
        .header("content-type", format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(state: &Arc<AppState>, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = create_router(Arc::clone(state)).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_endpoint() {
    let state = test_state();
    let (status, body) = send(&state, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["dataset_loaded"], false);
    assert_eq!(body["model_loaded"], false);
}

#[tokio::test]
async fn test_schema_without_data() {
    let state = test_state();
    let (status, body) = send(&state, get("/api/data/schema")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], true);
    assert_eq!(body["kind"], "state_missing");
}

#[tokio::test]
async fn test_model_without_training() {
    let state = test_state();
    let (status, _) = send(&state, get("/api/model")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route() {
    let state = test_state();
    let (status, _) = send(&state, get("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_then_schema() {
    let state = test_state();
    let (status, body) = send(&state, upload_request(HOUSES)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["dataset"]["rows"], 8);
    assert_eq!(body["target_options"], serde_json::json!(["size", "price"]));

    let (status, body) = send(&state, get("/api/data/schema")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["feature_options"], serde_json::json!(["size", "price", "color"]));
    assert_eq!(body["categorical_options"], serde_json::json!(["color"]));
}

#[tokio::test]
async fn test_report_endpoint() {
    let state = test_state();
    send(&state, upload_request(HOUSES)).await;

    let (status, body) = send(&state, get("/api/report?target=price&category=color")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["category_means"].is_array());
    assert!(body["correlations"].is_array());
}

#[tokio::test]
async fn test_train_and_predict() {
    let state = test_state();
    send(&state, upload_request(HOUSES)).await;

    let (status, body) = send(
        &state,
        json_request(
            "POST",
            "/api/train",
            serde_json::json!({"target": "price", "features": ["size", "color"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Model trained successfully! R^2 score: "));

    let (status, body) = send(
        &state,
        json_request(
            "POST",
            "/api/predict",
            serde_json::json!({"input": "10,green", "features": ["size", "color"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["value"].is_number());
    assert_eq!(body["warnings"][0]["kind"], "unknown_category");

    let (status, body) = send(&state, get("/api/model")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["target"], "price");
}

#[tokio::test]
async fn test_predict_mismatch_is_unprocessable() {
    let state = test_state();
    send(&state, upload_request(HOUSES)).await;
    send(
        &state,
        json_request(
            "POST",
            "/api/train",
            serde_json::json!({"target": "price", "features": ["size", "color"]}),
        ),
    )
    .await;

    let (status, body) = send(
        &state,
        json_request(
            "POST",
            "/api/predict",
            serde_json::json!({"input": "10", "features": ["size", "color"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "selection_mismatch");
}

#[tokio::test]
async fn test_train_without_target() {
    let state = test_state();
    send(&state, upload_request(HOUSES)).await;

    let (status, _) = send(
        &state,
        json_request("POST", "/api/train", serde_json::json!({"features": ["size"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_bad_upload_keeps_nothing() {
    let state = test_state();
    let (status, body) = send(&state, upload_request("")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "ingest_parse");

    let (status, _) = send(&state, get("/api/data/schema")).await;
    assert_eq!(status, StatusCode::CONFLICT);
}
