//! HTTP routing tests against the in-memory store.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use common::{grocery_receipt, StubOutcome, TestApp};
use serde_json::{json, Value};
use tower::util::ServiceExt;

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn upload_body() -> Value {
    // "receipt" in base64
    json!({ "image": "cmVjZWlwdA==" })
}

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::new(StubOutcome::Receipt(grocery_receipt()));
    let response = app
        .router()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn process_receipt_returns_stored_receipt() {
    let app = TestApp::new(StubOutcome::Receipt(grocery_receipt()));

    let (status, body) = send(app.router(), "POST", "/receipts/process-receipt", Some(upload_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "receipt");
    assert_eq!(body["name"], "Corner Market");
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["items"][0]["description"], "Milk");
    assert_eq!(body["items"][0]["isWeighted"], false);
    assert!(body["items"][0].get("totalPrice").is_some());
    assert_eq!(app.store.len(), 1);
}

#[tokio::test]
async fn process_receipt_without_image_is_bad_request() {
    let app = TestApp::new(StubOutcome::Receipt(grocery_receipt()));

    let (status, body) = send(app.router(), "POST", "/receipts/process-receipt", Some(json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No image data received");
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn process_receipt_with_invalid_base64_is_bad_request() {
    let app = TestApp::new(StubOutcome::Receipt(grocery_receipt()));

    let (status, _) = send(
        app.router(),
        "POST",
        "/receipts/process-receipt",
        Some(json!({ "image": "not base64!" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn extraction_timeout_is_retryable() {
    let app = TestApp::new(StubOutcome::Timeout);

    let (status, body) = send(app.router(), "POST", "/receipts/process-receipt", Some(upload_body())).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"], "Receipt processing timed out. Please try again.");
}

#[tokio::test]
async fn missing_document_is_server_error() {
    let app = TestApp::new(StubOutcome::NoDocument);

    let (status, body) = send(app.router(), "POST", "/receipts/process-receipt", Some(upload_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to process the receipt: No receipt data found.");
}

#[tokio::test]
async fn list_update_split_delete() {
    let app = TestApp::new(StubOutcome::Receipt(grocery_receipt()));
    let created = app.service.process_receipt(b"receipt").await.unwrap();
    let id = created.id;

    let (status, body) = send(app.router(), "GET", "/receipts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(
        app.router(),
        "PUT",
        &format!("/receipts/{id}"),
        Some(json!({ "tax": "0.50" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);

    let (status, body) = send(
        app.router(),
        "POST",
        &format!("/receipts/{id}/split"),
        Some(json!({
            "payers": ["Ana", "Ben"],
            "assignments": [{ "item_index": 0, "payers": [0, 1] }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shares"].as_array().unwrap().len(), 2);
    assert_eq!(body["shares"][0]["name"], "Ana");

    let (status, body) = send(app.router(), "DELETE", &format!("/receipts/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Receipt deleted successfully");

    let (status, body) = send(app.router(), "DELETE", &format!("/receipts/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Receipt not found");
}

#[tokio::test]
async fn split_with_bad_index_is_bad_request() {
    let app = TestApp::new(StubOutcome::Receipt(grocery_receipt()));
    let created = app.service.process_receipt(b"receipt").await.unwrap();

    let (status, body) = send(
        app.router(),
        "POST",
        &format!("/receipts/{}/split", created.id),
        Some(json!({
            "payers": ["Ana"],
            "assignments": [{ "item_index": 7, "payers": [0] }]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Item index 7 is out of range");
}
