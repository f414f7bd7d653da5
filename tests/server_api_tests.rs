//! Integration tests for the HTTP API
//!
//! Requests are driven through the router with `tower::ServiceExt::oneshot`.
//! Rate limiting is disabled because it keys on the peer address, which only
//! exists on a real connection.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use sample_matcher::utils::validation::{MAX_DOCUMENT_BYTES, MAX_LEAF_VALUES};
use sample_matcher::web::server::{create_router, RouterOptions};
use sample_matcher::{MatchService, MatchStore, MatchingConfig, ReconcileMode, SampleCatalog};

fn create_test_router() -> Router {
    let catalog = SampleCatalog::load_embedded().expect("embedded samples should load");
    let store = Arc::new(MatchStore::new(Arc::new(catalog)));
    let service = MatchService::new(
        store,
        MatchingConfig {
            reconcile: ReconcileMode::Inline,
        },
    );
    create_router(service, &RouterOptions { rate_limit: false }).expect("router should build")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_submit_bread_co_matches() {
    let app = create_test_router();
    let doc = json!({"Customer Name": "Bread Co", "Invoice Amount": "0"});

    let (status, body) = send(&app, post("/document", doc.to_string())).await;
    assert_eq!(status, StatusCode::OK);

    let sample_id = body["sampleId"].as_str().unwrap();
    assert!(sample_id == "005" || sample_id == "006");
    assert!(body["matchScore"].as_u64().unwrap() >= 2);
    assert_eq!(body["document"], doc);

    let (status, index) = send(&app, get("/api/matches")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(index[sample_id], json!([doc]));
}

#[tokio::test]
async fn test_submit_without_overlap_is_not_found() {
    let app = create_test_router();
    let doc = json!({"animal": "okapi"});

    let (status, body) = send(&app, post("/document", doc.to_string())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_type"], "no_match");

    let (_, unmatched) = send(&app, get("/api/unmatched")).await;
    assert_eq!(unmatched["count"], 1);
    assert_eq!(unmatched["documents"][0]["document"], doc);

    let (_, index) = send(&app, get("/api/matches")).await;
    assert_eq!(index, json!({}));
}

#[tokio::test]
async fn test_unmatched_document_is_rescued_by_later_match() {
    let app = create_test_router();

    let orphan = json!({"po": "PO-5521"});
    let (status, _) = send(&app, post("/document", orphan.to_string())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let bridge = json!({"Customer Name": "Bella's Bakery", "po": "PO-5521"});
    let (status, body) = send(&app, post("/document", bridge.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sampleId"], "004");

    let (_, stats) = send(&app, get("/api/stats")).await;
    assert_eq!(stats["matched"], 2);
    assert_eq!(stats["unmatched"], 0);

    let (_, index) = send(&app, get("/api/matches")).await;
    let group = index["004"].as_array().unwrap();
    assert_eq!(group.len(), 2);
    assert!(group.contains(&orphan));
}

#[tokio::test]
async fn test_invalid_json_is_rejected() {
    let app = create_test_router();

    let (status, body) = send(&app, post("/document", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "invalid_json");

    let (_, stats) = send(&app, get("/api/stats")).await;
    assert_eq!(stats["unmatched"], 0);
}

#[tokio::test]
async fn test_oversized_document_is_rejected() {
    let app = create_test_router();
    let payload = format!("\"{}\"", "a".repeat(MAX_DOCUMENT_BYTES + 16));

    let (status, body) = send(&app, post("/document", payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");
    assert!(body["details"].is_null());
}

#[tokio::test]
async fn test_document_with_too_many_values_is_rejected() {
    let app = create_test_router();
    // Well under the byte limit, one value over the leaf limit
    let payload = Value::Array(vec![json!(0); MAX_LEAF_VALUES + 1]).to_string();
    assert!(payload.len() < MAX_DOCUMENT_BYTES);

    let (status, body) = send(&app, post("/document", payload.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");

    let (status, body) = send(&app, post("/api/score", payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");

    let (_, stats) = send(&app, get("/api/stats")).await;
    assert_eq!(stats["matched"], 0);
    assert_eq!(stats["unmatched"], 0);
}

#[tokio::test]
async fn test_samples_listing() {
    let app = create_test_router();

    let (status, body) = send(&app, get("/api/samples")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 6);
    assert_eq!(body["samples"][0]["id"], "001");
    assert_eq!(body["samples"][4]["document"]["Customer Name"], "Bread Co");
}

#[tokio::test]
async fn test_score_ranks_without_storing() {
    let app = create_test_router();
    let doc = json!({"Customer Name": "Bread Co", "Invoice Amount": "0"});

    let (status, body) = send(&app, post("/api/score?limit=2", doc.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["candidates"][0]["target"]["kind"], "sample");
    assert_eq!(body["candidates"][0]["target"]["sample_id"], "005");
    assert_eq!(body["candidates"][0]["score"], 2);
    assert_eq!(body["candidates"][1]["target"]["sample_id"], "006");

    let (_, stats) = send(&app, get("/api/stats")).await;
    assert_eq!(stats["matched"], 0);
    assert_eq!(stats["unmatched"], 0);
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = create_test_router();
    let response = app.oneshot(get("/api/stats")).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("strict-transport-security"));
    assert!(headers.contains_key("referrer-policy"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = create_test_router();
    let response = app.oneshot(get("/api/identify")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
