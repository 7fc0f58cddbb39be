mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use common::{read_fixture, FixedLookup};
use lei_enricher::server::{create_server, AppState};
use lei_enricher::EnrichUseCase;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "lei-enricher-test-boundary";

fn app() -> Router {
    let use_case = EnrichUseCase::with_default_enricher(Box::new(FixedLookup::sample()));
    create_server(Arc::new(AppState::new(use_case, false)))
}

fn multipart_body(field: &str, content: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"input.csv\"\r\nContent-Type: text/csv\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn root_says_hello() {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, serde_json::json!({ "message": "Hello World" }));
}

#[tokio::test]
async fn health_reports_service() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["service"], "lei-enricher");
}

#[tokio::test]
async fn enrich_returns_ok_for_clean_file() {
    let body = multipart_body("file", &read_fixture("input_dataset.csv"));
    let response = app().oneshot(upload("/enrich/", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["message"], "OK");
    assert_eq!(json["data"].as_array().unwrap().len(), 20);
    assert_eq!(json["data"][0]["legal_name"], "Stichting Pensioenfonds Alliance");
}

#[tokio::test]
async fn enrich_reports_zero_rate() {
    let body = multipart_body("file", &read_fixture("input_dataset_rate_0.csv"));
    let response = app().oneshot(upload("/enrich", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
    assert_eq!(
        json["message"],
        "Some entries could not be enriched: [Could not compute transactions_costs for BFXS5XCH7N0Y05NIXW11; rate is 0]"
    );
    assert_eq!(json["data"][1]["transactions_costs"], Value::Null);
}

#[tokio::test]
async fn enrich_accepts_differently_named_field() {
    let body = multipart_body("upload", b"lei,notional,rate\nXKZZ2JZF41MRHTR1V493,1.0,1.0\n");
    let response = app().oneshot(upload("/enrich/", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn enrich_rejects_invalid_utf8() {
    let body = multipart_body("file", b"lei,rate\n\xff\xfe,1\n");
    let response = app().oneshot(upload("/enrich/", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json_body(response).await["detail"]
        .as_str()
        .unwrap()
        .contains("UTF-8"));
}

#[tokio::test]
async fn enrich_without_file_is_bad_request() {
    let body = format!("--{BOUNDARY}--\r\n").into_bytes();
    let response = app().oneshot(upload("/enrich/", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn metrics_hidden_when_disabled() {
    let response = app()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
