//! Router tests, driven with `oneshot` against a degraded engine

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use phishguard_core::{
    logic::model::FallbackClassifier, Analyzer, EngineConfig, FallbackPolicy,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::config::Config;
use crate::{create_router, AppState};

fn app_with(policy: FallbackPolicy, max_batch_size: usize) -> Router {
    let engine = EngineConfig::default();
    let analyzer = Analyzer::new(Arc::new(FallbackClassifier::new(policy, "no artifact")), &engine);

    create_router(AppState {
        analyzer: Arc::new(analyzer),
        config: Config {
            max_batch_size,
            engine,
            ..Config::default()
        },
    })
}

fn app() -> Router {
    app_with(FallbackPolicy::Heuristic, 100)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_head_root() {
    let request = Request::builder().method(Method::HEAD).uri("/").body(Body::empty()).unwrap();
    let (status, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_reports_degraded_engine() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["engine"]["mode"], "degraded");
    assert_eq!(body["engine"]["model_loaded"], false);
    assert_eq!(body["engine"]["degraded_reason"], "no artifact");
}

#[tokio::test]
async fn test_predict_single_url() {
    let (status, body) = send(app(), post_json("/predict", r#"{"url": "http://example.com"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 1);
    assert_eq!(body["modelAvailable"], false);

    let result = &body["results"][0];
    assert_eq!(result["url"], "http://example.com");
    assert_eq!(result["prediction"], "Legitimate");
    assert_eq!(result["validSSL"], false);
    assert_eq!(result["modelAvailable"], false);
}

#[tokio::test]
async fn test_predict_mixed_batch() {
    let (status, body) = send(
        app(),
        post_json("/predict", r#"{"urls": ["http://example.com", "not a url", 17]}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["prediction"], "Legitimate");
    assert_eq!(results[1]["url"], "not a url");
    assert_eq!(results[1]["prediction"], "Invalid URL");
    assert_eq!(results[1]["validSSL"], false);
    assert_eq!(results[2]["url"], "17");
    assert_eq!(results[2]["prediction"], "Invalid URL");
}

#[tokio::test]
async fn test_always_phishing_fallback() {
    let app = app_with(FallbackPolicy::AlwaysPhishing, 100);
    let (_, body) = send(app, post_json("/predict", r#"{"urls": "http://example.com"}"#)).await;
    assert_eq!(body["results"][0]["prediction"], "Phishing");
}

#[tokio::test]
async fn test_predict_rejects_bad_bodies() {
    for body in [r#"{"urls": []}"#, r#"{}"#, r#"{"url": ""}"#, "{not json", r#"{"urls": 5}"#] {
        let (status, json) = send(app(), post_json("/predict", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(json["success"], false, "{}", body);
        assert_eq!(json["status"], 400, "{}", body);
        assert!(json["error"].is_string(), "{}", body);
    }
}

#[tokio::test]
async fn test_batch_size_limit() {
    let app = app_with(FallbackPolicy::Heuristic, 2);
    let body = json!({ "urls": ["http://a.io", "http://b.io", "http://c.io"] }).to_string();
    let (status, json) = send(app, post_json("/predict", &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("max 2"));
}

#[tokio::test]
async fn test_analyze_batch_certificates() {
    let (status, body) = send(
        app(),
        post_json("/analyze-batch", r#"{"urls": ["http://example.com", "junk", null]}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "results": [
                {"url": "http://example.com", "validSSL": false},
                {"url": "junk", "validSSL": false},
                {"url": "null", "validSSL": false}
            ]
        })
    );
}

#[tokio::test]
async fn test_analyze_batch_requires_urls() {
    let (status, _) = send(app(), post_json("/analyze-batch", r#"{"urls": []}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
