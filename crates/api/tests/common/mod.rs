#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use saw_api::config::ServerConfig;
use saw_api::router::build_app_router;
use saw_api::state::AppState;
use saw_automation::poller::PollConfig;
use saw_automation::testing::ScriptedEngine;
use saw_automation::troubleshooter::Troubleshooter;
use serde_json::Value;
use tower::ServiceExt;

/// Time a test request may spend polling before it reports `TimedOut`.
pub const REQUEST_BUDGET: Duration = Duration::from_secs(60);

/// Build a test `ServerConfig` with the production defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig::from_lookup(|_| None).unwrap()
}

/// Build the full application router around a scripted engine.
///
/// Uses the same middleware stack as `main.rs` with a short poll interval
/// and [`REQUEST_BUDGET`] as the per-request deadline.
pub fn build_test_app(engine: Arc<ScriptedEngine>) -> Router {
    let poll = PollConfig {
        initial_interval: Duration::from_secs(1),
        max_interval: Duration::from_secs(5),
        multiplier: 2.0,
        max_query_retries: 2,
    };
    let state = AppState {
        troubleshooter: Arc::new(Troubleshooter::new(engine, poll, REQUEST_BUDGET)),
    };
    build_app_router(state, &test_config())
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: impl Into<Body>) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
