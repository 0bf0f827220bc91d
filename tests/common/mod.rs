//! Shared utilities for router-level integration tests.

#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use httpbin::config::HttpBinConfig;
use httpbin::http::HttpServer;

/// Default configuration with request logging off.
pub fn test_config() -> HttpBinConfig {
    let mut config = HttpBinConfig::default();
    config.observability.log_requests = false;
    config
}

pub fn app() -> Router {
    app_with(test_config())
}

pub fn app_with(config: HttpBinConfig) -> Router {
    HttpServer::new(config).unwrap().router()
}

/// A fully buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!("body is not JSON ({e}): {:?}", String::from_utf8_lossy(&self.body))
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: Router, req: Request<Body>) -> TestResponse {
    let resp = app.oneshot(req).await.unwrap();
    let (parts, body) = resp.into_parts();
    let body = body.collect().await.unwrap().to_bytes();
    TestResponse {
        status: parts.status,
        headers: parts.headers,
        body,
    }
}

pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("host", "example.com")
        .body(Body::empty())
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> TestResponse {
    send(app, request(Method::GET, uri)).await
}
