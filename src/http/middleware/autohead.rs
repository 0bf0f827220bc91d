//! HEAD normalization.
//!
//! HEAD requests run through the GET handler; the body is dropped on the
//! way out but the status and headers are kept, including the length the
//! body would have had.

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request},
    middleware::Next,
    response::Response,
};

/// Marker inserted into request extensions when the client sent HEAD.
#[derive(Debug, Clone, Copy)]
pub struct HeadRequest;

pub async fn autohead(mut req: Request<Body>, next: Next) -> Response {
    if req.method() != Method::HEAD {
        return next.run(req).await;
    }

    *req.method_mut() = Method::GET;
    req.extensions_mut().insert(HeadRequest);

    let (mut parts, body) = next.run(req).await.into_parts();
    if !parts.headers.contains_key(header::CONTENT_LENGTH) {
        if let Some(len) = http_body::Body::size_hint(&body).exact() {
            parts.headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
        }
    }
    Response::from_parts(parts, Body::empty())
}
