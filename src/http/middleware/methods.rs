//! Per-route method filtering.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::{from_fn_with_state, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};

use crate::http::middleware::autohead::HeadRequest;

/// The set of methods a route accepts.
#[derive(Debug, Clone)]
pub struct AllowedMethods(Arc<[Method]>);

impl AllowedMethods {
    pub fn new(methods: &[Method]) -> Self {
        Self(methods.into())
    }

    /// HEAD arrives here already rewritten to GET, so a route that lists
    /// HEAD accepts it through the [`HeadRequest`] marker.
    pub fn permits(&self, req: &Request<Body>) -> bool {
        if req.extensions().get::<HeadRequest>().is_some() && self.0.contains(&Method::HEAD) {
            return true;
        }
        self.0.contains(req.method())
    }

    fn allow_header(&self) -> Option<HeaderValue> {
        let joined = self
            .0
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        HeaderValue::from_str(&joined).ok()
    }
}

pub async fn method_filter(
    State(allowed): State<AllowedMethods>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if allowed.permits(&req) {
        return next.run(req).await;
    }

    tracing::debug!(method = %req.method(), path = %req.uri().path(), "Method not allowed");
    let mut response = (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed\n").into_response();
    if let Some(allow) = allowed.allow_header() {
        response.headers_mut().insert(header::ALLOW, allow);
    }
    response
}

/// Restrict `route` to `allowed` methods.
pub fn methods<S>(route: MethodRouter<S>, allowed: &[Method]) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.layer(from_fn_with_state(AllowedMethods::new(allowed), method_filter))
}
