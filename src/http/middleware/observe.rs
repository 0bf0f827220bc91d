//! Observer hook middleware.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::{MatchedPath, State},
    http::{header, Request},
    middleware::Next,
    response::Response,
};

use http_body::{Body as _, Frame, SizeHint};
use tokio::time::Instant;

use crate::observability::observer::{Observer, RequestResult};

/// Route pattern copied onto the response so the outer observer can label by endpoint.
#[derive(Debug, Clone)]
pub struct MatchedEndpoint(pub String);

/// Route-level layer: record which route pattern handled the request.
pub async fn tag_endpoint(req: Request<Body>, next: Next) -> Response {
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| MatchedEndpoint(p.as_str().to_string()));
    let mut response = next.run(req).await;
    if let Some(endpoint) = endpoint {
        response.extensions_mut().insert(endpoint);
    }
    response
}

/// Times each request up to the end of its response body, then reports it.
pub async fn observe(
    State(observer): State<Arc<dyn Observer>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let (parts, body) = next.run(req).await.into_parts();

    let declared = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .or_else(|| http_body::Body::size_hint(&body).exact());

    let pending = PendingResult {
        observer,
        start,
        declared,
        result: RequestResult {
            status: parts.status,
            method,
            uri,
            endpoint: parts
                .extensions
                .get::<MatchedEndpoint>()
                .map(|e| e.0.clone()),
            size: None,
            duration: Duration::ZERO,
        },
    };

    Response::from_parts(
        parts,
        Body::new(ObservedBody {
            inner: body,
            sent: 0,
            pending: Some(pending),
        }),
    )
}

struct PendingResult {
    observer: Arc<dyn Observer>,
    start: Instant,
    declared: Option<u64>,
    result: RequestResult,
}

impl PendingResult {
    fn finish(mut self, sent: u64, complete: bool) {
        self.result.duration = self.start.elapsed();
        self.result.size = match (self.declared, complete) {
            (Some(len), _) => Some(len),
            (None, true) => Some(sent),
            (None, false) => None,
        };
        if let Err(e) = self.observer.observe(&self.result) {
            tracing::warn!(error = %e, uri = %self.result.uri, "Observer failed; ignoring");
        }
    }
}

/// Response body that reports the request once it is fully written, or
/// when the connection drops it early.
struct ObservedBody {
    inner: Body,
    sent: u64,
    pending: Option<PendingResult>,
}

impl http_body::Body for ObservedBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, axum::Error>>> {
        let this = self.get_mut();
        let frame = ready!(Pin::new(&mut this.inner).poll_frame(cx));
        match &frame {
            Some(Ok(frame)) => {
                if let Some(data) = frame.data_ref() {
                    this.sent += data.len() as u64;
                }
            }
            Some(Err(_)) => {}
            None => {
                if let Some(pending) = this.pending.take() {
                    pending.finish(this.sent, true);
                }
            }
        }
        Poll::Ready(frame)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for ObservedBody {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            let complete = self.inner.is_end_stream();
            pending.finish(self.sent, complete);
        }
    }
}
