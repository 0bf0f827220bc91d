//! Post-request observer hook.
//!
//! An [`Observer`] is told about every completed request. It exists for
//! external emission only; whatever it does, the client response is not
//! affected.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{Method, StatusCode, Uri};

/// Summary of one handled request.
#[derive(Debug, Clone)]
pub struct RequestResult {
    pub status: StatusCode,
    pub method: Method,
    pub uri: Uri,
    /// Registered route pattern (e.g. `/status/{code}`), if any route matched.
    pub endpoint: Option<String>,
    /// Response body size: the declared length, else the bytes written.
    pub size: Option<u64>,
    pub duration: Duration,
}

/// Error surfaced by an observer. Logged and otherwise ignored.
#[derive(Debug, thiserror::Error)]
#[error("observer failed: {0}")]
pub struct ObserveError(pub String);

pub trait Observer: Send + Sync + 'static {
    fn observe(&self, result: &RequestResult) -> Result<(), ObserveError>;
}

impl<F> Observer for F
where
    F: Fn(&RequestResult) -> Result<(), ObserveError> + Send + Sync + 'static,
{
    fn observe(&self, result: &RequestResult) -> Result<(), ObserveError> {
        self(result)
    }
}

/// Logs one line per request.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn observe(&self, result: &RequestResult) -> Result<(), ObserveError> {
        tracing::info!(
            status = result.status.as_u16(),
            method = %result.method,
            uri = %result.uri,
            size = ?result.size,
            duration_ms = result.duration.as_secs_f64() * 1000.0,
            "{} {} {} {:.1}ms",
            result.status.as_u16(),
            result.method,
            result.uri,
            result.duration.as_secs_f64() * 1000.0,
        );
        Ok(())
    }
}

/// Feeds request counts and latencies to the metrics recorder.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsObserver;

impl Observer for MetricsObserver {
    fn observe(&self, result: &RequestResult) -> Result<(), ObserveError> {
        crate::observability::metrics::record_request(result);
        Ok(())
    }
}

/// Fans a result out to several observers. Every observer runs even if an
/// earlier one fails; the first error is returned.
#[derive(Clone, Default)]
pub struct Observers(Vec<Arc<dyn Observer>>);

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, observer: Arc<dyn Observer>) {
        self.0.push(observer);
    }

    /// Collapse into a single observer, or `None` when there is nothing to call.
    pub fn into_observer(mut self) -> Option<Arc<dyn Observer>> {
        match self.0.len() {
            0 => None,
            1 => self.0.pop(),
            _ => Some(Arc::new(self)),
        }
    }
}

impl Observer for Observers {
    fn observe(&self, result: &RequestResult) -> Result<(), ObserveError> {
        let mut first_err = None;
        for observer in &self.0 {
            if let Err(e) = observer.observe(result) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
