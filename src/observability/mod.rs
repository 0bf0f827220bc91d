//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request:
//!     → TraceLayer span (logging.rs subscriber)
//!     → observe middleware builds a RequestResult
//!     → observer.rs (LogObserver, MetricsObserver, or a caller-supplied hook)
//!     → metrics.rs (Prometheus scrape endpoint)
//! ```
//!
//! # Design Decisions
//! - Observer failures are logged and swallowed
//! - Metrics are opt-in (only when an exporter address is configured)

pub mod logging;
pub mod metrics;
pub mod observer;

pub use observer::{LogObserver, MetricsObserver, ObserveError, Observer, Observers, RequestResult};
