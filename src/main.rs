//! httpbin (v1)
//!
//! An HTTP request & response testing service built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ net (TCP / rustls)
//!                        │
//!                        ▼
//!                  http::server ──▶ routing::router ──▶ handlers::*
//!                        │                                  │
//!                        ▼                                  ▼
//!                  middleware (trace, timeout,        http::response
//!                  observe, autohead, preflight,
//!                  body limit, method filter)
//!
//!     Cross-cutting: config (TOML + flags/env), observability
//!     (tracing, Prometheus), lifecycle (signals, graceful shutdown)
//! ```

use clap::Parser;

use httpbin::config::CliArgs;
use httpbin::lifecycle::startup;

#[tokio::main]
async fn main() -> Result<(), startup::StartupError> {
    let config = CliArgs::parse().into_config()?;
    startup::run(config).await
}
