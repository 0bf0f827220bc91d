//! Startup orchestration.
//!
//! Order: logging, metrics exporter, server construction, listener bind.
//! Any failure before the listener is up is fatal.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::HttpBinConfig;
use crate::http::server::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{logging, metrics};

pub type StartupError = Box<dyn std::error::Error + Send + Sync>;

/// Start every subsystem for `config` and serve until a stop signal arrives.
pub async fn run(config: HttpBinConfig) -> Result<(), StartupError> {
    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "httpbin starting");

    if let Some(raw) = &config.observability.metrics_address {
        let addr: SocketAddr = raw.parse()?;
        metrics::init_metrics(addr)?;
    }

    tracing::info!(
        bind_address = %config.listener.bind_address(),
        max_body_size = config.limits.max_body_size,
        max_duration_ms = config.limits.max_duration_ms,
        allowed_redirect_domains = config.redirects.allowed_domains.len(),
        tls = config.listener.tls.is_some(),
        "Configuration loaded"
    );

    let tls = config.listener.tls.clone();
    let bind_address = config.listener.bind_address();
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    signals::shutdown_on_signal(shutdown.clone());

    match tls {
        Some(tls) => {
            let addr: SocketAddr = bind_address.parse()?;
            server.run_tls(addr, &tls, &shutdown).await?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            server.run(listener, &shutdown).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
