//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Hold the shared, immutable application state
//! - Assemble observers from configuration
//! - Build the router (see [`crate::routing::router`])
//! - Serve plain HTTP or HTTPS with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::validation::{validate_config, ValidationError};
use crate::config::{ConfigError, HttpBinConfig, TlsConfig};
use crate::http::headers::HeaderFilter;
use crate::lifecycle::Shutdown;
use crate::net::tls::{load_tls_config, TlsError};
use crate::observability::{LogObserver, MetricsObserver, Observer, Observers};
use crate::routing::router::build_router;

/// How long in-flight TLS connections get to finish after shutdown starts.
const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<HttpBinConfig>,
    pub header_filter: Option<Arc<HeaderFilter>>,
    /// True when the listener terminates TLS itself.
    pub https: bool,
}

impl AppState {
    pub fn new(config: HttpBinConfig) -> Result<Self, ConfigError> {
        let header_filter = HeaderFilter::new(&config.headers.exclude)
            .map_err(|e| ConfigError::Validation(vec![ValidationError::BadExcludePattern(e.0)]))?
            .map(Arc::new);
        let https = config.listener.tls.is_some();
        Ok(Self {
            config: Arc::new(config),
            header_filter,
            https,
        })
    }
}

/// Errors that stop the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(#[from] TlsError),
}

/// The httpbin HTTP server.
pub struct HttpServer {
    state: AppState,
    observer: Option<Arc<dyn Observer>>,
}

impl HttpServer {
    /// Create a server from a configuration, validating it first.
    ///
    /// Request logging and Prometheus metrics observers are installed
    /// according to the observability section.
    pub fn new(config: HttpBinConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let mut observers = Observers::new();
        if config.observability.log_requests {
            observers.push(Arc::new(LogObserver));
        }
        if config.observability.metrics_address.is_some() {
            observers.push(Arc::new(MetricsObserver));
        }

        Ok(Self {
            state: AppState::new(config)?,
            observer: observers.into_observer(),
        })
    }

    /// Replace the configured observers with a caller-supplied one.
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &HttpBinConfig {
        &self.state.config
    }

    /// The fully layered router, e.g. for driving with `tower::ServiceExt`.
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), self.observer.clone())
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router().into_make_service_with_connect_info::<SocketAddr>();
        let mut rx = shutdown.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.recv().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` with the given certificate until `shutdown` fires.
    pub async fn run_tls(self, addr: SocketAddr, tls: &TlsConfig, shutdown: &Shutdown) -> Result<(), ServerError> {
        let rustls = load_tls_config(tls).await?;
        let handle = axum_server::Handle::new();

        let mut rx = shutdown.subscribe();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = rx.recv().await;
            tracing::info!("Draining in-flight requests");
            drain.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
        });

        tracing::info!(address = %addr, "HTTPS server starting");
        let app = self.router().into_make_service_with_connect_info::<SocketAddr>();
        axum_server::bind_rustls(addr, rustls)
            .handle(handle)
            .serve(app)
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}
