//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default maximum request/response body size (1 MiB).
pub const DEFAULT_MAX_BODY_SIZE: u64 = 1024 * 1024;

/// Default upper bound for endpoints that let the client control timing.
pub const DEFAULT_MAX_DURATION: Duration = Duration::from_secs(10);

/// Hostname reported by `/hostname` unless the real one is requested.
pub const DEFAULT_HOSTNAME: &str = "go-httpbin";

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpBinConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Request size and timing limits.
    pub limits: LimitsConfig,

    /// Default parameter values for the simulated-latency endpoints.
    pub defaults: DefaultParams,

    /// Redirect target restrictions.
    pub redirects: RedirectConfig,

    /// Header echo settings.
    pub headers: HeadersConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Hostname exposed via `/hostname`.
    pub hostname: String,
}

impl Default for HttpBinConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            limits: LimitsConfig::default(),
            defaults: DefaultParams::default(),
            redirects: RedirectConfig::default(),
            headers: HeadersConfig::default(),
            observability: ObservabilityConfig::default(),
            hostname: DEFAULT_HOSTNAME.to_string(),
        }
    }
}

impl HttpBinConfig {
    /// Maximum request duration as a [`Duration`].
    pub fn max_duration(&self) -> Duration {
        Duration::from_millis(self.limits.max_duration_ms)
    }

    /// Returns true if `/redirect-to` may send clients to `host`.
    ///
    /// An empty allow-list permits every destination.
    pub fn is_redirect_allowed(&self, host: &str) -> bool {
        self.redirects.allowed_domains.is_empty()
            || self.redirects.allowed_domains.contains(&host.to_ascii_lowercase())
    }

    /// Body returned when a redirect destination is refused.
    pub fn forbidden_redirect_message(&self) -> String {
        let mut msg = String::from(
            "Forbidden redirect URL. Please be careful with this link.\n\nAllowed redirect destinations:\n",
        );
        for domain in &self.redirects.allowed_domains {
            msg.push_str("- ");
            msg.push_str(domain);
            msg.push('\n');
        }
        msg
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Port to bind.
    pub port: u16,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl ListenerConfig {
    /// The `host:port` pair to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Limits on request bodies and client-controlled durations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum size of an incoming request body or generated response body, in bytes.
    pub max_body_size: u64,

    /// Maximum duration in milliseconds for endpoints such as `/delay` and `/drip`.
    pub max_duration_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            max_duration_ms: DEFAULT_MAX_DURATION.as_millis() as u64,
        }
    }
}

/// Default parameter values, matching the original httpbin.org defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DefaultParams {
    /// Total time over which `/drip` spreads its bytes, in milliseconds.
    pub drip_duration_ms: u64,

    /// Initial delay before `/drip` writes anything, in milliseconds.
    pub drip_delay_ms: u64,

    /// Number of bytes `/drip` writes.
    pub drip_num_bytes: u64,
}

impl DefaultParams {
    pub fn drip_duration(&self) -> Duration {
        Duration::from_millis(self.drip_duration_ms)
    }

    pub fn drip_delay(&self) -> Duration {
        Duration::from_millis(self.drip_delay_ms)
    }
}

impl Default for DefaultParams {
    fn default() -> Self {
        Self {
            drip_duration_ms: 2_000,
            drip_delay_ms: 2_000,
            drip_num_bytes: 10,
        }
    }
}

/// Redirect restrictions.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RedirectConfig {
    /// Lowercased hosts `/redirect-to` may point at. Empty means unrestricted.
    pub allowed_domains: BTreeSet<String>,
}

/// Header echo settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HeadersConfig {
    /// Header name patterns (`*` wildcard) removed from echoed header maps.
    pub exclude: Vec<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log one line per handled request.
    pub log_requests: bool,

    /// Prometheus exporter bind address; metrics are off when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_requests: true,
            metrics_address: None,
        }
    }
}
