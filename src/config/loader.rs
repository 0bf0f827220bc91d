//! Configuration loading from disk and from the command line / environment.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

use crate::config::schema::{HttpBinConfig, TlsConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid duration {0:?}")]
    Duration(String),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Command line flags. Every flag can also be set through its environment variable.
#[derive(Debug, Default, Parser)]
#[command(name = "httpbin")]
#[command(about = "HTTP request & response testing service", long_about = None)]
pub struct CliArgs {
    /// Optional TOML configuration file
    #[arg(long, env = "HTTPBIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Host to listen on
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// HTTPS certificate file
    #[arg(long, env = "HTTPS_CERT_FILE")]
    pub https_cert_file: Option<String>,

    /// HTTPS private key file
    #[arg(long, env = "HTTPS_KEY_FILE")]
    pub https_key_file: Option<String>,

    /// Maximum size of request or response, in bytes
    #[arg(long, env = "MAX_BODY_SIZE")]
    pub max_body_size: Option<u64>,

    /// Maximum duration a response may take (e.g. 10s, 500ms, 1m)
    #[arg(long, env = "MAX_DURATION")]
    pub max_duration: Option<String>,

    /// Comma-separated list of domains /redirect-to may point at
    #[arg(long, env = "ALLOWED_REDIRECT_DOMAINS")]
    pub allowed_redirect_domains: Option<String>,

    /// Comma-separated header name patterns hidden from echoed headers
    #[arg(long, env = "EXCLUDE_HEADERS")]
    pub exclude_headers: Option<String>,

    /// Expose the real hostname via /hostname
    #[arg(long, env = "USE_REAL_HOSTNAME")]
    pub use_real_hostname: bool,

    /// Prometheus exporter address (e.g. 0.0.0.0:9090)
    #[arg(long, env = "METRICS_ADDR")]
    pub metrics_addr: Option<String>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Build the final configuration: TOML file (if any), then flags/env on top.
    pub fn into_config(self) -> Result<HttpBinConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => HttpBinConfig::default(),
        };
        self.apply(&mut config)?;
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    fn apply(self, config: &mut HttpBinConfig) -> Result<(), ConfigError> {
        if let Some(host) = self.host {
            config.listener.host = host;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        match (self.https_cert_file, self.https_key_file) {
            (Some(cert_path), Some(key_path)) => {
                config.listener.tls = Some(TlsConfig { cert_path, key_path });
            }
            (None, None) => {}
            _ => {
                tracing::warn!("Both HTTPS_CERT_FILE and HTTPS_KEY_FILE are required for TLS; ignoring");
            }
        }
        if let Some(size) = self.max_body_size {
            config.limits.max_body_size = size;
        }
        if let Some(raw) = self.max_duration {
            config.limits.max_duration_ms = parse_duration(&raw)?.as_millis() as u64;
        }
        if let Some(raw) = self.allowed_redirect_domains {
            config.redirects.allowed_domains = split_list(&raw)
                .map(|d| d.to_ascii_lowercase())
                .collect();
        }
        if let Some(raw) = self.exclude_headers {
            config.headers.exclude = split_list(&raw).map(str::to_string).collect();
        }
        if self.use_real_hostname {
            match real_hostname() {
                Some(name) => config.hostname = name,
                None => tracing::warn!("Could not determine real hostname; keeping default"),
            }
        }
        if let Some(addr) = self.metrics_addr {
            config.observability.metrics_address = Some(addr);
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        Ok(())
    }
}

fn read_config(path: &Path) -> Result<HttpBinConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn real_hostname() -> Option<String> {
    if let Ok(name) = std::env::var("HOSTNAME") {
        if !name.is_empty() {
            return Some(name);
        }
    }
    fs::read_to_string("/etc/hostname")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse a duration such as `10s`, `250ms`, `1.5s`, `2m` or `1h`.
///
/// A bare number is read as seconds.
pub fn parse_duration(raw: &str) -> Result<Duration, ConfigError> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(raw.len());
    let (number, unit) = raw.split_at(split);
    let value: f64 = number
        .parse()
        .map_err(|_| ConfigError::Duration(raw.to_string()))?;
    let secs = match unit {
        "" | "s" => value,
        "ms" => value / 1_000.0,
        "us" | "µs" => value / 1_000_000.0,
        "m" => value * 60.0,
        "h" => value * 3_600.0,
        _ => return Err(ConfigError::Duration(raw.to_string())),
    };
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::Duration(raw.to_string()))
}
