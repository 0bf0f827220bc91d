//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (sizes > 0, durations > 0)
//! - Check the exclude patterns compile
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HttpBinConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::HttpBinConfig;
use crate::http::headers::HeaderFilter;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("limits.max_body_size must be greater than zero")]
    ZeroBodySize,

    #[error("limits.max_duration_ms must be greater than zero")]
    ZeroDuration,

    #[error("defaults.drip_num_bytes must be greater than zero")]
    ZeroDripBytes,

    #[error("hostname must not be empty")]
    EmptyHostname,

    #[error("invalid exclude header pattern {0:?}")]
    BadExcludePattern(String),

    #[error("invalid metrics address {0:?}")]
    BadMetricsAddress(String),
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &HttpBinConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodySize);
    }
    if config.limits.max_duration_ms == 0 {
        errors.push(ValidationError::ZeroDuration);
    }
    if config.defaults.drip_num_bytes == 0 {
        errors.push(ValidationError::ZeroDripBytes);
    }

    if config.hostname.trim().is_empty() {
        errors.push(ValidationError::EmptyHostname);
    }

    for pattern in &config.headers.exclude {
        if HeaderFilter::new(std::slice::from_ref(pattern)).is_err() {
            errors.push(ValidationError::BadExcludePattern(pattern.clone()));
        }
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<std::net::SocketAddr>().is_err() {
            errors.push(ValidationError::BadMetricsAddress(addr.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
