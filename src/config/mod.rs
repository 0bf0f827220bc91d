//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file
//!     → loader.rs (parse & deserialize)
//!     → CLI flags / environment overlay
//!     → validation.rs (semantic checks)
//!     → HttpBinConfig (validated, immutable)
//!     → shared via Arc to every handler
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{parse_duration, CliArgs, ConfigError};
pub use schema::{
    DefaultParams, HttpBinConfig, LimitsConfig, ListenerConfig, ObservabilityConfig, TlsConfig,
};
