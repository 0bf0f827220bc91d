//! httpbin: an HTTP request & response testing service.

pub mod config;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::schema::HttpBinConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
