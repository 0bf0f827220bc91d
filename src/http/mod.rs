//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, shared state)
//!     → middleware/ (CORS preflight, HEAD, method filter, observer)
//!     → request.rs (RequestContext, body parsing)
//!     → handler
//!     → response.rs (JSON shapes) / error.rs (plain-text errors)
//! ```

pub mod error;
pub mod headers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use error::{HandlerResult, HttpBinError};
pub use request::RequestContext;
pub use server::{AppState, HttpServer, ServerError};
