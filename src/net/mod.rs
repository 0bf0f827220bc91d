//! Network layer subsystem.
//!
//! Plain HTTP uses a tokio `TcpListener` served by axum directly; HTTPS goes
//! through axum-server's rustls acceptor, configured by `tls.rs`.

pub mod tls;

pub use tls::{load_tls_config, TlsError};
