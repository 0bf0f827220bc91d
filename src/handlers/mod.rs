//! Endpoint handlers.
//!
//! Each handler maps one request to one response. Handlers read the request
//! through [`RequestContext`](crate::http::request::RequestContext) and the
//! shared [`AppState`](crate::http::server::AppState); they hold no state of
//! their own.

pub mod auth;
pub mod bytes;
pub mod cache;
pub mod compression;
pub mod content;
pub mod cookies;
pub mod digest;
pub mod echo;
pub mod redirect;
pub mod status;
pub mod stream;
