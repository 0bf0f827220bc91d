//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → middleware stack (trace, timeout, observe, autohead, preflight, body limit)
//!     → router.rs (path lookup, per-route method filter)
//!     → handler, or the not-found fallback
//! ```
//!
//! # Design Decisions
//! - The route table is built once at startup and never changes
//! - Bare endpoint prefixes are routed explicitly to the not-found handler

pub mod router;

pub use router::build_router;
