//! Cross-cutting request/response wrappers.
//!
//! Applied around the router, innermost first:
//! body-size limit → preflight → autohead → observe.
//! The method filter is attached per route.

pub mod autohead;
pub mod methods;
pub mod observe;
pub mod preflight;

pub use autohead::{autohead, HeadRequest};
pub use methods::{method_filter, methods, AllowedMethods};
pub use observe::{observe, tag_endpoint, MatchedEndpoint};
pub use preflight::preflight;
