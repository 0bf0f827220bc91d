//! Route table and middleware stack.
//!
//! # Responsibilities
//! - Map every endpoint path to its handler
//! - Restrict method-specific endpoints (`/get`, `/post`, ...) to their method
//! - Send bare prefixes such as `/status` to the not-found handler
//! - Wrap the table in the shared middleware stack
//!
//! # Design Decisions
//! - Every route is registered with `any` and filtered by [`methods`], so a
//!   wrong method yields our own 405 with an `Allow` header
//! - Layers, innermost first: body limit, preflight, autohead, observer,
//!   timeout, trace
//! - The timeout is the maximum duration plus a grace period; handlers
//!   enforce the maximum themselves

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    middleware::{from_fn, from_fn_with_state},
    routing::{any, MethodRouter},
    Router,
};
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::handlers::{
    auth, bytes, cache, compression, content, cookies, digest, echo, redirect, status, stream,
};
use crate::http::middleware::{autohead, methods, observe, preflight, tag_endpoint};
use crate::http::server::AppState;
use crate::observability::Observer;

/// Added to the maximum duration before the outer timeout fires.
pub const TIMEOUT_GRACE: Duration = Duration::from_millis(250);

/// Paths that are only meaningful with a trailing parameter.
const BARE_PREFIXES: &[&str] = &[
    "/absolute-redirect",
    "/basic-auth",
    "/delay",
    "/digest-auth",
    "/hidden-basic-auth",
    "/redirect",
    "/relative-redirect",
    "/status",
    "/stream",
    "/bytes",
    "/stream-bytes",
    "/links",
];

fn get_only(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    methods(route, &[Method::GET, Method::HEAD])
}

/// Build the application router with all middleware applied.
#[allow(deprecated)]
pub fn build_router(state: AppState, observer: Option<Arc<dyn Observer>>) -> Router {
    let max_body_size = usize::try_from(state.config.limits.max_body_size).unwrap_or(usize::MAX);
    let timeout = state.config.max_duration() + TIMEOUT_GRACE;

    let mut routes = Router::new()
        // Documents
        .route("/", get_only(any(content::index)))
        .route("/forms/post", get_only(any(content::forms_post)))
        .route("/encoding/utf8", get_only(any(content::utf8)))
        .route("/html", any(content::html))
        .route("/robots.txt", any(content::robots))
        .route("/deny", any(content::deny))
        .route("/xml", any(content::xml))
        .route("/json", any(content::json))
        // Echo
        .route("/get", get_only(any(echo::get)))
        .route("/head", methods(any(echo::get), &[Method::HEAD]))
        .route("/post", methods(any(echo::request_with_body), &[Method::POST]))
        .route("/put", methods(any(echo::request_with_body), &[Method::PUT]))
        .route("/patch", methods(any(echo::request_with_body), &[Method::PATCH]))
        .route("/delete", methods(any(echo::request_with_body), &[Method::DELETE]))
        .route("/anything", any(echo::request_with_body))
        .route("/anything/", any(echo::request_with_body))
        .route("/anything/{*rest}", any(echo::request_with_body))
        .route("/ip", any(echo::ip))
        .route("/user-agent", any(echo::user_agent))
        .route("/headers", any(echo::headers))
        .route("/hostname", any(echo::hostname))
        .route("/response-headers", any(echo::response_headers))
        .route("/dump/request", any(echo::dump_request))
        // Status
        .route("/status/{codes}", any(status::status))
        .route("/unstable", any(status::unstable))
        // Redirects
        .route("/redirect/{n}", any(redirect::redirect))
        .route("/relative-redirect/{n}", any(redirect::relative_redirect))
        .route("/absolute-redirect/{n}", any(redirect::absolute_redirect))
        .route("/redirect-to", any(redirect::redirect_to))
        // Cookies
        .route("/cookies", any(cookies::cookies))
        .route("/cookies/set", any(cookies::set_cookies))
        .route("/cookies/delete", any(cookies::delete_cookies))
        // Auth
        .route("/basic-auth/{user}/{passwd}", any(auth::basic_auth))
        .route("/hidden-basic-auth/{user}/{passwd}", any(auth::hidden_basic_auth))
        .route("/bearer", any(auth::bearer))
        .route("/digest-auth/{qop}/{user}/{passwd}", any(digest::digest_auth))
        .route(
            "/digest-auth/{qop}/{user}/{passwd}/{algorithm}",
            any(digest::digest_auth_with_algorithm),
        )
        // Encodings
        .route("/gzip", any(compression::gzip))
        .route("/deflate", any(compression::deflate))
        .route("/brotli", any(compression::brotli))
        // Timing and streaming
        .route("/stream/{n}", any(stream::stream))
        .route("/delay/{secs}", any(stream::delay))
        .route("/drip", any(stream::drip))
        .route("/range/{n}", any(bytes::range))
        .route("/bytes/{n}", any(bytes::bytes))
        .route("/stream-bytes/{n}", any(bytes::stream_bytes))
        // Caching
        .route("/cache", any(cache::cache))
        .route("/cache/{n}", any(cache::cache_control))
        .route("/etag/{etag}", any(cache::etag))
        // Generated content
        .route("/links/{n}", any(content::links_redirect))
        .route("/links/{n}/{offset}", any(content::links))
        .route("/image", any(content::image_accept))
        .route("/image/{kind}", any(content::image))
        .route("/uuid", any(content::uuid))
        .route("/base64/{data}", any(content::base64));

    for prefix in BARE_PREFIXES {
        routes = routes.route(prefix, any(content::not_found));
    }

    let mut app = routes
        .route_layer(from_fn(tag_endpoint))
        .fallback(content::not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(from_fn(preflight))
        .layer(from_fn(autohead));

    if let Some(observer) = observer {
        app = app.layer(from_fn_with_state(observer, observe));
    }

    app.layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
}
