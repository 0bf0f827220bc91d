//! Response shapes and helpers.
//!
//! Every JSON body the service produces is defined here so the wire format
//! is visible in one place.

use std::collections::BTreeMap;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::http::headers::Multimap;
use crate::http::request::RequestContext;

pub const JSON_CONTENT_TYPE: &str = "application/json; encoding=utf-8";
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Serialize `body` as a JSON response with the given status.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Shorthand for a 200 JSON response.
pub fn json_ok<T: Serialize>(body: &T) -> Response {
    json_response(StatusCode::OK, body)
}

/// Body returned by `/get` and the endpoints that reuse it.
#[derive(Debug, Serialize)]
pub struct GetResponse {
    pub args: Multimap,
    pub headers: Multimap,
    pub origin: String,
    pub url: String,
}

impl GetResponse {
    pub fn from_context(ctx: &RequestContext) -> Self {
        Self {
            args: ctx.args.clone(),
            headers: ctx.echo_headers(),
            origin: ctx.origin.clone(),
            url: ctx.url.clone(),
        }
    }
}

/// Body returned by endpoints that accept a request body.
#[derive(Debug, Serialize)]
pub struct BodyResponse {
    pub args: Multimap,
    pub headers: Multimap,
    pub origin: String,
    pub url: String,
    pub data: String,
    pub files: Multimap,
    pub form: Multimap,
    pub json: Value,
}

impl BodyResponse {
    pub fn from_context(ctx: &RequestContext) -> Self {
        Self {
            args: ctx.args.clone(),
            headers: ctx.echo_headers(),
            origin: ctx.origin.clone(),
            url: ctx.url.clone(),
            data: String::new(),
            files: Multimap::new(),
            form: Multimap::new(),
            json: Value::Null,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IpResponse {
    pub origin: String,
}

#[derive(Debug, Serialize)]
pub struct UserAgentResponse {
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

#[derive(Debug, Serialize)]
pub struct HeadersResponse {
    pub headers: Multimap,
}

#[derive(Debug, Serialize)]
pub struct HostnameResponse {
    pub hostname: String,
}

#[derive(Debug, Serialize)]
pub struct CookiesResponse {
    pub cookies: BTreeMap<String, String>,
}

/// `/basic-auth` result.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub authorized: bool,
    pub user: String,
}

/// `/digest-auth` result.
#[derive(Debug, Serialize)]
pub struct DigestAuthResponse {
    pub authenticated: bool,
    pub user: String,
}

/// `/bearer` result.
#[derive(Debug, Serialize)]
pub struct BearerResponse {
    pub authenticated: bool,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct GzipResponse {
    pub args: Multimap,
    pub headers: Multimap,
    pub origin: String,
    pub gzipped: bool,
}

#[derive(Debug, Serialize)]
pub struct DeflateResponse {
    pub args: Multimap,
    pub headers: Multimap,
    pub origin: String,
    pub deflated: bool,
}

/// One line of `/stream/{n}` output.
#[derive(Debug, Serialize)]
pub struct StreamResponse {
    pub id: usize,
    pub args: Multimap,
    pub headers: Multimap,
    pub origin: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct UuidResponse {
    pub uuid: String,
}
