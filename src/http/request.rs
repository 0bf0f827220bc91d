//! Request handling and transformation.
//!
//! # Responsibilities
//! - Collect the read-only request context every handler echoes from
//! - Derive client origin and the externally visible URL
//! - Parse request bodies (raw, JSON, urlencoded form, multipart)
//!
//! # Design Decisions
//! - `X-Forwarded-*` headers win over connection info, so the service
//!   reports what a client behind a proxy actually sent
//! - Bodies are buffered; the body-size limit layer bounds them

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, FromRequest, FromRequestParts, Multipart},
    http::{header, request::Parts, HeaderMap, Method, Request, Uri},
};
use serde_json::Value;
use url::form_urlencoded;

use crate::http::error::HttpBinError;
use crate::http::headers::{header_multimap, HeaderFilter, Multimap};
use crate::http::middleware::HeadRequest;
use crate::http::response::BodyResponse;
use crate::http::server::AppState;

/// Everything a handler needs to know about the incoming request, minus the body.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub args: Multimap,
    pub origin: String,
    pub url: String,
    header_filter: Option<Arc<HeaderFilter>>,
    https: bool,
    head: bool,
}

impl RequestContext {
    /// Build a context from request parts.
    pub fn from_parts(parts: &Parts, https: bool, header_filter: Option<Arc<HeaderFilter>>) -> Self {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        let origin = header_str(&parts.headers, "x-forwarded-for")
            .map(str::to_string)
            .or(peer)
            .unwrap_or_else(|| "unknown".to_string());

        let mut ctx = Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
            args: parse_query(parts.uri.query()),
            origin,
            url: String::new(),
            header_filter,
            https,
            head: parts.extensions.get::<HeadRequest>().is_some(),
        };
        ctx.url = format!("{}://{}{}", ctx.scheme(), ctx.host(), ctx.path_and_query());
        ctx
    }

    /// Request headers as echoed back to the client.
    pub fn echo_headers(&self) -> Multimap {
        header_multimap(&self.headers, self.header_filter.as_deref())
    }

    /// First value of a request header, if it is valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        header_str(&self.headers, name)
    }

    /// First value of a query argument.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Scheme the client used, honouring proxy headers.
    pub fn scheme(&self) -> &str {
        if let Some(proto) = self.header("x-forwarded-proto") {
            return proto;
        }
        if let Some(proto) = self.header("x-forwarded-protocol") {
            return proto;
        }
        if self.header("x-forwarded-ssl") == Some("on") || self.https {
            return "https";
        }
        "http"
    }

    /// Host the client addressed.
    pub fn host(&self) -> &str {
        self.uri
            .authority()
            .map(|a| a.as_str())
            .or_else(|| self.header("host"))
            .unwrap_or("localhost")
    }

    /// Method as the client sent it; `method` reads GET for a HEAD request.
    pub fn client_method(&self) -> Method {
        if self.head {
            Method::HEAD
        } else {
            self.method.clone()
        }
    }

    pub fn path_and_query(&self) -> &str {
        self.uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/")
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts, state.https, state.header_filter.clone()))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Parse a query string into a [`Multimap`].
pub fn parse_query(query: Option<&str>) -> Multimap {
    let mut args = Multimap::new();
    if let Some(query) = query {
        for (k, v) in form_urlencoded::parse(query.as_bytes()) {
            args.entry(k.into_owned()).or_default().push(v.into_owned());
        }
    }
    args
}

/// Parse a buffered body into the body-response shape.
pub async fn parse_body(ctx: &RequestContext, body: Bytes) -> Result<BodyResponse, HttpBinError> {
    let mut resp = BodyResponse::from_context(ctx);
    if body.is_empty() {
        return Ok(resp);
    }
    resp.data = String::from_utf8_lossy(&body).into_owned();

    let content_type = ctx.header(header::CONTENT_TYPE.as_str()).unwrap_or("");
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "application/x-www-form-urlencoded" => {
            resp.form = parse_query(Some(resp.data.as_str()));
        }
        "multipart/form-data" => {
            let (form, files) = parse_multipart(content_type, body).await?;
            resp.form = form;
            resp.files = files;
        }
        "application/json" => {
            let json: Value = serde_json::from_slice(&body)
                .map_err(|e| HttpBinError::bad_request(format!("error parsing JSON body: {}", e)))?;
            resp.json = json;
        }
        _ => {}
    }
    Ok(resp)
}

async fn parse_multipart(content_type: &str, body: Bytes) -> Result<(Multimap, Multimap), HttpBinError> {
    let request = Request::builder()
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .map_err(|e| HttpBinError::bad_request(e.to_string()))?;
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| HttpBinError::bad_request(format!("error parsing multipart body: {}", e)))?;

    let mut form = Multimap::new();
    let mut files = Multimap::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpBinError::bad_request(format!("error parsing multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let is_file = field.file_name().is_some();
        let data = field
            .bytes()
            .await
            .map_err(|e| HttpBinError::bad_request(format!("error reading multipart field: {}", e)))?;
        let value = String::from_utf8_lossy(&data).into_owned();
        if is_file {
            files.entry(name).or_default().push(value);
        } else {
            form.entry(name).or_default().push(value);
        }
    }
    Ok((form, files))
}
