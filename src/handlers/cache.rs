//! Conditional request and caching endpoints.

use axum::{
    extract::Path,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::http::error::{HandlerResult, HttpBinError};
use crate::http::request::RequestContext;
use crate::http::response::{json_ok, GetResponse};

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

fn header_value(raw: &str) -> HandlerResult<HeaderValue> {
    HeaderValue::from_str(raw).map_err(|e| HttpBinError::Internal(e.to_string()))
}

/// `/cache`
pub async fn cache(ctx: RequestContext) -> HandlerResult<Response> {
    let conditional = ctx.headers.contains_key(header::IF_MODIFIED_SINCE)
        || ctx.headers.contains_key(header::IF_NONE_MATCH);
    if conditional {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let last_modified = Utc::now().format(HTTP_DATE_FORMAT).to_string();
    let etag = format!("\"{}\"", hex::encode(Sha256::digest(last_modified.as_bytes())));

    let mut resp = json_ok(&GetResponse::from_context(&ctx));
    let headers = resp.headers_mut();
    headers.insert(header::LAST_MODIFIED, header_value(&last_modified)?);
    headers.insert(header::ETAG, header_value(&etag)?);
    Ok(resp)
}

/// `/cache/{n}`
pub async fn cache_control(ctx: RequestContext, Path(raw): Path<String>) -> HandlerResult<Response> {
    let seconds = raw
        .parse::<u64>()
        .map_err(|_| HttpBinError::bad_request("Invalid seconds"))?;

    let mut resp = json_ok(&GetResponse::from_context(&ctx));
    resp.headers_mut().insert(
        header::CACHE_CONTROL,
        header_value(&format!("public, max-age={}", seconds))?,
    );
    Ok(resp)
}

/// Entity tags listed in an `If-Match` / `If-None-Match` header, unquoted.
pub fn parse_etags(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(|tag| tag.strip_prefix("W/").unwrap_or(tag))
        .map(|tag| tag.trim_matches('"'))
        .collect()
}

fn etag_listed(raw: Option<&str>, etag: &str) -> Option<bool> {
    raw.map(|raw| {
        parse_etags(raw)
            .into_iter()
            .any(|tag| tag == "*" || tag == etag)
    })
}

/// `/etag/{etag}`
pub async fn etag(ctx: RequestContext, Path(etag): Path<String>) -> HandlerResult<Response> {
    let quoted = header_value(&format!("\"{}\"", etag))?;

    if etag_listed(ctx.header(header::IF_NONE_MATCH.as_str()), &etag) == Some(true) {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, quoted)]).into_response());
    }
    if etag_listed(ctx.header(header::IF_MATCH.as_str()), &etag) == Some(false) {
        return Ok(StatusCode::PRECONDITION_FAILED.into_response());
    }

    let mut resp = json_ok(&GetResponse::from_context(&ctx));
    resp.headers_mut().insert(header::ETAG, quoted);
    Ok(resp)
}
