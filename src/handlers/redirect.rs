//! Redirect endpoints.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use url::Url;

use crate::handlers::status::parse_bounded_status;
use crate::http::error::{HandlerResult, HttpBinError};
use crate::http::request::RequestContext;
use crate::http::server::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RedirectKind {
    Relative,
    Absolute,
}

fn parse_count(raw: &str) -> HandlerResult<u32> {
    raw.parse::<u32>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| HttpBinError::bad_request("Invalid redirect"))
}

/// Location of the next hop in a redirect chain with `n` hops remaining.
fn next_location(ctx: &RequestContext, n: u32, kind: RedirectKind) -> String {
    let path = match (n, kind) {
        (1, _) => "/get".to_string(),
        (n, RedirectKind::Relative) => format!("/relative-redirect/{}", n - 1),
        (n, RedirectKind::Absolute) => format!("/absolute-redirect/{}", n - 1),
    };
    match kind {
        RedirectKind::Relative => path,
        RedirectKind::Absolute => format!("{}://{}{}", ctx.scheme(), ctx.host(), path),
    }
}

fn found(location: &str) -> HandlerResult<Response> {
    let value = HeaderValue::from_str(location)
        .map_err(|_| HttpBinError::bad_request("Invalid URL"))?;
    Ok((StatusCode::FOUND, [(header::LOCATION, value)]).into_response())
}

/// `/redirect/{n}`; `?absolute=true` switches to absolute URLs.
pub async fn redirect(ctx: RequestContext, Path(raw): Path<String>) -> HandlerResult<Response> {
    let n = parse_count(&raw)?;
    let kind = if ctx.arg("absolute").is_some_and(|v| v.eq_ignore_ascii_case("true")) {
        RedirectKind::Absolute
    } else {
        RedirectKind::Relative
    };
    found(&next_location(&ctx, n, kind))
}

pub async fn relative_redirect(ctx: RequestContext, Path(raw): Path<String>) -> HandlerResult<Response> {
    let n = parse_count(&raw)?;
    found(&next_location(&ctx, n, RedirectKind::Relative))
}

pub async fn absolute_redirect(ctx: RequestContext, Path(raw): Path<String>) -> HandlerResult<Response> {
    let n = parse_count(&raw)?;
    found(&next_location(&ctx, n, RedirectKind::Absolute))
}

/// A relative reference that names its own host, e.g. `//host/path`.
fn is_network_path(target: &str) -> bool {
    // Browsers drop tabs and newlines anywhere and leading control characters.
    let mut leading = target
        .trim_start_matches(|c: char| c <= ' ')
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'));
    matches!(
        (leading.next(), leading.next()),
        (Some('/' | '\\'), Some('/' | '\\'))
    )
}

fn check_host(state: &AppState, target: &str, host: &str) -> HandlerResult<()> {
    if state.config.is_redirect_allowed(host) {
        return Ok(());
    }
    tracing::info!(target = %target, "Refusing redirect to disallowed domain");
    Err(HttpBinError::Forbidden(state.config.forbidden_redirect_message()))
}

/// `/redirect-to?url=...&status_code=...`
pub async fn redirect_to(State(state): State<AppState>, ctx: RequestContext) -> HandlerResult<Response> {
    let target = ctx
        .arg("url")
        .filter(|u| !u.is_empty())
        .ok_or_else(|| HttpBinError::bad_request("Missing URL"))?;

    match Url::parse(target) {
        Ok(parsed) => check_host(&state, target, parsed.host_str().unwrap_or_default())?,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse("http://localhost/").map_err(|_| HttpBinError::bad_request("Invalid URL"))?;
            let joined = base
                .join(target)
                .map_err(|_| HttpBinError::bad_request("Invalid URL"))?;
            // Browsers follow `//host` and `/\host` to another host.
            if is_network_path(target) {
                check_host(&state, target, joined.host_str().unwrap_or_default())?;
            }
        }
        Err(_) => return Err(HttpBinError::bad_request("Invalid URL")),
    }

    let code = match ctx.arg("status_code") {
        Some(raw) => parse_bounded_status(raw, 300, 308)?,
        None => 302,
    };
    let status = StatusCode::from_u16(code).map_err(|_| HttpBinError::bad_request("Invalid status code"))?;
    let location = HeaderValue::from_str(target).map_err(|_| HttpBinError::bad_request("Invalid URL"))?;

    Ok((status, [(header::LOCATION, location)]).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_network_path() {
        assert!(is_network_path("//evil.example/x"));
        assert!(is_network_path("/\\evil.example"));
        assert!(is_network_path("\\\\evil.example"));
        assert!(is_network_path("\\/evil.example"));
        assert!(is_network_path("/\t/evil.example"));
        assert!(is_network_path(" //evil.example"));
        assert!(!is_network_path("/get"));
        assert!(!is_network_path("get"));
        assert!(!is_network_path("/"));
    }
}
