//! Cookie endpoints.

use std::collections::BTreeMap;

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use cookie::Cookie;

use crate::http::request::RequestContext;
use crate::http::response::{json_ok, CookiesResponse};

/// All cookies sent by the client. Later duplicates win.
pub fn request_cookies(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut cookies = BTreeMap::new();
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for cookie in Cookie::split_parse(raw).flatten() {
            cookies.insert(cookie.name().to_string(), cookie.value().to_string());
        }
    }
    cookies
}

/// `/cookies`
pub async fn cookies(ctx: RequestContext) -> Response {
    json_ok(&CookiesResponse {
        cookies: request_cookies(&ctx.headers),
    })
}

fn redirect_to_cookies(set_cookies: Vec<Cookie<'static>>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::LOCATION, HeaderValue::from_static("/cookies"));
    for cookie in set_cookies {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(_) => tracing::debug!(name = %cookie.name(), "Skipping unencodable cookie"),
        }
    }
    (StatusCode::FOUND, headers).into_response()
}

/// `/cookies/set?name=value`
pub async fn set_cookies(ctx: RequestContext) -> Response {
    let cookies = ctx
        .args
        .iter()
        .filter_map(|(name, values)| {
            let value = values.first()?;
            Some(
                Cookie::build((name.clone(), value.clone()))
                    .path("/")
                    .http_only(true)
                    .build(),
            )
        })
        .collect();
    redirect_to_cookies(cookies)
}

/// `/cookies/delete?name`
pub async fn delete_cookies(ctx: RequestContext) -> Response {
    let cookies = ctx
        .args
        .keys()
        .map(|name| {
            let mut cookie = Cookie::build((name.clone(), String::new()))
                .path("/")
                .http_only(true)
                .build();
            cookie.make_removal();
            cookie
        })
        .collect();
    redirect_to_cookies(cookies)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_cookies_parses_all_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1; b=2"));
        headers.append(header::COOKIE, HeaderValue::from_static("c=3"));

        let cookies = request_cookies(&headers);
        assert_eq!(cookies.len(), 3);
        assert_eq!(cookies["b"], "2");
        assert_eq!(cookies["c"], "3");
    }

    #[test]
    fn test_malformed_cookie_skipped() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("novalue; ok=yes"));
        let cookies = request_cookies(&headers);
        assert_eq!(cookies.get("ok").map(String::as_str), Some("yes"));
    }
}
