//! Basic and bearer authentication endpoints.

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::http::error::HttpBinError;
use crate::http::request::RequestContext;
use crate::http::response::{json_ok, json_response, AuthResponse, BearerResponse};

/// Credentials from an `Authorization: Basic ...` header.
pub fn basic_credentials(ctx: &RequestContext) -> Option<(String, String)> {
    let value = ctx.header(header::AUTHORIZATION.as_str())?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, passwd) = decoded.split_once(':')?;
    Some((user.to_string(), passwd.to_string()))
}

fn check_basic(ctx: &RequestContext, user: &str, passwd: &str) -> bool {
    basic_credentials(ctx).is_some_and(|(u, p)| u == user && p == passwd)
}

/// `/basic-auth/{user}/{passwd}`
pub async fn basic_auth(ctx: RequestContext, Path((user, passwd)): Path<(String, String)>) -> Response {
    let authorized = check_basic(&ctx, &user, &passwd);
    let body = AuthResponse { authorized, user };
    if authorized {
        return json_ok(&body);
    }

    let mut resp = json_response(StatusCode::UNAUTHORIZED, &body);
    resp.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        header::HeaderValue::from_static(r#"Basic realm="Fake Realm""#),
    );
    resp
}

/// `/hidden-basic-auth/{user}/{passwd}`; failures look like a missing page.
pub async fn hidden_basic_auth(
    ctx: RequestContext,
    Path((user, passwd)): Path<(String, String)>,
) -> Response {
    if !check_basic(&ctx, &user, &passwd) {
        return HttpBinError::NotFound.into_response();
    }
    json_ok(&AuthResponse { authorized: true, user })
}

/// `/bearer`
pub async fn bearer(ctx: RequestContext) -> Response {
    let token = ctx
        .header(header::AUTHORIZATION.as_str())
        .and_then(|v| v.split_once(' '))
        .filter(|(scheme, token)| scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty())
        .map(|(_, token)| token.trim().to_string());

    match token {
        Some(token) => json_ok(&BearerResponse {
            authenticated: true,
            token,
        }),
        None => (StatusCode::UNAUTHORIZED, [(header::WWW_AUTHENTICATE, "Bearer")]).into_response(),
    }
}
