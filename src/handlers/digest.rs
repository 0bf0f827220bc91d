//! HTTP digest authentication (RFC 7616).
//!
//! The service is stateless, so nonces are not tracked: any nonce echoed back
//! with a correct response hash is accepted.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use md5::Md5;
use sha2::{Digest, Sha256};

use crate::http::error::{HandlerResult, HttpBinError};
use crate::http::request::RequestContext;
use crate::http::response::{json_ok, DigestAuthResponse};

pub const DIGEST_REALM: &str = "go-httpbin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Md5,
    Sha256,
}

impl Algorithm {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "MD5" => Some(Self::Md5),
            "SHA-256" => Some(Self::Sha256),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha256 => "SHA-256",
        }
    }

    pub fn hash(self, data: &[u8]) -> String {
        match self {
            Self::Md5 => hex::encode(Md5::digest(data)),
            Self::Sha256 => hex::encode(Sha256::digest(data)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qop {
    Auth,
    AuthInt,
}

impl Qop {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "auth" => Some(Self::Auth),
            "auth-int" => Some(Self::AuthInt),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::AuthInt => "auth-int",
        }
    }
}

/// Parse the parameter list of a `Digest` authorization header.
pub fn parse_digest_params(value: &str) -> Option<HashMap<String, String>> {
    let (scheme, rest) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("digest") {
        return None;
    }

    let mut params = HashMap::new();
    let mut chars = rest.chars().peekable();
    loop {
        while chars.peek().is_some_and(|c| *c == ',' || c.is_whitespace()) {
            chars.next();
        }
        let mut key = String::new();
        while let Some(c) = chars.next_if(|c| *c != '=') {
            key.push(c);
        }
        if key.is_empty() {
            break;
        }
        chars.next()?;

        let mut val = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            loop {
                match chars.next()? {
                    '\\' => val.push(chars.next()?),
                    '"' => break,
                    c => val.push(c),
                }
            }
        } else {
            while let Some(c) = chars.next_if(|c| *c != ',') {
                val.push(c);
            }
        }
        params.insert(key.trim().to_ascii_lowercase(), val.trim().to_string());
    }
    Some(params)
}

/// Expected `response` value for the supplied parameters.
pub fn expected_response(
    algorithm: Algorithm,
    params: &HashMap<String, String>,
    method: &Method,
    passwd: &str,
    body: &[u8],
) -> Option<String> {
    let username = params.get("username")?;
    let realm = params.get("realm")?;
    let nonce = params.get("nonce")?;
    let uri = params.get("uri")?;

    let ha1 = algorithm.hash(format!("{}:{}:{}", username, realm, passwd).as_bytes());
    let qop = params.get("qop").map(String::as_str);
    let ha2 = match qop {
        Some("auth-int") => algorithm.hash(
            format!("{}:{}:{}", method, uri, algorithm.hash(body)).as_bytes(),
        ),
        _ => algorithm.hash(format!("{}:{}", method, uri).as_bytes()),
    };

    let input = match qop {
        Some(qop @ ("auth" | "auth-int")) => format!(
            "{}:{}:{}:{}:{}:{}",
            ha1,
            nonce,
            params.get("nc")?,
            params.get("cnonce")?,
            qop,
            ha2
        ),
        Some(_) => return None,
        None => format!("{}:{}:{}", ha1, nonce, ha2),
    };
    Some(algorithm.hash(input.as_bytes()))
}

fn authenticated(
    ctx: &RequestContext,
    user: &str,
    passwd: &str,
    algorithm: Algorithm,
    body: &[u8],
) -> bool {
    let Some(params) = ctx
        .header(header::AUTHORIZATION.as_str())
        .and_then(parse_digest_params)
    else {
        return false;
    };
    if params.get("username").map(String::as_str) != Some(user) {
        return false;
    }
    if let Some(alg) = params.get("algorithm") {
        if Algorithm::parse(alg) != Some(algorithm) {
            return false;
        }
    }
    match (
        expected_response(algorithm, &params, &ctx.client_method(), passwd, body),
        params.get("response"),
    ) {
        (Some(expected), Some(actual)) => expected.eq_ignore_ascii_case(actual),
        _ => false,
    }
}

fn challenge(qop: Qop, algorithm: Algorithm) -> HandlerResult<Response> {
    let nonce = hex::encode(rand::random::<[u8; 16]>());
    let opaque = hex::encode(rand::random::<[u8; 16]>());
    let value = format!(
        r#"Digest realm="{}", qop="{}", nonce="{}", opaque="{}", algorithm={}, stale=FALSE"#,
        DIGEST_REALM,
        qop.name(),
        nonce,
        opaque,
        algorithm.name()
    );
    let value = HeaderValue::from_str(&value)
        .map_err(|e| HttpBinError::bad_request(e.to_string()))?;
    Ok((StatusCode::UNAUTHORIZED, [(header::WWW_AUTHENTICATE, value)]).into_response())
}

async fn digest(
    ctx: RequestContext,
    qop: String,
    user: String,
    passwd: String,
    algorithm: Option<String>,
    body: Bytes,
) -> HandlerResult<Response> {
    let qop = Qop::parse(&qop).ok_or_else(|| HttpBinError::bad_request("Invalid QOP directive"))?;
    let algorithm = match algorithm {
        Some(raw) => {
            Algorithm::parse(&raw).ok_or_else(|| HttpBinError::bad_request("Invalid algorithm"))?
        }
        None => Algorithm::Md5,
    };

    if !authenticated(&ctx, &user, &passwd, algorithm, &body) {
        return challenge(qop, algorithm);
    }
    Ok(json_ok(&DigestAuthResponse {
        authenticated: true,
        user,
    }))
}

/// `/digest-auth/{qop}/{user}/{passwd}`
pub async fn digest_auth(
    ctx: RequestContext,
    Path((qop, user, passwd)): Path<(String, String, String)>,
    body: Bytes,
) -> HandlerResult<Response> {
    digest(ctx, qop, user, passwd, None, body).await
}

/// `/digest-auth/{qop}/{user}/{passwd}/{algorithm}`
pub async fn digest_auth_with_algorithm(
    ctx: RequestContext,
    Path((qop, user, passwd, algorithm)): Path<(String, String, String, String)>,
    body: Bytes,
) -> HandlerResult<Response> {
    digest(ctx, qop, user, passwd, Some(algorithm), body).await
}
