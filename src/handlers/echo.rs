//! Endpoints that echo the request back.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::error::{HandlerResult, HttpBinError};
use crate::http::headers::{canonical_name, header_multimap};
use crate::http::request::{parse_body, RequestContext};
use crate::http::response::{
    json_ok, GetResponse, HeadersResponse, HostnameResponse, IpResponse, UserAgentResponse,
    JSON_CONTENT_TYPE, TEXT_CONTENT_TYPE,
};
use crate::http::server::AppState;

/// `/get` and `/head`.
pub async fn get(ctx: RequestContext) -> Response {
    json_ok(&GetResponse::from_context(&ctx))
}

/// `/post`, `/put`, `/patch`, `/delete` and `/anything`.
pub async fn request_with_body(ctx: RequestContext, body: Bytes) -> HandlerResult<Response> {
    let resp = parse_body(&ctx, body).await?;
    Ok(json_ok(&resp))
}

pub async fn ip(ctx: RequestContext) -> Response {
    json_ok(&IpResponse { origin: ctx.origin })
}

pub async fn user_agent(ctx: RequestContext) -> Response {
    let user_agent = ctx.header(header::USER_AGENT.as_str()).unwrap_or_default().to_string();
    json_ok(&UserAgentResponse { user_agent })
}

pub async fn headers(ctx: RequestContext) -> Response {
    json_ok(&HeadersResponse { headers: ctx.echo_headers() })
}

pub async fn hostname(State(state): State<AppState>) -> Response {
    json_ok(&HostnameResponse {
        hostname: state.config.hostname.clone(),
    })
}

/// Every query pair becomes a response header; the body is those headers as JSON.
pub async fn response_headers(ctx: RequestContext) -> HandlerResult<Response> {
    let mut headers = HeaderMap::new();
    for (key, values) in &ctx.args {
        let name = HeaderName::from_bytes(canonical_name(key).as_bytes())
            .map_err(|_| HttpBinError::bad_request(format!("Invalid header name {:?}", key)))?;
        for value in values {
            let value = HeaderValue::from_str(value)
                .map_err(|_| HttpBinError::bad_request(format!("Invalid header value for {:?}", key)))?;
            headers.append(name.clone(), value);
        }
    }
    if !headers.contains_key(header::CONTENT_TYPE) {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    }

    let body = serde_json::to_vec(&header_multimap(&headers, None))
        .map_err(|e| HttpBinError::bad_request(e.to_string()))?;
    Ok((StatusCode::OK, headers, body).into_response())
}

/// Raw text dump of the request as received.
pub async fn dump_request(ctx: RequestContext, body: Bytes) -> Response {
    let mut dump = format!("{} {} HTTP/1.1\r\n", ctx.method, ctx.path_and_query());
    dump.push_str(&format!("Host: {}\r\n", ctx.host()));
    for (name, values) in ctx.echo_headers() {
        if name == "Host" {
            continue;
        }
        for value in values {
            dump.push_str(&format!("{}: {}\r\n", name, value));
        }
    }
    dump.push_str("\r\n");
    dump.push_str(&String::from_utf8_lossy(&body));

    ([(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], dump).into_response()
}
