//! Streaming and slow-response endpoints.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::stream;

use crate::config::parse_duration;
use crate::handlers::status::parse_status_code;
use crate::http::error::{HandlerResult, HttpBinError};
use crate::http::request::{parse_body, RequestContext};
use crate::http::response::{json_ok, StreamResponse, JSON_CONTENT_TYPE};
use crate::http::server::AppState;

/// Most lines `/stream/{n}` will produce.
pub const MAX_STREAM_LINES: usize = 100;

/// Parse a non-negative duration: `1.5`, `1s`, `500ms`, `2m`.
pub fn parse_seconds(raw: &str) -> Option<Duration> {
    parse_duration(raw).ok()
}

/// `/stream/{n}`
pub async fn stream(ctx: RequestContext, Path(raw): Path<String>) -> HandlerResult<Response> {
    let n = raw
        .parse::<usize>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| HttpBinError::bad_request("Invalid count"))?
        .min(MAX_STREAM_LINES);

    let lines = (0..n)
        .map(|id| {
            let line = StreamResponse {
                id,
                args: ctx.args.clone(),
                headers: ctx.echo_headers(),
                origin: ctx.origin.clone(),
                url: ctx.url.clone(),
            };
            let mut bytes = serde_json::to_vec(&line).map_err(|e| HttpBinError::Internal(e.to_string()))?;
            bytes.push(b'\n');
            Ok(Bytes::from(bytes))
        })
        .collect::<HandlerResult<Vec<_>>>()?;

    let body = Body::from_stream(stream::iter(lines.into_iter().map(Ok::<_, Infallible>)));
    Ok((
        [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
        body,
    )
        .into_response())
}

/// `/delay/{secs}`; the sleep is capped at the configured maximum duration.
pub async fn delay(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(raw): Path<String>,
    body: Bytes,
) -> HandlerResult<Response> {
    let requested = parse_seconds(&raw).ok_or_else(|| HttpBinError::bad_request("Invalid duration"))?;
    let max = state.config.max_duration();
    if requested > max {
        tracing::debug!(requested_ms = requested.as_millis() as u64, max_ms = max.as_millis() as u64, "Clamping delay");
    }

    tokio::time::sleep(requested.min(max)).await;
    let resp = parse_body(&ctx, body).await?;
    Ok(json_ok(&resp))
}

/// Validated `/drip` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DripParams {
    pub duration: Duration,
    pub delay: Duration,
    pub num_bytes: u64,
    pub code: u16,
}

impl DripParams {
    pub fn from_context(ctx: &RequestContext, state: &AppState) -> HandlerResult<Self> {
        let defaults = &state.config.defaults;
        let seconds = |name: &str, default: Duration| -> HandlerResult<Duration> {
            match ctx.arg(name) {
                Some(raw) => parse_seconds(raw)
                    .ok_or_else(|| HttpBinError::bad_request(format!("Invalid {}", name))),
                None => Ok(default),
            }
        };

        let duration = seconds("duration", defaults.drip_duration())?;
        let delay = seconds("delay", defaults.drip_delay())?;
        let num_bytes = match ctx.arg("numbytes") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|n| (1..=state.config.limits.max_body_size).contains(n))
                .ok_or_else(|| HttpBinError::bad_request("Invalid numbytes"))?,
            None => defaults.drip_num_bytes,
        };
        let code = match ctx.arg("code") {
            Some(raw) => parse_status_code(raw)?,
            None => 200,
        };

        if duration + delay > state.config.max_duration() {
            return Err(HttpBinError::bad_request("Too much time"));
        }
        Ok(Self {
            duration,
            delay,
            num_bytes,
            code,
        })
    }

    /// Pause between consecutive bytes.
    pub fn interval(&self) -> Duration {
        self.duration.div_f64(self.num_bytes.max(1) as f64)
    }
}

/// `/drip`: waits `delay`, then writes `numbytes` asterisks spread over `duration`.
pub async fn drip(State(state): State<AppState>, ctx: RequestContext) -> HandlerResult<Response> {
    let params = DripParams::from_context(&ctx, &state)?;
    let status = StatusCode::from_u16(params.code).map_err(|_| HttpBinError::bad_request("Invalid status code"))?;
    let interval = params.interval();
    let total = params.num_bytes;
    let delay = params.delay;

    // Each byte is followed by one interval, so the last pause ends at
    // `delay + duration`.
    let body = stream::unfold((0u64, delay), move |(sent, pause)| async move {
        tokio::time::sleep(pause).await;
        if sent >= total {
            return None;
        }
        Some((Ok::<_, Infallible>(Bytes::from_static(b"*")), (sent + 1, interval)))
    });

    Ok((
        status,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream")),
            (header::CONTENT_LENGTH, HeaderValue::from(total)),
        ],
        Body::from_stream(body),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("1.5"), Some(Duration::from_millis(1500)));
        assert_eq!(parse_seconds("0"), Some(Duration::ZERO));
        assert_eq!(parse_seconds("1s"), Some(Duration::from_secs(1)));
        assert_eq!(parse_seconds("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_seconds("1e400"), None);
        assert_eq!(parse_seconds("-1"), None);
        assert_eq!(parse_seconds("NaN"), None);
        assert_eq!(parse_seconds("soon"), None);
    }

    #[test]
    fn test_drip_interval() {
        let params = DripParams {
            duration: Duration::from_secs(2),
            delay: Duration::ZERO,
            num_bytes: 4,
            code: 200,
        };
        assert_eq!(params.interval(), Duration::from_millis(500));
    }
}
