//! Generated binary payloads: random bytes and byte ranges.

use std::convert::Infallible;
use std::ops::RangeInclusive;

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::stream;

use crate::http::error::{HandlerResult, HttpBinError};
use crate::http::request::RequestContext;
use crate::http::server::AppState;

pub const DEFAULT_CHUNK_SIZE: usize = 10 * 1024;

const OCTET_STREAM: &str = "application/octet-stream";

fn parse_count(raw: &str, state: &AppState) -> HandlerResult<usize> {
    raw.parse::<u64>()
        .ok()
        .filter(|n| (1..=state.config.limits.max_body_size).contains(n))
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            HttpBinError::bad_request(format!(
                "Number of bytes must be in range 1..={}",
                state.config.limits.max_body_size
            ))
        })
}

fn seeded_rng(ctx: &RequestContext) -> HandlerResult<fastrand::Rng> {
    match ctx.arg("seed") {
        Some(raw) => raw
            .parse::<i64>()
            .map(|seed| fastrand::Rng::with_seed(seed as u64))
            .map_err(|_| HttpBinError::bad_request("Invalid seed")),
        None => Ok(fastrand::Rng::new()),
    }
}

fn random_bytes(rng: &mut fastrand::Rng, n: usize) -> Vec<u8> {
    let mut buf = vec![0u8; n];
    rng.fill(&mut buf);
    buf
}

/// `/bytes/{n}`
pub async fn bytes(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(raw): Path<String>,
) -> HandlerResult<Response> {
    let n = parse_count(&raw, &state)?;
    let mut rng = seeded_rng(&ctx)?;
    Ok((
        [(header::CONTENT_TYPE, OCTET_STREAM)],
        random_bytes(&mut rng, n),
    )
        .into_response())
}

/// `/stream-bytes/{n}`: like `/bytes` but written in `chunk_size` pieces.
pub async fn stream_bytes(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(raw): Path<String>,
) -> HandlerResult<Response> {
    let n = parse_count(&raw, &state)?;
    let chunk_size = match ctx.arg("chunk_size") {
        Some(raw) => raw
            .parse::<usize>()
            .ok()
            .filter(|c| *c >= 1)
            .ok_or_else(|| HttpBinError::bad_request("Invalid chunk_size"))?,
        None => DEFAULT_CHUNK_SIZE,
    };
    let mut rng = seeded_rng(&ctx)?;

    let chunks = stream::unfold(n, move |remaining| {
        let chunk = (remaining > 0).then(|| {
            let size = remaining.min(chunk_size);
            let bytes = Bytes::from(random_bytes(&mut rng, size));
            (Ok::<_, Infallible>(bytes), remaining - size)
        });
        async move { chunk }
    });

    Ok((
        [(header::CONTENT_TYPE, OCTET_STREAM)],
        Body::from_stream(chunks),
    )
        .into_response())
}

/// Outcome of matching a `Range` header against a body of known length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeMatch {
    /// No usable single range; serve everything.
    Full,
    Partial(RangeInclusive<usize>),
    Unsatisfiable,
}

/// Interpret `Range: bytes=...` for a body of `len` bytes. Only single ranges
/// are honoured; malformed headers and multi-range requests get the full body.
pub fn match_range(header: Option<&str>, len: usize) -> RangeMatch {
    let Some(spec) = header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeMatch::Full;
    };
    if spec.contains(',') {
        return RangeMatch::Full;
    }
    let Some((start, end)) = spec.trim().split_once('-') else {
        return RangeMatch::Full;
    };

    let (start, end) = match (start.trim(), end.trim()) {
        ("", "") => return RangeMatch::Full,
        ("", suffix) => match suffix.parse::<usize>() {
            Ok(0) => return RangeMatch::Unsatisfiable,
            Ok(suffix) => (len.saturating_sub(suffix), len - 1),
            Err(_) => return RangeMatch::Full,
        },
        (start, "") => match start.parse::<usize>() {
            Ok(start) => (start, len - 1),
            Err(_) => return RangeMatch::Full,
        },
        (start, end) => match (start.parse::<usize>(), end.parse::<usize>()) {
            (Ok(start), Ok(end)) if start <= end => (start, end.min(len - 1)),
            (Ok(_), Ok(_)) => return RangeMatch::Unsatisfiable,
            _ => return RangeMatch::Full,
        },
    };

    if start >= len {
        return RangeMatch::Unsatisfiable;
    }
    RangeMatch::Partial(start..=end)
}

/// `/range/{n}`: `n` bytes of the repeating alphabet, with `Range` support.
pub async fn range(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(raw): Path<String>,
) -> HandlerResult<Response> {
    let n = parse_count(&raw, &state)?;
    let body: Vec<u8> = (0..n).map(|i| b'a' + (i % 26) as u8).collect();

    let etag = HeaderValue::from_str(&format!("range{}", n))
        .map_err(|e| HttpBinError::Internal(e.to_string()))?;
    let common = [
        (header::ETAG, etag),
        (header::ACCEPT_RANGES, HeaderValue::from_static("bytes")),
        (header::CONTENT_TYPE, HeaderValue::from_static(OCTET_STREAM)),
    ];

    let resp = match match_range(ctx.header(header::RANGE.as_str()), n) {
        RangeMatch::Full => (StatusCode::OK, common, body).into_response(),
        RangeMatch::Partial(r) => {
            let content_range = HeaderValue::from_str(&format!("bytes {}-{}/{}", r.start(), r.end(), n))
                .map_err(|e| HttpBinError::Internal(e.to_string()))?;
            (
                StatusCode::PARTIAL_CONTENT,
                common,
                [(header::CONTENT_RANGE, content_range)],
                body[r].to_vec(),
            )
                .into_response()
        }
        RangeMatch::Unsatisfiable => {
            let content_range = HeaderValue::from_str(&format!("bytes */{}", n))
                .map_err(|e| HttpBinError::Internal(e.to_string()))?;
            (
                StatusCode::RANGE_NOT_SATISFIABLE,
                common,
                [(header::CONTENT_RANGE, content_range)],
            )
                .into_response()
        }
    };
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_range() {
        assert_eq!(match_range(None, 10), RangeMatch::Full);
        assert_eq!(match_range(Some("bytes=0-3"), 10), RangeMatch::Partial(0..=3));
        assert_eq!(match_range(Some("bytes=5-"), 10), RangeMatch::Partial(5..=9));
        assert_eq!(match_range(Some("bytes=-4"), 10), RangeMatch::Partial(6..=9));
        assert_eq!(match_range(Some("bytes=8-100"), 10), RangeMatch::Partial(8..=9));
    }

    #[test]
    fn test_unsatisfiable_and_ignored_ranges() {
        assert_eq!(match_range(Some("bytes=10-12"), 10), RangeMatch::Unsatisfiable);
        assert_eq!(match_range(Some("bytes=4-2"), 10), RangeMatch::Unsatisfiable);
        assert_eq!(match_range(Some("bytes=0-1,4-5"), 10), RangeMatch::Full);
        assert_eq!(match_range(Some("items=0-1"), 10), RangeMatch::Full);
    }

    #[test]
    fn test_seeded_bytes_are_repeatable() {
        let a = random_bytes(&mut fastrand::Rng::with_seed(1234), 32);
        let b = random_bytes(&mut fastrand::Rng::with_seed(1234), 32);
        assert_eq!(a, b);
    }
}
