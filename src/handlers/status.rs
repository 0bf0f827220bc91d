//! Status code endpoints.

use axum::{
    extract::Path,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::http::error::{HandlerResult, HttpBinError};
use crate::http::request::RequestContext;
use crate::http::response::{json_response, TEXT_CONTENT_TYPE};

/// Media types `/image` can produce; reported in 406 bodies.
pub const ACCEPTED_IMAGE_TYPES: &[&str] = &[
    "image/webp",
    "image/svg+xml",
    "image/jpeg",
    "image/png",
    "image/*",
];

/// One entry of a weighted status choice list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedStatus {
    pub code: u16,
    pub weight: f64,
}

/// Parse a status code in the 100..=599 range.
pub fn parse_status_code(raw: &str) -> Result<u16, HttpBinError> {
    parse_bounded_status(raw, 100, 599)
}

pub fn parse_bounded_status(raw: &str, min: u16, max: u16) -> Result<u16, HttpBinError> {
    raw.trim()
        .parse::<u16>()
        .ok()
        .filter(|code| (min..=max).contains(code))
        .ok_or_else(|| HttpBinError::bad_request("Invalid status code"))
}

/// Parse `200:0.5,500,503:2` style choice lists. A missing weight is 1.
pub fn parse_status_choices(raw: &str) -> Result<Vec<WeightedStatus>, HttpBinError> {
    raw.split(',')
        .map(|choice| {
            let (code, weight) = match choice.split_once(':') {
                Some((code, weight)) => {
                    let weight: f64 = weight
                        .trim()
                        .parse()
                        .ok()
                        .filter(|w: &f64| w.is_finite() && *w >= 0.0)
                        .ok_or_else(|| HttpBinError::bad_request("Invalid status code weight"))?;
                    (code, weight)
                }
                None => (choice, 1.0),
            };
            Ok(WeightedStatus {
                code: parse_status_code(code)?,
                weight,
            })
        })
        .collect()
}

/// Pick a code with probability proportional to its weight.
pub fn weighted_choice(choices: &[WeightedStatus], rng: &mut fastrand::Rng) -> u16 {
    let total: f64 = choices.iter().map(|c| c.weight).sum();
    if total <= 0.0 {
        return choices[rng.usize(..choices.len())].code;
    }
    let mut point = rng.f64() * total;
    for choice in choices {
        if point < choice.weight {
            return choice.code;
        }
        point -= choice.weight;
    }
    choices[choices.len() - 1].code
}

/// `/status/{codes}`
pub async fn status(Path(raw): Path<String>) -> HandlerResult<Response> {
    let code = if raw.contains(',') {
        let choices = parse_status_choices(&raw)?;
        weighted_choice(&choices, &mut fastrand::Rng::new())
    } else {
        parse_status_code(&raw)?
    };
    Ok(status_response(code))
}

/// Build the response for a status code, with the special cases httpbin clients expect.
pub fn status_response(code: u16) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    match code {
        301 | 302 | 303 | 305 | 307 => {
            (status, [(header::LOCATION, "/redirect/1")]).into_response()
        }
        401 => (
            status,
            [(header::WWW_AUTHENTICATE, r#"Basic realm="Fake Realm""#)],
        )
            .into_response(),
        402 => (
            status,
            [
                (header::CONTENT_TYPE, HeaderValue::from_static(TEXT_CONTENT_TYPE)),
                (
                    header::HeaderName::from_static("x-more-info"),
                    HeaderValue::from_static("http://vimeo.com/22053820"),
                ),
            ],
            "Fuck you, pay me!",
        )
            .into_response(),
        406 => json_response(
            status,
            &json!({
                "message": "Client did not request a supported media type",
                "accept": ACCEPTED_IMAGE_TYPES,
            }),
        ),
        407 => (
            status,
            [(header::PROXY_AUTHENTICATE, r#"Basic realm="Fake Realm""#)],
        )
            .into_response(),
        418 => (
            status,
            [
                (header::CONTENT_TYPE, HeaderValue::from_static(TEXT_CONTENT_TYPE)),
                (
                    header::HeaderName::from_static("x-more-info"),
                    HeaderValue::from_static("http://tools.ietf.org/html/rfc2324"),
                ),
            ],
            "I'm a teapot!",
        )
            .into_response(),
        _ => status.into_response(),
    }
}

/// `/unstable?failure_rate=0.5&seed=N`
pub async fn unstable(ctx: RequestContext) -> HandlerResult<Response> {
    let failure_rate = match ctx.arg("failure_rate") {
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|r| (0.0..=1.0).contains(r))
            .ok_or_else(|| HttpBinError::bad_request("Invalid failure rate"))?,
        None => 0.5,
    };
    let mut rng = match ctx.arg("seed") {
        Some(raw) => {
            let seed: i64 = raw
                .parse()
                .map_err(|_| HttpBinError::bad_request("Invalid seed"))?;
            fastrand::Rng::with_seed(seed as u64)
        }
        None => fastrand::Rng::new(),
    };

    let status = if rng.f64() < failure_rate {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };
    Ok(status.into_response())
}
