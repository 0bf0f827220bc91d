//! Compressed response endpoints.

use std::io::Write;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use flate2::{
    write::{GzEncoder, ZlibEncoder},
    Compression,
};
use serde::Serialize;

use crate::http::error::{HandlerResult, HttpBinError};
use crate::http::request::RequestContext;
use crate::http::response::{DeflateResponse, GzipResponse, JSON_CONTENT_TYPE};

fn compressed<W, T>(mut encoder: W, body: &T) -> std::io::Result<Vec<u8>>
where
    W: Write + Finish,
    T: Serialize,
{
    serde_json::to_writer(&mut encoder, body)?;
    encoder.finish_encoding()
}

/// Common finishing step of the flate2 writers.
trait Finish {
    fn finish_encoding(self) -> std::io::Result<Vec<u8>>;
}

impl Finish for GzEncoder<Vec<u8>> {
    fn finish_encoding(self) -> std::io::Result<Vec<u8>> {
        self.finish()
    }
}

impl Finish for ZlibEncoder<Vec<u8>> {
    fn finish_encoding(self) -> std::io::Result<Vec<u8>> {
        self.finish()
    }
}

fn encoded_response(encoding: &'static str, body: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE)),
            (header::CONTENT_ENCODING, HeaderValue::from_static(encoding)),
        ],
        body,
    )
        .into_response()
}

fn internal(e: std::io::Error) -> HttpBinError {
    tracing::error!(error = %e, "Compression failed");
    HttpBinError::Internal(e.to_string())
}

/// `/gzip`
pub async fn gzip(ctx: RequestContext) -> HandlerResult<Response> {
    let body = GzipResponse {
        args: ctx.args.clone(),
        headers: ctx.echo_headers(),
        origin: ctx.origin.clone(),
        gzipped: true,
    };
    let bytes = compressed(GzEncoder::new(Vec::new(), Compression::default()), &body).map_err(internal)?;
    Ok(encoded_response("gzip", bytes))
}

/// `/deflate`
pub async fn deflate(ctx: RequestContext) -> HandlerResult<Response> {
    let body = DeflateResponse {
        args: ctx.args.clone(),
        headers: ctx.echo_headers(),
        origin: ctx.origin.clone(),
        deflated: true,
    };
    let bytes = compressed(ZlibEncoder::new(Vec::new(), Compression::default()), &body).map_err(internal)?;
    Ok(encoded_response("deflate", bytes))
}

/// `/brotli` is not supported.
pub async fn brotli() -> HttpBinError {
    HttpBinError::NotImplemented
}
