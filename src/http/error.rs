//! Client-visible handler errors.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

/// Error returned by handlers. Every variant becomes a plain-text response.
#[derive(Debug, thiserror::Error)]
pub enum HttpBinError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("404 page not found")]
    NotFound,

    #[error("Not Implemented")]
    NotImplemented,

    #[error("{0}")]
    Internal(String),
}

impl HttpBinError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            HttpBinError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpBinError::Forbidden(_) => StatusCode::FORBIDDEN,
            HttpBinError::NotFound => StatusCode::NOT_FOUND,
            HttpBinError::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            HttpBinError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpBinError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::debug!(status = %status, error = %self, "Request rejected");
        (
            status,
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            ],
            format!("{}\n", self),
        )
            .into_response()
    }
}

pub type HandlerResult<T> = Result<T, HttpBinError>;
