//! Response construction helpers.
//!
//! Handlers return the host's `Response` type directly; these helpers
//! cover the shapes the router itself needs (the 404 fallback, the 500
//! mapping) plus the common text/JSON cases.

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use serde::Serialize;

pub use axum::response::Response;

/// Body of the fallback answer for unmatched path/method pairs.
pub const NOT_FOUND_BODY: &str = "Not Found";

/// Plain-text response with the given status.
pub fn text(status: StatusCode, body: impl Into<String>) -> Response {
    (status, body.into()).into_response()
}

/// JSON response with the given status.
pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(bytes) => {
            let mut res = Response::new(Body::from(bytes));
            *res.status_mut() = status;
            res.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            res
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize JSON response");
            internal_error()
        }
    }
}

/// Response without a body.
pub fn empty(status: StatusCode) -> Response {
    let mut res = Response::new(Body::empty());
    *res.status_mut() = status;
    res
}

/// The fixed 404 answer.
pub fn not_found() -> Response {
    text(StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}

/// Generic 500 used when a chain fails.
pub fn internal_error() -> Response {
    text(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}
