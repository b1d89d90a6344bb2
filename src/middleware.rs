use axum::{
    body::{to_bytes, Body, HttpBody},
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::any::Any;

use crate::error::{internal_error, AppError};

/// Largest request body the access log buffers and prints.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub const ALLOW_METHODS: &str = "GET,HEAD,OPTIONS,POST,PUT";
pub const ALLOW_HEADERS: &str = "Origin,Accept, X-Requested-With, Content-Type, \
    Access-Control-Request-Method, Access-Control-Request-Headers";

/// Logs method and URI, plus the body when one was sent. Bodies of known
/// size up to [`MAX_BODY_BYTES`] are buffered, printed and handed on
/// unchanged; anything else streams through unlogged and size limits are left
/// to the extractors.
pub async fn log_request(req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();
    tracing::info!(method = %parts.method, uri = %parts.uri, "request");

    let size = body.size_hint();
    let bufferable = size
        .upper()
        .is_some_and(|upper| upper <= MAX_BODY_BYTES as u64);
    if !bufferable {
        tracing::info!(min_bytes = size.lower(), "request body not logged");
        return next.run(Request::from_parts(parts, body)).await;
    }

    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        // The body ended short of its declared size; no handler could use it.
        Err(err) => {
            tracing::warn!(error = %err, "failed to read request body");
            return AppError::InvalidBody.into_response();
        }
    };
    if !bytes.iter().all(u8::is_ascii_whitespace) {
        tracing::info!(body = %String::from_utf8_lossy(&bytes), "request body");
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// Answers every OPTIONS request with an empty 200.
pub async fn preflight(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    next.run(req).await
}

pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "handler panicked");
    internal_error()
}
