//! Response construction for the proxy path.
//!
//! # Responsibilities
//! - Preflight short-circuit (204 + CORS, no upstream contact)
//! - Relay upstream responses: status, headers + CORS, streamed body
//! - Synthesize the JSON error response when the upstream is unreachable
//!
//! # Design Decisions
//! - CORS is merged onto the upstream's own headers, never onto a fresh set
//! - The upstream body is streamed through unchanged
//! - The error response is the only content the gateway authors itself

use axum::body::Body;
use axum::http::{header, HeaderValue, Response, StatusCode};
use serde::Serialize;

use crate::proxy::cors::CorsHeaders;
use crate::proxy::headers::HeaderBag;

/// Body of the 500 response returned when the upstream cannot be reached.
#[derive(Debug, Serialize)]
pub struct ProxyFailure<'a> {
    pub ok: bool,
    pub error: &'a str,
}

/// Empty 204 carrying the CORS set.
pub fn preflight(cors: &CorsHeaders) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;
    *response.headers_mut() = cors.headers().clone().into_inner();
    response
}

/// Relay an upstream response to the caller.
pub fn relay(upstream: reqwest::Response, cors: &CorsHeaders) -> Response<Body> {
    let status = upstream.status();
    let mut headers = HeaderBag::from(upstream.headers().clone());
    cors.apply(&mut headers);

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers.into_inner();
    response
}

/// 500 with `{"ok":false,"error":"<message>"}`.
pub fn upstream_failure(message: &str) -> Response<Body> {
    let body = serde_json::to_vec(&ProxyFailure {
        ok: false,
        error: message,
    })
    .unwrap_or_else(|_| br#"{"ok":false,"error":"proxy failure"}"#.to_vec());

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}
