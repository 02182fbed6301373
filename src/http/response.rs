//! Outbound response construction.
//!
//! # Responsibilities
//! - WSDL documents with caching headers
//! - SOAP envelopes with the version's content type
//! - The single plain-text 500 used for every failure
//!
//! # Design Decisions
//! - Content-Length is always set explicitly; bodies are fully buffered
//! - Error details are only exposed in debug mode

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use chrono::{TimeDelta, Utc};
use std::time::Duration;

use crate::proxy::ProxyError;
use crate::soap::SoapVersion;

pub const WSDL_CONTENT_TYPE: &str = "application/wsdl+xml; charset=utf-8";
const ERROR_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
const ERROR_PREFIX: &str = "SOAP Proxy Error: ";
const GENERIC_ERROR: &str = "An internal error occurred.";

/// 200 response carrying a WSDL document cacheable for `ttl`.
pub fn wsdl_response(content: Bytes, ttl: Duration) -> Response {
    let lifetime = i64::try_from(ttl.as_secs())
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or_default();
    let expires = Utc::now() + lifetime;
    let mut response = body_response(StatusCode::OK, WSDL_CONTENT_TYPE, content);
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&format!("public, max-age={}", ttl.as_secs())) {
        headers.insert(header::CACHE_CONTROL, value);
    }
    if let Ok(value) = HeaderValue::from_str(&expires.format("%a, %d %b %Y %H:%M:%S GMT").to_string()) {
        headers.insert(header::EXPIRES, value);
    }
    response
}

/// 200 response carrying the upstream SOAP envelope.
pub fn soap_response(version: SoapVersion, body: Bytes) -> Response {
    body_response(StatusCode::OK, version.content_type(), body)
}

/// 500 plain-text response for `err`.
///
/// In debug mode the body holds the error message and its cause chain,
/// otherwise a fixed generic message.
pub fn error_response(err: &ProxyError, debug: bool) -> Response {
    let text = if debug {
        format!("{}{}", ERROR_PREFIX, describe(err))
    } else {
        format!("{}{}", ERROR_PREFIX, GENERIC_ERROR)
    };
    body_response(StatusCode::INTERNAL_SERVER_ERROR, ERROR_CONTENT_TYPE, Bytes::from(text))
}

/// Message followed by every cause not already spelled out in it.
fn describe(err: &ProxyError) -> String {
    let mut text = err.to_string();
    let mut causes = Vec::new();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            causes.push(cause_text);
        }
        source = cause.source();
    }
    if !causes.is_empty() {
        text.push_str("\n\nCaused by:");
        for cause in causes {
            text.push_str("\n    ");
            text.push_str(&cause);
        }
    }
    text
}

fn body_response(status: StatusCode, content_type: &'static str, body: Bytes) -> Response {
    let length = body.len();
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    response
}
