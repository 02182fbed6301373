//! Inbound request capture.
//!
//! # Responsibilities
//! - Buffer the inbound body (the SOAP envelope is needed whole)
//! - Snapshot the headers the proxy acts on into a [`ProxyRequest`]
//! - Expose the request ID assigned by the request-id layer
//!
//! # Design Decisions
//! - The snapshot is immutable and owned; nothing downstream sees the axum request
//! - Header values that are not visible ASCII are treated as absent

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, HeaderName, Method, Request};
use bytes::Bytes;

use crate::proxy::ProxyError;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

const SOAP_ACTION: HeaderName = HeaderName::from_static("soapaction");

/// Immutable snapshot of one inbound call.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    /// Original request URI, path and query.
    pub uri: String,
    pub body: Bytes,
    pub content_type: Option<String>,
    pub soap_action: Option<String>,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
}

impl ProxyRequest {
    /// A request with no body and no headers.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            body: Bytes::new(),
            content_type: None,
            soap_action: None,
            authorization: None,
            request_id: None,
        }
    }

    /// Snapshot an axum request, reading at most `body_limit` body bytes.
    pub async fn from_http(request: Request<Body>, body_limit: usize) -> Result<Self, ProxyError> {
        let (parts, body) = request.into_parts();
        let body = to_bytes(body, body_limit)
            .await
            .map_err(ProxyError::InboundBody)?;

        let uri = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        Ok(Self {
            method: parts.method,
            uri,
            body,
            content_type: header_str(&parts.headers, &header::CONTENT_TYPE),
            soap_action: header_str(&parts.headers, &SOAP_ACTION),
            authorization: header_str(&parts.headers, &header::AUTHORIZATION),
            request_id: header_str(&parts.headers, &HeaderName::from_static(X_REQUEST_ID)),
        })
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_content_type(mut self, value: impl Into<String>) -> Self {
        self.content_type = Some(value.into());
        self
    }

    pub fn with_soap_action(mut self, value: impl Into<String>) -> Self {
        self.soap_action = Some(value.into());
        self
    }

    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    /// Request ID for logging, `unknown` when none was assigned.
    pub fn request_id(&self) -> &str {
        self.request_id.as_deref().unwrap_or("unknown")
    }
}

fn header_str(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
