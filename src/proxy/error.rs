//! Proxy error taxonomy.
//!
//! Every failure of one inbound call ends up as a [`ProxyError`] and is
//! rendered once, at the orchestrator boundary, as a plain-text 500.

use axum::http::StatusCode;
use thiserror::Error;

use crate::cache::CacheError;
use crate::security::AuthError;
use crate::upstream::TransportError;

/// The upstream answered, but not with something the proxy can pass on.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Failed to fetch valid WSDL: {reason} (HTTP {status})")]
    InvalidWsdl {
        status: StatusCode,
        reason: &'static str,
    },
    #[error("Invalid SOAP response: {reason} (HTTP {status})")]
    InvalidSoapResponse {
        status: StatusCode,
        reason: &'static str,
    },
}

impl UpstreamError {
    pub fn status(&self) -> StatusCode {
        match self {
            UpstreamError::InvalidWsdl { status, .. }
            | UpstreamError::InvalidSoapResponse { status, .. } => *status,
        }
    }
}

/// Any failure while serving one inbound call.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("failed to read request body: {0}")]
    InboundBody(#[source] axum::Error),
}

impl ProxyError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Auth(_) => "auth",
            ProxyError::Transport(_) => "transport",
            ProxyError::Upstream(_) => "upstream",
            ProxyError::Cache(_) => "cache",
            ProxyError::InboundBody(_) => "inbound_body",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_message_passes_through() {
        let err = ProxyError::from(AuthError::UnsupportedScheme);
        assert_eq!(err.to_string(), "Only Basic authentication is supported");
        assert_eq!(err.kind(), "auth");
    }

    #[test]
    fn test_upstream_message_names_status() {
        let err = ProxyError::from(UpstreamError::InvalidSoapResponse {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            reason: "unexpected status",
        });
        assert_eq!(
            err.to_string(),
            "Invalid SOAP response: unexpected status (HTTP 500 Internal Server Error)"
        );
        assert_eq!(err.kind(), "upstream");
    }
}
