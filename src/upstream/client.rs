//! Upstream HTTP client.
//!
//! # Responsibilities
//! - Acquire a pooled handle for the target host, or open a fresh one
//! - Merge per-call headers with the forced `Connection: keep-alive`
//! - Execute one call and report status plus raw body
//! - Hand the handle back to the pool only after a successful call
//!
//! # Design Decisions
//! - HTTP status is reported, never judged; callers decide what 200 means
//! - Transport failures drop the handle so a broken connection is never reused
//! - No retries; timeouts come from `ConnectionSettings`

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::upstream::connection::{ConnectionSettings, PooledHandle, UpstreamConnection};
use crate::upstream::pool::ConnectionPool;

/// Transport-level failure talking to the upstream.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid upstream URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("could not initialise upstream connection: {0}")]
    Connect(#[source] reqwest::Error),
    #[error("upstream request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// One outbound request.
#[derive(Debug, Clone)]
pub struct UpstreamCall {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl UpstreamCall {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Add a header. Values that are not valid header text are skipped.
    pub fn header(mut self, name: HeaderName, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(name, value);
            }
            Err(_) => {
                tracing::warn!(header = %name, "Dropping header with invalid value");
            }
        }
        self
    }

    pub fn body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }
}

/// Status code and raw body of a completed upstream call.
#[derive(Debug, Clone)]
pub struct UpstreamCallResult {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Executes upstream calls over pooled keep-alive connections.
#[derive(Clone)]
pub struct UpstreamClient {
    pool: Arc<ConnectionPool<UpstreamConnection>>,
    settings: ConnectionSettings,
}

impl UpstreamClient {
    /// Create a client sharing `pool`.
    pub fn new(settings: ConnectionSettings, pool: Arc<ConnectionPool<UpstreamConnection>>) -> Self {
        Self { pool, settings }
    }

    /// Create a client with its own pool from upstream configuration.
    pub fn from_config(config: &UpstreamConfig) -> Self {
        let settings = ConnectionSettings::from(config);
        let pool = Arc::new(ConnectionPool::new(settings.max_idle));
        Self::new(settings, pool)
    }

    /// The pool this client draws connections from.
    pub fn pool(&self) -> &Arc<ConnectionPool<UpstreamConnection>> {
        &self.pool
    }

    /// Execute `call` and return the upstream status and body.
    pub async fn execute(&self, call: UpstreamCall) -> Result<UpstreamCallResult, TransportError> {
        let url = Url::parse(&call.url).map_err(|e| TransportError::InvalidUrl {
            url: call.url.clone(),
            reason: e.to_string(),
        })?;
        let host = pool_key(&url).ok_or_else(|| TransportError::InvalidUrl {
            url: call.url.clone(),
            reason: "missing host".to_string(),
        })?;

        let connection = match self.pool.acquire(&host, &url).await {
            Some(connection) => connection,
            None => UpstreamConnection::open(url.clone(), &self.settings)?,
        };

        let mut headers = call.headers;
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));

        tracing::debug!(
            connection_id = %connection.id(),
            method = %call.method,
            url = %url,
            headers = ?headers.keys().map(HeaderName::as_str).collect::<Vec<_>>(),
            body_bytes = call.body.as_ref().map_or(0, Bytes::len),
            "Sending upstream request"
        );

        match connection.send(call.method, headers, call.body).await {
            Ok(result) => {
                tracing::debug!(
                    connection_id = %connection.id(),
                    status = %result.status,
                    body_bytes = result.body.len(),
                    "Upstream responded"
                );
                metrics::record_upstream_call(result.status.as_str());

                if result.status.is_success() {
                    self.pool.release(&host, connection);
                } else {
                    connection.close();
                }
                Ok(result)
            }
            Err(source) => {
                tracing::error!(
                    connection_id = %connection.id(),
                    url = %url,
                    error = %source,
                    timeout = source.is_timeout(),
                    connect = source.is_connect(),
                    "Upstream transport error"
                );
                metrics::record_upstream_call("transport_error");
                connection.close();
                Err(TransportError::Request {
                    url: url.to_string(),
                    source,
                })
            }
        }
    }
}

/// Pool key for a URL: host, plus the port when one is given explicitly.
fn pool_key(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
