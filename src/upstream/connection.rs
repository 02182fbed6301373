//! Reusable upstream connection handles.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Define the handle contract the pool relies on (probe, rebind, close)
//! - Build reqwest-backed handles with the fixed transport baseline

use axum::http::{HeaderMap, Method};
use bytes::Bytes;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use url::Url;

use crate::config::UpstreamConfig;
use crate::upstream::client::{TransportError, UpstreamCallResult};

/// Global atomic counter for connection IDs.
/// Relaxed ordering: only uniqueness is needed.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for an upstream connection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "upstream-{}", self.0)
    }
}

/// A network handle the [`ConnectionPool`](crate::upstream::ConnectionPool) can hold.
///
/// Ownership moves into the pool on release and back out on acquire, so a
/// handle is never used by two calls at once.
pub trait PooledHandle: Send + 'static {
    /// Lightweight no-body request to check the handle is still usable.
    fn probe(&mut self) -> impl Future<Output = bool> + Send;

    /// Point the handle at a new destination URL.
    fn rebind(&mut self, url: Url);

    /// Release the underlying network resources.
    fn close(self);
}

/// Transport options applied to every handle at creation time.
///
/// Callers cannot change these per call; TLS verification in particular
/// always comes from configuration.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub verify_peer: bool,
    pub verify_host: bool,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub tcp_keepalive: Duration,
    pub max_idle: Duration,
}

impl From<&UpstreamConfig> for ConnectionSettings {
    fn from(config: &UpstreamConfig) -> Self {
        Self {
            verify_peer: config.ssl_verify_peer,
            verify_host: config.ssl_verify_host,
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            tcp_keepalive: Duration::from_secs(config.tcp_keepalive_secs),
            max_idle: Duration::from_secs(config.max_idle_secs),
        }
    }
}

/// Keep-alive HTTP handle to one upstream host.
#[derive(Debug)]
pub struct UpstreamConnection {
    id: ConnectionId,
    url: Url,
    client: reqwest::Client,
}

impl UpstreamConnection {
    /// Open a fresh handle for `url`.
    pub fn open(url: Url, settings: &ConnectionSettings) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .http1_only()
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(!settings.verify_peer)
            .danger_accept_invalid_hostnames(!settings.verify_host)
            .tcp_keepalive(settings.tcp_keepalive)
            .pool_max_idle_per_host(1)
            .pool_idle_timeout(settings.max_idle)
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(TransportError::Connect)?;

        let id = ConnectionId::new();
        tracing::debug!(
            connection_id = %id,
            url = %url,
            ssl_verify_peer = settings.verify_peer,
            ssl_verify_host = settings.verify_host,
            "Opened upstream connection"
        );

        Ok(Self { id, url, client })
    }

    /// This handle's ID.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Destination the next call goes to.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send one request to the bound URL and read the whole response body.
    pub async fn send(
        &self,
        method: Method,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<UpstreamCallResult, reqwest::Error> {
        let mut request = self.client.request(method, self.url.clone()).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        Ok(UpstreamCallResult { status, body })
    }
}

impl PooledHandle for UpstreamConnection {
    async fn probe(&mut self) -> bool {
        match self.client.head(self.url.clone()).send().await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(connection_id = %self.id, url = %self.url, error = %e, "Liveness probe failed");
                false
            }
        }
    }

    fn rebind(&mut self, url: Url) {
        self.url = url;
    }

    fn close(self) {
        tracing::trace!(connection_id = %self.id, "Upstream connection closed");
    }
}
