//! Proxy orchestration.
//!
//! # Data Flow
//! ```text
//! ProxyRequest
//!     → RequestClassifier (WSDL discovery or SOAP call, target URL)
//!     → wsdl.rs: WsdlCache → (miss) UpstreamClient GET → validate → cache
//!     → soap.rs: SoapVersion + action → UpstreamClient POST → validate
//!     → http::response (200 with body, or the single 500 for any ProxyError)
//! ```
//!
//! # Design Decisions
//! - One closed error type, matched once at this boundary
//! - Credentials are only required when an upstream call is about to happen
//! - No retries; a failed call is a failed request

pub mod error;
mod soap;
mod wsdl;

pub use error::{ProxyError, UpstreamError};

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use bytes::Bytes;
use std::time::{Duration, Instant};
use tracing::Instrument;

use crate::cache::{CacheError, WsdlCache};
use crate::config::ProxyConfig;
use crate::http::{response, ProxyRequest};
use crate::observability::metrics;
use crate::routing::{Classification, RequestClassifier};
use crate::soap::SoapVersion;
use crate::upstream::UpstreamClient;

/// Successful result of one call, before rendering.
#[derive(Debug)]
pub enum ProxyOutcome {
    Wsdl(Bytes),
    Soap { version: SoapVersion, body: Bytes },
}

/// Serves WSDL discovery and SOAP calls against one upstream host.
pub struct SoapProxy {
    classifier: RequestClassifier,
    cache: WsdlCache,
    upstream: UpstreamClient,
    debug: bool,
}

impl SoapProxy {
    pub fn new(
        classifier: RequestClassifier,
        cache: WsdlCache,
        upstream: UpstreamClient,
        debug: bool,
    ) -> Self {
        Self {
            classifier,
            cache,
            upstream,
            debug,
        }
    }

    /// Build the proxy from configuration, opening the WSDL cache directory.
    pub async fn from_config(config: &ProxyConfig) -> Result<Self, CacheError> {
        let classifier =
            RequestClassifier::new(config.proxy.target_host.as_str(), config.proxy.mount_path.as_str());
        let cache = WsdlCache::open(
            config.cache.directory.clone(),
            Duration::from_secs(config.cache.ttl_secs),
        )
        .await?;
        let upstream = UpstreamClient::from_config(&config.upstream);

        Ok(Self::new(classifier, cache, upstream, config.proxy.debug))
    }

    /// Serve a raw HTTP request, reading at most `body_limit` body bytes.
    ///
    /// A body that cannot be read is answered like any other failure and
    /// counted under kind `unknown`.
    pub async fn handle_http(&self, request: Request<Body>, body_limit: usize) -> Response {
        let start = Instant::now();
        match ProxyRequest::from_http(request, body_limit).await {
            Ok(request) => self.handle_since(request, start).await,
            Err(err) => {
                let response = self.reject(&err);
                metrics::record_request("unknown", response.status().as_u16(), start);
                response
            }
        }
    }

    /// Serve one inbound call. Never fails; errors become a 500 response.
    pub async fn handle(&self, request: ProxyRequest) -> Response {
        self.handle_since(request, Instant::now()).await
    }

    async fn handle_since(&self, request: ProxyRequest, start: Instant) -> Response {
        let span = tracing::info_span!("proxy_request", request_id = %request.request_id());
        self.handle_inner(request, start).instrument(span).await
    }

    async fn handle_inner(&self, request: ProxyRequest, start: Instant) -> Response {
        let classification = self.classifier.classify(&request.method, &request.uri);
        let kind = if classification.is_wsdl_request { "wsdl" } else { "soap" };

        tracing::info!(
            method = %request.method,
            uri = %request.uri,
            target_url = %classification.target_url,
            kind,
            "Request classified"
        );

        let response = match self.dispatch(&request, &classification).await {
            Ok(outcome) => self.render(outcome),
            Err(err) => self.reject(&err),
        };

        metrics::record_request(kind, response.status().as_u16(), start);
        response
    }

    /// Log `err` and render it as the proxy's error response.
    pub fn reject(&self, err: &ProxyError) -> Response {
        tracing::error!(error = %err, error_kind = err.kind(), "SOAP proxy request failed");
        response::error_response(err, self.debug)
    }

    async fn dispatch(
        &self,
        request: &ProxyRequest,
        classification: &Classification,
    ) -> Result<ProxyOutcome, ProxyError> {
        let target_url = classification.target_url.as_str();
        if classification.is_wsdl_request {
            wsdl::lookup(&self.cache, &self.upstream, target_url, request.authorization.as_deref())
                .await
                .map(ProxyOutcome::Wsdl)
        } else {
            soap::dispatch(&self.upstream, target_url, request)
                .await
                .map(|(version, body)| ProxyOutcome::Soap { version, body })
        }
    }

    fn render(&self, outcome: ProxyOutcome) -> Response {
        match outcome {
            ProxyOutcome::Wsdl(content) => response::wsdl_response(content, self.cache.ttl()),
            ProxyOutcome::Soap { version, body } => response::soap_response(version, body),
        }
    }

    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }

    pub fn cache(&self) -> &WsdlCache {
        &self.cache
    }

    pub fn debug(&self) -> bool {
        self.debug
    }
}
