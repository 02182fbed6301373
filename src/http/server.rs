//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router sending every method and path to the proxy
//! - Wire up middleware (request ID, tracing, timeout)
//! - Inbound bodies are capped in `ProxyRequest::from_http`; overflow is a proxy error
//! - Serve plain TCP via axum, or TLS via axum-server
//! - Stop accepting when the shutdown coordinator fires

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request},
    response::Response,
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ListenerConfig, ProxyConfig};
use crate::http::request::X_REQUEST_ID;
use crate::lifecycle::Shutdown;
use crate::proxy::SoapProxy;

/// Time given to in-flight TLS connections once shutdown starts.
const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<SoapProxy>,
    pub max_body_size: usize,
}

/// Build the proxy router with all middleware layers.
#[allow(deprecated)]
pub fn router(proxy: Arc<SoapProxy>, listener: &ListenerConfig) -> Router {
    let state = AppState {
        proxy,
        max_body_size: listener.max_body_size,
    };
    let request_id = HeaderName::from_static(X_REQUEST_ID);

    Router::new()
        .route("/", any(proxy_handler))
        .route("/{*path}", any(proxy_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(TimeoutLayer::new(Duration::from_secs(listener.request_timeout_secs))),
        )
}

/// HTTP server for the SOAP proxy.
pub struct HttpServer {
    router: Router,
    listener: ListenerConfig,
}

impl HttpServer {
    pub fn new(proxy: Arc<SoapProxy>, config: &ProxyConfig) -> Self {
        Self {
            router: router(proxy, &config.listener),
            listener: config.listener.clone(),
        }
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, max_body_size = self.listener.max_body_size, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.signalled())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        shutdown: Shutdown,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let signalled = shutdown.signalled();
        let drain = handle.clone();
        tokio::spawn(async move {
            signalled.await;
            drain.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Hand every request to the SOAP proxy.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.proxy.handle_http(request, state.max_body_size).await
}
