//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID, timeout, body limit, tracing)
//!     → request.rs (buffer body, snapshot headers into ProxyRequest)
//!     → proxy::SoapProxy (classify, cache, upstream)
//!     → response.rs (WSDL / SOAP / error bodies and headers)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{ProxyRequest, X_REQUEST_ID};
pub use server::{router, AppState, HttpServer};
