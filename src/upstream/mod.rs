//! Upstream connection subsystem.
//!
//! # Data Flow
//! ```text
//! UpstreamCall (method, target URL, headers, body)
//!     → client.rs (host key from URL)
//!     → pool.rs acquire(host): idle sweep → probe → rebind
//!         or connection.rs open() with the transport baseline
//!     → send, read full body
//!     → 2xx: pool.rs release(host)   otherwise: handle dropped
//!     → UpstreamCallResult (status, body) or TransportError
//! ```
//!
//! # Design Decisions
//! - The pool is an explicit object shared via Arc, never a static
//! - Handles move in and out of the pool by value; never shared in flight
//! - TLS verification is fixed per handle from configuration

pub mod client;
pub mod connection;
pub mod pool;

pub use client::{TransportError, UpstreamCall, UpstreamCallResult, UpstreamClient};
pub use connection::{ConnectionId, ConnectionSettings, PooledHandle, UpstreamConnection};
pub use pool::{ConnectionPool, DEFAULT_MAX_IDLE};
