//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → every subscribed server stops accepting → drains → exits
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//! ```
//!
//! # Design Decisions
//! - Ordered shutdown: stop accept, drain in-flight calls, close pooled connections
//! - One coordinator shared by the proxy listener and any TLS listener

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
