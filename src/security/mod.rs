//! Security subsystem.
//!
//! # Responsibilities
//! - Decode inbound Basic-Auth credentials
//! - Re-encode them for the upstream call
//!
//! # Design Decisions
//! - Passwords never appear in logs or Debug output
//! - Upstream TLS verification lives in the upstream client settings, not here

pub mod credentials;

pub use credentials::{AuthError, Credentials};
