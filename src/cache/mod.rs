//! WSDL caching subsystem.
//!
//! # Data Flow
//! ```text
//! WSDL request (target URL)
//!     → wsdl.rs get(url): hash URL → <dir>/<hash>.wsdl
//!         fresh (mtime within TTL) → content
//!         stale → file removed → absent
//!     → on absent, caller fetches upstream and calls put(url, content)
//!         write temp file → rename over <hash>.wsdl
//! ```
//!
//! # Design Decisions
//! - Read-through helper only; never calls the upstream itself
//! - Lazy expiry on read instead of a sweeper task
//! - Rename-based writes so readers never see a partial file

pub mod wsdl;

pub use wsdl::{CacheError, WsdlCache, DEFAULT_TTL};
