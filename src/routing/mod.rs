//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path + query)
//!     → classifier.rs (WSDL discovery vs SOAP call)
//!     → Return: Classification { is_wsdl_request, target_url }
//!
//! Classifier Construction (at startup):
//!     ProxySettings (target host, mount path)
//!     → Normalise target host (trailing slash trimmed)
//!     → Freeze as immutable RequestClassifier
//! ```
//!
//! # Design Decisions
//! - Classification is pure string work, no upstream call
//! - Immutable after construction (shared without locks)
//! - Mount path missing from the URI is not corrected: the full URI is
//!   appended to the target host as-is

pub mod classifier;

pub use classifier::{Classification, RequestClassifier};
