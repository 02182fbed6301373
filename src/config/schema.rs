//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the SOAP proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, TLS, body limit).
    pub listener: ListenerConfig,

    /// Upstream target and request rewriting.
    pub proxy: ProxySettings,

    /// Upstream transport options and connection pooling.
    pub upstream: UpstreamConfig,

    /// WSDL cache settings.
    pub cache: CacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,

    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,

    /// Total time allowed for one inbound request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
            max_body_size: 10 * 1024 * 1024, // 10MB
            request_timeout_secs: 120,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: PathBuf,

    /// Path to private key file (PEM).
    pub key_path: PathBuf,
}

/// Where requests go and how they are rewritten.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxySettings {
    /// Upstream SOAP host, e.g. "https://api.example.com". Required.
    pub target_host: String,

    /// Path prefix the proxy is mounted under; stripped when rewriting.
    pub mount_path: String,

    /// Verbose error responses and debug logging.
    pub debug: bool,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            target_host: String::new(),
            mount_path: "/soap-proxy".to_string(),
            debug: false,
        }
    }
}

/// Upstream transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Verify the upstream certificate chain.
    pub ssl_verify_peer: bool,

    /// Verify the upstream certificate matches the host name.
    pub ssl_verify_host: bool,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total time for one upstream call in seconds.
    pub request_timeout_secs: u64,

    /// TCP keep-alive probe interval in seconds.
    pub tcp_keepalive_secs: u64,

    /// Idle time after which a pooled connection is evicted, in seconds.
    pub max_idle_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            ssl_verify_peer: false,
            ssl_verify_host: false,
            connect_timeout_secs: 10,
            request_timeout_secs: 60,
            tcp_keepalive_secs: 60,
            max_idle_secs: 60,
        }
    }
}

/// WSDL cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding one file per cached WSDL document.
    pub directory: PathBuf,

    /// Time-to-live of a cached document in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("var/cache/wsdl"),
            ttl_secs: 3600,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `proxy.debug` forces debug.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
