//! SOAP Reverse Proxy
//!
//! Fronts a single upstream SOAP service: WSDL discovery is answered from a
//! file cache, SOAP calls are forwarded with the caller's Basic credentials
//! over pooled keep-alive connections.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                   SOAP PROXY                      │
//!   Client Request   │  ┌─────────┐   ┌─────────┐   ┌──────────────┐    │
//!   ─────────────────┼─▶│  http   │──▶│ routing │──▶│    proxy     │    │
//!                    │  │ server  │   │classify │   │ orchestrator │    │
//!                    │  └─────────┘   └─────────┘   └──┬────────┬──┘    │
//!                    │                                 │        │       │
//!                    │                      ┌──────────▼┐  ┌────▼─────┐ │
//!                    │                      │   cache   │  │ upstream │─┼──▶ SOAP
//!                    │                      │   (WSDL)  │  │  + pool  │ │    Service
//!                    │                      └───────────┘  └──────────┘ │
//!                    │  ┌────────────────────────────────────────────┐  │
//!                    │  │ config · security · soap · observability   │  │
//!                    │  │ lifecycle · net (TLS)                      │  │
//!                    │  └────────────────────────────────────────────┘  │
//!                    └──────────────────────────────────────────────────┘
//! ```

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use soap_proxy::cache::WsdlCache;
use soap_proxy::config::{load_config, ProxyConfig};
use soap_proxy::lifecycle::{signals, Shutdown};
use soap_proxy::net::load_tls_config;
use soap_proxy::observability::{logging, metrics};
use soap_proxy::{HttpServer, SoapProxy};

#[derive(Parser)]
#[command(name = "soap-proxy")]
#[command(version, about = "Reverse proxy for a single upstream SOAP service", long_about = None)]
struct Cli {
    /// TOML configuration file. Environment variables override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Run the proxy (default)
    Serve,
    /// Delete every cached WSDL document
    ClearCache,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    logging::init_tracing(&config.observability, config.proxy.debug);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::ClearCache => clear_cache(&config).await,
    }
}

async fn serve(config: ProxyConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("soap-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        target_host = %config.proxy.target_host,
        mount_path = %config.proxy.mount_path,
        debug = config.proxy.debug,
        ssl_verify_peer = config.upstream.ssl_verify_peer,
        ssl_verify_host = config.upstream.ssl_verify_host,
        cache_dir = ?config.cache.directory,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let proxy = Arc::new(SoapProxy::from_config(&config).await?);
    let server = HttpServer::new(proxy.clone(), &config);

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let addr: SocketAddr = config.listener.bind_address.parse()?;
    match &config.listener.tls {
        Some(tls) => {
            let tls_config = load_tls_config(&tls.cert_path, &tls.key_path).await?;
            server.run_tls(addr, tls_config, shutdown).await?;
        }
        None => {
            let listener = TcpListener::bind(addr).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");
            server.run(listener, shutdown).await?;
        }
    }

    let closed = proxy.upstream().pool().close_all();
    tracing::info!(closed_connections = closed, "Shutdown complete");
    Ok(())
}

async fn clear_cache(config: &ProxyConfig) -> Result<(), Box<dyn std::error::Error>> {
    let cache = WsdlCache::open(
        config.cache.directory.clone(),
        Duration::from_secs(config.cache.ttl_secs),
    )
    .await?;
    let removed = cache.clear().await?;
    println!("Removed {} cached WSDL document(s) from {}", removed, cache.dir().display());
    Ok(())
}
